// Copyright (c) 2023-present The Bitcoin Kernel developers
// Licensed under the MIT License. See LICENSE file in the project root.

//! Rust-side enums for the state codes the engine reports through its
//! callback interfaces, and their conversions from the C encodings.
//!
//! Conversions panic on a code this binding does not know. The panic never
//! crosses the FFI boundary; every trampoline guards its body and routes the
//! failure to the fatal error handler.

use bitcoinkernel_sys::{
    btck_BlockValidationResult, btck_SynchronizationState, btck_ValidationMode, btck_Warning,
    BTCK_BLOCK_VALIDATION_RESULT_CACHED_INVALID, BTCK_BLOCK_VALIDATION_RESULT_CONSENSUS,
    BTCK_BLOCK_VALIDATION_RESULT_HEADER_LOW_WORK, BTCK_BLOCK_VALIDATION_RESULT_INVALID_HEADER,
    BTCK_BLOCK_VALIDATION_RESULT_INVALID_PREV, BTCK_BLOCK_VALIDATION_RESULT_MISSING_PREV,
    BTCK_BLOCK_VALIDATION_RESULT_MUTATED, BTCK_BLOCK_VALIDATION_RESULT_TIME_FUTURE,
    BTCK_BLOCK_VALIDATION_RESULT_UNSET, BTCK_SYNCHRONIZATION_STATE_INIT_DOWNLOAD,
    BTCK_SYNCHRONIZATION_STATE_INIT_REINDEX, BTCK_SYNCHRONIZATION_STATE_POST_INIT,
    BTCK_VALIDATION_MODE_INTERNAL_ERROR, BTCK_VALIDATION_MODE_INVALID, BTCK_VALIDATION_MODE_VALID,
    BTCK_WARNING_LARGE_WORK_INVALID_CHAIN, BTCK_WARNING_UNKNOWN_NEW_RULES_ACTIVATED,
};

/// Where the engine currently is in its synchronization lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynchronizationState {
    InitReindex,
    InitDownload,
    PostInit,
}

impl From<btck_SynchronizationState> for SynchronizationState {
    fn from(state: btck_SynchronizationState) -> Self {
        match state {
            BTCK_SYNCHRONIZATION_STATE_INIT_REINDEX => SynchronizationState::InitReindex,
            BTCK_SYNCHRONIZATION_STATE_INIT_DOWNLOAD => SynchronizationState::InitDownload,
            BTCK_SYNCHRONIZATION_STATE_POST_INIT => SynchronizationState::PostInit,
            _ => panic!("unknown synchronization state: {}", state),
        }
    }
}

/// A condition the engine flags and may later clear again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    UnknownNewRulesActivated,
    LargeWorkInvalidChain,
}

impl From<btck_Warning> for Warning {
    fn from(warning: btck_Warning) -> Self {
        match warning {
            BTCK_WARNING_UNKNOWN_NEW_RULES_ACTIVATED => Warning::UnknownNewRulesActivated,
            BTCK_WARNING_LARGE_WORK_INVALID_CHAIN => Warning::LargeWorkInvalidChain,
            _ => panic!("unknown warning: {}", warning),
        }
    }
}

/// Overall outcome of validating a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Valid,
    Invalid,
    InternalError,
}

impl From<btck_ValidationMode> for ValidationMode {
    fn from(mode: btck_ValidationMode) -> Self {
        match mode {
            BTCK_VALIDATION_MODE_VALID => ValidationMode::Valid,
            BTCK_VALIDATION_MODE_INVALID => ValidationMode::Invalid,
            BTCK_VALIDATION_MODE_INTERNAL_ERROR => ValidationMode::InternalError,
            _ => panic!("unknown validation mode: {}", mode),
        }
    }
}

/// The specific reason a block was found invalid, meaningful when the mode
/// is [`ValidationMode::Invalid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockValidationResult {
    /// No verdict recorded yet.
    Unset,
    /// The block violated a consensus rule.
    Consensus,
    /// The block was already marked invalid earlier.
    CachedInvalid,
    /// The header failed a check against its own data.
    InvalidHeader,
    /// The block's transactions do not match its merkle commitment.
    Mutated,
    /// The predecessor is unknown.
    MissingPrev,
    /// The predecessor is itself invalid.
    InvalidPrev,
    /// The header timestamp is too far in the future.
    TimeFuture,
    /// The header does not carry enough work.
    HeaderLowWork,
}

impl From<btck_BlockValidationResult> for BlockValidationResult {
    fn from(result: btck_BlockValidationResult) -> Self {
        match result {
            BTCK_BLOCK_VALIDATION_RESULT_UNSET => BlockValidationResult::Unset,
            BTCK_BLOCK_VALIDATION_RESULT_CONSENSUS => BlockValidationResult::Consensus,
            BTCK_BLOCK_VALIDATION_RESULT_CACHED_INVALID => BlockValidationResult::CachedInvalid,
            BTCK_BLOCK_VALIDATION_RESULT_INVALID_HEADER => BlockValidationResult::InvalidHeader,
            BTCK_BLOCK_VALIDATION_RESULT_MUTATED => BlockValidationResult::Mutated,
            BTCK_BLOCK_VALIDATION_RESULT_MISSING_PREV => BlockValidationResult::MissingPrev,
            BTCK_BLOCK_VALIDATION_RESULT_INVALID_PREV => BlockValidationResult::InvalidPrev,
            BTCK_BLOCK_VALIDATION_RESULT_TIME_FUTURE => BlockValidationResult::TimeFuture,
            BTCK_BLOCK_VALIDATION_RESULT_HEADER_LOW_WORK => BlockValidationResult::HeaderLowWork,
            _ => panic!("unknown block validation result: {}", result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synchronization_state_conversions() {
        assert_eq!(
            SynchronizationState::from(BTCK_SYNCHRONIZATION_STATE_INIT_REINDEX),
            SynchronizationState::InitReindex
        );
        assert_eq!(
            SynchronizationState::from(BTCK_SYNCHRONIZATION_STATE_INIT_DOWNLOAD),
            SynchronizationState::InitDownload
        );
        assert_eq!(
            SynchronizationState::from(BTCK_SYNCHRONIZATION_STATE_POST_INIT),
            SynchronizationState::PostInit
        );
    }

    #[test]
    #[should_panic(expected = "unknown synchronization state")]
    fn test_unknown_synchronization_state_panics() {
        let _ = SynchronizationState::from(200);
    }

    #[test]
    fn test_warning_conversions() {
        assert_eq!(
            Warning::from(BTCK_WARNING_UNKNOWN_NEW_RULES_ACTIVATED),
            Warning::UnknownNewRulesActivated
        );
        assert_eq!(
            Warning::from(BTCK_WARNING_LARGE_WORK_INVALID_CHAIN),
            Warning::LargeWorkInvalidChain
        );
    }

    #[test]
    fn test_validation_mode_conversions() {
        assert_eq!(
            ValidationMode::from(BTCK_VALIDATION_MODE_VALID),
            ValidationMode::Valid
        );
        assert_eq!(
            ValidationMode::from(BTCK_VALIDATION_MODE_INVALID),
            ValidationMode::Invalid
        );
        assert_eq!(
            ValidationMode::from(BTCK_VALIDATION_MODE_INTERNAL_ERROR),
            ValidationMode::InternalError
        );
    }

    #[test]
    fn test_block_validation_result_conversions() {
        let cases = [
            (BTCK_BLOCK_VALIDATION_RESULT_UNSET, BlockValidationResult::Unset),
            (
                BTCK_BLOCK_VALIDATION_RESULT_CONSENSUS,
                BlockValidationResult::Consensus,
            ),
            (
                BTCK_BLOCK_VALIDATION_RESULT_CACHED_INVALID,
                BlockValidationResult::CachedInvalid,
            ),
            (
                BTCK_BLOCK_VALIDATION_RESULT_INVALID_HEADER,
                BlockValidationResult::InvalidHeader,
            ),
            (
                BTCK_BLOCK_VALIDATION_RESULT_MUTATED,
                BlockValidationResult::Mutated,
            ),
            (
                BTCK_BLOCK_VALIDATION_RESULT_MISSING_PREV,
                BlockValidationResult::MissingPrev,
            ),
            (
                BTCK_BLOCK_VALIDATION_RESULT_INVALID_PREV,
                BlockValidationResult::InvalidPrev,
            ),
            (
                BTCK_BLOCK_VALIDATION_RESULT_TIME_FUTURE,
                BlockValidationResult::TimeFuture,
            ),
            (
                BTCK_BLOCK_VALIDATION_RESULT_HEADER_LOW_WORK,
                BlockValidationResult::HeaderLowWork,
            ),
        ];
        for (code, expected) in cases {
            assert_eq!(BlockValidationResult::from(code), expected);
        }
    }
}
