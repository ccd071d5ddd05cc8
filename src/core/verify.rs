use std::fmt;

use bitcoinkernel_sys::{
    btck_script_pubkey_verify, btck_ScriptVerifyStatus, btck_TransactionOutput,
    BTCK_SCRIPT_VERIFICATION_FLAGS_ALL, BTCK_SCRIPT_VERIFICATION_FLAGS_CHECKLOCKTIMEVERIFY,
    BTCK_SCRIPT_VERIFICATION_FLAGS_CHECKSEQUENCEVERIFY, BTCK_SCRIPT_VERIFICATION_FLAGS_DERSIG,
    BTCK_SCRIPT_VERIFICATION_FLAGS_NONE, BTCK_SCRIPT_VERIFICATION_FLAGS_NULLDUMMY,
    BTCK_SCRIPT_VERIFICATION_FLAGS_P2SH, BTCK_SCRIPT_VERIFICATION_FLAGS_TAPROOT,
    BTCK_SCRIPT_VERIFICATION_FLAGS_WITNESS,
    BTCK_SCRIPT_VERIFY_STATUS_ERROR_INVALID_FLAGS_COMBINATION,
    BTCK_SCRIPT_VERIFY_STATUS_ERROR_SPENT_OUTPUTS_REQUIRED, BTCK_SCRIPT_VERIFY_STATUS_OK,
};

use crate::core::script::ScriptPubkeyExt;
use crate::core::transaction::{TransactionExt, TxOut};
use crate::ffi::c_helpers;
use crate::ffi::sealed::AsPtr;
use crate::KernelError;

pub const VERIFY_NONE: u32 = BTCK_SCRIPT_VERIFICATION_FLAGS_NONE;
pub const VERIFY_P2SH: u32 = BTCK_SCRIPT_VERIFICATION_FLAGS_P2SH;
pub const VERIFY_DERSIG: u32 = BTCK_SCRIPT_VERIFICATION_FLAGS_DERSIG;
pub const VERIFY_NULLDUMMY: u32 = BTCK_SCRIPT_VERIFICATION_FLAGS_NULLDUMMY;
pub const VERIFY_CHECKLOCKTIMEVERIFY: u32 = BTCK_SCRIPT_VERIFICATION_FLAGS_CHECKLOCKTIMEVERIFY;
pub const VERIFY_CHECKSEQUENCEVERIFY: u32 = BTCK_SCRIPT_VERIFICATION_FLAGS_CHECKSEQUENCEVERIFY;
pub const VERIFY_WITNESS: u32 = BTCK_SCRIPT_VERIFICATION_FLAGS_WITNESS;
pub const VERIFY_TAPROOT: u32 = BTCK_SCRIPT_VERIFICATION_FLAGS_TAPROOT;

/// All flags the engine understands; anything outside this mask is rejected
/// before the engine is called.
pub const VERIFY_ALL: u32 = BTCK_SCRIPT_VERIFICATION_FLAGS_ALL;

/// Everything up to and including segwit. The usual choice for verifying
/// pre-taproot transactions without supplying spent outputs.
pub const VERIFY_ALL_PRE_TAPROOT: u32 = VERIFY_P2SH
    | VERIFY_DERSIG
    | VERIFY_NULLDUMMY
    | VERIFY_CHECKLOCKTIMEVERIFY
    | VERIFY_CHECKSEQUENCEVERIFY
    | VERIFY_WITNESS;

/// Reasons a [`verify`] call can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptVerifyError {
    /// The input index is not an input of the spending transaction.
    /// Detected before the engine is called.
    TxInputIndex,
    /// The flags contain bits outside [`VERIFY_ALL`]. Detected before the
    /// engine is called.
    InvalidFlags,
    /// The engine rejected the flag combination.
    InvalidFlagsCombination,
    /// Spent outputs were supplied but their number does not match the
    /// spending transaction's input count. Detected before the engine is
    /// called.
    SpentOutputsMismatch,
    /// The requested flags need the spent outputs, which were not supplied.
    SpentOutputsRequired,
    /// The script did not verify, or the engine reported a status this
    /// binding does not know.
    Invalid,
}

impl fmt::Display for ScriptVerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptVerifyError::TxInputIndex => {
                write!(f, "input index out of bounds for transaction")
            }
            ScriptVerifyError::InvalidFlags => write!(f, "invalid verification flags"),
            ScriptVerifyError::InvalidFlagsCombination => {
                write!(f, "invalid combination of verification flags")
            }
            ScriptVerifyError::SpentOutputsMismatch => {
                write!(f, "spent outputs do not match the transaction's inputs")
            }
            ScriptVerifyError::SpentOutputsRequired => {
                write!(f, "the verification flags require the spent outputs")
            }
            ScriptVerifyError::Invalid => write!(f, "script failed verification"),
        }
    }
}

impl std::error::Error for ScriptVerifyError {}

/// Verifies that `input_index` of `tx_to` correctly spends an output locked
/// by `script_pubkey`.
///
/// `amount` is required by the segwit sighash and ignored otherwise; `None`
/// verifies with a zero amount. `flags` defaults to [`VERIFY_ALL`].
/// `spent_outputs` may be empty unless taproot verification is requested, in
/// which case every prevout of the transaction must be supplied in input
/// order.
///
/// Stateless: no [`crate::Context`] is needed.
pub fn verify(
    script_pubkey: &impl ScriptPubkeyExt,
    amount: Option<i64>,
    tx_to: &impl TransactionExt,
    input_index: u32,
    flags: Option<u32>,
    spent_outputs: &[TxOut],
) -> Result<(), KernelError> {
    let flags = flags.unwrap_or(VERIFY_ALL);
    if (flags & !VERIFY_ALL) != 0 {
        return Err(ScriptVerifyError::InvalidFlags.into());
    }

    let input_count = tx_to.input_count()?;
    if input_index as usize >= input_count {
        return Err(ScriptVerifyError::TxInputIndex.into());
    }
    if !spent_outputs.is_empty() && spent_outputs.len() != input_count {
        return Err(ScriptVerifyError::SpentOutputsMismatch.into());
    }

    // The pointer array only has to live across the call below.
    let mut spent_output_ptrs: Vec<*const btck_TransactionOutput> =
        Vec::with_capacity(spent_outputs.len());
    for output in spent_outputs {
        spent_output_ptrs.push(output.as_ptr()?);
    }

    let mut status: btck_ScriptVerifyStatus = BTCK_SCRIPT_VERIFY_STATUS_OK;
    let passed = unsafe {
        btck_script_pubkey_verify(
            script_pubkey.as_ptr()?,
            amount.unwrap_or(0),
            tx_to.as_ptr()?,
            if spent_output_ptrs.is_empty() {
                std::ptr::null()
            } else {
                spent_output_ptrs.as_ptr()
            },
            spent_output_ptrs.len(),
            input_index,
            flags,
            &mut status,
        )
    };

    match status {
        BTCK_SCRIPT_VERIFY_STATUS_OK => {
            if c_helpers::verification_passed(passed) {
                Ok(())
            } else {
                Err(ScriptVerifyError::Invalid.into())
            }
        }
        BTCK_SCRIPT_VERIFY_STATUS_ERROR_INVALID_FLAGS_COMBINATION => {
            Err(ScriptVerifyError::InvalidFlagsCombination.into())
        }
        BTCK_SCRIPT_VERIFY_STATUS_ERROR_SPENT_OUTPUTS_REQUIRED => {
            Err(ScriptVerifyError::SpentOutputsRequired.into())
        }
        // Newer engines may add statuses this binding does not know yet.
        _ => Err(ScriptVerifyError::Invalid.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_values_match_engine_encoding() {
        assert_eq!(VERIFY_P2SH, 1 << 0);
        assert_eq!(VERIFY_DERSIG, 1 << 2);
        assert_eq!(VERIFY_NULLDUMMY, 1 << 4);
        assert_eq!(VERIFY_CHECKLOCKTIMEVERIFY, 1 << 9);
        assert_eq!(VERIFY_CHECKSEQUENCEVERIFY, 1 << 10);
        assert_eq!(VERIFY_WITNESS, 1 << 11);
        assert_eq!(VERIFY_TAPROOT, 1 << 17);
    }

    #[test]
    fn test_all_is_the_union_of_named_flags() {
        assert_eq!(
            VERIFY_ALL,
            VERIFY_P2SH
                | VERIFY_DERSIG
                | VERIFY_NULLDUMMY
                | VERIFY_CHECKLOCKTIMEVERIFY
                | VERIFY_CHECKSEQUENCEVERIFY
                | VERIFY_WITNESS
                | VERIFY_TAPROOT
        );
        assert_eq!(VERIFY_ALL_PRE_TAPROOT, VERIFY_ALL & !VERIFY_TAPROOT);
    }

    #[test]
    fn test_mask_detects_unknown_bits() {
        let unknown = 1u32 << 18;
        assert_ne!((VERIFY_ALL | unknown) & !VERIFY_ALL, 0);
        assert_eq!(VERIFY_ALL & !VERIFY_ALL, 0);
    }
}
