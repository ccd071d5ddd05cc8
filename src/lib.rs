//! Safe Rust bindings to the bitcoinkernel validation engine.
//!
//! The engine is an opaque native library doing all consensus work; this
//! crate is the safety layer on top of its C API. Every engine object is
//! wrapped either as an owned handle (released through `close()` or drop,
//! with use-after-release surfaced as [`KernelError::ClosedResource`]) or as
//! a borrowed, `Copy` view tied to its parent's lifetime. Callbacks cross
//! back into Rust through trampolines that never let a panic unwind into
//! native frames.
//!
//! The usual shape of a program:
//!
//! 1. build a [`Context`] through [`ContextBuilder`], optionally attaching a
//!    [`NotificationCallbackRegistry`] and a [`ValidationCallbackRegistry`];
//! 2. open a [`ChainstateManager`] on a data directory;
//! 3. feed it blocks with [`ChainstateManager::process_block`] and inspect
//!    the result through [`Chain`] and [`BlockTreeEntry`] views.
//!
//! Stateless script verification is available without any context through
//! [`verify`].

use std::fmt;
use std::os::raw::{c_int, c_uchar, c_void};
use std::panic::catch_unwind;

use bitcoinkernel_sys::btck_WriteBytes;

mod core;
mod ffi;
mod log;
mod notifications;
mod state;

pub use crate::core::block::{Block, BlockExt, BlockHash, BlockRef};
pub use crate::core::script::{ScriptPubkey, ScriptPubkeyExt, ScriptPubkeyRef};
pub use crate::core::spent_outputs::{
    BlockSpentOutputs, BlockSpentOutputsExt, BlockSpentOutputsRef, Coin, CoinExt, CoinIter,
    CoinRef, TransactionSpentOutputs, TransactionSpentOutputsExt, TransactionSpentOutputsIter,
    TransactionSpentOutputsRef,
};
pub use crate::core::transaction::{
    Transaction, TransactionExt, TransactionRef, TxInRef, TxOut, TxOutExt, TxOutRef, Txid,
    TxidExt, TxidRef,
};
pub use crate::core::verify::{
    verify, ScriptVerifyError, VERIFY_ALL, VERIFY_ALL_PRE_TAPROOT, VERIFY_CHECKLOCKTIMEVERIFY,
    VERIFY_CHECKSEQUENCEVERIFY, VERIFY_DERSIG, VERIFY_NONE, VERIFY_NULLDUMMY, VERIFY_P2SH,
    VERIFY_TAPROOT, VERIFY_WITNESS,
};
pub use crate::log::logging::{disable_logging, Log, LogCategory, LogLevel, Logger};
pub use crate::notifications::notification::{
    BlockTipCallback, FatalErrorCallback, FlushErrorCallback, HeaderTipCallback,
    NotificationCallbackRegistry, ProgressCallback, WarningSetCallback, WarningUnsetCallback,
};
pub use crate::notifications::types::{
    BlockValidationResult, SynchronizationState, ValidationMode, Warning,
};
pub use crate::notifications::validation::{
    BlockCheckedCallback, BlockConnectedCallback, BlockDisconnectedCallback,
    BlockValidationStateRef, PowValidBlockCallback, ValidationCallbackRegistry,
};
pub use crate::state::chain::{Chain, ChainIterator};
pub use crate::state::chainstate::{
    ChainstateManager, ChainstateManagerOptions, ProcessBlockResult,
};
pub use crate::state::context::{ChainParams, ChainType, Context, ContextBuilder};
pub use crate::state::entry::BlockTreeEntry;

/// A collection of traits sharing accessors between owned types and their
/// borrowed `*Ref` counterparts.
pub mod prelude {
    pub use crate::BlockExt;
    pub use crate::BlockSpentOutputsExt;
    pub use crate::CoinExt;
    pub use crate::ScriptPubkeyExt;
    pub use crate::TransactionExt;
    pub use crate::TransactionSpentOutputsExt;
    pub use crate::TxOutExt;
    pub use crate::TxidExt;
}

/// All errors the binding layer reports. Failures inside the engine itself
/// are not part of this taxonomy; the engine reports those through the
/// notification interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// A C constructor returned null; the payload names the rejected object.
    InvalidHandle(String),
    /// The operation targeted a handle whose `close()` already ran.
    ClosedResource,
    /// A height or index was outside the valid bounds of its collection.
    OutOfRange,
    /// The engine was not in a state where the operation makes sense.
    InvalidState(String),
    ScriptVerify(ScriptVerifyError),
    SerializationFailed,
    CStringCreationFailed(String),
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::InvalidHandle(what) => {
                write!(f, "the engine rejected the creation of: {}", what)
            }
            KernelError::ClosedResource => write!(f, "operation on a released handle"),
            KernelError::OutOfRange => write!(f, "height or index out of range"),
            KernelError::InvalidState(msg) => write!(f, "invalid engine state: {}", msg),
            KernelError::ScriptVerify(err) => write!(f, "script verification error: {}", err),
            KernelError::SerializationFailed => write!(f, "serialization failed"),
            KernelError::CStringCreationFailed(msg) => {
                write!(f, "could not create C string: {}", msg)
            }
        }
    }
}

impl std::error::Error for KernelError {}

impl From<ScriptVerifyError> for KernelError {
    fn from(err: ScriptVerifyError) -> Self {
        KernelError::ScriptVerify(err)
    }
}

/// Runs one of the C API's `*_to_bytes` entry points against a growable
/// buffer. The write callback is invoked re-entrantly by the engine, so its
/// body is panic-guarded; a panicking write aborts the serialization and the
/// whole call reports [`KernelError::SerializationFailed`].
pub(crate) fn c_serialize<F>(serialize_fn: F) -> Result<Vec<u8>, KernelError>
where
    F: FnOnce(btck_WriteBytes, *mut c_void) -> c_int,
{
    unsafe extern "C" fn write_bytes(
        user_data: *mut c_void,
        data: *const c_uchar,
        len: usize,
    ) -> c_int {
        let result = catch_unwind(|| {
            let buffer = &mut *(user_data as *mut Vec<u8>);
            buffer.extend_from_slice(std::slice::from_raw_parts(data, len));
        });
        ffi::c_helpers::to_c_result(result.is_ok())
    }

    let mut buffer: Vec<u8> = Vec::new();
    let result = serialize_fn(Some(write_bytes), &mut buffer as *mut Vec<u8> as *mut c_void);
    if ffi::c_helpers::success(result) {
        Ok(buffer)
    } else {
        Err(KernelError::SerializationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            KernelError::ClosedResource.to_string(),
            "operation on a released handle"
        );
        assert_eq!(
            KernelError::InvalidHandle("transaction".to_string()).to_string(),
            "the engine rejected the creation of: transaction"
        );
        assert_eq!(
            KernelError::from(ScriptVerifyError::TxInputIndex).to_string(),
            "script verification error: input index out of bounds for transaction"
        );
    }

    #[test]
    fn test_c_serialize_collects_writes() {
        let bytes = c_serialize(|writer, user_data| {
            let writer = writer.unwrap();
            unsafe {
                writer(user_data, b"ab".as_ptr(), 2);
                writer(user_data, b"cd".as_ptr(), 2);
            }
            0
        })
        .unwrap();
        assert_eq!(bytes, b"abcd");
    }

    #[test]
    fn test_c_serialize_propagates_failure() {
        let result = c_serialize(|_, _| 1);
        assert_eq!(result, Err(KernelError::SerializationFailed));
    }
}
