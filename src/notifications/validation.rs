//! Registry and trampolines for the engine's validation interface.
//!
//! The block and state views handed to these handlers are borrowed from the
//! engine and only valid for the duration of the call; a handler that wants
//! to keep a block promotes it with [`BlockRef::to_owned`].

use std::marker::PhantomData;
use std::os::raw::c_void;
use std::panic::{catch_unwind, AssertUnwindSafe};

use bitcoinkernel_sys::{
    btck_block_validation_state_get_block_validation_result,
    btck_block_validation_state_get_validation_mode, btck_Block, btck_BlockTreeEntry,
    btck_BlockValidationState, btck_ValidationInterfaceCallbacks,
};

use crate::core::block::BlockRef;
use crate::ffi::sealed::FromPtr;
use crate::notifications::types::{BlockValidationResult, ValidationMode};
use crate::state::entry::BlockTreeEntry;

/// Borrowed view of the verdict on a checked block. Only valid inside the
/// [`BlockCheckedCallback`] invocation it was handed to.
#[derive(Copy, Clone)]
pub struct BlockValidationStateRef<'a> {
    ptr: *const btck_BlockValidationState,
    marker: PhantomData<&'a btck_BlockValidationState>,
}

unsafe impl Send for BlockValidationStateRef<'_> {}
unsafe impl Sync for BlockValidationStateRef<'_> {}

impl BlockValidationStateRef<'_> {
    pub fn mode(&self) -> ValidationMode {
        unsafe { btck_block_validation_state_get_validation_mode(self.ptr) }.into()
    }

    /// The specific rejection reason; [`BlockValidationResult::Unset`] when
    /// the mode is not [`ValidationMode::Invalid`].
    pub fn result(&self) -> BlockValidationResult {
        unsafe { btck_block_validation_state_get_block_validation_result(self.ptr) }.into()
    }
}

impl<'a> FromPtr<'a> for BlockValidationStateRef<'a> {
    type Target = btck_BlockValidationState;

    unsafe fn from_ptr(ptr: *const btck_BlockValidationState) -> Self {
        debug_assert!(!ptr.is_null());
        BlockValidationStateRef {
            ptr,
            marker: PhantomData,
        }
    }
}

pub trait BlockCheckedCallback: Send + Sync {
    /// A block completed its checks; the state carries the verdict. Fires
    /// for valid and invalid blocks alike.
    fn on_block_checked(&self, block: BlockRef<'_>, state: BlockValidationStateRef<'_>);
}

impl<F> BlockCheckedCallback for F
where
    F: Fn(BlockRef<'_>, BlockValidationStateRef<'_>) + Send + Sync,
{
    fn on_block_checked(&self, block: BlockRef<'_>, state: BlockValidationStateRef<'_>) {
        self(block, state)
    }
}

pub trait PowValidBlockCallback: Send + Sync {
    /// A block passed the proof-of-work and structural checks and is about
    /// to be stored, before full validation of its transactions.
    fn on_pow_valid_block(&self, block: BlockRef<'_>);
}

impl<F> PowValidBlockCallback for F
where
    F: Fn(BlockRef<'_>) + Send + Sync,
{
    fn on_pow_valid_block(&self, block: BlockRef<'_>) {
        self(block)
    }
}

pub trait BlockConnectedCallback: Send + Sync {
    fn on_block_connected(&self, block: BlockRef<'_>, entry: BlockTreeEntry<'_>);
}

impl<F> BlockConnectedCallback for F
where
    F: Fn(BlockRef<'_>, BlockTreeEntry<'_>) + Send + Sync,
{
    fn on_block_connected(&self, block: BlockRef<'_>, entry: BlockTreeEntry<'_>) {
        self(block, entry)
    }
}

pub trait BlockDisconnectedCallback: Send + Sync {
    /// A block left the active chain during a reorganization.
    fn on_block_disconnected(&self, block: BlockRef<'_>, entry: BlockTreeEntry<'_>);
}

impl<F> BlockDisconnectedCallback for F
where
    F: Fn(BlockRef<'_>, BlockTreeEntry<'_>) + Send + Sync,
{
    fn on_block_disconnected(&self, block: BlockRef<'_>, entry: BlockTreeEntry<'_>) {
        self(block, entry)
    }
}

/// Holder for the validation handlers a [`crate::ContextBuilder`] hands to
/// the engine. Unset handlers are skipped.
#[derive(Default)]
pub struct ValidationCallbackRegistry {
    block_checked: Option<Box<dyn BlockCheckedCallback>>,
    pow_valid_block: Option<Box<dyn PowValidBlockCallback>>,
    block_connected: Option<Box<dyn BlockConnectedCallback>>,
    block_disconnected: Option<Box<dyn BlockDisconnectedCallback>>,
}

impl ValidationCallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_block_checked(mut self, callback: impl BlockCheckedCallback + 'static) -> Self {
        self.block_checked = Some(Box::new(callback));
        self
    }

    pub fn on_pow_valid_block(mut self, callback: impl PowValidBlockCallback + 'static) -> Self {
        self.pow_valid_block = Some(Box::new(callback));
        self
    }

    pub fn on_block_connected(mut self, callback: impl BlockConnectedCallback + 'static) -> Self {
        self.block_connected = Some(Box::new(callback));
        self
    }

    pub fn on_block_disconnected(
        mut self,
        callback: impl BlockDisconnectedCallback + 'static,
    ) -> Self {
        self.block_disconnected = Some(Box::new(callback));
        self
    }

    /// Builds the C callback struct. Same address-stability contract as
    /// [`crate::NotificationCallbackRegistry::to_c_callbacks`]; the
    /// context's arena owns the registry.
    pub(crate) fn to_c_callbacks(
        registry: *mut ValidationCallbackRegistry,
    ) -> btck_ValidationInterfaceCallbacks {
        btck_ValidationInterfaceCallbacks {
            user_data: registry as *mut c_void,
            user_data_destroy: None,
            block_checked: Some(block_checked_wrapper),
            pow_valid_block: Some(pow_valid_block_wrapper),
            block_connected: Some(block_connected_wrapper),
            block_disconnected: Some(block_disconnected_wrapper),
        }
    }
}

/// Keeps handler panics on this side of the boundary. The validation
/// interface has no fatal channel of its own, so a panic here is logged and
/// swallowed.
fn guard(what: &str, body: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(body)).is_err() {
        log::error!("validation handler for {} panicked", what);
    }
}

unsafe extern "C" fn block_checked_wrapper(
    user_data: *mut c_void,
    block: *const btck_Block,
    state: *const btck_BlockValidationState,
) {
    let registry = &*(user_data as *mut ValidationCallbackRegistry);
    guard("block checked", || {
        if let Some(callback) = &registry.block_checked {
            if !block.is_null() && !state.is_null() {
                callback.on_block_checked(
                    BlockRef::from_ptr(block),
                    BlockValidationStateRef::from_ptr(state),
                );
            }
        }
    });
}

unsafe extern "C" fn pow_valid_block_wrapper(user_data: *mut c_void, block: *const btck_Block) {
    let registry = &*(user_data as *mut ValidationCallbackRegistry);
    guard("pow valid block", || {
        if let Some(callback) = &registry.pow_valid_block {
            if !block.is_null() {
                callback.on_pow_valid_block(BlockRef::from_ptr(block));
            }
        }
    });
}

unsafe extern "C" fn block_connected_wrapper(
    user_data: *mut c_void,
    block: *const btck_Block,
    entry: *const btck_BlockTreeEntry,
) {
    let registry = &*(user_data as *mut ValidationCallbackRegistry);
    guard("block connected", || {
        if let Some(callback) = &registry.block_connected {
            if !block.is_null() && !entry.is_null() {
                callback.on_block_connected(
                    BlockRef::from_ptr(block),
                    BlockTreeEntry::from_ptr(entry),
                );
            }
        }
    });
}

unsafe extern "C" fn block_disconnected_wrapper(
    user_data: *mut c_void,
    block: *const btck_Block,
    entry: *const btck_BlockTreeEntry,
) {
    let registry = &*(user_data as *mut ValidationCallbackRegistry);
    guard("block disconnected", || {
        if let Some(callback) = &registry.block_disconnected {
            if !block.is_null() && !entry.is_null() {
                callback.on_block_disconnected(
                    BlockRef::from_ptr(block),
                    BlockTreeEntry::from_ptr(entry),
                );
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrappers_tolerate_empty_registry() {
        let mut registry = ValidationCallbackRegistry::new();
        let user_data = &mut registry as *mut _ as *mut c_void;
        unsafe {
            block_checked_wrapper(user_data, std::ptr::null(), std::ptr::null());
            pow_valid_block_wrapper(user_data, std::ptr::null());
            block_connected_wrapper(user_data, std::ptr::null(), std::ptr::null());
            block_disconnected_wrapper(user_data, std::ptr::null(), std::ptr::null());
        }
    }

    #[test]
    fn test_panicking_handler_is_contained() {
        let mut registry =
            ValidationCallbackRegistry::new().on_pow_valid_block(|_: BlockRef<'_>| {
                panic!("handler bug");
            });
        let user_data = &mut registry as *mut _ as *mut c_void;
        // Null block: the handler is not reached, nothing unwinds.
        unsafe { pow_valid_block_wrapper(user_data, std::ptr::null()) };
    }
}
