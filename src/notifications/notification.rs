//! Registry and trampolines for the engine's notification interface.
//!
//! The engine invokes these callbacks from its own threads, possibly while a
//! [`crate::ChainstateManager::process_block`] call is still on the caller's
//! stack. Handlers therefore have to be `Send + Sync` and must not call back
//! into the chainstate manager.
//!
//! No panic ever unwinds into native frames: each trampoline guards its body
//! and reports a panicking handler through the fatal error handler, itself
//! guarded.

use std::os::raw::{c_char, c_int, c_void};
use std::panic::{catch_unwind, AssertUnwindSafe};

use bitcoinkernel_sys::{
    btck_BlockTreeEntry, btck_NotificationInterfaceCallbacks, btck_SynchronizationState,
    btck_Warning,
};

use crate::ffi::c_helpers;
use crate::ffi::sealed::FromPtr;
use crate::notifications::types::{SynchronizationState, Warning};
use crate::state::entry::BlockTreeEntry;

pub trait BlockTipCallback: Send + Sync {
    /// The active chain has a new tip. `verification_progress` is the
    /// engine's estimate in `[0.0, 1.0]`.
    fn on_block_tip(
        &self,
        state: SynchronizationState,
        entry: BlockTreeEntry<'_>,
        verification_progress: f64,
    );
}

impl<F> BlockTipCallback for F
where
    F: Fn(SynchronizationState, BlockTreeEntry<'_>, f64) + Send + Sync,
{
    fn on_block_tip(
        &self,
        state: SynchronizationState,
        entry: BlockTreeEntry<'_>,
        verification_progress: f64,
    ) {
        self(state, entry, verification_progress)
    }
}

pub trait HeaderTipCallback: Send + Sync {
    /// The best known header changed. `presync` is set during the initial
    /// headers presync phase, before headers are stored.
    fn on_header_tip(
        &self,
        state: SynchronizationState,
        height: i64,
        timestamp: i64,
        presync: bool,
    );
}

impl<F> HeaderTipCallback for F
where
    F: Fn(SynchronizationState, i64, i64, bool) + Send + Sync,
{
    fn on_header_tip(
        &self,
        state: SynchronizationState,
        height: i64,
        timestamp: i64,
        presync: bool,
    ) {
        self(state, height, timestamp, presync)
    }
}

pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, title: String, progress_percent: i32, resume_possible: bool);
}

impl<F> ProgressCallback for F
where
    F: Fn(String, i32, bool) + Send + Sync,
{
    fn on_progress(&self, title: String, progress_percent: i32, resume_possible: bool) {
        self(title, progress_percent, resume_possible)
    }
}

pub trait WarningSetCallback: Send + Sync {
    fn on_warning_set(&self, warning: Warning, message: String);
}

impl<F> WarningSetCallback for F
where
    F: Fn(Warning, String) + Send + Sync,
{
    fn on_warning_set(&self, warning: Warning, message: String) {
        self(warning, message)
    }
}

pub trait WarningUnsetCallback: Send + Sync {
    fn on_warning_unset(&self, warning: Warning);
}

impl<F> WarningUnsetCallback for F
where
    F: Fn(Warning) + Send + Sync,
{
    fn on_warning_unset(&self, warning: Warning) {
        self(warning)
    }
}

pub trait FlushErrorCallback: Send + Sync {
    fn on_flush_error(&self, message: String);
}

impl<F> FlushErrorCallback for F
where
    F: Fn(String) + Send + Sync,
{
    fn on_flush_error(&self, message: String) {
        self(message)
    }
}

pub trait FatalErrorCallback: Send + Sync {
    /// The engine hit an unrecoverable condition. The process should wind
    /// down; further engine calls have unspecified results.
    fn on_fatal_error(&self, message: String);
}

impl<F> FatalErrorCallback for F
where
    F: Fn(String) + Send + Sync,
{
    fn on_fatal_error(&self, message: String) {
        self(message)
    }
}

/// Holder for the notification handlers a [`crate::ContextBuilder`] hands to
/// the engine. Unset handlers are skipped.
#[derive(Default)]
pub struct NotificationCallbackRegistry {
    block_tip: Option<Box<dyn BlockTipCallback>>,
    header_tip: Option<Box<dyn HeaderTipCallback>>,
    progress: Option<Box<dyn ProgressCallback>>,
    warning_set: Option<Box<dyn WarningSetCallback>>,
    warning_unset: Option<Box<dyn WarningUnsetCallback>>,
    flush_error: Option<Box<dyn FlushErrorCallback>>,
    fatal_error: Option<Box<dyn FatalErrorCallback>>,
}

impl NotificationCallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_block_tip(mut self, callback: impl BlockTipCallback + 'static) -> Self {
        self.block_tip = Some(Box::new(callback));
        self
    }

    pub fn on_header_tip(mut self, callback: impl HeaderTipCallback + 'static) -> Self {
        self.header_tip = Some(Box::new(callback));
        self
    }

    pub fn on_progress(mut self, callback: impl ProgressCallback + 'static) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn on_warning_set(mut self, callback: impl WarningSetCallback + 'static) -> Self {
        self.warning_set = Some(Box::new(callback));
        self
    }

    pub fn on_warning_unset(mut self, callback: impl WarningUnsetCallback + 'static) -> Self {
        self.warning_unset = Some(Box::new(callback));
        self
    }

    pub fn on_flush_error(mut self, callback: impl FlushErrorCallback + 'static) -> Self {
        self.flush_error = Some(Box::new(callback));
        self
    }

    pub fn on_fatal_error(mut self, callback: impl FatalErrorCallback + 'static) -> Self {
        self.fatal_error = Some(Box::new(callback));
        self
    }

    /// Builds the C callback struct. `registry` must stay at a stable
    /// address for the lifetime of the engine object the struct is
    /// registered with; the context's arena guarantees that. The arena also
    /// owns the registry, so `user_data_destroy` stays unset.
    pub(crate) fn to_c_callbacks(
        registry: *mut NotificationCallbackRegistry,
    ) -> btck_NotificationInterfaceCallbacks {
        btck_NotificationInterfaceCallbacks {
            user_data: registry as *mut c_void,
            user_data_destroy: None,
            block_tip: Some(block_tip_wrapper),
            header_tip: Some(header_tip_wrapper),
            progress: Some(progress_wrapper),
            warning_set: Some(warning_set_wrapper),
            warning_unset: Some(warning_unset_wrapper),
            flush_error: Some(flush_error_wrapper),
            fatal_error: Some(fatal_error_wrapper),
        }
    }
}

/// Runs a handler body, keeping any panic on this side of the boundary. A
/// panicking handler is reported through the registry's fatal error handler,
/// which is guarded as well.
fn guard(registry: &NotificationCallbackRegistry, what: &str, body: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(body)).is_err() {
        log::error!("notification handler for {} panicked", what);
        let _ = catch_unwind(AssertUnwindSafe(|| {
            if let Some(fatal) = &registry.fatal_error {
                fatal.on_fatal_error(format!("notification handler for {} panicked", what));
            }
        }));
    }
}

unsafe extern "C" fn block_tip_wrapper(
    user_data: *mut c_void,
    state: btck_SynchronizationState,
    entry: *const btck_BlockTreeEntry,
    verification_progress: f64,
) {
    let registry = &*(user_data as *mut NotificationCallbackRegistry);
    guard(registry, "block tip", || {
        if let Some(callback) = &registry.block_tip {
            if !entry.is_null() {
                callback.on_block_tip(
                    state.into(),
                    BlockTreeEntry::from_ptr(entry),
                    verification_progress,
                );
            }
        }
    });
}

unsafe extern "C" fn header_tip_wrapper(
    user_data: *mut c_void,
    state: btck_SynchronizationState,
    height: i64,
    timestamp: i64,
    presync: c_int,
) {
    let registry = &*(user_data as *mut NotificationCallbackRegistry);
    guard(registry, "header tip", || {
        if let Some(callback) = &registry.header_tip {
            callback.on_header_tip(state.into(), height, timestamp, c_helpers::present(presync));
        }
    });
}

unsafe extern "C" fn progress_wrapper(
    user_data: *mut c_void,
    title: *const c_char,
    title_len: usize,
    progress_percent: c_int,
    resume_possible: c_int,
) {
    let registry = &*(user_data as *mut NotificationCallbackRegistry);
    let title = c_helpers::cast_string(title, title_len);
    guard(registry, "progress", || {
        if let Some(callback) = &registry.progress {
            callback.on_progress(
                title.clone(),
                progress_percent,
                c_helpers::present(resume_possible),
            );
        }
    });
}

unsafe extern "C" fn warning_set_wrapper(
    user_data: *mut c_void,
    warning: btck_Warning,
    message: *const c_char,
    message_len: usize,
) {
    let registry = &*(user_data as *mut NotificationCallbackRegistry);
    let message = c_helpers::cast_string(message, message_len);
    guard(registry, "warning set", || {
        if let Some(callback) = &registry.warning_set {
            callback.on_warning_set(warning.into(), message.clone());
        }
    });
}

unsafe extern "C" fn warning_unset_wrapper(user_data: *mut c_void, warning: btck_Warning) {
    let registry = &*(user_data as *mut NotificationCallbackRegistry);
    guard(registry, "warning unset", || {
        if let Some(callback) = &registry.warning_unset {
            callback.on_warning_unset(warning.into());
        }
    });
}

unsafe extern "C" fn flush_error_wrapper(
    user_data: *mut c_void,
    message: *const c_char,
    message_len: usize,
) {
    let registry = &*(user_data as *mut NotificationCallbackRegistry);
    let message = c_helpers::cast_string(message, message_len);
    guard(registry, "flush error", || {
        if let Some(callback) = &registry.flush_error {
            callback.on_flush_error(message.clone());
        }
    });
}

unsafe extern "C" fn fatal_error_wrapper(
    user_data: *mut c_void,
    message: *const c_char,
    message_len: usize,
) {
    let registry = &*(user_data as *mut NotificationCallbackRegistry);
    let message = c_helpers::cast_string(message, message_len);
    guard(registry, "fatal error", || {
        if let Some(callback) = &registry.fatal_error {
            callback.on_fatal_error(message.clone());
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_wrappers_dispatch_to_registered_handler() {
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = hits.clone();
        let mut registry = NotificationCallbackRegistry::new().on_warning_unset(
            move |warning: Warning| {
                assert_eq!(warning, Warning::LargeWorkInvalidChain);
                hits_clone.fetch_add(1, Ordering::SeqCst);
            },
        );
        unsafe {
            warning_unset_wrapper(
                &mut registry as *mut _ as *mut c_void,
                bitcoinkernel_sys::BTCK_WARNING_LARGE_WORK_INVALID_CHAIN,
            );
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_wrappers_skip_unregistered_handlers() {
        let mut registry = NotificationCallbackRegistry::new();
        unsafe {
            header_tip_wrapper(&mut registry as *mut _ as *mut c_void, 2, 100, 1_600_000_000, 0);
            flush_error_wrapper(&mut registry as *mut _ as *mut c_void, std::ptr::null(), 0);
        }
    }

    #[test]
    fn test_panicking_handler_reaches_fatal_error_handler() {
        let fatals = Arc::new(AtomicUsize::new(0));
        let fatals_clone = fatals.clone();
        let mut registry = NotificationCallbackRegistry::new()
            .on_warning_unset(|_: Warning| panic!("handler bug"))
            .on_fatal_error(move |message: String| {
                assert!(message.contains("panicked"));
                fatals_clone.fetch_add(1, Ordering::SeqCst);
            });
        unsafe {
            warning_unset_wrapper(
                &mut registry as *mut _ as *mut c_void,
                bitcoinkernel_sys::BTCK_WARNING_UNKNOWN_NEW_RULES_ACTIVATED,
            );
        }
        assert_eq!(fatals.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_code_is_contained() {
        // An unknown warning code panics during decoding; the guard keeps
        // it on this side of the boundary.
        let mut registry =
            NotificationCallbackRegistry::new().on_warning_unset(|_: Warning| {});
        unsafe {
            warning_unset_wrapper(&mut registry as *mut _ as *mut c_void, 250);
        }
    }
}
