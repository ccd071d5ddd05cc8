//! Connection to the engine's internal log stream.
//!
//! The engine writes its log through a registered callback; dropping the
//! [`Logger`] disconnects it again. This is independent of the crate's own
//! diagnostics, which go through the `log` facade.

use std::os::raw::{c_char, c_void};
use std::panic::{catch_unwind, AssertUnwindSafe};

use bitcoinkernel_sys::{
    btck_logging_connection_create, btck_logging_connection_destroy, btck_logging_disable,
    btck_logging_disable_category, btck_logging_enable_category, btck_logging_set_level_category,
    btck_LogCategory, btck_LogLevel, btck_LoggingConnection, btck_LoggingOptions,
    BTCK_LOG_CATEGORY_ALL, BTCK_LOG_CATEGORY_BENCH, BTCK_LOG_CATEGORY_BLOCKSTORAGE,
    BTCK_LOG_CATEGORY_COINDB, BTCK_LOG_CATEGORY_KERNEL, BTCK_LOG_CATEGORY_LEVELDB,
    BTCK_LOG_CATEGORY_MEMPOOL, BTCK_LOG_CATEGORY_PRUNE, BTCK_LOG_CATEGORY_RAND,
    BTCK_LOG_CATEGORY_REINDEX, BTCK_LOG_CATEGORY_VALIDATION, BTCK_LOG_LEVEL_DEBUG,
    BTCK_LOG_LEVEL_INFO, BTCK_LOG_LEVEL_TRACE,
};

use crate::ffi::arena::Arena;
use crate::ffi::c_helpers;
use crate::ffi::handle::{impl_native_drop, NativeHandle};
use crate::KernelError;

impl_native_drop!(btck_LoggingConnection, btck_logging_connection_destroy);

/// Sink for engine log lines. Messages arrive with their trailing newline
/// stripped, possibly from engine worker threads.
pub trait Log: Send + Sync {
    fn log(&self, message: &str);
}

impl<F> Log for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, message: &str) {
        self(message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    All,
    Bench,
    BlockStorage,
    CoinDb,
    LevelDb,
    Mempool,
    Prune,
    Rand,
    Reindex,
    Validation,
    Kernel,
}

impl From<LogCategory> for btck_LogCategory {
    fn from(category: LogCategory) -> Self {
        match category {
            LogCategory::All => BTCK_LOG_CATEGORY_ALL,
            LogCategory::Bench => BTCK_LOG_CATEGORY_BENCH,
            LogCategory::BlockStorage => BTCK_LOG_CATEGORY_BLOCKSTORAGE,
            LogCategory::CoinDb => BTCK_LOG_CATEGORY_COINDB,
            LogCategory::LevelDb => BTCK_LOG_CATEGORY_LEVELDB,
            LogCategory::Mempool => BTCK_LOG_CATEGORY_MEMPOOL,
            LogCategory::Prune => BTCK_LOG_CATEGORY_PRUNE,
            LogCategory::Rand => BTCK_LOG_CATEGORY_RAND,
            LogCategory::Reindex => BTCK_LOG_CATEGORY_REINDEX,
            LogCategory::Validation => BTCK_LOG_CATEGORY_VALIDATION,
            LogCategory::Kernel => BTCK_LOG_CATEGORY_KERNEL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
}

impl From<LogLevel> for btck_LogLevel {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => BTCK_LOG_LEVEL_TRACE,
            LogLevel::Debug => BTCK_LOG_LEVEL_DEBUG,
            LogLevel::Info => BTCK_LOG_LEVEL_INFO,
        }
    }
}

/// An open connection to the engine's log. Disconnects on drop.
pub struct Logger {
    inner: NativeHandle<btck_LoggingConnection>,
    // Declared after `inner`: the connection is destroyed before the sink.
    #[allow(dead_code)]
    callbacks: Arena,
}

unsafe impl Send for Logger {}
unsafe impl Sync for Logger {}

impl Logger {
    pub fn new(sink: impl Log + 'static) -> Result<Self, KernelError> {
        let mut callbacks = Arena::new();
        let sink = callbacks.adopt(Box::new(sink) as Box<dyn Log>);
        let options = btck_LoggingOptions {
            log_timestamps: 1,
            log_time_micros: 0,
            log_threadnames: 0,
            log_sourcelocations: 0,
            always_print_category_levels: 0,
        };
        let ptr = unsafe {
            btck_logging_connection_create(Some(log_wrapper), sink as *mut c_void, None, options)
        };
        Ok(Logger {
            inner: NativeHandle::wrap(ptr, "logging connection")?,
            callbacks,
        })
    }

    pub fn close(&mut self) {
        self.inner.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// Sets the level at which `category` is logged.
    pub fn set_level_category(
        &self,
        category: LogCategory,
        level: LogLevel,
    ) -> Result<(), KernelError> {
        let result = unsafe { btck_logging_set_level_category(category.into(), level.into()) };
        if c_helpers::success(result) {
            Ok(())
        } else {
            Err(KernelError::InvalidState("setting log level failed".to_string()))
        }
    }

    pub fn enable_category(&self, category: LogCategory) -> Result<(), KernelError> {
        let result = unsafe { btck_logging_enable_category(category.into()) };
        if c_helpers::success(result) {
            Ok(())
        } else {
            Err(KernelError::InvalidState("enabling log category failed".to_string()))
        }
    }

    pub fn disable_category(&self, category: LogCategory) -> Result<(), KernelError> {
        let result = unsafe { btck_logging_disable_category(category.into()) };
        if c_helpers::success(result) {
            Ok(())
        } else {
            Err(KernelError::InvalidState("disabling log category failed".to_string()))
        }
    }
}

/// Turns the engine's logging off globally, independent of any connection.
pub fn disable_logging() {
    unsafe { btck_logging_disable() };
}

unsafe extern "C" fn log_wrapper(
    user_data: *mut c_void,
    message: *const c_char,
    message_len: usize,
) {
    let message = c_helpers::cast_string(message, message_len);
    let result = catch_unwind(AssertUnwindSafe(|| {
        let sink = &*(user_data as *mut Box<dyn Log>);
        sink.log(message.trim_end_matches('\n'));
    }));
    if result.is_err() {
        log::error!("log sink panicked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_wrapper_strips_newline_and_contains_panics() {
        let mut sink: Box<dyn Log> = Box::new(|message: &str| {
            assert_eq!(message, "hello");
        });
        let line = b"hello\n";
        unsafe {
            log_wrapper(
                &mut sink as *mut Box<dyn Log> as *mut c_void,
                line.as_ptr() as *const c_char,
                line.len(),
            );
        }

        let mut panicking: Box<dyn Log> = Box::new(|_: &str| panic!("sink bug"));
        unsafe {
            log_wrapper(
                &mut panicking as *mut Box<dyn Log> as *mut c_void,
                line.as_ptr() as *const c_char,
                line.len(),
            );
        }
    }
}
