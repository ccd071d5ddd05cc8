//! Owning wrapper for a single C object.
//!
//! Every owned type in the crate wraps a [`NativeHandle`], which implements
//! the release state machine exactly once: a handle is open until `close()`
//! is called, `close()` runs the C destructor exactly once and is idempotent,
//! and every access after that fails with [`KernelError::ClosedResource`].
//! Dropping an open handle closes it.

use crate::KernelError;

/// Implemented for C types with a `*_destroy` entry point.
///
/// # Safety
/// `destroy` must be safe to call exactly once on any non-null pointer
/// previously returned by the type's `*_create`/`*_copy` functions.
pub unsafe trait NativeDrop {
    unsafe fn native_drop(ptr: *mut Self);
}

/// Implemented for C types with a `*_copy` entry point producing a new
/// caller-owned object.
///
/// # Safety
/// `copy` must return either null or a pointer the caller owns.
pub unsafe trait NativeCopy: NativeDrop {
    unsafe fn native_copy(ptr: *const Self) -> *mut Self;
}

pub struct NativeHandle<T: NativeDrop> {
    /// Null once the handle is closed.
    ptr: *mut T,
}

impl<T: NativeDrop> NativeHandle<T> {
    /// Takes ownership of `ptr`. A null pointer means the C constructor
    /// rejected its input and becomes [`KernelError::InvalidHandle`].
    pub fn wrap(ptr: *mut T, what: &str) -> Result<Self, KernelError> {
        if ptr.is_null() {
            Err(KernelError::InvalidHandle(what.to_string()))
        } else {
            Ok(NativeHandle { ptr })
        }
    }

    pub fn get(&self) -> Result<*const T, KernelError> {
        if self.ptr.is_null() {
            Err(KernelError::ClosedResource)
        } else {
            Ok(self.ptr as *const T)
        }
    }

    pub fn get_mut(&mut self) -> Result<*mut T, KernelError> {
        if self.ptr.is_null() {
            Err(KernelError::ClosedResource)
        } else {
            Ok(self.ptr)
        }
    }

    pub fn is_closed(&self) -> bool {
        self.ptr.is_null()
    }

    /// Releases the underlying C object. Further calls are no-ops.
    pub fn close(&mut self) {
        if !self.ptr.is_null() {
            unsafe { T::native_drop(self.ptr) };
            self.ptr = std::ptr::null_mut();
        }
    }

    /// Deep copy through the C API, yielding an independently owned handle.
    pub fn try_clone(&self, what: &str) -> Result<Self, KernelError>
    where
        T: NativeCopy,
    {
        let ptr = self.get()?;
        NativeHandle::wrap(unsafe { T::native_copy(ptr) }, what)
    }
}

impl<T: NativeDrop> Drop for NativeHandle<T> {
    fn drop(&mut self) {
        self.close();
    }
}

macro_rules! impl_native_drop {
    ($ty:ty, $destroy:path) => {
        unsafe impl crate::ffi::handle::NativeDrop for $ty {
            unsafe fn native_drop(ptr: *mut Self) {
                $destroy(ptr);
            }
        }
    };
}

macro_rules! impl_native_copy {
    ($ty:ty, $copy:path) => {
        unsafe impl crate::ffi::handle::NativeCopy for $ty {
            unsafe fn native_copy(ptr: *const Self) -> *mut Self {
                $copy(ptr)
            }
        }
    };
}

pub(crate) use impl_native_copy;
pub(crate) use impl_native_drop;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static DROPS: AtomicUsize = AtomicUsize::new(0);
    static COPIES: AtomicUsize = AtomicUsize::new(0);

    struct Fake(u8);

    unsafe impl NativeDrop for Fake {
        unsafe fn native_drop(ptr: *mut Self) {
            DROPS.fetch_add(1, Ordering::SeqCst);
            drop(Box::from_raw(ptr));
        }
    }

    unsafe impl NativeCopy for Fake {
        unsafe fn native_copy(ptr: *const Self) -> *mut Self {
            COPIES.fetch_add(1, Ordering::SeqCst);
            Box::into_raw(Box::new(Fake((*ptr).0)))
        }
    }

    fn fake() -> NativeHandle<Fake> {
        NativeHandle::wrap(Box::into_raw(Box::new(Fake(7))), "fake").unwrap()
    }

    #[test]
    fn test_wrap_null_is_invalid_handle() {
        let res = NativeHandle::<Fake>::wrap(std::ptr::null_mut(), "fake");
        assert!(matches!(res, Err(KernelError::InvalidHandle(_))));
    }

    #[test]
    fn test_close_is_idempotent() {
        let before = DROPS.load(Ordering::SeqCst);
        let mut handle = fake();
        assert!(!handle.is_closed());
        handle.close();
        assert!(handle.is_closed());
        handle.close();
        handle.close();
        drop(handle);
        assert_eq!(DROPS.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    fn test_access_after_close_fails() {
        let mut handle = fake();
        handle.close();
        assert!(matches!(handle.get(), Err(KernelError::ClosedResource)));
        assert!(matches!(handle.get_mut(), Err(KernelError::ClosedResource)));
        assert!(matches!(
            handle.try_clone("fake"),
            Err(KernelError::ClosedResource)
        ));
    }

    #[test]
    fn test_drop_closes_once() {
        let before = DROPS.load(Ordering::SeqCst);
        drop(fake());
        assert_eq!(DROPS.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    fn test_clone_is_independent() {
        let before = COPIES.load(Ordering::SeqCst);
        let mut original = fake();
        let copy = original.try_clone("fake").unwrap();
        assert_eq!(COPIES.load(Ordering::SeqCst), before + 1);
        original.close();
        assert!(copy.get().is_ok());
    }
}
