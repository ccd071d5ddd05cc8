// Copyright (c) 2023-present The Bitcoin Kernel developers
// Licensed under the MIT License. See LICENSE file in the project root.

//! Internal plumbing shared by every binding module: conventions for the C
//! API's integer results, the owning handle wrapper, and the arena backing
//! callback state.

pub(crate) mod arena;
pub(crate) mod c_helpers;
pub(crate) mod handle;

pub(crate) mod sealed {
    use crate::KernelError;

    /// Fallible read access to the underlying C object. Owned wrappers
    /// surface [`KernelError::ClosedResource`] after `close()`; borrowed
    /// views never fail.
    pub trait AsPtr<T> {
        fn as_ptr(&self) -> Result<*const T, KernelError>;
    }

    /// Construction of a borrowed view from a non-null C pointer whose
    /// lifetime is managed elsewhere.
    pub trait FromPtr<'a> {
        type Target;

        /// # Safety
        /// `ptr` must be non-null and valid for the lifetime `'a`.
        unsafe fn from_ptr(ptr: *const Self::Target) -> Self;
    }
}
