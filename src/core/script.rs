use std::marker::PhantomData;

use bitcoinkernel_sys::{
    btck_script_pubkey_copy, btck_script_pubkey_create, btck_script_pubkey_destroy,
    btck_script_pubkey_to_bytes, btck_ScriptPubkey,
};

use crate::ffi::handle::{impl_native_copy, impl_native_drop, NativeHandle};
use crate::ffi::sealed::{AsPtr, FromPtr};
use crate::{c_serialize, KernelError};

impl_native_drop!(btck_ScriptPubkey, btck_script_pubkey_destroy);
impl_native_copy!(btck_ScriptPubkey, btck_script_pubkey_copy);

/// A single script pubkey, owned by this handle.
pub struct ScriptPubkey {
    inner: NativeHandle<btck_ScriptPubkey>,
}

unsafe impl Send for ScriptPubkey {}
unsafe impl Sync for ScriptPubkey {}

impl ScriptPubkey {
    /// Wraps raw script bytes. The engine accepts any byte string here;
    /// validity is only decided at verification time.
    pub fn new(raw: &[u8]) -> Result<Self, KernelError> {
        let ptr = unsafe { btck_script_pubkey_create(raw.as_ptr() as *const _, raw.len()) };
        Ok(ScriptPubkey {
            inner: NativeHandle::wrap(ptr, "script pubkey")?,
        })
    }

    /// Releases the underlying engine object. Idempotent; subsequent
    /// accessor calls fail with [`KernelError::ClosedResource`].
    pub fn close(&mut self) {
        self.inner.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// Deep copy with its own lifetime.
    pub fn try_clone(&self) -> Result<Self, KernelError> {
        Ok(ScriptPubkey {
            inner: self.inner.try_clone("script pubkey")?,
        })
    }

    pub fn as_script_ref(&self) -> Result<ScriptPubkeyRef<'_>, KernelError> {
        Ok(unsafe { ScriptPubkeyRef::from_ptr(self.inner.get()?) })
    }
}

impl AsPtr<btck_ScriptPubkey> for ScriptPubkey {
    fn as_ptr(&self) -> Result<*const btck_ScriptPubkey, KernelError> {
        self.inner.get()
    }
}

impl TryFrom<&[u8]> for ScriptPubkey {
    type Error = KernelError;

    fn try_from(raw: &[u8]) -> Result<Self, Self::Error> {
        ScriptPubkey::new(raw)
    }
}

/// Borrowed view of a script pubkey living inside another engine object.
/// Valid only while the parent is alive and open.
#[derive(Copy, Clone)]
pub struct ScriptPubkeyRef<'a> {
    ptr: *const btck_ScriptPubkey,
    marker: PhantomData<&'a btck_ScriptPubkey>,
}

unsafe impl Send for ScriptPubkeyRef<'_> {}
unsafe impl Sync for ScriptPubkeyRef<'_> {}

impl ScriptPubkeyRef<'_> {
    /// Promotes the borrowed view to an owned, independently released copy.
    pub fn to_owned(&self) -> Result<ScriptPubkey, KernelError> {
        let ptr = unsafe { btck_script_pubkey_copy(self.ptr) };
        Ok(ScriptPubkey {
            inner: NativeHandle::wrap(ptr, "script pubkey")?,
        })
    }
}

impl<'a> FromPtr<'a> for ScriptPubkeyRef<'a> {
    type Target = btck_ScriptPubkey;

    unsafe fn from_ptr(ptr: *const btck_ScriptPubkey) -> Self {
        debug_assert!(!ptr.is_null());
        ScriptPubkeyRef {
            ptr,
            marker: PhantomData,
        }
    }
}

impl AsPtr<btck_ScriptPubkey> for ScriptPubkeyRef<'_> {
    fn as_ptr(&self) -> Result<*const btck_ScriptPubkey, KernelError> {
        Ok(self.ptr)
    }
}

/// Accessors shared by [`ScriptPubkey`] and [`ScriptPubkeyRef`].
pub trait ScriptPubkeyExt: AsPtr<btck_ScriptPubkey> {
    /// Serializes the script back to its raw byte form.
    fn to_bytes(&self) -> Result<Vec<u8>, KernelError> {
        let ptr = self.as_ptr()?;
        c_serialize(|writer, user_data| unsafe {
            btck_script_pubkey_to_bytes(ptr, writer, user_data)
        })
    }
}

impl<T: AsPtr<btck_ScriptPubkey>> ScriptPubkeyExt for T {}
