use std::marker::PhantomData;

use bitcoinkernel_sys::{
    btck_transaction_copy, btck_transaction_count_inputs, btck_transaction_count_outputs,
    btck_transaction_create, btck_transaction_destroy, btck_transaction_get_input_at,
    btck_transaction_get_output_at, btck_transaction_get_txid, btck_transaction_input_get_out_point,
    btck_transaction_out_point_get_hash, btck_transaction_out_point_get_index,
    btck_transaction_output_copy, btck_transaction_output_create, btck_transaction_output_destroy,
    btck_transaction_output_get_amount, btck_transaction_output_get_script_pubkey,
    btck_transaction_to_bytes, btck_txid_copy, btck_txid_destroy, btck_txid_to_bytes,
    btck_Transaction, btck_TransactionInput, btck_TransactionOutput, btck_Txid,
};

use crate::core::script::{ScriptPubkey, ScriptPubkeyRef};
use crate::ffi::handle::{impl_native_copy, impl_native_drop, NativeHandle};
use crate::ffi::sealed::{AsPtr, FromPtr};
use crate::{c_serialize, KernelError};

impl_native_drop!(btck_Transaction, btck_transaction_destroy);
impl_native_copy!(btck_Transaction, btck_transaction_copy);
impl_native_drop!(btck_TransactionOutput, btck_transaction_output_destroy);
impl_native_copy!(btck_TransactionOutput, btck_transaction_output_copy);
impl_native_drop!(btck_Txid, btck_txid_destroy);
impl_native_copy!(btck_Txid, btck_txid_copy);

/// A deserialized transaction, owned by this handle.
pub struct Transaction {
    inner: NativeHandle<btck_Transaction>,
}

unsafe impl Send for Transaction {}
unsafe impl Sync for Transaction {}

impl Transaction {
    /// Deserializes a consensus-encoded transaction. Fails with
    /// [`KernelError::InvalidHandle`] when the engine rejects the encoding.
    pub fn new(raw: &[u8]) -> Result<Self, KernelError> {
        let ptr = unsafe { btck_transaction_create(raw.as_ptr() as *const _, raw.len()) };
        Ok(Transaction {
            inner: NativeHandle::wrap(ptr, "transaction")?,
        })
    }

    pub fn close(&mut self) {
        self.inner.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    pub fn try_clone(&self) -> Result<Self, KernelError> {
        Ok(Transaction {
            inner: self.inner.try_clone("transaction")?,
        })
    }

    pub fn as_transaction_ref(&self) -> Result<TransactionRef<'_>, KernelError> {
        Ok(unsafe { TransactionRef::from_ptr(self.inner.get()?) })
    }
}

impl AsPtr<btck_Transaction> for Transaction {
    fn as_ptr(&self) -> Result<*const btck_Transaction, KernelError> {
        self.inner.get()
    }
}

impl TryFrom<&[u8]> for Transaction {
    type Error = KernelError;

    fn try_from(raw: &[u8]) -> Result<Self, Self::Error> {
        Transaction::new(raw)
    }
}

/// Borrowed view of a transaction owned by another engine object, e.g. a
/// block. Valid only while the parent is alive and open.
#[derive(Copy, Clone)]
pub struct TransactionRef<'a> {
    ptr: *const btck_Transaction,
    marker: PhantomData<&'a btck_Transaction>,
}

unsafe impl Send for TransactionRef<'_> {}
unsafe impl Sync for TransactionRef<'_> {}

impl TransactionRef<'_> {
    pub fn to_owned(&self) -> Result<Transaction, KernelError> {
        let ptr = unsafe { btck_transaction_copy(self.ptr) };
        Ok(Transaction {
            inner: NativeHandle::wrap(ptr, "transaction")?,
        })
    }
}

impl<'a> FromPtr<'a> for TransactionRef<'a> {
    type Target = btck_Transaction;

    unsafe fn from_ptr(ptr: *const btck_Transaction) -> Self {
        debug_assert!(!ptr.is_null());
        TransactionRef {
            ptr,
            marker: PhantomData,
        }
    }
}

impl AsPtr<btck_Transaction> for TransactionRef<'_> {
    fn as_ptr(&self) -> Result<*const btck_Transaction, KernelError> {
        Ok(self.ptr)
    }
}

/// Accessors shared by [`Transaction`] and [`TransactionRef`].
pub trait TransactionExt: AsPtr<btck_Transaction> {
    fn input_count(&self) -> Result<usize, KernelError> {
        Ok(unsafe { btck_transaction_count_inputs(self.as_ptr()?) })
    }

    fn output_count(&self) -> Result<usize, KernelError> {
        Ok(unsafe { btck_transaction_count_outputs(self.as_ptr()?) })
    }

    /// Fails with [`KernelError::OutOfRange`] past the last input.
    fn input(&self, index: usize) -> Result<TxInRef<'_>, KernelError> {
        let ptr = self.as_ptr()?;
        if index >= unsafe { btck_transaction_count_inputs(ptr) } {
            return Err(KernelError::OutOfRange);
        }
        Ok(unsafe { TxInRef::from_ptr(btck_transaction_get_input_at(ptr, index)) })
    }

    /// Fails with [`KernelError::OutOfRange`] past the last output.
    fn output(&self, index: usize) -> Result<TxOutRef<'_>, KernelError> {
        let ptr = self.as_ptr()?;
        if index >= unsafe { btck_transaction_count_outputs(ptr) } {
            return Err(KernelError::OutOfRange);
        }
        Ok(unsafe { TxOutRef::from_ptr(btck_transaction_get_output_at(ptr, index)) })
    }

    fn txid(&self) -> Result<TxidRef<'_>, KernelError> {
        Ok(unsafe { TxidRef::from_ptr(btck_transaction_get_txid(self.as_ptr()?)) })
    }

    /// Serializes back to consensus encoding.
    fn to_bytes(&self) -> Result<Vec<u8>, KernelError> {
        let ptr = self.as_ptr()?;
        c_serialize(|writer, user_data| unsafe {
            btck_transaction_to_bytes(ptr, writer, user_data)
        })
    }
}

impl<T: AsPtr<btck_Transaction>> TransactionExt for T {}

/// Borrowed view of one transaction input. The previous-output reference is
/// exposed directly; inputs have no owned counterpart in this crate.
#[derive(Copy, Clone)]
pub struct TxInRef<'a> {
    ptr: *const btck_TransactionInput,
    marker: PhantomData<&'a btck_TransactionInput>,
}

unsafe impl Send for TxInRef<'_> {}
unsafe impl Sync for TxInRef<'_> {}

impl TxInRef<'_> {
    /// Txid of the output this input spends.
    pub fn prevout_txid(&self) -> TxidRef<'_> {
        unsafe {
            let out_point = btck_transaction_input_get_out_point(self.ptr);
            TxidRef::from_ptr(btck_transaction_out_point_get_hash(out_point))
        }
    }

    /// Output index of the output this input spends.
    pub fn prevout_index(&self) -> u32 {
        unsafe {
            let out_point = btck_transaction_input_get_out_point(self.ptr);
            btck_transaction_out_point_get_index(out_point)
        }
    }
}

impl<'a> FromPtr<'a> for TxInRef<'a> {
    type Target = btck_TransactionInput;

    unsafe fn from_ptr(ptr: *const btck_TransactionInput) -> Self {
        debug_assert!(!ptr.is_null());
        TxInRef {
            ptr,
            marker: PhantomData,
        }
    }
}

/// A transaction output, owned by this handle.
pub struct TxOut {
    inner: NativeHandle<btck_TransactionOutput>,
}

unsafe impl Send for TxOut {}
unsafe impl Sync for TxOut {}

impl TxOut {
    pub fn new(script_pubkey: &ScriptPubkey, amount: i64) -> Result<Self, KernelError> {
        let ptr = unsafe { btck_transaction_output_create(script_pubkey.as_ptr()?, amount) };
        Ok(TxOut {
            inner: NativeHandle::wrap(ptr, "transaction output")?,
        })
    }

    pub fn close(&mut self) {
        self.inner.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    pub fn try_clone(&self) -> Result<Self, KernelError> {
        Ok(TxOut {
            inner: self.inner.try_clone("transaction output")?,
        })
    }
}

impl AsPtr<btck_TransactionOutput> for TxOut {
    fn as_ptr(&self) -> Result<*const btck_TransactionOutput, KernelError> {
        self.inner.get()
    }
}

/// Borrowed view of a transaction output inside a parent object.
#[derive(Copy, Clone)]
pub struct TxOutRef<'a> {
    ptr: *const btck_TransactionOutput,
    marker: PhantomData<&'a btck_TransactionOutput>,
}

unsafe impl Send for TxOutRef<'_> {}
unsafe impl Sync for TxOutRef<'_> {}

impl TxOutRef<'_> {
    pub fn to_owned(&self) -> Result<TxOut, KernelError> {
        let ptr = unsafe { btck_transaction_output_copy(self.ptr) };
        Ok(TxOut {
            inner: NativeHandle::wrap(ptr, "transaction output")?,
        })
    }
}

impl<'a> FromPtr<'a> for TxOutRef<'a> {
    type Target = btck_TransactionOutput;

    unsafe fn from_ptr(ptr: *const btck_TransactionOutput) -> Self {
        debug_assert!(!ptr.is_null());
        TxOutRef {
            ptr,
            marker: PhantomData,
        }
    }
}

impl AsPtr<btck_TransactionOutput> for TxOutRef<'_> {
    fn as_ptr(&self) -> Result<*const btck_TransactionOutput, KernelError> {
        Ok(self.ptr)
    }
}

/// Accessors shared by [`TxOut`] and [`TxOutRef`].
pub trait TxOutExt: AsPtr<btck_TransactionOutput> {
    /// Amount in satoshis.
    fn value(&self) -> Result<i64, KernelError> {
        Ok(unsafe { btck_transaction_output_get_amount(self.as_ptr()?) })
    }

    fn script_pubkey(&self) -> Result<ScriptPubkeyRef<'_>, KernelError> {
        Ok(unsafe {
            ScriptPubkeyRef::from_ptr(btck_transaction_output_get_script_pubkey(self.as_ptr()?))
        })
    }
}

impl<T: AsPtr<btck_TransactionOutput>> TxOutExt for T {}

/// A transaction id, owned by this handle.
pub struct Txid {
    inner: NativeHandle<btck_Txid>,
}

unsafe impl Send for Txid {}
unsafe impl Sync for Txid {}

impl Txid {
    pub fn close(&mut self) {
        self.inner.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

impl AsPtr<btck_Txid> for Txid {
    fn as_ptr(&self) -> Result<*const btck_Txid, KernelError> {
        self.inner.get()
    }
}

/// Borrowed view of a txid inside a parent object.
#[derive(Copy, Clone)]
pub struct TxidRef<'a> {
    ptr: *const btck_Txid,
    marker: PhantomData<&'a btck_Txid>,
}

unsafe impl Send for TxidRef<'_> {}
unsafe impl Sync for TxidRef<'_> {}

impl TxidRef<'_> {
    pub fn to_owned(&self) -> Result<Txid, KernelError> {
        let ptr = unsafe { btck_txid_copy(self.ptr) };
        Ok(Txid {
            inner: NativeHandle::wrap(ptr, "txid")?,
        })
    }
}

impl<'a> FromPtr<'a> for TxidRef<'a> {
    type Target = btck_Txid;

    unsafe fn from_ptr(ptr: *const btck_Txid) -> Self {
        debug_assert!(!ptr.is_null());
        TxidRef {
            ptr,
            marker: PhantomData,
        }
    }
}

impl AsPtr<btck_Txid> for TxidRef<'_> {
    fn as_ptr(&self) -> Result<*const btck_Txid, KernelError> {
        Ok(self.ptr)
    }
}

/// Accessors shared by [`Txid`] and [`TxidRef`].
pub trait TxidExt: AsPtr<btck_Txid> {
    /// The 32 byte hash in internal byte order.
    fn to_byte_array(&self) -> Result<[u8; 32], KernelError> {
        let ptr = self.as_ptr()?;
        let mut bytes = [0u8; 32];
        unsafe { btck_txid_to_bytes(ptr, bytes.as_mut_ptr(), bytes.len()) };
        Ok(bytes)
    }

    /// Display form: reversed hex, as used everywhere user-facing.
    fn to_hex(&self) -> Result<String, KernelError> {
        let mut bytes = self.to_byte_array()?;
        bytes.reverse();
        Ok(hex::encode(bytes))
    }
}

impl<T: AsPtr<btck_Txid>> TxidExt for T {}
