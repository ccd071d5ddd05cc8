//! Views over the outputs a connected block spent, as recorded in the
//! engine's undo data. The hierarchy mirrors the engine's: one
//! [`BlockSpentOutputs`] per block, one [`TransactionSpentOutputs`] per
//! non-coinbase transaction, one [`Coin`] per spent input.

use std::marker::PhantomData;

use bitcoinkernel_sys::{
    btck_block_spent_outputs_copy, btck_block_spent_outputs_count,
    btck_block_spent_outputs_destroy, btck_block_spent_outputs_get_transaction_spent_outputs_at,
    btck_coin_confirmation_height, btck_coin_copy, btck_coin_destroy, btck_coin_get_output,
    btck_coin_is_coinbase, btck_transaction_spent_outputs_copy,
    btck_transaction_spent_outputs_count, btck_transaction_spent_outputs_destroy,
    btck_transaction_spent_outputs_get_coin_at, btck_BlockSpentOutputs, btck_Coin,
    btck_TransactionSpentOutputs,
};

use crate::core::transaction::TxOutRef;
use crate::ffi::c_helpers;
use crate::ffi::handle::{impl_native_copy, impl_native_drop, NativeHandle};
use crate::ffi::sealed::{AsPtr, FromPtr};
use crate::KernelError;

impl_native_drop!(btck_BlockSpentOutputs, btck_block_spent_outputs_destroy);
impl_native_copy!(btck_BlockSpentOutputs, btck_block_spent_outputs_copy);
impl_native_drop!(
    btck_TransactionSpentOutputs,
    btck_transaction_spent_outputs_destroy
);
impl_native_copy!(
    btck_TransactionSpentOutputs,
    btck_transaction_spent_outputs_copy
);
impl_native_drop!(btck_Coin, btck_coin_destroy);
impl_native_copy!(btck_Coin, btck_coin_copy);

/// The spent outputs of a whole block, owned by this handle.
pub struct BlockSpentOutputs {
    inner: NativeHandle<btck_BlockSpentOutputs>,
}

unsafe impl Send for BlockSpentOutputs {}
unsafe impl Sync for BlockSpentOutputs {}

impl BlockSpentOutputs {
    pub(crate) fn from_owned_ptr(ptr: *mut btck_BlockSpentOutputs) -> Result<Self, KernelError> {
        Ok(BlockSpentOutputs {
            inner: NativeHandle::wrap(ptr, "block spent outputs")?,
        })
    }

    pub fn close(&mut self) {
        self.inner.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    pub fn try_clone(&self) -> Result<Self, KernelError> {
        Ok(BlockSpentOutputs {
            inner: self.inner.try_clone("block spent outputs")?,
        })
    }
}

impl AsPtr<btck_BlockSpentOutputs> for BlockSpentOutputs {
    fn as_ptr(&self) -> Result<*const btck_BlockSpentOutputs, KernelError> {
        self.inner.get()
    }
}

#[derive(Copy, Clone)]
pub struct BlockSpentOutputsRef<'a> {
    ptr: *const btck_BlockSpentOutputs,
    marker: PhantomData<&'a btck_BlockSpentOutputs>,
}

unsafe impl Send for BlockSpentOutputsRef<'_> {}
unsafe impl Sync for BlockSpentOutputsRef<'_> {}

impl BlockSpentOutputsRef<'_> {
    pub fn to_owned(&self) -> Result<BlockSpentOutputs, KernelError> {
        BlockSpentOutputs::from_owned_ptr(unsafe { btck_block_spent_outputs_copy(self.ptr) })
    }
}

impl<'a> FromPtr<'a> for BlockSpentOutputsRef<'a> {
    type Target = btck_BlockSpentOutputs;

    unsafe fn from_ptr(ptr: *const btck_BlockSpentOutputs) -> Self {
        debug_assert!(!ptr.is_null());
        BlockSpentOutputsRef {
            ptr,
            marker: PhantomData,
        }
    }
}

impl AsPtr<btck_BlockSpentOutputs> for BlockSpentOutputsRef<'_> {
    fn as_ptr(&self) -> Result<*const btck_BlockSpentOutputs, KernelError> {
        Ok(self.ptr)
    }
}

/// Accessors shared by [`BlockSpentOutputs`] and [`BlockSpentOutputsRef`].
pub trait BlockSpentOutputsExt: AsPtr<btck_BlockSpentOutputs> {
    /// Number of per-transaction entries. The coinbase spends nothing, so
    /// this is one less than the block's transaction count.
    fn count(&self) -> Result<usize, KernelError> {
        Ok(unsafe { btck_block_spent_outputs_count(self.as_ptr()?) })
    }

    /// Fails with [`KernelError::OutOfRange`] past the last entry.
    fn transaction_spent_outputs(
        &self,
        index: usize,
    ) -> Result<TransactionSpentOutputsRef<'_>, KernelError> {
        let ptr = self.as_ptr()?;
        if index >= unsafe { btck_block_spent_outputs_count(ptr) } {
            return Err(KernelError::OutOfRange);
        }
        Ok(unsafe {
            TransactionSpentOutputsRef::from_ptr(
                btck_block_spent_outputs_get_transaction_spent_outputs_at(ptr, index),
            )
        })
    }

    /// Lazy iteration; the entry count is fixed at construction, each step
    /// performs one bounds-checked lookup.
    fn iter(&self) -> Result<TransactionSpentOutputsIter<'_>, KernelError> {
        Ok(TransactionSpentOutputsIter {
            parent: unsafe { BlockSpentOutputsRef::from_ptr(self.as_ptr()?) },
            index: 0,
            count: self.count()?,
        })
    }
}

impl<T: AsPtr<btck_BlockSpentOutputs>> BlockSpentOutputsExt for T {}

pub struct TransactionSpentOutputsIter<'a> {
    parent: BlockSpentOutputsRef<'a>,
    index: usize,
    count: usize,
}

impl<'a> Iterator for TransactionSpentOutputsIter<'a> {
    type Item = TransactionSpentOutputsRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        let item = unsafe {
            TransactionSpentOutputsRef::from_ptr(
                btck_block_spent_outputs_get_transaction_spent_outputs_at(
                    self.parent.ptr,
                    self.index,
                ),
            )
        };
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.index;
        (remaining, Some(remaining))
    }
}

/// The spent outputs of a single transaction, owned by this handle.
pub struct TransactionSpentOutputs {
    inner: NativeHandle<btck_TransactionSpentOutputs>,
}

unsafe impl Send for TransactionSpentOutputs {}
unsafe impl Sync for TransactionSpentOutputs {}

impl TransactionSpentOutputs {
    pub fn close(&mut self) {
        self.inner.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    pub fn try_clone(&self) -> Result<Self, KernelError> {
        Ok(TransactionSpentOutputs {
            inner: self.inner.try_clone("transaction spent outputs")?,
        })
    }
}

impl AsPtr<btck_TransactionSpentOutputs> for TransactionSpentOutputs {
    fn as_ptr(&self) -> Result<*const btck_TransactionSpentOutputs, KernelError> {
        self.inner.get()
    }
}

#[derive(Copy, Clone)]
pub struct TransactionSpentOutputsRef<'a> {
    ptr: *const btck_TransactionSpentOutputs,
    marker: PhantomData<&'a btck_TransactionSpentOutputs>,
}

unsafe impl Send for TransactionSpentOutputsRef<'_> {}
unsafe impl Sync for TransactionSpentOutputsRef<'_> {}

impl TransactionSpentOutputsRef<'_> {
    pub fn to_owned(&self) -> Result<TransactionSpentOutputs, KernelError> {
        Ok(TransactionSpentOutputs {
            inner: NativeHandle::wrap(
                unsafe { btck_transaction_spent_outputs_copy(self.ptr) },
                "transaction spent outputs",
            )?,
        })
    }
}

impl<'a> FromPtr<'a> for TransactionSpentOutputsRef<'a> {
    type Target = btck_TransactionSpentOutputs;

    unsafe fn from_ptr(ptr: *const btck_TransactionSpentOutputs) -> Self {
        debug_assert!(!ptr.is_null());
        TransactionSpentOutputsRef {
            ptr,
            marker: PhantomData,
        }
    }
}

impl AsPtr<btck_TransactionSpentOutputs> for TransactionSpentOutputsRef<'_> {
    fn as_ptr(&self) -> Result<*const btck_TransactionSpentOutputs, KernelError> {
        Ok(self.ptr)
    }
}

/// Accessors shared by [`TransactionSpentOutputs`] and
/// [`TransactionSpentOutputsRef`].
pub trait TransactionSpentOutputsExt: AsPtr<btck_TransactionSpentOutputs> {
    /// One coin per input of the spending transaction.
    fn count(&self) -> Result<usize, KernelError> {
        Ok(unsafe { btck_transaction_spent_outputs_count(self.as_ptr()?) })
    }

    /// Fails with [`KernelError::OutOfRange`] past the last coin.
    fn coin(&self, index: usize) -> Result<CoinRef<'_>, KernelError> {
        let ptr = self.as_ptr()?;
        if index >= unsafe { btck_transaction_spent_outputs_count(ptr) } {
            return Err(KernelError::OutOfRange);
        }
        Ok(unsafe { CoinRef::from_ptr(btck_transaction_spent_outputs_get_coin_at(ptr, index)) })
    }

    fn iter(&self) -> Result<CoinIter<'_>, KernelError> {
        Ok(CoinIter {
            parent: unsafe { TransactionSpentOutputsRef::from_ptr(self.as_ptr()?) },
            index: 0,
            count: self.count()?,
        })
    }
}

impl<T: AsPtr<btck_TransactionSpentOutputs>> TransactionSpentOutputsExt for T {}

pub struct CoinIter<'a> {
    parent: TransactionSpentOutputsRef<'a>,
    index: usize,
    count: usize,
}

impl<'a> Iterator for CoinIter<'a> {
    type Item = CoinRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        let item = unsafe {
            CoinRef::from_ptr(btck_transaction_spent_outputs_get_coin_at(
                self.parent.ptr,
                self.index,
            ))
        };
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.index;
        (remaining, Some(remaining))
    }
}

/// A single spent coin: the prevout plus its creation metadata.
pub struct Coin {
    inner: NativeHandle<btck_Coin>,
}

unsafe impl Send for Coin {}
unsafe impl Sync for Coin {}

impl Coin {
    pub fn close(&mut self) {
        self.inner.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    pub fn try_clone(&self) -> Result<Self, KernelError> {
        Ok(Coin {
            inner: self.inner.try_clone("coin")?,
        })
    }
}

impl AsPtr<btck_Coin> for Coin {
    fn as_ptr(&self) -> Result<*const btck_Coin, KernelError> {
        self.inner.get()
    }
}

#[derive(Copy, Clone)]
pub struct CoinRef<'a> {
    ptr: *const btck_Coin,
    marker: PhantomData<&'a btck_Coin>,
}

unsafe impl Send for CoinRef<'_> {}
unsafe impl Sync for CoinRef<'_> {}

impl CoinRef<'_> {
    pub fn to_owned(&self) -> Result<Coin, KernelError> {
        Ok(Coin {
            inner: NativeHandle::wrap(unsafe { btck_coin_copy(self.ptr) }, "coin")?,
        })
    }
}

impl<'a> FromPtr<'a> for CoinRef<'a> {
    type Target = btck_Coin;

    unsafe fn from_ptr(ptr: *const btck_Coin) -> Self {
        debug_assert!(!ptr.is_null());
        CoinRef {
            ptr,
            marker: PhantomData,
        }
    }
}

impl AsPtr<btck_Coin> for CoinRef<'_> {
    fn as_ptr(&self) -> Result<*const btck_Coin, KernelError> {
        Ok(self.ptr)
    }
}

/// Accessors shared by [`Coin`] and [`CoinRef`].
pub trait CoinExt: AsPtr<btck_Coin> {
    /// Height of the block that created this output.
    fn confirmation_height(&self) -> Result<u32, KernelError> {
        Ok(unsafe { btck_coin_confirmation_height(self.as_ptr()?) })
    }

    fn is_coinbase(&self) -> Result<bool, KernelError> {
        Ok(c_helpers::present(unsafe {
            btck_coin_is_coinbase(self.as_ptr()?)
        }))
    }

    fn output(&self) -> Result<TxOutRef<'_>, KernelError> {
        Ok(unsafe { TxOutRef::from_ptr(btck_coin_get_output(self.as_ptr()?)) })
    }
}

impl<T: AsPtr<btck_Coin>> CoinExt for T {}
