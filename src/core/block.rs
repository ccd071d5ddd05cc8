// Copyright (c) 2023-present The Bitcoin Kernel developers
// Licensed under the MIT License. See LICENSE file in the project root.

use std::fmt;
use std::marker::PhantomData;

use bitcoinkernel_sys::{
    btck_block_copy, btck_block_count_transactions, btck_block_create, btck_block_destroy,
    btck_block_get_hash, btck_block_get_transaction_at, btck_block_hash_destroy,
    btck_block_to_bytes, btck_Block, btck_BlockHash,
};

use crate::core::transaction::TransactionRef;
use crate::ffi::handle::{impl_native_copy, impl_native_drop, NativeHandle};
use crate::ffi::sealed::{AsPtr, FromPtr};
use crate::{c_serialize, KernelError};

impl_native_drop!(btck_Block, btck_block_destroy);
impl_native_copy!(btck_Block, btck_block_copy);

/// A block hash, copied out of the engine into plain Rust data. Stored in
/// internal byte order; displayed in the conventional reversed hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHash {
    pub hash: [u8; 32],
}

impl BlockHash {
    /// Copies the hash out of a caller-owned C object and releases it.
    pub(crate) fn from_raw(ptr: *mut btck_BlockHash) -> Result<Self, KernelError> {
        if ptr.is_null() {
            return Err(KernelError::InvalidHandle("block hash".to_string()));
        }
        let hash = unsafe { (*ptr).hash };
        unsafe { btck_block_hash_destroy(ptr) };
        Ok(BlockHash { hash })
    }

    pub(crate) fn as_raw(&self) -> btck_BlockHash {
        btck_BlockHash { hash: self.hash }
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bytes = self.hash;
        bytes.reverse();
        write!(f, "{}", hex::encode(bytes))
    }
}

/// A block, owned by this handle.
pub struct Block {
    inner: NativeHandle<btck_Block>,
}

unsafe impl Send for Block {}
unsafe impl Sync for Block {}

impl Block {
    /// Deserializes a consensus-encoded block. This only checks that the
    /// encoding is well formed; validation happens in
    /// [`crate::ChainstateManager::process_block`].
    pub fn new(raw: &[u8]) -> Result<Self, KernelError> {
        let ptr = unsafe { btck_block_create(raw.as_ptr() as *const _, raw.len()) };
        Ok(Block {
            inner: NativeHandle::wrap(ptr, "block")?,
        })
    }

    pub fn close(&mut self) {
        self.inner.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    pub fn try_clone(&self) -> Result<Self, KernelError> {
        Ok(Block {
            inner: self.inner.try_clone("block")?,
        })
    }

    pub(crate) fn from_owned_ptr(ptr: *mut btck_Block) -> Result<Self, KernelError> {
        Ok(Block {
            inner: NativeHandle::wrap(ptr, "block")?,
        })
    }
}

impl AsPtr<btck_Block> for Block {
    fn as_ptr(&self) -> Result<*const btck_Block, KernelError> {
        self.inner.get()
    }
}

impl TryFrom<&[u8]> for Block {
    type Error = KernelError;

    fn try_from(raw: &[u8]) -> Result<Self, Self::Error> {
        Block::new(raw)
    }
}

/// Borrowed view of a block owned by the engine, handed out during
/// validation callbacks. Valid only for the duration of the callback.
#[derive(Copy, Clone)]
pub struct BlockRef<'a> {
    ptr: *const btck_Block,
    marker: PhantomData<&'a btck_Block>,
}

unsafe impl Send for BlockRef<'_> {}
unsafe impl Sync for BlockRef<'_> {}

impl BlockRef<'_> {
    /// Promotes the view to an owned block that survives the callback.
    pub fn to_owned(&self) -> Result<Block, KernelError> {
        let ptr = unsafe { btck_block_copy(self.ptr) };
        Block::from_owned_ptr(ptr)
    }
}

impl<'a> FromPtr<'a> for BlockRef<'a> {
    type Target = btck_Block;

    unsafe fn from_ptr(ptr: *const btck_Block) -> Self {
        debug_assert!(!ptr.is_null());
        BlockRef {
            ptr,
            marker: PhantomData,
        }
    }
}

impl AsPtr<btck_Block> for BlockRef<'_> {
    fn as_ptr(&self) -> Result<*const btck_Block, KernelError> {
        Ok(self.ptr)
    }
}

/// Accessors shared by [`Block`] and [`BlockRef`].
pub trait BlockExt: AsPtr<btck_Block> {
    fn hash(&self) -> Result<BlockHash, KernelError> {
        BlockHash::from_raw(unsafe { btck_block_get_hash(self.as_ptr()?) })
    }

    fn transaction_count(&self) -> Result<usize, KernelError> {
        Ok(unsafe { btck_block_count_transactions(self.as_ptr()?) })
    }

    /// Fails with [`KernelError::OutOfRange`] past the last transaction.
    fn transaction(&self, index: usize) -> Result<TransactionRef<'_>, KernelError> {
        let ptr = self.as_ptr()?;
        if index >= unsafe { btck_block_count_transactions(ptr) } {
            return Err(KernelError::OutOfRange);
        }
        Ok(unsafe { TransactionRef::from_ptr(btck_block_get_transaction_at(ptr, index)) })
    }

    /// Serializes back to consensus encoding.
    fn to_bytes(&self) -> Result<Vec<u8>, KernelError> {
        let ptr = self.as_ptr()?;
        c_serialize(|writer, user_data| unsafe { btck_block_to_bytes(ptr, writer, user_data) })
    }
}

impl<T: AsPtr<btck_Block>> BlockExt for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_hash_display_reverses() {
        let mut hash = [0u8; 32];
        hash[0] = 0xab;
        let display = BlockHash { hash }.to_string();
        assert!(display.starts_with("00"));
        assert!(display.ends_with("ab"));
        assert_eq!(display.len(), 64);
    }

    #[test]
    fn test_block_hash_round_trips_through_raw() {
        let hash = BlockHash { hash: [0x42; 32] };
        assert_eq!(hash.as_raw().hash, [0x42; 32]);
    }
}
