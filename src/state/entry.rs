use std::marker::PhantomData;

use bitcoinkernel_sys::{
    btck_block_tree_entry_get_block_hash, btck_block_tree_entry_get_height,
    btck_block_tree_entry_get_previous, btck_BlockTreeEntry,
};

use crate::core::block::BlockHash;
use crate::ffi::sealed::FromPtr;
use crate::KernelError;

/// Borrowed view of one entry in the engine's block tree. Entries are owned
/// by the chainstate manager and never released individually, so the view is
/// `Copy` and its accessors are infallible where the engine's are.
#[derive(Copy, Clone)]
pub struct BlockTreeEntry<'a> {
    ptr: *const btck_BlockTreeEntry,
    marker: PhantomData<&'a btck_BlockTreeEntry>,
}

unsafe impl Send for BlockTreeEntry<'_> {}
unsafe impl Sync for BlockTreeEntry<'_> {}

impl<'a> BlockTreeEntry<'a> {
    pub fn height(&self) -> i32 {
        unsafe { btck_block_tree_entry_get_height(self.ptr) }
    }

    pub fn block_hash(&self) -> Result<BlockHash, KernelError> {
        BlockHash::from_raw(unsafe { btck_block_tree_entry_get_block_hash(self.ptr) })
    }

    /// The predecessor entry; `None` at the genesis block.
    pub fn prev(&self) -> Option<BlockTreeEntry<'a>> {
        let prev = unsafe { btck_block_tree_entry_get_previous(self.ptr) };
        if prev.is_null() {
            None
        } else {
            Some(unsafe { BlockTreeEntry::from_ptr(prev) })
        }
    }

    pub(crate) fn as_ptr(&self) -> *const btck_BlockTreeEntry {
        self.ptr
    }
}

impl<'a> FromPtr<'a> for BlockTreeEntry<'a> {
    type Target = btck_BlockTreeEntry;

    unsafe fn from_ptr(ptr: *const btck_BlockTreeEntry) -> Self {
        debug_assert!(!ptr.is_null());
        BlockTreeEntry {
            ptr,
            marker: PhantomData,
        }
    }
}
