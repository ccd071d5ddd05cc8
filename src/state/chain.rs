use std::marker::PhantomData;

use bitcoinkernel_sys::{
    btck_chain_contains, btck_chain_get_by_height, btck_chain_get_genesis, btck_chain_get_height,
    btck_chain_get_tip, btck_Chain,
};

use crate::ffi::c_helpers;
use crate::ffi::sealed::FromPtr;
use crate::state::entry::BlockTreeEntry;
use crate::KernelError;

/// Borrowed view of the active chain. The view itself holds no state; every
/// accessor queries the engine, so the answers track reorganizations as they
/// happen.
#[derive(Copy, Clone)]
pub struct Chain<'a> {
    ptr: *const btck_Chain,
    marker: PhantomData<&'a btck_Chain>,
}

unsafe impl Send for Chain<'_> {}
unsafe impl Sync for Chain<'_> {}

impl<'a> Chain<'a> {
    /// Height of the current tip. Fails with [`KernelError::InvalidState`]
    /// when the chain has no blocks at all, which only happens before the
    /// genesis block is processed.
    pub fn height(&self) -> Result<i32, KernelError> {
        let height = unsafe { btck_chain_get_height(self.ptr) };
        if height < 0 {
            return Err(KernelError::InvalidState("empty chain".to_string()));
        }
        Ok(height)
    }

    pub fn tip(&self) -> Result<BlockTreeEntry<'a>, KernelError> {
        let tip = unsafe { btck_chain_get_tip(self.ptr) };
        if tip.is_null() {
            return Err(KernelError::InvalidState("empty chain".to_string()));
        }
        Ok(unsafe { BlockTreeEntry::from_ptr(tip) })
    }

    pub fn genesis(&self) -> Result<BlockTreeEntry<'a>, KernelError> {
        let genesis = unsafe { btck_chain_get_genesis(self.ptr) };
        if genesis.is_null() {
            return Err(KernelError::InvalidState("empty chain".to_string()));
        }
        Ok(unsafe { BlockTreeEntry::from_ptr(genesis) })
    }

    /// The entry at `height` on the active chain. Fails with
    /// [`KernelError::OutOfRange`] outside `0..=tip`.
    pub fn at_height(&self, height: i32) -> Result<BlockTreeEntry<'a>, KernelError> {
        if height < 0 || height > self.height()? {
            return Err(KernelError::OutOfRange);
        }
        let entry = unsafe { btck_chain_get_by_height(self.ptr, height) };
        if entry.is_null() {
            return Err(KernelError::OutOfRange);
        }
        Ok(unsafe { BlockTreeEntry::from_ptr(entry) })
    }

    /// Whether `entry` lies on the active chain.
    pub fn contains(&self, entry: &BlockTreeEntry<'_>) -> bool {
        c_helpers::present(unsafe { btck_chain_contains(self.ptr, entry.as_ptr()) })
    }

    /// Iterates the chain from genesis to tip. Lazy and restartable: each
    /// step re-queries the engine, so a reorganization during iteration is
    /// reflected in subsequent items, and the iteration simply ends early
    /// when the chain shrinks below the cursor.
    pub fn iter(&self) -> ChainIterator<'a> {
        ChainIterator {
            chain: *self,
            next_height: 0,
        }
    }
}

impl<'a> FromPtr<'a> for Chain<'a> {
    type Target = btck_Chain;

    unsafe fn from_ptr(ptr: *const btck_Chain) -> Self {
        debug_assert!(!ptr.is_null());
        Chain {
            ptr,
            marker: PhantomData,
        }
    }
}

/// See [`Chain::iter`].
pub struct ChainIterator<'a> {
    chain: Chain<'a>,
    next_height: i32,
}

impl<'a> Iterator for ChainIterator<'a> {
    type Item = BlockTreeEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.chain.at_height(self.next_height) {
            Ok(entry) => {
                self.next_height += 1;
                Some(entry)
            }
            Err(_) => None,
        }
    }
}
