use std::os::raw::{c_char, c_int};
use std::sync::Arc;

use bitcoinkernel_sys::{
    btck_chainstate_manager_create, btck_chainstate_manager_destroy,
    btck_chainstate_manager_get_active_chain, btck_chainstate_manager_get_block_tree_entry_by_hash,
    btck_chainstate_manager_import_blocks, btck_chainstate_manager_options_create,
    btck_chainstate_manager_options_destroy,
    btck_chainstate_manager_options_set_block_tree_db_in_memory,
    btck_chainstate_manager_options_set_chainstate_db_in_memory,
    btck_chainstate_manager_options_set_wipe_dbs,
    btck_chainstate_manager_options_set_worker_threads_num,
    btck_chainstate_manager_process_block, btck_chainstate_manager_read_block_data,
    btck_chainstate_manager_read_spent_outputs, btck_ChainstateManager,
    btck_ChainstateManagerOptions,
};

use crate::core::block::{Block, BlockHash};
use crate::core::spent_outputs::BlockSpentOutputs;
use crate::ffi::c_helpers;
use crate::ffi::handle::{impl_native_drop, NativeHandle};
use crate::ffi::sealed::{AsPtr, FromPtr};
use crate::state::chain::Chain;
use crate::state::context::Context;
use crate::state::entry::BlockTreeEntry;
use crate::KernelError;

impl_native_drop!(
    btck_ChainstateManagerOptions,
    btck_chainstate_manager_options_destroy
);
impl_native_drop!(btck_ChainstateManager, btck_chainstate_manager_destroy);

fn to_c_string(value: &str) -> Result<std::ffi::CString, KernelError> {
    std::ffi::CString::new(value).map_err(|err| KernelError::CStringCreationFailed(err.to_string()))
}

/// Configuration for opening a [`ChainstateManager`] on a data directory.
pub struct ChainstateManagerOptions {
    inner: NativeHandle<btck_ChainstateManagerOptions>,
    context: Arc<Context>,
}

unsafe impl Send for ChainstateManagerOptions {}
unsafe impl Sync for ChainstateManagerOptions {}

impl ChainstateManagerOptions {
    /// `data_dir` holds the databases, `blocks_dir` the raw block files.
    /// Both are created on demand by the engine.
    pub fn new(
        context: Arc<Context>,
        data_dir: &str,
        blocks_dir: &str,
    ) -> Result<Self, KernelError> {
        let c_data_dir = to_c_string(data_dir)?;
        let c_blocks_dir = to_c_string(blocks_dir)?;
        let ptr = unsafe {
            btck_chainstate_manager_options_create(
                context.as_ptr()?,
                c_data_dir.as_ptr(),
                c_data_dir.as_bytes().len(),
                c_blocks_dir.as_ptr(),
                c_blocks_dir.as_bytes().len(),
            )
        };
        Ok(ChainstateManagerOptions {
            inner: NativeHandle::wrap(ptr, "chainstate manager options")?,
            context,
        })
    }

    /// Number of validation worker threads, capped by the engine.
    pub fn worker_threads(mut self, worker_threads: i32) -> Result<Self, KernelError> {
        unsafe {
            btck_chainstate_manager_options_set_worker_threads_num(
                self.inner.get_mut()?,
                worker_threads,
            )
        };
        Ok(self)
    }

    /// Wipes the block tree and/or chainstate database on open. Wiping the
    /// block tree requires wiping the chainstate as well; the engine rejects
    /// the other combination.
    pub fn wipe_db(
        mut self,
        wipe_block_tree: bool,
        wipe_chainstate: bool,
    ) -> Result<Self, KernelError> {
        let result = unsafe {
            btck_chainstate_manager_options_set_wipe_dbs(
                self.inner.get_mut()?,
                c_helpers::to_c_bool(wipe_block_tree),
                c_helpers::to_c_bool(wipe_chainstate),
            )
        };
        if c_helpers::success(result) {
            Ok(self)
        } else {
            Err(KernelError::InvalidState(
                "wiping the block tree requires wiping the chainstate".to_string(),
            ))
        }
    }

    pub fn block_tree_db_in_memory(mut self, in_memory: bool) -> Result<Self, KernelError> {
        unsafe {
            btck_chainstate_manager_options_set_block_tree_db_in_memory(
                self.inner.get_mut()?,
                c_helpers::to_c_bool(in_memory),
            )
        };
        Ok(self)
    }

    pub fn chainstate_db_in_memory(mut self, in_memory: bool) -> Result<Self, KernelError> {
        unsafe {
            btck_chainstate_manager_options_set_chainstate_db_in_memory(
                self.inner.get_mut()?,
                c_helpers::to_c_bool(in_memory),
            )
        };
        Ok(self)
    }
}

/// Verdict of [`ChainstateManager::process_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessBlockResult {
    /// Accepted and not seen before.
    NewBlock,
    /// Accepted, but the engine already knew it.
    Duplicate,
    /// The engine rejected the block. The reason arrives through the
    /// validation interface's block checked handler.
    Rejected,
}

/// The engine's chainstate: block storage, the block tree, and the active
/// chain. Holds its [`Context`] alive through an `Arc`, so contexts are
/// destroyed strictly after their managers.
pub struct ChainstateManager {
    inner: NativeHandle<btck_ChainstateManager>,
    context: Arc<Context>,
}

unsafe impl Send for ChainstateManager {}
unsafe impl Sync for ChainstateManager {}

impl ChainstateManager {
    /// Opens the databases and loads the chainstate. Blocking; reindexing a
    /// large datadir can take a long time.
    pub fn new(options: ChainstateManagerOptions) -> Result<Self, KernelError> {
        let ptr = unsafe { btck_chainstate_manager_create(options.inner.get()?) };
        Ok(ChainstateManager {
            inner: NativeHandle::wrap(ptr, "chainstate manager")?,
            context: options.context.clone(),
        })
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    /// Validates a block and, if it extends the best chain, connects it.
    /// Rejection is a verdict, not an error; the `Err` path is reserved for
    /// binding failures such as a closed handle.
    pub fn process_block(&self, block: &Block) -> Result<ProcessBlockResult, KernelError> {
        let mut new_block: c_int = 0;
        let accepted = unsafe {
            btck_chainstate_manager_process_block(
                self.inner.get()? as *mut btck_ChainstateManager,
                block.as_ptr()?,
                &mut new_block,
            )
        };
        if !c_helpers::success(accepted) {
            Ok(ProcessBlockResult::Rejected)
        } else if c_helpers::present(new_block) {
            Ok(ProcessBlockResult::NewBlock)
        } else {
            Ok(ProcessBlockResult::Duplicate)
        }
    }

    /// Imports block files from disk and triggers a reindex of anything
    /// already in the blocks directory. Blocking.
    pub fn import_blocks(&self, block_file_paths: &[&str]) -> Result<(), KernelError> {
        let c_paths = block_file_paths
            .iter()
            .map(|path| to_c_string(path))
            .collect::<Result<Vec<_>, _>>()?;
        let path_ptrs: Vec<*const c_char> = c_paths.iter().map(|path| path.as_ptr()).collect();
        let path_lens: Vec<usize> = c_paths.iter().map(|path| path.as_bytes().len()).collect();

        let result = unsafe {
            btck_chainstate_manager_import_blocks(
                self.inner.get()? as *mut btck_ChainstateManager,
                if path_ptrs.is_empty() {
                    std::ptr::null()
                } else {
                    path_ptrs.as_ptr()
                },
                if path_lens.is_empty() {
                    std::ptr::null()
                } else {
                    path_lens.as_ptr()
                },
                path_ptrs.len(),
            )
        };
        if c_helpers::success(result) {
            Ok(())
        } else {
            Err(KernelError::InvalidState("block import failed".to_string()))
        }
    }

    /// View of the active chain. Accessors on the view follow reorgs live.
    pub fn active_chain(&self) -> Result<Chain<'_>, KernelError> {
        let ptr = unsafe { btck_chainstate_manager_get_active_chain(self.inner.get()?) };
        if ptr.is_null() {
            return Err(KernelError::InvalidState("no active chain".to_string()));
        }
        Ok(unsafe { Chain::from_ptr(ptr) })
    }

    /// Looks up a block by hash anywhere in the block tree, including forks.
    pub fn block_tree_entry(
        &self,
        block_hash: &BlockHash,
    ) -> Result<Option<BlockTreeEntry<'_>>, KernelError> {
        let raw_hash = block_hash.as_raw();
        let ptr = unsafe {
            btck_chainstate_manager_get_block_tree_entry_by_hash(self.inner.get()?, &raw_hash)
        };
        if ptr.is_null() {
            Ok(None)
        } else {
            Ok(Some(unsafe { BlockTreeEntry::from_ptr(ptr) }))
        }
    }

    /// Reads the full block for `entry` back from disk.
    pub fn read_block_data(&self, entry: &BlockTreeEntry<'_>) -> Result<Block, KernelError> {
        let ptr =
            unsafe { btck_chainstate_manager_read_block_data(self.inner.get()?, entry.as_ptr()) };
        Block::from_owned_ptr(ptr)
    }

    /// Reads the undo data for `entry`: every output its block spent. The
    /// genesis block has no undo data and fails here.
    pub fn read_spent_outputs(
        &self,
        entry: &BlockTreeEntry<'_>,
    ) -> Result<BlockSpentOutputs, KernelError> {
        let ptr = unsafe {
            btck_chainstate_manager_read_spent_outputs(self.inner.get()?, entry.as_ptr())
        };
        BlockSpentOutputs::from_owned_ptr(ptr)
    }
}
