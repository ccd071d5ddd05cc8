//! Raw declarations for the bitcoinkernel C API.
//!
//! Everything in this crate mirrors `bitcoinkernel.h` one to one. The
//! declarations are maintained by hand against the installed header rather
//! than generated at build time, since this crate does not vendor the engine
//! sources.
//!
//! Ownership conventions, per function:
//!
//! * `*_create` and `*_copy` return pointers owned by the caller, which must
//!   be released with the family's `*_destroy`.
//! * `*_get_*` accessors returning a pointer return a borrowed view into the
//!   parent object, valid only while the parent is alive, with one
//!   exception: `btck_block_get_hash` and `btck_block_tree_entry_get_block_hash`
//!   return a caller-owned `btck_BlockHash`.
//! * `btck_chainstate_manager_read_block_data` and
//!   `btck_chainstate_manager_read_spent_outputs` return caller-owned
//!   objects.
//! * Pointers passed as arguments are never adopted by the engine; callback
//!   `user_data` is the sole exception and is released through the struct's
//!   `user_data_destroy`.

#![allow(non_camel_case_types)]

use libc::{c_char, c_int, c_uchar, c_void, size_t};

macro_rules! opaque {
    ($($name:ident),* $(,)?) => {
        $(
            #[repr(C)]
            #[derive(Debug, Copy, Clone)]
            pub struct $name {
                _unused: [u8; 0],
            }
        )*
    };
}

opaque!(
    btck_Transaction,
    btck_TransactionInput,
    btck_TransactionOutput,
    btck_TransactionOutPoint,
    btck_Txid,
    btck_ScriptPubkey,
    btck_Block,
    btck_BlockSpentOutputs,
    btck_TransactionSpentOutputs,
    btck_Coin,
    btck_ChainParameters,
    btck_ContextOptions,
    btck_Context,
    btck_ChainstateManagerOptions,
    btck_ChainstateManager,
    btck_Chain,
    btck_BlockTreeEntry,
    btck_BlockValidationState,
    btck_LoggingConnection,
);

/// A block hash is the one non-opaque object in the API; the engine hands it
/// out by pointer but its layout is part of the ABI.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct btck_BlockHash {
    pub hash: [c_uchar; 32],
}

pub type btck_ChainType = u8;
pub const BTCK_CHAIN_TYPE_MAINNET: btck_ChainType = 0;
pub const BTCK_CHAIN_TYPE_TESTNET: btck_ChainType = 1;
pub const BTCK_CHAIN_TYPE_TESTNET_4: btck_ChainType = 2;
pub const BTCK_CHAIN_TYPE_SIGNET: btck_ChainType = 3;
pub const BTCK_CHAIN_TYPE_REGTEST: btck_ChainType = 4;

pub type btck_SynchronizationState = u8;
pub const BTCK_SYNCHRONIZATION_STATE_INIT_REINDEX: btck_SynchronizationState = 0;
pub const BTCK_SYNCHRONIZATION_STATE_INIT_DOWNLOAD: btck_SynchronizationState = 1;
pub const BTCK_SYNCHRONIZATION_STATE_POST_INIT: btck_SynchronizationState = 2;

pub type btck_Warning = u8;
pub const BTCK_WARNING_UNKNOWN_NEW_RULES_ACTIVATED: btck_Warning = 0;
pub const BTCK_WARNING_LARGE_WORK_INVALID_CHAIN: btck_Warning = 1;

pub type btck_ValidationMode = u8;
pub const BTCK_VALIDATION_MODE_VALID: btck_ValidationMode = 0;
pub const BTCK_VALIDATION_MODE_INVALID: btck_ValidationMode = 1;
pub const BTCK_VALIDATION_MODE_INTERNAL_ERROR: btck_ValidationMode = 2;

pub type btck_BlockValidationResult = u32;
pub const BTCK_BLOCK_VALIDATION_RESULT_UNSET: btck_BlockValidationResult = 0;
pub const BTCK_BLOCK_VALIDATION_RESULT_CONSENSUS: btck_BlockValidationResult = 1;
pub const BTCK_BLOCK_VALIDATION_RESULT_CACHED_INVALID: btck_BlockValidationResult = 2;
pub const BTCK_BLOCK_VALIDATION_RESULT_INVALID_HEADER: btck_BlockValidationResult = 3;
pub const BTCK_BLOCK_VALIDATION_RESULT_MUTATED: btck_BlockValidationResult = 4;
pub const BTCK_BLOCK_VALIDATION_RESULT_MISSING_PREV: btck_BlockValidationResult = 5;
pub const BTCK_BLOCK_VALIDATION_RESULT_INVALID_PREV: btck_BlockValidationResult = 6;
pub const BTCK_BLOCK_VALIDATION_RESULT_TIME_FUTURE: btck_BlockValidationResult = 7;
pub const BTCK_BLOCK_VALIDATION_RESULT_HEADER_LOW_WORK: btck_BlockValidationResult = 8;

pub type btck_ScriptVerifyStatus = u8;
pub const BTCK_SCRIPT_VERIFY_STATUS_OK: btck_ScriptVerifyStatus = 0;
pub const BTCK_SCRIPT_VERIFY_STATUS_ERROR_INVALID_FLAGS_COMBINATION: btck_ScriptVerifyStatus = 1;
pub const BTCK_SCRIPT_VERIFY_STATUS_ERROR_SPENT_OUTPUTS_REQUIRED: btck_ScriptVerifyStatus = 2;

pub type btck_ScriptVerificationFlags = u32;
pub const BTCK_SCRIPT_VERIFICATION_FLAGS_NONE: btck_ScriptVerificationFlags = 0;
pub const BTCK_SCRIPT_VERIFICATION_FLAGS_P2SH: btck_ScriptVerificationFlags = 1 << 0;
pub const BTCK_SCRIPT_VERIFICATION_FLAGS_DERSIG: btck_ScriptVerificationFlags = 1 << 2;
pub const BTCK_SCRIPT_VERIFICATION_FLAGS_NULLDUMMY: btck_ScriptVerificationFlags = 1 << 4;
pub const BTCK_SCRIPT_VERIFICATION_FLAGS_CHECKLOCKTIMEVERIFY: btck_ScriptVerificationFlags = 1 << 9;
pub const BTCK_SCRIPT_VERIFICATION_FLAGS_CHECKSEQUENCEVERIFY: btck_ScriptVerificationFlags =
    1 << 10;
pub const BTCK_SCRIPT_VERIFICATION_FLAGS_WITNESS: btck_ScriptVerificationFlags = 1 << 11;
pub const BTCK_SCRIPT_VERIFICATION_FLAGS_TAPROOT: btck_ScriptVerificationFlags = 1 << 17;
pub const BTCK_SCRIPT_VERIFICATION_FLAGS_ALL: btck_ScriptVerificationFlags =
    BTCK_SCRIPT_VERIFICATION_FLAGS_P2SH
        | BTCK_SCRIPT_VERIFICATION_FLAGS_DERSIG
        | BTCK_SCRIPT_VERIFICATION_FLAGS_NULLDUMMY
        | BTCK_SCRIPT_VERIFICATION_FLAGS_CHECKLOCKTIMEVERIFY
        | BTCK_SCRIPT_VERIFICATION_FLAGS_CHECKSEQUENCEVERIFY
        | BTCK_SCRIPT_VERIFICATION_FLAGS_WITNESS
        | BTCK_SCRIPT_VERIFICATION_FLAGS_TAPROOT;

pub type btck_LogCategory = u8;
pub const BTCK_LOG_CATEGORY_ALL: btck_LogCategory = 0;
pub const BTCK_LOG_CATEGORY_BENCH: btck_LogCategory = 1;
pub const BTCK_LOG_CATEGORY_BLOCKSTORAGE: btck_LogCategory = 2;
pub const BTCK_LOG_CATEGORY_COINDB: btck_LogCategory = 3;
pub const BTCK_LOG_CATEGORY_LEVELDB: btck_LogCategory = 4;
pub const BTCK_LOG_CATEGORY_MEMPOOL: btck_LogCategory = 5;
pub const BTCK_LOG_CATEGORY_PRUNE: btck_LogCategory = 6;
pub const BTCK_LOG_CATEGORY_RAND: btck_LogCategory = 7;
pub const BTCK_LOG_CATEGORY_REINDEX: btck_LogCategory = 8;
pub const BTCK_LOG_CATEGORY_VALIDATION: btck_LogCategory = 9;
pub const BTCK_LOG_CATEGORY_KERNEL: btck_LogCategory = 10;

pub type btck_LogLevel = u8;
pub const BTCK_LOG_LEVEL_TRACE: btck_LogLevel = 0;
pub const BTCK_LOG_LEVEL_DEBUG: btck_LogLevel = 1;
pub const BTCK_LOG_LEVEL_INFO: btck_LogLevel = 2;

/// Sink for the `*_to_bytes` serialization entry points. Returns 0 on
/// success; a non-zero return aborts the serialization.
pub type btck_WriteBytes = Option<
    unsafe extern "C" fn(user_data: *mut c_void, data: *const c_uchar, len: size_t) -> c_int,
>;

pub type btck_DestroyUserData = Option<unsafe extern "C" fn(user_data: *mut c_void)>;

pub type btck_LogCallback = Option<
    unsafe extern "C" fn(user_data: *mut c_void, message: *const c_char, message_len: size_t),
>;

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct btck_LoggingOptions {
    pub log_timestamps: c_int,
    pub log_time_micros: c_int,
    pub log_threadnames: c_int,
    pub log_sourcelocations: c_int,
    pub always_print_category_levels: c_int,
}

/// Callbacks issuing engine state notifications. Every member may be null;
/// the engine skips null entries. All callbacks may be invoked from engine
/// worker threads.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct btck_NotificationInterfaceCallbacks {
    pub user_data: *mut c_void,
    pub user_data_destroy: btck_DestroyUserData,
    pub block_tip: Option<
        unsafe extern "C" fn(
            user_data: *mut c_void,
            state: btck_SynchronizationState,
            entry: *const btck_BlockTreeEntry,
            verification_progress: f64,
        ),
    >,
    pub header_tip: Option<
        unsafe extern "C" fn(
            user_data: *mut c_void,
            state: btck_SynchronizationState,
            height: i64,
            timestamp: i64,
            presync: c_int,
        ),
    >,
    pub progress: Option<
        unsafe extern "C" fn(
            user_data: *mut c_void,
            title: *const c_char,
            title_len: size_t,
            progress_percent: c_int,
            resume_possible: c_int,
        ),
    >,
    pub warning_set: Option<
        unsafe extern "C" fn(
            user_data: *mut c_void,
            warning: btck_Warning,
            message: *const c_char,
            message_len: size_t,
        ),
    >,
    pub warning_unset:
        Option<unsafe extern "C" fn(user_data: *mut c_void, warning: btck_Warning)>,
    pub flush_error: Option<
        unsafe extern "C" fn(user_data: *mut c_void, message: *const c_char, message_len: size_t),
    >,
    pub fatal_error: Option<
        unsafe extern "C" fn(user_data: *mut c_void, message: *const c_char, message_len: size_t),
    >,
}

/// Callbacks mirroring the engine's internal validation interface. The
/// `state` and `entry` pointers are only valid for the duration of the call.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct btck_ValidationInterfaceCallbacks {
    pub user_data: *mut c_void,
    pub user_data_destroy: btck_DestroyUserData,
    pub block_checked: Option<
        unsafe extern "C" fn(
            user_data: *mut c_void,
            block: *const btck_Block,
            state: *const btck_BlockValidationState,
        ),
    >,
    pub pow_valid_block:
        Option<unsafe extern "C" fn(user_data: *mut c_void, block: *const btck_Block)>,
    pub block_connected: Option<
        unsafe extern "C" fn(
            user_data: *mut c_void,
            block: *const btck_Block,
            entry: *const btck_BlockTreeEntry,
        ),
    >,
    pub block_disconnected: Option<
        unsafe extern "C" fn(
            user_data: *mut c_void,
            block: *const btck_Block,
            entry: *const btck_BlockTreeEntry,
        ),
    >,
}

extern "C" {
    // Script pubkey
    pub fn btck_script_pubkey_create(
        raw_script_pubkey: *const c_void,
        raw_script_pubkey_len: size_t,
    ) -> *mut btck_ScriptPubkey;
    pub fn btck_script_pubkey_copy(script_pubkey: *const btck_ScriptPubkey)
        -> *mut btck_ScriptPubkey;
    pub fn btck_script_pubkey_destroy(script_pubkey: *mut btck_ScriptPubkey);
    pub fn btck_script_pubkey_to_bytes(
        script_pubkey: *const btck_ScriptPubkey,
        writer: btck_WriteBytes,
        user_data: *mut c_void,
    ) -> c_int;

    /// Returns 1 if the script passed verification under `flags`, 0
    /// otherwise; `status` is set to a non-OK value when the call itself was
    /// rejected before script execution.
    pub fn btck_script_pubkey_verify(
        script_pubkey: *const btck_ScriptPubkey,
        amount: i64,
        tx_to: *const btck_Transaction,
        spent_outputs: *const *const btck_TransactionOutput,
        spent_outputs_len: size_t,
        input_index: u32,
        flags: btck_ScriptVerificationFlags,
        status: *mut btck_ScriptVerifyStatus,
    ) -> c_int;

    // Transaction
    pub fn btck_transaction_create(
        raw_transaction: *const c_void,
        raw_transaction_len: size_t,
    ) -> *mut btck_Transaction;
    pub fn btck_transaction_copy(transaction: *const btck_Transaction) -> *mut btck_Transaction;
    pub fn btck_transaction_destroy(transaction: *mut btck_Transaction);
    pub fn btck_transaction_count_inputs(transaction: *const btck_Transaction) -> size_t;
    pub fn btck_transaction_count_outputs(transaction: *const btck_Transaction) -> size_t;
    pub fn btck_transaction_get_input_at(
        transaction: *const btck_Transaction,
        input_index: size_t,
    ) -> *const btck_TransactionInput;
    pub fn btck_transaction_get_output_at(
        transaction: *const btck_Transaction,
        output_index: size_t,
    ) -> *const btck_TransactionOutput;
    pub fn btck_transaction_get_txid(transaction: *const btck_Transaction) -> *const btck_Txid;
    pub fn btck_transaction_to_bytes(
        transaction: *const btck_Transaction,
        writer: btck_WriteBytes,
        user_data: *mut c_void,
    ) -> c_int;

    // Transaction input / out point
    pub fn btck_transaction_input_get_out_point(
        transaction_input: *const btck_TransactionInput,
    ) -> *const btck_TransactionOutPoint;
    pub fn btck_transaction_out_point_get_hash(
        transaction_out_point: *const btck_TransactionOutPoint,
    ) -> *const btck_Txid;
    pub fn btck_transaction_out_point_get_index(
        transaction_out_point: *const btck_TransactionOutPoint,
    ) -> u32;

    // Transaction output
    pub fn btck_transaction_output_create(
        script_pubkey: *const btck_ScriptPubkey,
        amount: i64,
    ) -> *mut btck_TransactionOutput;
    pub fn btck_transaction_output_copy(
        transaction_output: *const btck_TransactionOutput,
    ) -> *mut btck_TransactionOutput;
    pub fn btck_transaction_output_destroy(transaction_output: *mut btck_TransactionOutput);
    pub fn btck_transaction_output_get_amount(
        transaction_output: *const btck_TransactionOutput,
    ) -> i64;
    pub fn btck_transaction_output_get_script_pubkey(
        transaction_output: *const btck_TransactionOutput,
    ) -> *const btck_ScriptPubkey;

    // Txid
    pub fn btck_txid_copy(txid: *const btck_Txid) -> *mut btck_Txid;
    pub fn btck_txid_destroy(txid: *mut btck_Txid);
    /// Writes the 32 byte hash into `output` in internal byte order.
    pub fn btck_txid_to_bytes(txid: *const btck_Txid, output: *mut c_uchar, output_len: size_t);

    // Block
    pub fn btck_block_create(raw_block: *const c_void, raw_block_len: size_t) -> *mut btck_Block;
    pub fn btck_block_copy(block: *const btck_Block) -> *mut btck_Block;
    pub fn btck_block_destroy(block: *mut btck_Block);
    pub fn btck_block_get_hash(block: *const btck_Block) -> *mut btck_BlockHash;
    pub fn btck_block_count_transactions(block: *const btck_Block) -> size_t;
    pub fn btck_block_get_transaction_at(
        block: *const btck_Block,
        transaction_index: size_t,
    ) -> *const btck_Transaction;
    pub fn btck_block_to_bytes(
        block: *const btck_Block,
        writer: btck_WriteBytes,
        user_data: *mut c_void,
    ) -> c_int;

    // Block hash
    pub fn btck_block_hash_create(block_hash: *const c_uchar) -> *mut btck_BlockHash;
    pub fn btck_block_hash_destroy(block_hash: *mut btck_BlockHash);

    // Block spent outputs
    pub fn btck_block_spent_outputs_copy(
        block_spent_outputs: *const btck_BlockSpentOutputs,
    ) -> *mut btck_BlockSpentOutputs;
    pub fn btck_block_spent_outputs_destroy(block_spent_outputs: *mut btck_BlockSpentOutputs);
    pub fn btck_block_spent_outputs_count(
        block_spent_outputs: *const btck_BlockSpentOutputs,
    ) -> size_t;
    pub fn btck_block_spent_outputs_get_transaction_spent_outputs_at(
        block_spent_outputs: *const btck_BlockSpentOutputs,
        transaction_index: size_t,
    ) -> *const btck_TransactionSpentOutputs;

    pub fn btck_transaction_spent_outputs_copy(
        transaction_spent_outputs: *const btck_TransactionSpentOutputs,
    ) -> *mut btck_TransactionSpentOutputs;
    pub fn btck_transaction_spent_outputs_destroy(
        transaction_spent_outputs: *mut btck_TransactionSpentOutputs,
    );
    pub fn btck_transaction_spent_outputs_count(
        transaction_spent_outputs: *const btck_TransactionSpentOutputs,
    ) -> size_t;
    pub fn btck_transaction_spent_outputs_get_coin_at(
        transaction_spent_outputs: *const btck_TransactionSpentOutputs,
        coin_index: size_t,
    ) -> *const btck_Coin;

    // Coin
    pub fn btck_coin_copy(coin: *const btck_Coin) -> *mut btck_Coin;
    pub fn btck_coin_destroy(coin: *mut btck_Coin);
    pub fn btck_coin_confirmation_height(coin: *const btck_Coin) -> u32;
    pub fn btck_coin_is_coinbase(coin: *const btck_Coin) -> c_int;
    pub fn btck_coin_get_output(coin: *const btck_Coin) -> *const btck_TransactionOutput;

    // Chain parameters / context
    pub fn btck_chain_parameters_create(chain_type: btck_ChainType) -> *mut btck_ChainParameters;
    pub fn btck_chain_parameters_destroy(chain_parameters: *mut btck_ChainParameters);

    pub fn btck_context_options_create() -> *mut btck_ContextOptions;
    pub fn btck_context_options_destroy(context_options: *mut btck_ContextOptions);
    pub fn btck_context_options_set_chainparams(
        context_options: *mut btck_ContextOptions,
        chain_parameters: *const btck_ChainParameters,
    );
    pub fn btck_context_options_set_notifications(
        context_options: *mut btck_ContextOptions,
        notifications: btck_NotificationInterfaceCallbacks,
    );
    pub fn btck_context_options_set_validation_interface(
        context_options: *mut btck_ContextOptions,
        validation_interface: btck_ValidationInterfaceCallbacks,
    );

    pub fn btck_context_create(context_options: *const btck_ContextOptions) -> *mut btck_Context;
    pub fn btck_context_destroy(context: *mut btck_Context);
    pub fn btck_context_interrupt(context: *mut btck_Context) -> c_int;

    // Chainstate manager
    pub fn btck_chainstate_manager_options_create(
        context: *const btck_Context,
        data_dir: *const c_char,
        data_dir_len: size_t,
        blocks_dir: *const c_char,
        blocks_dir_len: size_t,
    ) -> *mut btck_ChainstateManagerOptions;
    pub fn btck_chainstate_manager_options_destroy(
        chainstate_manager_options: *mut btck_ChainstateManagerOptions,
    );
    pub fn btck_chainstate_manager_options_set_worker_threads_num(
        chainstate_manager_options: *mut btck_ChainstateManagerOptions,
        worker_threads: c_int,
    );
    pub fn btck_chainstate_manager_options_set_wipe_dbs(
        chainstate_manager_options: *mut btck_ChainstateManagerOptions,
        wipe_block_tree_db: c_int,
        wipe_chainstate_db: c_int,
    ) -> c_int;
    pub fn btck_chainstate_manager_options_set_block_tree_db_in_memory(
        chainstate_manager_options: *mut btck_ChainstateManagerOptions,
        block_tree_db_in_memory: c_int,
    );
    pub fn btck_chainstate_manager_options_set_chainstate_db_in_memory(
        chainstate_manager_options: *mut btck_ChainstateManagerOptions,
        chainstate_db_in_memory: c_int,
    );

    pub fn btck_chainstate_manager_create(
        chainstate_manager_options: *const btck_ChainstateManagerOptions,
    ) -> *mut btck_ChainstateManager;
    pub fn btck_chainstate_manager_destroy(chainstate_manager: *mut btck_ChainstateManager);
    /// Returns 0 on success. `new_block` is set to 1 when the block was not
    /// known before.
    pub fn btck_chainstate_manager_process_block(
        chainstate_manager: *mut btck_ChainstateManager,
        block: *const btck_Block,
        new_block: *mut c_int,
    ) -> c_int;
    pub fn btck_chainstate_manager_import_blocks(
        chainstate_manager: *mut btck_ChainstateManager,
        block_file_paths: *const *const c_char,
        block_file_path_lens: *const size_t,
        block_file_paths_len: size_t,
    ) -> c_int;
    pub fn btck_chainstate_manager_get_active_chain(
        chainstate_manager: *const btck_ChainstateManager,
    ) -> *const btck_Chain;
    pub fn btck_chainstate_manager_get_block_tree_entry_by_hash(
        chainstate_manager: *const btck_ChainstateManager,
        block_hash: *const btck_BlockHash,
    ) -> *const btck_BlockTreeEntry;
    pub fn btck_chainstate_manager_read_block_data(
        chainstate_manager: *const btck_ChainstateManager,
        entry: *const btck_BlockTreeEntry,
    ) -> *mut btck_Block;
    pub fn btck_chainstate_manager_read_spent_outputs(
        chainstate_manager: *const btck_ChainstateManager,
        entry: *const btck_BlockTreeEntry,
    ) -> *mut btck_BlockSpentOutputs;

    // Chain
    /// Returns the height of the tip, or -1 for an empty chain.
    pub fn btck_chain_get_height(chain: *const btck_Chain) -> c_int;
    pub fn btck_chain_get_tip(chain: *const btck_Chain) -> *const btck_BlockTreeEntry;
    pub fn btck_chain_get_genesis(chain: *const btck_Chain) -> *const btck_BlockTreeEntry;
    pub fn btck_chain_get_by_height(
        chain: *const btck_Chain,
        height: c_int,
    ) -> *const btck_BlockTreeEntry;
    pub fn btck_chain_contains(
        chain: *const btck_Chain,
        entry: *const btck_BlockTreeEntry,
    ) -> c_int;

    // Block tree entry
    pub fn btck_block_tree_entry_get_height(entry: *const btck_BlockTreeEntry) -> c_int;
    pub fn btck_block_tree_entry_get_block_hash(
        entry: *const btck_BlockTreeEntry,
    ) -> *mut btck_BlockHash;
    pub fn btck_block_tree_entry_get_previous(
        entry: *const btck_BlockTreeEntry,
    ) -> *const btck_BlockTreeEntry;

    // Block validation state
    pub fn btck_block_validation_state_get_validation_mode(
        block_validation_state: *const btck_BlockValidationState,
    ) -> btck_ValidationMode;
    pub fn btck_block_validation_state_get_block_validation_result(
        block_validation_state: *const btck_BlockValidationState,
    ) -> btck_BlockValidationResult;

    // Logging
    pub fn btck_logging_connection_create(
        callback: btck_LogCallback,
        user_data: *mut c_void,
        user_data_destroy: btck_DestroyUserData,
        options: btck_LoggingOptions,
    ) -> *mut btck_LoggingConnection;
    pub fn btck_logging_connection_destroy(logging_connection: *mut btck_LoggingConnection);
    pub fn btck_logging_set_level_category(
        category: btck_LogCategory,
        level: btck_LogLevel,
    ) -> c_int;
    pub fn btck_logging_enable_category(category: btck_LogCategory) -> c_int;
    pub fn btck_logging_disable_category(category: btck_LogCategory) -> c_int;
    pub fn btck_logging_disable();
}
