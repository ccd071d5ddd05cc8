//! Integration tests against a real libbitcoinkernel.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::sync::{Arc, Once};

use tempdir::TempDir;

use bitcoinkernel::prelude::*;
use bitcoinkernel::{
    verify, Block, ChainType, ChainstateManager, ChainstateManagerOptions, Context,
    ContextBuilder, KernelError, Logger, NotificationCallbackRegistry, ProcessBlockResult,
    ScriptPubkey, ScriptVerifyError, Transaction, TxOut, ValidationCallbackRegistry, VERIFY_ALL,
    VERIFY_ALL_PRE_TAPROOT,
};

static INIT: Once = Once::new();

fn setup() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
        // Leak the connection so engine log lines reach the test output for
        // the whole run.
        let logger = Logger::new(|message: &str| {
            log::info!(target: "kernel", "{}", message);
        })
        .unwrap();
        std::mem::forget(logger);
    });
}

// Spending a P2PKH output.
const SCRIPT_P2PKH: &str = "76a9144bfbaf6afb76cc5771bc6404810d1cc041a6933988ac";
const TX_SPENDS_P2PKH: &str = "02000000013f7cebd65c27431a90bba7f796914fe8cc2ddfc3f2cbd6f7e5f2fc854534da95000000006b483045022100de1ac3bcdfb0332207c4a91f3832bd2c2915840165f876ab47c5f8996b971c3602201c6c053d750fadde599e6f5c4e1963df0f01fc0d97815e8157e3d59fe09ca30d012103699b464d1d8bc9e47d4fb1cdaa89a1c5783d68363c4dbc4b524ed3d857148617feffffff02836d3c01000000001976a914fc25d6d5c94003bf5b0c7b640a248e2c637fcfb088ac7ada8202000000001976a914fbed3d9b11183209a57999d54d59f67c019e756c88ac6acb0700";

// Spending a P2SH wrapped segwit output of 1900000 satoshi.
const SCRIPT_P2SH_SEGWIT: &str = "a91434c06f8c87e355e123bdc6dda4ffabc64b6989ef87";
const TX_SPENDS_P2SH_SEGWIT: &str = "01000000000101d9fd94d0ff0026d307c994d0003180a5f248146efb6371d040c5973f5f66d9df0400000017160014b31b31a6cb654cfab3c50567bcf124f48a0beaecffffffff012cbd1c000000000017a914233b74bf0823fa58bbbd26dfc3bb4ae715547167870247304402206f60569cac136c114a58aedd80f6fa1c51b49093e7af883e605c212bdafcd8d202200e91a55f408a021ad2631bc29a67bd6915b2d7e9ef0265627eabd7f7234455f6012103e7e802f50344303c76d12c089c8724c1b230e3b745693bbe16aad536293d15e300000000";

// Spending a native segwit (P2WSH) output of 18393430 satoshi.
const SCRIPT_NATIVE_SEGWIT: &str =
    "0020701a8d401c84fb13e6baf169d59684e17abd9fa216c8cc5b9fc63d622ff8c58d";
const TX_SPENDS_NATIVE_SEGWIT: &str = "010000000001011f97548fbbe7a0db7588a66e18d803d0089315aa7d4cc28360b6ec50ef36718a0100000000ffffffff02df1776000000000017a9146c002a686959067f4866b8fb493ad7970290ab728757d29f0000000000220020701a8d401c84fb13e6baf169d59684e17abd9fa216c8cc5b9fc63d622ff8c58d04004730440220565d170eed95ff95027a69b313758450ba84a01224e1f7f130dda46e94d13f8602207bdd20e307f062594022f12ed5017bbf4a055a06aea91c10110a0e3bb23117fc014730440220647d2dc5b15f60bc37dc42618a370b2a1490293f9e5c8464f53ec4fe1dfe067302203598773895b4b16d37485cbe21b337f4e4b650739880098c592553add7dd4355016952210375e00eb72e29da82b89367947f29ef34afb75e8654f6ea368e0acdfd92976b7c2103a1b26313f430c4b15bb1fdce663207659d8cac749a0e53d70eff01874496feff2103c96d495bfdd5ba4145e3e046fee45e84a8a48ad05bd8dbb395c011a32cf9f88053ae00000000";

const REGTEST_GENESIS_HASH: &str =
    "0f9188f13cb7b2c71f2a335e3a4fc328bf5beb436012afca590b1a11466e2206";
const REGTEST_GENESIS_BLOCK: &str = "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4adae5494dffff7f20020000000101000000010000000000000000000000000000000000000000000000000000000000000000ffffffff4d04ffff001d0104455468652054696d65732030332f4a616e2f32303039204368616e63656c6c6f72206f6e206272696e6b206f66207365636f6e64206261696c6f757420666f722062616e6b73ffffffff0100f2052a01000000434104678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5fac00000000";

fn verify_hex(
    script_hex: &str,
    amount: Option<i64>,
    tx_hex: &str,
    input_index: u32,
    flags: Option<u32>,
) -> Result<(), KernelError> {
    let script_pubkey = ScriptPubkey::new(&hex::decode(script_hex).unwrap()).unwrap();
    let tx_to = Transaction::new(&hex::decode(tx_hex).unwrap()).unwrap();
    verify(&script_pubkey, amount, &tx_to, input_index, flags, &[])
}

fn regtest_context() -> Arc<Context> {
    Arc::new(
        ContextBuilder::new()
            .chain_type(ChainType::Regtest)
            .notifications(NotificationCallbackRegistry::new())
            .validation_interface(ValidationCallbackRegistry::new())
            .build()
            .unwrap(),
    )
}

fn regtest_chainman(data_dir: &TempDir) -> ChainstateManager {
    let data_dir_path = data_dir.path().to_str().unwrap().to_string();
    let blocks_dir = format!("{}/blocks", data_dir_path);
    let options = ChainstateManagerOptions::new(regtest_context(), &data_dir_path, &blocks_dir)
        .unwrap()
        .worker_threads(2)
        .unwrap();
    ChainstateManager::new(options).unwrap()
}

#[test]
fn test_verify_p2pkh() {
    setup();
    assert!(verify_hex(
        SCRIPT_P2PKH,
        Some(0),
        TX_SPENDS_P2PKH,
        0,
        Some(VERIFY_ALL_PRE_TAPROOT)
    )
    .is_ok());

    // Same script with a mangled final opcode.
    let bad_script = format!("{}ff", &SCRIPT_P2PKH[..SCRIPT_P2PKH.len() - 2]);
    assert_eq!(
        verify_hex(
            &bad_script,
            Some(0),
            TX_SPENDS_P2PKH,
            0,
            Some(VERIFY_ALL_PRE_TAPROOT)
        ),
        Err(KernelError::ScriptVerify(ScriptVerifyError::Invalid))
    );
}

#[test]
fn test_verify_p2sh_segwit_needs_correct_amount() {
    setup();
    assert!(verify_hex(
        SCRIPT_P2SH_SEGWIT,
        Some(1_900_000),
        TX_SPENDS_P2SH_SEGWIT,
        0,
        Some(VERIFY_ALL_PRE_TAPROOT)
    )
    .is_ok());
    assert_eq!(
        verify_hex(
            SCRIPT_P2SH_SEGWIT,
            Some(900_000),
            TX_SPENDS_P2SH_SEGWIT,
            0,
            Some(VERIFY_ALL_PRE_TAPROOT)
        ),
        Err(KernelError::ScriptVerify(ScriptVerifyError::Invalid))
    );
}

#[test]
fn test_verify_native_segwit() {
    setup();
    assert!(verify_hex(
        SCRIPT_NATIVE_SEGWIT,
        Some(18_393_430),
        TX_SPENDS_NATIVE_SEGWIT,
        0,
        Some(VERIFY_ALL_PRE_TAPROOT)
    )
    .is_ok());

    let bad_script = format!("{}8f", &SCRIPT_NATIVE_SEGWIT[..SCRIPT_NATIVE_SEGWIT.len() - 2]);
    assert_eq!(
        verify_hex(
            &bad_script,
            Some(18_393_430),
            TX_SPENDS_NATIVE_SEGWIT,
            0,
            Some(VERIFY_ALL_PRE_TAPROOT)
        ),
        Err(KernelError::ScriptVerify(ScriptVerifyError::Invalid))
    );
}

#[test]
fn test_verify_rejects_bad_input_index() {
    setup();
    assert_eq!(
        verify_hex(
            SCRIPT_P2PKH,
            Some(0),
            TX_SPENDS_P2PKH,
            999,
            Some(VERIFY_ALL_PRE_TAPROOT)
        ),
        Err(KernelError::ScriptVerify(ScriptVerifyError::TxInputIndex))
    );
}

#[test]
fn test_verify_rejects_unknown_flag_bits() {
    setup();
    assert_eq!(
        verify_hex(SCRIPT_P2PKH, Some(0), TX_SPENDS_P2PKH, 0, Some(1 << 18)),
        Err(KernelError::ScriptVerify(ScriptVerifyError::InvalidFlags))
    );
    assert_eq!(
        verify_hex(
            SCRIPT_P2PKH,
            Some(0),
            TX_SPENDS_P2PKH,
            0,
            Some(VERIFY_ALL | (1 << 25))
        ),
        Err(KernelError::ScriptVerify(ScriptVerifyError::InvalidFlags))
    );
}

#[test]
fn test_verify_taproot_requires_spent_outputs() {
    setup();
    // VERIFY_ALL includes taproot; the engine refuses to run it without the
    // prevouts.
    assert_eq!(
        verify_hex(
            SCRIPT_NATIVE_SEGWIT,
            Some(18_393_430),
            TX_SPENDS_NATIVE_SEGWIT,
            0,
            Some(VERIFY_ALL)
        ),
        Err(KernelError::ScriptVerify(
            ScriptVerifyError::SpentOutputsRequired
        ))
    );
}

#[test]
fn test_verify_rejects_spent_outputs_mismatch() {
    setup();
    let script_pubkey = ScriptPubkey::new(&hex::decode(SCRIPT_P2PKH).unwrap()).unwrap();
    let tx_to = Transaction::new(&hex::decode(TX_SPENDS_P2PKH).unwrap()).unwrap();
    // One input, two claimed prevouts.
    let spent = vec![
        TxOut::new(&script_pubkey, 100).unwrap(),
        TxOut::new(&script_pubkey, 200).unwrap(),
    ];
    assert_eq!(
        verify(&script_pubkey, Some(0), &tx_to, 0, Some(VERIFY_ALL), &spent),
        Err(KernelError::ScriptVerify(
            ScriptVerifyError::SpentOutputsMismatch
        ))
    );
}

#[test]
fn test_closed_handles_refuse_access() {
    setup();
    let mut tx = Transaction::new(&hex::decode(TX_SPENDS_P2PKH).unwrap()).unwrap();
    assert!(!tx.is_closed());
    assert_eq!(tx.input_count().unwrap(), 1);
    assert_eq!(tx.output_count().unwrap(), 2);

    let copy = tx.try_clone().unwrap();
    tx.close();
    assert!(tx.is_closed());
    tx.close();

    assert_eq!(tx.to_bytes(), Err(KernelError::ClosedResource));
    assert_eq!(tx.input_count(), Err(KernelError::ClosedResource));
    assert!(matches!(tx.try_clone(), Err(KernelError::ClosedResource)));

    // The earlier copy is unaffected.
    assert_eq!(
        copy.to_bytes().unwrap(),
        hex::decode(TX_SPENDS_P2PKH).unwrap()
    );
}

#[test]
fn test_transaction_views() {
    setup();
    let tx = Transaction::new(&hex::decode(TX_SPENDS_P2PKH).unwrap()).unwrap();
    assert!(matches!(tx.input(1), Err(KernelError::OutOfRange)));
    assert!(matches!(tx.output(2), Err(KernelError::OutOfRange)));

    let input = tx.input(0).unwrap();
    assert_eq!(input.prevout_index(), 0);
    assert_eq!(
        input.prevout_txid().to_hex().unwrap(),
        "95da344585fcf2e5f7d6cbf2c3df2dcce84f9196f7a7bb901a43275cd6eb7c3f"
    );

    let output = tx.output(0).unwrap();
    assert_eq!(output.value().unwrap(), 20_737_411);
    let script = output.script_pubkey().unwrap();
    assert_eq!(script.to_bytes().unwrap().len(), 25);

    assert_eq!(tx.txid().unwrap().to_hex().unwrap().len(), 64);
}

#[test]
fn test_script_round_trip() {
    setup();
    let raw = hex::decode(SCRIPT_P2PKH).unwrap();
    let script = ScriptPubkey::new(&raw).unwrap();
    assert_eq!(script.to_bytes().unwrap(), raw);
    let copy = script.try_clone().unwrap();
    assert_eq!(copy.to_bytes().unwrap(), raw);
}

#[test]
fn test_chainman_starts_at_genesis() {
    setup();
    let data_dir = TempDir::new("kernel_genesis").unwrap();
    let chainman = regtest_chainman(&data_dir);
    let chain = chainman.active_chain().unwrap();

    assert_eq!(chain.height().unwrap(), 0);
    let genesis = chain.genesis().unwrap();
    assert_eq!(genesis.height(), 0);
    assert_eq!(genesis.block_hash().unwrap().to_string(), REGTEST_GENESIS_HASH);
    assert!(genesis.prev().is_none());

    let tip = chain.tip().unwrap();
    assert_eq!(tip.block_hash().unwrap(), genesis.block_hash().unwrap());
    assert!(chain.contains(&tip));
}

#[test]
fn test_chain_bounds_and_iteration() {
    setup();
    let data_dir = TempDir::new("kernel_chain_iter").unwrap();
    let chainman = regtest_chainman(&data_dir);
    let chain = chainman.active_chain().unwrap();

    assert!(matches!(chain.at_height(-1), Err(KernelError::OutOfRange)));
    assert!(matches!(chain.at_height(1), Err(KernelError::OutOfRange)));

    let heights: Vec<i32> = chain.iter().map(|entry| entry.height()).collect();
    assert_eq!(heights, vec![0]);

    // Restartable: a fresh iterator starts over at genesis.
    assert_eq!(chain.iter().count(), 1);
}

#[test]
fn test_process_block_verdicts() {
    setup();
    let data_dir = TempDir::new("kernel_process").unwrap();
    let chainman = regtest_chainman(&data_dir);

    // The genesis block is already known.
    let genesis = Block::new(&hex::decode(REGTEST_GENESIS_BLOCK).unwrap()).unwrap();
    assert_eq!(
        chainman.process_block(&genesis).unwrap(),
        ProcessBlockResult::Duplicate
    );

    // Corrupting the coinbase breaks the merkle commitment.
    let mut mutated = hex::decode(REGTEST_GENESIS_BLOCK).unwrap();
    let last = mutated.len() - 5;
    mutated[last] ^= 0xff;
    let mutated = Block::new(&mutated).unwrap();
    assert_eq!(
        chainman.process_block(&mutated).unwrap(),
        ProcessBlockResult::Rejected
    );
}

#[test]
fn test_block_lookup_and_read_back() {
    setup();
    let data_dir = TempDir::new("kernel_read_block").unwrap();
    let chainman = regtest_chainman(&data_dir);
    let chain = chainman.active_chain().unwrap();
    let genesis = chain.genesis().unwrap();
    let genesis_hash = genesis.block_hash().unwrap();

    let found = chainman.block_tree_entry(&genesis_hash).unwrap().unwrap();
    assert_eq!(found.height(), 0);

    let mut unknown_hash = genesis_hash;
    unknown_hash.hash[0] ^= 0xff;
    assert!(chainman.block_tree_entry(&unknown_hash).unwrap().is_none());

    let block = chainman.read_block_data(&genesis).unwrap();
    assert_eq!(block.hash().unwrap(), genesis_hash);
    assert_eq!(block.transaction_count().unwrap(), 1);
    assert_eq!(
        block.to_bytes().unwrap(),
        hex::decode(REGTEST_GENESIS_BLOCK).unwrap()
    );
}

/// A 102-block regtest chain: coinbase-only blocks paying OP_TRUE, with the
/// last block spending the (now mature) block-1 coinbase.
fn read_fixture_blocks() -> Vec<String> {
    let file = File::open("tests/block_data.txt").unwrap();
    BufReader::new(file)
        .lines()
        .map(|line| line.unwrap())
        .filter(|line| !line.trim().is_empty())
        .collect()
}

#[test]
fn test_spent_outputs_iteration() {
    setup();
    let data_dir = TempDir::new("kernel_spent_outputs").unwrap();
    let chainman = regtest_chainman(&data_dir);

    for block_hex in read_fixture_blocks() {
        let block = Block::new(&hex::decode(&block_hex).unwrap()).unwrap();
        assert_eq!(
            chainman.process_block(&block).unwrap(),
            ProcessBlockResult::NewBlock
        );
    }

    let chain = chainman.active_chain().unwrap();
    assert_eq!(chain.height().unwrap(), 102);

    // The genesis block has no undo data.
    let genesis = chain.genesis().unwrap();
    assert!(chainman.read_spent_outputs(&genesis).is_err());

    // A coinbase-only block spends nothing.
    let block_one = chain.at_height(1).unwrap();
    let no_spends = chainman.read_spent_outputs(&block_one).unwrap();
    assert_eq!(no_spends.count().unwrap(), 0);
    assert_eq!(no_spends.iter().unwrap().count(), 0);

    // The tip block's single non-coinbase transaction spends the block-1
    // coinbase. Iteration agrees with the counts at both levels.
    let tip = chain.tip().unwrap();
    let spent = chainman.read_spent_outputs(&tip).unwrap();
    assert_eq!(spent.count().unwrap(), 1);
    assert_eq!(spent.iter().unwrap().count(), spent.count().unwrap());
    assert!(matches!(
        spent.transaction_spent_outputs(1),
        Err(KernelError::OutOfRange)
    ));

    let tx_spent = spent.transaction_spent_outputs(0).unwrap();
    assert_eq!(tx_spent.count().unwrap(), 1);
    assert_eq!(tx_spent.iter().unwrap().count(), tx_spent.count().unwrap());
    assert!(matches!(tx_spent.coin(1), Err(KernelError::OutOfRange)));

    let coin = tx_spent.coin(0).unwrap();
    assert_eq!(coin.confirmation_height().unwrap(), 1);
    assert!(coin.is_coinbase().unwrap());
    let output = coin.output().unwrap();
    assert_eq!(output.value().unwrap(), 50 * 100_000_000);
    assert_eq!(
        output.script_pubkey().unwrap().to_bytes().unwrap(),
        vec![0x51]
    );

    let mut coins_seen = 0;
    for tx_spent in spent.iter().unwrap() {
        for coin in tx_spent.iter().unwrap() {
            assert!(coin.is_coinbase().unwrap());
            coins_seen += 1;
        }
    }
    assert_eq!(coins_seen, 1);
}

#[test]
fn test_context_interrupt() {
    setup();
    let context = regtest_context();
    assert!(context.interrupt().is_ok());
}
