//! Line-delimited JSON harness for driving the binding from an external
//! test runner.
//!
//! One JSON request per stdin line, one JSON response per stdout line, in
//! order. A request is `{"id": ..., "method": "...", "params": {...}}`; the
//! response is `{"id": ..., "success": {}}` or
//! `{"id": ..., "error": {"type": "...", "variant": "..."}}`. Requests
//! without an id are malformed. Blank lines are skipped. The process exits
//! 0 when stdin closes and 1 on an I/O failure.

use std::io::{self, BufRead, Write};

use serde::Deserialize;
use serde_json::{json, Value};

use bitcoinkernel::{
    verify, KernelError, ScriptPubkey, ScriptVerifyError, Transaction, TxOut, VERIFY_ALL,
    VERIFY_ALL_PRE_TAPROOT, VERIFY_CHECKLOCKTIMEVERIFY, VERIFY_CHECKSEQUENCEVERIFY,
    VERIFY_DERSIG, VERIFY_NONE, VERIFY_NULLDUMMY, VERIFY_P2SH, VERIFY_TAPROOT, VERIFY_WITNESS,
};

fn main() {
    env_logger::init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut output = stdout.lock();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                log::error!("reading request failed: {}", err);
                std::process::exit(1);
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(&line);
        if writeln!(output, "{}", response)
            .and_then(|_| output.flush())
            .is_err()
        {
            std::process::exit(1);
        }
    }
}

fn handle_line(line: &str) -> Value {
    let request: Value = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(_) => return error_response(Value::Null, "Protocol", "MalformedRequest"),
    };
    // Both the id and the method are mandatory; a request missing either
    // cannot be answered meaningfully and is malformed.
    let id = match request.get("id") {
        Some(id) if !id.is_null() => id.clone(),
        _ => return error_response(Value::Null, "Protocol", "MalformedRequest"),
    };
    let method = match request.get("method").and_then(Value::as_str) {
        Some(method) => method,
        None => return error_response(id, "Protocol", "MalformedRequest"),
    };
    let params = request.get("params").cloned().unwrap_or(Value::Null);

    match method {
        "script_pubkey.verify" => match handle_script_pubkey_verify(params) {
            Ok(()) => json!({ "id": id, "success": {} }),
            Err(HandlerError::InvalidParams) => error_response(id, "Protocol", "InvalidParams"),
            Err(HandlerError::Kernel(err)) => {
                let (error_type, variant) = classify_kernel_error(&err);
                error_response(id, error_type, variant)
            }
        },
        _ => error_response(id, "Protocol", "UnknownMethod"),
    }
}

fn error_response(id: Value, error_type: &str, variant: &str) -> Value {
    json!({ "id": id, "error": { "type": error_type, "variant": variant } })
}

enum HandlerError {
    InvalidParams,
    Kernel(KernelError),
}

impl From<KernelError> for HandlerError {
    fn from(err: KernelError) -> Self {
        HandlerError::Kernel(err)
    }
}

#[derive(Deserialize)]
struct VerifyParams {
    script_pubkey_hex: String,
    tx_hex: String,
    input_index: u32,
    #[serde(default)]
    amount: Option<i64>,
    #[serde(default)]
    flags: Option<Value>,
    #[serde(default)]
    spent_outputs: Vec<SpentOutputParam>,
}

#[derive(Deserialize)]
struct SpentOutputParam {
    script_pubkey_hex: String,
    #[serde(alias = "amount")]
    value: i64,
}

fn handle_script_pubkey_verify(params: Value) -> Result<(), HandlerError> {
    let params: VerifyParams =
        serde_json::from_value(params).map_err(|_| HandlerError::InvalidParams)?;

    let flags = match params.flags {
        None => None,
        Some(value) => Some(parse_flags(&value)?),
    };

    let script_pubkey = ScriptPubkey::new(&decode_hex(&params.script_pubkey_hex)?)?;
    let tx_to = Transaction::new(&decode_hex(&params.tx_hex)?)?;

    let mut spent_outputs = Vec::with_capacity(params.spent_outputs.len());
    for spent in &params.spent_outputs {
        let spent_script = ScriptPubkey::new(&decode_hex(&spent.script_pubkey_hex)?)?;
        spent_outputs.push(TxOut::new(&spent_script, spent.value)?);
    }

    verify(
        &script_pubkey,
        params.amount,
        &tx_to,
        params.input_index,
        flags,
        &spent_outputs,
    )?;
    Ok(())
}

fn decode_hex(value: &str) -> Result<Vec<u8>, HandlerError> {
    hex::decode(value).map_err(|_| HandlerError::InvalidParams)
}

/// Flags arrive either as a raw integer or as one of the exported flag
/// constant names.
fn parse_flags(value: &Value) -> Result<u32, HandlerError> {
    if let Some(number) = value.as_u64() {
        return u32::try_from(number).map_err(|_| HandlerError::InvalidParams);
    }
    let name = value.as_str().ok_or(HandlerError::InvalidParams)?;
    match name {
        "VERIFY_NONE" => Ok(VERIFY_NONE),
        "VERIFY_P2SH" => Ok(VERIFY_P2SH),
        "VERIFY_DERSIG" => Ok(VERIFY_DERSIG),
        "VERIFY_NULLDUMMY" => Ok(VERIFY_NULLDUMMY),
        "VERIFY_CHECKLOCKTIMEVERIFY" => Ok(VERIFY_CHECKLOCKTIMEVERIFY),
        "VERIFY_CHECKSEQUENCEVERIFY" => Ok(VERIFY_CHECKSEQUENCEVERIFY),
        "VERIFY_WITNESS" => Ok(VERIFY_WITNESS),
        "VERIFY_TAPROOT" => Ok(VERIFY_TAPROOT),
        "VERIFY_ALL" => Ok(VERIFY_ALL),
        "VERIFY_ALL_PRE_TAPROOT" => Ok(VERIFY_ALL_PRE_TAPROOT),
        _ => Err(HandlerError::InvalidParams),
    }
}

fn classify_kernel_error(err: &KernelError) -> (&'static str, &'static str) {
    match err {
        KernelError::ScriptVerify(script_err) => (
            "ScriptVerify",
            match script_err {
                ScriptVerifyError::TxInputIndex => "TxInputIndex",
                ScriptVerifyError::InvalidFlags => "InvalidFlags",
                ScriptVerifyError::InvalidFlagsCombination => "InvalidFlagsCombination",
                ScriptVerifyError::SpentOutputsMismatch => "SpentOutputsMismatch",
                ScriptVerifyError::SpentOutputsRequired => "SpentOutputsRequired",
                ScriptVerifyError::Invalid => "Invalid",
            },
        ),
        _ => ("Binding", "BindingError"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_line() {
        let response = handle_line("not json");
        assert_eq!(response["id"], Value::Null);
        assert_eq!(response["error"]["type"], "Protocol");
        assert_eq!(response["error"]["variant"], "MalformedRequest");
    }

    #[test]
    fn test_missing_id_is_malformed() {
        let response = handle_line(r#"{"method": "script_pubkey.verify", "params": {}}"#);
        assert_eq!(response["id"], Value::Null);
        assert_eq!(response["error"]["type"], "Protocol");
        assert_eq!(response["error"]["variant"], "MalformedRequest");
    }

    #[test]
    fn test_null_id_is_malformed() {
        let response = handle_line(r#"{"id": null, "method": "script_pubkey.verify"}"#);
        assert_eq!(response["id"], Value::Null);
        assert_eq!(response["error"]["variant"], "MalformedRequest");
    }

    #[test]
    fn test_success_payload_is_empty_object() {
        let script = "76a9144bfbaf6afb76cc5771bc6404810d1cc041a6933988ac";
        let tx = "02000000013f7cebd65c27431a90bba7f796914fe8cc2ddfc3f2cbd6f7e5f2fc854534da95000000006b483045022100de1ac3bcdfb0332207c4a91f3832bd2c2915840165f876ab47c5f8996b971c3602201c6c053d750fadde599e6f5c4e1963df0f01fc0d97815e8157e3d59fe09ca30d012103699b464d1d8bc9e47d4fb1cdaa89a1c5783d68363c4dbc4b524ed3d857148617feffffff02836d3c01000000001976a914fc25d6d5c94003bf5b0c7b640a248e2c637fcfb088ac7ada8202000000001976a914fbed3d9b11183209a57999d54d59f67c019e756c88ac6acb0700";
        let request = json!({
            "id": 11,
            "method": "script_pubkey.verify",
            "params": {
                "script_pubkey_hex": script,
                "tx_hex": tx,
                "input_index": 0,
                "flags": "VERIFY_ALL_PRE_TAPROOT",
            },
        });
        let response = handle_line(&request.to_string());
        assert_eq!(response["id"], 11);
        assert_eq!(response["success"], json!({}));
        assert!(response.get("error").is_none());
    }

    #[test]
    fn test_missing_method_keeps_id() {
        let response = handle_line(r#"{"id": 7, "params": {}}"#);
        assert_eq!(response["id"], 7);
        assert_eq!(response["error"]["variant"], "MalformedRequest");
    }

    #[test]
    fn test_unknown_method() {
        let response = handle_line(r#"{"id": 1, "method": "chain.fly", "params": {}}"#);
        assert_eq!(response["id"], 1);
        assert_eq!(response["error"]["type"], "Protocol");
        assert_eq!(response["error"]["variant"], "UnknownMethod");
    }

    #[test]
    fn test_missing_params_is_invalid_params() {
        let response = handle_line(r#"{"id": 2, "method": "script_pubkey.verify"}"#);
        assert_eq!(response["error"]["variant"], "InvalidParams");
    }

    #[test]
    fn test_bad_hex_is_invalid_params() {
        let response = handle_line(
            r#"{"id": 3, "method": "script_pubkey.verify",
                "params": {"script_pubkey_hex": "zz", "tx_hex": "00", "input_index": 0}}"#,
        );
        assert_eq!(response["error"]["variant"], "InvalidParams");
    }

    #[test]
    fn test_flag_names_parse() {
        assert_eq!(
            parse_flags(&json!("VERIFY_ALL_PRE_TAPROOT")).ok(),
            Some(VERIFY_ALL_PRE_TAPROOT)
        );
        assert_eq!(parse_flags(&json!(0)).ok(), Some(0));
        assert!(parse_flags(&json!("VERIFY_EVERYTHING")).is_err());
        assert!(parse_flags(&json!(u64::MAX)).is_err());
    }
}
