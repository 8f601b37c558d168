//! Per-method request and result formatter tables.
//!
//! Request formatters receive the whole parameter list as a JSON array;
//! result formatters receive the `result` payload. Methods without an entry
//! pass through unchanged.

use std::collections::HashMap;
use std::sync::OnceLock;

use chaindispatch_core::FormatError;
use serde_json::Value;

use crate::combinators::{
    apply_formatter_at_index, apply_formatter_if, apply_formatter_to_array,
    apply_formatter_to_values, apply_formatters_to_dict, apply_key_formatter, is_object, nullable,
    Formatter,
};
use crate::quantity::{quantity_or_tag, to_ascii, to_hex_quantity, to_integer};

/// Immutable map from method name to formatter.
#[derive(Debug, Default)]
pub struct FormatterTable {
    entries: HashMap<&'static str, Formatter>,
}

impl FormatterTable {
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Formatter)>,
    {
        Self { entries: entries.into_iter().collect() }
    }

    /// Exact-match lookup.
    pub fn get(&self, method: &str) -> Option<&Formatter> {
        self.entries.get(method)
    }

    pub fn contains(&self, method: &str) -> bool {
        self.entries.contains_key(method)
    }

    /// Format `value` for `method`; unknown methods pass through.
    pub fn apply(&self, method: &str, value: Value) -> Result<Value, FormatError> {
        match self.get(method) {
            Some(formatter) => formatter.apply(value),
            None => Ok(value),
        }
    }

    /// Method names, sorted.
    pub fn methods(&self) -> Vec<&'static str> {
        let mut methods: Vec<_> = self.entries.keys().copied().collect();
        methods.sort_unstable();
        methods
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn integer() -> Formatter {
    Formatter::new(to_integer)
}

fn nullable_integer() -> Formatter {
    nullable(integer())
}

fn hex_quantity() -> Formatter {
    Formatter::new(to_hex_quantity)
}

fn block_id() -> Formatter {
    Formatter::new(quantity_or_tag)
}

fn ascii() -> Formatter {
    Formatter::new(to_ascii)
}

// ─── Structure formatters ─────────────────────────────────────────────────────

/// Transaction object as returned by the node.
pub fn transaction_formatter() -> Formatter {
    apply_formatters_to_dict([
        ("blockNumber", nullable_integer()),
        ("transactionIndex", nullable_integer()),
        ("nonce", integer()),
        ("gas", integer()),
        ("gasPrice", integer()),
        ("value", integer()),
    ])
}

/// Log entry. Pending logs carry `null` positions.
pub fn log_formatter() -> Formatter {
    apply_formatters_to_dict([
        ("blockNumber", nullable_integer()),
        ("transactionIndex", nullable_integer()),
        ("logIndex", nullable_integer()),
    ])
}

/// Transaction receipt.
pub fn receipt_formatter() -> Formatter {
    apply_formatters_to_dict([
        ("blockNumber", nullable_integer()),
        ("transactionIndex", nullable_integer()),
        ("cumulativeGasUsed", integer()),
        ("gasUsed", integer()),
        ("status", nullable_integer()),
        ("logs", apply_formatter_to_array(log_formatter())),
    ])
}

/// Block. `transactions` holds either hashes or full transaction objects.
pub fn block_formatter() -> Formatter {
    apply_formatters_to_dict([
        ("number", nullable_integer()),
        ("gasLimit", integer()),
        ("gasUsed", integer()),
        ("size", integer()),
        ("timestamp", integer()),
        ("difficulty", integer()),
        ("totalDifficulty", nullable_integer()),
        ("baseFeePerGas", integer()),
        (
            "transactions",
            apply_formatter_to_array(apply_formatter_if(transaction_formatter(), is_object)),
        ),
    ])
}

/// Outgoing transaction object (`eth_sendTransaction`, `eth_call`, …).
pub fn transaction_request_formatter() -> Formatter {
    apply_formatters_to_dict([
        ("value", hex_quantity()),
        ("gas", hex_quantity()),
        ("gasPrice", hex_quantity()),
        ("nonce", hex_quantity()),
    ])
}

/// Log filter object (`eth_newFilter`, `eth_getLogs`).
pub fn filter_params_formatter() -> Formatter {
    apply_formatters_to_dict([("fromBlock", block_id()), ("toBlock", block_id())])
}

/// `txpool_content`: `{pending|queued: {address: {nonce: tx}}}`.
pub fn txpool_content_formatter() -> Formatter {
    let pool = Formatter::pipeline(vec![
        apply_key_formatter(ascii()),
        apply_formatter_to_values(apply_formatter_to_values(transaction_formatter())),
    ]);
    apply_formatters_to_dict([("pending", pool.clone()), ("queued", pool)])
}

/// `txpool_inspect`: `{pending|queued: {address: {nonce: summary}}}`.
pub fn txpool_inspect_formatter() -> Formatter {
    let pool = apply_key_formatter(ascii());
    apply_formatters_to_dict([("pending", pool.clone()), ("queued", pool)])
}

/// `txpool_status`: `{pending, queued}` counts.
pub fn txpool_status_formatter() -> Formatter {
    apply_formatters_to_dict([("pending", integer()), ("queued", integer())])
}

// ─── Tables ───────────────────────────────────────────────────────────────────

fn build_request_formatters() -> FormatterTable {
    let block_at_0 = apply_formatter_at_index(block_id(), 0);
    let block_at_1 = apply_formatter_at_index(block_id(), 1);
    let index_at_1 = apply_formatter_at_index(hex_quantity(), 1);
    let block_and_index = block_at_0.clone().then(index_at_1.clone());
    let tx_at_0 = apply_formatter_at_index(transaction_request_formatter(), 0);
    let filter_at_0 = apply_formatter_at_index(filter_params_formatter(), 0);

    FormatterTable::new([
        ("eth_getBalance", block_at_1.clone()),
        ("eth_getCode", block_at_1.clone()),
        ("eth_getTransactionCount", block_at_1.clone()),
        (
            "eth_getStorageAt",
            index_at_1.clone().then(apply_formatter_at_index(block_id(), 2)),
        ),
        ("eth_getBlockByNumber", block_at_0.clone()),
        ("eth_getBlockTransactionCountByNumber", block_at_0.clone()),
        ("eth_getUncleCountByBlockNumber", block_at_0),
        ("eth_getTransactionByBlockNumberAndIndex", block_and_index.clone()),
        ("eth_getUncleByBlockNumberAndIndex", block_and_index),
        ("eth_getTransactionByBlockHashAndIndex", index_at_1.clone()),
        ("eth_getUncleByBlockHashAndIndex", index_at_1),
        ("eth_sendTransaction", tx_at_0.clone()),
        ("eth_estimateGas", tx_at_0.clone()),
        ("eth_call", tx_at_0.then(block_at_1)),
        ("eth_newFilter", filter_at_0.clone()),
        ("eth_getLogs", filter_at_0),
    ])
}

fn build_result_formatters() -> FormatterTable {
    let block = nullable(block_formatter());
    let transaction = nullable(transaction_formatter());
    let logs = apply_formatter_to_array(apply_formatter_if(log_formatter(), is_object));

    FormatterTable::new([
        ("eth_gasPrice", integer()),
        ("eth_blockNumber", integer()),
        ("eth_getBalance", integer()),
        ("eth_getTransactionCount", integer()),
        ("eth_estimateGas", integer()),
        ("eth_getBlockTransactionCountByHash", nullable_integer()),
        ("eth_getBlockTransactionCountByNumber", nullable_integer()),
        ("eth_getUncleCountByBlockHash", nullable_integer()),
        ("eth_getUncleCountByBlockNumber", nullable_integer()),
        ("eth_newFilter", integer()),
        ("eth_newBlockFilter", integer()),
        ("net_peerCount", integer()),
        ("eth_getBlockByNumber", block.clone()),
        ("eth_getBlockByHash", block.clone()),
        ("eth_getUncleByBlockHashAndIndex", block.clone()),
        ("eth_getUncleByBlockNumberAndIndex", block),
        ("eth_getTransactionByHash", transaction.clone()),
        ("eth_getTransactionByBlockHashAndIndex", transaction.clone()),
        ("eth_getTransactionByBlockNumberAndIndex", transaction),
        ("eth_getTransactionReceipt", nullable(receipt_formatter())),
        ("eth_getLogs", logs.clone()),
        ("eth_getFilterChanges", logs.clone()),
        ("eth_getFilterLogs", logs),
        ("eth_sendTransaction", ascii()),
        ("eth_sendRawTransaction", ascii()),
        ("txpool_content", txpool_content_formatter()),
        ("txpool_inspect", txpool_inspect_formatter()),
        ("txpool_status", txpool_status_formatter()),
    ])
}

/// Parameter formatters, keyed by method.
pub fn request_formatters() -> &'static FormatterTable {
    static TABLE: OnceLock<FormatterTable> = OnceLock::new();
    TABLE.get_or_init(build_request_formatters)
}

/// Result formatters, keyed by method.
pub fn result_formatters() -> &'static FormatterTable {
    static TABLE: OnceLock<FormatterTable> = OnceLock::new();
    TABLE.get_or_init(build_result_formatters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_methods_pass_through() {
        let params = json!([1, "0xabc"]);
        assert_eq!(request_formatters().apply("web3_sha3", params.clone()).unwrap(), params);
        assert_eq!(result_formatters().apply("web3_sha3", json!("0x01")).unwrap(), json!("0x01"));
    }

    #[test]
    fn lookup_is_exact() {
        assert!(result_formatters().contains("eth_gasPrice"));
        assert!(!result_formatters().contains("ETH_GASPRICE"));
        assert!(!result_formatters().contains("eth_gasPrice "));
    }

    #[test]
    fn get_balance_block_position() {
        let out = request_formatters()
            .apply("eth_getBalance", json!(["0xd3cda913deb6f67967b99d67acdfa1712c293601", 100]))
            .unwrap();
        assert_eq!(out, json!(["0xd3cda913deb6f67967b99d67acdfa1712c293601", "0x64"]));

        let latest = request_formatters()
            .apply("eth_getBalance", json!(["0xd3cd", "latest"]))
            .unwrap();
        assert_eq!(latest[1], "latest");

        let err = request_formatters().apply("eth_getBalance", json!(["0xd3cd"])).unwrap_err();
        assert_eq!(err, FormatError::IndexOutOfRange { index: 1, len: 1 });
    }

    #[test]
    fn storage_at_formats_slot_and_block() {
        let out = request_formatters()
            .apply("eth_getStorageAt", json!(["0xabc", 2, 17]))
            .unwrap();
        assert_eq!(out, json!(["0xabc", "0x2", "0x11"]));
    }

    #[test]
    fn send_transaction_params() {
        let out = request_formatters()
            .apply(
                "eth_sendTransaction",
                json!([{
                    "from": "0xb60e8dd61c5d32be8058bb8eb970870f07233155",
                    "to": "0xd46e8dd67c5d32be8058bb8eb970870f07244567",
                    "gas": 30400,
                    "gasPrice": 10_000_000_000_000u64,
                    "value": "0x9184e72a",
                    "nonce": 0,
                    "data": "0xd46e8dd6"
                }]),
            )
            .unwrap();
        assert_eq!(out[0]["gas"], "0x76c0");
        assert_eq!(out[0]["gasPrice"], "0x9184e72a000");
        assert_eq!(out[0]["value"], "0x9184e72a");
        assert_eq!(out[0]["nonce"], "0x0");
        assert_eq!(out[0]["data"], "0xd46e8dd6");
    }

    #[test]
    fn block_result_with_full_transactions() {
        let block = json!({
            "number": "0x1b4",
            "hash": "0xdc0818cf78f21a8e70579cb46a43643f78291264dda342ae31049421c82d21ae",
            "gasLimit": "0x1388",
            "gasUsed": "0x0",
            "size": "0x27f07",
            "timestamp": "0x54e34e8e",
            "difficulty": "0x4ea3f27bc",
            "totalDifficulty": "0x78ed983323d",
            "transactions": [
                "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b",
                {"hash": "0x01", "blockNumber": "0x1b4", "transactionIndex": "0x1",
                 "nonce": "0x2", "gas": "0x5208", "gasPrice": "0x1", "value": "0x0"}
            ]
        });
        let out = result_formatters().apply("eth_getBlockByNumber", block).unwrap();
        assert_eq!(out["number"], 436);
        assert_eq!(out["gasLimit"], 5000);
        assert_eq!(out["timestamp"], 1424182926);
        assert_eq!(
            out["transactions"][0],
            "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b"
        );
        assert_eq!(out["transactions"][1]["gas"], 21000);
        assert_eq!(out["transactions"][1]["blockNumber"], 436);
        assert_eq!(out["hash"], "0xdc0818cf78f21a8e70579cb46a43643f78291264dda342ae31049421c82d21ae");
    }

    #[test]
    fn pending_block_keeps_null_number() {
        let block = json!({
            "number": null,
            "hash": null,
            "gasLimit": "0x1",
            "gasUsed": "0x1",
            "size": "0x1",
            "timestamp": "0x1",
            "difficulty": "0x1",
            "transactions": []
        });
        let out = result_formatters().apply("eth_getBlockByNumber", block).unwrap();
        assert!(out["number"].is_null());
        assert!(out["hash"].is_null());
        assert_eq!(out["gasLimit"], 1);
    }

    #[test]
    fn missing_block_is_null() {
        let out = result_formatters().apply("eth_getBlockByHash", Value::Null).unwrap();
        assert!(out.is_null());
    }

    #[test]
    fn pending_transaction_nullable_fields() {
        let tx = json!({
            "blockHash": null, "blockNumber": null, "transactionIndex": null,
            "nonce": "0x15", "gas": "0x5208", "gasPrice": "0x4a817c800", "value": "0xde0b6b3a7640000"
        });
        let out = result_formatters().apply("eth_getTransactionByHash", tx).unwrap();
        assert!(out["blockNumber"].is_null());
        assert!(out["blockHash"].is_null());
        assert_eq!(out["nonce"], 21);
        assert_eq!(out["gasPrice"], 20_000_000_000u64);
        assert_eq!(out["value"], 1_000_000_000_000_000_000u64);
    }

    #[test]
    fn receipt_with_logs() {
        let receipt = json!({
            "transactionHash": "0xab",
            "blockNumber": "0xb",
            "transactionIndex": "0x1",
            "cumulativeGasUsed": "0x33bc",
            "gasUsed": "0x4dc",
            "status": "0x1",
            "logs": [{"logIndex": "0x0", "blockNumber": "0xb", "transactionIndex": "0x1", "data": "0x"}]
        });
        let out = result_formatters().apply("eth_getTransactionReceipt", receipt).unwrap();
        assert_eq!(out["cumulativeGasUsed"], 13244);
        assert_eq!(out["gasUsed"], 1244);
        assert_eq!(out["status"], 1);
        assert_eq!(out["logs"][0]["blockNumber"], 11);
        assert_eq!(out["logs"][0]["data"], "0x");

        let pending = result_formatters().apply("eth_getTransactionReceipt", Value::Null).unwrap();
        assert!(pending.is_null());
    }

    #[test]
    fn filter_changes_may_be_hashes() {
        let out = result_formatters()
            .apply("eth_getFilterChanges", json!(["0xaa", {"logIndex": "0x2", "blockNumber": null}]))
            .unwrap();
        assert_eq!(out, json!(["0xaa", {"logIndex": 2, "blockNumber": null}]));
    }

    #[test]
    fn scalar_results() {
        let table = result_formatters();
        assert_eq!(table.apply("eth_gasPrice", json!("0x4a817c800")).unwrap(), 20_000_000_000u64);
        assert_eq!(table.apply("eth_blockNumber", json!("0x4b7")).unwrap(), 1207);
        assert_eq!(table.apply("net_peerCount", json!("0x2a")).unwrap(), 42);
        assert!(matches!(
            table.apply("eth_gasPrice", json!("nope")),
            Err(FormatError::InvalidHex(_))
        ));
    }

    #[test]
    fn txpool_content_decodes_nested_transactions() {
        let content = json!({
            "pending": {
                "0x0216d5032f356960cd3749c31ab34eeff21b3395": {
                    "806": {"nonce": "0x326", "gas": "0x15f90", "gasPrice": "0xba43b7400",
                            "value": "0x0", "blockNumber": null, "transactionIndex": null}
                }
            },
            "queued": {}
        });
        let out = result_formatters().apply("txpool_content", content).unwrap();
        let tx = &out["pending"]["0x0216d5032f356960cd3749c31ab34eeff21b3395"]["806"];
        assert_eq!(tx["nonce"], 806);
        assert_eq!(tx["gas"], 90000);
        assert!(tx["blockNumber"].is_null());
        assert_eq!(out["queued"], json!({}));
    }

    #[test]
    fn txpool_inspect_and_status() {
        let inspect = json!({
            "pending": {"0x26588a9301b0428d95e6fc3a5024fce8bec12d51": {
                "31813": "0x3375ee30428b2a8b2bcb0c1e2a2b9f79b5d4df07: 0 wei + 500000 × 20000000000 gas"
            }},
            "queued": {}
        });
        let out = result_formatters().apply("txpool_inspect", inspect.clone()).unwrap();
        assert_eq!(out, inspect);

        let status = result_formatters()
            .apply("txpool_status", json!({"pending": "0xa", "queued": "0x7"}))
            .unwrap();
        assert_eq!(status, json!({"pending": 10, "queued": 7}));
    }

    #[test]
    fn tables_list_methods() {
        let methods = result_formatters().methods();
        assert!(methods.windows(2).all(|w| w[0] < w[1]));
        assert!(methods.contains(&"txpool_content"));
        assert!(!request_formatters().is_empty());
        assert_eq!(request_formatters().len(), request_formatters().methods().len());
    }
}
