//! chaindispatch CLI — send JSON-RPC calls through a request manager.
//!
//! Usage:
//! ```bash
//! # Formatted call: native params in, native result out
//! chaindispatch call --url http://127.0.0.1:8545 --method eth_getBalance \
//!     --params '["0x407d73d8a49eeb85d32cf465507dd71d507100c1", "latest"]'
//!
//! # Same call without the formatting middleware
//! chaindispatch call --url http://127.0.0.1:8545 --method eth_blockNumber --raw
//!
//! # Methods with request/result formatters
//! chaindispatch methods
//! ```

mod logging;

use std::collections::BTreeSet;
use std::env;
use std::process;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use chaindispatch_core::{DispatchError, RequestManager};
use chaindispatch_format::{request_formatters, result_formatters, FormattingMiddleware};
use chaindispatch_http::HttpProvider;
use serde_json::Value;

use crate::logging::{init_tracing, LogConfig};

#[tokio::main]
async fn main() {
    init_tracing(&LogConfig::from_env());

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "call" => cmd_call(&args[2..]).await,
        "methods" => {
            cmd_methods();
            Ok(())
        }
        "version" | "--version" | "-V" => {
            println!("chaindispatch {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("chaindispatch {}", env!("CARGO_PKG_VERSION"));
    println!("Send JSON-RPC calls through a formatting request manager\n");
    println!("USAGE:");
    println!("    chaindispatch <COMMAND>\n");
    println!("COMMANDS:");
    println!("    call       Send one JSON-RPC call and print the result");
    println!("    methods    List methods with request/result formatters");
    println!("    version    Print version");
    println!("    help       Print this help\n");
    println!("CALL FLAGS:");
    println!("    --url <URL>        RPC endpoint URL  [required]");
    println!("    --method <NAME>    JSON-RPC method   [required]");
    println!("    --params <JSON>    Parameter array   [default: []]");
    println!("    --raw              Skip the formatting middleware\n");
    println!("ENVIRONMENT:");
    println!("    {}      Log level or filter directives (RUST_LOG overrides)", logging::LOG_ENV);
    println!("    {} Emit JSON log lines when set to 1", logging::LOG_JSON_ENV);
}

async fn cmd_call(args: &[String]) -> anyhow::Result<()> {
    let url = parse_flag(args, "--url").ok_or_else(|| anyhow!("--url is required"))?;
    let method = parse_flag(args, "--method").ok_or_else(|| anyhow!("--method is required"))?;
    let params = match parse_flag(args, "--params") {
        Some(raw) => parse_params(&raw)?,
        None => Vec::new(),
    };

    let provider = Arc::new(HttpProvider::default_for(&url)?);
    let manager = if has_flag(args, "--raw") {
        RequestManager::with_provider(provider)
    } else {
        RequestManager::new(provider, vec![FormattingMiddleware::builder()])
    };

    tracing::debug!(%url, %method, middlewares = manager.middlewares().len(), "dispatching call");

    let result = match manager.request_blocking(&method, params, None).await {
        Ok(result) => result,
        Err(DispatchError::Rpc(payload)) => {
            bail!("node returned an error: {}", serde_json::to_string(&payload)?)
        }
        Err(e) => return Err(anyhow::Error::new(e).context(format!("{method} failed"))),
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn cmd_methods() {
    let requests = request_formatters();
    let results = result_formatters();
    let methods: BTreeSet<&str> = requests
        .methods()
        .into_iter()
        .chain(results.methods())
        .collect();

    println!("{:<42} {:<8} {:<8}", "METHOD", "PARAMS", "RESULT");
    for method in methods {
        println!(
            "{:<42} {:<8} {:<8}",
            method,
            mark(requests.contains(method)),
            mark(results.contains(method))
        );
    }
}

fn mark(present: bool) -> &'static str {
    if present {
        "yes"
    } else {
        "-"
    }
}

fn parse_params(raw: &str) -> anyhow::Result<Vec<Value>> {
    let value: Value = serde_json::from_str(raw).context("--params is not valid JSON")?;
    match value {
        Value::Array(params) => Ok(params),
        other => bail!("--params must be a JSON array, got {other}"),
    }
}

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flags_are_read_by_name() {
        let a = args(&["--method", "eth_blockNumber", "--raw", "--url", "http://x"]);
        assert_eq!(parse_flag(&a, "--url").as_deref(), Some("http://x"));
        assert_eq!(parse_flag(&a, "--method").as_deref(), Some("eth_blockNumber"));
        assert_eq!(parse_flag(&a, "--params"), None);
        assert!(has_flag(&a, "--raw"));
    }

    #[test]
    fn trailing_flag_without_value() {
        assert_eq!(parse_flag(&args(&["--url"]), "--url"), None);
    }

    #[test]
    fn params_must_be_an_array() {
        assert_eq!(
            parse_params(r#"["0xabc", 100]"#).unwrap(),
            vec![json!("0xabc"), json!(100)]
        );
        assert!(parse_params(r#"{"a": 1}"#).is_err());
        assert!(parse_params("not json").is_err());
    }
}
