//! chaindispatch-http — HTTP JSON-RPC provider.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chaindispatch_core::RequestManager;
//! use chaindispatch_format::FormattingMiddleware;
//! use chaindispatch_http::HttpProvider;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Arc::new(HttpProvider::default_for("http://127.0.0.1:8545")?);
//! let manager = RequestManager::new(provider, vec![FormattingMiddleware::builder()]);
//! let block = manager.request_blocking("eth_blockNumber", vec![], None).await?;
//! println!("block: {block}");
//! # Ok(())
//! # }
//! ```

pub mod provider;
pub mod retry;

pub use provider::{decode_response, HttpProvider, HttpProviderConfig};
pub use retry::{RetryConfig, RetryPolicy};
