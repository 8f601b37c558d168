//! chaindispatch-format — wire-format value formatting for ChainDispatch.
//!
//! Nodes speak in hex quantities and byte strings; applications want
//! integers and text. This crate provides:
//!
//! - [`quantity`] — `hex_to_integer` / `hex` and the JSON value codecs
//! - [`combinators`] — [`Formatter`] and the combinators used to build tables
//! - [`tables`] — per-method request and result formatter tables
//! - [`FormattingMiddleware`] — applies the tables inside a `RequestManager`
//!
//! # Quick start
//! ```rust,no_run
//! use std::sync::Arc;
//! use chaindispatch_core::{Provider, RequestManager};
//! use chaindispatch_format::FormattingMiddleware;
//!
//! fn manager(provider: Arc<dyn Provider>) -> RequestManager {
//!     RequestManager::new(provider, vec![FormattingMiddleware::builder()])
//! }
//! ```

pub mod combinators;
pub mod middleware;
pub mod quantity;
pub mod tables;

pub use combinators::{
    apply_formatter_at_index, apply_formatter_if, apply_formatter_to_array,
    apply_formatter_to_iterable, apply_formatter_to_values, apply_formatters_to_dict,
    apply_formatters_to_dict_with_default, apply_key_formatter, nullable, Formatter,
};
pub use middleware::FormattingMiddleware;
pub use quantity::{hex, hex_to_integer};
pub use tables::{request_formatters, result_formatters, FormatterTable};
