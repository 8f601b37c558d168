//! chaindispatch-core — request dispatch for blockchain node clients.
//!
//! # Overview
//!
//! Calls flow from the caller through an ordered middleware chain to a
//! pluggable transport and back:
//!
//! ```text
//! caller → [mw 0] → [mw 1] → … → Provider::make_request
//! caller ← [mw 0] ← [mw 1] ← … ← response
//! ```
//!
//! The core crate defines:
//!
//! - [`Provider`] — the async transport trait
//! - [`Middleware`] — request/response transform stage
//! - [`RequestManager`] — owns the provider and chain; blocking and async dispatch
//! - [`PendingRequests`] — correlation of async request ids to in-flight tasks
//! - [`DispatchError`] / [`FormatError`] / [`ProviderError`] — error types
//! - [`namespace`] — thin `net`, `version`, `txpool` accessors

pub mod error;
pub mod id;
pub mod manager;
pub mod middleware;
pub mod namespace;
pub mod pending;
pub mod provider;
pub mod request;

pub use error::{DispatchError, FormatError, ProviderError};
pub use id::RequestId;
pub use manager::{DeprecationNotice, RequestManager, DEPRECATION_TARGET};
pub use middleware::{middleware_builder, BaseMiddleware, Middleware, MiddlewareBuilder};
pub use pending::PendingRequests;
pub use provider::Provider;
pub use request::{JsonRpcRequest, JsonRpcResponse, RpcId, RpcParam, RpcRequest, RpcResponse};
