//! Read-only namespace accessors — thin callers of
//! [`RequestManager::request_blocking`](crate::RequestManager::request_blocking).

pub mod net;
pub mod txpool;
pub mod version;

pub use net::Net;
pub use txpool::TxPool;
pub use version::Version;
