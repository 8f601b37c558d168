//! Version information for the client and the connected node.

use serde_json::Value;

use crate::error::DispatchError;
use crate::manager::RequestManager;

pub struct Version {
    manager: RequestManager,
}

impl Version {
    pub fn new(manager: RequestManager) -> Self {
        Self { manager }
    }

    /// Version of this library.
    pub fn api(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// Client version string reported by the node.
    pub async fn node(&self) -> Result<Value, DispatchError> {
        self.manager.request_blocking("web3_clientVersion", vec![], None).await
    }

    /// Network id.
    pub async fn network(&self) -> Result<Value, DispatchError> {
        self.manager.request_blocking("net_version", vec![], None).await
    }

    /// Ethereum protocol version.
    pub async fn ethereum(&self) -> Result<Value, DispatchError> {
        self.manager.request_blocking("eth_protocolVersion", vec![], None).await
    }
}
