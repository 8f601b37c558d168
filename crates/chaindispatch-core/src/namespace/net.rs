//! `net_*` accessors.

use serde_json::Value;

use crate::error::DispatchError;
use crate::manager::RequestManager;

pub struct Net {
    manager: RequestManager,
}

impl Net {
    pub fn new(manager: RequestManager) -> Self {
        Self { manager }
    }

    /// Whether the node is listening for peers.
    pub async fn listening(&self) -> Result<Value, DispatchError> {
        self.manager.request_blocking("net_listening", vec![], None).await
    }

    /// Callback-style variant; not implemented.
    pub fn get_listening(&self) -> Result<Value, DispatchError> {
        Err(DispatchError::Unsupported { operation: "net.get_listening" })
    }

    /// Number of connected peers.
    pub async fn peer_count(&self) -> Result<Value, DispatchError> {
        self.manager.request_blocking("net_peerCount", vec![], None).await
    }

    /// Callback-style variant; not implemented.
    pub fn get_peer_count(&self) -> Result<Value, DispatchError> {
        Err(DispatchError::Unsupported { operation: "net.get_peer_count" })
    }
}
