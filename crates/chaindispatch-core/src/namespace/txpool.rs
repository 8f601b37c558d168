//! `txpool_*` accessors.

use serde_json::Value;

use crate::error::DispatchError;
use crate::manager::RequestManager;

pub struct TxPool {
    manager: RequestManager,
}

impl TxPool {
    pub fn new(manager: RequestManager) -> Self {
        Self { manager }
    }

    pub async fn content(&self) -> Result<Value, DispatchError> {
        self.manager.request_blocking("txpool_content", vec![], None).await
    }

    pub async fn inspect(&self) -> Result<Value, DispatchError> {
        self.manager.request_blocking("txpool_inspect", vec![], None).await
    }

    pub async fn status(&self) -> Result<Value, DispatchError> {
        self.manager.request_blocking("txpool_status", vec![], None).await
    }
}
