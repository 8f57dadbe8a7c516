//! Actions that refuse the operation

use super::{CreateAction, DeleteAction, UpdateAction};
use crate::error::Result;
use crate::response::ApiResponse;
use crate::schema::Instance;
use crate::visitor::{ItemRef, Visitor};
use async_trait::async_trait;
use tracing::error;

/// Logs an error and fails without sending anything
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectedAction;

fn reject(verb: &str, visitor: &Visitor) -> ApiResponse {
    error!("API {verb} action is not allowed for {}", visitor.model());
    ApiResponse::failure()
}

#[async_trait]
impl CreateAction for RejectedAction {
    async fn execute(
        &self,
        visitor: &Visitor,
        _instance: &Instance,
        _required_only: Option<bool>,
    ) -> Result<ApiResponse> {
        Ok(reject("Create", visitor))
    }
}

#[async_trait]
impl UpdateAction for RejectedAction {
    async fn execute(
        &self,
        visitor: &Visitor,
        _id: &str,
        _instance: Option<&Instance>,
    ) -> Result<ApiResponse> {
        Ok(reject("Update", visitor))
    }
}

#[async_trait]
impl DeleteAction for RejectedAction {
    async fn execute(&self, visitor: &Visitor, _target: ItemRef<'_>) -> Result<ApiResponse> {
        Ok(reject("Delete", visitor))
    }
}
