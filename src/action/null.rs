//! Actions that succeed without talking to the API

use super::{CreateAction, DeleteAction, UpdateAction};
use crate::error::Result;
use crate::response::{ApiResponse, ApiResult};
use crate::schema::Instance;
use crate::visitor::{ItemRef, Visitor};
use async_trait::async_trait;
use tracing::debug;

/// Reports success with an empty result and sends nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAction;

#[async_trait]
impl CreateAction for NullAction {
    async fn execute(
        &self,
        visitor: &Visitor,
        _instance: &Instance,
        _required_only: Option<bool>,
    ) -> Result<ApiResponse> {
        debug!(model = visitor.model(), "Create skipped");
        Ok(ApiResponse::new(true, ApiResult::None))
    }
}

#[async_trait]
impl UpdateAction for NullAction {
    async fn execute(
        &self,
        visitor: &Visitor,
        id: &str,
        _instance: Option<&Instance>,
    ) -> Result<ApiResponse> {
        debug!(model = visitor.model(), id, "Update skipped");
        Ok(ApiResponse::new(true, ApiResult::None))
    }
}

#[async_trait]
impl DeleteAction for NullAction {
    async fn execute(&self, visitor: &Visitor, _target: ItemRef<'_>) -> Result<ApiResponse> {
        debug!(model = visitor.model(), "Delete skipped");
        Ok(ApiResponse::new(true, ApiResult::None))
    }
}
