//! Action module
//!
//! One strategy object per CRUD verb. A visitor owns one action per verb
//! and passes itself to every call, so actions stay stateless apart from
//! their options.
//!
//! # Overview
//!
//! - `json` - plain JSON list/load/create/update/delete
//! - `hal` - JSON-HAL list and load, unwrapping the embedded envelope
//! - `null` - succeed without any request
//! - `rejected` - refuse the operation
//!
//! Every action issues at most one request and always answers with an
//! [`ApiResponse`]. Metadata errors propagate as `Err`.

pub mod hal;
pub mod json;
pub mod null;
pub mod rejected;

pub use hal::{HalList, HalLoad, HalOptions, TotalKey};
pub use json::{
    CreateOptions, JsonCreate, JsonDelete, JsonList, JsonLoad, JsonUpdate, ListOptions,
    UpdateOptions,
};
pub use null::NullAction;
pub use rejected::RejectedAction;

use crate::error::Result;
use crate::response::ApiResponse;
use crate::schema::Instance;
use crate::types::QueryParams;
use crate::visitor::{ItemRef, Visitor};
use async_trait::async_trait;

// ============================================================================
// List Parameters
// ============================================================================

/// Pagination request and extra query arguments of a list call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    /// Page size
    pub max: Option<usize>,
    /// Index of the first requested item
    pub offset: Option<usize>,
    /// Merged into the query string as is
    pub extra_args: QueryParams,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request `max` items starting at `offset`
    pub fn page(max: usize, offset: usize) -> Self {
        Self {
            max: Some(max),
            offset: Some(offset),
            extra_args: QueryParams::new(),
        }
    }

    #[must_use]
    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Add an extra query argument
    #[must_use]
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_args.insert(key.into(), value.into());
        self
    }
}

// ============================================================================
// Action Traits
// ============================================================================

#[async_trait]
pub trait ListAction: Send + Sync + std::fmt::Debug {
    async fn execute(
        &self,
        visitor: &Visitor,
        filter: Option<&str>,
        params: Option<&ListParams>,
    ) -> Result<ApiResponse>;
}

#[async_trait]
pub trait LoadAction: Send + Sync + std::fmt::Debug {
    async fn execute(&self, visitor: &Visitor, id: &str) -> Result<ApiResponse>;
}

#[async_trait]
pub trait CreateAction: Send + Sync + std::fmt::Debug {
    /// `required_only` overrides the action option when set
    async fn execute(
        &self,
        visitor: &Visitor,
        instance: &Instance,
        required_only: Option<bool>,
    ) -> Result<ApiResponse>;
}

#[async_trait]
pub trait UpdateAction: Send + Sync + std::fmt::Debug {
    /// `None` sends an empty update
    async fn execute(
        &self,
        visitor: &Visitor,
        id: &str,
        instance: Option<&Instance>,
    ) -> Result<ApiResponse>;
}

#[async_trait]
pub trait DeleteAction: Send + Sync + std::fmt::Debug {
    async fn execute(&self, visitor: &Visitor, target: ItemRef<'_>) -> Result<ApiResponse>;
}
