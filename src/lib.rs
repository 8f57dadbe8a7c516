// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # OpenAPI Connector
//!
//! A metadata-driven sync connector for REST/JSON and JSON-HAL APIs.
//!
//! ## Features
//!
//! - **Declarative models**: field tables with wire types, groups and relations
//! - **Typed field access**: coercion, timezone-aware dates, no-op detection
//! - **Pluggable actions**: list/load/create/update/delete per model
//! - **JSON and JSON-HAL**: embedded envelopes, totals, item merging
//! - **Pagination**: page/offset query keys, bounded page loops
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use openapi_connector::{Connector, ConnectorConfig, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let connector = Connector::from_file("connector.yaml")?;
//!     assert!(connector.ping().await.success);
//!
//!     let customers = connector.object("Customer").expect("registered");
//!     let page = customers.objects_list(None, None).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 ApiObject (sync framework hooks)             │
//! │  build_fields  get/set fields  load  create  update  delete  │
//! └──────────────────────────────────────────────────────────────┘
//!                                │
//! ┌───────────┬──────────────────┴───────┬──────────────────────┐
//! │ Visitor   │ Actions                  │ Getter / Setter      │
//! ├───────────┼──────────────────────────┼──────────────────────┤
//! │ URIs      │ JSON list/load/create    │ Coercion             │
//! │ Paging    │ HAL list/load            │ Nested + list fields │
//! │ Item ids  │ Null / Rejected          │ Required input       │
//! └───────────┴──────────────────────────┴──────────────────────┘
//!         │                 │                        │
//!   Connexion (reqwest)   Hydrator          Descriptor (ModelDef)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the connector
pub mod error;

/// Common types and type aliases
pub mod types;

/// Declarative models and dynamic instances
pub mod schema;

/// Metadata registry and field declarations
pub mod descriptor;

/// Typed field reads and writes
pub mod fields;

/// Instance <-> JSON conversion
pub mod hydrator;

/// HTTP transport
pub mod connexion;

/// Action results
pub mod response;

/// List, load, create, update and delete strategies
pub mod action;

/// Per-model action dispatcher
pub mod visitor;

/// Sync framework adapter
pub mod adapter;

/// Configuration file
pub mod config;

/// Template interpolation
pub mod template;

/// YAML loader for model definitions
pub mod loader;

/// Connector façade
pub mod connector;

/// Command-line interface
pub mod cli;

#[cfg(test)]
mod fixtures;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use adapter::ApiObject;
pub use config::ConnectorConfig;
pub use connector::Connector;
pub use loader::{load_models, load_models_from_str};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
