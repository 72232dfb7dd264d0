//! # API Shared
//!
//! Shared request/response definitions for the AgentDNA APIs.
//!
//! Contains:
//! - Wire types for every REST endpoint (`types` module), with OpenAPI schemas
//! - Conversions from `agentdna-core` view types into those wire types
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the workspace's main binary.

pub mod health;
pub mod types;

pub use health::HealthService;
pub use types::*;
