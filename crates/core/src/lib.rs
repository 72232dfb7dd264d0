//! # AgentDNA Core
//!
//! Core logic for the AgentDNA dashboard.
//!
//! This crate contains the interaction pipeline and the collaborators around it:
//! - Payload normalization, trust classification, word diffs and aggregate counts
//! - Agent records, display-name resolution and the persistent name cache
//! - The chain connector client and the dashboard service that assembles views
//!
//! **No API concerns**: HTTP routing, OpenAPI documents and terminal rendering belong in
//! `api-rest`, `api-shared` and `agentdna-cli`.

pub mod agent;
pub mod chain;
pub mod classify;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod diff;
pub mod error;
pub mod interaction;
pub mod metrics;
pub mod name_cache;

pub use agent::{agents_from_listing, AgentListResponse, AgentRecord};
pub use chain::{ChainDataResponse, ChainSource, HttpChainClient};
pub use classify::{classify, Classification};
pub use config::CoreConfig;
pub use dashboard::{
    inspect, AgentProfile, AgentSummary, DashboardMetrics, DashboardOverview, DashboardService,
    EmailSearch, InspectReport, InteractionCard,
};
pub use diff::{diff_words, WordDiffResult};
pub use error::{DashboardError, DashboardResult};
pub use interaction::{
    decode, format_epoch, normalize, InteractionStatus, NormalizedInteraction, PayloadDecode,
    RawInteraction,
};
pub use metrics::{aggregate, is_genesis_block, AggregateMetrics};
pub use name_cache::{InMemoryNameCache, JsonFileNameCache, NameCache};
