//! REST wire types.
//!
//! Every type here derives `utoipa::ToSchema` so it can be listed in the OpenAPI document. Core
//! view types are converted with `From`; the core crate itself stays free of API concerns.

use agentdna_core::{
    AgentProfile, AgentSummary, AggregateMetrics, Classification, DashboardMetrics,
    DashboardOverview, EmailSearch, InspectReport, InteractionCard, InteractionStatus,
    NormalizedInteraction, WordDiffResult,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AgentSummaryRes {
    pub id: String,
    pub display_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DashboardMetricsRes {
    pub agents_secured: u64,
    pub total_interactions: u64,
    pub intrusions: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DashboardOverviewRes {
    pub metrics: DashboardMetricsRes,
    pub agents: Vec<AgentSummaryRes>,
}

/// Interaction counts for one agent. `total == flagged + clear`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InteractionMetricsRes {
    pub total: u64,
    pub flagged: u64,
    pub clear: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WordDiffRes {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NormalizedInteractionRes {
    pub original_message: String,
    pub received_message: String,
    pub response_message: String,
    pub trust_issues: Vec<String>,
    /// `ok` or `failed`.
    pub status: String,
    pub counterparty_agent: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InteractionCardRes {
    pub block_no: u64,
    pub block_id: String,
    pub epoch: i64,
    pub time: String,
    /// `flagged` or `clear`.
    pub classification: String,
    /// `Intrusion Detected` or `Genuine`.
    pub badge: String,
    pub reason: String,
    pub interaction: NormalizedInteractionRes,
    pub diff: WordDiffRes,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AgentProfileRes {
    pub id: String,
    pub display_name: String,
    pub metrics: InteractionMetricsRes,
    pub interactions: Vec<InteractionCardRes>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EmailSearchRes {
    pub email: String,
    pub agents: Vec<AgentSummaryRes>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DiffReq {
    pub original: String,
    pub received: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InspectReq {
    /// Raw `NFTData` payload text.
    pub payload: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InspectRes {
    pub decoded: bool,
    /// Present when the payload could not be read and defaults were shown instead.
    pub decode_error: Option<String>,
    pub classification: String,
    pub badge: String,
    pub interaction: NormalizedInteractionRes,
}

// ============================================================================
// Conversions from core views
// ============================================================================

fn classification_name(class: Classification) -> String {
    match class {
        Classification::Flagged => "flagged".into(),
        Classification::Clear => "clear".into(),
    }
}

fn status_name(status: InteractionStatus) -> String {
    match status {
        InteractionStatus::Ok => "ok".into(),
        InteractionStatus::Failed => "failed".into(),
    }
}

impl From<AgentSummary> for AgentSummaryRes {
    fn from(agent: AgentSummary) -> Self {
        Self {
            id: agent.id,
            display_name: agent.display_name,
        }
    }
}

impl From<DashboardMetrics> for DashboardMetricsRes {
    fn from(m: DashboardMetrics) -> Self {
        Self {
            agents_secured: m.agents_secured,
            total_interactions: m.total_interactions,
            intrusions: m.intrusions,
        }
    }
}

impl From<DashboardOverview> for DashboardOverviewRes {
    fn from(view: DashboardOverview) -> Self {
        Self {
            metrics: view.metrics.into(),
            agents: view.agents.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<AggregateMetrics> for InteractionMetricsRes {
    fn from(m: AggregateMetrics) -> Self {
        Self {
            total: m.total,
            flagged: m.flagged,
            clear: m.clear,
        }
    }
}

impl From<WordDiffResult> for WordDiffRes {
    fn from(diff: WordDiffResult) -> Self {
        Self {
            added: diff.added,
            removed: diff.removed,
        }
    }
}

impl From<NormalizedInteraction> for NormalizedInteractionRes {
    fn from(n: NormalizedInteraction) -> Self {
        Self {
            original_message: n.original_message,
            received_message: n.received_message,
            response_message: n.response_message,
            trust_issues: n.trust_issues,
            status: status_name(n.status),
            counterparty_agent: n.counterparty_agent,
        }
    }
}

impl From<InteractionCard> for InteractionCardRes {
    fn from(card: InteractionCard) -> Self {
        Self {
            block_no: card.block_no,
            block_id: card.block_id,
            epoch: card.epoch,
            time: card.time,
            classification: classification_name(card.classification),
            badge: card.classification.label().to_string(),
            reason: card.reason,
            interaction: card.interaction.into(),
            diff: card.diff.into(),
        }
    }
}

impl From<AgentProfile> for AgentProfileRes {
    fn from(profile: AgentProfile) -> Self {
        Self {
            id: profile.id,
            display_name: profile.display_name,
            metrics: profile.metrics.into(),
            interactions: profile.interactions.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<EmailSearch> for EmailSearchRes {
    fn from(search: EmailSearch) -> Self {
        Self {
            email: search.email,
            agents: search.agents.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<InspectReport> for InspectRes {
    fn from(report: InspectReport) -> Self {
        Self {
            decoded: report.is_decoded(),
            decode_error: report.decode_error,
            classification: classification_name(report.classification),
            badge: report.classification.label().to_string(),
            interaction: report.interaction.into(),
        }
    }
}
