//! Dashboard views.
//!
//! [`DashboardService`] assembles what each page of the dashboard shows: the overview with its
//! agent list and headline counts, an agent's profile with its interaction cards, and the
//! agents registered under an email address.
//!
//! Display is best effort. A chain connector failure is logged and rendered as an empty list
//! rather than an error; only invalid caller input is reported back.

use crate::agent::AgentRecord;
use crate::chain::ChainSource;
use crate::classify::{classify, Classification};
use crate::constants::NO_TRUST_ISSUES;
use crate::diff::{diff_words, WordDiffResult};
use crate::interaction::{decode, NormalizedInteraction, PayloadDecode, RawInteraction};
use crate::metrics::{aggregate, is_genesis_block, AggregateMetrics};
use crate::name_cache::NameCache;
use crate::DashboardResult;
use agentdna_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinSet;

// ============================================================================
// View types
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub id: String,
    pub display_name: String,
}

impl From<&AgentRecord> for AgentSummary {
    fn from(agent: &AgentRecord) -> Self {
        Self {
            id: agent.id.clone(),
            display_name: agent.display_name(),
        }
    }
}

/// Headline counts across every listed agent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub agents_secured: u64,
    pub total_interactions: u64,
    pub intrusions: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardOverview {
    pub metrics: DashboardMetrics,
    pub agents: Vec<AgentSummary>,
}

/// One interaction as shown on an agent's profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionCard {
    pub block_no: u64,
    pub block_id: String,
    pub epoch: i64,
    pub time: String,
    pub classification: Classification,
    pub interaction: NormalizedInteraction,
    /// Trust issues joined with `", "`, or `"None"`.
    pub reason: String,
    pub diff: WordDiffResult,
}

impl InteractionCard {
    pub fn from_block(block: &RawInteraction) -> Self {
        let interaction = block.normalize();
        let reason = if interaction.trust_issues.is_empty() {
            NO_TRUST_ISSUES.to_string()
        } else {
            interaction.trust_issues.join(", ")
        };

        Self {
            block_no: block.block_no,
            block_id: block.block_id.clone(),
            epoch: block.epoch,
            time: block.time_display(),
            classification: classify(&interaction),
            diff: diff_words(&interaction.original_message, &interaction.received_message),
            reason,
            interaction,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub id: String,
    pub display_name: String,
    pub metrics: AggregateMetrics,
    pub interactions: Vec<InteractionCard>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSearch {
    pub email: String,
    pub agents: Vec<AgentSummary>,
}

/// A single payload run through the normalizer and classifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectReport {
    /// Why the payload could not be read at all; defaults were substituted wholesale.
    pub decode_error: Option<String>,
    pub interaction: NormalizedInteraction,
    pub classification: Classification,
}

impl InspectReport {
    pub fn is_decoded(&self) -> bool {
        self.decode_error.is_none()
    }
}

pub fn inspect(payload: &str) -> InspectReport {
    let (interaction, decode_error) = match decode(payload) {
        PayloadDecode::Decoded(record) => (record, None),
        PayloadDecode::Defaulted { reason } => (NormalizedInteraction::default(), Some(reason)),
    };
    InspectReport {
        decode_error,
        classification: classify(&interaction),
        interaction,
    }
}

// ============================================================================
// Service
// ============================================================================

/// Builds dashboard views from a chain source and a name cache.
#[derive(Clone)]
pub struct DashboardService {
    source: Arc<dyn ChainSource>,
    names: Arc<dyn NameCache>,
}

impl DashboardService {
    pub fn new(source: Arc<dyn ChainSource>, names: Arc<dyn NameCache>) -> Self {
        Self { source, names }
    }

    /// Agent list plus headline counts.
    ///
    /// Listed agents are written to the name cache. Every agent's chain is fetched
    /// concurrently; a chain that cannot be fetched counts as empty.
    pub async fn overview(&self) -> DashboardOverview {
        let agents = match self.source.list_agents().await {
            Ok(agents) => agents,
            Err(e) => {
                tracing::error!("failed to fetch agent list: {e}");
                Vec::new()
            }
        };

        let names = Arc::clone(&self.names);
        let listed = agents.clone();
        match tokio::task::spawn_blocking(move || names.upsert(&listed)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("failed to update agent name cache: {e}"),
            Err(e) => tracing::warn!("agent name cache update did not complete: {e}"),
        }

        let mut tasks = JoinSet::new();
        for agent in &agents {
            let source = Arc::clone(&self.source);
            let id = agent.id.clone();
            tasks.spawn(async move {
                let blocks = chain_or_empty(source.as_ref(), &id).await;
                aggregate(&blocks, is_genesis_block)
            });
        }

        let mut totals = AggregateMetrics::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(metrics) => totals = totals + metrics,
                Err(e) => tracing::error!("chain metrics task failed: {e}"),
            }
        }

        DashboardOverview {
            metrics: DashboardMetrics {
                agents_secured: agents.len() as u64,
                total_interactions: totals.total,
                intrusions: totals.flagged,
            },
            agents: agents.iter().map(AgentSummary::from).collect(),
        }
    }

    /// Interaction history for one agent, genesis block excluded.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::InvalidInput` if `agent_id` is blank.
    pub async fn agent_profile(&self, agent_id: &str) -> DashboardResult<AgentProfile> {
        let id = NonEmptyText::new(agent_id)?;
        let blocks = chain_or_empty(self.source.as_ref(), id.as_str()).await;

        let interactions = blocks
            .iter()
            .filter(|b| !is_genesis_block(b))
            .map(InteractionCard::from_block)
            .collect();

        Ok(AgentProfile {
            display_name: self.names.display_name(id.as_str()),
            metrics: aggregate(&blocks, is_genesis_block),
            interactions,
            id: id.into_inner(),
        })
    }

    /// Agents registered under `email`. Results are not cached.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::InvalidInput` if `email` is blank.
    pub async fn search_by_email(&self, email: &str) -> DashboardResult<EmailSearch> {
        let email = NonEmptyText::new(email)?;
        let agents = match self.source.agents_by_email(email.as_str()).await {
            Ok(agents) => agents,
            Err(e) => {
                tracing::error!("email search for {email} failed: {e}");
                Vec::new()
            }
        };

        Ok(EmailSearch {
            email: email.into_inner(),
            agents: agents.iter().map(AgentSummary::from).collect(),
        })
    }
}

async fn chain_or_empty(source: &dyn ChainSource, agent_id: &str) -> Vec<RawInteraction> {
    match source.chain_data(agent_id).await {
        Ok(blocks) => blocks,
        Err(e) => {
            tracing::error!("failed to fetch chain for agent {agent_id}: {e}");
            Vec::new()
        }
    }
}
