//! Agent records and display-name resolution.
//!
//! Agents are listed by the chain connector as `{"nfts": [{"nft_id": ..., "nft_name": ...}]}`.
//! Entries without a usable identifier are dropped; names are trimmed and blank names become
//! absent so that display-name resolution can fall through to the next candidate.

use crate::interaction::lenient;
use agentdna_types::non_blank;
use serde::{Deserialize, Serialize};

/// An agent identity as known to the dashboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// JSON document that may carry a `name` field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

impl AgentRecord {
    pub fn new(id: impl Into<String>, name: Option<String>) -> Self {
        Self {
            id: id.into(),
            name,
            file_name: None,
            metadata: None,
        }
    }

    /// First non-blank of name, file name and `metadata.name`; otherwise the id.
    pub fn display_name(&self) -> String {
        non_blank(self.name.as_deref())
            .or_else(|| non_blank(self.file_name.as_deref()))
            .or_else(|| self.metadata_name())
            .unwrap_or_else(|| self.id.clone())
    }

    fn metadata_name(&self) -> Option<String> {
        #[derive(Deserialize)]
        struct Metadata {
            #[serde(default, deserialize_with = "lenient")]
            name: Option<String>,
        }

        let raw = self.metadata.as_deref()?;
        let meta: Metadata = serde_json::from_str(raw).ok()?;
        non_blank(meta.name.as_deref())
    }
}

/// Agent listing as returned by the chain connector.
#[derive(Debug, Default, Deserialize)]
pub struct AgentListResponse {
    #[serde(default, deserialize_with = "lenient")]
    nfts: Option<Vec<AgentListEntry>>,
}

#[derive(Debug, Default, Deserialize)]
struct AgentListEntry {
    #[serde(default, deserialize_with = "lenient")]
    nft_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    nft_name: Option<String>,
}

impl AgentListResponse {
    /// Builds a listing directly; mostly useful for fakes and tests.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, Option<&'a str>)>) -> Self {
        Self {
            nfts: Some(
                pairs
                    .into_iter()
                    .map(|(id, name)| AgentListEntry {
                        nft_id: Some(id.to_string()),
                        nft_name: name.map(str::to_string),
                    })
                    .collect(),
            ),
        }
    }
}

/// Usable agents from a listing, in upstream order.
pub fn agents_from_listing(listing: AgentListResponse) -> Vec<AgentRecord> {
    listing
        .nfts
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| {
            let id = non_blank(entry.nft_id.as_deref())?;
            Some(AgentRecord::new(id, non_blank(entry.nft_name.as_deref())))
        })
        .collect()
}
