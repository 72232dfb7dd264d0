//! Trust classification of normalized interactions.

use crate::interaction::{InteractionStatus, NormalizedInteraction};
use serde::{Deserialize, Serialize};

/// The two outcomes shown on an interaction card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Flagged,
    Clear,
}

impl Classification {
    /// Badge text for the card.
    pub fn label(self) -> &'static str {
        match self {
            Classification::Flagged => "Intrusion Detected",
            Classification::Clear => "Genuine",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Flagged when verification failed or any trust issue was reported.
///
/// A failed status without issues and issues under an ok status are indistinguishable here.
pub fn classify(record: &NormalizedInteraction) -> Classification {
    if record.status == InteractionStatus::Failed || !record.trust_issues.is_empty() {
        Classification::Flagged
    } else {
        Classification::Clear
    }
}
