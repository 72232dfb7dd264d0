//! Interaction records and the payload normalizer.
//!
//! An interaction (one block on an agent's chain) carries an opaque `NFTData` string that is
//! expected to hold a JSON document describing the exchange: the host's original message, the
//! responses it produced and a verification verdict. The document is owned upstream and its
//! shape drifts, so decoding here is total: every field has a documented default and nothing
//! in this module returns an error.
//!
//! Responsibilities:
//! - Define the upstream [`RawInteraction`] record as delivered by the chain connector
//! - Define the lenient wire model for the payload document
//! - Collapse the wire model into a fully-defaulted [`NormalizedInteraction`]

use crate::constants::{FAILED_STATUS, NOT_PROVIDED, UNKNOWN_TIME};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;

// ============================================================================
// Public domain-level types
// ============================================================================

/// One block of an agent's interaction chain, as returned by the chain connector.
///
/// Missing, null or mistyped upstream fields take their zero value; only `payload` is
/// interpreted further.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInteraction {
    /// Position of the block in the chain. Block 0 is the genesis entry.
    #[serde(rename = "BlockNo", default, deserialize_with = "or_zero")]
    pub block_no: u64,

    #[serde(rename = "BlockId", default, deserialize_with = "or_zero")]
    pub block_id: String,

    /// Opaque payload believed to contain a JSON document.
    #[serde(rename = "NFTData", default, deserialize_with = "or_zero")]
    pub payload: String,

    #[serde(rename = "NFTOwner", default, deserialize_with = "or_zero")]
    pub owner: String,

    #[serde(rename = "NFTValue", default, deserialize_with = "or_zero")]
    pub value: f64,

    /// Seconds since the Unix epoch.
    #[serde(rename = "Epoch", default, deserialize_with = "or_zero")]
    pub epoch: i64,

    #[serde(rename = "TransactionID", default, deserialize_with = "or_zero")]
    pub transaction_id: String,
}

impl RawInteraction {
    /// Normalizes this block's payload.
    pub fn normalize(&self) -> NormalizedInteraction {
        normalize(&self.payload)
    }

    /// Display text for the block timestamp, e.g. `Mar 4, 2025, 9:07 AM` (UTC).
    pub fn time_display(&self) -> String {
        format_epoch(self.epoch)
    }
}

/// Verification verdict recorded in a payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionStatus {
    #[default]
    Ok,
    Failed,
}

impl InteractionStatus {
    /// Only an exact `"failed"` counts as a failure; any other value is treated as ok.
    pub fn from_wire(value: &str) -> Self {
        if value == FAILED_STATUS {
            InteractionStatus::Failed
        } else {
            InteractionStatus::Ok
        }
    }
}

/// A payload reduced to the fields the dashboard displays, with defaults filled in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedInteraction {
    pub original_message: String,
    pub received_message: String,
    pub response_message: String,
    pub trust_issues: Vec<String>,
    pub status: InteractionStatus,
    pub counterparty_agent: Option<String>,
}

impl Default for NormalizedInteraction {
    fn default() -> Self {
        Self {
            original_message: NOT_PROVIDED.to_string(),
            received_message: NOT_PROVIDED.to_string(),
            response_message: NOT_PROVIDED.to_string(),
            trust_issues: Vec::new(),
            status: InteractionStatus::Ok,
            counterparty_agent: None,
        }
    }
}

/// Outcome of decoding a payload.
///
/// Both variants carry a complete record; `Defaulted` additionally remembers why the payload
/// could not be read at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PayloadDecode {
    Decoded(NormalizedInteraction),
    Defaulted { reason: String },
}

impl PayloadDecode {
    pub fn into_normalized(self) -> NormalizedInteraction {
        match self {
            PayloadDecode::Decoded(record) => record,
            PayloadDecode::Defaulted { .. } => NormalizedInteraction::default(),
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, PayloadDecode::Defaulted { .. })
    }
}

// ============================================================================
// Public operations
// ============================================================================

/// Decode a raw payload into a tagged result.
///
/// The payload must be a JSON object for anything to be extracted. Inside the object each
/// field is read independently: a field of the wrong type is treated as absent without
/// affecting its siblings. Unpaired surrogate escapes read as U+FFFD and out-of-range numbers
/// are kept verbatim, so neither rejects the whole document.
pub fn decode(raw: &str) -> PayloadDecode {
    let wire = serde_json::from_str::<Value>(&replace_lone_surrogates(raw))
        .map_err(|e| e.to_string())
        .and_then(|value| match value {
            Value::Object(_) => {
                serde_json::from_value::<PayloadWire>(value).map_err(|e| e.to_string())
            }
            _ => Err("payload is not a JSON object".to_string()),
        });

    match wire {
        Ok(wire) => PayloadDecode::Decoded(wire.into_normalized()),
        Err(reason) => {
            tracing::debug!("interaction payload not decodable, using defaults: {reason}");
            PayloadDecode::Defaulted { reason }
        }
    }
}

/// Normalize a raw payload. Never fails; unreadable input yields the default record.
pub fn normalize(raw: &str) -> NormalizedInteraction {
    decode(raw).into_normalized()
}

/// Format seconds since the epoch the way interaction cards show it.
pub fn format_epoch(epoch: i64) -> String {
    match chrono::DateTime::<chrono::Utc>::from_timestamp(epoch, 0) {
        Some(ts) => ts.format("%b %-d, %Y, %-I:%M %p").to_string(),
        None => UNKNOWN_TIME.to_string(),
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct PayloadWire {
    #[serde(default, deserialize_with = "lenient")]
    host: Option<HostWire>,
    #[serde(default, deserialize_with = "lenient")]
    responses: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    verification: Option<VerificationWire>,
}

#[derive(Debug, Default, Deserialize)]
struct HostWire {
    #[serde(default, deserialize_with = "lenient")]
    envelope: Option<HostEnvelopeWire>,
}

#[derive(Debug, Default, Deserialize)]
struct HostEnvelopeWire {
    #[serde(default, deserialize_with = "lenient")]
    original_message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseWire {
    #[serde(default, deserialize_with = "lenient")]
    agent_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    envelope: Option<ResponseEnvelopeWire>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseEnvelopeWire {
    #[serde(default, deserialize_with = "lenient")]
    original_message: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    response: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    host_trust_issues: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct VerificationWire {
    #[serde(default, deserialize_with = "lenient")]
    status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    trust_issues: Option<Vec<Value>>,
}

/// Reads any JSON value and keeps it only if it has the expected shape.
///
/// This is the single place where a malformed field turns into "absent".
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Like [`lenient`], for fields that fall back to their zero value.
pub(crate) fn or_zero<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    lenient(deserializer).map(Option::unwrap_or_default)
}

const REPLACEMENT_ESCAPE: &str = "\\uFFFD";

/// Rewrites `\uXXXX` escapes naming an unpaired UTF-16 surrogate to `\uFFFD`.
///
/// Other escapes, including `\\u...` (an escaped backslash), are left untouched.
pub(crate) fn replace_lone_surrogates(raw: &str) -> Cow<'_, str> {
    if !raw.contains("\\u") {
        return Cow::Borrowed(raw);
    }

    let bytes = raw.as_bytes();
    let mut out = String::new();
    let mut copied = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' {
            i += 1;
            continue;
        }
        match hex_escape(bytes, i) {
            Some(0xD800..=0xDBFF)
                if matches!(hex_escape(bytes, i + 6), Some(0xDC00..=0xDFFF)) =>
            {
                i += 12;
            }
            Some(0xD800..=0xDFFF) => {
                out.push_str(&raw[copied..i]);
                out.push_str(REPLACEMENT_ESCAPE);
                i += 6;
                copied = i;
            }
            Some(_) => i += 6,
            None => i += 2,
        }
    }

    if copied == 0 {
        return Cow::Borrowed(raw);
    }
    out.push_str(&raw[copied..]);
    Cow::Owned(out)
}

/// Code unit of the `\uXXXX` escape starting at `at`, if there is one.
fn hex_escape(bytes: &[u8], at: usize) -> Option<u16> {
    let escape = bytes.get(at..at + 6)?;
    if !escape.starts_with(b"\\u") || !escape[2..].iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    let hex = std::str::from_utf8(&escape[2..]).ok()?;
    u16::from_str_radix(hex, 16).ok()
}

fn issue_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

impl PayloadWire {
    fn into_normalized(self) -> NormalizedInteraction {
        let defaults = NormalizedInteraction::default();

        // Only the first response is shown; the element itself may be any JSON value.
        let first: ResponseWire = self
            .responses
            .and_then(|r| r.into_iter().next())
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();
        let envelope = first.envelope.unwrap_or_default();
        let verification = self.verification.unwrap_or_default();

        let original_message = self
            .host
            .and_then(|h| h.envelope)
            .and_then(|e| e.original_message)
            .unwrap_or(defaults.original_message);

        let trust_issues = envelope
            .host_trust_issues
            .unwrap_or_default()
            .into_iter()
            .chain(verification.trust_issues.unwrap_or_default())
            .map(issue_text)
            .collect();

        NormalizedInteraction {
            original_message,
            received_message: envelope
                .original_message
                .unwrap_or(defaults.received_message),
            response_message: envelope.response.unwrap_or(defaults.response_message),
            trust_issues,
            status: verification
                .status
                .as_deref()
                .map(InteractionStatus::from_wire)
                .unwrap_or_default(),
            counterparty_agent: first.agent_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHISHING: &str = r#"{"host":{"envelope":{"original_message":"send password now"}},"responses":[{"envelope":{"original_message":"send password","response":"denied","host_trust_issues":["phishing"]}}],"verification":{"status":"failed","trust_issues":[]}}"#;

    #[test]
    fn extracts_every_field_from_a_full_payload() {
        let record = normalize(PHISHING);
        assert_eq!(record.original_message, "send password now");
        assert_eq!(record.received_message, "send password");
        assert_eq!(record.response_message, "denied");
        assert_eq!(record.trust_issues, vec!["phishing".to_string()]);
        assert_eq!(record.status, InteractionStatus::Failed);
        assert_eq!(record.counterparty_agent, None);
    }

    #[test]
    fn non_json_payload_yields_defaults() {
        let decoded = decode("not json");
        assert!(decoded.is_defaulted());
        assert_eq!(decoded.into_normalized(), NormalizedInteraction::default());
    }

    #[test]
    fn non_object_json_yields_defaults() {
        for raw in ["null", "42", "\"a string\"", "[1,2,3]", "", "   "] {
            let decoded = decode(raw);
            assert!(decoded.is_defaulted(), "input {raw:?}");
            assert_eq!(decoded.into_normalized(), NormalizedInteraction::default());
        }
    }

    #[test]
    fn empty_object_decodes_to_defaults() {
        let decoded = decode("{}");
        assert!(!decoded.is_defaulted());
        assert_eq!(decoded.into_normalized(), NormalizedInteraction::default());
    }

    #[test]
    fn trust_issues_concatenate_in_order_with_duplicates() {
        let raw = r#"{
            "responses": [{"envelope": {"host_trust_issues": ["spoofing", "phishing"]}}],
            "verification": {"trust_issues": ["phishing", "replay"]}
        }"#;
        assert_eq!(
            normalize(raw).trust_issues,
            vec!["spoofing", "phishing", "phishing", "replay"]
        );
    }

    #[test]
    fn only_exact_failed_status_fails() {
        let status = |s: &str| {
            normalize(&format!(r#"{{"verification":{{"status":"{s}"}}}}"#)).status
        };
        assert_eq!(status("failed"), InteractionStatus::Failed);
        assert_eq!(status("FAILED"), InteractionStatus::Ok);
        assert_eq!(status("pending"), InteractionStatus::Ok);
        assert_eq!(status("ok"), InteractionStatus::Ok);
    }

    #[test]
    fn mistyped_field_does_not_spoil_siblings() {
        let raw = r#"{
            "host": "not an object",
            "responses": [{"agent_id": "agent-b", "envelope": {"original_message": 7, "response": "fine"}}],
            "verification": {"status": ["failed"], "trust_issues": "oops"}
        }"#;
        let record = normalize(raw);
        assert_eq!(record.original_message, NOT_PROVIDED);
        assert_eq!(record.received_message, NOT_PROVIDED);
        assert_eq!(record.response_message, "fine");
        assert!(record.trust_issues.is_empty());
        assert_eq!(record.status, InteractionStatus::Ok);
        assert_eq!(record.counterparty_agent.as_deref(), Some("agent-b"));
    }

    #[test]
    fn null_fields_count_as_absent() {
        let raw = r#"{"host":{"envelope":{"original_message":null}},"verification":null}"#;
        assert_eq!(normalize(raw), NormalizedInteraction::default());
    }

    #[test]
    fn non_string_trust_issues_keep_their_json_text() {
        let raw = r#"{"verification":{"trust_issues":["tamper", 3, {"code":"x"}]}}"#;
        assert_eq!(
            normalize(raw).trust_issues,
            vec!["tamper", "3", r#"{"code":"x"}"#]
        );
    }

    #[test]
    fn only_first_response_is_read() {
        let raw = r#"{"responses":[
            {"agent_id":"first","envelope":{"response":"one"}},
            {"agent_id":"second","envelope":{"response":"two","host_trust_issues":["x"]}}
        ]}"#;
        let record = normalize(raw);
        assert_eq!(record.response_message, "one");
        assert_eq!(record.counterparty_agent.as_deref(), Some("first"));
        assert!(record.trust_issues.is_empty());
    }

    #[test]
    fn raw_interaction_decodes_upstream_field_names() {
        let block: RawInteraction = serde_json::from_str(
            r#"{"BlockNo":3,"BlockId":"b-3","NFTData":"{}","NFTOwner":"did:x","NFTValue":1.5,"Epoch":1700000000,"TransactionID":"tx-9"}"#,
        )
        .expect("decode block");
        assert_eq!(block.block_no, 3);
        assert_eq!(block.block_id, "b-3");
        assert_eq!(block.transaction_id, "tx-9");
        assert_eq!(block.normalize(), NormalizedInteraction::default());
    }

    #[test]
    fn raw_interaction_tolerates_missing_fields() {
        let block: RawInteraction =
            serde_json::from_str(r#"{"BlockNo":1}"#).expect("decode sparse block");
        assert_eq!(block.payload, "");
        assert_eq!(block.epoch, 0);
    }

    #[test]
    fn raw_interaction_zeroes_mistyped_fields() {
        let block: RawInteraction = serde_json::from_str(
            r#"{"BlockNo":"7","BlockId":null,"NFTData":"{}","NFTValue":null,"Epoch":"soon","TransactionID":["tx"]}"#,
        )
        .expect("decode block");
        assert_eq!(block.block_no, 0);
        assert_eq!(block.block_id, "");
        assert_eq!(block.payload, "{}");
        assert_eq!(block.value, 0.0);
        assert_eq!(block.epoch, 0);
        assert_eq!(block.transaction_id, "");
    }

    #[test]
    fn out_of_range_number_does_not_spoil_the_payload() {
        let raw = r#"{"score":1e400,"host":{"envelope":{"original_message":"hi"}},"verification":{"status":"failed"}}"#;
        let decoded = decode(raw);
        assert!(!decoded.is_defaulted());
        let record = decoded.into_normalized();
        assert_eq!(record.original_message, "hi");
        assert_eq!(record.status, InteractionStatus::Failed);
    }

    #[test]
    fn lone_surrogate_reads_as_replacement_character() {
        let raw = r#"{"host":{"envelope":{"original_message":"hi \ud800 there"}},"verification":{"status":"failed"}}"#;
        let decoded = decode(raw);
        assert!(!decoded.is_defaulted());
        let record = decoded.into_normalized();
        assert_eq!(record.original_message, "hi \u{FFFD} there");
        assert_eq!(record.status, InteractionStatus::Failed);

        let trailing = r#"{"host":{"envelope":{"original_message":"\udc00"}}}"#;
        assert_eq!(normalize(trailing).original_message, "\u{FFFD}");
    }

    #[test]
    fn surrogate_rewrite_leaves_valid_escapes_alone() {
        for untouched in [r#""😀 é \\ud800""#, r#""😀 é""#, "plain"] {
            assert!(
                matches!(replace_lone_surrogates(untouched), Cow::Borrowed(_)),
                "input {untouched}"
            );
        }
        assert_eq!(
            replace_lone_surrogates(r#"\ud800A\udfff"#),
            r#"�A�"#
        );
        assert_eq!(replace_lone_surrogates(r#"x\ud83d"#), r#"x�"#);
    }

    #[test]
    fn formats_epoch_in_utc() {
        assert_eq!(format_epoch(1_700_000_000), "Nov 14, 2023, 10:13 PM");
        assert_eq!(format_epoch(0), "Jan 1, 1970, 12:00 AM");
        assert_eq!(format_epoch(i64::MAX), UNKNOWN_TIME);
    }
}
