//! Chain connector client.
//!
//! The chain connector is the external service holding agent listings and interaction chains.
//! [`ChainSource`] is the seam the dashboard service depends on; [`HttpChainClient`] is the
//! production implementation over HTTP.
//!
//! Endpoints used:
//! - `GET /get-nfts`: every agent
//! - `GET /get-nft-by-email?email=...`: agents registered under an email address
//! - `GET /api/get-nft-token-chain-data?nft=...`: one agent's interaction chain
//!
//! Failed requests are returned as errors; there is no retry.

use crate::agent::{agents_from_listing, AgentListResponse, AgentRecord};
use crate::constants::{AGENTS_BY_EMAIL_PATH, AGENT_LIST_PATH, CHAIN_DATA_PATH};
use crate::interaction::{lenient, replace_lone_surrogates, RawInteraction};
use crate::{CoreConfig, DashboardError, DashboardResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Source of agent listings and interaction chains.
#[async_trait]
pub trait ChainSource: Send + Sync {
    async fn list_agents(&self) -> DashboardResult<Vec<AgentRecord>>;

    async fn agents_by_email(&self, email: &str) -> DashboardResult<Vec<AgentRecord>>;

    /// Blocks of the agent's chain, genesis block included, in upstream order.
    async fn chain_data(&self, agent_id: &str) -> DashboardResult<Vec<RawInteraction>>;
}

/// Chain data envelope. `status: false` or a missing reply means "no interactions".
///
/// Blocks are decoded one at a time so a malformed block cannot hide its neighbours.
#[derive(Debug, Default, Deserialize)]
pub struct ChainDataResponse {
    #[serde(default, deserialize_with = "lenient")]
    status: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    message: Option<String>,
    #[serde(rename = "NFTDataReply", default, deserialize_with = "lenient")]
    reply: Option<Vec<Value>>,
}

impl ChainDataResponse {
    pub fn into_blocks(self) -> Vec<RawInteraction> {
        match (self.status, self.reply) {
            (Some(true), Some(blocks)) => blocks
                .into_iter()
                .filter_map(|block| match serde_json::from_value(block) {
                    Ok(block) => Some(block),
                    Err(e) => {
                        tracing::debug!("skipping unreadable chain block: {e}");
                        None
                    }
                })
                .collect(),
            (_, _) => {
                if let Some(message) = self.message.filter(|m| !m.is_empty()) {
                    tracing::debug!("chain connector returned no blocks: {message}");
                }
                Vec::new()
            }
        }
    }
}

/// [`ChainSource`] backed by the chain connector's HTTP API.
#[derive(Clone, Debug)]
pub struct HttpChainClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpChainClient {
    pub fn new(cfg: &CoreConfig) -> DashboardResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(cfg.chain_timeout())
            .build()
            .map_err(DashboardError::ChainClient)?;
        Ok(Self {
            base_url: cfg.chain_connector_url().to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> DashboardResult<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {url}");

        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|source| DashboardError::ChainRequest {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DashboardError::ChainStatus { url, status });
        }

        let body = resp
            .text()
            .await
            .map_err(|source| DashboardError::ChainRequest {
                url: url.clone(),
                source,
            })?;
        serde_json::from_str(&replace_lone_surrogates(&body))
            .map_err(|source| DashboardError::ChainDecode { url, source })
    }
}

#[async_trait]
impl ChainSource for HttpChainClient {
    async fn list_agents(&self) -> DashboardResult<Vec<AgentRecord>> {
        let listing: AgentListResponse = self.get_json(AGENT_LIST_PATH, &[]).await?;
        Ok(agents_from_listing(listing))
    }

    async fn agents_by_email(&self, email: &str) -> DashboardResult<Vec<AgentRecord>> {
        let listing: AgentListResponse = self
            .get_json(AGENTS_BY_EMAIL_PATH, &[("email", email)])
            .await?;
        Ok(agents_from_listing(listing))
    }

    async fn chain_data(&self, agent_id: &str) -> DashboardResult<Vec<RawInteraction>> {
        let response: ChainDataResponse = self
            .get_json(CHAIN_DATA_PATH, &[("nft", agent_id)])
            .await?;
        Ok(response.into_blocks())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{aggregate, is_genesis_block, AggregateMetrics};
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn successful_reply_yields_blocks() {
        let response: ChainDataResponse = serde_json::from_str(
            r#"{"status":true,"message":"ok","result":null,"NFTDataReply":[
                {"BlockNo":0,"NFTData":""},
                {"BlockNo":1,"NFTData":"{}","Epoch":1700000000}
            ]}"#,
        )
        .expect("decode chain data");
        let blocks = response.into_blocks();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].epoch, 1_700_000_000);
    }

    #[test]
    fn malformed_block_does_not_hide_its_neighbours() {
        let response: ChainDataResponse = serde_json::from_str(
            r#"{"status":true,"NFTDataReply":[
                {"BlockNo":1,"NFTData":"{\"verification\":{\"status\":\"failed\"}}"},
                {"BlockNo":2,"NFTData":"{}","NFTValue":null},
                {"BlockNo":"3","Epoch":"soon","BlockId":7},
                42
            ]}"#,
        )
        .expect("decode chain data");
        let blocks = response.into_blocks();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1].value, 0.0);
        assert_eq!(blocks[2].block_no, 0);
        assert_eq!(blocks[2].block_id, "");

        let metrics = aggregate(&blocks[..2], is_genesis_block);
        assert_eq!(metrics, AggregateMetrics { total: 2, flagged: 1, clear: 1 });
    }

    #[test]
    fn false_status_yields_no_blocks() {
        let response: ChainDataResponse = serde_json::from_str(
            r#"{"status":false,"message":"token not found","NFTDataReply":[{"BlockNo":1}]}"#,
        )
        .expect("decode chain data");
        assert!(response.into_blocks().is_empty());
    }

    #[test]
    fn missing_reply_yields_no_blocks() {
        for raw in [r#"{"status":true}"#, r#"{"status":true,"NFTDataReply":null}"#, "{}"] {
            let response: ChainDataResponse = serde_json::from_str(raw).expect("decode");
            assert!(response.into_blocks().is_empty(), "input {raw}");
        }
    }

    #[test]
    fn client_uses_configured_base_url() {
        let cfg = CoreConfig::new(
            "http://127.0.0.1:9/",
            Duration::from_secs(1),
            PathBuf::from("names.json"),
        )
        .expect("config");
        let client = HttpChainClient::new(&cfg).expect("client");
        assert_eq!(client.base_url(), "http://127.0.0.1:9");
    }

    #[tokio::test]
    async fn unreachable_connector_is_a_request_error() {
        // Port 9 (discard) is not expected to accept HTTP on the loopback interface.
        let cfg = CoreConfig::new(
            "http://127.0.0.1:9",
            Duration::from_secs(2),
            PathBuf::from("names.json"),
        )
        .expect("config");
        let client = HttpChainClient::new(&cfg).expect("client");
        let err = client.list_agents().await.expect_err("nothing listens on port 9");
        assert!(matches!(err, DashboardError::ChainRequest { .. }));
    }
}
