//! Constants used throughout the AgentDNA core crate.
//!
//! Upstream paths, placeholder text and configuration defaults live here so the REST server,
//! the CLI and the tests agree on them.

/// Placeholder shown for any message field the payload does not carry.
pub const NOT_PROVIDED: &str = "Not provided";

/// Reason text for an interaction without trust issues.
pub const NO_TRUST_ISSUES: &str = "None";

/// Time text for an epoch chrono cannot represent.
pub const UNKNOWN_TIME: &str = "Unknown time";

/// Verification status that flags an interaction on its own.
pub const FAILED_STATUS: &str = "failed";

/// Block number of the genesis entry every chain starts with.
pub const GENESIS_BLOCK_NO: u64 = 0;

/// Default chain connector base URL.
pub const DEFAULT_CHAIN_CONNECTOR_URL: &str = "https://chain-connector-1.rubix.net";

/// Default request timeout for chain connector calls, in seconds.
pub const DEFAULT_CHAIN_TIMEOUT_SECS: u64 = 10;

/// Default location of the persisted agent-name cache.
pub const DEFAULT_NAME_CACHE_PATH: &str = "agent_names.json";

/// Default port for the dashboard server.
pub const DEFAULT_SERVER_PORT: u16 = 2345;

/// Default bind host for the dashboard server.
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Chain connector path listing every agent.
pub const AGENT_LIST_PATH: &str = "/get-nfts";

/// Chain connector path listing agents registered under an email address.
pub const AGENTS_BY_EMAIL_PATH: &str = "/get-nft-by-email";

/// Chain connector path returning an agent's interaction chain.
pub const CHAIN_DATA_PATH: &str = "/api/get-nft-token-chain-data";
