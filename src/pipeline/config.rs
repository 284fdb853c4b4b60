//! Process configuration, read once at startup.
//!
//! Everything comes from environment variables with working defaults, so the
//! binary runs unconfigured against public mainnet endpoints. The ambient
//! network identities (fee account, pool authority, reference mint) are
//! trusted constants carried here and injected into the pipeline at
//! construction time rather than inlined in the matching logic.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Raydium fee account; pool-creation transactions mention it, which makes it
/// the subscription filter key for launch detection.
pub const RAYDIUM_FEE_ACCOUNT: &str = "7YttLkHDoNj9wyDur5pM1ejNaAvT9X4eqaYcHQqtj2G5";

/// Raydium authority that owns both balance legs of a freshly created pool.
pub const RAYDIUM_POOL_AUTHORITY: &str = "5Q544fKrFoe6tsEbD7S8EmxGTJYAKtTVhAW5Q5pge4j1";

/// Wrapped SOL mint, the reference currency distinguishing the quote leg.
pub const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";

const DEFAULT_RPC_ENDPOINT: &str = "https://api.mainnet-beta.solana.com";
const DEFAULT_WS_ENDPOINT: &str = "wss://api.mainnet-beta.solana.com";
const DEFAULT_RISK_API_BASE: &str = "https://api.rugcheck.xyz/v1";
const DEFAULT_RECORD_PATH: &str = "data/new_token_events.json";
const DEFAULT_ERROR_LOG_PATH: &str = "data/error_events.log";

/// Minimum interval between permitted risk-assessment calls, process-wide.
const DEFAULT_RISK_CHECK_INTERVAL_MS: u64 = 2000;

/// Runtime configuration for the launch pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// HTTP RPC endpoint used for transaction fetches
    pub rpc_endpoint: String,
    /// Websocket endpoint used for the log subscription
    pub ws_endpoint: String,
    /// Account the log subscription filters on
    pub filter_key: String,
    /// Owner address identifying the pool's balance legs
    pub pool_authority: String,
    /// Reference currency mint separating quote from base
    pub reference_mint: String,
    /// Base URL of the risk-assessment API
    pub risk_api_base: String,
    /// Throttle window for risk-assessment calls
    pub risk_check_interval: Duration,
    /// Path of the JSON record document
    pub record_path: PathBuf,
    /// Path of the append-only error log
    pub error_log_path: PathBuf,
}

impl PipelineConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Self {
        let interval_ms = env::var("RISK_CHECK_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RISK_CHECK_INTERVAL_MS);

        Self {
            rpc_endpoint: env_or("RPC_ENDPOINT", DEFAULT_RPC_ENDPOINT),
            ws_endpoint: env_or("RPC_WEBSOCKET_ENDPOINT", DEFAULT_WS_ENDPOINT),
            filter_key: RAYDIUM_FEE_ACCOUNT.to_string(),
            pool_authority: RAYDIUM_POOL_AUTHORITY.to_string(),
            reference_mint: WSOL_MINT.to_string(),
            risk_api_base: env_or("RISK_API_BASE", DEFAULT_RISK_API_BASE),
            risk_check_interval: Duration::from_millis(interval_ms),
            record_path: PathBuf::from(env_or("RECORD_PATH", DEFAULT_RECORD_PATH)),
            error_log_path: PathBuf::from(env_or("ERROR_LOG_PATH", DEFAULT_ERROR_LOG_PATH)),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
