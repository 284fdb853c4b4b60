//! Core types and data structures for the rugwatch pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A simple public key representation (string form, as delivered by the RPC layer)
pub type Pubkey = String;

/// Opaque risk report body returned by the reputation service.
///
/// The report schema is owned by the upstream API; we store whatever the
/// service returned and never interpret individual fields.
pub type RiskReport = serde_json::Value;

/// One balance leg of a newly created liquidity pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenLegInfo {
    /// Mint address of the leg; empty when no matching balance was found
    pub address: Pubkey,
    /// Token decimals from the matched balance entry
    pub decimals: u8,
    /// Display amount (uiAmount) from the matched balance entry
    pub amount: f64,
}

/// A token launch observed on-chain, keyed by the transaction signature.
///
/// This is the unit of record: created when a qualifying log notification
/// arrives, populated by the transaction parser, persisted, then updated a
/// second time once a risk assessment is available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenLaunchEvent {
    /// Signature of the pool-creation transaction; primary key, never changes
    pub signature: String,
    /// First signer (fee payer) of the transaction; empty if parsing yielded no data
    pub creator: Pubkey,
    /// Capture time, assigned when the event is first built
    pub timestamp: DateTime<Utc>,
    /// The non-reference-currency leg of the pool
    pub base_info: TokenLegInfo,
    /// The reference-currency leg of the pool
    pub quote_info: TokenLegInfo,
    /// Raw log lines delivered with the notification, stored verbatim
    pub logs: Vec<String>,
    /// Risk report; absent until the assessor succeeds, never cleared afterwards
    pub risk_assessment: Option<RiskReport>,
}

impl TokenLaunchEvent {
    /// Create an event carrying only the signature and raw logs.
    ///
    /// All other fields stay at their defaults until the parser fills them in.
    pub fn new(signature: impl Into<String>, logs: Vec<String>) -> Self {
        Self {
            signature: signature.into(),
            creator: Pubkey::new(),
            timestamp: Utc::now(),
            base_info: TokenLegInfo::default(),
            quote_info: TokenLegInfo::default(),
            logs,
            risk_assessment: None,
        }
    }
}
