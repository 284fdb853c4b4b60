//! rugwatch - Solana liquidity-pool launch monitor
//!
//! This crate watches the network for new Raydium pool creation events,
//! parses the triggering transaction into a structured launch record,
//! enriches it with a throttled RugCheck risk report, and persists the
//! result to a JSON document keyed by transaction signature.

pub mod pipeline;
pub mod types;

// Re-export main types for convenience
pub use types::{RiskReport, TokenLaunchEvent, TokenLegInfo};
