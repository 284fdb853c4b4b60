//! Pipeline module - the event-to-record flow
//!
//! Log notification -> dispatcher -> transaction parser -> record store
//! (initial capture) -> risk assessor (throttled) -> record store (update).
//! Failures at any stage branch to the error sink and the pipeline carries
//! on with the next event.

pub mod config;
pub mod error_sink;
pub mod listener;
pub mod parser;
pub mod risk;
pub mod store;

// Re-export key components
pub use config::PipelineConfig;
pub use error_sink::ErrorSink;
pub use listener::LaunchPipeline;
pub use parser::{LaunchParser, ResolvedTransaction, RpcTransactionSource, TokenBalance, TransactionSource};
pub use risk::{HttpReportSource, ReportSource, RiskAssessor};
pub use store::EventStore;
