//! Transaction parser - turns a signature into a structured launch record.
//!
//! Fetching goes through the [`TransactionSource`] trait so the matching
//! logic stays independent of the RPC layer; the production implementation
//! wraps the nonblocking Solana client and flattens the encoded transaction
//! into a plain [`ResolvedTransaction`].

use crate::types::{TokenLaunchEvent, TokenLegInfo};
use anyhow::{Context, Result};
use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::signature::Signature;
use solana_transaction_status::option_serializer::OptionSerializer;
use solana_transaction_status::{
    EncodedConfirmedTransactionWithStatusMeta, EncodedTransaction, UiMessage,
    UiTransactionEncoding,
};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// A post-execution token balance entry, flattened from the RPC response.
#[derive(Debug, Clone)]
pub struct TokenBalance {
    /// Owner of the token account; empty when the node omitted it
    pub owner: String,
    /// Mint address of the balance
    pub mint: String,
    /// Display amount after execution
    pub ui_amount: f64,
    /// Token decimals
    pub decimals: u8,
}

/// A fully resolved transaction reduced to the fields the parser consumes.
#[derive(Debug, Clone, Default)]
pub struct ResolvedTransaction {
    /// Whether the transaction recorded an execution error
    pub failed: bool,
    /// Ordered account-key list; index 0 is the fee payer
    pub account_keys: Vec<String>,
    /// Token balances after execution, in the node's natural order
    pub post_token_balances: Vec<TokenBalance>,
}

/// Source of resolved transactions.
///
/// `Ok(None)` means the node has no record of the signature; that is
/// insufficient data, not a failure. `Err` is a transport or decode problem
/// and propagates to the dispatcher boundary.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn fetch(&self, signature: &str) -> Result<Option<ResolvedTransaction>>;
}

/// Production [`TransactionSource`] backed by a Solana RPC node.
pub struct RpcTransactionSource {
    rpc: Arc<RpcClient>,
}

impl RpcTransactionSource {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl TransactionSource for RpcTransactionSource {
    async fn fetch(&self, signature: &str) -> Result<Option<ResolvedTransaction>> {
        let sig = Signature::from_str(signature)
            .with_context(|| format!("invalid transaction signature {signature}"))?;

        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::JsonParsed),
            commitment: Some(CommitmentConfig::confirmed()),
            max_supported_transaction_version: Some(0),
        };

        match self.rpc.get_transaction_with_config(&sig, config).await {
            Ok(tx) => Ok(Some(flatten_transaction(tx))),
            // The node answers a missing signature with an error rather than
            // a null result; treat that as absent data, not a fetch failure.
            Err(e) if e.to_string().contains("not found") => Ok(None),
            Err(e) => {
                Err(anyhow::Error::new(e).context(format!("transaction fetch failed for {signature}")))
            }
        }
    }
}

/// Reduce the encoded RPC response to the fields the parser needs.
fn flatten_transaction(tx: EncodedConfirmedTransactionWithStatusMeta) -> ResolvedTransaction {
    let meta = tx.transaction.meta;
    // Missing meta leaves no way to inspect the outcome; treat as failed.
    let failed = meta.as_ref().map_or(true, |m| m.err.is_some());

    let account_keys = match &tx.transaction.transaction {
        EncodedTransaction::Json(ui_tx) => match &ui_tx.message {
            UiMessage::Parsed(msg) => msg.account_keys.iter().map(|k| k.pubkey.clone()).collect(),
            UiMessage::Raw(msg) => msg.account_keys.clone(),
        },
        _ => Vec::new(),
    };

    let post_token_balances = meta
        .map(|m| match m.post_token_balances {
            OptionSerializer::Some(balances) => balances
                .into_iter()
                .map(|b| TokenBalance {
                    owner: match b.owner {
                        OptionSerializer::Some(owner) => owner,
                        _ => String::new(),
                    },
                    mint: b.mint,
                    ui_amount: b.ui_token_amount.ui_amount.unwrap_or(0.0),
                    decimals: b.ui_token_amount.decimals,
                })
                .collect(),
            _ => Vec::new(),
        })
        .unwrap_or_default();

    ResolvedTransaction {
        failed,
        account_keys,
        post_token_balances,
    }
}

/// Parses pool-creation transactions into [`TokenLaunchEvent`] records.
pub struct LaunchParser {
    source: Arc<dyn TransactionSource>,
    pool_authority: String,
    reference_mint: String,
}

impl LaunchParser {
    pub fn new(
        source: Arc<dyn TransactionSource>,
        pool_authority: String,
        reference_mint: String,
    ) -> Self {
        Self {
            source,
            pool_authority,
            reference_mint,
        }
    }

    /// Build a launch event for `signature`.
    ///
    /// A transaction the node cannot produce, or one that failed during
    /// execution, yields a partial event carrying only signature and logs;
    /// only transport failures surface as errors.
    pub async fn parse(&self, signature: &str, logs: Vec<String>) -> Result<TokenLaunchEvent> {
        let mut event = TokenLaunchEvent::new(signature, logs);

        let Some(tx) = self.source.fetch(signature).await? else {
            debug!(%signature, "transaction not available, recording partial event");
            return Ok(event);
        };
        if tx.failed {
            debug!(%signature, "transaction failed during execution, recording partial event");
            return Ok(event);
        }

        if let Some(fee_payer) = tx.account_keys.first() {
            event.creator = fee_payer.clone();
        }

        // First-match selection: a transaction with several qualifying
        // entries per leg keeps only the first one the node listed.
        let base = tx
            .post_token_balances
            .iter()
            .find(|b| b.owner == self.pool_authority && b.mint != self.reference_mint);
        if let Some(base) = base {
            event.base_info = TokenLegInfo {
                address: base.mint.clone(),
                decimals: base.decimals,
                amount: base.ui_amount,
            };
        }

        let quote = tx
            .post_token_balances
            .iter()
            .find(|b| b.owner == self.pool_authority && b.mint == self.reference_mint);
        if let Some(quote) = quote {
            event.quote_info = TokenLegInfo {
                address: quote.mint.clone(),
                decimals: quote.decimals,
                amount: quote.ui_amount,
            };
        }

        Ok(event)
    }
}
