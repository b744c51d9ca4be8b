use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;
use uuid::Uuid;

use crate::domain::TransactionStatus;
use crate::ports::{AuditReceipt, LedgerAuditor, LedgerError};

/// Default bound on a single audit submission, confirmation wait included.
pub const DEFAULT_LEDGER_TIMEOUT: Duration = Duration::from_secs(30);

/// Risk scores travel to the ledger as fixed-point integers with four
/// decimal places of precision.
const RISK_SCORE_SCALE: f64 = 10_000.0;

#[derive(Debug, Serialize)]
struct AuditSubmission {
    transaction_hash: String,
    decision: u8,
    risk_score_scaled: u32,
}

#[derive(Debug, Deserialize)]
struct AuditConfirmation {
    tx_hash: String,
}

/// HTTP client for the audit-log ledger gateway.
///
/// The gateway responds only once the entry is confirmed on chain, so a
/// successful call means durable inclusion. The client itself never
/// retries; a failed audit is the pipeline's problem to log and absorb.
#[derive(Clone)]
pub struct AuditLedgerClient {
    client: Client,
    base_url: String,
}

impl AuditLedgerClient {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let client = Client::builder().timeout(timeout).build().unwrap_or_default();

        AuditLedgerClient { client, base_url }
    }
}

#[async_trait::async_trait]
impl LedgerAuditor for AuditLedgerClient {
    async fn record_audit(
        &self,
        transaction_id: Uuid,
        decision: TransactionStatus,
        risk_score: Option<f64>,
    ) -> Result<AuditReceipt, LedgerError> {
        let url = format!("{}/audit", self.base_url.trim_end_matches('/'));
        let payload = AuditSubmission {
            transaction_hash: hash_transaction_id(transaction_id),
            decision: encode_decision(decision),
            risk_score_scaled: scale_risk_score(risk_score),
        };

        let response = self.client.post(&url).json(&payload).send().await?;

        if !response.status().is_success() {
            return Err(LedgerError::Rejected(format!(
                "status {}",
                response.status()
            )));
        }

        let confirmation = response
            .json::<AuditConfirmation>()
            .await
            .map_err(|e| LedgerError::InvalidResponse(e.to_string()))?;

        if confirmation.tx_hash.is_empty() {
            return Err(LedgerError::InvalidResponse(
                "confirmation carried an empty tx hash".to_string(),
            ));
        }

        Ok(AuditReceipt {
            tx_hash: confirmation.tx_hash,
        })
    }
}

/// Transaction ids are hashed before leaving the system; the ledger never
/// sees raw identifiers.
fn hash_transaction_id(id: Uuid) -> String {
    let digest = Sha256::digest(id.to_string().as_bytes());
    format!("0x{}", hex::encode(digest))
}

fn encode_decision(decision: TransactionStatus) -> u8 {
    match decision {
        TransactionStatus::Approved => 0,
        TransactionStatus::Flagged => 1,
        TransactionStatus::Rejected => 2,
    }
}

/// Floors `score * 10_000`; an absent score encodes as 0.
fn scale_risk_score(risk_score: Option<f64>) -> u32 {
    match risk_score {
        Some(score) => (score * RISK_SCORE_SCALE).floor() as u32,
        None => 0,
    }
}
