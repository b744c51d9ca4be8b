//! Transaction decision pipeline: score, decide, persist, audit.

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::decision::{decide, PolicyRangeError};
use crate::domain::{Transaction, TransactionStatus, Transfer};
use crate::ports::{LedgerAuditor, RiskScorer, ScoreResult, StoreError, TransactionStore};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("failed to persist transaction: {0}")]
    Persistence(#[from] StoreError),
    #[error(transparent)]
    Policy(#[from] PolicyRangeError),
}

/// Orchestrates a submission end to end.
///
/// Persistence is the authoritative commit point: the caller gets the
/// record as it stood right after creation. The ledger audit runs as a
/// detached task so the response never waits on chain confirmation; its
/// receipt becomes visible on subsequent reads only.
pub struct TransactionPipeline {
    store: Arc<dyn TransactionStore>,
    scorer: Arc<dyn RiskScorer>,
    auditor: Arc<dyn LedgerAuditor>,
}

impl TransactionPipeline {
    pub fn new(
        store: Arc<dyn TransactionStore>,
        scorer: Arc<dyn RiskScorer>,
        auditor: Arc<dyn LedgerAuditor>,
    ) -> Self {
        Self {
            store,
            scorer,
            auditor,
        }
    }

    pub async fn submit(&self, transfer: Transfer) -> Result<Transaction, SubmitError> {
        let (status, risk_score) = match self.scorer.score(&transfer).await {
            ScoreResult::Scored(assessment) => {
                (decide(assessment.risk_score)?, Some(assessment.risk_score))
            }
            ScoreResult::Unavailable => {
                // Unknown risk is never silently approved.
                warn!("risk scorer unavailable, flagging transfer for manual review");
                (TransactionStatus::Flagged, None)
            }
        };

        let created = self
            .store
            .create(&Transaction::new(transfer, status, risk_score))
            .await?;

        info!(
            transaction_id = %created.id,
            status = %created.status,
            risk_score = ?created.risk_score,
            "transaction persisted"
        );

        self.spawn_audit(created.id, created.status, created.risk_score);

        Ok(created)
    }

    /// Dispatches the best-effort ledger audit without blocking the caller.
    fn spawn_audit(&self, id: Uuid, status: TransactionStatus, risk_score: Option<f64>) {
        let store = Arc::clone(&self.store);
        let auditor = Arc::clone(&self.auditor);

        tokio::spawn(async move {
            record_audit_trail(store, auditor, id, status, risk_score).await;
        });
    }
}

/// Runs one audit attempt and reconciles the receipt onto the stored
/// record. Failures are logged and absorbed; the record simply stays
/// unaudited.
pub async fn record_audit_trail(
    store: Arc<dyn TransactionStore>,
    auditor: Arc<dyn LedgerAuditor>,
    id: Uuid,
    status: TransactionStatus,
    risk_score: Option<f64>,
) {
    match auditor.record_audit(id, status, risk_score).await {
        Ok(receipt) => {
            match store.attach_audit(id, &receipt.tx_hash, Utc::now()).await {
                Ok(_) => info!(
                    transaction_id = %id,
                    audit_tx_hash = %receipt.tx_hash,
                    "audit receipt attached"
                ),
                Err(e) => error!(
                    transaction_id = %id,
                    audit_tx_hash = %receipt.tx_hash,
                    error = %e,
                    "ledger confirmed audit but receipt could not be attached"
                ),
            }
        }
        Err(e) => error!(
            transaction_id = %id,
            error = %e,
            "ledger audit failed, transaction left unaudited"
        ),
    }
}
