//! Port traits for the pipeline's external collaborators.
//! Concrete adapters live in `adapters`, `scoring`, and `ledger`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Transaction, TransactionStatus, Transfer};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("transaction not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(String),
    #[error("corrupt record {id}: {reason}")]
    Corrupt { id: Uuid, reason: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Aggregate counters backing the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_transactions: i64,
    pub flagged_transactions: i64,
    pub average_risk_score: Option<f64>,
    pub total_audited: i64,
}

/// Keyed store of transaction records, ordered by creation time.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Persists a new record. The authoritative commit point of a submission.
    async fn create(&self, tx: &Transaction) -> StoreResult<Transaction>;

    /// Attaches a ledger receipt to an existing record. Both audit fields
    /// become visible together; `updated_at` is bumped.
    async fn attach_audit(
        &self,
        id: Uuid,
        audit_tx_hash: &str,
        audited_at: DateTime<Utc>,
    ) -> StoreResult<Transaction>;

    async fn get(&self, id: Uuid) -> StoreResult<Transaction>;

    /// Newest first.
    async fn list(&self, limit: i64, offset: i64) -> StoreResult<Vec<Transaction>>;

    async fn stats(&self) -> StoreResult<DashboardStats>;
}

/// Outcome of a scoring call. `Unavailable` covers timeouts, transport
/// errors, and malformed responses; callers must handle it explicitly.
#[derive(Debug, Clone)]
pub enum ScoreResult {
    Scored(RiskAssessment),
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct RiskAssessment {
    pub risk_score: f64,
    pub confidence: f64,
    pub explanation: String,
}

/// Fraud-risk scoring service. Never errors; degraded service is a value.
#[async_trait]
pub trait RiskScorer: Send + Sync {
    async fn score(&self, transfer: &Transfer) -> ScoreResult;
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("ledger rejected audit submission: {0}")]
    Rejected(String),
    #[error("invalid response from ledger: {0}")]
    InvalidResponse(String),
}

/// Confirmation receipt for an on-ledger audit entry.
#[derive(Debug, Clone)]
pub struct AuditReceipt {
    pub tx_hash: String,
}

/// Append-only audit ledger. A call returns only once the ledger has
/// confirmed inclusion. No retries happen at this level.
#[async_trait]
pub trait LedgerAuditor: Send + Sync {
    async fn record_audit(
        &self,
        transaction_id: Uuid,
        decision: TransactionStatus,
        risk_score: Option<f64>,
    ) -> Result<AuditReceipt, LedgerError>;
}
