//! Postgres implementation of TransactionStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::Transaction;
use crate::ports::{DashboardStats, StoreError, StoreResult, TransactionStore};

/// Postgres-backed transaction store.
#[derive(Clone)]
pub struct PostgresTransactionStore {
    pool: PgPool,
}

impl PostgresTransactionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionStore for PostgresTransactionStore {
    async fn create(&self, tx: &Transaction) -> StoreResult<Transaction> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            INSERT INTO transactions (
                id, from_wallet, to_wallet, amount, currency,
                risk_score, status, audit_tx_hash, audited_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(tx.id)
        .bind(&tx.from_wallet)
        .bind(&tx.to_wallet)
        .bind(&tx.amount)
        .bind(&tx.currency)
        .bind(tx.risk_score)
        .bind(tx.status.as_str())
        .bind(&tx.audit_tx_hash)
        .bind(tx.audited_at)
        .bind(tx.created_at)
        .bind(tx.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        row.into_domain()
    }

    async fn attach_audit(
        &self,
        id: Uuid,
        audit_tx_hash: &str,
        audited_at: DateTime<Utc>,
    ) -> StoreResult<Transaction> {
        // Both audit fields land in one statement so a read never observes
        // a half-attached receipt.
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            UPDATE transactions
            SET audit_tx_hash = $1, audited_at = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(audit_tx_hash)
        .bind(audited_at)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        row.ok_or_else(|| StoreError::NotFound(id.to_string()))?
            .into_domain()
    }

    async fn get(&self, id: Uuid) -> StoreResult<Transaction> {
        let row = sqlx::query_as::<_, TransactionRow>("SELECT * FROM transactions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        row.ok_or_else(|| StoreError::NotFound(id.to_string()))?
            .into_domain()
    }

    async fn list(&self, limit: i64, offset: i64) -> StoreResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            "SELECT * FROM transactions ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.into_iter().map(|r| r.into_domain()).collect()
    }

    async fn stats(&self) -> StoreResult<DashboardStats> {
        let (total, flagged, average_risk_score, audited): (i64, i64, Option<f64>, i64) =
            sqlx::query_as(
                r#"
                SELECT COUNT(*),
                       COUNT(*) FILTER (WHERE status = 'FLAGGED'),
                       AVG(risk_score),
                       COUNT(audit_tx_hash)
                FROM transactions
                "#,
            )
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(DashboardStats {
            total_transactions: total,
            flagged_transactions: flagged,
            average_risk_score,
            total_audited: audited,
        })
    }
}

/// Internal row type for SQLx. Not exposed outside the adapter.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    from_wallet: String,
    to_wallet: String,
    amount: bigdecimal::BigDecimal,
    currency: String,
    risk_score: Option<f64>,
    status: String,
    audit_tx_hash: Option<String>,
    audited_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TransactionRow {
    fn into_domain(self) -> StoreResult<Transaction> {
        let status = self.status.parse().map_err(|reason| StoreError::Corrupt {
            id: self.id,
            reason,
        })?;

        Ok(Transaction {
            id: self.id,
            from_wallet: self.from_wallet,
            to_wallet: self.to_wallet,
            amount: self.amount,
            currency: self.currency,
            risk_score: self.risk_score,
            status,
            audit_tx_hash: self.audit_tx_hash,
            audited_at: self.audited_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
