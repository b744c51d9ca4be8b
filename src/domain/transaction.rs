//! Transaction domain entity.
//! Framework-agnostic representation of an evaluated transfer.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A caller-submitted transfer before evaluation.
#[derive(Debug, Clone)]
pub struct Transfer {
    pub from_wallet: String,
    pub to_wallet: String,
    pub amount: BigDecimal,
    pub currency: String,
}

/// Terminal classification of a transfer. Set once at creation, never regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Approved,
    Flagged,
    Rejected,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Approved => "APPROVED",
            TransactionStatus::Flagged => "FLAGGED",
            TransactionStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "APPROVED" => Ok(TransactionStatus::Approved),
            "FLAGGED" => Ok(TransactionStatus::Flagged),
            "REJECTED" => Ok(TransactionStatus::Rejected),
            other => Err(format!("unknown transaction status: {}", other)),
        }
    }
}

/// Authoritative record of a transfer evaluation.
///
/// `audit_tx_hash` and `audited_at` are set together, at most once, after a
/// successful ledger write. Their absence means the record is unaudited.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub from_wallet: String,
    pub to_wallet: String,
    pub amount: BigDecimal,
    pub currency: String,
    pub risk_score: Option<f64>,
    pub status: TransactionStatus,
    pub audit_tx_hash: Option<String>,
    pub audited_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Builds a new, unaudited record from an evaluated transfer.
    /// `risk_score` is `None` when the scorer was unreachable.
    pub fn new(transfer: Transfer, status: TransactionStatus, risk_score: Option<f64>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            from_wallet: transfer.from_wallet,
            to_wallet: transfer.to_wallet,
            amount: transfer.amount,
            currency: transfer.currency,
            risk_score,
            status,
            audit_tx_hash: None,
            audited_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer() -> Transfer {
        Transfer {
            from_wallet: "0xA".to_string(),
            to_wallet: "0xB".to_string(),
            amount: "100.50".parse().unwrap(),
            currency: "ETH".to_string(),
        }
    }

    #[test]
    fn new_transaction_is_unaudited() {
        let tx = Transaction::new(transfer(), TransactionStatus::Approved, Some(0.1));
        assert!(tx.audit_tx_hash.is_none());
        assert!(tx.audited_at.is_none());
        assert_eq!(tx.created_at, tx.updated_at);
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            TransactionStatus::Approved,
            TransactionStatus::Flagged,
            TransactionStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<TransactionStatus>(), Ok(status));
        }
        assert!("PENDING".parse::<TransactionStatus>().is_err());
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let tx = Transaction::new(transfer(), TransactionStatus::Flagged, None);
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["fromWallet"], "0xA");
        assert_eq!(json["status"], "FLAGGED");
        assert!(json["riskScore"].is_null());
        assert!(json["auditTxHash"].is_null());
    }
}
