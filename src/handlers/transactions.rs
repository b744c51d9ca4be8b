use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use bigdecimal::BigDecimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::domain::Transfer;
use crate::error::AppError;
use crate::validation::{
    sanitize_string, validate_currency, validate_positive_amount, validate_wallet_address,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub from_wallet: String,
    pub to_wallet: String,
    pub amount: BigDecimal,
    pub currency: String,
}

#[derive(Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Validates the submission payload before the pipeline ever runs.
fn validate_transfer(req: CreateTransactionRequest) -> Result<Transfer, AppError> {
    validate_wallet_address("fromWallet", &req.from_wallet)?;
    validate_wallet_address("toWallet", &req.to_wallet)?;
    validate_currency(&req.currency)?;
    validate_positive_amount(&req.amount)?;

    Ok(Transfer {
        from_wallet: sanitize_string(&req.from_wallet),
        to_wallet: sanitize_string(&req.to_wallet),
        amount: req.amount,
        currency: sanitize_string(&req.currency),
    })
}

pub async fn create_transaction(
    State(state): State<AppState>,
    Json(payload): Json<CreateTransactionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let transfer = validate_transfer(payload)?;
    let transaction = state.pipeline.submit(transfer).await?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let limit = pagination.limit.unwrap_or(20);
    let offset = pagination.offset.unwrap_or(0);

    let transactions = state.store.list(limit, offset).await?;

    Ok(Json(transactions))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let transaction = state.store.get(id).await?;

    Ok(Json(transaction))
}

pub async fn dashboard_stats(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let stats = state.store.stats().await?;

    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(from: &str, to: &str, amount: &str, currency: &str) -> CreateTransactionRequest {
        CreateTransactionRequest {
            from_wallet: from.to_string(),
            to_wallet: to.to_string(),
            amount: amount.parse().unwrap(),
            currency: currency.to_string(),
        }
    }

    #[test]
    fn accepts_valid_payload() {
        let transfer = validate_transfer(request("0xA", "0xB", "100.50", "ETH")).unwrap();
        assert_eq!(transfer.from_wallet, "0xA");
        assert_eq!(transfer.currency, "ETH");
    }

    #[test]
    fn rejects_empty_wallet() {
        assert!(validate_transfer(request("  ", "0xB", "100", "ETH")).is_err());
        assert!(validate_transfer(request("0xA", "", "100", "ETH")).is_err());
    }

    #[test]
    fn rejects_non_positive_amount() {
        assert!(validate_transfer(request("0xA", "0xB", "0", "ETH")).is_err());
        assert!(validate_transfer(request("0xA", "0xB", "-5", "ETH")).is_err());
    }

    #[test]
    fn rejects_bad_currency() {
        assert!(validate_transfer(request("0xA", "0xB", "100", "")).is_err());
        assert!(validate_transfer(request("0xA", "0xB", "100", "eth")).is_err());
    }
}
