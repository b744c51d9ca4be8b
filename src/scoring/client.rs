use failsafe::futures::CircuitBreaker as FuturesCircuitBreaker;
use failsafe::{backoff, failure_policy, Config, Error as FailsafeError, StateMachine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::domain::Transfer;
use crate::ports::{RiskAssessment, RiskScorer, ScoreResult};

/// Default bound on a single scoring call.
pub const DEFAULT_SCORING_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Error, Debug)]
enum ScoringError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("scoring service returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("risk score {0} outside [0, 1]")]
    OutOfRange(f64),
    #[error("circuit breaker open")]
    CircuitOpen,
}

#[derive(Debug, Serialize)]
struct ScoringRequest {
    from_wallet: String,
    to_wallet: String,
    amount: String,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct ScoringResponse {
    risk_score: f64,
    confidence: f64,
    explanation: String,
}

/// HTTP client for the fraud-risk scoring service.
///
/// Every failure mode collapses to `ScoreResult::Unavailable`; the decision
/// of what an unscored transfer means belongs to the pipeline, not here.
#[derive(Clone)]
pub struct FraudScoringClient {
    client: Client,
    base_url: String,
    circuit_breaker: StateMachine<failure_policy::ConsecutiveFailures<backoff::EqualJittered>, ()>,
}

impl FraudScoringClient {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        Self::with_circuit_breaker(base_url, timeout, 3, 60)
    }

    /// Creates a client with custom circuit breaker configuration.
    pub fn with_circuit_breaker(
        base_url: String,
        timeout: Duration,
        failure_threshold: u32,
        reset_timeout_secs: u64,
    ) -> Self {
        let client = Client::builder().timeout(timeout).build().unwrap_or_default();

        let backoff = backoff::equal_jittered(
            Duration::from_secs(reset_timeout_secs),
            Duration::from_secs(reset_timeout_secs * 2),
        );
        let policy = failure_policy::consecutive_failures(failure_threshold, backoff);
        let circuit_breaker = Config::new().failure_policy(policy).build();

        FraudScoringClient {
            client,
            base_url,
            circuit_breaker,
        }
    }

    /// Returns the current state of the circuit breaker.
    pub fn circuit_state(&self) -> String {
        if self.circuit_breaker.is_call_permitted() {
            "closed".to_string()
        } else {
            "open".to_string()
        }
    }

    async fn request_score(&self, transfer: &Transfer) -> Result<ScoringResponse, ScoringError> {
        let url = format!("{}/predict-risk", self.base_url.trim_end_matches('/'));
        let payload = ScoringRequest {
            from_wallet: transfer.from_wallet.clone(),
            to_wallet: transfer.to_wallet.clone(),
            amount: transfer.amount.to_string(),
            currency: transfer.currency.clone(),
        };
        let client = self.client.clone();

        let result = self
            .circuit_breaker
            .call(async move {
                let response = client.post(&url).json(&payload).send().await?;

                if !response.status().is_success() {
                    return Err(ScoringError::Status(response.status()));
                }

                let body = response.json::<ScoringResponse>().await?;

                if !body.risk_score.is_finite() || !(0.0..=1.0).contains(&body.risk_score) {
                    return Err(ScoringError::OutOfRange(body.risk_score));
                }

                Ok(body)
            })
            .await;

        match result {
            Ok(body) => Ok(body),
            Err(FailsafeError::Rejected) => Err(ScoringError::CircuitOpen),
            Err(FailsafeError::Inner(e)) => Err(e),
        }
    }
}

#[async_trait::async_trait]
impl RiskScorer for FraudScoringClient {
    async fn score(&self, transfer: &Transfer) -> ScoreResult {
        match self.request_score(transfer).await {
            Ok(body) => ScoreResult::Scored(RiskAssessment {
                risk_score: body.risk_score,
                confidence: body.confidence,
                explanation: body.explanation,
            }),
            Err(e) => {
                tracing::warn!(error = %e, "scoring service unavailable");
                ScoreResult::Unavailable
            }
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
    fn test_client_creation() {
        let client =
            FraudScoringClient::new("http://localhost:8000".to_string(), DEFAULT_SCORING_TIMEOUT);
        assert_eq!(client.base_url, "http://localhost:8000");
        assert_eq!(client.circuit_state(), "closed");
    }

    #[tokio::test]
    async fn test_scored_response() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/predict-risk")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"risk_score": 0.1, "confidence": 0.9, "explanation": "Baseline low-risk transaction"}"#)
            .create_async()
            .await;

        let client = FraudScoringClient::new(server.url(), DEFAULT_SCORING_TIMEOUT);
        let result = client.score(&transfer()).await;

        match result {
            ScoreResult::Scored(assessment) => {
                assert_eq!(assessment.risk_score, 0.1);
                assert_eq!(assessment.confidence, 0.9);
                assert_eq!(assessment.explanation, "Baseline low-risk transaction");
            }
            ScoreResult::Unavailable => panic!("expected a scored result"),
        }
    }

    #[tokio::test]
    async fn test_server_error_collapses_to_unavailable() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/predict-risk")
            .with_status(500)
            .create_async()
            .await;

        let client = FraudScoringClient::new(server.url(), DEFAULT_SCORING_TIMEOUT);
        assert!(matches!(
            client.score(&transfer()).await,
            ScoreResult::Unavailable
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_collapses_to_unavailable() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/predict-risk")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"verdict": "fine"}"#)
            .create_async()
            .await;

        let client = FraudScoringClient::new(server.url(), DEFAULT_SCORING_TIMEOUT);
        assert!(matches!(
            client.score(&transfer()).await,
            ScoreResult::Unavailable
        ));
    }

    #[tokio::test]
    async fn test_out_of_range_score_collapses_to_unavailable() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/predict-risk")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"risk_score": 4.2, "confidence": 0.9, "explanation": "bogus"}"#)
            .create_async()
            .await;

        let client = FraudScoringClient::new(server.url(), DEFAULT_SCORING_TIMEOUT);
        assert!(matches!(
            client.score(&transfer()).await,
            ScoreResult::Unavailable
        ));
    }

    #[tokio::test]
    async fn test_connection_error_collapses_to_unavailable() {
        // Nothing listens on this port.
        let client = FraudScoringClient::new(
            "http://127.0.0.1:1".to_string(),
            Duration::from_millis(200),
        );
        assert!(matches!(
            client.score(&transfer()).await,
            ScoreResult::Unavailable
        ));
    }

    #[tokio::test]
    async fn test_circuit_breaker_opens_after_failures() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/predict-risk")
            .with_status(500)
            .expect_at_least(3)
            .create_async()
            .await;

        let client =
            FraudScoringClient::with_circuit_breaker(server.url(), DEFAULT_SCORING_TIMEOUT, 3, 60);

        for _ in 0..3 {
            let _ = client.score(&transfer()).await;
        }

        assert_eq!(client.circuit_state(), "open");
        // Calls while open still degrade gracefully.
        assert!(matches!(
            client.score(&transfer()).await,
            ScoreResult::Unavailable
        ));
    }
}
