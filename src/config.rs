use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub scoring_service_url: String,
    pub scoring_timeout_secs: u64,
    pub ledger_service_url: String,
    pub ledger_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL")?,
            scoring_service_url: env::var("SCORING_SERVICE_URL")?,
            scoring_timeout_secs: env::var("SCORING_TIMEOUT_SECS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()?,
            ledger_service_url: env::var("LEDGER_SERVICE_URL")?,
            ledger_timeout_secs: env::var("LEDGER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
        })
    }
}
