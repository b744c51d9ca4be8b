pub mod client;

pub use client::FraudScoringClient;
