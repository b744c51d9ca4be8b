pub mod client;

pub use client::AuditLedgerClient;
