//! Data models: statement records, batch reports and configuration.

pub mod config;
pub mod report;
pub mod statement;
