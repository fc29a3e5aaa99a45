//! Core library for credit-card statement extraction.
//!
//! This crate provides:
//! - PDF page text extraction (lopdf with a pdf-extract fallback)
//! - Bank detection from declarative, data-driven bank profiles
//! - Field rules for card digits, billing cycle, due date and total due
//! - Transaction ledger parsing with per-issuer line grammars
//! - Batch processing with a reconciled success/failure report

pub mod batch;
pub mod detect;
pub mod error;
pub mod models;
pub mod pdf;
pub mod profiles;
pub mod statement;

pub use batch::BatchOrchestrator;
pub use detect::{BankDetector, Detection};
pub use error::{CardstmtError, ParseFailure, PdfError, ProfileError, Result};
pub use models::config::CardstmtConfig;
pub use models::report::{BatchReport, DocumentOutcome};
pub use models::statement::{BillingCycle, StatementField, StatementRecord, Transaction};
pub use pdf::{PageTextProvider, PdfFileProvider, PdfProcessor, PdfType};
pub use profiles::{BankProfile, ProfileRegistry, ProfileSpec, SignatureSpec};
pub use statement::{ExtractionResult, StatementParser};
