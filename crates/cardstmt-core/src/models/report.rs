//! Per-document outcomes and the batch report.

use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::ParseFailure;
use crate::models::statement::StatementRecord;
use crate::statement::ExtractionResult;

/// What happened to one input document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentOutcome {
    /// Identifier of the input document (usually its path).
    pub source_reference: String,
    /// Whether a statement record was produced.
    pub success: bool,
    /// Detected bank, when detection got that far.
    pub bank_name: Option<String>,
    /// Typed failure for unsuccessful documents.
    pub failure: Option<ParseFailure>,
    /// Human-readable failure reason.
    pub failure_reason: Option<String>,
    /// The extracted statement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<StatementRecord>,
    /// Malformed ledger rows that were skipped.
    pub skipped_lines: usize,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
    /// File the record was written to, set by the caller that writes it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<PathBuf>,
}

impl DocumentOutcome {
    pub fn succeeded(source_reference: impl Into<String>, result: ExtractionResult) -> Self {
        Self {
            source_reference: source_reference.into(),
            success: true,
            bank_name: Some(result.record.bank_name().to_string()),
            failure: None,
            failure_reason: None,
            record: Some(result.record),
            skipped_lines: result.skipped_lines,
            warnings: result.warnings,
            processing_time_ms: result.processing_time_ms,
            output_file: None,
        }
    }

    pub fn failed(
        source_reference: impl Into<String>,
        bank_name: Option<String>,
        failure: ParseFailure,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            source_reference: source_reference.into(),
            success: false,
            bank_name,
            failure_reason: Some(failure.to_string()),
            failure: Some(failure),
            record: None,
            skipped_lines: 0,
            warnings: Vec::new(),
            processing_time_ms,
            output_file: None,
        }
    }
}

/// Aggregate result of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// When the run finished.
    pub timestamp: DateTime<Local>,
    pub total_processed: usize,
    pub successful: usize,
    pub failed: usize,
    /// Outcomes in input order.
    pub details: Vec<DocumentOutcome>,
}

impl BatchReport {
    /// Build a report from outcomes already in input order.
    pub fn from_outcomes(details: Vec<DocumentOutcome>) -> Self {
        let successful = details.iter().filter(|d| d.success).count();
        Self {
            timestamp: Local::now(),
            total_processed: details.len(),
            successful,
            failed: details.len() - successful,
            details,
        }
    }

    /// Successful outcomes with their records.
    pub fn records(&self) -> impl Iterator<Item = &StatementRecord> {
        self.details.iter().filter_map(|d| d.record.as_ref())
    }

    /// Failed outcomes.
    pub fn failures(&self) -> impl Iterator<Item = &DocumentOutcome> {
        self.details.iter().filter(|d| !d.success)
    }

    /// `processing_report_<YYYYmmdd_HHMMSS>.json`
    pub fn file_name(&self) -> String {
        format!("processing_report_{}.json", self.timestamp.format("%Y%m%d_%H%M%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_reconcile() {
        let report = BatchReport::from_outcomes(vec![
            DocumentOutcome::failed("a.pdf", None, ParseFailure::UnknownBank, 1),
            DocumentOutcome::failed(
                "b.pdf",
                Some("HDFC Bank".to_string()),
                ParseFailure::UnparseableDocument {
                    reason: "document contains no text".to_string(),
                },
                2,
            ),
        ]);

        assert_eq!(report.total_processed, 2);
        assert_eq!(report.successful + report.failed, report.total_processed);
        assert_eq!(report.failures().count(), 2);
        assert_eq!(report.records().count(), 0);
    }

    #[test]
    fn test_serialized_failure_is_tagged() {
        let outcome = DocumentOutcome::failed("a.pdf", None, ParseFailure::UnknownBank, 0);
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["failure"]["kind"], "unknown_bank");
        assert_eq!(json["failure_reason"], "could not detect bank from statement");
        assert!(json.get("record").is_none());
    }

    #[test]
    fn test_report_file_name() {
        let report = BatchReport::from_outcomes(Vec::new());
        let name = report.file_name();
        assert!(name.starts_with("processing_report_"));
        assert!(name.ends_with(".json"));
        assert_eq!(name.len(), "processing_report_20240101_120000.json".len());
    }
}
