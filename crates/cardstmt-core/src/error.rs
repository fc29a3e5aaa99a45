//! Error types for the cardstmt-core library.

use serde::Serialize;
use thiserror::Error;

use crate::models::statement::StatementField;

/// Main error type for the cardstmt library.
#[derive(Error, Debug)]
pub enum CardstmtError {
    /// Bank profile definition error.
    #[error("profile error: {0}")]
    Profile(#[from] ProfileError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while turning a PDF into page text.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and no password was supplied.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The supplied password did not decrypt the PDF.
    #[error("PDF password was rejected")]
    InvalidPassword,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The PDF carries images but no extractable text (scanned statement).
    #[error("PDF has no text layer ({images} images, {chars} chars of text)")]
    ImageOnly { images: usize, chars: usize },

    /// The file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors in a bank profile definition.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// A field or grammar pattern failed to compile.
    #[error("profile {profile}: invalid {field} pattern: {source}")]
    InvalidPattern {
        profile: String,
        field: String,
        #[source]
        source: regex::Error,
    },

    /// The detection signature has no literals, so it would match everything.
    #[error("profile {0}: detection signature is empty")]
    EmptySignature(String),

    /// Two profiles registered under the same name.
    #[error("duplicate profile name: {0}")]
    DuplicateProfile(String),

    /// A grammar references a column it cannot have.
    #[error("profile {profile}: invalid grammar: {reason}")]
    InvalidGrammar { profile: String, reason: String },

    /// A profile file could not be read or decoded.
    #[error("failed to load profile from {path}: {reason}")]
    Load { path: String, reason: String },
}

/// Why a single document did not produce a statement record.
///
/// Every variant is fatal for its document only; the batch keeps going.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseFailure {
    /// Text extraction or decryption failed.
    #[error("document {source_reference} is unreadable: {cause}")]
    DocumentUnreadable {
        source_reference: String,
        cause: String,
    },

    /// No registered profile signature matched.
    #[error("could not detect bank from statement")]
    UnknownBank,

    /// Required scalar fields were not found.
    #[error("incomplete statement, missing: {}", format_fields(missing))]
    IncompleteStatement { missing: Vec<StatementField> },

    /// No usable text, or the profile has nothing to match with.
    #[error("unparseable document: {reason}")]
    UnparseableDocument { reason: String },
}

fn format_fields(fields: &[StatementField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ParseFailure {
    /// Short machine-friendly name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DocumentUnreadable { .. } => "document_unreadable",
            Self::UnknownBank => "unknown_bank",
            Self::IncompleteStatement { .. } => "incomplete_statement",
            Self::UnparseableDocument { .. } => "unparseable_document",
        }
    }
}

/// Result type for the cardstmt library.
pub type Result<T> = std::result::Result<T, CardstmtError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_statement_names_fields() {
        let failure = ParseFailure::IncompleteStatement {
            missing: vec![StatementField::CardLast4, StatementField::TotalAmountDue],
        };
        assert_eq!(
            failure.to_string(),
            "incomplete statement, missing: card_last4, total_amount_due"
        );
        assert_eq!(failure.kind(), "incomplete_statement");
    }

    #[test]
    fn test_failure_serializes_with_kind_tag() {
        let json = serde_json::to_value(ParseFailure::UnknownBank).unwrap();
        assert_eq!(json["kind"], "unknown_bank");
    }
}
