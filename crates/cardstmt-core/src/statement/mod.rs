//! Statement extraction: field rules, ledger grammar and the shared parser.

pub mod ledger;
mod parser;
pub mod rules;

pub use ledger::{
    ColumnSpan, GrammarSpec, Ledger, LineGrammar, RowOutcome, SignPolicy, extract_ledger, extract_ledger_pages,
};
pub use parser::{ExtractionResult, StatementParser};

use crate::error::ParseFailure;

/// Result type for statement parsing.
pub type Result<T> = std::result::Result<T, ParseFailure>;
