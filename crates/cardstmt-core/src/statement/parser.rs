//! Profile-driven statement parser.

use std::time::Instant;

use tracing::{debug, info};

use super::Result;
use super::ledger::extract_ledger_pages;
use super::rules::{AmountExtractor, CardNumberExtractor, CycleExtractor, DateExtractor, FieldExtractor};
use crate::error::ParseFailure;
use crate::models::statement::{StatementField, StatementRecord};
use crate::profiles::BankProfile;

/// Result of statement extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Validated statement record.
    pub record: StatementRecord,
    /// Malformed ledger rows that were skipped.
    pub skipped_lines: usize,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Turns statement text into a validated record using a bank profile.
///
/// The parser holds no per-issuer logic; everything bank specific comes
/// from the [`BankProfile`] passed to [`parse`](Self::parse).
#[derive(Debug, Clone)]
pub struct StatementParser {
    /// Warn when ledger dates fall outside the billing cycle.
    check_cycle_dates: bool,
}

impl Default for StatementParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self {
            check_cycle_dates: true,
        }
    }

    /// Set whether out-of-cycle transaction dates produce a warning.
    pub fn with_cycle_date_check(mut self, check: bool) -> Self {
        self.check_cycle_dates = check;
        self
    }

    /// Parse a document's text, treated as a single page, with the given profile.
    pub fn parse(&self, text: &str, profile: &BankProfile, source_reference: &str) -> Result<ExtractionResult> {
        self.parse_document(text, &[text], profile, source_reference)
    }

    /// Parse a document from its page texts.
    ///
    /// Fields are searched across the whole document; the ledger is read
    /// page by page so headers and footers between pages do not end it.
    pub fn parse_pages(
        &self,
        pages: &[String],
        profile: &BankProfile,
        source_reference: &str,
    ) -> Result<ExtractionResult> {
        let text = pages.join("\n");
        self.parse_document(&text, pages, profile, source_reference)
    }

    fn parse_document<S: AsRef<str>>(
        &self,
        text: &str,
        pages: &[S],
        profile: &BankProfile,
        source_reference: &str,
    ) -> Result<ExtractionResult> {
        let start = Instant::now();

        if text.trim().is_empty() {
            return Err(ParseFailure::UnparseableDocument {
                reason: "document contains no text".to_string(),
            });
        }
        if !profile.has_field_patterns() {
            return Err(ParseFailure::UnparseableDocument {
                reason: format!("profile {} defines no field patterns", profile.name()),
            });
        }

        debug!("{}: extracting fields with profile {}", source_reference, profile.name());
        let order = profile.date_order();

        let card_last4 = CardNumberExtractor::new(profile.card_last4_patterns())
            .extract(text)
            .map(|m| m.value);
        let cycle = CycleExtractor::new(profile.billing_cycle_patterns(), order)
            .extract(text)
            .map(|m| m.value);
        let due_date = DateExtractor::new(profile.payment_due_date_patterns(), order)
            .extract(text)
            .map(|m| m.value);
        // A negative total is a credit balance misread as the amount due
        let total_due = AmountExtractor::new(profile.total_amount_due_patterns())
            .extract_all(text)
            .into_iter()
            .map(|m| m.value)
            .find(|v| !v.is_sign_negative());

        debug!("{}: extracting transactions", source_reference);
        let ledger = extract_ledger_pages(pages, profile.grammar(), order, profile.sign_policy());

        debug!("{}: validating", source_reference);
        let missing: Vec<StatementField> = [
            (StatementField::CardLast4, card_last4.is_some()),
            (StatementField::BillingCycle, cycle.is_some()),
            (StatementField::PaymentDueDate, due_date.is_some()),
            (StatementField::TotalAmountDue, total_due.is_some()),
        ]
        .into_iter()
        .filter(|(_, found)| !found)
        .map(|(field, _)| field)
        .collect();

        let (Some(card_last4), Some(cycle), Some(due_date), Some(total_due)) = (card_last4, cycle, due_date, total_due)
        else {
            debug!("{}: missing fields {:?}", source_reference, missing);
            return Err(ParseFailure::IncompleteStatement { missing });
        };

        let mut warnings = Vec::new();
        if ledger.transactions.is_empty() {
            warnings.push("No transactions found in statement".to_string());
        }
        if ledger.skipped_lines > 0 {
            warnings.push(format!("Skipped {} malformed transaction lines", ledger.skipped_lines));
        }
        if ledger.ignored_rows > 0 {
            warnings.push(format!(
                "Ignored {} transaction-like lines after the ledger section",
                ledger.ignored_rows
            ));
        }
        if self.check_cycle_dates {
            let outside = ledger.transactions.iter().filter(|t| !cycle.contains(t.date)).count();
            if outside > 0 {
                warnings.push(format!("{} transactions dated outside the billing cycle", outside));
            }
        }

        let record = StatementRecord::new(
            card_last4,
            cycle,
            due_date,
            total_due,
            ledger.transactions,
            profile.name(),
            source_reference,
        );

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "{}: parsed {} statement with {} transactions in {}ms",
            source_reference,
            profile.name(),
            record.transactions().len(),
            processing_time_ms
        );

        Ok(ExtractionResult {
            record,
            skipped_lines: ledger.skipped_lines,
            warnings,
            processing_time_ms,
        })
    }
}
