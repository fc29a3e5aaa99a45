//! Transaction ledger extraction.
//!
//! A profile's [`LineGrammar`] turns one text line into a transaction. Lines
//! matching the grammar's `row_start` pattern are candidate rows; candidates
//! that fail to parse are malformed and get skipped, anything else ends the
//! ledger section once it has started.

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rules::patterns::{self, CREDIT_MARKER, ROW_START_DEFAULT};
use super::rules::{DateOrder, parse_amount, parse_date};
use crate::models::statement::Transaction;

/// How printed amounts and debit/credit markers map to signed amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignPolicy {
    /// Keep the printed sign: `(450.00)` and `-450.00` are negative, markers are ignored.
    #[default]
    AsPrinted,
    /// Magnitude only; a credit marker (`Cr`, `C`) makes the amount negative.
    CreditNegative,
    /// Magnitude only; any marker is appended to the description.
    AllPositive,
}

impl SignPolicy {
    /// Apply the policy to a parsed amount, returning the signed amount and description.
    pub fn apply(&self, amount: Decimal, marker: Option<&str>, description: &str) -> (Decimal, String) {
        match self {
            Self::AsPrinted => (amount, description.to_string()),
            Self::CreditNegative => {
                let is_credit = marker.is_some_and(|m| CREDIT_MARKER.is_match(m.trim()));
                let magnitude = amount.abs();
                (if is_credit { -magnitude } else { magnitude }, description.to_string())
            }
            Self::AllPositive => {
                let description = match marker.map(str::trim).filter(|m| !m.is_empty()) {
                    Some(m) => format!("{} {}", description, m),
                    None => description.to_string(),
                };
                (amount.abs(), description)
            }
        }
    }
}

/// A character column range in a fixed-width layout; `end` of `None` runs to end of line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpan {
    pub start: usize,
    #[serde(default)]
    pub end: Option<usize>,
}

impl ColumnSpan {
    pub fn new(start: usize, end: Option<usize>) -> Self {
        Self { start, end }
    }

    fn slice(&self, line: &str) -> String {
        let end = self.end.unwrap_or(usize::MAX);
        line.chars()
            .skip(self.start)
            .take(end.saturating_sub(self.start))
            .collect()
    }
}

/// Declarative description of one issuer's ledger row layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GrammarSpec {
    /// Regex with named groups `date`, `description`, `amount` and optional `marker`.
    Pattern {
        pattern: String,
        #[serde(default)]
        row_start: Option<String>,
    },
    /// Fields separated by a delimiter, addressed by column index.
    Delimited {
        delimiter: String,
        date: usize,
        description: usize,
        amount: usize,
        #[serde(default)]
        marker: Option<usize>,
        #[serde(default)]
        row_start: Option<String>,
    },
    /// Fields at fixed character positions.
    FixedWidth {
        date: ColumnSpan,
        description: ColumnSpan,
        amount: ColumnSpan,
        #[serde(default)]
        marker: Option<ColumnSpan>,
        #[serde(default)]
        row_start: Option<String>,
    },
}

#[derive(Debug, Clone)]
enum RowLayout {
    Pattern(Regex),
    Delimited {
        delimiter: String,
        date: usize,
        description: usize,
        amount: usize,
        marker: Option<usize>,
    },
    FixedWidth {
        date: ColumnSpan,
        description: ColumnSpan,
        amount: ColumnSpan,
        marker: Option<ColumnSpan>,
    },
}

/// Raw, un-normalized fields of one row.
struct RawRow {
    date: String,
    description: String,
    amount: String,
    marker: Option<String>,
}

/// Outcome of applying a grammar to one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// A well-formed transaction.
    Parsed(Transaction),
    /// Looks like a ledger row but could not be parsed.
    Malformed,
    /// Not a ledger row at all.
    NotARow,
}

/// Compiled ledger line grammar.
#[derive(Debug, Clone)]
pub struct LineGrammar {
    row_start: Regex,
    layout: RowLayout,
}

impl LineGrammar {
    /// Compile a grammar spec.
    pub fn compile(spec: &GrammarSpec) -> Result<Self, regex::Error> {
        let compile_row_start = |row_start: &Option<String>| -> Result<Regex, regex::Error> {
            match row_start {
                Some(p) => Regex::new(&format!("(?i){}", patterns::expand(p))),
                None => Ok(ROW_START_DEFAULT.clone()),
            }
        };

        let grammar = match spec {
            GrammarSpec::Pattern { pattern, row_start } => Self {
                row_start: compile_row_start(row_start)?,
                layout: RowLayout::Pattern(Regex::new(&format!("(?i){}", patterns::expand(pattern)))?),
            },
            GrammarSpec::Delimited { delimiter, date, description, amount, marker, row_start } => Self {
                row_start: compile_row_start(row_start)?,
                layout: RowLayout::Delimited {
                    delimiter: delimiter.clone(),
                    date: *date,
                    description: *description,
                    amount: *amount,
                    marker: *marker,
                },
            },
            GrammarSpec::FixedWidth { date, description, amount, marker, row_start } => Self {
                row_start: compile_row_start(row_start)?,
                layout: RowLayout::FixedWidth {
                    date: *date,
                    description: *description,
                    amount: *amount,
                    marker: *marker,
                },
            },
        };

        Ok(grammar)
    }

    /// Whether the pattern layout declares the named groups the parser reads.
    pub(crate) fn missing_groups(&self) -> Vec<&'static str> {
        match &self.layout {
            RowLayout::Pattern(re) => {
                let names: Vec<&str> = re.capture_names().flatten().collect();
                ["date", "description", "amount"]
                    .into_iter()
                    .filter(|g| !names.contains(g))
                    .collect()
            }
            _ => Vec::new(),
        }
    }

    /// Whether a line looks like the start of a ledger row.
    pub fn is_candidate(&self, line: &str) -> bool {
        self.row_start.is_match(line)
    }

    /// Parse one line into a transaction.
    pub fn parse_line(&self, line: &str, order: DateOrder, policy: SignPolicy) -> RowOutcome {
        let candidate = self.is_candidate(line);

        let Some(raw) = self.split(line) else {
            return if candidate { RowOutcome::Malformed } else { RowOutcome::NotARow };
        };

        match normalize(raw, order, policy) {
            Some(txn) => RowOutcome::Parsed(txn),
            None if candidate => RowOutcome::Malformed,
            None => RowOutcome::NotARow,
        }
    }

    fn split(&self, line: &str) -> Option<RawRow> {
        match &self.layout {
            RowLayout::Pattern(re) => {
                let caps = re.captures(line)?;
                Some(RawRow {
                    date: caps.name("date")?.as_str().to_string(),
                    description: caps.name("description")?.as_str().to_string(),
                    amount: caps.name("amount")?.as_str().to_string(),
                    marker: caps.name("marker").map(|m| m.as_str().to_string()),
                })
            }
            RowLayout::Delimited { delimiter, date, description, amount, marker } => {
                let parts: Vec<&str> = line.split(delimiter.as_str()).collect();
                Some(RawRow {
                    date: parts.get(*date)?.to_string(),
                    description: parts.get(*description)?.to_string(),
                    amount: parts.get(*amount)?.to_string(),
                    marker: marker.and_then(|i| parts.get(i)).map(|s| s.to_string()),
                })
            }
            RowLayout::FixedWidth { date, description, amount, marker } => {
                if line.chars().count() <= amount.start {
                    return None;
                }
                Some(RawRow {
                    date: date.slice(line),
                    description: description.slice(line),
                    amount: amount.slice(line),
                    marker: marker.map(|m| m.slice(line)),
                })
            }
        }
    }
}

fn normalize(raw: RawRow, order: DateOrder, policy: SignPolicy) -> Option<Transaction> {
    let date = parse_date(&raw.date, order)?;
    let description = raw.description.trim();
    if description.is_empty() {
        return None;
    }
    let amount = parse_amount(&raw.amount)?;
    let (amount, description) = policy.apply(amount, raw.marker.as_deref(), description);

    Some(Transaction {
        date,
        description,
        amount,
    })
}

/// Transactions found in a ledger section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    /// Parsed rows in document order.
    pub transactions: Vec<Transaction>,
    /// Malformed candidate rows inside the section that were skipped.
    pub skipped_lines: usize,
    /// Well-formed rows found after the section ended; not in `transactions`.
    pub ignored_rows: usize,
}

impl Ledger {
    fn append(&mut self, other: Ledger) {
        self.transactions.extend(other.transactions);
        self.skipped_lines += other.skipped_lines;
        self.ignored_rows += other.ignored_rows;
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Before,
    Inside,
    After,
}

/// Locate the ledger section and parse every row in it.
///
/// The section starts at the first line that parses as a transaction and
/// ends at the first line after it that is not a candidate row, or at the
/// end of the text. Blank lines are ignored. Rows that would parse after
/// the section has ended are counted in `ignored_rows`.
pub fn extract_ledger(text: &str, grammar: &LineGrammar, order: DateOrder, policy: SignPolicy) -> Ledger {
    let mut ledger = Ledger::default();
    let mut section = Section::Before;

    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        match (section, grammar.parse_line(line, order, policy)) {
            (Section::After, RowOutcome::Parsed(_)) => {
                debug!("Ignoring row after ledger section at line {}: {:?}", line_no + 1, line.trim());
                ledger.ignored_rows += 1;
            }
            (_, RowOutcome::Parsed(txn)) => {
                section = Section::Inside;
                ledger.transactions.push(txn);
            }
            (Section::Inside, RowOutcome::Malformed) => {
                debug!("Skipping malformed ledger line {}: {:?}", line_no + 1, line.trim());
                ledger.skipped_lines += 1;
            }
            (Section::Inside, RowOutcome::NotARow) => {
                debug!("Ledger section ends at line {}", line_no + 1);
                section = Section::After;
            }
            _ => {}
        }
    }

    ledger
}

/// Run [`extract_ledger`] on each page and concatenate in page order.
///
/// Statements repeat headers and footers on every page, so each page gets
/// its own section.
pub fn extract_ledger_pages<S: AsRef<str>>(
    pages: &[S],
    grammar: &LineGrammar,
    order: DateOrder,
    policy: SignPolicy,
) -> Ledger {
    let mut ledger = Ledger::default();
    for (i, page) in pages.iter().enumerate() {
        let page_ledger = extract_ledger(page.as_ref(), grammar, order, policy);
        debug!("Page {}: {} ledger rows", i + 1, page_ledger.transactions.len());
        ledger.append(page_ledger);
    }
    ledger
}
