//! Rendering statement records as JSON, CSV and plain text.

use std::collections::HashSet;
use std::path::Path;

use cardstmt_core::StatementRecord;
use cardstmt_core::statement::rules::format_indian_amount;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per transaction
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

const CSV_HEADER: [&str; 9] = [
    "Date",
    "Description",
    "Amount",
    "Card_Last_4_Digits",
    "Billing_Cycle_Start",
    "Billing_Cycle_End",
    "Payment_Due_Date",
    "Total_Amount_Due",
    "Bank",
];

pub fn format_record(record: &StatementRecord, format: OutputFormat, currency: &str) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_record_csv(record),
        OutputFormat::Text => Ok(format_record_text(record, currency)),
    }
}

/// One row per transaction with the statement fields repeated on each row.
///
/// A statement without transactions still gets one row so its fields survive.
pub fn format_record_csv(record: &StatementRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(CSV_HEADER)?;

    let cycle_start = record.billing_cycle_start().to_string();
    let cycle_end = record.billing_cycle_end().to_string();
    let due = record.payment_due_date().to_string();
    let total = record.total_amount_due().to_string();

    if !record.has_activity() {
        wtr.write_record([
            "",
            "",
            "",
            record.card_last4(),
            &cycle_start,
            &cycle_end,
            &due,
            &total,
            record.bank_name(),
        ])?;
    }

    for txn in record.transactions() {
        wtr.write_record([
            txn.date.to_string().as_str(),
            &txn.description,
            &txn.amount.to_string(),
            record.card_last4(),
            &cycle_start,
            &cycle_end,
            &due,
            &total,
            record.bank_name(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

pub fn format_record_text(record: &StatementRecord, currency: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Bank: {}\n", record.bank_name()));
    output.push_str(&format!("Card: XXXX XXXX XXXX {}\n", record.card_last4()));
    let cycle = record.billing_cycle();
    output.push_str(&format!("Billing Cycle: {} to {}\n", cycle.start(), cycle.end()));
    output.push_str(&format!("Payment Due Date: {}\n", record.payment_due_date()));
    output.push_str(&format!(
        "Total Amount Due: {} {}\n",
        currency,
        format_indian_amount(record.total_amount_due())
    ));
    output.push('\n');

    output.push_str(&format!("Transactions ({}):\n", record.transactions().len()));
    for txn in record.transactions() {
        output.push_str(&format!(
            "  {}  {:<40} {:>14}\n",
            txn.date,
            txn.description,
            format_indian_amount(txn.amount)
        ));
    }
    if record.has_activity() {
        output.push_str(&format!(
            "Net activity: {} {}\n",
            currency,
            format_indian_amount(record.transaction_total())
        ));
    }

    output
}

/// Lowercase, underscore-separated form of a bank name.
pub fn bank_slug(bank_name: &str) -> String {
    bank_name
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// `<stem>_<bank>_extracted.<ext>`
pub fn output_file_name(source: &Path, bank_name: &str, format: OutputFormat) -> String {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("statement");
    format!("{}_{}_extracted.{}", stem, bank_slug(bank_name), format.extension())
}

/// Claim `name`, or `<name>_<n>.<ext>` with the first free `n` from 2.
pub fn claim_file_name(claimed: &mut HashSet<String>, name: String) -> String {
    if claimed.insert(name.clone()) {
        return name;
    }

    let (stem, ext) = name.rsplit_once('.').unwrap_or((name.as_str(), ""));
    let mut n = 2;
    loop {
        let candidate = if ext.is_empty() {
            format!("{}_{}", stem, n)
        } else {
            format!("{}_{}.{}", stem, n, ext)
        };
        if claimed.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
