//! Statement record and transaction models.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The required scalar fields of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementField {
    /// Last four digits of the card number.
    CardLast4,
    /// Billing cycle start and end.
    BillingCycle,
    /// Payment due date.
    PaymentDueDate,
    /// Total amount due.
    TotalAmountDue,
}

impl StatementField {
    /// All required fields, in extraction order.
    pub const ALL: [StatementField; 4] = [
        StatementField::CardLast4,
        StatementField::BillingCycle,
        StatementField::PaymentDueDate,
        StatementField::TotalAmountDue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CardLast4 => "card_last4",
            Self::BillingCycle => "billing_cycle",
            Self::PaymentDueDate => "payment_due_date",
            Self::TotalAmountDue => "total_amount_due",
        }
    }
}

impl fmt::Display for StatementField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Date range covered by a statement. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BillingCycle {
    start: NaiveDate,
    end: NaiveDate,
}

impl BillingCycle {
    /// Build a cycle, rejecting ranges that run backwards.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether a date falls inside the cycle (inclusive).
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A single ledger line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction date.
    pub date: NaiveDate,

    /// Trimmed, non-empty merchant/description text.
    pub description: String,

    /// Signed amount; sign convention comes from the bank profile.
    pub amount: Decimal,
}

/// Validated output of parsing one statement.
///
/// Only the statement parser builds these, after every required field has
/// been found, so a value of this type is always complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementRecord {
    card_last4: String,
    billing_cycle_start: NaiveDate,
    billing_cycle_end: NaiveDate,
    payment_due_date: NaiveDate,
    total_amount_due: Decimal,
    transactions: Vec<Transaction>,
    bank_name: String,
    source_reference: String,
}

impl StatementRecord {
    pub(crate) fn new(
        card_last4: String,
        cycle: BillingCycle,
        payment_due_date: NaiveDate,
        total_amount_due: Decimal,
        transactions: Vec<Transaction>,
        bank_name: impl Into<String>,
        source_reference: impl Into<String>,
    ) -> Self {
        debug_assert!(card_last4.len() == 4 && card_last4.bytes().all(|b| b.is_ascii_digit()));
        debug_assert!(!total_amount_due.is_sign_negative());

        let mut total_amount_due = total_amount_due.round_dp(2);
        total_amount_due.rescale(2);

        Self {
            card_last4,
            billing_cycle_start: cycle.start(),
            billing_cycle_end: cycle.end(),
            payment_due_date,
            total_amount_due,
            transactions,
            bank_name: bank_name.into(),
            source_reference: source_reference.into(),
        }
    }

    pub fn card_last4(&self) -> &str {
        &self.card_last4
    }

    pub fn billing_cycle_start(&self) -> NaiveDate {
        self.billing_cycle_start
    }

    pub fn billing_cycle_end(&self) -> NaiveDate {
        self.billing_cycle_end
    }

    pub fn billing_cycle(&self) -> BillingCycle {
        BillingCycle {
            start: self.billing_cycle_start,
            end: self.billing_cycle_end,
        }
    }

    pub fn payment_due_date(&self) -> NaiveDate {
        self.payment_due_date
    }

    /// Total due, always scaled to two decimal places.
    pub fn total_amount_due(&self) -> Decimal {
        self.total_amount_due
    }

    /// Ledger in document order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn bank_name(&self) -> &str {
        &self.bank_name
    }

    pub fn source_reference(&self) -> &str {
        &self.source_reference
    }

    /// False for statements with no activity in the cycle.
    pub fn has_activity(&self) -> bool {
        !self.transactions.is_empty()
    }

    /// Sum of all transaction amounts.
    pub fn transaction_total(&self) -> Decimal {
        self.transactions.iter().map(|t| t.amount).sum()
    }
}
