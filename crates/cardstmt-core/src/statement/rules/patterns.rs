//! Shared regex fragments and value-normalizing patterns.
//!
//! Profile patterns may embed `{date}`, `{amount}` and `{currency}`; these
//! expand to the non-capturing fragments below before compilation.

use lazy_static::lazy_static;
use regex::Regex;

/// Any supported date token (numeric, month-name or ISO).
pub const DATE_FRAGMENT: &str = concat!(
    r"(?:\d{4}-\d{1,2}-\d{1,2}",
    r"|\d{1,2}[/.\-]\d{1,2}[/.\-](?:\d{4}|\d{2})",
    r"|\d{1,2}[\s\-](?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?[\s\-,]+(?:\d{4}|\d{2})",
    r"|(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{1,2},?\s+\d{4})"
);

/// Amount token: optional sign or parentheses, grouped digits, optional decimals.
pub const AMOUNT_FRAGMENT: &str = r"(?:\(?-?\d[\d,]*(?:\.\d+)?\)?)";

/// Optional currency prefix.
pub const CURRENCY_FRAGMENT: &str = r"(?:Rs\.?|INR|₹|\$)?";

/// Expand the shared placeholders in a profile pattern.
pub fn expand(template: &str) -> String {
    template
        .replace("{date}", DATE_FRAGMENT)
        .replace("{amount}", AMOUNT_FRAGMENT)
        .replace("{currency}", CURRENCY_FRAGMENT)
}

lazy_static! {
    // Numeric dates: 05/01/2024, 05-01-24, 05.01.2024
    pub static ref DATE_NUMERIC: Regex = Regex::new(
        r"^(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4}|\d{2})$"
    ).unwrap();

    // ISO dates: 2024-01-05
    pub static ref DATE_ISO: Regex = Regex::new(
        r"^(\d{4})-(\d{1,2})-(\d{1,2})$"
    ).unwrap();

    // Day first with month name: 05 Jan 2024, 05-January-2024, 5 Jan, 24
    pub static ref DATE_DAY_MONTH_NAME: Regex = Regex::new(
        r"(?i)^(\d{1,2})[\s\-]([a-z]{3,9})\.?[\s\-,]+(\d{4}|\d{2})$"
    ).unwrap();

    // Month name first: Jan 05, 2024
    pub static ref DATE_MONTH_NAME_DAY: Regex = Regex::new(
        r"(?i)^([a-z]{3,9})\.?\s+(\d{1,2}),?\s+(\d{4})$"
    ).unwrap();

    // Currency symbols and words stripped before amount parsing
    pub static ref CURRENCY_NOISE: Regex = Regex::new(
        r"(?i)rs\.?|inr|₹|\$"
    ).unwrap();

    // Debit/credit markers printed next to amounts
    pub static ref CREDIT_MARKER: Regex = Regex::new(
        r"(?i)^(?:cr|c|credit)\.?$"
    ).unwrap();

    // Default start of a ledger row
    pub static ref ROW_START_DEFAULT: Regex = Regex::new(
        &format!(r"(?i)^\s*{}(?:\s|$)", DATE_FRAGMENT)
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_placeholders() {
        let expanded = expand(r"Due\s+Date\s*:?\s*({date})");
        assert!(expanded.contains(DATE_FRAGMENT));
        assert!(!expanded.contains("{date}"));

        // Quantifiers are left untouched
        assert_eq!(expand(r"(\d{4})"), r"(\d{4})");
    }

    #[test]
    fn test_date_fragment_matches_variants() {
        let re = Regex::new(&format!("(?i)^{}$", DATE_FRAGMENT)).unwrap();
        for sample in ["05/01/2024", "5-1-24", "05.01.2024", "05 Jan 2024", "05-Jan-2024", "Jan 05, 2024", "2024-01-05"] {
            assert!(re.is_match(sample), "{} should match", sample);
        }
        assert!(!re.is_match("SWIGGY"));
    }

    #[test]
    fn test_row_start_default() {
        assert!(ROW_START_DEFAULT.is_match("06/01/2024 SWIGGY 450.00"));
        assert!(!ROW_START_DEFAULT.is_match("Payment Due Date: 20/02/2024"));
    }
}
