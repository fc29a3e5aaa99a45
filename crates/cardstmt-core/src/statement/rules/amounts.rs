//! Amount extraction for statement totals and ledger rows.

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::trace;

use super::patterns::CURRENCY_NOISE;
use super::{ExtractionMatch, FieldExtractor, PatternSet};

/// Extracts a labeled amount (e.g. total due) using a profile's pattern list.
pub struct AmountExtractor<'p> {
    patterns: &'p PatternSet,
}

impl<'p> AmountExtractor<'p> {
    pub fn new(patterns: &'p PatternSet) -> Self {
        Self { patterns }
    }
}

impl FieldExtractor for AmountExtractor<'_> {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for (index, re) in self.patterns.iter().enumerate() {
            let Some(caps) = re.captures(text) else {
                continue;
            };
            let Some(raw) = caps.name("value").or_else(|| caps.get(1)) else {
                continue;
            };

            if let Some(amount) = parse_amount(raw.as_str()) {
                trace!("amount pattern {} matched {:?} -> {}", index, raw.as_str(), amount);
                results.push(ExtractionMatch::new(amount, index, raw.as_str()));
            }
        }

        results
    }
}

/// Parse an issuer-formatted amount such as `₹1,23,456.78`, `(450.00)` or `-12`.
///
/// Thousands separators (western or lakh grouping), currency symbols and
/// whitespace are dropped. Parentheses and a leading minus mean negative.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let stripped = CURRENCY_NOISE.replace_all(s.trim(), "");
    let mut cleaned: String = stripped
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();

    let mut negative = false;
    if cleaned.starts_with('(') && cleaned.ends_with(')') && cleaned.len() > 2 {
        negative = true;
        cleaned = cleaned[1..cleaned.len() - 1].to_string();
    }
    if let Some(rest) = cleaned.strip_prefix('-') {
        negative = !negative;
        cleaned = rest.to_string();
    }

    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }

    let amount = Decimal::from_str(&cleaned).ok()?;
    Some(if negative { -amount } else { amount })
}

/// Format an amount with Indian digit grouping (1,23,456.78).
pub fn format_indian_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.abs());
    let (integer_part, decimal_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    let digits: Vec<char> = integer_part.chars().collect();
    let mut grouped = String::new();
    let len = digits.len();

    for (i, c) in digits.iter().enumerate() {
        let remaining = len - i;
        if i > 0 && (remaining == 3 || (remaining > 3 && (remaining - 3) % 2 == 0)) {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, decimal_part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("45,230.50"), Some(dec("45230.50")));
        assert_eq!(parse_amount("1,23,456.78"), Some(dec("123456.78")));
        assert_eq!(parse_amount("₹ 450.00"), Some(dec("450.00")));
        assert_eq!(parse_amount("Rs. 1,000"), Some(dec("1000")));
        assert_eq!(parse_amount("(450.00)"), Some(dec("-450.00")));
        assert_eq!(parse_amount("-12.5"), Some(dec("-12.5")));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("()"), None);
        assert_eq!(parse_amount("N/A"), None);
        assert_eq!(parse_amount("12.3.4"), None);
    }

    #[test]
    fn test_format_indian_amount() {
        assert_eq!(format_indian_amount(dec("123456.78")), "1,23,456.78");
        assert_eq!(format_indian_amount(dec("45230.5")), "45,230.50");
        assert_eq!(format_indian_amount(dec("999")), "999.00");
        assert_eq!(format_indian_amount(dec("-1200")), "-1,200.00");
    }

    #[test]
    fn test_extractor_first_pattern_wins() {
        let patterns = PatternSet::compile(&[
            r"Total\s+Amount\s+Due\s*:?\s*{currency}\s*({amount})".to_string(),
            r"Amount\s+Due\s*:?\s*{currency}\s*({amount})".to_string(),
        ])
        .unwrap();
        let extractor = AmountExtractor::new(&patterns);

        let text = "Minimum Amount Due: 2,000.00\nTotal Amount Due: Rs. 45,230.50";
        assert_eq!(extractor.extract(text).unwrap().value, dec("45230.50"));
    }
}
