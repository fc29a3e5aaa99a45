//! Card number (last four digits) extraction.

use tracing::trace;

use super::{ExtractionMatch, FieldExtractor, PatternSet};

/// Extracts the last four digits of a masked card number.
pub struct CardNumberExtractor<'p> {
    patterns: &'p PatternSet,
}

impl<'p> CardNumberExtractor<'p> {
    pub fn new(patterns: &'p PatternSet) -> Self {
        Self { patterns }
    }
}

impl FieldExtractor for CardNumberExtractor<'_> {
    type Output = ExtractionMatch<String>;

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

            if let Some(last4) = normalize_last4(raw.as_str()) {
                trace!("card pattern {} matched {:?}", index, raw.as_str());
                results.push(ExtractionMatch::new(last4, index, raw.as_str()));
            }
        }

        results
    }
}

/// Keep digits only; the result must be exactly four digits.
pub fn normalize_last4(s: &str) -> Option<String> {
    let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
    (digits.len() == 4).then_some(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> PatternSet {
        PatternSet::compile(&[
            r"(?:[X*]{4}[\s-]?){3}(\d{4})\b".to_string(),
            r"Card\s+ending\s+(?:with|in)?\s*:?\s*(\d{4})\b".to_string(),
        ])
        .unwrap()
    }

    #[test]
    fn test_extract_masked_number() {
        let patterns = patterns();
        let extractor = CardNumberExtractor::new(&patterns);

        assert_eq!(extractor.extract("Card No: XXXX XXXX XXXX 1234").unwrap().value, "1234");
        assert_eq!(extractor.extract("****-****-****-9876").unwrap().value, "9876");
    }

    #[test]
    fn test_extract_card_ending() {
        let patterns = patterns();
        let extractor = CardNumberExtractor::new(&patterns);

        assert_eq!(extractor.extract("Card ending 5678").unwrap().value, "5678");
        assert_eq!(extractor.extract("card ending with 0042").unwrap().value, "0042");
        assert!(extractor.extract("Card ending 56789").is_none());
    }

    #[test]
    fn test_normalize_last4() {
        assert_eq!(normalize_last4(" 12 34 "), Some("1234".to_string()));
        assert_eq!(normalize_last4("123"), None);
    }
}
