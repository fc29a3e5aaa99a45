//! Bank detection from the first pages of a statement.

use tracing::debug;

use crate::profiles::{BankProfile, ProfileRegistry};

/// Pages inspected by default.
pub const DEFAULT_DETECTION_PAGES: usize = 2;

/// Outcome of bank detection.
#[derive(Debug, Clone, Copy)]
pub enum Detection<'r> {
    /// The first profile, in registry order, whose signature matched.
    Matched(&'r BankProfile),
    /// No signature matched.
    Unknown,
}

impl<'r> Detection<'r> {
    pub fn profile(&self) -> Option<&'r BankProfile> {
        match *self {
            Self::Matched(profile) => Some(profile),
            Self::Unknown => None,
        }
    }
}

/// Selects a bank profile by checking signatures in registry order.
#[derive(Debug, Clone, Copy)]
pub struct BankDetector<'r> {
    registry: &'r ProfileRegistry,
    max_pages: usize,
}

impl<'r> BankDetector<'r> {
    pub fn new(registry: &'r ProfileRegistry) -> Self {
        Self {
            registry,
            max_pages: DEFAULT_DETECTION_PAGES,
        }
    }

    /// Set how many leading pages are inspected (at least one).
    pub fn with_max_pages(mut self, pages: usize) -> Self {
        self.max_pages = pages.max(1);
        self
    }

    /// Detect the issuer from page-ordered text.
    pub fn detect(&self, pages: &[String]) -> Detection<'r> {
        let head = pages
            .iter()
            .take(self.max_pages)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n");
        self.detect_text(&head)
    }

    /// Detect the issuer from a single text blob.
    pub fn detect_text(&self, text: &str) -> Detection<'r> {
        let haystack = text.to_lowercase();

        for profile in self.registry.iter() {
            if profile.matches_signature(&haystack) {
                debug!("Detected bank: {}", profile.name());
                return Detection::Matched(profile);
            }
        }

        debug!("No bank signature matched");
        Detection::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn detected(registry: &ProfileRegistry, text: &str) -> Option<String> {
        BankDetector::new(registry)
            .detect_text(text)
            .profile()
            .map(|p| p.name().to_string())
    }

    #[test]
    fn test_each_builtin_signature() {
        let registry = ProfileRegistry::builtin();
        let cases = [
            ("HDFC BANK Credit Card Statement", "HDFC Bank"),
            ("ICICI Bank Credit Card", "ICICI Bank"),
            ("SBI Card Monthly Statement", "SBI Card"),
            ("Your sbicard statement", "SBI Card"),
            ("Axis Bank Limited", "Axis Bank"),
            ("Kotak Mahindra Bank", "Kotak Mahindra Bank"),
        ];
        for (text, expected) in cases {
            assert_eq!(detected(&registry, text).as_deref(), Some(expected), "{}", text);
        }
    }

    #[test]
    fn test_unknown_bank() {
        let registry = ProfileRegistry::builtin();
        assert_eq!(detected(&registry, "Some Other Bank statement"), None);
        // "axis" alone is not the Axis Bank signature
        assert_eq!(detected(&registry, "on the x axis"), None);
    }

    #[test]
    fn test_first_registered_wins() {
        let registry = ProfileRegistry::builtin();
        assert_eq!(
            detected(&registry, "Balance transfer from Kotak to HDFC").as_deref(),
            Some("HDFC Bank")
        );
    }

    #[test]
    fn test_only_leading_pages_inspected() {
        let registry = ProfileRegistry::builtin();
        let pages = vec![
            "Statement".to_string(),
            "Summary".to_string(),
            "Offers from ICICI".to_string(),
        ];

        let detector = BankDetector::new(&registry);
        assert!(detector.detect(&pages).profile().is_none());
        let wide = detector.with_max_pages(3);
        assert_eq!(wide.detect(&pages).profile().map(|p| p.name()), Some("ICICI Bank"));
    }
}
