//! Rule-based field extractors for statement text.

pub mod amounts;
pub mod card;
pub mod cycle;
pub mod dates;
pub mod patterns;

pub use amounts::{AmountExtractor, format_indian_amount, parse_amount};
pub use card::{CardNumberExtractor, normalize_last4};
pub use cycle::CycleExtractor;
pub use dates::{DateExtractor, DateOrder, parse_date};

use regex::Regex;

/// Trait for field extractors.
///
/// Absence is a normal outcome: `extract` returns `None` when no candidate
/// pattern yields a valid value.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text using the first pattern that yields a value.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Every value the candidate patterns yield, in pattern order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value found by an extractor and where it came from.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Normalized value.
    pub value: T,
    /// Index of the pattern that produced it.
    pub pattern_index: usize,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, pattern_index: usize, source: impl Into<String>) -> Self {
        Self {
            value,
            pattern_index,
            source: source.into(),
        }
    }
}

/// Ordered, case-insensitive candidate patterns for one field.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    /// Compile pattern templates, expanding `{date}`, `{amount}` and `{currency}`.
    pub fn compile(templates: &[String]) -> Result<Self, regex::Error> {
        let patterns = templates
            .iter()
            .map(|t| Regex::new(&format!("(?i){}", patterns::expand(t))))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Regex> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
