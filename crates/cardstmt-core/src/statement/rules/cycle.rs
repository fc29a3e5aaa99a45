//! Billing cycle (statement period) extraction.

use tracing::trace;

use super::dates::{DateOrder, parse_date};
use super::{ExtractionMatch, FieldExtractor, PatternSet};
use crate::models::statement::BillingCycle;

/// Extracts a start/end date pair.
///
/// Patterns capture the two dates as named groups `start` and `end`, or as
/// groups 1 and 2. A pair that runs backwards is skipped, not reordered.
pub struct CycleExtractor<'p> {
    patterns: &'p PatternSet,
    order: DateOrder,
}

impl<'p> CycleExtractor<'p> {
    pub fn new(patterns: &'p PatternSet, order: DateOrder) -> Self {
        Self { patterns, order }
    }
}

impl FieldExtractor for CycleExtractor<'_> {
    type Output = ExtractionMatch<BillingCycle>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for (index, re) in self.patterns.iter().enumerate() {
            let Some(caps) = re.captures(text) else {
                continue;
            };
            let start = caps.name("start").or_else(|| caps.get(1));
            let end = caps.name("end").or_else(|| caps.get(2));
            let (Some(start), Some(end)) = (start, end) else {
                continue;
            };

            let cycle = parse_date(start.as_str(), self.order)
                .zip(parse_date(end.as_str(), self.order))
                .and_then(|(s, e)| BillingCycle::new(s, e));

            match cycle {
                Some(cycle) => {
                    trace!("cycle pattern {} matched {} .. {}", index, cycle.start(), cycle.end());
                    let source = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
                    results.push(ExtractionMatch::new(cycle, index, source));
                }
                None => trace!(
                    "cycle pattern {} matched {:?} .. {:?} but did not form a valid range",
                    index,
                    start.as_str(),
                    end.as_str()
                ),
            }
        }

        results
    }
}
