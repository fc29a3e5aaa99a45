//! Date extraction and normalization.

use std::str::FromStr;

use chrono::{Month, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::patterns::{DATE_DAY_MONTH_NAME, DATE_ISO, DATE_MONTH_NAME_DAY, DATE_NUMERIC};
use super::{ExtractionMatch, FieldExtractor, PatternSet};

/// How an issuer orders day and month in numeric dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// 05/01/2024 is 5 January.
    #[default]
    DayFirst,
    /// 01/05/2024 is 5 January.
    MonthFirst,
}

/// Extracts a single labeled date using a profile's pattern list.
pub struct DateExtractor<'p> {
    patterns: &'p PatternSet,
    order: DateOrder,
}

impl<'p> DateExtractor<'p> {
    pub fn new(patterns: &'p PatternSet, order: DateOrder) -> Self {
        Self { patterns, order }
    }
}

impl FieldExtractor for DateExtractor<'_> {
    type Output = ExtractionMatch<NaiveDate>;

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

            match parse_date(raw.as_str(), self.order) {
                Some(date) => {
                    trace!("date pattern {} matched {:?} -> {}", index, raw.as_str(), date);
                    results.push(ExtractionMatch::new(date, index, raw.as_str()));
                }
                None => trace!("date pattern {} matched unparseable {:?}", index, raw.as_str()),
            }
        }

        results
    }
}

/// Parse a date token in any supported issuer format.
///
/// Two-digit years are read as 20yy. Returns `None` for tokens that are not
/// real calendar dates (31/02/2024) or that use an unknown month name.
pub fn parse_date(s: &str, order: DateOrder) -> Option<NaiveDate> {
    let s = s.trim();

    if let Some(caps) = DATE_ISO.captures(s) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = DATE_NUMERIC.captures(s) {
        let first: u32 = caps[1].parse().ok()?;
        let second: u32 = caps[2].parse().ok()?;
        let year = parse_year(&caps[3])?;
        let (day, month) = match order {
            DateOrder::DayFirst => (first, second),
            DateOrder::MonthFirst => (second, first),
        };
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = DATE_DAY_MONTH_NAME.captures(s) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_number(&caps[2])?;
        let year = parse_year(&caps[3])?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = DATE_MONTH_NAME_DAY.captures(s) {
        let month = month_number(&caps[1])?;
        let day: u32 = caps[2].parse().ok()?;
        let year = parse_year(&caps[3])?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    if s.len() == 2 {
        Some(2000 + year)
    } else {
        Some(year)
    }
}

fn month_number(name: &str) -> Option<u32> {
    // chrono accepts "jan" and "january"; statements also print "Sept"
    let name = if name.eq_ignore_ascii_case("sept") { "sep" } else { name };
    Month::from_str(name).ok().map(|m| m.number_from_month())
}
