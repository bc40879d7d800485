//! Calendar bucket boundaries
//!
//! Bucket keys are part of the report output, so the conventions are fixed
//! here rather than left to a library default:
//! - months are keyed by their last calendar day
//! - weeks run Monday through Sunday and are keyed by the Sunday

use std::collections::BTreeMap;

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

/// Day that closes every weekly bucket
pub const WEEK_END_DAY: Weekday = Weekday::Sun;

/// Last calendar day of the month containing `date`
pub fn month_end(date: NaiveDate) -> NaiveDate {
    date.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next| next.pred_opt())
        // Only the final representable month has no successor
        .unwrap_or(NaiveDate::MAX)
}

/// The `WEEK_END_DAY` on or after `date`
pub fn week_end(date: NaiveDate) -> NaiveDate {
    let offset = (WEEK_END_DAY.num_days_from_monday() + 7
        - date.weekday().num_days_from_monday())
        % 7;
    date.checked_add_days(Days::new(offset as u64))
        .unwrap_or(NaiveDate::MAX)
}

/// Bucket granularity for time series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Weekly,
    Monthly,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Key of the bucket containing `date`
    pub fn bucket(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Weekly => week_end(date),
            Self::Monthly => month_end(date),
        }
    }

    /// Key of the bucket after the one keyed by `key`
    fn next(&self, key: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Weekly => key.checked_add_days(Days::new(7)),
            Self::Monthly => key.succ_opt().map(month_end),
        }
    }

    /// Insert zero-valued buckets for every gap between the first and last key
    pub fn fill_gaps(&self, mut series: BTreeMap<NaiveDate, f64>) -> BTreeMap<NaiveDate, f64> {
        let bounds = series
            .keys()
            .next()
            .copied()
            .zip(series.keys().next_back().copied());
        let Some((first, last)) = bounds else {
            return series;
        };

        let mut cursor = first;
        while cursor < last {
            match self.next(cursor) {
                Some(next) => {
                    series.entry(next).or_insert(0.0);
                    cursor = next;
                }
                None => break,
            }
        }
        series
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
