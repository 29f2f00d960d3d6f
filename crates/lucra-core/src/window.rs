//! # Time Windows & Daily Buckets
//!
//! Sales history is irregular: some days have ten sales, some have none.
//! Everything downstream works on **calendar days that have data**, so the
//! two primitives here are "which records fall in this window" and "sum
//! them per UTC calendar day".
//!
//! ```text
//!            as_of - 7d                              as_of
//!  ──────────────[───────────────────────────────────]──────►
//!   day:   Mon   Tue   Wed   Thu   Fri   Sat   Sun   Mon
//!   sales:  2     0     1     0     3     0     0     1
//!   bucket: ✓     ·     ✓     ·     ✓     ·     ·     ✓   → 4 days covered
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::money::Money;
use crate::types::LedgerEntry;

/// An inclusive range `[start, end]` of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// The trailing `days` ending at `as_of` (inclusive on both ends).
    pub fn trailing(as_of: DateTime<Utc>, days: u32) -> Self {
        TimeWindow {
            start: as_of - Duration::days(i64::from(days)),
            end: as_of,
        }
    }

    /// The `days`-long window that ends where `self` starts.
    ///
    /// The boundary instant belongs to the later window only.
    pub fn preceding(&self, days: u32) -> Self {
        TimeWindow {
            start: self.start - Duration::days(i64::from(days)),
            end: self.start,
        }
    }

    fn contains_inclusive(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts <= self.end
    }

    /// Records inside the window.
    pub fn select<'a, E: LedgerEntry>(&self, entries: &'a [E]) -> Vec<&'a E> {
        entries
            .iter()
            .filter(|e| self.contains_inclusive(e.occurred_at()))
            .collect()
    }

    /// Records inside the window, excluding those exactly on `end`.
    pub fn select_exclusive_end<'a, E: LedgerEntry>(&self, entries: &'a [E]) -> Vec<&'a E> {
        entries
            .iter()
            .filter(|e| e.occurred_at() >= self.start && e.occurred_at() < self.end)
            .collect()
    }
}

/// Sums amounts per UTC calendar day. Days without records are absent.
pub fn daily_totals<E: LedgerEntry>(entries: &[&E]) -> BTreeMap<NaiveDate, Money> {
    let mut totals: BTreeMap<NaiveDate, Money> = BTreeMap::new();
    for entry in entries {
        *totals.entry(entry.occurred_at().date_naive()).or_default() += entry.amount();
    }
    totals
}

/// Number of distinct calendar days with at least one record.
pub fn days_covered<E: LedgerEntry>(entries: &[&E]) -> u32 {
    daily_totals(entries).len() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionRecord;
    use chrono::TimeZone;

    fn sale(cents: i64, at: DateTime<Utc>) -> TransactionRecord {
        TransactionRecord::confirmed("t", Money::from_cents(cents), at)
    }

    #[test]
    fn test_daily_totals_merges_same_day() {
        let day = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
        let sales = vec![
            sale(100, day),
            sale(250, day + Duration::hours(10)),
            sale(400, day + Duration::days(2)),
        ];
        let refs: Vec<&TransactionRecord> = sales.iter().collect();

        let totals = daily_totals(&refs);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[&day.date_naive()].cents(), 350);
        assert_eq!(days_covered(&refs), 2);
    }

    #[test]
    fn test_trailing_window_bounds() {
        let as_of = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let sales = vec![
            sale(1, as_of),
            sale(2, as_of - Duration::days(7)),
            sale(3, as_of - Duration::days(7) - Duration::seconds(1)),
            sale(4, as_of + Duration::seconds(1)),
        ];

        let window = TimeWindow::trailing(as_of, 7);
        let picked: Vec<i64> = window.select(&sales).iter().map(|s| s.amount.cents()).collect();
        assert_eq!(picked, vec![1, 2]);

        let before = window.preceding(7);
        let picked: Vec<i64> = before
            .select_exclusive_end(&sales)
            .iter()
            .map(|s| s.amount.cents())
            .collect();
        assert_eq!(picked, vec![3]);
    }
}
