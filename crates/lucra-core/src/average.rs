//! # Moving Average
//!
//! Daily average over a trailing window, counting only days that have data.
//!
//! ```text
//!  window = 7 days, 4 of them with sales
//!
//!  total 2_000.00 / 4 active days = 500.00 per day      ✓ used
//!  total 2_000.00 / 7 calendar days = 285.71 per day    ✗ diluted
//! ```
//!
//! An affiliate who pauses campaigns for a weekend should not see the
//! weekend drag their "typical day" down.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::money::Money;
use crate::types::LedgerEntry;
use crate::window::{days_covered, TimeWindow};

/// Average amount per active day over the trailing `window_days`.
///
/// Returns zero when nothing falls in the window.
///
/// ```rust
/// use chrono::{Duration, TimeZone, Utc};
/// use lucra_core::average::moving_average;
/// use lucra_core::{Money, TransactionRecord};
/// use rust_decimal_macros::dec;
///
/// let as_of = Utc.with_ymd_and_hms(2024, 5, 31, 18, 0, 0).unwrap();
/// let sales: Vec<_> = (0..10)
///     .map(|d| TransactionRecord::confirmed("s", Money::from_cents(40_000), as_of - Duration::days(d)))
///     .collect();
///
/// assert_eq!(moving_average(&sales, 7, as_of), dec!(400));
/// ```
pub fn moving_average<E: LedgerEntry>(entries: &[E], window_days: u32, as_of: DateTime<Utc>) -> Decimal {
    let selected = TimeWindow::trailing(as_of, window_days).select(entries);
    average_per_active_day(&selected)
}

/// Sum of `entries` divided by the number of distinct days they cover.
pub fn average_per_active_day<E: LedgerEntry>(entries: &[&E]) -> Decimal {
    let days = days_covered(entries);
    if days == 0 {
        return Decimal::ZERO;
    }
    let total: Money = entries.iter().map(|e| e.amount()).sum();
    total.to_decimal() / Decimal::from(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExpenseRecord, TransactionRecord};
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 15, 0, 0).unwrap()
    }

    fn sale(cents: i64, days_ago: i64) -> TransactionRecord {
        TransactionRecord::confirmed("s", Money::from_cents(cents), as_of() - Duration::days(days_ago))
    }

    #[test]
    fn test_constant_daily_sales_average_to_the_daily_value() {
        let sales: Vec<_> = (0..10).map(|d| sale(40_000, d)).collect();
        assert_eq!(moving_average(&sales, 7, as_of()), dec!(400));
    }

    #[test]
    fn test_gaps_do_not_dilute_the_average() {
        // Four active days inside a 30-day window.
        let sales = vec![sale(50_000, 1), sale(50_000, 5), sale(50_000, 12), sale(50_000, 20)];
        assert_eq!(moving_average(&sales, 30, as_of()), dec!(500));
    }

    #[test]
    fn test_multiple_sales_on_one_day_count_once() {
        let sales = vec![sale(10_000, 2), sale(30_000, 2), sale(20_000, 3)];
        // 600.00 over 2 days.
        assert_eq!(moving_average(&sales, 7, as_of()), dec!(300));
    }

    #[test]
    fn test_empty_window_is_zero() {
        let sales = vec![sale(10_000, 40)];
        assert_eq!(moving_average(&sales, 30, as_of()), Decimal::ZERO);
        assert_eq!(moving_average::<TransactionRecord>(&[], 7, as_of()), Decimal::ZERO);
    }

    #[test]
    fn test_works_for_expenses() {
        let spend = vec![
            ExpenseRecord::new("a", Money::from_cents(12_345), as_of() - Duration::days(1)),
            ExpenseRecord::new("b", Money::from_cents(10_000), as_of() - Duration::days(2)),
        ];
        assert_eq!(moving_average(&spend, 30, as_of()), dec!(111.725));
    }
}
