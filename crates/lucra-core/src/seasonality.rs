//! # Seasonality
//!
//! Weekly demand pattern for affiliate sales.
//!
//! ## Two Tables, One Applied
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HEURISTIC (applied to every projection)                                │
//! │                                                                         │
//! │    Sun   Mon   Tue   Wed   Thu   Fri   Sat                              │
//! │   0.85  1.10  1.10  1.05  1.10  1.05  0.85                              │
//! │                                                                         │
//! │  EMPIRICAL (computed from the account's history, reporting only)        │
//! │                                                                         │
//! │   weekday mean of daily totals ÷ overall mean of daily totals           │
//! │   weekdays with no samples → 1.00                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The empirical table is never fed into projections. It is exposed so the
//! dashboard can show how an account deviates from the heuristic.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::CoreResult;
use crate::projection::{ensure_history, BASE_LOOKBACK_DAYS};
use crate::types::{LedgerEntry, SeasonalityProfile, SeasonalityReport, SeasonalitySource, TransactionRecord};
use crate::window::{daily_totals, TimeWindow};

/// Fixed weekday multipliers, indexed from Sunday.
pub const HEURISTIC_MULTIPLIERS: [Decimal; 7] = [
    dec!(0.85), // Sunday
    dec!(1.10), // Monday
    dec!(1.10), // Tuesday
    dec!(1.05), // Wednesday
    dec!(1.10), // Thursday
    dec!(1.05), // Friday
    dec!(0.85), // Saturday
];

/// Heuristic multiplier for `date`.
#[inline]
pub fn multiplier_for(date: NaiveDate) -> Decimal {
    HEURISTIC_MULTIPLIERS[date.weekday().num_days_from_sunday() as usize]
}

/// Scales `value` by the heuristic multiplier of `date`'s weekday.
///
/// ```rust
/// use chrono::NaiveDate;
/// use lucra_core::seasonality::adjust_for_seasonality;
/// use rust_decimal_macros::dec;
///
/// let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
/// let saturday = NaiveDate::from_ymd_opt(2024, 6, 8).unwrap();
/// assert_eq!(adjust_for_seasonality(dec!(1000), monday), dec!(1100));
/// assert_eq!(adjust_for_seasonality(dec!(1000), saturday), dec!(850));
/// ```
pub fn adjust_for_seasonality(value: Decimal, date: NaiveDate) -> Decimal {
    value * multiplier_for(date)
}

/// The table every projection uses.
pub fn heuristic_profile() -> SeasonalityProfile {
    SeasonalityProfile {
        source: SeasonalitySource::Heuristic,
        multipliers: HEURISTIC_MULTIPLIERS,
    }
}

/// Per-weekday multipliers observed in `entries`, rounded to 4 places.
pub fn analyze_seasonality<E: LedgerEntry>(entries: &[&E]) -> SeasonalityProfile {
    let totals = daily_totals(entries);

    let mut sums = [Decimal::ZERO; 7];
    let mut counts = [0u32; 7];
    for (date, total) in &totals {
        let idx = date.weekday().num_days_from_sunday() as usize;
        sums[idx] += total.to_decimal();
        counts[idx] += 1;
    }

    let overall = if totals.is_empty() {
        Decimal::ZERO
    } else {
        sums.iter().copied().sum::<Decimal>() / Decimal::from(totals.len() as u32)
    };

    let mut multipliers = [Decimal::ONE; 7];
    if !overall.is_zero() {
        for idx in 0..7 {
            if counts[idx] > 0 {
                let weekday_mean = sums[idx] / Decimal::from(counts[idx]);
                multipliers[idx] = (weekday_mean / overall).round_dp(4);
            }
        }
    }

    SeasonalityProfile {
        source: SeasonalitySource::Empirical,
        multipliers,
    }
}

/// Heuristic and empirical tables for the 90 days before `as_of`.
///
/// Needs the same history as a projection.
pub fn seasonality_report(sales: &[TransactionRecord], as_of: DateTime<Utc>) -> CoreResult<SeasonalityReport> {
    let history = TimeWindow::trailing(as_of, BASE_LOOKBACK_DAYS).select(sales);
    let covered = ensure_history(&history)?;

    Ok(SeasonalityReport {
        applied: heuristic_profile(),
        empirical: analyze_seasonality(&history),
        historical_data_days: covered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::TransactionRecord;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_fixed_table() {
        // 2024-06-02 is a Sunday.
        let sunday = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let expected = [dec!(850), dec!(1100), dec!(1100), dec!(1050), dec!(1100), dec!(1050), dec!(850)];
        for (offset, want) in expected.iter().enumerate() {
            let date = sunday + Duration::days(offset as i64);
            assert_eq!(adjust_for_seasonality(dec!(1000), date), *want, "{date}");
        }
    }

    #[test]
    fn test_empirical_profile() {
        // Two full weeks starting on a Sunday; Mondays sell double.
        let sunday = Utc.with_ymd_and_hms(2024, 6, 2, 10, 0, 0).unwrap();
        let sales: Vec<TransactionRecord> = (0..14)
            .map(|d| {
                let at = sunday + Duration::days(d);
                let cents = if at.weekday().num_days_from_sunday() == 1 { 80_000 } else { 40_000 };
                TransactionRecord::confirmed("s", Money::from_cents(cents), at)
            })
            .collect();
        let refs: Vec<&TransactionRecord> = sales.iter().collect();

        let profile = analyze_seasonality(&refs);
        assert_eq!(profile.source, SeasonalitySource::Empirical);
        // overall mean = (6×400 + 800) / 7 = 457.142857…
        assert_eq!(profile.multipliers[1], dec!(1.75));
        assert_eq!(profile.multipliers[0], dec!(0.875));
    }

    #[test]
    fn test_empirical_defaults_to_one_without_samples() {
        let monday = Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap();
        let sales = vec![TransactionRecord::confirmed("s", Money::from_cents(10_000), monday)];
        let refs: Vec<&TransactionRecord> = sales.iter().collect();

        let profile = analyze_seasonality(&refs);
        assert_eq!(profile.multipliers[1], Decimal::ONE);
        assert_eq!(profile.multipliers[3], Decimal::ONE);

        let empty = analyze_seasonality::<TransactionRecord>(&[]);
        assert_eq!(empty.multipliers, [Decimal::ONE; 7]);
    }

    #[test]
    fn test_report_requires_history() {
        let as_of = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
        let short: Vec<_> = (0..10)
            .map(|d| TransactionRecord::confirmed("s", Money::from_cents(10_000), as_of - Duration::days(d)))
            .collect();
        assert!(seasonality_report(&short, as_of).is_err());

        let long: Vec<_> = (0..35)
            .map(|d| TransactionRecord::confirmed("s", Money::from_cents(10_000), as_of - Duration::days(d)))
            .collect();
        let report = seasonality_report(&long, as_of).unwrap();
        assert_eq!(report.historical_data_days, 35);
        assert_eq!(report.applied, heuristic_profile());
        // Flat history: every weekday equals the overall mean.
        assert_eq!(report.empirical.multipliers, [Decimal::ONE; 7]);
    }

    #[test]
    fn test_empirical_is_not_the_applied_table() {
        assert_eq!(heuristic_profile().source, SeasonalitySource::Heuristic);
        assert_eq!(heuristic_profile().multipliers, HEURISTIC_MULTIPLIERS);
    }
}
