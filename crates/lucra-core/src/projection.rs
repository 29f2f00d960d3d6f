//! # Scenario Projection
//!
//! Turns confirmed-sales history into a three-scenario forecast.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  history (max(90, period) trailing days)                                │
//! │       │                                                                 │
//! │       ├── days covered < 30 ? ──► InsufficientHistory                   │
//! │       │                                                                 │
//! │       ├── avg7 / avg30 / avg90      (average.rs)                        │
//! │       ├── trend                     (trend.rs)                          │
//! │       └── confidence                (variance.rs, ×50 scale)            │
//! │                                                                         │
//! │  daily values                                                           │
//! │    pessimistic = min(avg7, avg30, avg90) × 0.8                          │
//! │    realistic   = (avg7×0.3 + avg30×0.5 + avg90×0.2) × trend factor      │
//! │    optimistic  = max(avg7, avg30, avg90) × 1.3                          │
//! │                                                                         │
//! │  for each day in the period: value × weekday multiplier, summed         │
//! │  round to 2 dp                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The trend factor touches only the realistic scenario. Ordering
//! `pessimistic ≤ realistic ≤ optimistic` is not clamped after the fact.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::average::moving_average;
use crate::error::{CoreError, CoreResult};
use crate::money::round_money;
use crate::seasonality::adjust_for_seasonality;
use crate::trend::detect_trend;
use crate::types::{LedgerEntry, ProjectionPeriod, ProjectionResult, ScenarioValues, TransactionRecord, Trend};
use crate::variance::DailyVariation;
use crate::window::{days_covered, TimeWindow};

// =============================================================================
// Constants
// =============================================================================

/// Distinct days of confirmed sales required before projecting.
pub const MIN_HISTORY_DAYS: u32 = 30;

/// Shortest history window loaded for a projection.
pub const BASE_LOOKBACK_DAYS: u32 = 90;

const PESSIMISTIC_FACTOR: Decimal = dec!(0.8);
const OPTIMISTIC_FACTOR: Decimal = dec!(1.3);
const WEIGHT_AVG7: Decimal = dec!(0.3);
const WEIGHT_AVG30: Decimal = dec!(0.5);
const WEIGHT_AVG90: Decimal = dec!(0.2);

/// History window a projection of `period` needs.
pub fn lookback_days(period: ProjectionPeriod) -> u32 {
    BASE_LOOKBACK_DAYS.max(period.days())
}

/// Fails with `InsufficientHistory` unless `entries` cover enough days.
///
/// Returns the number of days covered.
pub fn ensure_history<E: LedgerEntry>(entries: &[&E]) -> CoreResult<u32> {
    let covered = days_covered(entries);
    if entries.is_empty() || covered < MIN_HISTORY_DAYS {
        return Err(CoreError::InsufficientHistory {
            days_covered: covered,
            required: MIN_HISTORY_DAYS,
        });
    }
    Ok(covered)
}

/// Realistic-scenario multiplier for a trend.
pub fn trend_factor(trend: Trend) -> Decimal {
    match trend {
        Trend::Growth => dec!(1.1),
        Trend::Stable => Decimal::ONE,
        Trend::Decline => dec!(0.9),
    }
}

// =============================================================================
// Sales Forecast
// =============================================================================

/// A computed forecast, before cache metadata is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesForecast {
    pub period: ProjectionPeriod,
    pub scenarios: ScenarioValues,
    pub confidence: f64,
    pub trend: Trend,
    pub days_covered: u32,
    pub avg7: Decimal,
    pub avg30: Decimal,
    pub avg90: Decimal,
}

impl SalesForecast {
    pub fn into_result(self, cache_expires_at: DateTime<Utc>) -> ProjectionResult {
        ProjectionResult {
            period: self.period,
            pessimistic: self.scenarios.pessimistic,
            realistic: self.scenarios.realistic,
            optimistic: self.scenarios.optimistic,
            confidence: self.confidence,
            trend: self.trend,
            historical_data_days: self.days_covered,
            avg7: round_money(self.avg7),
            avg30: round_money(self.avg30),
            avg90: round_money(self.avg90),
            seasonality_applied: true,
            cache_expires_at,
        }
    }
}

/// Base per-day values for each scenario.
pub fn daily_scenarios(avg7: Decimal, avg30: Decimal, avg90: Decimal, trend: Trend) -> ScenarioValues {
    let lowest = avg7.min(avg30).min(avg90);
    let highest = avg7.max(avg30).max(avg90);
    let weighted = avg7 * WEIGHT_AVG7 + avg30 * WEIGHT_AVG30 + avg90 * WEIGHT_AVG90;

    ScenarioValues {
        pessimistic: lowest * PESSIMISTIC_FACTOR,
        realistic: weighted * trend_factor(trend),
        optimistic: highest * OPTIMISTIC_FACTOR,
    }
}

/// Sums seasonality-adjusted daily values over `days` starting at `start`.
///
/// Each scenario is adjusted independently; nothing is rounded here.
pub fn accumulate_with_seasonality(daily: ScenarioValues, start: NaiveDate, days: u32) -> ScenarioValues {
    let mut totals = ScenarioValues {
        pessimistic: Decimal::ZERO,
        realistic: Decimal::ZERO,
        optimistic: Decimal::ZERO,
    };
    for offset in 0..days {
        let date = start + Duration::days(i64::from(offset));
        totals.pessimistic += adjust_for_seasonality(daily.pessimistic, date);
        totals.realistic += adjust_for_seasonality(daily.realistic, date);
        totals.optimistic += adjust_for_seasonality(daily.optimistic, date);
    }
    totals
}

/// Projects confirmed sales `period` days forward from `as_of`.
///
/// `sales` may contain rows outside the lookback window or after `as_of`;
/// they are ignored.
pub fn project_sales(
    sales: &[TransactionRecord],
    period: ProjectionPeriod,
    as_of: DateTime<Utc>,
) -> CoreResult<SalesForecast> {
    let history = TimeWindow::trailing(as_of, lookback_days(period)).select(sales);
    let covered = ensure_history(&history)?;

    let avg7 = moving_average(sales, 7, as_of);
    let avg30 = moving_average(sales, 30, as_of);
    let avg90 = moving_average(sales, 90, as_of);
    let trend = detect_trend(sales, as_of);
    let confidence = round_score(DailyVariation::from_entries(&history).confidence());

    let daily = daily_scenarios(avg7, avg30, avg90, trend);
    let scenarios = accumulate_with_seasonality(daily, as_of.date_naive(), period.days()).map(round_money);

    Ok(SalesForecast {
        period,
        scenarios,
        confidence,
        trend,
        days_covered: covered,
        avg7,
        avg30,
        avg90,
    })
}

/// Rounds a 0-100 score to 2 decimal places.
pub(crate) fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use chrono::TimeZone;

    fn as_of() -> DateTime<Utc> {
        // A Monday.
        Utc.with_ymd_and_hms(2024, 7, 1, 21, 0, 0).unwrap()
    }

    fn daily_history(days: i64, cents_for: impl Fn(i64) -> i64) -> Vec<TransactionRecord> {
        (0..days)
            .map(|d| {
                let at = as_of() - Duration::days(d) - Duration::hours(2);
                TransactionRecord::confirmed(format!("t{d}"), Money::from_cents(cents_for(d)), at)
            })
            .collect()
    }

    #[test]
    fn test_lookback_days() {
        assert_eq!(lookback_days(ProjectionPeriod::Week), 90);
        assert_eq!(lookback_days(ProjectionPeriod::Quarter), 90);
        assert_eq!(lookback_days(ProjectionPeriod::HalfYear), 180);
        assert_eq!(lookback_days(ProjectionPeriod::Year), 365);
    }

    #[test]
    fn test_five_days_is_insufficient() {
        let sales = daily_history(5, |d| 40_000 + d * 2_500);
        let err = project_sales(&sales, ProjectionPeriod::Month, as_of()).unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientHistory {
                days_covered: 5,
                required: 30
            }
        );
    }

    #[test]
    fn test_no_sales_is_insufficient() {
        let err = project_sales(&[], ProjectionPeriod::Week, as_of()).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientHistory { days_covered: 0, .. }));
    }

    #[test]
    fn test_sales_outside_the_window_do_not_count() {
        // 40 days of history, but all of it older than 90 days.
        let sales: Vec<_> = (100..140)
            .map(|d| TransactionRecord::confirmed("old", Money::from_cents(10_000), as_of() - Duration::days(d)))
            .collect();
        assert!(project_sales(&sales, ProjectionPeriod::Month, as_of()).is_err());
    }

    #[test]
    fn test_flat_history_projection() {
        let sales = daily_history(60, |_| 100_000);
        let forecast = project_sales(&sales, ProjectionPeriod::Week, as_of()).unwrap();

        assert_eq!(forecast.trend, Trend::Stable);
        assert_eq!(forecast.confidence, 100.0);
        assert_eq!(forecast.days_covered, 60);
        assert_eq!(forecast.avg7, dec!(1000));
        assert_eq!(forecast.avg30, dec!(1000));

        // Mon..Sun multipliers sum to 7.10.
        assert_eq!(forecast.scenarios.pessimistic, dec!(5680.00));
        assert_eq!(forecast.scenarios.realistic, dec!(7100.00));
        assert_eq!(forecast.scenarios.optimistic, dec!(9230.00));
    }

    #[test]
    fn test_trend_factor_only_touches_realistic() {
        let stable = daily_scenarios(dec!(100), dec!(100), dec!(100), Trend::Stable);
        let growth = daily_scenarios(dec!(100), dec!(100), dec!(100), Trend::Growth);
        let decline = daily_scenarios(dec!(100), dec!(100), dec!(100), Trend::Decline);

        assert_eq!(growth.realistic, dec!(110));
        assert_eq!(decline.realistic, dec!(90));
        assert_eq!(growth.pessimistic, stable.pessimistic);
        assert_eq!(decline.optimistic, stable.optimistic);
    }

    #[test]
    fn test_daily_scenario_weights() {
        let daily = daily_scenarios(dec!(600), dec!(400), dec!(200), Trend::Stable);
        assert_eq!(daily.pessimistic, dec!(160));
        assert_eq!(daily.realistic, dec!(420));
        assert_eq!(daily.optimistic, dec!(780));
    }

    #[test]
    fn test_seasonality_is_applied_per_calendar_day() {
        let daily = ScenarioValues {
            pessimistic: dec!(100),
            realistic: dec!(100),
            optimistic: dec!(100),
        };
        // Saturday + Sunday.
        let saturday = NaiveDate::from_ymd_opt(2024, 7, 6).unwrap();
        let totals = accumulate_with_seasonality(daily, saturday, 2);
        assert_eq!(totals.realistic, dec!(170));
    }

    /// Ordering is not enforced. Skewed but non-negative histories keep it.
    #[test]
    fn test_scenario_ordering_under_skewed_positive_histories() {
        let spiky = daily_history(90, |d| if d % 9 == 0 { 5_000_000 } else { 100 });
        let collapsing = daily_history(90, |d| if d < 7 { 1 } else { 900_000 });
        let surging = daily_history(90, |d| if d < 7 { 2_000_000 } else { 1_000 });
        let sparse: Vec<_> = daily_history(90, |_| 50_000)
            .into_iter()
            .enumerate()
            .filter(|(i, _)| i % 3 == 0)
            .map(|(_, s)| s)
            .collect();

        for (name, sales) in [("spiky", spiky), ("collapsing", collapsing), ("surging", surging), ("sparse", sparse)] {
            for period in ProjectionPeriod::ALL {
                let forecast = project_sales(&sales, period, as_of()).unwrap();
                assert!(
                    forecast.scenarios.is_ordered(),
                    "{name}/{period}: {:?}",
                    forecast.scenarios
                );
                assert!((0.0..=100.0).contains(&forecast.confidence));
            }
        }
    }

    #[test]
    fn test_refund_heavy_history_inverts_scenarios() {
        // Daily totals alternate +100.00 / -300.00, so every average is negative:
        // min × 0.8 lands above max × 1.3 and the ordering does not hold.
        let sales = daily_history(40, |d| if d % 2 == 0 { 10_000 } else { -30_000 });
        let forecast = project_sales(&sales, ProjectionPeriod::Month, as_of()).unwrap();

        assert!(forecast.avg7 < Decimal::ZERO && forecast.avg30 < Decimal::ZERO);
        assert!(!forecast.scenarios.is_ordered(), "{:?}", forecast.scenarios);
        assert!(forecast.scenarios.pessimistic > forecast.scenarios.optimistic);
        assert_eq!(forecast.confidence, 50.0);
    }

    #[test]
    fn test_into_result_rounds_averages() {
        let sales = daily_history(45, |d| 33_333 + d);
        let expires = as_of() + Duration::hours(6);
        let result = project_sales(&sales, ProjectionPeriod::Month, as_of())
            .unwrap()
            .into_result(expires);

        assert!(result.seasonality_applied);
        assert_eq!(result.cache_expires_at, expires);
        assert_eq!(result.avg7, result.avg7.round_dp(2));
        assert_eq!(result.period, ProjectionPeriod::Month);
    }
}
