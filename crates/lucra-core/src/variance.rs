//! # Variance Estimator
//!
//! Day-to-day variation of sales, expressed as a coefficient of variation
//! (CV = stddev / mean) clamped into `[0, 1]`.
//!
//! One estimator, two consumers with different scales:
//!
//! | consumer        | formula                 | question it answers            |
//! |-----------------|-------------------------|--------------------------------|
//! | forecast        | `100 - cv × 50`         | how far to trust the forecast  |
//! | health score    | `100 - cv × 100`        | how stable the business has been |
//!
//! The scales are kept separate on purpose; do not merge them.

use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::types::LedgerEntry;
use crate::window::daily_totals;

/// Summary statistics over per-day totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyVariation {
    /// Days that contributed a sample.
    pub samples: u32,
    pub mean: f64,
    /// Population variance of daily totals.
    pub variance: f64,
    pub std_dev: f64,
    /// Coefficient of variation, clamped into `[0, 1]`.
    pub cv: f64,
}

impl DailyVariation {
    /// Computes statistics over daily totals. Absent days contribute nothing.
    ///
    /// Fewer than two days of data gives `cv = 1` (maximum uncertainty).
    /// A non-positive mean has no meaningful CV: flat zero days give `cv = 0`,
    /// anything else (refunds outweighing sales) gives `cv = 1`.
    pub fn from_entries<E: LedgerEntry>(entries: &[&E]) -> Self {
        let totals: Vec<f64> = daily_totals(entries)
            .values()
            .map(|m| m.to_decimal().to_f64().unwrap_or(0.0))
            .collect();
        let samples = totals.len() as u32;

        if totals.len() < 2 {
            let mean = totals.first().copied().unwrap_or(0.0);
            return DailyVariation {
                samples,
                mean,
                variance: 0.0,
                std_dev: 0.0,
                cv: 1.0,
            };
        }

        let n = totals.len() as f64;
        let mean = totals.iter().sum::<f64>() / n;
        let variance = totals.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();
        let cv = if mean > 0.0 {
            (std_dev / mean).clamp(0.0, 1.0)
        } else if std_dev == 0.0 {
            0.0
        } else {
            1.0
        };

        DailyVariation {
            samples,
            mean,
            variance,
            std_dev,
            cv,
        }
    }

    /// Forecast confidence in `[0, 100]`.
    pub fn confidence(&self) -> f64 {
        (100.0 - self.cv * 50.0).clamp(0.0, 100.0)
    }

    /// Historical consistency in `[0, 100]`.
    pub fn consistency_score(&self) -> f64 {
        (100.0 - self.cv * 100.0).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::TransactionRecord;
    use chrono::{Duration, TimeZone, Utc};

    fn history(daily_cents: &[i64]) -> Vec<TransactionRecord> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        daily_cents
            .iter()
            .enumerate()
            .map(|(i, c)| {
                TransactionRecord::confirmed("s", Money::from_cents(*c), start + Duration::days(i as i64))
            })
            .collect()
    }

    fn variation(daily_cents: &[i64]) -> DailyVariation {
        let sales = history(daily_cents);
        let refs: Vec<&TransactionRecord> = sales.iter().collect();
        DailyVariation::from_entries(&refs)
    }

    #[test]
    fn test_identical_days_have_full_confidence() {
        let v = variation(&[50_000; 30]);
        assert_eq!(v.samples, 30);
        assert_eq!(v.cv, 0.0);
        assert_eq!(v.confidence(), 100.0);
        assert_eq!(v.consistency_score(), 100.0);
    }

    #[test]
    fn test_single_day_is_maximum_uncertainty() {
        let v = variation(&[50_000]);
        assert_eq!(v.cv, 1.0);
        assert_eq!(v.confidence(), 50.0);
        assert_eq!(v.consistency_score(), 0.0);

        let none = variation(&[]);
        assert_eq!(none.samples, 0);
        assert_eq!(none.cv, 1.0);
    }

    #[test]
    fn test_population_statistics() {
        // Daily totals 100, 300 → mean 200, population stddev 100, CV 0.5.
        let v = variation(&[10_000, 30_000]);
        assert!((v.mean - 200.0).abs() < 1e-9);
        assert!((v.variance - 10_000.0).abs() < 1e-6);
        assert!((v.std_dev - 100.0).abs() < 1e-9);
        assert!((v.cv - 0.5).abs() < 1e-9);
        assert!((v.confidence() - 75.0).abs() < 1e-9);
        assert!((v.consistency_score() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_cv_is_clamped() {
        // Mostly tiny days with one huge spike: raw CV well above 1.
        let mut days = vec![100; 20];
        days.push(10_000_000);
        let v = variation(&days);
        assert_eq!(v.cv, 1.0);
        assert_eq!(v.confidence(), 50.0);
        assert_eq!(v.consistency_score(), 0.0);
    }

    #[test]
    fn test_zero_mean_does_not_divide_by_zero() {
        let v = variation(&[0, 0, 0]);
        assert_eq!(v.cv, 0.0);
        assert!(v.confidence().is_finite());
    }

    #[test]
    fn test_negative_mean_is_maximum_uncertainty() {
        // Daily totals alternate +100.00 / -300.00: mean -100, stddev 200.
        let days: Vec<i64> = (0..40).map(|d| if d % 2 == 0 { 10_000 } else { -30_000 }).collect();
        let v = variation(&days);
        assert!((v.mean + 100.0).abs() < 1e-9);
        assert!((v.std_dev - 200.0).abs() < 1e-9);
        assert_eq!(v.cv, 1.0);
        assert_eq!(v.confidence(), 50.0);
        assert_eq!(v.consistency_score(), 0.0);
    }

    #[test]
    fn test_zero_mean_with_spread_is_maximum_uncertainty() {
        let v = variation(&[10_000, -10_000, 10_000, -10_000]);
        assert_eq!(v.mean, 0.0);
        assert_eq!(v.cv, 1.0);
    }
}
