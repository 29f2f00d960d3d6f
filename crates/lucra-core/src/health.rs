//! # Health Score
//!
//! A single 0-100 rating of how the account has been doing over the last
//! 90 days.
//!
//! ```text
//!   overall = round(trend × 0.3 + profitability × 0.4 + consistency × 0.3)
//!
//!   trend          growth 100 │ stable 70 │ decline 40
//!   profitability  margin >60% 100 │ >40% 80 │ >20% 60 │ else 30
//!   consistency    100 - cv × 100
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::CoreResult;
use crate::money::Money;
use crate::projection::{ensure_history, round_score};
use crate::trend::detect_trend;
use crate::types::{ExpenseRecord, HealthInterpretation, HealthScore, TransactionRecord, Trend};
use crate::variance::DailyVariation;
use crate::window::TimeWindow;

/// Fixed lookback for the health score.
pub const HEALTH_LOOKBACK_DAYS: u32 = 90;

const TREND_WEIGHT: f64 = 0.3;
const PROFITABILITY_WEIGHT: f64 = 0.4;
const CONSISTENCY_WEIGHT: f64 = 0.3;

pub const ALERT_DECLINE: &str = "Sales are declining compared to the previous week";
pub const ALERT_LOW_MARGIN: &str = "Profit margin is below 20%";
pub const ALERT_HIGH_VARIATION: &str = "Daily sales vary widely from day to day";
pub const ALERT_NO_REVENUE: &str = "No revenue recorded in the last 90 days";

pub const REC_REVIEW_MARKETING: &str = "Review marketing spend and campaign performance";
pub const REC_CUT_SPEND: &str = "Cut ad spend or raise the average ticket";
pub const REC_IMPROVE_CONSISTENCY: &str = "Improve day-to-day consistency with steadier campaigns";
pub const REC_SCALE_SPEND: &str = "Margins are healthy and stable: consider scaling ad spend";

/// Everything the health score is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthAssessment {
    pub trend: Trend,
    pub revenue: Money,
    pub ad_spend: Money,
    /// Percent; zero when there is no revenue.
    pub profit_margin: f64,
    pub variation: DailyVariation,
    pub trend_score: u8,
    pub profitability_score: u8,
    pub consistency_score: f64,
    pub overall_score: u8,
}

impl HealthAssessment {
    pub fn interpretation(&self) -> HealthInterpretation {
        HealthInterpretation::from_score(self.overall_score)
    }

    /// Alerts, each included independently.
    pub fn alerts(&self) -> Vec<String> {
        let mut alerts = Vec::new();
        if self.trend == Trend::Decline {
            alerts.push(ALERT_DECLINE.to_string());
        }
        if self.profit_margin < 20.0 {
            alerts.push(ALERT_LOW_MARGIN.to_string());
        }
        if self.variation.cv > 0.7 {
            alerts.push(ALERT_HIGH_VARIATION.to_string());
        }
        if !self.revenue.is_positive() {
            alerts.push(ALERT_NO_REVENUE.to_string());
        }
        alerts
    }

    /// Recommendations, each included independently.
    pub fn recommendations(&self) -> Vec<String> {
        let mut recs = Vec::new();
        if self.trend == Trend::Decline {
            recs.push(REC_REVIEW_MARKETING.to_string());
        }
        if self.profit_margin < 40.0 {
            recs.push(REC_CUT_SPEND.to_string());
        }
        if self.variation.cv > 0.5 {
            recs.push(REC_IMPROVE_CONSISTENCY.to_string());
        }
        if self.profit_margin > 60.0 && self.trend == Trend::Stable {
            recs.push(REC_SCALE_SPEND.to_string());
        }
        recs
    }

    pub fn into_score(self, cache_expires_at: DateTime<Utc>) -> HealthScore {
        HealthScore {
            overall_score: self.overall_score,
            trend_score: self.trend_score,
            profitability_score: self.profitability_score,
            consistency_score: self.consistency_score.round() as u8,
            interpretation: self.interpretation(),
            alerts: self.alerts(),
            recommendations: self.recommendations(),
            profit_margin: round_score(self.profit_margin),
            cache_expires_at,
        }
    }
}

/// Discrete score for a trend.
pub fn trend_score(trend: Trend) -> u8 {
    match trend {
        Trend::Growth => 100,
        Trend::Stable => 70,
        Trend::Decline => 40,
    }
}

/// Discrete score for a profit margin (percent).
pub fn profitability_score(margin: f64) -> u8 {
    if margin > 60.0 {
        100
    } else if margin > 40.0 {
        80
    } else if margin > 20.0 {
        60
    } else {
        30
    }
}

/// `(revenue - ad_spend) / revenue × 100`, or zero without revenue.
pub fn profit_margin(revenue: Money, ad_spend: Money) -> f64 {
    if !revenue.is_positive() {
        return 0.0;
    }
    let margin: Decimal = (revenue - ad_spend).to_decimal() / revenue.to_decimal() * dec!(100);
    margin.to_f64().unwrap_or(0.0)
}

/// Scores the trailing 90 days before `as_of`.
pub fn assess_health(
    sales: &[TransactionRecord],
    ad_spend: &[ExpenseRecord],
    as_of: DateTime<Utc>,
) -> CoreResult<HealthAssessment> {
    let window = TimeWindow::trailing(as_of, HEALTH_LOOKBACK_DAYS);
    let history = window.select(sales);
    ensure_history(&history)?;

    let trend = detect_trend(sales, as_of);
    let revenue: Money = history.iter().map(|s| s.amount).sum();
    let spent: Money = window.select(ad_spend).iter().map(|e| e.amount).sum();
    let margin = profit_margin(revenue, spent);
    let variation = DailyVariation::from_entries(&history);

    let trend_score = trend_score(trend);
    let profitability_score = profitability_score(margin);
    let consistency_score = variation.consistency_score();
    let overall = f64::from(trend_score) * TREND_WEIGHT
        + f64::from(profitability_score) * PROFITABILITY_WEIGHT
        + consistency_score * CONSISTENCY_WEIGHT;

    Ok(HealthAssessment {
        trend,
        revenue,
        ad_spend: spent,
        profit_margin: margin,
        variation,
        trend_score,
        profitability_score,
        consistency_score,
        overall_score: overall.round().clamp(0.0, 100.0) as u8,
    })
}
