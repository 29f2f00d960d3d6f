//! # Domain Types
//!
//! Records consumed by the engine and the results it produces.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  INPUT (read-only snapshot)          OUTPUT (cached, serialized as-is)  │
//! │  ┌───────────────────┐               ┌──────────────────────┐          │
//! │  │ TransactionRecord │──┐            │  ProjectionResult    │          │
//! │  │ id, amount, at    │  │            │  3 scenarios + stats │          │
//! │  └───────────────────┘  ├─► engine ─►├──────────────────────┤          │
//! │  ┌───────────────────┐  │            │  CashflowProjection  │          │
//! │  │ ExpenseRecord     │──┘            │  expenses, net, ROI  │          │
//! │  │ id, amount, at    │               ├──────────────────────┤          │
//! │  └───────────────────┘               │  HealthScore         │          │
//! │                                      │  SeasonalityReport   │          │
//! │                                      └──────────────────────┘          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Ledger Entries
// =============================================================================

/// Anything with an amount and a moment in time.
///
/// Both sales and ad-spend rows are bucketed into calendar days the same way.
pub trait LedgerEntry {
    fn amount(&self) -> Money;
    fn occurred_at(&self) -> DateTime<Utc>;
}

/// Lifecycle status of a sale as reported by the commerce platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Awaiting payment (boleto, PIX pending).
    Pending,
    /// Paid or delivered; counts as revenue.
    Confirmed,
    /// Cancelled, refunded or charged back.
    Cancelled,
}

/// A sale. The engine only ever receives `Confirmed` rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionRecord {
    pub id: String,
    pub amount: Money,
    #[ts(as = "String")]
    pub occurred_at: DateTime<Utc>,
    pub status: TransactionStatus,
}

impl TransactionRecord {
    /// Builds a confirmed sale.
    pub fn confirmed(id: impl Into<String>, amount: Money, occurred_at: DateTime<Utc>) -> Self {
        TransactionRecord {
            id: id.into(),
            amount,
            occurred_at,
            status: TransactionStatus::Confirmed,
        }
    }
}

impl LedgerEntry for TransactionRecord {
    fn amount(&self) -> Money {
        self.amount
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// An ad-spend entry (one campaign, one day, typically).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExpenseRecord {
    pub id: String,
    pub amount: Money,
    #[ts(as = "String")]
    pub occurred_at: DateTime<Utc>,
}

impl ExpenseRecord {
    pub fn new(id: impl Into<String>, amount: Money, occurred_at: DateTime<Utc>) -> Self {
        ExpenseRecord {
            id: id.into(),
            amount,
            occurred_at,
        }
    }
}

impl LedgerEntry for ExpenseRecord {
    fn amount(&self) -> Money {
        self.amount
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

// =============================================================================
// Projection Period
// =============================================================================

/// Supported forecast horizons, in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ProjectionPeriod {
    Week,
    Month,
    Quarter,
    HalfYear,
    Year,
}

impl ProjectionPeriod {
    pub const ALL: [ProjectionPeriod; 5] = [
        ProjectionPeriod::Week,
        ProjectionPeriod::Month,
        ProjectionPeriod::Quarter,
        ProjectionPeriod::HalfYear,
        ProjectionPeriod::Year,
    ];

    /// Number of days projected forward.
    #[inline]
    pub const fn days(&self) -> u32 {
        match self {
            ProjectionPeriod::Week => 7,
            ProjectionPeriod::Month => 30,
            ProjectionPeriod::Quarter => 90,
            ProjectionPeriod::HalfYear => 180,
            ProjectionPeriod::Year => 365,
        }
    }
}

impl TryFrom<u32> for ProjectionPeriod {
    type Error = ValidationError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        ProjectionPeriod::ALL
            .into_iter()
            .find(|p| p.days() == days)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "period".to_string(),
                allowed: ProjectionPeriod::ALL
                    .iter()
                    .map(|p| p.days().to_string())
                    .collect(),
            })
    }
}

impl From<ProjectionPeriod> for u32 {
    fn from(period: ProjectionPeriod) -> Self {
        period.days()
    }
}

impl fmt::Display for ProjectionPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.days())
    }
}

// =============================================================================
// Trend
// =============================================================================

/// Recent sales momentum relative to the prior week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Growth,
    Stable,
    Decline,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Growth => write!(f, "growth"),
            Trend::Stable => write!(f, "stable"),
            Trend::Decline => write!(f, "decline"),
        }
    }
}

// =============================================================================
// Requests
// =============================================================================

/// A projection request pinned to a reference instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionRequest {
    pub account_id: String,
    pub period: ProjectionPeriod,
    pub as_of: DateTime<Utc>,
}

impl ProjectionRequest {
    pub fn new(account_id: impl Into<String>, period: ProjectionPeriod, as_of: DateTime<Utc>) -> Self {
        ProjectionRequest {
            account_id: account_id.into(),
            period,
            as_of,
        }
    }
}

// =============================================================================
// Results
// =============================================================================

/// One value per scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScenarioValues {
    #[ts(type = "string")]
    pub pessimistic: Decimal,
    #[ts(type = "string")]
    pub realistic: Decimal,
    #[ts(type = "string")]
    pub optimistic: Decimal,
}

impl ScenarioValues {
    /// Applies `f` to every scenario.
    pub fn map(self, f: impl Fn(Decimal) -> Decimal) -> Self {
        ScenarioValues {
            pessimistic: f(self.pessimistic),
            realistic: f(self.realistic),
            optimistic: f(self.optimistic),
        }
    }

    /// True when pessimistic ≤ realistic ≤ optimistic.
    pub fn is_ordered(&self) -> bool {
        self.pessimistic <= self.realistic && self.realistic <= self.optimistic
    }
}

/// Three-scenario sales forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProjectionResult {
    #[ts(type = "number")]
    pub period: ProjectionPeriod,
    #[ts(type = "string")]
    pub pessimistic: Decimal,
    #[ts(type = "string")]
    pub realistic: Decimal,
    #[ts(type = "string")]
    pub optimistic: Decimal,
    /// 0-100, inversely related to day-to-day variation.
    pub confidence: f64,
    pub trend: Trend,
    /// Distinct calendar days with at least one confirmed sale.
    pub historical_data_days: u32,
    #[ts(type = "string")]
    pub avg7: Decimal,
    #[ts(type = "string")]
    pub avg30: Decimal,
    #[ts(type = "string")]
    pub avg90: Decimal,
    pub seasonality_applied: bool,
    #[ts(as = "String")]
    pub cache_expires_at: DateTime<Utc>,
}

impl ProjectionResult {
    pub fn scenarios(&self) -> ScenarioValues {
        ScenarioValues {
            pessimistic: self.pessimistic,
            realistic: self.realistic,
            optimistic: self.optimistic,
        }
    }
}

/// Projected spend over the period. Not scenario-varied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExpenseProjection {
    #[ts(type = "string")]
    pub ads: Decimal,
    #[ts(type = "string")]
    pub operational: Decimal,
    #[ts(type = "string")]
    pub total: Decimal,
}

/// Sales forecast combined with projected spend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CashflowProjection {
    #[ts(type = "number")]
    pub period: ProjectionPeriod,
    pub sales_projection: ProjectionResult,
    pub expenses: ExpenseProjection,
    pub net_profit: ScenarioValues,
    /// Percent return on total projected spend.
    pub roi: ScenarioValues,
    #[ts(as = "String")]
    pub cache_expires_at: DateTime<Utc>,
}

/// Interpretation band of an overall health score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum HealthInterpretation {
    Excellent,
    Good,
    Regular,
    Critical,
}

impl HealthInterpretation {
    /// Maps an overall score to its band.
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => HealthInterpretation::Excellent,
            60..=79 => HealthInterpretation::Good,
            40..=59 => HealthInterpretation::Regular,
            _ => HealthInterpretation::Critical,
        }
    }
}

/// Composite financial health rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HealthScore {
    pub overall_score: u8,
    pub trend_score: u8,
    pub profitability_score: u8,
    pub consistency_score: u8,
    pub interpretation: HealthInterpretation,
    pub alerts: Vec<String>,
    pub recommendations: Vec<String>,
    /// Percent of revenue left after ad spend; 0 without revenue.
    pub profit_margin: f64,
    #[ts(as = "String")]
    pub cache_expires_at: DateTime<Utc>,
}

/// Where a weekday multiplier table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalitySource {
    /// Fixed table applied to every projection.
    Heuristic,
    /// Derived from the account's own history. Diagnostic only.
    Empirical,
}

/// Weekday → multiplier, indexed 0 = Sunday … 6 = Saturday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SeasonalityProfile {
    pub source: SeasonalitySource,
    #[ts(type = "string[]")]
    pub multipliers: [Decimal; 7],
}

/// Both seasonality tables side by side, for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SeasonalityReport {
    pub applied: SeasonalityProfile,
    pub empirical: SeasonalityProfile,
    pub historical_data_days: u32,
}

// =============================================================================
// Unit Tests
// =============================================================================
