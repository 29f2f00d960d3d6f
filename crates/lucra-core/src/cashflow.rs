//! # Cashflow Projection
//!
//! Sales forecast minus projected spend.
//!
//! ```text
//!   ads          = avg daily ad spend (last 30 days) × period
//!   operational  = realistic sales × 10%
//!   total        = ads + operational          ← same for every scenario
//!
//!   net[s]  = sales[s] - total
//!   roi[s]  = net[s] / total × 100            (0 when total is 0)
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::average::moving_average;
use crate::money::round_money;
use crate::types::{CashflowProjection, ExpenseProjection, ExpenseRecord, ProjectionResult, ScenarioValues};

/// Ad-spend history used for the daily spend rate.
pub const AD_SPEND_LOOKBACK_DAYS: u32 = 30;

/// Operational cost as a share of realistic sales.
pub const OPERATIONAL_COST_RATIO: Decimal = dec!(0.10);

/// Projected spend over `sales.period`.
pub fn project_expenses(
    sales: &ProjectionResult,
    ad_spend: &[ExpenseRecord],
    as_of: DateTime<Utc>,
) -> ExpenseProjection {
    let daily_ads = moving_average(ad_spend, AD_SPEND_LOOKBACK_DAYS, as_of);
    let ads = round_money(daily_ads * Decimal::from(sales.period.days()));
    let operational = round_money(sales.realistic * OPERATIONAL_COST_RATIO);

    ExpenseProjection {
        ads,
        operational,
        total: ads + operational,
    }
}

/// Combines a sales projection with ad-spend history.
pub fn project_cashflow(
    sales: ProjectionResult,
    ad_spend: &[ExpenseRecord],
    as_of: DateTime<Utc>,
    cache_expires_at: DateTime<Utc>,
) -> CashflowProjection {
    let expenses = project_expenses(&sales, ad_spend, as_of);
    let total = expenses.total;

    let net_profit = sales.scenarios().map(|value| value - total);
    let roi = if total > Decimal::ZERO {
        net_profit.map(|net| round_money(net / total * dec!(100)))
    } else {
        ScenarioValues {
            pessimistic: Decimal::ZERO,
            realistic: Decimal::ZERO,
            optimistic: Decimal::ZERO,
        }
    };

    CashflowProjection {
        period: sales.period,
        sales_projection: sales,
        expenses,
        net_profit,
        roi,
        cache_expires_at,
    }
}
