//! # Trend Detection
//!
//! Compares the most recent week with the week before it.
//!
//! ```text
//!   ◄──── previous 7 days ────►◄────── recent 7 days ──────►
//!  as_of-14d                as_of-7d                       as_of
//!
//!  change = (recent - previous) / previous × 100
//!
//!   change >  +5%  → Growth
//!   change <  -5%  → Decline
//!   otherwise      → Stable
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::average::average_per_active_day;
use crate::types::{LedgerEntry, Trend};
use crate::window::{days_covered, TimeWindow};

/// Days of history needed before momentum is judged at all.
pub const MIN_TREND_HISTORY_DAYS: u32 = 14;

const TREND_WINDOW_DAYS: u32 = 7;
const TREND_THRESHOLD_PCT: f64 = 5.0;

/// Classifies recent momentum.
///
/// Returns `Stable` when the history covers fewer than
/// [`MIN_TREND_HISTORY_DAYS`] distinct days.
pub fn detect_trend<E: LedgerEntry>(entries: &[E], as_of: DateTime<Utc>) -> Trend {
    let all: Vec<&E> = entries.iter().filter(|e| e.occurred_at() <= as_of).collect();
    if days_covered(&all) < MIN_TREND_HISTORY_DAYS {
        return Trend::Stable;
    }

    let recent_window = TimeWindow::trailing(as_of, TREND_WINDOW_DAYS);
    let recent = average_per_active_day(&recent_window.select(entries));
    let previous = average_per_active_day(
        &recent_window
            .preceding(TREND_WINDOW_DAYS)
            .select_exclusive_end(entries),
    );

    classify(recent, previous)
}

/// Classifies two weekly means.
pub fn classify(recent: Decimal, previous: Decimal) -> Trend {
    match percent_change(recent, previous) {
        Some(change) if change > TREND_THRESHOLD_PCT => Trend::Growth,
        Some(change) if change < -TREND_THRESHOLD_PCT => Trend::Decline,
        Some(_) => Trend::Stable,
        None if recent > Decimal::ZERO => Trend::Growth,
        None => Trend::Stable,
    }
}

/// Percent change from `previous` to `recent`; `None` when `previous` is zero.
pub fn percent_change(recent: Decimal, previous: Decimal) -> Option<f64> {
    if previous.is_zero() {
        return None;
    }
    ((recent - previous) / previous * dec!(100)).to_f64()
}
