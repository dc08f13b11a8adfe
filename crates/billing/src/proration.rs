//! Proration for mid-cycle plan changes
//!
//! When a customer switches plan partway through a billing period, the
//! month's charge is split between the old and new price by whole days.
//! The billing period is *anchored*: it starts on the date of the last
//! invoice (or the signup date when no invoice exists yet) and spans one
//! calendar month from that anchor, not the named month the anchor
//! happens to fall in. An anchor of Jan 1 gives a 31-day period even
//! though part of it may nominally cover February.
//!
//! Pure arithmetic, no I/O. Safe to call from anywhere.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{BillingError, BillingResult};

/// Result of a proration calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proration {
    /// Whole days consumed at the old price, counting the change day itself
    pub elapsed_days: i64,
    /// Whole days left in the period after the change
    pub remaining_days: i64,
    /// Length of the anchored billing period in days
    pub total_days: i64,
    /// Amount consumed so far at the old price (informational)
    pub consumed_amount: f64,
    /// Amount the remaining days would cost at the old price (informational)
    pub remaining_amount: f64,
    /// Signed one-time adjustment: positive = additional charge (upgrade),
    /// negative = credit in the customer's favor (downgrade)
    pub adjustment: f64,
    /// Human-readable explanation of the adjustment
    pub description: String,
}

/// Compute the proration adjustment for a price change inside the current
/// billing period.
///
/// `period_anchor` is the date the period began; `change_date` is the day
/// the new price takes effect. Callers are responsible for keeping
/// `change_date` inside `[period_anchor, period_anchor + 1 month)`; see
/// [`validate_change_date`]. Out-of-range inputs are not rejected here;
/// they produce mechanically-derived results.
pub fn calculate_proration(
    old_price: f64,
    new_price: f64,
    period_anchor: NaiveDate,
    change_date: NaiveDate,
) -> Proration {
    let total_days = period_length_days(period_anchor);

    // The change day counts as fully consumed, so a change on the anchor
    // day itself yields one elapsed day.
    let raw_elapsed = (change_date - period_anchor).num_days();
    let elapsed_days = if raw_elapsed < 1 && change_date >= period_anchor {
        1
    } else {
        raw_elapsed
    };
    let remaining_days = total_days - elapsed_days;

    let daily_old = old_price / total_days as f64;
    let daily_new = new_price / total_days as f64;

    let consumed_amount = daily_old * elapsed_days as f64;
    let remaining_amount = daily_old * remaining_days as f64;
    let adjustment = round_cents((daily_new - daily_old) * remaining_days as f64);

    let description = if adjustment > 0.0 {
        format!(
            "Upgrade: an adjustment of €{:.2} will be charged for the {} remaining days of the current period.",
            adjustment, remaining_days
        )
    } else if adjustment < 0.0 {
        format!(
            "Downgrade: a credit of €{:.2} will be applied in the customer's favor for the {} remaining days.",
            adjustment.abs(),
            remaining_days
        )
    } else {
        "Plan change with no price difference. No proration adjustment.".to_string()
    };

    Proration {
        elapsed_days,
        remaining_days,
        total_days,
        consumed_amount: round_cents(consumed_amount),
        remaining_amount: round_cents(remaining_amount),
        adjustment,
        description,
    }
}

/// Next billing date for a period anchored at `anchor`: the anchor advanced
/// by one calendar month. Day-of-month overflow carries into the following
/// month (Jan 31 → Mar 3), so the period always spans exactly the day count
/// of the calendar month the anchor falls in.
pub fn next_billing_date(anchor: NaiveDate) -> NaiveDate {
    anchor + Duration::days(period_length_days(anchor))
}

/// Validate that a plan change lands inside the currently open billing
/// period `[anchor, anchor + 1 month)`.
pub fn validate_change_date(period_anchor: NaiveDate, change_date: NaiveDate) -> BillingResult<()> {
    if change_date < period_anchor {
        return Err(BillingError::InvalidChangeDate(
            "change date cannot precede the last billing date".to_string(),
        ));
    }
    if change_date >= next_billing_date(period_anchor) {
        return Err(BillingError::InvalidChangeDate(
            "change date must fall within the current billing period".to_string(),
        ));
    }
    Ok(())
}

/// Length in days of the billing period starting at `anchor`
fn period_length_days(anchor: NaiveDate) -> i64 {
    use chrono::Datelike;
    days_in_month(anchor.year(), anchor.month())
}

fn days_in_month(year: i32, month: u32) -> i64 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (first, next_first) {
        (Some(start), Some(end)) => (end - start).num_days(),
        // month always comes from a valid NaiveDate
        _ => 30,
    }
}

/// Round to currency precision (2 decimals)
pub(crate) fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
