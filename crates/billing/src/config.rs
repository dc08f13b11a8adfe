//! Billing configuration

use serde::{Deserialize, Serialize};

/// Which price a line item is billed at.
///
/// The monthly batch historically re-read the plan's current list price,
/// so a retroactive plan price change silently reaches the next invoice
/// of every subscriber. `SubscriptionPrice` bills the price locked in
/// when the subscription was created instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricePolicy {
    PlanListPrice,
    SubscriptionPrice,
}

impl Default for PricePolicy {
    fn default() -> Self {
        Self::PlanListPrice
    }
}

impl std::str::FromStr for PricePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plan_list_price" => Ok(Self::PlanListPrice),
            "subscription_price" => Ok(Self::SubscriptionPrice),
            _ => Err(format!("Invalid price policy: {}", s)),
        }
    }
}

/// Configuration for the invoice generator
#[derive(Debug, Clone)]
pub struct BillingConfig {
    /// Flat tax rate applied to the invoice subtotal (0.21 = 21%).
    /// Invoices carry no tax by default.
    pub tax_rate: f64,
    /// Price source for invoice line items
    pub price_policy: PricePolicy,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            tax_rate: 0.0,
            price_policy: PricePolicy::default(),
        }
    }
}

impl BillingConfig {
    /// Load configuration from environment or use defaults
    ///
    /// - `BILLING_TAX_RATE`: flat tax rate (default: 0)
    /// - `BILLING_PRICE_POLICY`: `plan_list_price` or `subscription_price`
    ///   (default: `plan_list_price`)
    pub fn from_env() -> Self {
        Self {
            tax_rate: std::env::var("BILLING_TAX_RATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.0),
            price_policy: std::env::var("BILLING_PRICE_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
        }
    }
}
