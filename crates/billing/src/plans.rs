//! Plan catalog statistics
//!
//! Read-only aggregations over the plan catalog: how many customers sit on
//! each plan and what the catalog is worth per month. Backs the plan
//! management screens.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use fibercrm_shared::Plan;

use crate::error::BillingResult;
use crate::proration::round_cents;
use crate::store::BillingStore;

/// A plan together with its subscriber count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanUsage {
    pub plan: Plan,
    pub customer_count: u64,
}

/// Aggregate view of the plan catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStats {
    pub total_plans: usize,
    pub total_customers: u64,
    pub plans_in_use: usize,
    pub plans_without_customers: usize,
    /// Sum of list price × subscriber count across the catalog
    pub estimated_monthly_revenue: f64,
    pub plans: Vec<PlanUsage>,
}

/// Plan catalog read service
pub struct PlanCatalogService {
    store: Arc<dyn BillingStore>,
}

impl PlanCatalogService {
    pub fn new(store: Arc<dyn BillingStore>) -> Self {
        Self { store }
    }

    /// Every plan with its customer count
    pub async fn plan_usage(&self) -> BillingResult<Vec<PlanUsage>> {
        let plans = self.store.plans().await?;

        let mut usage = Vec::with_capacity(plans.len());
        for plan in plans {
            let customer_count = self.store.count_customers_on_plan(plan.id).await?;
            usage.push(PlanUsage {
                plan,
                customer_count,
            });
        }

        Ok(usage)
    }

    /// Catalog-wide statistics
    pub async fn stats(&self) -> BillingResult<PlanStats> {
        let plans = self.plan_usage().await?;

        let total_customers = plans.iter().map(|p| p.customer_count).sum();
        let plans_in_use = plans.iter().filter(|p| p.customer_count > 0).count();
        let estimated_monthly_revenue = round_cents(
            plans
                .iter()
                .map(|p| p.plan.monthly_price * p.customer_count as f64)
                .sum(),
        );

        Ok(PlanStats {
            total_plans: plans.len(),
            total_customers,
            plans_in_use,
            plans_without_customers: plans.len() - plans_in_use,
            estimated_monthly_revenue,
            plans,
        })
    }
}
