//! Plan-change orchestration
//!
//! Validates the timing of a requested plan change against the customer's
//! open billing period, computes the proration adjustment, and applies the
//! switch: the customer's effective price moves to the new plan's list
//! price, the old subscription is closed on the change date, a new one is
//! opened, and an immutable history record captures the whole calculation.
//!
//! Unlike the unattended batch, these operations are user-initiated and
//! synchronous, so validation failures and missing entities are returned
//! as errors for the caller to surface immediately.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use fibercrm_shared::{Customer, CustomerId, PlanChangeRecord, PlanId, UserId};

use crate::error::{BillingError, BillingResult};
use crate::proration::{calculate_proration, validate_change_date, Proration};
use crate::store::{BillingStore, NewSubscription};

/// Plan reference embedded in quotes and outcomes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRef {
    pub id: PlanId,
    pub name: String,
    pub price: f64,
}

/// Read-only proration quote for a prospective plan change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanChangeQuote {
    pub customer_id: CustomerId,
    /// `None` when the customer has no plan assigned yet
    pub current_plan: Option<PlanRef>,
    pub new_plan: PlanRef,
    pub proration: Proration,
    pub period_anchor: NaiveDate,
    pub change_date: NaiveDate,
}

/// Request to apply a plan change
#[derive(Debug, Clone, Deserialize)]
pub struct PlanChangeRequest {
    pub customer_id: CustomerId,
    pub new_plan_id: PlanId,
    pub reason: Option<String>,
    pub notes: Option<String>,
    /// Defaults to today
    pub change_date: Option<NaiveDate>,
}

/// Result of an applied plan change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanChangeOutcome {
    pub customer_id: CustomerId,
    pub old_plan: Option<PlanRef>,
    pub new_plan: PlanRef,
    pub proration: Proration,
    pub change_date: NaiveDate,
}

/// Plan-change service
pub struct PlanChangeService {
    store: Arc<dyn BillingStore>,
}

impl PlanChangeService {
    pub fn new(store: Arc<dyn BillingStore>) -> Self {
        Self { store }
    }

    /// Quote the proration for a prospective change without writing
    /// anything.
    pub async fn preview(
        &self,
        customer_id: CustomerId,
        new_plan_id: PlanId,
        change_date: Option<NaiveDate>,
    ) -> BillingResult<PlanChangeQuote> {
        let prepared = self.prepare(customer_id, new_plan_id, change_date).await?;

        Ok(PlanChangeQuote {
            customer_id,
            current_plan: prepared.old_plan.clone(),
            new_plan: prepared.new_plan,
            proration: prepared.proration,
            period_anchor: prepared.period_anchor,
            change_date: prepared.change_date,
        })
    }

    /// Apply a plan change: update the customer's plan and effective price,
    /// swap the active subscription, and write the audit record.
    pub async fn change_plan(
        &self,
        request: PlanChangeRequest,
        actor: UserId,
    ) -> BillingResult<PlanChangeOutcome> {
        let customer_id = request.customer_id;
        let prepared = self
            .prepare(customer_id, request.new_plan_id, request.change_date)
            .await?;

        self.store
            .update_customer_plan(
                customer_id,
                prepared.new_plan.id,
                prepared.new_plan.price,
            )
            .await?;

        // Close every active subscription on the change date so the old and
        // new links never overlap as active.
        let active = self.store.active_subscriptions(customer_id).await?;
        for subscription in &active {
            self.store
                .close_subscription(subscription.id, prepared.change_date)
                .await?;
        }

        self.store
            .insert_subscription(NewSubscription {
                customer_id,
                plan_id: prepared.new_plan.id,
                monthly_price: prepared.new_plan.price,
                active: true,
                start_date: prepared.change_date,
            })
            .await?;

        let old_plan_name = prepared
            .old_plan
            .as_ref()
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "No plan".to_string());

        self.store
            .insert_plan_change(PlanChangeRecord {
                customer_id,
                old_plan_id: prepared.old_plan.as_ref().map(|p| p.id),
                old_plan_name: old_plan_name.clone(),
                old_price: prepared.old_price,
                new_plan_id: prepared.new_plan.id,
                new_plan_name: prepared.new_plan.name.clone(),
                new_price: prepared.new_plan.price,
                elapsed_days: prepared.proration.elapsed_days,
                remaining_days: prepared.proration.remaining_days,
                adjustment: prepared.proration.adjustment,
                change_date: prepared.change_date,
                applied_at: Utc::now(),
                reason: request.reason,
                notes: request.notes,
                changed_by: actor,
            })
            .await?;

        tracing::info!(
            customer_id = %customer_id,
            old_plan = %old_plan_name,
            new_plan = %prepared.new_plan.name,
            adjustment = prepared.proration.adjustment,
            "Plan change applied"
        );

        Ok(PlanChangeOutcome {
            customer_id,
            old_plan: prepared.old_plan,
            new_plan: prepared.new_plan,
            proration: prepared.proration,
            change_date: prepared.change_date,
        })
    }

    async fn prepare(
        &self,
        customer_id: CustomerId,
        new_plan_id: PlanId,
        change_date: Option<NaiveDate>,
    ) -> BillingResult<PreparedChange> {
        let customer = self
            .store
            .customer_by_id(customer_id)
            .await?
            .ok_or(BillingError::CustomerNotFound(customer_id))?;

        let new_plan = self
            .store
            .plan_by_id(new_plan_id)
            .await?
            .ok_or(BillingError::PlanNotFound(new_plan_id))?;

        let old_plan = match customer.plan_id {
            Some(plan_id) => self.store.plan_by_id(plan_id).await?,
            None => None,
        };

        // The effective price can diverge from the plan's list price, so
        // the old side of the proration uses the customer's own price.
        let old_price = customer.monthly_price.unwrap_or(0.0);
        let new_price = new_plan.monthly_price;

        let period_anchor = self.period_anchor(&customer).await?;
        let change_date = change_date.unwrap_or_else(|| Utc::now().date_naive());
        validate_change_date(period_anchor, change_date)?;

        let proration = calculate_proration(old_price, new_price, period_anchor, change_date);

        Ok(PreparedChange {
            old_plan: old_plan.map(|p| PlanRef {
                id: p.id,
                name: p.name,
                price: old_price,
            }),
            new_plan: PlanRef {
                id: new_plan.id,
                name: new_plan.name,
                price: new_price,
            },
            old_price,
            proration,
            period_anchor,
            change_date,
        })
    }

    /// Start of the customer's current billing period: issue date of the
    /// most recent invoice, falling back to the signup date before any
    /// invoice exists.
    async fn period_anchor(&self, customer: &Customer) -> BillingResult<NaiveDate> {
        let latest = self.store.latest_invoice(customer.id).await?;
        Ok(latest
            .map(|invoice| invoice.issue_date)
            .unwrap_or(customer.signup_date))
    }
}

struct PreparedChange {
    old_plan: Option<PlanRef>,
    new_plan: PlanRef,
    old_price: f64,
    proration: Proration,
    period_anchor: NaiveDate,
    change_date: NaiveDate,
}
