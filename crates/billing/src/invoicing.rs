//! Monthly invoice generation
//!
//! Generates one pending invoice per eligible active customer for a target
//! (month, year), covering every active subscription the customer holds.
//! Runs unattended from a scheduler, so the batch never throws: failures
//! are data. A single customer failing is one failure entry in the run
//! summary; the storage layer being down degrades the whole run to a
//! zero-valued summary.

use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use fibercrm_shared::{CustomerId, InvoiceStatus};

use crate::config::{BillingConfig, PricePolicy};
use crate::error::{BillingError, BillingResult};
use crate::notify::Notifier;
use crate::proration::round_cents;
use crate::store::{BillingStore, NewInvoice, NewLineItem, StoreError};

/// Outcome of generating one customer's invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceResult {
    pub customer_id: CustomerId,
    /// Empty when the invoice was not created
    pub invoice_number: String,
    pub total: f64,
    pub line_items: usize,
    pub succeeded: bool,
    pub error: Option<String>,
}

impl InvoiceResult {
    fn success(customer_id: CustomerId, invoice_number: String, total: f64, line_items: usize) -> Self {
        Self {
            customer_id,
            invoice_number,
            total,
            line_items,
            succeeded: true,
            error: None,
        }
    }

    fn failure(customer_id: CustomerId, error: String) -> Self {
        Self {
            customer_id,
            invoice_number: String::new(),
            total: 0.0,
            line_items: 0,
            succeeded: false,
            error: Some(error),
        }
    }
}

/// Summary of one monthly invoice run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Active customers considered, including skipped ones
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub invoices: Vec<InvoiceResult>,
}

/// Target month for an invoice run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriod {
    pub month: u32,
    pub year: i32,
}

/// Invoice generation service
///
/// Collaborators are injected at construction time; the engine holds no
/// global state and processes customers strictly sequentially.
pub struct InvoiceGenerator {
    store: Arc<dyn BillingStore>,
    notifier: Arc<dyn Notifier>,
    config: BillingConfig,
}

impl InvoiceGenerator {
    pub fn new(store: Arc<dyn BillingStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            config: BillingConfig::default(),
        }
    }

    pub fn with_config(
        store: Arc<dyn BillingStore>,
        notifier: Arc<dyn Notifier>,
        config: BillingConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            config,
        }
    }

    /// Generate an invoice for a single customer for the given month.
    ///
    /// Never returns an error: every failure (unknown customer, non-active
    /// state, nothing to bill, storage trouble) is reported inside the
    /// returned [`InvoiceResult`] so a batch caller can keep going.
    pub async fn generate_invoice_for_customer(
        &self,
        customer_id: CustomerId,
        month: u32,
        year: i32,
    ) -> InvoiceResult {
        match self.build_invoice(customer_id, month, year).await {
            Ok(built) => {
                tracing::info!(
                    customer_id = %customer_id,
                    invoice_number = %built.number,
                    total = built.total,
                    "Invoice created"
                );
                InvoiceResult::success(customer_id, built.number, built.total, built.line_items)
            }
            Err(e) => {
                tracing::warn!(
                    customer_id = %customer_id,
                    error = %e,
                    "Invoice generation failed"
                );
                InvoiceResult::failure(customer_id, e.to_string())
            }
        }
    }

    /// Generate invoices for every active customer.
    ///
    /// Customers that already hold *any* pending invoice are skipped. The
    /// check looks at invoice state only, not the billing period: a customer
    /// sitting on an old unpaid invoice is not re-billed until that invoice
    /// leaves the pending state.
    ///
    /// When the storage collaborator is unavailable the run degrades to the
    /// zero-valued summary instead of erroring: this path is driven by an
    /// unattended scheduler and must never crash it.
    pub async fn generate_invoices_for_month(&self, month: u32, year: i32) -> BatchSummary {
        match self.run_batch(month, year).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!(month, year, error = %e, "Monthly invoice run aborted");
                BatchSummary::default()
            }
        }
    }

    async fn run_batch(&self, month: u32, year: i32) -> BillingResult<BatchSummary> {
        let customers = self.store.active_customers().await?;

        tracing::info!(
            count = customers.len(),
            month,
            year,
            "Generating invoices for active customers"
        );

        let mut invoices = Vec::new();
        let mut succeeded = 0;
        let mut failed = 0;

        for customer in &customers {
            if self.store.has_pending_invoice(customer.id).await? {
                tracing::info!(customer_id = %customer.id, "Pending invoice already exists, skipping");
                continue;
            }

            let result = self
                .generate_invoice_for_customer(customer.id, month, year)
                .await;
            if result.succeeded {
                succeeded += 1;
            } else {
                failed += 1;
            }
            invoices.push(result);
        }

        let mut message = format!("Generated {succeeded} invoices for {month}/{year}.");
        if failed > 0 {
            message.push_str(&format!(" {failed} failed."));
        }
        if let Err(e) = self
            .notifier
            .notify_owner("Monthly billing completed", &message)
            .await
        {
            tracing::warn!(error = %e, "Failed to deliver operator notification");
        }

        tracing::info!(succeeded, failed, "Invoice run completed");

        Ok(BatchSummary {
            total: customers.len(),
            succeeded,
            failed,
            invoices,
        })
    }

    async fn build_invoice(
        &self,
        customer_id: CustomerId,
        month: u32,
        year: i32,
    ) -> BillingResult<BuiltInvoice> {
        let customer = self
            .store
            .customer_by_id(customer_id)
            .await?
            .ok_or(BillingError::CustomerNotFound(customer_id))?;

        if !customer.status.is_billable() {
            return Err(BillingError::CustomerNotBillable {
                id: customer_id,
                status: customer.status,
            });
        }

        let subscriptions = self.store.active_subscriptions(customer_id).await?;
        if subscriptions.is_empty() {
            return Err(BillingError::NoActiveSubscriptions(customer_id));
        }

        let mut line_items = Vec::new();
        let mut subtotal = 0.0;
        for subscription in &subscriptions {
            let Some(plan) = self.store.plan_by_id(subscription.plan_id).await? else {
                // A dangling plan reference costs one line item, not the
                // whole invoice.
                tracing::warn!(
                    customer_id = %customer_id,
                    plan_id = %subscription.plan_id,
                    "Subscription references a missing plan, skipping line item"
                );
                continue;
            };

            let unit_price = match self.config.price_policy {
                PricePolicy::PlanListPrice => plan.monthly_price,
                PricePolicy::SubscriptionPrice => subscription.monthly_price,
            };

            line_items.push(NewLineItem {
                description: format!("{} - monthly service", plan.name),
                quantity: 1,
                unit_price,
                subtotal: unit_price,
            });
            subtotal += unit_price;
        }

        if line_items.is_empty() {
            return Err(BillingError::NoBillableLineItems(customer_id));
        }

        let subtotal = round_cents(subtotal);
        let tax = round_cents(subtotal * self.config.tax_rate);
        let total = round_cents(subtotal + tax);

        let number = invoice_number(customer_id, month, year);
        let period = calendar_period(month, year)?;
        let line_count = line_items.len();

        let invoice = NewInvoice {
            customer_id,
            number: number.clone(),
            issue_date: period.start,
            due_date: period.due,
            period_start: period.start,
            period_end: period.end,
            subtotal,
            tax,
            total,
            status: InvoiceStatus::Pending,
        };

        match self.store.insert_invoice(invoice, line_items).await {
            Ok(_) => Ok(BuiltInvoice {
                number,
                total,
                line_items: line_count,
            }),
            Err(StoreError::Duplicate(_)) => Err(BillingError::AlreadyBilled(customer_id)),
            Err(e) => Err(e.into()),
        }
    }
}

struct BuiltInvoice {
    number: String,
    total: f64,
    line_items: usize,
}

struct CalendarPeriod {
    start: NaiveDate,
    end: NaiveDate,
    due: NaiveDate,
}

/// First/last day of the named calendar month, plus the due date on the
/// 15th of the following month (rolling December into January).
fn calendar_period(month: u32, year: i32) -> BillingResult<CalendarPeriod> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| BillingError::InvalidInput(format!("invalid billing period {month}/{year}")))?;

    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let next_first = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .ok_or_else(|| BillingError::InvalidInput(format!("invalid billing period {month}/{year}")))?;
    let due = NaiveDate::from_ymd_opt(next_year, next_month, 15)
        .ok_or_else(|| BillingError::InvalidInput(format!("invalid billing period {month}/{year}")))?;

    Ok(CalendarPeriod {
        start,
        end: next_first - Duration::days(1),
        due,
    })
}

/// Unique invoice number for a customer and billing month:
/// `FAC-{year}{month:02}-{customer:05}`. Deterministic, so billing the same
/// customer twice for the same month collides at the storage layer instead
/// of producing a second invoice.
pub fn invoice_number(customer_id: CustomerId, month: u32, year: i32) -> String {
    format!("FAC-{}{:02}-{:05}", year, month, customer_id.0)
}

/// Target period for the next scheduled run: the current month through the
/// 15th, the following month afterwards (December rolls into January of the
/// next year).
pub fn next_billing_period(today: NaiveDate) -> BillingPeriod {
    let mut month = today.month();
    let mut year = today.year();

    if today.day() > 15 {
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }

    BillingPeriod { month, year }
}
