//! Storage collaborator contract
//!
//! The billing core never talks to a database directly. It consumes this
//! narrow trait, injected at construction time, and a deployment wires in
//! whatever persistence it runs on. Unavailability is a distinguishable
//! condition rather than a panic so the unattended batch can degrade to an
//! empty run.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fibercrm_shared::{
    Customer, CustomerId, Invoice, InvoiceId, InvoiceStatus, Plan, PlanChangeRecord, PlanId,
    Subscription, SubscriptionId,
};

/// Storage-layer errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached at all. Recoverable at the
    /// caller level: the batch engine turns this into an empty run.
    #[error("storage not available: {0}")]
    Unavailable(String),

    /// A uniqueness constraint rejected the write (e.g. invoice number or
    /// (customer, period) already present).
    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("storage error: {0}")]
    Query(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// New invoice header to persist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInvoice {
    pub customer_id: CustomerId,
    pub number: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub status: InvoiceStatus,
}

/// New invoice line item; persisted in the same call as its invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLineItem {
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub subtotal: f64,
}

/// New subscription created by a plan change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubscription {
    pub customer_id: CustomerId,
    pub plan_id: PlanId,
    pub monthly_price: f64,
    pub active: bool,
    pub start_date: NaiveDate,
}

/// Storage operations the billing core depends on
#[async_trait]
pub trait BillingStore: Send + Sync {
    // Customers
    async fn customer_by_id(&self, id: CustomerId) -> StoreResult<Option<Customer>>;
    async fn active_customers(&self) -> StoreResult<Vec<Customer>>;
    async fn count_customers_on_plan(&self, plan_id: PlanId) -> StoreResult<u64>;
    async fn update_customer_plan(
        &self,
        id: CustomerId,
        plan_id: PlanId,
        monthly_price: f64,
    ) -> StoreResult<()>;

    // Plans
    async fn plan_by_id(&self, id: PlanId) -> StoreResult<Option<Plan>>;
    async fn plans(&self) -> StoreResult<Vec<Plan>>;

    // Subscriptions
    async fn active_subscriptions(&self, customer_id: CustomerId)
        -> StoreResult<Vec<Subscription>>;
    async fn close_subscription(&self, id: SubscriptionId, end_date: NaiveDate)
        -> StoreResult<()>;
    async fn insert_subscription(&self, subscription: NewSubscription)
        -> StoreResult<SubscriptionId>;

    // Invoices
    async fn latest_invoice(&self, customer_id: CustomerId) -> StoreResult<Option<Invoice>>;
    async fn has_pending_invoice(&self, customer_id: CustomerId) -> StoreResult<bool>;
    /// Persist an invoice and its line items together. Implementations
    /// should enforce invoice-number uniqueness here and report a violation
    /// as [`StoreError::Duplicate`], collapsing check-then-insert into one
    /// atomic step.
    async fn insert_invoice(
        &self,
        invoice: NewInvoice,
        line_items: Vec<NewLineItem>,
    ) -> StoreResult<InvoiceId>;

    // Plan-change history
    async fn insert_plan_change(&self, record: PlanChangeRecord) -> StoreResult<()>;
}
