//! Shared test fixtures: an in-memory [`BillingStore`] with an
//! unavailability switch, plus notifier doubles.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use fibercrm_billing::notify::Notifier;
use fibercrm_billing::store::{
    BillingStore, NewInvoice, NewLineItem, NewSubscription, StoreError, StoreResult,
};
use fibercrm_shared::{
    Customer, CustomerId, CustomerStatus, Invoice, InvoiceId, InvoiceLineItem, InvoiceStatus,
    Plan, PlanChangeRecord, PlanId, PlanType, Subscription, SubscriptionId,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn fiber_plan(id: i64, name: &str, monthly_price: f64) -> Plan {
    Plan {
        id: PlanId(id),
        name: name.to_string(),
        plan_type: PlanType::Fiber,
        monthly_price,
        promo_price: None,
        active: true,
    }
}

pub fn active_customer(id: i64, name: &str, plan_id: Option<i64>, monthly_price: Option<f64>) -> Customer {
    Customer {
        id: CustomerId(id),
        name: name.to_string(),
        status: CustomerStatus::Active,
        plan_id: plan_id.map(PlanId),
        monthly_price,
        signup_date: date(2024, 1, 1),
    }
}

#[derive(Default)]
struct State {
    customers: Vec<Customer>,
    plans: Vec<Plan>,
    subscriptions: Vec<Subscription>,
    invoices: Vec<Invoice>,
    line_items: Vec<InvoiceLineItem>,
    plan_changes: Vec<PlanChangeRecord>,
    next_subscription_id: i64,
    next_invoice_id: i64,
}

/// In-memory store double. `set_available(false)` makes every call return
/// [`StoreError::Unavailable`], mimicking an unreachable database.
pub struct MemoryStore {
    state: Mutex<State>,
    available: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_subscription_id: 1,
                next_invoice_id: 1,
                ..State::default()
            }),
            available: AtomicBool::new(true),
        }
    }

    pub fn unavailable() -> Self {
        let store = Self::new();
        store.set_available(false);
        store
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    // ------------------------------------------------------------------
    // Seeding helpers
    // ------------------------------------------------------------------

    pub fn add_customer(&self, customer: Customer) {
        self.state.lock().unwrap().customers.push(customer);
    }

    pub fn add_plan(&self, plan: Plan) {
        self.state.lock().unwrap().plans.push(plan);
    }

    pub fn add_subscription(
        &self,
        customer_id: i64,
        plan_id: i64,
        monthly_price: f64,
        start_date: NaiveDate,
    ) -> SubscriptionId {
        let mut state = self.state.lock().unwrap();
        let id = SubscriptionId(state.next_subscription_id);
        state.next_subscription_id += 1;
        state.subscriptions.push(Subscription {
            id,
            customer_id: CustomerId(customer_id),
            plan_id: PlanId(plan_id),
            monthly_price,
            active: true,
            start_date,
            end_date: None,
        });
        id
    }

    pub fn add_invoice(
        &self,
        customer_id: i64,
        number: &str,
        issue_date: NaiveDate,
        status: InvoiceStatus,
    ) {
        let mut state = self.state.lock().unwrap();
        let id = InvoiceId(state.next_invoice_id);
        state.next_invoice_id += 1;
        state.invoices.push(Invoice {
            id,
            customer_id: CustomerId(customer_id),
            number: number.to_string(),
            issue_date,
            due_date: issue_date,
            period_start: issue_date,
            period_end: issue_date,
            subtotal: 0.0,
            tax: 0.0,
            total: 0.0,
            status,
            payment_date: None,
            payment_method: None,
        });
    }

    // ------------------------------------------------------------------
    // Inspection helpers
    // ------------------------------------------------------------------

    pub fn customer(&self, id: i64) -> Option<Customer> {
        self.state
            .lock()
            .unwrap()
            .customers
            .iter()
            .find(|c| c.id == CustomerId(id))
            .cloned()
    }

    pub fn invoices(&self) -> Vec<Invoice> {
        self.state.lock().unwrap().invoices.clone()
    }

    pub fn line_items(&self) -> Vec<InvoiceLineItem> {
        self.state.lock().unwrap().line_items.clone()
    }

    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.state.lock().unwrap().subscriptions.clone()
    }

    pub fn plan_changes(&self) -> Vec<PlanChangeRecord> {
        self.state.lock().unwrap().plan_changes.clone()
    }
}

#[async_trait]
impl BillingStore for MemoryStore {
    async fn customer_by_id(&self, id: CustomerId) -> StoreResult<Option<Customer>> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state.customers.iter().find(|c| c.id == id).cloned())
    }

    async fn active_customers(&self) -> StoreResult<Vec<Customer>> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .customers
            .iter()
            .filter(|c| c.status == CustomerStatus::Active)
            .cloned()
            .collect())
    }

    async fn count_customers_on_plan(&self, plan_id: PlanId) -> StoreResult<u64> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .customers
            .iter()
            .filter(|c| c.plan_id == Some(plan_id))
            .count() as u64)
    }

    async fn update_customer_plan(
        &self,
        id: CustomerId,
        plan_id: PlanId,
        monthly_price: f64,
    ) -> StoreResult<()> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        let customer = state
            .customers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::Query(format!("no customer {id}")))?;
        customer.plan_id = Some(plan_id);
        customer.monthly_price = Some(monthly_price);
        Ok(())
    }

    async fn plan_by_id(&self, id: PlanId) -> StoreResult<Option<Plan>> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state.plans.iter().find(|p| p.id == id).cloned())
    }

    async fn plans(&self) -> StoreResult<Vec<Plan>> {
        self.check_available()?;
        Ok(self.state.lock().unwrap().plans.clone())
    }

    async fn active_subscriptions(
        &self,
        customer_id: CustomerId,
    ) -> StoreResult<Vec<Subscription>> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .subscriptions
            .iter()
            .filter(|s| s.customer_id == customer_id && s.active)
            .cloned()
            .collect())
    }

    async fn close_subscription(
        &self,
        id: SubscriptionId,
        end_date: NaiveDate,
    ) -> StoreResult<()> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        let subscription = state
            .subscriptions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::Query(format!("no subscription {id}")))?;
        subscription.active = false;
        subscription.end_date = Some(end_date);
        Ok(())
    }

    async fn insert_subscription(
        &self,
        subscription: NewSubscription,
    ) -> StoreResult<SubscriptionId> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();
        let id = SubscriptionId(state.next_subscription_id);
        state.next_subscription_id += 1;
        state.subscriptions.push(Subscription {
            id,
            customer_id: subscription.customer_id,
            plan_id: subscription.plan_id,
            monthly_price: subscription.monthly_price,
            active: subscription.active,
            start_date: subscription.start_date,
            end_date: None,
        });
        Ok(id)
    }

    async fn latest_invoice(&self, customer_id: CustomerId) -> StoreResult<Option<Invoice>> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .invoices
            .iter()
            .filter(|i| i.customer_id == customer_id)
            .max_by_key(|i| (i.issue_date, i.id))
            .cloned())
    }

    async fn has_pending_invoice(&self, customer_id: CustomerId) -> StoreResult<bool> {
        self.check_available()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .invoices
            .iter()
            .any(|i| i.customer_id == customer_id && i.status == InvoiceStatus::Pending))
    }

    async fn insert_invoice(
        &self,
        invoice: NewInvoice,
        line_items: Vec<NewLineItem>,
    ) -> StoreResult<InvoiceId> {
        self.check_available()?;
        let mut state = self.state.lock().unwrap();

        // Unique invoice number, like the real schema enforces
        if state.invoices.iter().any(|i| i.number == invoice.number) {
            return Err(StoreError::Duplicate(format!(
                "invoice number {} already exists",
                invoice.number
            )));
        }

        let id = InvoiceId(state.next_invoice_id);
        state.next_invoice_id += 1;
        state.invoices.push(Invoice {
            id,
            customer_id: invoice.customer_id,
            number: invoice.number,
            issue_date: invoice.issue_date,
            due_date: invoice.due_date,
            period_start: invoice.period_start,
            period_end: invoice.period_end,
            subtotal: invoice.subtotal,
            tax: invoice.tax,
            total: invoice.total,
            status: invoice.status,
            payment_date: None,
            payment_method: None,
        });
        for item in line_items {
            state.line_items.push(InvoiceLineItem {
                invoice_id: id,
                description: item.description,
                quantity: item.quantity,
                unit_price: item.unit_price,
                subtotal: item.subtotal,
            });
        }
        Ok(id)
    }

    async fn insert_plan_change(&self, record: PlanChangeRecord) -> StoreResult<()> {
        self.check_available()?;
        self.state.lock().unwrap().plan_changes.push(record);
        Ok(())
    }
}

/// Notifier double that records every notification.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_owner(&self, title: &str, body: &str) -> anyhow::Result<()> {
        self.messages
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

/// Notifier double whose delivery always fails.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify_owner(&self, _title: &str, _body: &str) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("notification channel down"))
    }
}
