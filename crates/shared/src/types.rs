//! Common types used across FiberCRM

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// ID Wrappers
// =============================================================================

/// Customer ID wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub i64);

impl From<i64> for CustomerId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Service plan ID wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanId(pub i64);

impl From<i64> for PlanId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Subscription (contracted service) ID wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(pub i64);

impl From<i64> for SubscriptionId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Invoice ID wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(pub i64);

impl From<i64> for InvoiceId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Back-office user ID wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Enums
// =============================================================================

/// Customer lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    PendingInstall,
    Active,
    Suspended,
    Deactivated,
}

impl Default for CustomerStatus {
    fn default() -> Self {
        Self::PendingInstall
    }
}

impl CustomerStatus {
    /// Only active customers are picked up by the monthly billing sweep
    pub fn is_billable(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PendingInstall => write!(f, "pending_install"),
            Self::Active => write!(f, "active"),
            Self::Suspended => write!(f, "suspended"),
            Self::Deactivated => write!(f, "deactivated"),
        }
    }
}

impl std::str::FromStr for CustomerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending_install" => Ok(Self::PendingInstall),
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            "deactivated" => Ok(Self::Deactivated),
            _ => Err(format!("Invalid customer status: {}", s)),
        }
    }
}

/// Invoice lifecycle state
///
/// The billing core only ever creates invoices in `Pending`; payment,
/// overdue and cancellation transitions happen outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Paid => write!(f, "paid"),
            Self::Overdue => write!(f, "overdue"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "overdue" => Ok(Self::Overdue),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid invoice status: {}", s)),
        }
    }
}

/// Kind of service a plan provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Fiber,
    Mobile,
    Tv,
    Landline,
    Bundle,
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fiber => write!(f, "fiber"),
            Self::Mobile => write!(f, "mobile"),
            Self::Tv => write!(f, "tv"),
            Self::Landline => write!(f, "landline"),
            Self::Bundle => write!(f, "bundle"),
        }
    }
}

impl std::str::FromStr for PlanType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fiber" => Ok(Self::Fiber),
            "mobile" => Ok(Self::Mobile),
            "tv" => Ok(Self::Tv),
            "landline" => Ok(Self::Landline),
            "bundle" => Ok(Self::Bundle),
            _ => Err(format!("Invalid plan type: {}", s)),
        }
    }
}

// =============================================================================
// Domain Models
// =============================================================================

/// Customer record, reduced to the fields billing consumes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub status: CustomerStatus,
    /// Current plan reference, if any
    pub plan_id: Option<PlanId>,
    /// Effective monthly price; may diverge from the plan's list price
    /// (promotions, manual overrides)
    pub monthly_price: Option<f64>,
    pub signup_date: NaiveDate,
}

/// Service plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub name: String,
    pub plan_type: PlanType,
    /// Monthly list price
    pub monthly_price: f64,
    /// Optional promotional price
    pub promo_price: Option<f64>,
    pub active: bool,
}

/// Link between a customer and a plan, with the price locked in at the
/// time of subscribing. At most one subscription per customer is active
/// at any moment; closed subscriptions keep their end date for history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub customer_id: CustomerId,
    pub plan_id: PlanId,
    /// Price at subscription time
    pub monthly_price: f64,
    pub active: bool,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Invoice header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub customer_id: CustomerId,
    /// Unique human-readable number, e.g. `FAC-202401-00042`
    pub number: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub status: InvoiceStatus,
    pub payment_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
}

/// Invoice line item; owned by exactly one invoice and never mutated
/// after creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLineItem {
    pub invoice_id: InvoiceId,
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub subtotal: f64,
}

/// Immutable audit entry written once per plan change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanChangeRecord {
    pub customer_id: CustomerId,
    pub old_plan_id: Option<PlanId>,
    pub old_plan_name: String,
    pub old_price: f64,
    pub new_plan_id: PlanId,
    pub new_plan_name: String,
    pub new_price: f64,
    pub elapsed_days: i64,
    pub remaining_days: i64,
    /// Signed proration adjustment: positive = extra charge, negative =
    /// credit in the customer's favor
    pub adjustment: f64,
    pub change_date: NaiveDate,
    pub applied_at: DateTime<Utc>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub changed_by: UserId,
}

// =============================================================================
// Tests
// =============================================================================
