// Test code patterns (expected in test files):
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! FiberCRM Billing Module
//!
//! The billing core of the FiberCRM platform: monthly invoice generation
//! and mid-cycle plan changes with prorated adjustments.
//!
//! ## Features
//!
//! - **Proration**: fair split of a month's charge across a mid-cycle
//!   price change, anchored to the customer's own billing period
//! - **Monthly Invoicing**: one pending invoice per active customer per
//!   run, with partial-failure semantics and a duplicate guard
//! - **Plan Changes**: validated subscription swaps with an immutable
//!   audit history
//! - **Plan Statistics**: subscriber counts and revenue estimates per plan
//! - **Scheduled Jobs**: cron-friendly entry points that never panic the
//!   scheduler
//!
//! Storage and operator notifications are consumed through the
//! [`store::BillingStore`] and [`notify::Notifier`] traits, injected at
//! construction time.

pub mod config;
pub mod error;
pub mod invoicing;
pub mod jobs;
pub mod notify;
pub mod plan_change;
pub mod plans;
pub mod proration;
pub mod store;

// Configuration
pub use config::{BillingConfig, PricePolicy};

// Errors
pub use error::{BillingError, BillingResult};

// Invoicing
pub use invoicing::{
    invoice_number, next_billing_period, BatchSummary, BillingPeriod, InvoiceGenerator,
    InvoiceResult,
};

// Jobs
pub use jobs::{run_manual_billing, run_monthly_billing};

// Notifications
pub use notify::{LogNotifier, Notifier};

// Plan changes
pub use plan_change::{
    PlanChangeOutcome, PlanChangeQuote, PlanChangeRequest, PlanChangeService, PlanRef,
};

// Plan statistics
pub use plans::{PlanCatalogService, PlanStats, PlanUsage};

// Proration
pub use proration::{calculate_proration, next_billing_date, validate_change_date, Proration};

// Storage contract
pub use store::{
    BillingStore, NewInvoice, NewLineItem, NewSubscription, StoreError, StoreResult,
};
