// Test code patterns (expected in test files):
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! FiberCRM Shared Types
//!
//! This crate contains the CRM domain types shared across the FiberCRM
//! platform: customers, service plans, subscriptions, invoices, and the
//! plan-change audit trail.

pub mod types;

pub use types::*;
