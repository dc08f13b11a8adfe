//! Billing error types

use fibercrm_shared::{CustomerId, CustomerStatus, PlanId};
use thiserror::Error;

use crate::store::StoreError;

/// Billing-specific errors
#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    #[error("Plan not found: {0}")]
    PlanNotFound(PlanId),

    #[error("Customer {id} is {status}, cannot be billed")]
    CustomerNotBillable {
        id: CustomerId,
        status: CustomerStatus,
    },

    #[error("Customer {0} has no active subscriptions")]
    NoActiveSubscriptions(CustomerId),

    #[error("No billable line items for customer {0}")]
    NoBillableLineItems(CustomerId),

    #[error("Invalid change date: {0}")]
    InvalidChangeDate(String),

    #[error("Customer {0} already has a pending invoice for this period")]
    AlreadyBilled(CustomerId),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage not available: {0}")]
    StorageUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<StoreError> for BillingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => BillingError::StorageUnavailable(msg),
            StoreError::Duplicate(msg) => BillingError::Storage(msg),
            StoreError::Query(msg) => BillingError::Storage(msg),
        }
    }
}

pub type BillingResult<T> = Result<T, BillingError>;
