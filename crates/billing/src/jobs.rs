//! Scheduled billing jobs
//!
//! Entry points the scheduler (or an operator) calls into: the monthly
//! sweep picks its own target period from today's date, the manual variant
//! bills an explicit (month, year) for retroactive or catch-up runs.

use chrono::Utc;

use crate::error::{BillingError, BillingResult};
use crate::invoicing::{next_billing_period, BatchSummary, InvoiceGenerator};

/// Run the scheduled monthly sweep for the period implied by today's date.
pub async fn run_monthly_billing(generator: &InvoiceGenerator) -> BatchSummary {
    tracing::info!("Starting scheduled invoice generation");

    let period = next_billing_period(Utc::now().date_naive());
    tracing::info!(month = period.month, year = period.year, "Target billing period");

    let summary = generator
        .generate_invoices_for_month(period.month, period.year)
        .await;

    tracing::info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        "Scheduled invoice generation finished"
    );
    if summary.failed > 0 {
        tracing::warn!(
            failed = summary.failed,
            "Some invoices failed; check the run summary for details"
        );
    }

    summary
}

/// Run an explicit (month, year) sweep.
pub async fn run_manual_billing(
    generator: &InvoiceGenerator,
    month: u32,
    year: i32,
) -> BillingResult<BatchSummary> {
    if !(1..=12).contains(&month) {
        return Err(BillingError::InvalidInput(format!(
            "invalid month {month}, must be between 1 and 12"
        )));
    }

    tracing::info!(month, year, "Starting manual invoice generation");

    let summary = generator.generate_invoices_for_month(month, year).await;

    tracing::info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        "Manual invoice generation finished"
    );

    Ok(summary)
}
