//! Payment service - records payments and applies them to loans.
//!
//! # Process
//!
//! 1. Validate the request fields
//! 2. Lock the customer and their active loans
//! 3. Decide the payment status against the active outstanding
//! 4. Insert the payment
//! 5. If completed, spread it over the active loans (oldest first)
//! 6. Commit (or rollback on error)

use rust_decimal::Decimal;

use crate::{
    db::DbPool,
    error::AppError,
    models::payment::{CreatePaymentRequest, Payment, PaymentDetailResponse, PaymentStatus},
    services::{customer_service, loan_service},
};

/// A payment completes only if it does not exceed what is owed on active loans.
pub fn decide_status(total_amount: Decimal, active_outstanding: Decimal) -> PaymentStatus {
    if total_amount <= active_outstanding {
        PaymentStatus::Completed
    } else {
        PaymentStatus::Rejected
    }
}

/// Create a payment and, when it completes, apply it to the customer's loans.
///
/// A rejected payment is still stored (with status `Rejected`) and returned
/// with 201; it changes no loan.
///
/// # Errors
///
/// - `Validation` on `external_id`, `customer_external_id` or
///   `total_amount` for malformed fields, an unknown customer, or a
///   duplicate external id
/// - `Validation` on `customer_external_id` when the customer has no
///   active loans
pub async fn create_payment(
    pool: &DbPool,
    request: CreatePaymentRequest,
) -> Result<Payment, AppError> {
    request.validate()?;

    let mut tx = pool.begin().await?;

    let customer = customer_service::lock_customer(&mut *tx, &request.customer_external_id).await?;
    let active_loans = loan_service::lock_active_loans(&mut *tx, customer.id).await?;

    if active_loans.is_empty() {
        return Err(AppError::validation(
            "customer_external_id",
            "The customer has no active loans.",
        ));
    }

    let active_outstanding: Decimal = active_loans.iter().map(|l| l.outstanding).sum();
    let status = decide_status(request.total_amount, active_outstanding);

    let payment = sqlx::query_as::<_, Payment>(
        r#"
        WITH inserted AS (
            INSERT INTO payments (external_id, customer_id, total_amount, status, paid_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING *
        )
        SELECT i.id, i.external_id, i.customer_id, c.external_id AS customer_external_id,
               i.total_amount, i.status, i.paid_at, i.created_at, i.updated_at
        FROM inserted i
        JOIN customers c ON c.id = i.customer_id
        "#,
    )
    .bind(&request.external_id)
    .bind(customer.id)
    .bind(request.total_amount)
    .bind(status)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        AppError::on_unique_violation(
            e,
            "external_id",
            "Payment with this external id already exists.",
        )
    })?;

    match status {
        PaymentStatus::Completed => {
            let allocations = loan_service::apply_payment(
                &mut *tx,
                payment.id,
                payment.total_amount,
                &active_loans,
            )
            .await?;

            tracing::info!(
                external_id = %payment.external_id,
                customer = %payment.customer_external_id,
                amount = %payment.total_amount,
                loans = allocations.len(),
                "payment completed"
            );
        }
        PaymentStatus::Rejected => {
            tracing::warn!(
                external_id = %payment.external_id,
                customer = %payment.customer_external_id,
                amount = %payment.total_amount,
                outstanding = %active_outstanding,
                "payment rejected: exceeds active outstanding"
            );
        }
    }

    tx.commit().await?;

    Ok(payment)
}

/// List all payments in insertion order.
pub async fn list_payments(pool: &DbPool) -> Result<Vec<Payment>, AppError> {
    let payments = sqlx::query_as::<_, Payment>(
        r#"
        SELECT p.id, p.external_id, p.customer_id, c.external_id AS customer_external_id,
               p.total_amount, p.status, p.paid_at, p.created_at, p.updated_at
        FROM payments p
        JOIN customers c ON c.id = p.customer_id
        ORDER BY p.created_at, p.external_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(payments)
}

/// Fetch a payment by external id, or `NotFound`.
pub async fn get_payment(pool: &DbPool, external_id: &str) -> Result<Payment, AppError> {
    sqlx::query_as::<_, Payment>(
        r#"
        SELECT p.id, p.external_id, p.customer_id, c.external_id AS customer_external_id,
               p.total_amount, p.status, p.paid_at, p.created_at, p.updated_at
        FROM payments p
        JOIN customers c ON c.id = p.customer_id
        WHERE p.external_id = $1
        "#,
    )
    .bind(external_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Payment"))
}

/// List every payment-to-loan allocation for a customer.
///
/// Rejected payments have no allocations and therefore do not appear. An
/// unknown customer yields an empty list.
pub async fn list_payment_details_by_customer(
    pool: &DbPool,
    customer_external_id: &str,
) -> Result<Vec<PaymentDetailResponse>, AppError> {
    let details = sqlx::query_as::<_, PaymentDetailResponse>(
        r#"
        SELECT p.external_id AS payment_external_id,
               c.external_id AS customer_external_id,
               l.external_id AS loan_external_id,
               p.paid_at AS payment_date,
               p.status,
               p.total_amount,
               d.amount AS payment_amount
        FROM payment_details d
        JOIN payments p ON p.id = d.payment_id
        JOIN customers c ON c.id = p.customer_id
        JOIN loans l ON l.id = d.loan_id
        WHERE c.external_id = $1
        ORDER BY p.paid_at, p.external_id, l.created_at
        "#,
    )
    .bind(customer_external_id)
    .fetch_all(pool)
    .await?;

    Ok(details)
}
