//! Loan service - Core business logic for loans.
//!
//! This service handles:
//! - Loan creation for an existing customer
//! - The pending → active transition
//! - Spreading completed payments over active loans
//!
//! # Atomicity Guarantees
//!
//! Creation runs in a transaction holding the customer row lock, so a loan
//! cannot be inserted for a customer that is being changed. Activation is a single
//! conditional UPDATE: of two concurrent activations only one matches
//! `status = pending`.

use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        loan::{CreateLoanRequest, Loan, LoanBalance, LoanStatus},
        validation::MONEY_AMOUNT,
    },
    services::customer_service,
};

/// Portion of a payment applied to one loan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub loan_id: Uuid,
    pub loan_external_id: String,
    /// Whole cents, the precision of `loans.outstanding`
    pub amount: Decimal,
    /// Outstanding left on the loan after this allocation
    pub remaining: Decimal,
}

impl Allocation {
    pub fn settles_loan(&self) -> bool {
        self.remaining.is_zero()
    }
}

/// Spread `total` over `loans` in the order given.
///
/// Each loan takes `min(outstanding, remaining)` truncated to whole cents;
/// loans reached after the payment is used up, and loans with nothing
/// outstanding, get no allocation. A fraction of a cent left over stays
/// unallocated.
pub fn allocate_payment(total: Decimal, loans: &[LoanBalance]) -> Vec<Allocation> {
    let mut remaining = total;
    let mut allocations = Vec::new();

    for loan in loans {
        if loan.outstanding <= Decimal::ZERO {
            continue;
        }

        let amount = loan
            .outstanding
            .min(remaining)
            .round_dp_with_strategy(MONEY_AMOUNT.fraction_digits, RoundingStrategy::ToZero);
        if amount <= Decimal::ZERO {
            break;
        }
        remaining -= amount;

        allocations.push(Allocation {
            loan_id: loan.id,
            loan_external_id: loan.external_id.clone(),
            amount,
            remaining: loan.outstanding - amount,
        });
    }

    allocations
}

/// Create a loan in `Pending` state with `outstanding = amount`.
///
/// # Errors
///
/// - `Validation` on `external_id`, `customer_external_id` or `amount` for
///   malformed fields, an unknown customer, or a duplicate external id
pub async fn create_loan(pool: &DbPool, request: CreateLoanRequest) -> Result<Loan, AppError> {
    request.validate()?;

    let mut tx = pool.begin().await?;

    let customer = customer_service::lock_customer(&mut *tx, &request.customer_external_id).await?;

    let loan = sqlx::query_as::<_, Loan>(
        r#"
        WITH inserted AS (
            INSERT INTO loans (external_id, customer_id, amount, outstanding, status)
            VALUES ($1, $2, $3, $3, $4)
            RETURNING *
        )
        SELECT i.id, i.external_id, i.customer_id, c.external_id AS customer_external_id,
               i.amount, i.outstanding, i.status, i.taken_at, i.created_at, i.updated_at
        FROM inserted i
        JOIN customers c ON c.id = i.customer_id
        "#,
    )
    .bind(&request.external_id)
    .bind(customer.id)
    .bind(request.amount)
    .bind(LoanStatus::Pending)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        AppError::on_unique_violation(e, "external_id", "Loan with this external id already exists.")
    })?;

    tx.commit().await?;

    tracing::info!(
        external_id = %loan.external_id,
        customer = %loan.customer_external_id,
        amount = %loan.amount,
        "loan created"
    );

    Ok(loan)
}

/// List all loans in insertion order.
pub async fn list_loans(pool: &DbPool) -> Result<Vec<Loan>, AppError> {
    let loans = sqlx::query_as::<_, Loan>(
        r#"
        SELECT l.id, l.external_id, l.customer_id, c.external_id AS customer_external_id,
               l.amount, l.outstanding, l.status, l.taken_at, l.created_at, l.updated_at
        FROM loans l
        JOIN customers c ON c.id = l.customer_id
        ORDER BY l.created_at, l.external_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(loans)
}

/// Fetch a loan by external id, or `NotFound`.
pub async fn get_loan(pool: &DbPool, external_id: &str) -> Result<Loan, AppError> {
    sqlx::query_as::<_, Loan>(
        r#"
        SELECT l.id, l.external_id, l.customer_id, c.external_id AS customer_external_id,
               l.amount, l.outstanding, l.status, l.taken_at, l.created_at, l.updated_at
        FROM loans l
        JOIN customers c ON c.id = l.customer_id
        WHERE l.external_id = $1
        "#,
    )
    .bind(external_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Loan"))
}

/// List the loans of the customer with this external id.
///
/// An unknown customer simply has no loans.
pub async fn list_loans_by_customer(
    pool: &DbPool,
    customer_external_id: &str,
) -> Result<Vec<Loan>, AppError> {
    let loans = sqlx::query_as::<_, Loan>(
        r#"
        SELECT l.id, l.external_id, l.customer_id, c.external_id AS customer_external_id,
               l.amount, l.outstanding, l.status, l.taken_at, l.created_at, l.updated_at
        FROM loans l
        JOIN customers c ON c.id = l.customer_id
        WHERE c.external_id = $1
        ORDER BY l.created_at, l.external_id
        "#,
    )
    .bind(customer_external_id)
    .fetch_all(pool)
    .await?;

    Ok(loans)
}

/// Move a loan from `Pending` to `Active` and stamp `taken_at`.
///
/// # Errors
///
/// - `NotFound` if the loan does not exist
/// - `Conflict` if the loan is not pending (including already active)
pub async fn activate_loan(pool: &DbPool, external_id: &str) -> Result<Loan, AppError> {
    let activated = sqlx::query_as::<_, Loan>(
        r#"
        WITH activated AS (
            UPDATE loans
            SET status = $2, taken_at = NOW(), updated_at = NOW()
            WHERE external_id = $1 AND status = $3
            RETURNING *
        )
        SELECT a.id, a.external_id, a.customer_id, c.external_id AS customer_external_id,
               a.amount, a.outstanding, a.status, a.taken_at, a.created_at, a.updated_at
        FROM activated a
        JOIN customers c ON c.id = a.customer_id
        "#,
    )
    .bind(external_id)
    .bind(LoanStatus::Active)
    .bind(LoanStatus::Pending)
    .fetch_optional(pool)
    .await?;

    if let Some(loan) = activated {
        tracing::info!(external_id = %loan.external_id, "loan activated");
        return Ok(loan);
    }

    // Nothing matched: either the loan is missing or it is not pending.
    let current: Option<LoanStatus> =
        sqlx::query_scalar("SELECT status FROM loans WHERE external_id = $1")
            .bind(external_id)
            .fetch_optional(pool)
            .await?;

    match current {
        None => Err(AppError::NotFound("Loan")),
        Some(status) => {
            tracing::warn!(external_id, ?status, "activation refused");
            Err(AppError::Conflict(format!(
                "Only pending loans can be activated; loan '{external_id}' is {status:?}."
            )))
        }
    }
}

/// Lock the customer's active loans, oldest first.
pub async fn lock_active_loans(
    conn: &mut PgConnection,
    customer_id: Uuid,
) -> Result<Vec<LoanBalance>, AppError> {
    let loans = sqlx::query_as::<_, LoanBalance>(
        r#"
        SELECT id, external_id, outstanding
        FROM loans
        WHERE customer_id = $1 AND status = $2
        ORDER BY created_at, external_id
        FOR UPDATE
        "#,
    )
    .bind(customer_id)
    .bind(LoanStatus::Active)
    .fetch_all(&mut *conn)
    .await?;

    Ok(loans)
}

/// Apply a completed payment to the given (already locked) active loans.
///
/// Writes one `payment_details` row per allocation, lowers `outstanding`, and
/// marks a loan `Paid` once nothing is left on it. Must run inside the
/// transaction that locked `loans` and inserted the payment.
pub async fn apply_payment(
    conn: &mut PgConnection,
    payment_id: Uuid,
    total: Decimal,
    loans: &[LoanBalance],
) -> Result<Vec<Allocation>, AppError> {
    let allocations = allocate_payment(total, loans);

    for allocation in &allocations {
        let status = if allocation.settles_loan() {
            LoanStatus::Paid
        } else {
            LoanStatus::Active
        };

        sqlx::query(
            r#"
            UPDATE loans
            SET outstanding = $1, status = $2, updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(allocation.remaining)
        .bind(status)
        .bind(allocation.loan_id)
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO payment_details (payment_id, loan_id, amount)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(payment_id)
        .bind(allocation.loan_id)
        .bind(allocation.amount)
        .execute(&mut *conn)
        .await?;

        if allocation.settles_loan() {
            tracing::info!(external_id = %allocation.loan_external_id, "loan paid off");
        }
    }

    Ok(allocations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn loan(external_id: &str, outstanding: Decimal) -> LoanBalance {
        LoanBalance {
            id: Uuid::new_v4(),
            external_id: external_id.to_string(),
            outstanding,
        }
    }

    #[test]
    fn test_partial_payment_spills_to_next_loan() {
        let loans = vec![loan("l01", dec!(300)), loan("l03", dec!(300))];
        let allocations = allocate_payment(dec!(350), &loans);

        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0].loan_id, loans[0].id);
        assert_eq!(allocations[0].amount, dec!(300));
        assert!(allocations[0].settles_loan());

        assert_eq!(allocations[1].loan_id, loans[1].id);
        assert_eq!(allocations[1].amount, dec!(50));
        assert_eq!(allocations[1].remaining, dec!(250));
        assert!(!allocations[1].settles_loan());
    }

    #[test]
    fn test_payment_stops_when_exhausted() {
        let loans = vec![loan("l01", dec!(300)), loan("l03", dec!(300))];
        let allocations = allocate_payment(dec!(200), &loans);

        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].amount, dec!(200));
        assert_eq!(allocations[0].remaining, dec!(100));
    }

    #[test]
    fn test_exact_payment_settles_everything() {
        let loans = vec![loan("l01", dec!(300)), loan("l03", dec!(300))];
        let allocations = allocate_payment(dec!(600), &loans);

        assert_eq!(allocations.len(), 2);
        assert!(allocations.iter().all(Allocation::settles_loan));
        let applied: Decimal = allocations.iter().map(|a| a.amount).sum();
        assert_eq!(applied, dec!(600));
    }

    #[test]
    fn test_settled_loans_are_skipped() {
        let loans = vec![loan("l01", Decimal::ZERO), loan("l03", dec!(10.50))];
        let allocations = allocate_payment(dec!(5.25), &loans);

        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].loan_id, loans[1].id);
        assert_eq!(allocations[0].remaining, dec!(5.25));
    }

    #[test]
    fn test_sub_cent_payment_is_truncated_to_cents() {
        let loans = vec![loan("l01", dec!(300.00))];
        let allocations = allocate_payment(dec!(299.996), &loans);

        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].loan_external_id, "l01");
        assert_eq!(allocations[0].amount, dec!(299.99));
        assert_eq!(allocations[0].remaining, dec!(0.01));
        assert!(!allocations[0].settles_loan());
    }

    #[test]
    fn test_fraction_of_a_cent_is_not_allocated() {
        let loans = vec![loan("l01", dec!(100.00)), loan("l03", dec!(50.00))];
        let allocations = allocate_payment(dec!(100.004), &loans);

        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].amount, dec!(100.00));
        assert!(allocations[0].settles_loan());
    }

    #[test]
    fn test_no_loans_no_allocations() {
        assert!(allocate_payment(dec!(100), &[]).is_empty());
    }
}
