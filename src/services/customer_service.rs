//! Customer service - customer records and credit balance.
//!
//! The balance of a customer is derived on every request from the loans
//! table; nothing is cached between requests.

use rust_decimal::Decimal;
use sqlx::PgConnection;

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        customer::{CreateCustomerRequest, Customer, CustomerBalanceResponse, CustomerStatus},
        loan::LoanStatus,
    },
};

/// Create a customer.
///
/// Status is always `Active` and `preapproved_at` is stamped by the database,
/// whatever the client sent.
///
/// # Errors
///
/// - `Validation` on `external_id`: blank, too long, or already taken
/// - `Validation` on `score`: negative or outside `NUMERIC(20, 10)`
pub async fn create_customer(
    pool: &DbPool,
    request: CreateCustomerRequest,
) -> Result<Customer, AppError> {
    request.validate()?;

    let customer = sqlx::query_as::<_, Customer>(
        r#"
        INSERT INTO customers (external_id, status, score, preapproved_at)
        VALUES ($1, $2, $3, NOW())
        RETURNING id, external_id, status, score, preapproved_at, created_at, updated_at
        "#,
    )
    .bind(&request.external_id)
    .bind(CustomerStatus::Active)
    .bind(request.score)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        AppError::on_unique_violation(e, "external_id", "Customer with this external id already exists.")
    })?;

    tracing::info!(external_id = %customer.external_id, "customer created");

    Ok(customer)
}

/// List all customers in insertion order.
pub async fn list_customers(pool: &DbPool) -> Result<Vec<Customer>, AppError> {
    let customers = sqlx::query_as::<_, Customer>(
        r#"
        SELECT id, external_id, status, score, preapproved_at, created_at, updated_at
        FROM customers
        ORDER BY created_at, external_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(customers)
}

/// Find a customer by external id.
pub async fn find_customer(pool: &DbPool, external_id: &str) -> Result<Option<Customer>, AppError> {
    let customer = sqlx::query_as::<_, Customer>(
        r#"
        SELECT id, external_id, status, score, preapproved_at, created_at, updated_at
        FROM customers
        WHERE external_id = $1
        "#,
    )
    .bind(external_id)
    .fetch_optional(pool)
    .await?;

    Ok(customer)
}

/// Fetch a customer by external id, or `NotFound`.
pub async fn get_customer(pool: &DbPool, external_id: &str) -> Result<Customer, AppError> {
    find_customer(pool, external_id)
        .await?
        .ok_or(AppError::NotFound("Customer"))
}

/// Lock a customer row for the rest of the surrounding transaction.
///
/// Loan and payment creation take this lock so that two requests for the
/// same customer see each other's effect on the customer's debt.
///
/// An unknown customer is a validation error on `customer_external_id`,
/// since it is a field of the request being processed.
pub async fn lock_customer(
    conn: &mut PgConnection,
    external_id: &str,
) -> Result<Customer, AppError> {
    sqlx::query_as::<_, Customer>(
        r#"
        SELECT id, external_id, status, score, preapproved_at, created_at, updated_at
        FROM customers
        WHERE external_id = $1
        FOR UPDATE
        "#,
    )
    .bind(external_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| {
        AppError::validation(
            "customer_external_id",
            format!("Customer with external id '{external_id}' does not exist."),
        )
    })
}

/// Sum of the outstanding amount of the customer's pending and active loans.
pub async fn total_debt(pool: &DbPool, customer: &Customer) -> Result<Decimal, AppError> {
    let [pending, active] = LoanStatus::OPEN;

    let debt: Decimal = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(outstanding), 0)
        FROM loans
        WHERE customer_id = $1 AND status IN ($2, $3)
        "#,
    )
    .bind(customer.id)
    .bind(pending)
    .bind(active)
    .fetch_one(pool)
    .await?;

    Ok(debt)
}

/// Combine a customer's score with their current debt.
pub fn balance_of(customer: &Customer, total_debt: Decimal) -> CustomerBalanceResponse {
    CustomerBalanceResponse {
        external_id: customer.external_id.clone(),
        score: customer.score,
        available_amount: customer.score - total_debt,
        total_debt,
    }
}

/// Compute the balance view of a customer.
///
/// # Errors
///
/// - `NotFound` if no customer has this external id
pub async fn get_balance(
    pool: &DbPool,
    external_id: &str,
) -> Result<CustomerBalanceResponse, AppError> {
    let customer = get_customer(pool, external_id).await?;
    let debt = total_debt(pool, &customer).await?;

    Ok(balance_of(&customer, debt))
}
