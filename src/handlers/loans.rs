//! Loan HTTP handlers.
//!
//! This module implements loan-related API endpoints:
//! - GET /api/loans/ - List loans
//! - POST /api/loans/ - Create loan
//! - GET /api/loans/{external_id}/ - Get loan by external id
//! - POST /api/loans/{external_id}/activate/ - Activate a pending loan
//! - GET /api/loans/by-customer/{external_id}/ - Loans of a customer

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    db::DbPool,
    error::AppError,
    extract::JsonOrForm,
    middleware::auth::AuthContext,
    models::{
        loan::{CreateLoanRequest, LoanResponse},
        validation,
    },
    services::loan_service,
};

/// Create a loan for an existing customer.
///
/// # Request Body
///
/// ```json
/// {
///   "external_id": "loan-1",
///   "customer_external_id": "cust-1",
///   "amount": "1000.00"
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: the loan with `status = 1` and
///   `outstanding = amount`
/// - **Error (400)**: invalid field, unknown customer, or duplicate external
///   id
pub async fn create_loan(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    JsonOrForm(request): JsonOrForm<CreateLoanRequest>,
) -> Result<(StatusCode, Json<LoanResponse>), AppError> {
    tracing::debug!(api_key = %auth.key_name, external_id = %request.external_id, "create loan");

    let loan = loan_service::create_loan(&pool, request).await?;

    Ok((StatusCode::CREATED, Json(loan.into())))
}

/// List all loans.
pub async fn list_loans(State(pool): State<DbPool>) -> Result<Json<Vec<LoanResponse>>, AppError> {
    let loans = loan_service::list_loans(&pool).await?;

    Ok(Json(loans.into_iter().map(Into::into).collect()))
}

/// Get a loan by external id.
pub async fn get_loan(
    State(pool): State<DbPool>,
    Path(external_id): Path<String>,
) -> Result<Json<LoanResponse>, AppError> {
    let loan = loan_service::get_loan(&pool, &external_id).await?;

    Ok(Json(loan.into()))
}

/// Activate a pending loan.
///
/// # Response
///
/// - **Success (200 OK)**: the loan with `status = 2`
/// - **Error (404)**: no loan with this external id
/// - **Error (409)**: the loan is not pending (a second activation fails)
pub async fn activate_loan(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    Path(external_id): Path<String>,
) -> Result<Json<LoanResponse>, AppError> {
    tracing::debug!(api_key = %auth.key_name, external_id = %external_id, "activate loan");

    let loan = loan_service::activate_loan(&pool, &external_id).await?;

    Ok(Json(loan.into()))
}

/// List the loans of one customer.
///
/// The customer id must match `[a-zA-Z0-9_-]+`; anything else is rejected
/// with 400 before the database is queried.
pub async fn list_loans_by_customer(
    State(pool): State<DbPool>,
    Path(customer_external_id): Path<String>,
) -> Result<Json<Vec<LoanResponse>>, AppError> {
    validation::validate_lookup_id(&customer_external_id)?;

    let loans = loan_service::list_loans_by_customer(&pool, &customer_external_id).await?;

    Ok(Json(loans.into_iter().map(Into::into).collect()))
}
