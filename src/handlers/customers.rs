//! Customer HTTP handlers.
//!
//! This module implements the customer-related API endpoints:
//! - GET /api/customers/ - List customers
//! - POST /api/customers/ - Create customer
//! - GET /api/customers/{external_id}/ - Get customer by external id
//! - GET /api/customers/{external_id}/balance/ - Credit balance of a customer

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
    models::customer::{CreateCustomerRequest, CustomerBalanceResponse, CustomerResponse},
    services::customer_service,
};

/// Create a new customer.
///
/// # Request Body
///
/// ```json
/// {
///   "external_id": "cust-1",
///   "score": "750"
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: the customer with `status = 1`
/// - **Error (400)**: invalid field or duplicate external id
/// - **Error (401)**: Invalid API key
pub async fn create_customer(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    JsonOrForm(request): JsonOrForm<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<CustomerResponse>), AppError> {
    tracing::debug!(api_key = %auth.key_name, external_id = %request.external_id, "create customer");

    let customer = customer_service::create_customer(&pool, request).await?;

    Ok((StatusCode::CREATED, Json(customer.into())))
}

/// List all customers.
pub async fn list_customers(
    State(pool): State<DbPool>,
) -> Result<Json<Vec<CustomerResponse>>, AppError> {
    let customers = customer_service::list_customers(&pool).await?;

    Ok(Json(customers.into_iter().map(Into::into).collect()))
}

/// Get a customer by external id.
///
/// # Response
///
/// - **Success (200 OK)**: customer details
/// - **Error (404)**: no customer with this external id
pub async fn get_customer(
    State(pool): State<DbPool>,
    Path(external_id): Path<String>,
) -> Result<Json<CustomerResponse>, AppError> {
    let customer = customer_service::get_customer(&pool, &external_id).await?;

    Ok(Json(customer.into()))
}

/// Get the credit balance of a customer.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "external_id": "cust-1",
///   "score": "1000.0000000000",
///   "available_amount": "100.0000000000",
///   "total_debt": "900.00"
/// }
/// ```
pub async fn get_customer_balance(
    State(pool): State<DbPool>,
    Path(external_id): Path<String>,
) -> Result<Json<CustomerBalanceResponse>, AppError> {
    let balance = customer_service::get_balance(&pool, &external_id).await?;

    Ok(Json(balance))
}
