//! Payment HTTP handlers.
//!
//! - GET /api/payments/ - List payments
//! - POST /api/payments/ - Create payment
//! - GET /api/payments/{external_id}/ - Get payment by external id
//! - GET /api/payments/by-customer/{external_id}/ - Payment allocations of a customer

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
        payment::{CreatePaymentRequest, PaymentDetailResponse, PaymentResponse},
        validation,
    },
    services::payment_service,
};

/// Create a payment.
///
/// # Request Body
///
/// ```json
/// {
///   "external_id": "pay-1",
///   "customer_external_id": "cust-1",
///   "total_amount": "350"
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: `status = 1` if the payment was applied to
///   the customer's active loans, `status = 2` if it exceeded what they owe
/// - **Error (400)**: invalid field, unknown customer, duplicate external
///   id, or no active loans
pub async fn create_payment(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    JsonOrForm(request): JsonOrForm<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), AppError> {
    tracing::debug!(api_key = %auth.key_name, external_id = %request.external_id, "create payment");

    let payment = payment_service::create_payment(&pool, request).await?;

    Ok((StatusCode::CREATED, Json(payment.into())))
}

pub async fn list_payments(
    State(pool): State<DbPool>,
) -> Result<Json<Vec<PaymentResponse>>, AppError> {
    let payments = payment_service::list_payments(&pool).await?;

    Ok(Json(payments.into_iter().map(Into::into).collect()))
}

pub async fn get_payment(
    State(pool): State<DbPool>,
    Path(external_id): Path<String>,
) -> Result<Json<PaymentResponse>, AppError> {
    let payment = payment_service::get_payment(&pool, &external_id).await?;

    Ok(Json(payment.into()))
}

/// List how a customer's payments were applied, one entry per loan touched.
///
/// Same path contract as the loans listing: the id must match
/// `[a-zA-Z0-9_-]+` or the request fails with 400 before any lookup.
pub async fn list_payments_by_customer(
    State(pool): State<DbPool>,
    Path(customer_external_id): Path<String>,
) -> Result<Json<Vec<PaymentDetailResponse>>, AppError> {
    validation::validate_lookup_id(&customer_external_id)?;

    let details =
        payment_service::list_payment_details_by_customer(&pool, &customer_external_id).await?;

    Ok(Json(details))
}
