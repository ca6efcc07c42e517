//! HTTP router.
//!
//! Every `/api/...` route sits behind the API key middleware; `/health` is
//! public.

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{db::DbPool, handlers, middleware, models::api_key::ApiKeyRegistry};

/// Build the application router.
pub fn build_router(pool: DbPool, api_keys: Arc<ApiKeyRegistry>) -> Router {
    let authenticated_routes = Router::new()
        // Customers
        .route(
            "/api/customers/",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route(
            "/api/customers/{external_id}/",
            get(handlers::customers::get_customer),
        )
        .route(
            "/api/customers/{external_id}/balance/",
            get(handlers::customers::get_customer_balance),
        )
        // Loans
        .route(
            "/api/loans/",
            get(handlers::loans::list_loans).post(handlers::loans::create_loan),
        )
        .route(
            "/api/loans/by-customer/{external_id}/",
            get(handlers::loans::list_loans_by_customer),
        )
        .route("/api/loans/{external_id}/", get(handlers::loans::get_loan))
        .route(
            "/api/loans/{external_id}/activate/",
            post(handlers::loans::activate_loan),
        )
        // Payments
        .route(
            "/api/payments/",
            get(handlers::payments::list_payments).post(handlers::payments::create_payment),
        )
        .route(
            "/api/payments/by-customer/{external_id}/",
            get(handlers::payments::list_payments_by_customer),
        )
        .route(
            "/api/payments/{external_id}/",
            get(handlers::payments::get_payment),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            api_keys,
            middleware::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(authenticated_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(pool)
}
