//! HTTP request handlers (route handlers).
//!
//! Handlers decode the request, call into `services`, and map the result to
//! a response. Business rules live in the services.

/// Customer endpoints
pub mod customers;
/// Liveness endpoint
pub mod health;
/// Loan endpoints
pub mod loans;
/// Payment endpoints
pub mod payments;
