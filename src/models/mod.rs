//! Data models representing database entities and API payloads.

/// API key registry used by the auth middleware
pub mod api_key;
/// Customer model
pub mod customer;
/// Loan model and lifecycle status
pub mod loan;
/// Payment and payment detail models
pub mod payment;
/// Shared field validation
pub mod validation;
