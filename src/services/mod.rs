//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They handle database transactions, validation, and state transitions.

pub mod customer_service;
pub mod loan_service;
pub mod payment_service;
