//! Customer data models and API request/response types.
//!
//! This module defines:
//! - `Customer`: Database entity representing a customer
//! - `CreateCustomerRequest`: Request body for creating customers
//! - `CustomerResponse`: Response body returned to clients
//! - `CustomerBalanceResponse`: Computed credit position of a customer

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::validation::{self, WIDE_AMOUNT};

/// Customer status, stored and serialized as a small integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize)]
#[repr(i16)]
#[serde(into = "i16")]
pub enum CustomerStatus {
    Active = 1,
    Inactive = 2,
}

impl From<CustomerStatus> for i16 {
    fn from(status: CustomerStatus) -> Self {
        status as i16
    }
}

/// Represents a customer record from the database.
///
/// # Database Table
///
/// Maps to the `customers` table. `id` is internal and never leaves the
/// service; clients address customers by `external_id`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Customer {
    pub id: Uuid,

    /// Client-supplied unique identifier
    pub external_id: String,

    pub status: CustomerStatus,

    /// Credit score
    pub score: Decimal,

    /// Stamped when the customer is created
    pub preapproved_at: DateTime<Utc>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a new customer.
///
/// # JSON Example
///
/// ```json
/// {
///   "external_id": "cust-1",
///   "score": "750"
/// }
/// ```
///
/// `status` and `preapproved_at` are assigned by the server; if a client
/// sends them they are ignored.
#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub external_id: String,
    pub score: Decimal,
}

impl CreateCustomerRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validation::validate_external_id("external_id", &self.external_id)?;
        validation::validate_decimal("score", &self.score, WIDE_AMOUNT)?;
        if self.score.is_sign_negative() && !self.score.is_zero() {
            return Err(AppError::validation(
                "score",
                "Ensure this value is greater than or equal to 0.",
            ));
        }
        Ok(())
    }
}

/// Response body for customer endpoints.
///
/// ```json
/// {
///   "external_id": "cust-1",
///   "status": 1,
///   "score": "750.0000000000",
///   "preapproved_at": "2025-12-20T10:00:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub external_id: String,
    pub status: CustomerStatus,
    pub score: Decimal,
    pub preapproved_at: DateTime<Utc>,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        Self {
            external_id: customer.external_id,
            status: customer.status,
            score: customer.score,
            preapproved_at: customer.preapproved_at,
        }
    }
}

/// Credit position of a customer.
///
/// `total_debt` is the outstanding amount of every pending or active loan;
/// `available_amount` is what is left of the score once that debt is taken,
/// and goes negative when the loans exceed the score.
#[derive(Debug, Serialize)]
pub struct CustomerBalanceResponse {
    pub external_id: String,
    pub score: Decimal,
    pub available_amount: Decimal,
    pub total_debt: Decimal,
}
