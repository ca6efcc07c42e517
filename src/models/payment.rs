//! Payment data models and API request/response types.
//!
//! A payment is decided once, when it is created: it either completes and is
//! spread over the customer's active loans (one `payment_details` row per
//! loan touched), or it is rejected and touches nothing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::validation::{self, WIDE_AMOUNT};

/// Payment outcome, stored and serialized as a small integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize)]
#[repr(i16)]
#[serde(into = "i16")]
pub enum PaymentStatus {
    Completed = 1,
    Rejected = 2,
}

impl From<PaymentStatus> for i16 {
    fn from(status: PaymentStatus) -> Self {
        status as i16
    }
}

/// Represents a payment record from the database, joined with its customer.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub external_id: String,
    pub customer_id: Uuid,
    pub customer_external_id: String,
    pub total_amount: Decimal,
    pub status: PaymentStatus,
    pub paid_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a payment.
///
/// # JSON Example
///
/// ```json
/// {
///   "external_id": "pay-1",
///   "customer_external_id": "cust-1",
///   "total_amount": "350"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    pub external_id: String,
    pub customer_external_id: String,
    pub total_amount: Decimal,
}

impl CreatePaymentRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validation::validate_external_id("external_id", &self.external_id)?;
        validation::validate_external_id("customer_external_id", &self.customer_external_id)?;
        validation::validate_decimal("total_amount", &self.total_amount, WIDE_AMOUNT)?;
        validation::validate_positive("total_amount", &self.total_amount)?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub external_id: String,
    pub customer_external_id: String,
    pub total_amount: Decimal,
    pub status: PaymentStatus,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            external_id: payment.external_id,
            customer_external_id: payment.customer_external_id,
            total_amount: payment.total_amount,
            status: payment.status,
        }
    }
}

/// One allocation of a payment to a loan, as listed per customer.
///
/// ```json
/// {
///   "payment_external_id": "pay-1",
///   "customer_external_id": "cust-1",
///   "loan_external_id": "loan-1",
///   "payment_date": "2025-12-20T10:00:00Z",
///   "status": 1,
///   "total_amount": "350.0000000000",
///   "payment_amount": "300.0000000000"
/// }
/// ```
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PaymentDetailResponse {
    pub payment_external_id: String,
    pub customer_external_id: String,
    pub loan_external_id: String,
    pub payment_date: DateTime<Utc>,
    pub status: PaymentStatus,
    pub total_amount: Decimal,
    pub payment_amount: Decimal,
}
