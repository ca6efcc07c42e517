//! Loan data models and API request/response types.
//!
//! This module defines:
//! - `Loan`: Database entity, joined with its customer's external id
//! - `LoanBalance`: Locked view of an active loan used while applying payments
//! - `CreateLoanRequest`: Request body for creating loans
//! - `LoanResponse`: Response body returned to clients

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::validation::{self, MONEY_AMOUNT};

/// Loan lifecycle status, stored and serialized as a small integer.
///
/// ```text
/// Pending --activate--> Active --fully repaid--> Paid
///    \
///     `--> Rejected (no endpoint)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize)]
#[repr(i16)]
#[serde(into = "i16")]
pub enum LoanStatus {
    Pending = 1,
    Active = 2,
    Rejected = 3,
    Paid = 4,
}

impl LoanStatus {
    /// Statuses whose outstanding amount counts as customer debt.
    pub const OPEN: [LoanStatus; 2] = [LoanStatus::Pending, LoanStatus::Active];
}

impl From<LoanStatus> for i16 {
    fn from(status: LoanStatus) -> Self {
        status as i16
    }
}

/// Represents a loan record from the database.
///
/// # Database Table
///
/// Maps to the `loans` table joined with `customers`, so that the owning
/// customer can be reported by external id without exposing `customer_id`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Loan {
    pub id: Uuid,
    pub external_id: String,
    pub customer_id: Uuid,
    pub customer_external_id: String,

    /// Principal requested at creation
    pub amount: Decimal,

    /// Remaining principal; starts equal to `amount`, reduced by payments
    pub outstanding: Decimal,

    pub status: LoanStatus,

    /// Set when the loan is activated. Internal only.
    pub taken_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An active loan row locked for payment allocation.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LoanBalance {
    pub id: Uuid,
    pub external_id: String,
    pub outstanding: Decimal,
}

/// Request body for creating a new loan.
///
/// # JSON Example
///
/// ```json
/// {
///   "external_id": "loan-1",
///   "customer_external_id": "cust-1",
///   "amount": "1000.00"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateLoanRequest {
    pub external_id: String,
    pub customer_external_id: String,
    pub amount: Decimal,
}

impl CreateLoanRequest {
    /// Field checks that need no database access.
    pub fn validate(&self) -> Result<(), AppError> {
        validation::validate_external_id("external_id", &self.external_id)?;
        validation::validate_external_id("customer_external_id", &self.customer_external_id)?;
        validation::validate_decimal("amount", &self.amount, MONEY_AMOUNT)?;
        validation::validate_positive("amount", &self.amount)?;
        Ok(())
    }
}

/// Response body for loan endpoints.
///
/// ```json
/// {
///   "external_id": "loan-1",
///   "customer_external_id": "cust-1",
///   "amount": "1000.00",
///   "outstanding": "1000.00",
///   "status": 1
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct LoanResponse {
    pub external_id: String,
    pub customer_external_id: String,
    pub amount: Decimal,
    pub outstanding: Decimal,
    pub status: LoanStatus,
}

/// Postgres hands back `NUMERIC` zero without its scale; always show cents.
fn in_cents(mut value: Decimal) -> Decimal {
    value.rescale(MONEY_AMOUNT.fraction_digits);
    value
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        Self {
            external_id: loan.external_id,
            customer_external_id: loan.customer_external_id,
            amount: in_cents(loan.amount),
            outstanding: in_cents(loan.outstanding),
            status: loan.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_serializes_as_integer() {
        assert_eq!(serde_json::to_value(LoanStatus::Pending).unwrap(), 1);
        assert_eq!(serde_json::to_value(LoanStatus::Active).unwrap(), 2);
        assert_eq!(serde_json::to_value(LoanStatus::Rejected).unwrap(), 3);
        assert_eq!(serde_json::to_value(LoanStatus::Paid).unwrap(), 4);
    }

    #[test]
    fn test_validate_amount() {
        let mut request = CreateLoanRequest {
            external_id: "loan-1".to_string(),
            customer_external_id: "cust-1".to_string(),
            amount: dec!(1000.00),
        };
        assert!(request.validate().is_ok());

        request.amount = dec!(0);
        assert!(matches!(
            request.validate(),
            Err(AppError::Validation { field: "amount", .. })
        ));

        request.amount = dec!(-100);
        assert!(request.validate().is_err());

        request.amount = dec!(10.005);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_response_omits_internal_fields() {
        let now = Utc::now();
        let loan = Loan {
            id: Uuid::new_v4(),
            external_id: "loan-1".to_string(),
            customer_id: Uuid::new_v4(),
            customer_external_id: "cust-1".to_string(),
            amount: dec!(1000.00),
            outstanding: dec!(1000.00),
            status: LoanStatus::Active,
            taken_at: Some(now),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(LoanResponse::from(loan)).unwrap();
        assert!(json.get("taken_at").is_none());
        assert!(json.get("customer_id").is_none());
        assert_eq!(json["customer_external_id"], "cust-1");
        assert_eq!(json["outstanding"], "1000.00");
        assert_eq!(json["status"], 2);
    }

    #[test]
    fn test_paid_off_loan_shows_cents() {
        let now = Utc::now();
        let loan = Loan {
            id: Uuid::new_v4(),
            external_id: "loan-1".to_string(),
            customer_id: Uuid::new_v4(),
            customer_external_id: "cust-1".to_string(),
            amount: dec!(300),
            outstanding: Decimal::ZERO,
            status: LoanStatus::Paid,
            taken_at: Some(now),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(LoanResponse::from(loan)).unwrap();
        assert_eq!(json["amount"], "300.00");
        assert_eq!(json["outstanding"], "0.00");
        assert_eq!(json["status"], 4);
    }
}
