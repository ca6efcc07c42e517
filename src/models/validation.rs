//! Field validation shared by the request types.
//!
//! Decimal limits mirror the `NUMERIC(p, s)` columns the values end up in.

use rust_decimal::Decimal;

use crate::error::AppError;

/// Maximum length of any external id.
pub const MAX_EXTERNAL_ID_LEN: usize = 60;

/// Digit budget for a decimal field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalLimits {
    pub integer_digits: u32,
    pub fraction_digits: u32,
}

/// Customer score and payment totals: `NUMERIC(20, 10)`.
pub const WIDE_AMOUNT: DecimalLimits = DecimalLimits {
    integer_digits: 10,
    fraction_digits: 10,
};

/// Loan principal and outstanding: `NUMERIC(12, 2)`.
pub const MONEY_AMOUNT: DecimalLimits = DecimalLimits {
    integer_digits: 10,
    fraction_digits: 2,
};

/// Check that an external id supplied in a request body is usable.
pub fn validate_external_id(field: &'static str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(field, "This field may not be blank."));
    }
    if value.chars().count() > MAX_EXTERNAL_ID_LEN {
        return Err(AppError::validation(
            field,
            format!("Ensure this field has no more than {MAX_EXTERNAL_ID_LEN} characters."),
        ));
    }
    Ok(())
}

/// Check a customer external id taken from a `by-customer` path.
///
/// Only `[a-zA-Z0-9_-]+` is accepted.
pub fn validate_lookup_id(value: &str) -> Result<(), AppError> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(AppError::validation(
            "external_id",
            "External id may only contain letters, digits, '_' and '-'.",
        ))
    }
}

/// Check that `value` fits in the digit budget described by `limits`.
///
/// Trailing fractional zeros do not count against the budget.
pub fn validate_decimal(
    field: &'static str,
    value: &Decimal,
    limits: DecimalLimits,
) -> Result<(), AppError> {
    let normalized = value.normalize();
    let scale = normalized.scale();
    let digits = normalized.mantissa().unsigned_abs().to_string().len() as u32;
    let integer_digits = digits.saturating_sub(scale);

    if scale > limits.fraction_digits {
        return Err(AppError::validation(
            field,
            format!(
                "Ensure that there are no more than {} decimal places.",
                limits.fraction_digits
            ),
        ));
    }
    if integer_digits > limits.integer_digits {
        return Err(AppError::validation(
            field,
            format!(
                "Ensure that there are no more than {} digits before the decimal point.",
                limits.integer_digits
            ),
        ));
    }
    Ok(())
}

/// Amounts of money moved by the API must be strictly positive.
pub fn validate_positive(field: &'static str, value: &Decimal) -> Result<(), AppError> {
    if value.is_sign_negative() || value.is_zero() {
        return Err(AppError::validation(field, "Amount must be greater than zero."));
    }
    Ok(())
}
