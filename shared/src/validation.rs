//! Validation utilities for the Repair Shop Operations Platform

use rust_decimal::Decimal;

/// Validate an ordered/sold/consumed quantity (must be strictly positive)
pub fn validate_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate a unit price or monetary amount (must not be negative)
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Price cannot be negative");
    }
    Ok(())
}

/// Validate a receipt delta against a purchase-order line: the delta must be
/// positive and must not push `received_quantity` past the ordered quantity.
pub fn validate_receipt_delta(
    quantity: i32,
    received_quantity: i32,
    delta: i32,
) -> Result<(), &'static str> {
    if delta <= 0 {
        return Err("Received quantity must be positive");
    }
    // Checked addition: a delta near i32::MAX must fail the bound, not wrap.
    match received_quantity.checked_add(delta) {
        Some(total) if total <= quantity => Ok(()),
        _ => Err("Received quantity cannot exceed ordered quantity"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_non_positive_quantity() {
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(1).is_ok());
    }

    #[test]
    fn receipt_delta_bounds() {
        assert!(validate_receipt_delta(10, 4, 6).is_ok());
        assert!(validate_receipt_delta(10, 4, 7).is_err());
        assert!(validate_receipt_delta(10, 4, 0).is_err());
    }

    #[test]
    fn receipt_delta_near_integer_limit_is_rejected() {
        assert!(validate_receipt_delta(i32::MAX, 1, i32::MAX).is_err());
        assert!(validate_receipt_delta(i32::MAX, 2, i32::MAX - 1).is_err());
        assert!(validate_receipt_delta(i32::MAX, i32::MAX - 1, 1).is_ok());
    }

    proptest! {
        /// A valid receipt delta never overshoots the ordered quantity.
        #[test]
        fn prop_receipt_delta_never_overshoots(
            quantity in 1i32..1000,
            received in 0i32..1000,
            delta in 1i32..1000,
        ) {
            prop_assume!(received <= quantity);
            if validate_receipt_delta(quantity, received, delta).is_ok() {
                prop_assert!(received + delta <= quantity);
            }
        }
    }
}
