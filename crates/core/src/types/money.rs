//! Decimal money helpers.
//!
//! Amounts are Pakistani rupees held as `rust_decimal::Decimal` with two
//! decimal places in storage (`NUMERIC(10, 2)`).

use rust_decimal::Decimal;

/// Largest amount a `NUMERIC(10, 2)` column holds: 99,999,999.99.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Subtotal of one order line: unit price times quantity.
///
/// Returns `None` if the product overflows `Decimal`.
#[must_use]
pub fn line_subtotal(price: Decimal, quantity: i32) -> Option<Decimal> {
    price.checked_mul(Decimal::from(quantity))
}

/// Whether an amount fits in storage: non-negative and at most [`MAX_AMOUNT`].
#[must_use]
pub fn is_storable_amount(amount: Decimal) -> bool {
    amount >= Decimal::ZERO && amount <= MAX_AMOUNT
}

/// Whether two amounts differ by at most `tolerance`.
///
/// A difference that overflows is never within tolerance.
#[must_use]
pub fn within_tolerance(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
    a.checked_sub(b).is_some_and(|diff| diff.abs() <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_subtotal() {
        assert_eq!(line_subtotal(Decimal::new(45, 0), 2), Some(Decimal::new(90, 0)));
        assert_eq!(line_subtotal(Decimal::new(1999, 2), 3), Some(Decimal::new(5997, 2)));
        assert_eq!(line_subtotal(Decimal::new(75, 0), 0), Some(Decimal::ZERO));
    }

    #[test]
    fn test_line_subtotal_overflow() {
        assert_eq!(line_subtotal(Decimal::MAX, 2), None);
        assert_eq!(line_subtotal(MAX_AMOUNT, i32::MAX).map(|s| s > MAX_AMOUNT), Some(true));
    }

    #[test]
    fn test_max_amount() {
        assert_eq!(MAX_AMOUNT, Decimal::new(9_999_999_999, 2));
        assert!(is_storable_amount(MAX_AMOUNT));
        assert!(is_storable_amount(Decimal::ZERO));
        assert!(!is_storable_amount(MAX_AMOUNT + Decimal::new(1, 2)));
        assert!(!is_storable_amount(Decimal::new(-1, 2)));
        assert!(!is_storable_amount(Decimal::MAX));
    }

    #[test]
    fn test_within_tolerance() {
        let cent = Decimal::new(1, 2);
        assert!(within_tolerance(Decimal::new(16500, 2), Decimal::new(16501, 2), cent));
        assert!(within_tolerance(Decimal::new(16501, 2), Decimal::new(16500, 2), cent));
        assert!(!within_tolerance(Decimal::new(165, 0), Decimal::new(166, 0), cent));
        assert!(within_tolerance(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO));
        assert!(!within_tolerance(Decimal::MAX, Decimal::MIN, cent));
    }
}
