//! Decimal money arithmetic for prices and order totals.
//!
//! Prices are plain [`Decimal`] amounts in the shop's single currency. All
//! arithmetic is checked so a pathological order fails cleanly instead of
//! panicking on overflow.
//!
//! Stored amounts carry two decimal places. Prices must stay below
//! [`MAX_PRICE`] and order totals below [`MAX_ORDER_TOTAL`], the ranges of
//! the `NUMERIC(12,2)` and `NUMERIC(14,2)` columns that hold them.

use rust_decimal::Decimal;

/// Decimal places kept for stored amounts.
pub const MONEY_SCALE: u32 = 2;

/// Exclusive upper bound for a product price.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

/// Exclusive upper bound for an order total.
pub const MAX_ORDER_TOTAL: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Errors from money arithmetic and price validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// A price was below zero.
    #[error("price cannot be negative")]
    NegativePrice,
    /// A price had more than two decimal places.
    #[error("price cannot have more than 2 decimal places")]
    TooPrecise,
    /// A price was at or above [`MAX_PRICE`].
    #[error("price must be less than {MAX_PRICE}")]
    PriceTooLarge,
    /// An order total was at or above [`MAX_ORDER_TOTAL`].
    #[error("order total must be less than {MAX_ORDER_TOTAL}")]
    TotalTooLarge,
    /// A line item had a zero quantity.
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    /// The total does not fit in a `Decimal`.
    #[error("order total overflowed")]
    Overflow,
}

/// One priced line of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    /// Product price at the time the order is placed.
    pub unit_price: Decimal,
    /// Number of units ordered.
    pub quantity: u32,
}

impl LineItem {
    /// Create a new line item.
    #[must_use]
    pub const fn new(unit_price: Decimal, quantity: u32) -> Self {
        Self {
            unit_price,
            quantity,
        }
    }

    /// `unit_price × quantity`.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::ZeroQuantity`] for an empty line and
    /// [`MoneyError::Overflow`] if the product does not fit.
    pub fn total(&self) -> Result<Decimal, MoneyError> {
        if self.quantity == 0 {
            return Err(MoneyError::ZeroQuantity);
        }
        self.unit_price
            .checked_mul(Decimal::from(self.quantity))
            .ok_or(MoneyError::Overflow)
    }
}

/// Sum the totals of every line in an order.
///
/// An empty iterator sums to zero; callers decide whether empty orders are
/// allowed.
///
/// # Errors
///
/// Propagates the first [`LineItem::total`] error, or [`MoneyError::Overflow`]
/// if the running sum overflows.
///
/// # Example
///
/// ```
/// use bazaar_core::{LineItem, order_total};
/// use rust_decimal::Decimal;
///
/// let lines = [
///     LineItem::new(Decimal::new(1999, 2), 2),
///     LineItem::new(Decimal::new(550, 2), 1),
/// ];
/// assert_eq!(order_total(lines).unwrap(), Decimal::new(4548, 2));
/// ```
pub fn order_total<I>(lines: I) -> Result<Decimal, MoneyError>
where
    I: IntoIterator<Item = LineItem>,
{
    lines.into_iter().try_fold(Decimal::ZERO, |acc, line| {
        acc.checked_add(line.total()?).ok_or(MoneyError::Overflow)
    })
}

/// Check that a price can be stored exactly.
///
/// Trailing zeros don't count toward precision, so `19.990` is accepted as
/// `19.99`.
///
/// # Errors
///
/// Returns [`MoneyError::NegativePrice`] if `price < 0`,
/// [`MoneyError::TooPrecise`] for sub-cent amounts, and
/// [`MoneyError::PriceTooLarge`] at or above [`MAX_PRICE`].
pub fn validate_price(price: Decimal) -> Result<Decimal, MoneyError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(MoneyError::NegativePrice);
    }
    let price = price.normalize();
    if price.scale() > MONEY_SCALE {
        return Err(MoneyError::TooPrecise);
    }
    if price >= MAX_PRICE {
        return Err(MoneyError::PriceTooLarge);
    }
    Ok(price)
}

/// Check that an order total fits the stored range.
///
/// # Errors
///
/// Returns [`MoneyError::TotalTooLarge`] at or above [`MAX_ORDER_TOTAL`].
pub fn validate_total(total: Decimal) -> Result<Decimal, MoneyError> {
    if total >= MAX_ORDER_TOTAL {
        return Err(MoneyError::TotalTooLarge);
    }
    Ok(total)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_line_total() {
        assert_eq!(LineItem::new(dec("12.50"), 3).total().unwrap(), dec("37.50"));
    }

    #[test]
    fn test_line_total_rejects_zero_quantity() {
        assert_eq!(
            LineItem::new(dec("1"), 0).total(),
            Err(MoneyError::ZeroQuantity)
        );
    }

    #[test]
    fn test_order_total_sums_repeated_products() {
        let price = dec("9.99");
        let lines = [LineItem::new(price, 1), LineItem::new(price, 2)];
        assert_eq!(order_total(lines).unwrap(), dec("29.97"));
    }

    #[test]
    fn test_order_total_is_exact() {
        // 0.1 + 0.2 is not 0.3 in binary floating point.
        let lines = [LineItem::new(dec("0.1"), 1), LineItem::new(dec("0.2"), 1)];
        assert_eq!(order_total(lines).unwrap(), dec("0.3"));
    }

    #[test]
    fn test_order_total_empty_is_zero() {
        assert_eq!(order_total(Vec::new()).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_order_total_overflow() {
        let lines = [LineItem::new(Decimal::MAX, 2)];
        assert_eq!(order_total(lines), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(dec("0")).is_ok());
        assert!(validate_price(dec("-0.00")).is_ok());
        assert_eq!(validate_price(dec("-1")), Err(MoneyError::NegativePrice));
    }

    #[test]
    fn test_bounds_match_column_ranges() {
        assert_eq!(MAX_PRICE, dec("10000000000"));
        assert_eq!(MAX_ORDER_TOTAL, dec("1000000000000"));
    }

    #[test]
    fn test_validate_price_rejects_sub_cent_amounts() {
        assert_eq!(validate_price(dec("19.999")), Err(MoneyError::TooPrecise));
        assert_eq!(validate_price(dec("19.990")).unwrap(), dec("19.99"));
    }

    #[test]
    fn test_validate_price_upper_bound() {
        assert!(validate_price(dec("9999999999.99")).is_ok());
        assert_eq!(
            validate_price(dec("10000000000")),
            Err(MoneyError::PriceTooLarge)
        );
        assert_eq!(
            validate_price(dec("123456789012.5")),
            Err(MoneyError::PriceTooLarge)
        );
    }

    #[test]
    fn test_validate_total_upper_bound() {
        let lines = [LineItem::new(dec("9999999999.99"), 1000)];
        let total = order_total(lines).unwrap();
        assert_eq!(validate_total(total), Err(MoneyError::TotalTooLarge));
        assert!(validate_total(dec("999999999999.99")).is_ok());
    }
}
