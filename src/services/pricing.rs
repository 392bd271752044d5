//! Pricing engine.
//!
//! Pure computation over cart lines and the applied coupon. Callers
//! recompute on every render/query; nothing here holds state.

use serde::Serialize;

use crate::{cart::CartLine, models::Coupon};

/// Computed cart pricing, in integer currency units.
///
/// Invariant: `final_total + discount == subtotal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    pub subtotal: i64,
    pub discount: i64,
    pub final_total: i64,
}

/// Quotes a cart against an optionally applied coupon.
pub fn quote(lines: &[CartLine], coupon: Option<&Coupon>) -> PriceQuote {
    let subtotal: i64 = lines.iter().map(CartLine::line_total).sum();
    let discount = coupon
        .map(|c| percentage_of(subtotal, c.discount_percent))
        .unwrap_or(0);

    PriceQuote {
        subtotal,
        discount,
        final_total: subtotal - discount,
    }
}

/// `round(amount * percent / 100)`, round-half-up, integer arithmetic.
fn percentage_of(amount: i64, percent: u8) -> i64 {
    (amount * i64::from(percent) + 50) / 100
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Product};
    use test_case::test_case;

    fn line(price: i64, quantity: u32) -> CartLine {
        let product = Product::new("item", Category::Covers, price, 100);
        CartLine::new(&product, quantity)
    }

    fn coupon(percent: u8) -> Coupon {
        Coupon::new("TEST", percent).unwrap()
    }

    #[test]
    fn empty_cart_quotes_zero() {
        let q = quote(&[], None);
        assert_eq!(q.subtotal, 0);
        assert_eq!(q.discount, 0);
        assert_eq!(q.final_total, 0);
    }

    #[test]
    fn no_coupon_means_no_discount() {
        let q = quote(&[line(1999, 1), line(499, 2)], None);
        assert_eq!(q.subtotal, 2997);
        assert_eq!(q.discount, 0);
        assert_eq!(q.final_total, 2997);
    }

    #[test]
    fn ten_percent_on_thousand() {
        let q = quote(&[line(1000, 1)], Some(&coupon(10)));
        assert_eq!(q.discount, 100);
        assert_eq!(q.final_total, 900);
    }

    // 1999 + 2x499 with a 10% welcome code
    #[test]
    fn welcome_ten_scenario() {
        let q = quote(&[line(1999, 1), line(499, 2)], Some(&coupon(10)));
        assert_eq!(q.subtotal, 2997);
        assert_eq!(q.discount, 300); // round(299.7)
        assert_eq!(q.final_total, 2697);
    }

    #[test_case(999, 15, 150 ; "149.85 rounds up")]
    #[test_case(1001, 25, 250 ; "250.25 rounds down")]
    #[test_case(50, 1, 1 ; "0.5 rounds half up")]
    #[test_case(333, 100, 333 ; "full discount")]
    fn rounding_is_half_up(subtotal: i64, percent: u8, expected: i64) {
        assert_eq!(percentage_of(subtotal, percent), expected);
    }
}
