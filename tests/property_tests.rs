//! Property-based tests for the pricing and cart arithmetic.

use proptest::prelude::*;
use storefront_core::{
    cart::{Cart, CartLine},
    models::{Category, Coupon, Product},
    services::pricing,
};

fn arb_lines() -> impl Strategy<Value = Vec<CartLine>> {
    prop::collection::vec((1i64..100_000, 1u32..50), 0..8).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(price, quantity)| {
                let product = Product::new("item", Category::Covers, price, 100);
                CartLine::new(&product, quantity)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn discount_plus_final_total_is_subtotal(lines in arb_lines(), percent in 1u8..=100) {
        let coupon = Coupon::new("PROP", percent).unwrap();
        let quote = pricing::quote(&lines, Some(&coupon));
        prop_assert_eq!(quote.final_total + quote.discount, quote.subtotal);
        prop_assert!(quote.discount >= 0);
        prop_assert!(quote.final_total >= 0);
    }

    #[test]
    fn discount_matches_rounded_percentage(lines in arb_lines(), percent in 1u8..=100) {
        let coupon = Coupon::new("PROP", percent).unwrap();
        let quote = pricing::quote(&lines, Some(&coupon));
        // round-half-up of subtotal * percent / 100
        let expected = (quote.subtotal * i64::from(percent) + 50) / 100;
        prop_assert_eq!(quote.discount, expected);
    }

    #[test]
    fn no_coupon_means_identity(lines in arb_lines()) {
        let quote = pricing::quote(&lines, None);
        prop_assert_eq!(quote.discount, 0);
        prop_assert_eq!(quote.final_total, quote.subtotal);
    }

    #[test]
    fn quantity_never_drops_below_one(deltas in prop::collection::vec(-10i32..10, 1..30)) {
        let product = Product::new("item", Category::Audio, 999, 10);
        let mut cart = Cart::new();
        cart.add(&product, 1);

        for delta in deltas {
            cart.update_quantity(product.id, delta);
            prop_assert!(cart.lines()[0].quantity >= 1);
        }
    }

    #[test]
    fn repeated_adds_accumulate_into_one_line(adds in prop::collection::vec(1u32..5, 1..10)) {
        let product = Product::new("item", Category::Cables, 499, 10);
        let mut cart = Cart::new();
        let mut expected = 0u32;
        for quantity in adds {
            cart.add(&product, quantity);
            expected += quantity;
        }
        prop_assert_eq!(cart.len(), 1);
        prop_assert_eq!(cart.lines()[0].quantity, expected);
        prop_assert_eq!(cart.total_units(), expected);
    }
}
