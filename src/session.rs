//! Per-shopper session state.
//!
//! One explicit context object holds the cart, the applied coupon and
//! the checkout progress, and is passed to every core operation. There
//! are no module-level globals anywhere in this crate.

use uuid::Uuid;

use crate::{
    cart::Cart,
    models::{Coupon, CustomerProfile, PaymentMethod},
    services::{
        checkout::{AddressInput, CheckoutStep},
        pricing::{self, PriceQuote},
    },
};

/// Transient state for one shopper: cart, coupon, checkout progress and
/// the saved customer profile (which alone survives a checkout reset).
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    pub cart: Cart,
    applied_coupon: Option<Coupon>,
    step: CheckoutStep,
    address: Option<AddressInput>,
    payment_method: Option<PaymentMethod>,
    payment_proof: Option<String>,
    profile: Option<CustomerProfile>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            cart: Cart::new(),
            applied_coupon: None,
            step: CheckoutStep::Summary,
            address: None,
            payment_method: None,
            payment_proof: None,
            profile: None,
        }
    }

    /// Session for a logged-in identity with a saved profile.
    pub fn for_customer(profile: CustomerProfile) -> Self {
        Self {
            profile: Some(profile),
            ..Self::new()
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    /// At most one coupon is applied at a time.
    pub fn applied_coupon(&self) -> Option<&Coupon> {
        self.applied_coupon.as_ref()
    }

    pub fn address(&self) -> Option<&AddressInput> {
        self.address.as_ref()
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    pub fn payment_proof(&self) -> Option<&str> {
        self.payment_proof.as_deref()
    }

    pub fn profile(&self) -> Option<&CustomerProfile> {
        self.profile.as_ref()
    }

    /// Current price quote. Recomputed from the cart and coupon on every
    /// call; nothing is cached.
    pub fn quote(&self) -> PriceQuote {
        pricing::quote(self.cart.lines(), self.applied_coupon.as_ref())
    }

    pub(crate) fn set_step(&mut self, step: CheckoutStep) {
        self.step = step;
    }

    pub(crate) fn set_applied_coupon(&mut self, coupon: Option<Coupon>) {
        self.applied_coupon = coupon;
    }

    pub(crate) fn set_address(&mut self, address: AddressInput) {
        self.address = Some(address);
    }

    pub(crate) fn set_payment(&mut self, method: PaymentMethod, proof: Option<String>) {
        self.payment_method = Some(method);
        self.payment_proof = proof;
    }

    pub(crate) fn save_profile(&mut self, profile: CustomerProfile) {
        self.profile = Some(profile);
    }

    /// Clears cart, coupon, payment and checkout progress, preserving
    /// the saved profile.
    pub(crate) fn reset_checkout(&mut self) {
        self.cart.clear();
        self.applied_coupon = None;
        self.address = None;
        self.payment_method = None;
        self.payment_proof = None;
        self.step = CheckoutStep::Summary;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
