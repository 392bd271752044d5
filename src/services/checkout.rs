use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{
    config::AppConfig,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{CustomerProfile, Order, OrderItem, PaymentMethod},
    services::{customers::CustomerService, inventory::StockReconciler, orders::OrderService},
    session::Session,
};

/// Checkout steps. Forward flow is Summary → Address → Payment →
/// Processing → Success; Address and Payment allow one step back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum CheckoutStep {
    Summary,
    Address,
    Payment,
    Processing,
    Success,
}

/// Structured delivery-address input collected at the Address step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInput {
    pub full_name: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    /// Digits only; non-numeric characters are stripped on input rather
    /// than rejected at submit.
    pub postal_code: String,
}

impl AddressInput {
    pub fn new(
        full_name: impl Into<String>,
        phone: impl Into<String>,
        street: impl Into<String>,
        city: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            phone: phone.into(),
            street: street.into(),
            city: city.into(),
            postal_code: postal_code.into(),
        }
    }

    /// Strips non-digits from the postal code and trims the rest.
    pub fn sanitized(mut self) -> Self {
        self.full_name = self.full_name.trim().to_string();
        self.phone = self.phone.trim().to_string();
        self.street = self.street.trim().to_string();
        self.city = self.city.trim().to_string();
        self.postal_code = self.postal_code.chars().filter(char::is_ascii_digit).collect();
        self
    }

    /// All fields must be non-empty after sanitization.
    pub fn validate(&self) -> Result<(), ServiceError> {
        for (field, value) in [
            ("full_name", &self.full_name),
            ("phone", &self.phone),
            ("street", &self.street),
            ("city", &self.city),
            ("postal_code", &self.postal_code),
        ] {
            if value.is_empty() {
                return Err(ServiceError::validation(field, "must not be empty"));
            }
        }
        Ok(())
    }

    /// The flat address string stored on the order. The phone number is
    /// kept inside it because the order address is not structured
    /// further anywhere else in the system.
    pub fn composed_address(&self) -> String {
        format!(
            "{}, {} - {} | Ph: {}",
            self.street, self.city, self.postal_code, self.phone
        )
    }
}

/// Drives the checkout state machine over a [`Session`].
#[derive(Clone)]
pub struct CheckoutService {
    order_service: Arc<OrderService>,
    stock_reconciler: Arc<StockReconciler>,
    customer_service: Arc<CustomerService>,
    event_sender: EventSender,
    config: Arc<AppConfig>,
}

impl CheckoutService {
    pub fn new(
        order_service: Arc<OrderService>,
        stock_reconciler: Arc<StockReconciler>,
        customer_service: Arc<CustomerService>,
        event_sender: EventSender,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            order_service,
            stock_reconciler,
            customer_service,
            event_sender,
            config,
        }
    }

    /// Summary → Address. Blocked while the cart is empty.
    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    pub async fn proceed_to_address(&self, session: &mut Session) -> Result<(), ServiceError> {
        self.require_step(session, CheckoutStep::Summary)?;
        if session.cart.is_empty() {
            return Err(ServiceError::InvalidOperation(
                "Cannot start checkout with an empty cart".to_string(),
            ));
        }
        self.event_sender
            .send_or_log(Event::CheckoutStarted {
                session_id: session.id(),
            })
            .await;
        session.set_step(CheckoutStep::Address);
        Ok(())
    }

    /// Address → Payment. Sanitizes, validates every field, and stashes
    /// the address (and the derived customer profile) on the session.
    #[instrument(skip(self, session, input), fields(session_id = %session.id()))]
    pub fn submit_address(
        &self,
        session: &mut Session,
        input: AddressInput,
    ) -> Result<(), ServiceError> {
        self.require_step(session, CheckoutStep::Address)?;

        let input = input.sanitized();
        input.validate()?;

        let email = session
            .profile()
            .map(|p| p.email.clone())
            .unwrap_or_default();
        session.save_profile(CustomerProfile {
            email,
            name: input.full_name.clone(),
            phone: input.phone.clone(),
            street: input.street.clone(),
            city: input.city.clone(),
            postal_code: input.postal_code.clone(),
        });
        session.set_address(input);
        session.set_step(CheckoutStep::Payment);
        Ok(())
    }

    /// Records the payment selection at the Payment step. Selecting a
    /// method is not itself a transition; [`Self::place_order`] performs
    /// the proof-gated move into Processing.
    pub fn select_payment(
        &self,
        session: &mut Session,
        method: PaymentMethod,
        proof: Option<String>,
    ) -> Result<(), ServiceError> {
        self.require_step(session, CheckoutStep::Payment)?;
        session.set_payment(method, proof);
        Ok(())
    }

    /// Payment → Processing → Success.
    ///
    /// Guards: a payment method must be selected, and pay-ahead requires
    /// an uploaded proof. On passing the guards this, in order: creates
    /// the order (returned synchronously by the factory), clears the
    /// cart, kicks per-item stock reconciliation, then holds Processing
    /// for the configured minimum floor before landing in Success.
    ///
    /// Processing always reaches Success; whether the order reached
    /// durable storage is reported separately by
    /// `OrderService::persistence_state`. The cart is cleared regardless
    /// of persistence outcome — a deliberate UX-over-consistency trade.
    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    pub async fn place_order(&self, session: &mut Session) -> Result<Order, ServiceError> {
        self.require_step(session, CheckoutStep::Payment)?;

        let address = session
            .address()
            .cloned()
            .ok_or_else(|| ServiceError::validation("address", "address step not completed"))?;
        let method = session.payment_method().ok_or_else(|| {
            ServiceError::validation("payment_method", "no payment method selected")
        })?;
        if method == PaymentMethod::PayAhead && session.payment_proof().is_none() {
            return Err(ServiceError::PaymentProofMissing);
        }
        if session.cart.is_empty() {
            return Err(ServiceError::InvalidOperation(
                "Cart emptied during checkout".to_string(),
            ));
        }

        session.set_step(CheckoutStep::Processing);

        let quote = session.quote();
        let items: Vec<OrderItem> = session.cart.lines().iter().map(OrderItem::from).collect();
        let proof = session.payment_proof().map(str::to_string);

        let order = self
            .order_service
            .place_order(&address, items, quote, method, proof);
        self.event_sender
            .send_or_log(Event::OrderCreated(order.id.clone()))
            .await;
        session.cart.clear();
        self.stock_reconciler.reconcile(&order);

        if let Some(profile) = session.profile().cloned() {
            if !profile.email.is_empty() {
                if let Err(e) = self.customer_service.upsert_profile(profile).await {
                    warn!("Failed to save customer profile: {}", e);
                }
            }
        }

        let floor = Duration::from_millis(self.config.processing_floor_ms);
        if !floor.is_zero() {
            tokio::time::sleep(floor).await;
        }

        session.set_step(CheckoutStep::Success);
        self.event_sender
            .send_or_log(Event::CheckoutCompleted {
                session_id: session.id(),
                order_id: order.id.clone(),
            })
            .await;
        info!("Checkout completed: order {}", order.id);
        Ok(order)
    }

    /// One step back: Address → Summary or Payment → Address. Backward
    /// navigation out of Processing or Success is not permitted.
    pub fn step_back(&self, session: &mut Session) -> Result<(), ServiceError> {
        let previous = match session.step() {
            CheckoutStep::Address => CheckoutStep::Summary,
            CheckoutStep::Payment => CheckoutStep::Address,
            step => {
                return Err(ServiceError::InvalidOperation(format!(
                    "Cannot navigate back from {}",
                    step
                )))
            }
        };
        session.set_step(previous);
        Ok(())
    }

    /// Closes the flow and re-enters Summary with cart, coupon and
    /// payment state cleared. The saved customer profile survives.
    pub fn reset(&self, session: &mut Session) {
        session.reset_checkout();
    }

    fn require_step(&self, session: &Session, expected: CheckoutStep) -> Result<(), ServiceError> {
        if session.step() != expected {
            return Err(ServiceError::InvalidOperation(format!(
                "Expected checkout step {}, currently at {}",
                expected,
                session.step()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_postal_non_digits() {
        let input = AddressInput::new("Asha Rao", "9876543210", "12 MG Road", "Bengaluru", "560-00 1a")
            .sanitized();
        assert_eq!(input.postal_code, "560001");
        assert!(input.validate().is_ok());
    }

    #[test]
    fn validate_reports_offending_field() {
        let input =
            AddressInput::new("Asha Rao", "", "12 MG Road", "Bengaluru", "560001").sanitized();
        let err = input.validate().unwrap_err();
        assert_eq!(err.field(), Some("phone"));
    }

    #[test]
    fn fully_alphabetic_postal_code_fails_validation() {
        let input =
            AddressInput::new("Asha Rao", "9876543210", "12 MG Road", "Bengaluru", "ABCDEF")
                .sanitized();
        let err = input.validate().unwrap_err();
        assert_eq!(err.field(), Some("postal_code"));
    }

    #[test]
    fn composed_address_preserves_phone() {
        let input = AddressInput::new("Asha Rao", "9876543210", "12 MG Road", "Bengaluru", "560001");
        let composed = input.composed_address();
        assert!(composed.contains("9876543210"));
        assert!(composed.contains("12 MG Road"));
        assert!(composed.contains("Bengaluru"));
    }
}
