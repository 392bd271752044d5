//! Domain events emitted by the services.
//!
//! Events are advisory: a full channel or dropped receiver never fails
//! the operation that emitted the event.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use crate::models::OrderStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Coupon events
    CouponApplied { code: String, discount_percent: u8 },
    CouponRejected { code: String },
    CouponCreated(String),
    CouponDeleted(String),

    // Checkout events
    CheckoutStarted { session_id: Uuid },
    CheckoutCompleted { session_id: Uuid, order_id: String },

    // Order events
    OrderCreated(String),
    OrderPersisted(String),
    OrderPersistenceFailed(String),
    OrderStatusChanged {
        order_id: String,
        old_status: OrderStatus,
        new_status: OrderStatus,
    },

    // Catalog / inventory events
    ProductCreated(Uuid),
    ProductDeleted(Uuid),
    StockAdjusted {
        product_id: Uuid,
        old_stock: u32,
        new_stock: u32,
    },

    // Customer events
    CustomerSaved(String),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, surfacing channel failure to the caller.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the channel is
    /// closed.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Event dropped: {}", e);
        }
    }
}

/// Builds a bounded event channel.
pub fn channel(buffer: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    (EventSender::new(tx), rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_event() {
        let (sender, mut rx) = channel(8);
        sender
            .send(Event::OrderCreated("1700000000000".into()))
            .await
            .unwrap();

        match rx.recv().await {
            Some(Event::OrderCreated(id)) => assert_eq!(id, "1700000000000"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_or_log_absorbs_closed_channel() {
        let (sender, rx) = channel(1);
        drop(rx);
        // Must not panic or error out.
        sender.send_or_log(Event::CouponDeleted("SAVE10".into())).await;
    }
}
