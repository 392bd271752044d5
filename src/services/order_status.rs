use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
    models::{Order, OrderStatus},
    store::PersistenceStore,
};

/// Admin-driven order status lifecycle: Pending → Shipped or Rejected,
/// exactly once. Both outcomes are terminal.
#[derive(Clone)]
pub struct OrderStatusService {
    store: Arc<dyn PersistenceStore>,
    event_sender: EventSender,
}

impl OrderStatusService {
    pub fn new(store: Arc<dyn PersistenceStore>, event_sender: EventSender) -> Self {
        Self {
            store,
            event_sender,
        }
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn mark_shipped(&self, order_id: &str) -> Result<Order, ServiceError> {
        self.transition(order_id, OrderStatus::Shipped).await
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn mark_reject(&self, order_id: &str) -> Result<Order, ServiceError> {
        self.transition(order_id, OrderStatus::Rejected).await
    }

    pub async fn get_status(&self, order_id: &str) -> Result<OrderStatus, ServiceError> {
        let order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;
        Ok(order.status)
    }

    /// Performs the store write first; state visible to callers reflects
    /// only a confirmed write, never an optimistic local update.
    async fn transition(
        &self,
        order_id: &str,
        new_status: OrderStatus,
    ) -> Result<Order, ServiceError> {
        let order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let old_status = order.status;
        if old_status.is_terminal() {
            error!(
                "Rejected status change on order {}: {} is terminal",
                order_id, old_status
            );
            return Err(ServiceError::InvalidOperation(format!(
                "Order {} is already {}; no further transition allowed",
                order_id, old_status
            )));
        }

        let updated = self.store.update_order_status(order_id, new_status).await?;

        self.event_sender
            .send_or_log(Event::OrderStatusChanged {
                order_id: order_id.to_string(),
                old_status,
                new_status,
            })
            .await;
        info!(
            "Order {} status updated from {} to {}",
            order_id, old_status, new_status
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{events, store::MemoryStore};
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn pending_order(id: &str) -> Order {
        Order {
            id: id.to_string(),
            customer_name: "Asha".into(),
            address: "12 MG Road, Bengaluru - 560001 | Ph: 9876543210".into(),
            items: Vec::new(),
            total: 500,
            discount: 0,
            final_total: 500,
            payment_method: crate::models::PaymentMethod::PayOnDelivery,
            payment_proof: None,
            verification_code: "MA123456".into(),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }

    async fn service_with_order(id: &str) -> (OrderStatusService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store.create_order(pending_order(id)).await.unwrap();
        let (sender, _rx) = events::channel(16);
        (OrderStatusService::new(store.clone(), sender), store)
    }

    #[tokio::test]
    async fn ships_a_pending_order() {
        let (service, store) = service_with_order("100").await;
        let updated = service.mark_shipped("100").await.unwrap();
        assert_eq!(updated.status, OrderStatus::Shipped);
        assert_eq!(
            store.get_order("100").await.unwrap().unwrap().status,
            OrderStatus::Shipped
        );
    }

    #[tokio::test]
    async fn terminal_states_reject_further_transitions() {
        let (service, store) = service_with_order("101").await;
        service.mark_reject("101").await.unwrap();

        let err = service.mark_shipped("101").await.unwrap_err();
        assert_matches!(err, ServiceError::InvalidOperation(_));
        // State unchanged by the repeated call.
        assert_eq!(
            store.get_order("101").await.unwrap().unwrap().status,
            OrderStatus::Rejected
        );
    }

    #[tokio::test]
    async fn store_failure_leaves_status_unchanged() {
        let (service, store) = service_with_order("102").await;
        store.fail_status_writes(true);

        let err = service.mark_shipped("102").await.unwrap_err();
        assert_matches!(err, ServiceError::Persistence(_));
        assert_eq!(
            service.get_status("102").await.unwrap(),
            OrderStatus::Pending,
            "no optimistic local update"
        );
    }

    #[tokio::test]
    async fn missing_order_is_not_found() {
        let (service, _store) = service_with_order("103").await;
        assert_matches!(
            service.mark_shipped("999").await,
            Err(ServiceError::NotFound(_))
        );
    }
}
