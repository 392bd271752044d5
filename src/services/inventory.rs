use std::sync::{Arc, Mutex};

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::{
    events::{Event, EventSender},
    models::Order,
    store::PersistenceStore,
};

/// Best-effort post-order inventory decrement.
///
/// Not a reservation or ledger system: stock is decremented after the
/// order is accepted, clamped at zero. Each item's update is an
/// independent task; one failure neither blocks the others nor rolls
/// back the order. Concurrent orders on the last unit can both succeed
/// (accepted oversell limitation).
#[derive(Clone)]
pub struct StockReconciler {
    store: Arc<dyn PersistenceStore>,
    event_sender: EventSender,
    pending: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl StockReconciler {
    pub fn new(store: Arc<dyn PersistenceStore>, event_sender: EventSender) -> Self {
        Self {
            store,
            event_sender,
            pending: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Kicks off one fire-and-forget stock update per order item.
    /// Must be called from within a tokio runtime.
    #[instrument(skip(self, order), fields(order_id = %order.id, items = order.items.len()))]
    pub fn reconcile(&self, order: &Order) {
        let mut pending = self.pending.lock().unwrap();
        for item in &order.items {
            let store = self.store.clone();
            let event_sender = self.event_sender.clone();
            let product_id = item.product_id;
            let quantity = item.quantity;

            pending.push(tokio::spawn(async move {
                let product = match store.get_product(product_id).await {
                    Ok(Some(product)) => product,
                    Ok(None) => {
                        warn!("Stock reconciliation: product {} not found", product_id);
                        return;
                    }
                    Err(e) => {
                        warn!("Stock reconciliation read failed for {}: {}", product_id, e);
                        return;
                    }
                };

                // Clamped at zero; absolute-value write (last-write-wins).
                let new_stock = product.stock.saturating_sub(quantity);
                match store.update_product_stock(product_id, new_stock).await {
                    Ok(()) => {
                        info!(
                            "Reconciled stock for {}: {} -> {}",
                            product_id, product.stock, new_stock
                        );
                        event_sender
                            .send_or_log(Event::StockAdjusted {
                                product_id,
                                old_stock: product.stock,
                                new_stock,
                            })
                            .await;
                    }
                    Err(e) => {
                        warn!("Stock reconciliation write failed for {}: {}", product_id, e);
                        return;
                    }
                }

                // Sales counter rides along; its failure is equally
                // non-fatal.
                if let Err(e) = store.record_sale(product_id, quantity).await {
                    warn!("Sales counter update failed for {}: {}", product_id, e);
                }
            }));
        }
    }

    /// Awaits every outstanding reconciliation task.
    pub async fn flush(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut pending = self.pending.lock().unwrap();
            pending.drain(..).collect()
        };
        join_all(handles).await;
    }
}
