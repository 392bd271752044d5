use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc, Mutex,
};

use chrono::Utc;
use dashmap::DashMap;
use futures::future::join_all;
use rand::Rng;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use crate::{
    config::AppConfig,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{Order, OrderItem, OrderStatus, PaymentMethod, PersistenceState},
    services::{checkout::AddressInput, pricing::PriceQuote},
    store::PersistenceStore,
};

/// Order factory.
///
/// Constructs immutable order records and returns them synchronously for
/// immediate receipt display; the write to the persistence collaborator
/// runs as a background task. The returned order is therefore "locally
/// confirmed" only — [`OrderService::persistence_state`] reports whether
/// it has reached durable storage, and [`OrderService::flush`] awaits all
/// outstanding writes for deterministic tests.
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn PersistenceStore>,
    event_sender: EventSender,
    config: Arc<AppConfig>,
    last_id_ms: Arc<AtomicI64>,
    states: Arc<DashMap<String, PersistenceState>>,
    pending: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl OrderService {
    pub fn new(
        store: Arc<dyn PersistenceStore>,
        event_sender: EventSender,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            store,
            event_sender,
            config,
            last_id_ms: Arc::new(AtomicI64::new(0)),
            states: Arc::new(DashMap::new()),
            pending: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Creates an order from checkout inputs and hands it to the store.
    ///
    /// Returns the constructed order immediately; persistence completes
    /// in the background. Must be called from within a tokio runtime.
    #[instrument(skip(self, customer, items, quote), fields(items = items.len()))]
    pub fn place_order(
        &self,
        customer: &AddressInput,
        items: Vec<OrderItem>,
        quote: PriceQuote,
        payment_method: PaymentMethod,
        payment_proof: Option<String>,
    ) -> Order {
        let order = Order {
            id: self.next_order_id(),
            customer_name: customer.full_name.clone(),
            address: customer.composed_address(),
            items,
            total: quote.subtotal,
            discount: quote.discount,
            final_total: quote.final_total,
            payment_method,
            payment_proof,
            verification_code: self.verification_code(),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };

        info!(
            "Created order {} for {} (total {}, discount {})",
            order.id, order.customer_name, order.total, order.discount
        );

        self.states
            .insert(order.id.clone(), PersistenceState::Pending);
        self.spawn_persist(order.clone());
        order
    }

    /// Whether an order placed by this factory has reached the store.
    pub fn persistence_state(&self, order_id: &str) -> Option<PersistenceState> {
        self.states.get(order_id).map(|s| *s)
    }

    /// Awaits every outstanding persistence task.
    pub async fn flush(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut pending = self.pending.lock().unwrap();
            pending.drain(..).collect()
        };
        join_all(handles).await;
    }

    /// Admin/back-office read of persisted orders.
    pub async fn list_orders(&self) -> Result<Vec<Order>, ServiceError> {
        let mut orders = self.store.list_orders().await?;
        orders.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(orders)
    }

    pub async fn get_order(&self, order_id: &str) -> Result<Order, ServiceError> {
        self.store
            .get_order(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))
    }

    /// After-sale authenticity lookup by verification code.
    pub async fn find_by_verification_code(
        &self,
        code: &str,
    ) -> Result<Option<Order>, ServiceError> {
        let orders = self.store.list_orders().await?;
        Ok(orders.into_iter().find(|o| o.verification_code == code))
    }

    fn spawn_persist(&self, order: Order) {
        let store = self.store.clone();
        let states = self.states.clone();
        let event_sender = self.event_sender.clone();
        let order_id = order.id.clone();

        let handle = tokio::spawn(async move {
            match store.create_order(order).await {
                Ok(()) => {
                    states.insert(order_id.clone(), PersistenceState::Persisted);
                    event_sender.send_or_log(Event::OrderPersisted(order_id)).await;
                }
                Err(e) => {
                    // The order was already shown to the customer; the
                    // failure is recorded, not surfaced as a crash.
                    error!("Failed to persist order {}: {}", order_id, e);
                    states.insert(order_id.clone(), PersistenceState::Failed);
                    event_sender
                        .send_or_log(Event::OrderPersistenceFailed(order_id))
                        .await;
                }
            }
        });

        self.pending.lock().unwrap().push(handle);
    }

    /// Millisecond timestamp forced strictly monotonic, so ids are
    /// unique within the process and sort by creation order.
    fn next_order_id(&self) -> String {
        let now = Utc::now().timestamp_millis();
        loop {
            let last = self.last_id_ms.load(Ordering::Acquire);
            let next = now.max(last + 1);
            if self
                .last_id_ms
                .compare_exchange(last, next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return next.to_string();
            }
        }
    }

    /// Two configured letters plus six random digits, e.g. `MA483920`.
    fn verification_code(&self) -> String {
        let digits = rand::thread_rng().gen_range(0..1_000_000);
        format!("{}{:06}", self.config.verification_prefix, digits)
    }
}
