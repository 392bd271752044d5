//! storefront-core
//!
//! Checkout and order pipeline for a mobile-accessories storefront:
//! cart, pricing, coupon validation, the checkout state machine, order
//! creation with best-effort stock reconciliation, and the admin-driven
//! order status lifecycle. UI rendering, catalog search and the actual
//! remote data store are external collaborators; the latter is injected
//! through [`store::PersistenceStore`].
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod cart;
pub mod config;
pub mod errors;
pub mod events;
pub mod models;
pub mod services;
pub mod session;
pub mod store;
pub mod telemetry;

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    config::AppConfig,
    events::{Event, EventSender},
    services::{
        catalog::CatalogService, checkout::CheckoutService, coupons::CouponService,
        customers::CustomerService, inventory::StockReconciler, order_status::OrderStatusService,
        orders::OrderService,
    },
    store::PersistenceStore,
};

pub use crate::session::Session;

/// All storefront services wired over one injected store and one event
/// channel.
#[derive(Clone)]
pub struct Storefront {
    pub config: Arc<AppConfig>,
    pub event_sender: EventSender,
    pub catalog: Arc<CatalogService>,
    pub coupons: Arc<CouponService>,
    pub checkout: Arc<CheckoutService>,
    pub orders: Arc<OrderService>,
    pub inventory: Arc<StockReconciler>,
    pub order_status: Arc<OrderStatusService>,
    pub customers: Arc<CustomerService>,
}

impl Storefront {
    /// Wires the services. The receiver carries domain events; drop it
    /// if nothing consumes them (emission never blocks operations).
    pub fn new(
        store: Arc<dyn PersistenceStore>,
        config: AppConfig,
    ) -> (Self, mpsc::Receiver<Event>) {
        let config = Arc::new(config);
        let (event_sender, event_rx) = events::channel(config.event_buffer);

        let orders = Arc::new(OrderService::new(
            store.clone(),
            event_sender.clone(),
            config.clone(),
        ));
        let inventory = Arc::new(StockReconciler::new(store.clone(), event_sender.clone()));
        let customers = Arc::new(CustomerService::new(store.clone(), event_sender.clone()));
        let checkout = Arc::new(CheckoutService::new(
            orders.clone(),
            inventory.clone(),
            customers.clone(),
            event_sender.clone(),
            config.clone(),
        ));

        let storefront = Self {
            catalog: Arc::new(CatalogService::new(store.clone(), event_sender.clone())),
            coupons: Arc::new(CouponService::new(store.clone(), event_sender.clone())),
            order_status: Arc::new(OrderStatusService::new(store, event_sender.clone())),
            checkout,
            orders,
            inventory,
            customers,
            config,
            event_sender,
        };
        (storefront, event_rx)
    }

    /// Awaits all outstanding background work (order persistence and
    /// stock reconciliation), for deterministic tests and shutdown.
    pub async fn flush_background_tasks(&self) {
        self.orders.flush().await;
        self.inventory.flush().await;
    }
}
