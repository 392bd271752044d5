pub mod coupon;
pub mod customer;
pub mod order;
pub mod product;

pub use coupon::Coupon;
pub use customer::CustomerProfile;
pub use order::{Order, OrderItem, OrderStatus, PaymentMethod, PersistenceState};
pub use product::{Category, Product, Review, DEFAULT_COLOR};
