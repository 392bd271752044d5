pub mod catalog;
pub mod checkout;
pub mod coupons;
pub mod customers;
pub mod inventory;
pub mod order_status;
pub mod orders;
pub mod pricing;
