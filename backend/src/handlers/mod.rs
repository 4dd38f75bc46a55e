//! HTTP request handlers

pub mod catalog;
pub mod commission;
pub mod customer;
pub mod employee;
pub mod purchase_order;
pub mod sale;
pub mod service_order;
pub mod stock;
pub mod transaction;

pub use catalog::*;
pub use commission::*;
pub use customer::*;
pub use employee::*;
pub use purchase_order::*;
pub use sale::*;
pub use service_order::*;
pub use stock::*;
pub use transaction::*;
