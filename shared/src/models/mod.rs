//! Domain models for the Repair Shop Operations Platform

pub mod commission;
pub mod customer;
pub mod employee;
pub mod purchase;
pub mod sale;
pub mod service_order;
pub mod stock;
pub mod transaction;

pub use commission::*;
pub use customer::*;
pub use employee::*;
pub use purchase::*;
pub use sale::*;
pub use service_order::*;
pub use stock::*;
pub use transaction::*;
