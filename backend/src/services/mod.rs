//! Business logic services
//!
//! Each service owns a clone of the connection pool. Anything that moves
//! stock does so through `stock::adjust_quantity` inside its own transaction.

pub mod catalog;
pub mod commission;
pub mod customer;
pub mod employee;
pub mod purchase_order;
pub mod sale;
pub mod service_order;
pub mod stock;
pub mod transaction;

pub use catalog::CatalogService;
pub use commission::CommissionService;
pub use customer::CustomerService;
pub use employee::EmployeeService;
pub use purchase_order::PurchaseOrderService;
pub use sale::SaleService;
pub use service_order::ServiceOrderService;
pub use stock::StockService;
pub use transaction::TransactionService;
