//! Shared types and models for the Repair Shop Operations Platform
//!
//! This crate contains the domain types shared between the backend and any
//! other components of the system (reporting tools, future clients).

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::*;
