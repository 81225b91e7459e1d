//! HTTP handlers

pub mod auth;
pub mod employee;
pub mod finance;
pub mod health;
pub mod inventory;
pub mod order;
pub mod procurement_reports;
pub mod production;
pub mod purchase_order;
pub mod reports;
pub mod supplier;
pub mod warehouse;

pub use auth::*;
pub use employee::*;
pub use finance::*;
pub use health::*;
pub use inventory::*;
pub use order::*;
pub use procurement_reports::*;
pub use production::*;
pub use purchase_order::*;
pub use reports::*;
pub use supplier::*;
pub use warehouse::*;
