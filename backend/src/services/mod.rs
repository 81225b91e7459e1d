//! Business logic services

pub mod auth;
pub mod employee;
pub mod finance;
pub mod inventory;
pub mod order;
pub mod procurement_reports;
pub mod production;
pub mod purchase_order;
pub mod report_catalog;
pub mod report_render;
pub mod supplier;
pub mod warehouse;
