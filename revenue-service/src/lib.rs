//! Revenue Service - dashboard reporting and document numbering for multi-tenant accounts.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
