//! Price component schema, usage fee editor and billable metric reconciliation.

pub mod config;
pub mod editor;
pub mod handlers;
pub mod models;
pub mod schema;
pub mod services;
pub mod startup;
