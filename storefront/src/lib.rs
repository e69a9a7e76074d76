// storefront/src/lib.rs

pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
pub mod validation;
pub mod web;
