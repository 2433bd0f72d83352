//! Cheez storefront library.
//!
//! JSON API for a snack-delivery shop: catalog browsing, checkout with stock
//! decrement, order tracking, and an admin surface for inventory and order
//! status. The binary in `main.rs` wires this up with Sentry, tracing and a
//! `PostgreSQL` pool; tests drive the services and router directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
