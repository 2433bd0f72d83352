//! Cheez Core - Shared domain types.
//!
//! This crate provides the vocabulary shared by every Cheez component:
//! - `storefront` - JSON API for the catalog, checkout and admin dashboard
//! - `cli` - Migrations, seeding and operator accounts
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Enable the `postgres` feature to get sqlx encoding for the
//! newtypes and enums.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, order status rules, payment methods, phone numbers,
//!   usernames and money helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
