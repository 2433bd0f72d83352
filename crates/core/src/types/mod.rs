//! Core types for Cheez.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod payment;
pub mod phone;
pub mod status;
pub mod username;

pub use id::*;
pub use money::{MAX_AMOUNT, is_storable_amount, line_subtotal, within_tolerance};
pub use payment::{InvalidPaymentMethod, PaymentMethod};
pub use phone::{PhoneNumber, PhoneNumberError};
pub use status::{InvalidOrderStatus, OrderStatus, TransitionPolicy};
pub use username::{Username, UsernameError};
