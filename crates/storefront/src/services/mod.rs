//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Username/password login and account creation
//! - `catalog` - Category and product listings, inventory adjustment
//! - `orders` - Order placement, listings and status updates
//!
//! Services are generic over the repository traits in [`crate::db`], so the
//! same logic runs against `PostgreSQL` in production and an in-memory store
//! in tests. Every privileged entry point takes the caller's
//! [`CurrentUser`](crate::models::CurrentUser) and checks the role itself.

pub mod auth;
pub mod catalog;
pub mod error;
pub mod orders;

pub use auth::{AuthError, AuthService, hash_password};
pub use catalog::CatalogService;
pub use error::ServiceError;
pub use orders::{OrderLineRequest, OrderService, PlaceOrderRequest};

use crate::models::CurrentUser;

/// Reject callers without the admin flag.
fn require_admin(user: &CurrentUser) -> Result<(), ServiceError> {
    if user.is_admin {
        Ok(())
    } else {
        Err(ServiceError::Forbidden)
    }
}
