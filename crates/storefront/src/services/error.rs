//! Service error type.

use thiserror::Error;

use cheez_core::ProductId;

use crate::db::RepositoryError;

/// Errors returned by the catalog and order services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The caller is not an admin.
    #[error("admin access required")]
    Forbidden,

    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The input failed validation.
    #[error("{0}")]
    Invalid(String),

    /// A product does not have enough units for the order.
    #[error("insufficient stock for product {0}")]
    InsufficientStock(ProductId),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[source] RepositoryError),
}

impl ServiceError {
    /// Shorthand for [`ServiceError::Invalid`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::InsufficientStock(id) => Self::InsufficientStock(id),
            RepositoryError::StockLimit(id) => {
                Self::Invalid(format!("stock for product {id} cannot exceed {}", i32::MAX))
            }
            other => Self::Repository(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_is_lifted_out_of_repository_errors() {
        let err = ServiceError::from(RepositoryError::InsufficientStock(ProductId::new(3)));
        assert!(matches!(err, ServiceError::InsufficientStock(id) if id == ProductId::new(3)));

        let err = ServiceError::from(RepositoryError::StockLimit(ProductId::new(3)));
        assert_eq!(err.to_string(), "stock for product 3 cannot exceed 2147483647");

        let err = ServiceError::from(RepositoryError::NotFound);
        assert!(matches!(err, ServiceError::Repository(RepositoryError::NotFound)));
    }

    #[test]
    fn test_display() {
        assert_eq!(ServiceError::NotFound("product").to_string(), "product not found");
        assert_eq!(ServiceError::invalid("Invalid quantity").to_string(), "Invalid quantity");
    }
}
