use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// Order absent or not owned by the requestor. Deliberately merged so a
    /// non-owner cannot probe for order existence.
    #[error("Order not found")]
    NotFoundOrUnauthorized,
    #[error("Order not found")]
    NotFound,
    #[error("Access denied")]
    Unauthorized,
    #[error("Unknown product {0}")]
    UnknownProduct(Uuid),
    #[error("Insufficient stock for product '{product}'")]
    InsufficientStock { product: String },
    #[error("Storage error: {0}")]
    Storage(String),
}
