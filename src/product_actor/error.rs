//! Error types for the catalog.

use actor_framework::FrameworkError;
use std::fmt::Display;
use thiserror::Error;

use crate::model::{Product, ProductId, UserId};
use crate::pricing::PricingError;

/// What a [`CatalogError::NotFound`] failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    Product(ProductId),
    User(UserId),
}

impl Display for Missing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Missing::Product(id) => write!(f, "product {id}"),
            Missing::User(id) => write!(f, "user {id}"),
        }
    }
}

/// Errors that can occur during catalog operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    /// The product or user does not exist.
    #[error("Not found: {0}")]
    NotFound(Missing),

    /// The requested quantity exceeds the available stock.
    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },

    /// The payload failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A pricing handler touched a field it does not own.
    #[error("Pricing handler violation: {0}")]
    HandlerViolation(String),

    /// The product actor is gone.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

impl CatalogError {
    pub fn product_not_found(id: ProductId) -> Self {
        CatalogError::NotFound(Missing::Product(id))
    }
}

impl From<FrameworkError<Product>> for CatalogError {
    fn from(e: FrameworkError<Product>) -> Self {
        match e {
            FrameworkError::NotFound(id) => CatalogError::product_not_found(id),
            FrameworkError::Entity(inner) => inner,
            closed @ (FrameworkError::ActorClosed | FrameworkError::ActorDropped) => {
                CatalogError::Unavailable(closed.to_string())
            }
        }
    }
}

impl From<PricingError> for CatalogError {
    fn from(e: PricingError) -> Self {
        CatalogError::HandlerViolation(e.to_string())
    }
}
