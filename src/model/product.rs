//! The authoritative product record.
//!
//! # Actor Framework
//! [`Product`] implements the [`ActorEntity`](actor_framework::ActorEntity) trait,
//! so the product store is a [`ResourceActor`](actor_framework::ResourceActor).
//!
//! See [`Product`] for details on:
//! - Creation parameters ([`NewProduct`])
//! - Edit parameters ([`ProductDraft`])
//! - Stock and discount actions ([`ProductAction`](crate::product_actor::ProductAction))

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::product_actor::CatalogError;

/// Type-safe identifier for Products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductId(pub u64);

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "product_{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    /// Price set by catalog management.
    pub base_price: Decimal,
    /// Price actually charged. Written by the pricing chain or a manual discount.
    pub current_price: Decimal,
    pub stock: u32,
    pub image_ref: Option<String>,
    pub last_modified: DateTime<Utc>,
}

impl Product {
    /// Builds a product from validated fields. The current price starts at
    /// the base price; the pricing chain adjusts it afterwards.
    pub fn new(id: ProductId, fields: ProductFields, image_ref: Option<String>) -> Self {
        Self {
            id,
            name: fields.name,
            description: fields.description,
            category: fields.category,
            base_price: fields.base_price,
            current_price: fields.base_price,
            stock: fields.stock,
            image_ref,
            last_modified: Utc::now(),
        }
    }

    /// Overwrites the catalog-managed fields. Identity and image are kept.
    pub fn apply(&mut self, fields: ProductFields) {
        self.name = fields.name;
        self.description = fields.description;
        self.category = fields.category;
        self.base_price = fields.base_price;
        self.stock = fields.stock;
    }

    pub fn touch(&mut self) {
        self.last_modified = Utc::now();
    }
}

/// Product data as submitted by catalog management.
///
/// Stock is signed here so that a negative value coming off the wire is
/// reported as invalid input rather than failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub base_price: Decimal,
    pub stock: i64,
}

/// A [`ProductDraft`] that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price: Decimal,
    pub stock: u32,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, category: impl Into<String>, base_price: Decimal, stock: i64) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            category: category.into(),
            base_price,
            stock,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn validate(self) -> Result<ProductFields, CatalogError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(CatalogError::InvalidInput("product name must not be blank".into()));
        }
        if self.base_price < Decimal::ZERO {
            return Err(CatalogError::InvalidInput(format!(
                "base price must not be negative, got {}",
                self.base_price
            )));
        }
        let stock = stock_from(self.stock)?;
        Ok(ProductFields {
            name,
            description: self.description,
            category: self.category.trim().to_string(),
            base_price: self.base_price,
            stock,
        })
    }
}

/// Converts a boundary stock value into the domain range.
pub fn stock_from(value: i64) -> Result<u32, CatalogError> {
    u32::try_from(value)
        .map_err(|_| CatalogError::InvalidInput(format!("stock must be between 0 and {}, got {value}", u32::MAX)))
}

/// Create payload: the draft plus the stored image reference.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub draft: ProductDraft,
    pub image_ref: Option<String>,
}
