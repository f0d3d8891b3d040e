use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use super::ProductId;

/// Badge and annotation tags attached by the view pipeline.
pub type Annotations = BTreeMap<String, serde_json::Value>;

/// Read-only projection of a [`Product`](super::Product) for clients.
///
/// Built fresh for every read or broadcast and never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// The current (charged) price.
    pub price: Decimal,
    pub base_price: Decimal,
    pub stock: u32,
    pub category: String,
    pub image_reference: Option<String>,
    pub annotations: Annotations,
}
