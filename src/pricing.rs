//! # Pricing Chain
//!
//! Handlers that react to product changes by recomputing the *current* price.
//!
//! The chain is notified after a product is created and after every stock
//! change, always before the write is persisted. A handler may only touch
//! `current_price`. The chain snapshots every other field before each handler
//! runs and compares afterwards:
//!
//! - a handler that changes a guarded field is a **violation**: the product is
//!   restored and the whole operation aborts with
//!   [`CatalogError::HandlerViolation`](crate::product_actor::CatalogError::HandlerViolation);
//! - a handler that returns an error, panics or leaves a negative price is a
//!   **failure**: the product reverts to its pre-notify state, the remaining
//!   handlers are skipped and the operation carries on.
//!
//! Handlers run in attachment order. Price arithmetic is checked, so an
//! overflowing rule fails like any other handler instead of unwinding through
//! the product actor.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt::Debug;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::model::Product;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PricingError {
    /// The handler could not produce a price.
    #[error("Pricing handler `{handler}` failed: {reason}")]
    Failed { handler: String, reason: String },

    /// The handler wrote to a field other than the current price.
    #[error("Pricing handler `{handler}` modified guarded field `{field}`")]
    Violation { handler: String, field: &'static str },
}

/// Reacts to a product change by adjusting its current price.
pub trait PricingHandler: Send + Sync {
    fn name(&self) -> &str;

    fn react(&self, product: &mut Product) -> Result<(), PricingError>;
}

/// Ordered set of pricing handlers.
#[derive(Clone, Default)]
pub struct PricingChain {
    handlers: Vec<Arc<dyn PricingHandler>>,
}

impl Debug for PricingChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.handlers.iter().map(|h| h.name()).collect();
        f.debug_struct("PricingChain").field("handlers", &names).finish()
    }
}

impl PricingChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler. Handlers are notified in the order they are attached.
    pub fn attach(mut self, handler: impl PricingHandler + 'static) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs every handler against `product`.
    ///
    /// Only a guarded-field violation is returned as an error. Handler
    /// failures are logged and leave the product with its pre-notify pricing.
    pub fn notify(&self, product: &mut Product) -> Result<(), PricingError> {
        let before = product.clone();

        for handler in &self.handlers {
            let snapshot = product.clone();
            let outcome = match catch_unwind(AssertUnwindSafe(|| handler.react(product))) {
                Ok(outcome) => outcome,
                Err(_) => {
                    *product = before;
                    error!(product_id = %product.id, handler = handler.name(), "Pricing handler panicked, keeping previous state");
                    return Ok(());
                }
            };

            if let Some(field) = guarded_change(&snapshot, product) {
                let violation = PricingError::Violation {
                    handler: handler.name().to_string(),
                    field,
                };
                *product = before;
                error!(product_id = %product.id, %violation, "Pricing handler violation");
                return Err(violation);
            }

            let failure = match outcome {
                Err(e) => Some(e.to_string()),
                Ok(()) if product.current_price < Decimal::ZERO => {
                    Some(format!("negative price {}", product.current_price))
                }
                Ok(()) => None,
            };

            if let Some(reason) = failure {
                warn!(
                    product_id = %product.id,
                    handler = handler.name(),
                    %reason,
                    "Pricing handler failed, keeping previous price"
                );
                product.current_price = before.current_price;
                return Ok(());
            }

            debug!(product_id = %product.id, handler = handler.name(), price = %product.current_price, "Priced");
        }
        Ok(())
    }
}

/// Returns the first non-price field that differs between the two records.
fn guarded_change(before: &Product, after: &Product) -> Option<&'static str> {
    if before.id != after.id {
        Some("id")
    } else if before.name != after.name {
        Some("name")
    } else if before.description != after.description {
        Some("description")
    } else if before.category != after.category {
        Some("category")
    } else if before.base_price != after.base_price {
        Some("basePrice")
    } else if before.stock != after.stock {
        Some("stock")
    } else if before.image_ref != after.image_ref {
        Some("imageReference")
    } else if before.last_modified != after.last_modified {
        Some("lastModified")
    } else {
        None
    }
}

/// One step of a stock-based discount schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountTier {
    /// Lowest stock level the tier applies to.
    pub min_stock: u32,
    pub percent_off: Decimal,
}

/// Pure `(stock, base price) -> current price` function. `None` means the
/// price could not be computed.
#[derive(Clone)]
pub struct PricingRule {
    name: String,
    rule: Arc<dyn Fn(u32, Decimal) -> Option<Decimal> + Send + Sync>,
}

impl Debug for PricingRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PricingRule").field(&self.name).finish()
    }
}

impl PricingRule {
    pub fn new(
        name: impl Into<String>,
        rule: impl Fn(u32, Decimal) -> Decimal + Send + Sync + 'static,
    ) -> Self {
        Self::checked(name, move |stock, base| Some(rule(stock, base)))
    }

    /// A rule that reports arithmetic overflow as `None`.
    pub fn checked(
        name: impl Into<String>,
        rule: impl Fn(u32, Decimal) -> Option<Decimal> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            rule: Arc::new(rule),
        }
    }

    /// Current price always equals the base price.
    pub fn identity() -> Self {
        Self::new("identity", |_, base| base)
    }

    /// Overstock discount: the tier with the highest `min_stock` not above the
    /// current stock wins. Prices are rounded to cents.
    pub fn tiered(mut tiers: Vec<DiscountTier>) -> Self {
        tiers.sort_by_key(|t| t.min_stock);
        Self::checked("tiered", move |stock, base| {
            match tiers.iter().rev().find(|t| t.min_stock <= stock) {
                Some(tier) => discounted(base, tier.percent_off).map(|price| price.round_dp(2)),
                None => Some(base),
            }
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self, stock: u32, base_price: Decimal) -> Option<Decimal> {
        (self.rule)(stock, base_price)
    }
}

/// `base - base * (percent_off / 100)` at full precision, floored at zero.
/// `None` on overflow.
pub fn discounted(base: Decimal, percent_off: Decimal) -> Option<Decimal> {
    let fraction = percent_off.checked_div(Decimal::ONE_HUNDRED)?;
    let reduction = base.checked_mul(fraction)?;
    Some(base.checked_sub(reduction)?.max(Decimal::ZERO))
}

/// Recomputes the current price from stock and base price with a [`PricingRule`].
#[derive(Debug, Clone)]
pub struct StockPricing {
    rule: PricingRule,
}

impl StockPricing {
    pub fn new(rule: PricingRule) -> Self {
        Self { rule }
    }
}

impl PricingHandler for StockPricing {
    fn name(&self) -> &str {
        "stock-pricing"
    }

    fn react(&self, product: &mut Product) -> Result<(), PricingError> {
        product.current_price = self
            .rule
            .price(product.stock, product.base_price)
            .ok_or_else(|| PricingError::Failed {
                handler: self.rule.name().to_string(),
                reason: format!("price overflow for base {}", product.base_price),
            })?;
        Ok(())
    }
}
