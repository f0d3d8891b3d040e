//! ActorEntity trait implementation for the Product domain type.
//!
//! This module contains the [`ActorEntity`] implementation that lets
//! [`Product`] be managed by the generic
//! [`ResourceActor`](actor_framework::ResourceActor).
//!
//! Each write follows the same order inside the actor:
//! mutate the staged copy, notify the pricing chain where the operation calls
//! for it, persist, decorate, publish. The actor processes one request at a
//! time, so no two writes to a product interleave.

use actor_framework::ActorEntity;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::{CatalogContext, CatalogError, ProductAction};
use crate::model::{NewProduct, Product, ProductDraft, ProductId, ProductView};
use crate::pricing::discounted;
use crate::publish::CatalogMessage;

#[async_trait]
impl ActorEntity for Product {
    type Id = ProductId;
    type Create = NewProduct;
    type Update = ProductDraft;
    type Action = ProductAction;
    type View = ProductView;
    type Context = CatalogContext;
    type Error = CatalogError;

    /// Validates the draft and builds the record with `current_price = base_price`.
    fn from_create_params(id: ProductId, params: NewProduct) -> Result<Self, CatalogError> {
        let fields = params.draft.validate()?;
        Ok(Self::new(id, fields, params.image_ref))
    }

    /// Lets the pricing chain set the opening price.
    async fn on_create(&mut self, ctx: &CatalogContext) -> Result<(), CatalogError> {
        ctx.pricing.notify(self)?;
        Ok(())
    }

    /// Replaces the catalog-managed fields and resets the current price to the
    /// new base price. The pricing chain is not consulted for edits.
    async fn on_update(&mut self, draft: ProductDraft, _ctx: &CatalogContext) -> Result<(), CatalogError> {
        let fields = draft.validate()?;
        self.apply(fields);
        self.current_price = self.base_price;
        self.touch();
        Ok(())
    }

    /// Handles stock changes and manual discounts.
    ///
    /// # Actions
    /// - `ReduceStock`: decrements stock if available, then reprices
    /// - `SetStock`: overwrites stock, then reprices
    /// - `ApplyDiscount`: sets the current price directly
    async fn handle_action(&mut self, action: ProductAction, ctx: &CatalogContext) -> Result<(), CatalogError> {
        match action {
            ProductAction::ReduceStock(quantity) => {
                if quantity > self.stock {
                    return Err(CatalogError::InsufficientStock {
                        requested: quantity,
                        available: self.stock,
                    });
                }
                self.stock -= quantity;
                self.touch();
                ctx.pricing.notify(self)?;
            }
            ProductAction::SetStock(stock) => {
                self.stock = stock;
                self.touch();
                ctx.pricing.notify(self)?;
            }
            ProductAction::ApplyDiscount(percentage) => {
                if percentage < Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
                    return Err(CatalogError::InvalidInput(format!(
                        "discount percentage must be within 0..=100, got {percentage}"
                    )));
                }
                self.current_price = discounted(self.base_price, percentage).ok_or_else(|| {
                    CatalogError::InvalidInput(format!(
                        "a {percentage}% discount on {} is out of range",
                        self.base_price
                    ))
                })?;
                self.touch();
            }
        }
        Ok(())
    }

    /// Decorates the stored record and announces it.
    async fn on_commit(&self, ctx: &CatalogContext) -> ProductView {
        let view = ctx.views.decorate(self).await;
        match ctx.publisher.publish(&ctx.topic, CatalogMessage::Updated(view.clone())) {
            Ok(()) => debug!(product_id = %self.id, "Change published"),
            Err(e) => warn!(product_id = %self.id, error = %e, "Change publish failed"),
        }
        view
    }

    async fn on_removed(&self, ctx: &CatalogContext) {
        let message = CatalogMessage::Deleted { deleted_id: self.id };
        if let Err(e) = ctx.publisher.publish(&ctx.topic, message) {
            warn!(product_id = %self.id, error = %e, "Deletion publish failed");
        }
    }
}
