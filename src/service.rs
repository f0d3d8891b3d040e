//! # Catalog Service
//!
//! The façade the outer layers talk to. Writes are forwarded to the product
//! actor, which runs the whole mutate, price, persist, decorate and publish
//! sequence for one product at a time. Reads project and decorate on the way
//! out. Recommendations validate the shopper, rank the full pool and decorate
//! the result.

use actor_framework::ActorClient;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, instrument};

use crate::clients::ProductClient;
use crate::directory::IdentityDirectory;
use crate::model::{stock_from, NewProduct, ProductDraft, ProductId, ProductView, UserId};
use crate::product_actor::{CatalogError, Missing};
use crate::publish::{BroadcastPublisher, Publication};
use crate::recommend::{RankingStrategy, RecommendationEngine};
use crate::views::ViewPipeline;

/// Decorated recommendations and the strategy that ranked them.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommended {
    pub strategy: RankingStrategy,
    pub views: Vec<ProductView>,
}

#[derive(Clone)]
pub struct CatalogService {
    products: ProductClient,
    views: ViewPipeline,
    engine: Arc<RecommendationEngine>,
    directory: Arc<dyn IdentityDirectory>,
    publisher: BroadcastPublisher,
}

impl CatalogService {
    pub fn new(
        products: ProductClient,
        views: ViewPipeline,
        engine: Arc<RecommendationEngine>,
        directory: Arc<dyn IdentityDirectory>,
        publisher: BroadcastPublisher,
    ) -> Self {
        Self {
            products,
            views,
            engine,
            directory,
            publisher,
        }
    }

    /// Creates a product. `image_ref` is whatever the image store handed back.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_with_image(
        &self,
        draft: ProductDraft,
        image_ref: Option<String>,
    ) -> Result<ProductView, CatalogError> {
        let view = self
            .products
            .create_product(NewProduct { draft, image_ref })
            .await?;
        info!(product_id = %view.id, price = %view.price, "Product created");
        Ok(view)
    }

    /// Replaces the product's data and resets its price to the new base price.
    pub async fn edit(&self, id: ProductId, draft: ProductDraft) -> Result<ProductView, CatalogError> {
        self.products.edit_product(id, draft).await
    }

    pub async fn apply_manual_discount(&self, id: ProductId, percentage: Decimal) -> Result<(), CatalogError> {
        self.products.apply_discount(id, percentage).await?;
        Ok(())
    }

    pub async fn reduce_stock(&self, id: ProductId, quantity: u32) -> Result<(), CatalogError> {
        self.products.reduce_stock(id, quantity).await?;
        Ok(())
    }

    pub async fn set_stock(&self, id: ProductId, new_stock: i64) -> Result<ProductView, CatalogError> {
        let stock = stock_from(new_stock)?;
        self.products.set_stock(id, stock).await
    }

    pub async fn delete(&self, id: ProductId) -> Result<(), CatalogError> {
        self.products.delete(id).await?;
        info!(product_id = %id, "Product deleted");
        Ok(())
    }

    pub async fn view(&self, id: ProductId) -> Result<ProductView, CatalogError> {
        let product = self
            .products
            .get(id)
            .await?
            .ok_or_else(|| CatalogError::product_not_found(id))?;
        Ok(self.views.decorate(&product).await)
    }

    /// Every product, decorated, in id order.
    pub async fn all_views(&self) -> Result<Vec<ProductView>, CatalogError> {
        let products = self.products.list().await?;
        let mut views = Vec::with_capacity(products.len());
        for product in &products {
            views.push(self.views.decorate(product).await);
        }
        Ok(views)
    }

    /// Distinct, non-empty categories in sorted order.
    pub async fn categories(&self) -> Result<Vec<String>, CatalogError> {
        let products = self.products.list().await?;
        let categories: BTreeSet<String> = products
            .into_iter()
            .map(|p| p.category)
            .filter(|c| !c.is_empty())
            .collect();
        Ok(categories.into_iter().collect())
    }

    #[instrument(skip(self))]
    pub async fn recommend(&self, user: UserId) -> Result<Recommended, CatalogError> {
        self.ensure_user(user).await?;
        let pool = self.products.list().await?;
        let ranked = self.engine.recommendations(user, &pool).await;
        let mut views = Vec::with_capacity(ranked.products.len());
        for product in &ranked.products {
            views.push(self.views.decorate(product).await);
        }
        info!(strategy = %ranked.strategy, count = views.len(), "Recommended");
        Ok(Recommended {
            strategy: ranked.strategy,
            views,
        })
    }

    pub async fn current_strategy(&self) -> &'static str {
        self.engine.current_strategy_name().await
    }

    /// Swaps the ranking strategy and returns the one it replaced.
    pub async fn set_strategy(&self, strategy: RankingStrategy) -> RankingStrategy {
        self.engine.set_strategy(strategy).await
    }

    /// Takes `quantity` units out of stock for `user` and remembers the
    /// purchase for future recommendations.
    #[instrument(skip(self))]
    pub async fn record_purchase(&self, user: UserId, product: ProductId, quantity: u32) -> Result<(), CatalogError> {
        self.ensure_user(user).await?;
        self.reduce_stock(product, quantity).await?;
        self.engine.record_interaction(user, product, quantity).await;
        Ok(())
    }

    /// Every change published on the catalog topic from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Publication> {
        self.publisher.subscribe()
    }

    async fn ensure_user(&self, user: UserId) -> Result<(), CatalogError> {
        if self.directory.exists(user).await {
            Ok(())
        } else {
            Err(CatalogError::NotFound(Missing::User(user)))
        }
    }
}
