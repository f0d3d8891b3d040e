use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::model::{NewProduct, Product, ProductDraft, ProductId, ProductView};
use crate::product_actor::{CatalogError, ProductAction};

/// Client for interacting with the Product actor.
///
/// Every write returns the decorated view of the committed record, the same
/// view that was published to subscribers.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl ProductClient {
    pub fn new(inner: ResourceClient<Product>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, product), fields(name = %product.draft.name))]
    pub async fn create_product(&self, product: NewProduct) -> Result<ProductView, CatalogError> {
        debug!(?product, "create_product called");
        self.inner.create(product).await.map_err(Self::map_error)
    }

    #[instrument(skip(self, draft))]
    pub async fn edit_product(&self, id: ProductId, draft: ProductDraft) -> Result<ProductView, CatalogError> {
        debug!(?draft, "Sending request");
        self.inner.update(id, draft).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn reduce_stock(&self, id: ProductId, quantity: u32) -> Result<ProductView, CatalogError> {
        self.act(id, ProductAction::ReduceStock(quantity)).await
    }

    #[instrument(skip(self))]
    pub async fn set_stock(&self, id: ProductId, stock: u32) -> Result<ProductView, CatalogError> {
        self.act(id, ProductAction::SetStock(stock)).await
    }

    #[instrument(skip(self))]
    pub async fn apply_discount(&self, id: ProductId, percentage: Decimal) -> Result<ProductView, CatalogError> {
        self.act(id, ProductAction::ApplyDiscount(percentage)).await
    }

    async fn act(&self, id: ProductId, action: ProductAction) -> Result<ProductView, CatalogError> {
        debug!("Sending request");
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<Product> for ProductClient {
    type Error = CatalogError;

    fn inner(&self) -> &ResourceClient<Product> {
        &self.inner
    }

    fn map_error(e: FrameworkError<Product>) -> Self::Error {
        CatalogError::from(e)
    }
}
