use std::sync::Arc;
use tracing::{error, info};

use crate::config::CatalogConfig;
use crate::directory::{IdentityDirectory, InMemoryDirectory};
use crate::pricing::{PricingChain, PricingRule, StockPricing};
use crate::product_actor::CatalogContext;
use crate::publish::BroadcastPublisher;
use crate::recommend::RecommendationEngine;
use crate::service::CatalogService;
use crate::views::{NoTips, TipGenerator, ViewPipeline};

/// Owns the running catalog.
///
/// `CatalogSystem` is responsible for:
/// - **Lifecycle Management**: starting the product actor and stopping it again
/// - **Dependency Wiring**: handing the pricing chain, view pipeline and
///   publisher to the actor as its run context
///
/// # Example
///
/// ```ignore
/// let system = CatalogSystem::from_config(CatalogConfig::default());
///
/// let view = system.service.create_with_image(draft, None).await?;
/// system.service.set_stock(view.id, 1).await?;
///
/// system.shutdown().await?;
/// ```
pub struct CatalogSystem {
    pub service: CatalogService,
    handle: tokio::task::JoinHandle<()>,
}

impl CatalogSystem {
    /// Spawns the product actor. Must be called from inside a Tokio runtime.
    pub fn new(
        config: CatalogConfig,
        pricing: PricingChain,
        tips: Arc<dyn TipGenerator>,
        directory: Arc<dyn IdentityDirectory>,
    ) -> Self {
        let (product_actor, products) = crate::product_actor::new(config.channel_capacity.max(1));
        let publisher = BroadcastPublisher::new(config.broadcast_capacity);
        let views = ViewPipeline::standard(config.low_stock_threshold, tips);

        info!(?pricing, ?views, topic = %config.topic, "Starting catalog");
        let handle = tokio::spawn(product_actor.run(CatalogContext {
            pricing,
            views: views.clone(),
            publisher: Arc::new(publisher.clone()),
            topic: config.topic.clone(),
        }));

        let engine = Arc::new(RecommendationEngine::new(
            config.initial_strategy,
            config.max_recommendations,
        ));
        let service = CatalogService::new(products, views, engine, directory, publisher);

        Self { service, handle }
    }

    /// Wires the catalog from configuration alone: tiered stock pricing from
    /// `discount_tiers`, no tips and an empty user directory.
    pub fn from_config(config: CatalogConfig) -> Self {
        let pricing = pricing_from(&config);
        Self::new(config, pricing, Arc::new(NoTips), Arc::new(InMemoryDirectory::new()))
    }

    /// Gracefully shuts down the catalog.
    ///
    /// Drops the service, which closes the actor's mailbox once no clones of
    /// the service remain, then waits for the actor task to drain and exit.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down catalog...");
        drop(self.service);

        if let Err(e) = self.handle.await {
            error!("Actor task failed: {:?}", e);
            return Err(format!("Actor task failed: {:?}", e));
        }

        info!("Catalog shutdown complete.");
        Ok(())
    }
}

/// The pricing chain described by `config`.
pub fn pricing_from(config: &CatalogConfig) -> PricingChain {
    let rule = if config.discount_tiers.is_empty() {
        PricingRule::identity()
    } else {
        PricingRule::tiered(config.discount_tiers.clone())
    };
    PricingChain::new().attach(StockPricing::new(rule))
}
