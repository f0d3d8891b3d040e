//! Demo: runs a short catalog session end to end with logging.
//!
//! ```bash
//! RUST_LOG=info cargo run
//! CATALOG_DISCOUNT_TIERS="20:10" CATALOG_LOG_FORMAT=json cargo run
//! ```

use catalog_engine::config::CatalogConfig;
use catalog_engine::directory::InMemoryDirectory;
use catalog_engine::lifecycle::{pricing_from, setup_tracing, CatalogSystem};
use catalog_engine::model::{ProductDraft, UserId};
use catalog_engine::recommend::RankingStrategy;
use catalog_engine::views::CategoryTips;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    let config = CatalogConfig::from_env().map_err(|e| e.to_string())?;
    setup_tracing(config.log_format);

    info!(?config, "Starting catalog demo");

    let tips = CategoryTips::new()
        .with("kitchen", "Pairs well with our cast iron range.")
        .with("garden", "Order before spring for best availability.");
    let shopper = UserId(1);
    let directory = InMemoryDirectory::with_users([shopper, UserId(2)]);

    let pricing = pricing_from(&config);
    let system = CatalogSystem::new(config, pricing, Arc::new(tips), Arc::new(directory));
    let service = &system.service;
    let mut updates = service.subscribe();

    let span = tracing::info_span!("stocking");
    let (kettle, hose) = async {
        let kettle = service
            .create_with_image(
                ProductDraft::new("Kettle", "kitchen", Decimal::from(50), 2),
                Some("kettle.png".to_string()),
            )
            .await?;
        let hose = service
            .create_with_image(ProductDraft::new("Hose", "garden", Decimal::from(30), 40), None)
            .await?;
        service.apply_manual_discount(hose.id, Decimal::from(20)).await?;
        Ok::<_, catalog_engine::product_actor::CatalogError>((kettle, hose))
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;

    let span = tracing::info_span!("shopping");
    let outcome = async {
        service.record_purchase(UserId(2), kettle.id, 1).await?;
        service.record_purchase(UserId(2), hose.id, 1).await?;
        service.record_purchase(shopper, kettle.id, 1).await?;
        service.record_purchase(shopper, kettle.id, 1).await
    }
    .instrument(span)
    .await;

    match outcome {
        Ok(()) => info!("All purchases went through"),
        Err(e) => error!(error = %e, "Purchase failed"),
    }

    for strategy in RankingStrategy::ALL {
        service.set_strategy(strategy).await;
        match service.recommend(shopper).await {
            Ok(recommended) => {
                let names: Vec<&str> = recommended.views.iter().map(|v| v.name.as_str()).collect();
                info!(strategy = %recommended.strategy, ?names, "Recommendations");
            }
            Err(e) => error!(error = %e, "Recommendation failed"),
        }
    }

    let categories = service.categories().await.map_err(|e| e.to_string())?;
    info!(?categories, "Categories");

    let mut published = 0;
    while let Ok(publication) = updates.try_recv() {
        published += 1;
        let payload = serde_json::to_string(&publication.message).map_err(|e| e.to_string())?;
        info!(topic = %publication.topic, %payload, "Published");
    }
    info!(published, "Drained live updates");

    drop(updates);
    system.shutdown().await?;

    info!("Demo completed successfully");
    Ok(())
}
