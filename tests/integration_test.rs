use catalog_engine::config::CatalogConfig;
use catalog_engine::directory::InMemoryDirectory;
use catalog_engine::lifecycle::{pricing_from, CatalogSystem};
use catalog_engine::model::{Product, ProductDraft, ProductId, UserId};
use catalog_engine::pricing::{DiscountTier, PricingChain, PricingError, PricingHandler, PricingRule, StockPricing};
use catalog_engine::product_actor::{CatalogError, Missing};
use catalog_engine::publish::{CatalogMessage, Publication};
use catalog_engine::recommend::RankingStrategy;
use catalog_engine::views::{CategoryTips, NoTips, AI_TIP, DISCOUNT_PERCENT, LOW_STOCK};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::broadcast::Receiver;

fn start(pricing: PricingChain) -> CatalogSystem {
    let directory = InMemoryDirectory::with_users([UserId(1), UserId(2)]);
    CatalogSystem::new(
        CatalogConfig::default(),
        pricing,
        Arc::new(NoTips),
        Arc::new(directory),
    )
}

fn with_rule(rule: PricingRule) -> CatalogSystem {
    start(PricingChain::new().attach(StockPricing::new(rule)))
}

fn draft(name: &str, category: &str, base: i64, stock: i64) -> ProductDraft {
    ProductDraft::new(name, category, Decimal::from(base), stock)
}

/// Publications are sent before the actor replies, so everything a call
/// published is already queued when it returns.
fn drain(updates: &mut Receiver<Publication>) -> Vec<Publication> {
    let mut published = Vec::new();
    while let Ok(publication) = updates.try_recv() {
        published.push(publication);
    }
    published
}

#[tokio::test]
async fn create_then_set_stock_prices_with_injected_rule() {
    let half_at_one = PricingRule::new("half-at-one", |stock, base| {
        if stock <= 1 {
            base / Decimal::from(2)
        } else {
            base
        }
    });
    let system = with_rule(half_at_one.clone());
    let service = &system.service;
    let mut updates = service.subscribe();

    let created = service.create_with_image(draft("Kettle", "kitchen", 50, 2), None).await.unwrap();
    assert_eq!(Some(created.price), half_at_one.price(2, Decimal::from(50)));
    assert_eq!(drain(&mut updates).len(), 1);

    let updated = service.set_stock(created.id, 1).await.unwrap();
    let published = drain(&mut updates);

    assert_eq!(published.len(), 1);
    assert_eq!(published[0].topic, "/topic/inventory");
    assert_eq!(published[0].message, CatalogMessage::Updated(updated.clone()));
    assert_eq!(updated.stock, 1);
    assert_eq!(Some(updated.price), half_at_one.price(1, Decimal::from(50)));
    assert_eq!(updated.price, Decimal::from(25));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn delete_unknown_id_fails_without_broadcast() {
    let system = with_rule(PricingRule::identity());
    let mut updates = system.service.subscribe();

    let err = system.service.delete(ProductId(42)).await.unwrap_err();

    assert_eq!(err, CatalogError::NotFound(Missing::Product(ProductId(42))));
    assert!(drain(&mut updates).is_empty());
}

#[tokio::test]
async fn delete_publishes_identifier_and_ids_are_not_reused() {
    let system = with_rule(PricingRule::identity());
    let service = &system.service;

    let first = service.create_with_image(draft("Lamp", "home", 20, 3), None).await.unwrap();
    let mut updates = service.subscribe();

    service.delete(first.id).await.unwrap();

    let published = drain(&mut updates);
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].message, CatalogMessage::Deleted { deleted_id: first.id });
    assert_eq!(
        service.view(first.id).await.unwrap_err(),
        CatalogError::NotFound(Missing::Product(first.id))
    );

    let second = service.create_with_image(draft("Lamp", "home", 20, 3), None).await.unwrap();
    assert_ne!(second.id, first.id);
}

#[tokio::test]
async fn reduce_stock_is_all_or_nothing() {
    let system = with_rule(PricingRule::identity());
    let service = &system.service;
    let product = service.create_with_image(draft("Mug", "kitchen", 8, 5), None).await.unwrap();
    let mut updates = service.subscribe();

    service.reduce_stock(product.id, 2).await.unwrap();
    assert_eq!(drain(&mut updates).len(), 1);

    let err = service.reduce_stock(product.id, 4).await.unwrap_err();

    assert_eq!(
        err,
        CatalogError::InsufficientStock {
            requested: 4,
            available: 3
        }
    );
    assert!(drain(&mut updates).is_empty());
    assert_eq!(service.view(product.id).await.unwrap().stock, 3);
}

#[tokio::test]
async fn manual_discount_then_edit_resets_price() {
    let system = with_rule(PricingRule::new("overstock", |stock, base| {
        if stock > 10 {
            base - Decimal::from(10)
        } else {
            base
        }
    }));
    let service = &system.service;
    let product = service.create_with_image(draft("Chair", "office", 100, 20), None).await.unwrap();
    assert_eq!(product.price, Decimal::from(90));

    service.apply_manual_discount(product.id, Decimal::from(20)).await.unwrap();
    let discounted = service.view(product.id).await.unwrap();
    assert_eq!(discounted.price, Decimal::from(80));
    assert_eq!(discounted.annotations[DISCOUNT_PERCENT], serde_json::json!(20));

    let edited = service.edit(product.id, draft("Chair", "office", 120, 20)).await.unwrap();
    assert_eq!(edited.price, edited.base_price);
    assert_eq!(edited.price, Decimal::from(120));
    assert!(!edited.annotations.contains_key(DISCOUNT_PERCENT));
}

#[tokio::test]
async fn invalid_input_is_rejected_before_any_write() {
    let system = with_rule(PricingRule::identity());
    let service = &system.service;
    let product = service.create_with_image(draft("Desk", "office", 100, 2), None).await.unwrap();
    let mut updates = service.subscribe();

    let discount = service.apply_manual_discount(product.id, Decimal::from(150)).await;
    let stock = service.set_stock(product.id, -3).await;
    let create = service.create_with_image(draft(" ", "office", 10, 1), None).await;
    let edit = service.edit(product.id, draft("Desk", "office", -5, 1)).await;

    for result in [discount.map(|_| ()), stock.map(|_| ()), create.map(|_| ()), edit.map(|_| ())] {
        assert!(matches!(result, Err(CatalogError::InvalidInput(_))));
    }
    assert!(drain(&mut updates).is_empty());
    assert_eq!(service.view(product.id).await.unwrap().price, Decimal::from(100));
}

struct RenamesWhenSoldOut;

impl PricingHandler for RenamesWhenSoldOut {
    fn name(&self) -> &str {
        "renames-when-sold-out"
    }

    fn react(&self, product: &mut Product) -> Result<(), PricingError> {
        if product.stock == 0 {
            product.name.push_str(" (sold out)");
        }
        Ok(())
    }
}

struct Offline;

impl PricingHandler for Offline {
    fn name(&self) -> &str {
        "offline"
    }

    fn react(&self, product: &mut Product) -> Result<(), PricingError> {
        product.current_price = Decimal::ONE;
        Err(PricingError::Failed {
            handler: self.name().to_string(),
            reason: "rate feed down".to_string(),
        })
    }
}

#[tokio::test]
async fn handler_violation_aborts_the_write() {
    let system = start(PricingChain::new().attach(RenamesWhenSoldOut));
    let service = &system.service;
    let product = service.create_with_image(draft("Tent", "garden", 70, 3), None).await.unwrap();
    let mut updates = service.subscribe();

    let err = service.set_stock(product.id, 0).await.unwrap_err();

    assert!(matches!(err, CatalogError::HandlerViolation(_)));
    assert!(drain(&mut updates).is_empty());
    let stored = service.view(product.id).await.unwrap();
    assert_eq!(stored.stock, 3);
    assert_eq!(stored.name, "Tent");
}

#[tokio::test]
async fn failing_handler_keeps_previous_price() {
    let system = start(PricingChain::new().attach(Offline));
    let service = &system.service;

    let product = service.create_with_image(draft("Rake", "garden", 15, 9), None).await.unwrap();
    let after = service.set_stock(product.id, 4).await.unwrap();

    assert_eq!(product.price, Decimal::from(15));
    assert_eq!(after.price, Decimal::from(15));
    assert_eq!(after.stock, 4);
}

#[tokio::test]
async fn views_are_decorated_and_idempotent() {
    let tips = CategoryTips::new().with("kitchen", "Hand wash only.");
    let system = CatalogSystem::new(
        CatalogConfig::default(),
        PricingChain::new(),
        Arc::new(tips),
        Arc::new(InMemoryDirectory::new()),
    );
    let service = &system.service;
    let product = service
        .create_with_image(draft("Pan", "Kitchen", 40, 2), Some("pan.png".into()))
        .await
        .unwrap();

    let first = service.view(product.id).await.unwrap();
    let second = service.view(product.id).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first, product);
    assert_eq!(first.annotations[LOW_STOCK], serde_json::json!(true));
    assert_eq!(first.annotations[AI_TIP], serde_json::json!("Hand wash only."));
    assert_eq!(first.image_reference.as_deref(), Some("pan.png"));
}

#[tokio::test]
async fn concurrent_stock_changes_on_one_product_serialize() {
    let system = with_rule(PricingRule::identity());
    let service = system.service.clone();
    let product = service.create_with_image(draft("Pen", "office", 2, 50), None).await.unwrap();
    let mut updates = service.subscribe();
    let id = product.id;

    let tasks: Vec<_> = (0..50)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.reduce_stock(id, 1).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(service.view(product.id).await.unwrap().stock, 0);
    assert_eq!(drain(&mut updates).len(), 50);
    assert!(matches!(
        service.reduce_stock(product.id, 1).await,
        Err(CatalogError::InsufficientStock { .. })
    ));
}

#[tokio::test]
async fn largest_price_survives_discounts_and_tiers() {
    let mut config = CatalogConfig::default();
    config.discount_tiers = vec![DiscountTier {
        min_stock: 0,
        percent_off: Decimal::from(10),
    }];
    let system = CatalogSystem::new(
        config.clone(),
        pricing_from(&config),
        Arc::new(NoTips),
        Arc::new(InMemoryDirectory::new()),
    );
    let service = &system.service;
    let lamp = service.create_with_image(draft("Lamp", "home", 40, 1), None).await.unwrap();

    let vault = service
        .create_with_image(ProductDraft::new("Vault", "luxury", Decimal::MAX, 1), None)
        .await
        .unwrap();
    assert!(vault.price < Decimal::MAX);

    service.apply_manual_discount(vault.id, Decimal::from(20)).await.unwrap();
    let discounted = service.view(vault.id).await.unwrap();
    assert!(discounted.price < vault.base_price);
    assert!(discounted.annotations.contains_key(DISCOUNT_PERCENT));

    assert_eq!(service.view(lamp.id).await.unwrap().price, Decimal::from(36));
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn overflowing_rule_keeps_the_catalog_running() {
    let system = with_rule(PricingRule::new("double", |_, base| base * Decimal::from(2)));
    let service = &system.service;
    let lamp = service.create_with_image(draft("Lamp", "home", 40, 1), None).await.unwrap();

    let vault = service
        .create_with_image(ProductDraft::new("Vault", "luxury", Decimal::MAX, 1), None)
        .await
        .unwrap();

    assert_eq!(vault.price, Decimal::MAX);
    assert_eq!(service.view(lamp.id).await.unwrap().price, Decimal::from(80));
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn zero_mailbox_capacity_still_starts() {
    let config: CatalogConfig = serde_json::from_value(serde_json::json!({ "channelCapacity": 0 })).unwrap();
    let system = CatalogSystem::from_config(config);

    let view = system
        .service
        .create_with_image(draft("Mug", "kitchen", 8, 3), None)
        .await
        .unwrap();

    assert_eq!(system.service.view(view.id).await.unwrap().stock, 3);
    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn recommendations_require_a_known_user() {
    let system = with_rule(PricingRule::identity());
    let service = &system.service;
    service.create_with_image(draft("Ball", "toys", 5, 5), None).await.unwrap();

    let err = service.recommend(UserId(99)).await.unwrap_err();

    assert_eq!(err, CatalogError::NotFound(Missing::User(UserId(99))));
}

#[tokio::test]
async fn recommendations_follow_the_active_strategy() {
    let system = with_rule(PricingRule::identity());
    let service = &system.service;
    let book = service.create_with_image(draft("Book", "books", 20, 10), None).await.unwrap();
    let atlas = service.create_with_image(draft("Atlas", "books", 40, 10), None).await.unwrap();
    let kite = service.create_with_image(draft("Kite", "toys", 30, 10), None).await.unwrap();
    service.apply_manual_discount(kite.id, Decimal::from(50)).await.unwrap();

    service.record_purchase(UserId(2), book.id, 1).await.unwrap();
    service.record_purchase(UserId(2), atlas.id, 1).await.unwrap();
    service.record_purchase(UserId(1), book.id, 2).await.unwrap();
    assert_eq!(service.view(book.id).await.unwrap().stock, 7);

    assert_eq!(service.current_strategy().await, "collaborative-filtering");
    let collaborative = service.recommend(UserId(1)).await.unwrap();
    assert_eq!(collaborative.strategy, RankingStrategy::CollaborativeFiltering);
    assert_eq!(collaborative.views[0].id, atlas.id);
    assert!(collaborative.views.iter().all(|v| v.id != book.id));

    service.set_strategy(RankingStrategy::BestDeals).await;
    assert_eq!(service.current_strategy().await, "best-deals");
    let deals = service.recommend(UserId(1)).await.unwrap();
    assert_eq!(deals.strategy, RankingStrategy::BestDeals);
    assert_eq!(deals.views[0].id, kite.id);
    assert_eq!(deals.views.len(), 3);
}

#[tokio::test]
async fn purchase_by_unknown_user_leaves_stock_alone() {
    let system = with_rule(PricingRule::identity());
    let service = &system.service;
    let product = service.create_with_image(draft("Cap", "apparel", 12, 4), None).await.unwrap();

    let err = service.record_purchase(UserId(7), product.id, 1).await.unwrap_err();

    assert_eq!(err, CatalogError::NotFound(Missing::User(UserId(7))));
    assert_eq!(service.view(product.id).await.unwrap().stock, 4);
}

#[tokio::test]
async fn categories_and_listing() {
    let system = with_rule(PricingRule::identity());
    let service = &system.service;
    for (name, category) in [("Saw", "tools"), ("Drill", "tools"), ("Vase", "home"), ("Rug", "home")] {
        service.create_with_image(draft(name, category, 10, 10), None).await.unwrap();
    }

    assert_eq!(service.categories().await.unwrap(), vec!["home", "tools"]);
    let names: Vec<String> = service
        .all_views()
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.name)
        .collect();
    assert_eq!(names, vec!["Saw", "Drill", "Vase", "Rug"]);
}

#[tokio::test]
async fn shutdown_stops_the_actor() {
    let system = CatalogSystem::from_config(CatalogConfig::default());
    system
        .service
        .create_with_image(draft("Bell", "bikes", 9, 1), None)
        .await
        .unwrap();

    assert!(system.shutdown().await.is_ok());
}
