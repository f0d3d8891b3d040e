//! # Catalog Engine
//!
//! > **Inventory state, dynamic pricing and live catalog views on resource actors.**
//!
//! Products live in a single [`ResourceActor`](actor_framework::ResourceActor).
//! Every write to a product runs to completion inside that actor before the
//! next one starts:
//!
//! ```text
//! mutate -> pricing chain -> persist -> decorate -> publish -> reply
//! ```
//!
//! so two stock changes on the same product can never interleave, and a
//! failed write leaves the stored record untouched.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Data ([`model`])
//! The authoritative [`Product`](model::Product), the boundary
//! [`ProductDraft`](model::ProductDraft) and the client-facing
//! [`ProductView`](model::ProductView).
//!
//! ### 2. The Rules ([`pricing`], [`views`], [`recommend`])
//! - [`PricingChain`](pricing::PricingChain): ordered handlers that may only
//!   touch the current price. The actual discount rule is injected.
//! - [`ViewPipeline`](views::ViewPipeline): badges and tips layered onto a
//!   fresh projection on every read.
//! - [`RecommendationEngine`](recommend::RecommendationEngine): swappable
//!   ranking strategies.
//!
//! ### 3. The Implementation ([`product_actor`])
//! `ActorEntity for Product`: the write template, stock and discount actions,
//! and [`CatalogError`](product_actor::CatalogError).
//!
//! ### 4. The Interface ([`clients`], [`service`])
//! [`ProductClient`](clients::ProductClient) wraps the raw message passing;
//! [`CatalogService`](service::CatalogService) is the façade outer layers call.
//!
//! ### 5. The Orchestrator ([`lifecycle`], [`config`])
//! [`CatalogSystem`](lifecycle::CatalogSystem) spins everything up from a
//! [`CatalogConfig`](config::CatalogConfig) and shuts it down again.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run
//! cargo test
//! ```

pub mod clients;
pub mod config;
pub mod directory;
pub mod lifecycle;
pub mod model;
pub mod pricing;
pub mod product_actor;
pub mod publish;
pub mod recommend;
pub mod service;
pub mod views;
