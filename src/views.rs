//! # View Pipeline
//!
//! Builds the client-facing [`ProductView`] for a [`Product`] and runs it
//! through an ordered list of decoration stages.
//!
//! Stages only ever see the projected view by shared reference and write into
//! the annotation map, so decoration cannot change the authoritative fields.
//! Every read starts from a fresh projection, which keeps decoration
//! idempotent.
//!
//! The standard pipeline runs:
//! 1. [`LowStockBadge`]: `lowStock` plus a "Low Stock" badge under a threshold
//! 2. [`DiscountBadge`]: `discountPercent` plus a "Mega Deal" badge when discounted
//! 3. [`GeneratedTip`]: an `aiTip` from a [`TipGenerator`], always last

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{Annotations, Product, ProductView};

pub const LOW_STOCK: &str = "lowStock";
pub const DISCOUNT_PERCENT: &str = "discountPercent";
pub const AI_TIP: &str = "aiTip";
pub const BADGES: &str = "badges";

/// Projects the authoritative record into a view with no annotations.
pub fn project(product: &Product) -> ProductView {
    ProductView {
        id: product.id,
        name: product.name.clone(),
        description: product.description.clone(),
        price: product.current_price,
        base_price: product.base_price,
        stock: product.stock,
        category: product.category.clone(),
        image_reference: product.image_ref.clone(),
        annotations: Annotations::new(),
    }
}

/// A single decoration step.
#[async_trait]
pub trait ViewStage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn annotate(&self, view: &ProductView, tags: &mut Annotations);
}

/// Appends `badge` to the `badges` list, creating it if needed.
fn push_badge(tags: &mut Annotations, badge: &str) {
    let entry = tags
        .entry(BADGES.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(badges) = entry {
        if !badges.iter().any(|b| b == badge) {
            badges.push(Value::from(badge));
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LowStockBadge {
    pub threshold: u32,
}

#[async_trait]
impl ViewStage for LowStockBadge {
    fn name(&self) -> &'static str {
        "low-stock"
    }

    async fn annotate(&self, view: &ProductView, tags: &mut Annotations) {
        if view.stock < self.threshold {
            tags.insert(LOW_STOCK.to_string(), Value::Bool(true));
            push_badge(tags, "Low Stock");
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DiscountBadge;

impl DiscountBadge {
    const SMALLEST: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

    /// Discount of `price` against `base` in percent, to two decimal places.
    /// Any discount at all reports at least 0.01.
    pub fn percent(base: Decimal, price: Decimal) -> Option<Decimal> {
        if base <= Decimal::ZERO || price >= base {
            return None;
        }
        let ratio = base.checked_sub(price)?.checked_div(base)?;
        let pct = ratio.checked_mul(Decimal::ONE_HUNDRED)?.round_dp(2);
        Some(pct.max(Self::SMALLEST).normalize())
    }
}

/// Whole percentages serialize as integers, fractional ones as floats.
fn percent_value(pct: Decimal) -> Value {
    if pct.fract().is_zero() {
        if let Some(whole) = pct.to_u64() {
            return Value::from(whole);
        }
    }
    pct.to_f64().map(Value::from).unwrap_or(Value::Null)
}

#[async_trait]
impl ViewStage for DiscountBadge {
    fn name(&self) -> &'static str {
        "discount"
    }

    async fn annotate(&self, view: &ProductView, tags: &mut Annotations) {
        if let Some(pct) = Self::percent(view.base_price, view.price) {
            tags.insert(DISCOUNT_PERCENT.to_string(), percent_value(pct));
            push_badge(tags, "Mega Deal");
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TipError {
    #[error("Tip generator unavailable: {0}")]
    Unavailable(String),
}

/// Produces a short shopping tip for a view.
#[async_trait]
pub trait TipGenerator: Send + Sync {
    async fn generate_tip(&self, view: &ProductView) -> Result<Option<String>, TipError>;
}

/// Generator that never has anything to say.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTips;

#[async_trait]
impl TipGenerator for NoTips {
    async fn generate_tip(&self, _view: &ProductView) -> Result<Option<String>, TipError> {
        Ok(None)
    }
}

/// Canned tips keyed by category, matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct CategoryTips {
    tips: HashMap<String, String>,
}

impl CategoryTips {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, category: &str, tip: impl Into<String>) -> Self {
        self.tips.insert(category.to_lowercase(), tip.into());
        self
    }
}

#[async_trait]
impl TipGenerator for CategoryTips {
    async fn generate_tip(&self, view: &ProductView) -> Result<Option<String>, TipError> {
        Ok(self.tips.get(&view.category.to_lowercase()).cloned())
    }
}

/// Adds an `aiTip` annotation. Generator failures only cost the tip.
#[derive(Clone)]
pub struct GeneratedTip {
    generator: Arc<dyn TipGenerator>,
}

impl GeneratedTip {
    pub fn new(generator: Arc<dyn TipGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl ViewStage for GeneratedTip {
    fn name(&self) -> &'static str {
        "tip"
    }

    /// The generator runs on its own task so a panic only loses the tip.
    async fn annotate(&self, view: &ProductView, tags: &mut Annotations) {
        let generator = Arc::clone(&self.generator);
        let snapshot = view.clone();
        let outcome = tokio::spawn(async move { generator.generate_tip(&snapshot).await }).await;
        match outcome {
            Ok(Ok(Some(tip))) => {
                tags.insert(AI_TIP.to_string(), Value::String(tip));
            }
            Ok(Ok(None)) => {}
            Ok(Err(e)) => warn!(product_id = %view.id, error = %e, "Tip generation failed"),
            Err(e) => warn!(product_id = %view.id, error = %e, "Tip generator crashed"),
        }
    }
}

/// Ordered decoration stages applied to every outgoing view.
#[derive(Clone, Default)]
pub struct ViewPipeline {
    stages: Vec<Arc<dyn ViewStage>>,
}

impl Debug for ViewPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.stages.iter().map(|s| s.name()).collect();
        f.debug_struct("ViewPipeline").field("stages", &names).finish()
    }
}

impl ViewPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Low-stock badge, discount badge, then the tip.
    pub fn standard(low_stock_threshold: u32, tips: Arc<dyn TipGenerator>) -> Self {
        Self::new()
            .then_stage(LowStockBadge {
                threshold: low_stock_threshold,
            })
            .then_stage(DiscountBadge)
            .then_stage(GeneratedTip::new(tips))
    }

    pub fn then_stage(mut self, stage: impl ViewStage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    pub async fn decorate(&self, product: &Product) -> ProductView {
        let mut view = project(product);
        for stage in &self.stages {
            let mut tags = view.annotations.clone();
            stage.annotate(&view, &mut tags).await;
            view.annotations = tags;
        }
        debug!(product_id = %view.id, tags = view.annotations.len(), "Decorated");
        view
    }
}
