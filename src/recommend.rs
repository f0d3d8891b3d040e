//! # Recommendations
//!
//! Pluggable ranking over the product pool, plus the engine that holds the
//! active strategy and the purchase history it ranks from.
//!
//! Ranking is a pure function of `(user, pool, ledger, limit)`. The result is
//! always a duplicate-free subset of the pool's in-stock products, at most
//! `limit` long, with ties broken by ascending product id.
//!
//! The strategy can be swapped at runtime. A call reads the strategy once when
//! it starts, so it finishes with whatever was active at that moment even if
//! the strategy changes underneath it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::model::{Product, ProductId, UserId};

#[derive(Debug, Clone, Error, PartialEq)]
#[error("Unknown ranking strategy: {0}")]
pub struct UnknownStrategy(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankingStrategy {
    /// Products bought by users whose history overlaps with this user's.
    #[default]
    CollaborativeFiltering,
    /// Products from the categories this user buys most.
    CategoryAffinity,
    /// Deepest current discount first.
    BestDeals,
}

impl RankingStrategy {
    pub const ALL: [RankingStrategy; 3] = [
        RankingStrategy::CollaborativeFiltering,
        RankingStrategy::CategoryAffinity,
        RankingStrategy::BestDeals,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RankingStrategy::CollaborativeFiltering => "collaborative-filtering",
            RankingStrategy::CategoryAffinity => "category-affinity",
            RankingStrategy::BestDeals => "best-deals",
        }
    }

    pub fn rank(
        &self,
        user: UserId,
        pool: &[Product],
        ledger: &InteractionLedger,
        limit: usize,
    ) -> Vec<Product> {
        let mut seen = BTreeSet::new();
        let candidates: Vec<&Product> = pool
            .iter()
            .filter(|p| p.stock > 0 && seen.insert(p.id))
            .collect();

        let mut scored: Vec<(&Product, Score)> = match self {
            RankingStrategy::CollaborativeFiltering => {
                let owned = ledger.items(user);
                let neighbours = ledger.neighbour_scores(user);
                candidates
                    .into_iter()
                    .filter(|p| !owned.contains_key(&p.id))
                    .map(|p| {
                        let score = neighbours.get(&p.id).copied().unwrap_or(0);
                        (p, Score::Counts(score, ledger.popularity(p.id)))
                    })
                    .collect()
            }
            RankingStrategy::CategoryAffinity => {
                let owned = ledger.items(user);
                let affinity = category_affinity(owned, pool);
                candidates
                    .into_iter()
                    .filter(|p| !owned.contains_key(&p.id))
                    .map(|p| {
                        let score = affinity.get(p.category.as_str()).copied().unwrap_or(0);
                        (p, Score::Counts(score, ledger.popularity(p.id)))
                    })
                    .collect()
            }
            RankingStrategy::BestDeals => candidates
                .into_iter()
                .map(|p| (p, Score::Saving(p.base_price - p.current_price)))
                .collect(),
        };

        scored.sort_by(|(a, sa), (b, sb)| sb.cmp(sa).then(a.id.cmp(&b.id)));
        scored
            .into_iter()
            .take(limit)
            .map(|(p, _)| p.clone())
            .collect()
    }
}

/// Ranking key: higher sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Score {
    Counts(u64, u64),
    Saving(Decimal),
}

fn category_affinity<'a>(
    owned: &BTreeMap<ProductId, u64>,
    pool: &'a [Product],
) -> BTreeMap<&'a str, u64> {
    let mut affinity = BTreeMap::new();
    for product in pool {
        if let Some(count) = owned.get(&product.id) {
            *affinity.entry(product.category.as_str()).or_insert(0) += count;
        }
    }
    affinity
}

impl Display for RankingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RankingStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|strategy| {
                strategy.name() == wanted
                    || (wanted == "collaborative" && *strategy == Self::CollaborativeFiltering)
            })
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}

/// Purchase history: per user, units bought per product.
#[derive(Debug, Clone, Default)]
pub struct InteractionLedger {
    entries: BTreeMap<UserId, BTreeMap<ProductId, u64>>,
}

static NO_ITEMS: BTreeMap<ProductId, u64> = BTreeMap::new();

impl InteractionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, user: UserId, product: ProductId, quantity: u32) {
        *self
            .entries
            .entry(user)
            .or_default()
            .entry(product)
            .or_insert(0) += u64::from(quantity.max(1));
    }

    pub fn items(&self, user: UserId) -> &BTreeMap<ProductId, u64> {
        self.entries.get(&user).unwrap_or(&NO_ITEMS)
    }

    /// Total units of `product` bought across all users.
    pub fn popularity(&self, product: ProductId) -> u64 {
        self.entries
            .values()
            .filter_map(|items| items.get(&product))
            .sum()
    }

    /// For each product bought by a user who shares history with `user`,
    /// the summed overlap of those users.
    fn neighbour_scores(&self, user: UserId) -> BTreeMap<ProductId, u64> {
        let mine = self.items(user);
        let mut scores = BTreeMap::new();
        if mine.is_empty() {
            return scores;
        }
        for (other, theirs) in &self.entries {
            if *other == user {
                continue;
            }
            let overlap = theirs.keys().filter(|id| mine.contains_key(*id)).count() as u64;
            if overlap == 0 {
                continue;
            }
            for id in theirs.keys() {
                *scores.entry(*id).or_insert(0) += overlap;
            }
        }
        scores
    }
}

/// A ranked result and the strategy that produced it.
#[derive(Debug, Clone)]
pub struct Recommendations {
    pub strategy: RankingStrategy,
    pub products: Vec<Product>,
}

/// Holds the active [`RankingStrategy`] and the [`InteractionLedger`].
#[derive(Debug)]
pub struct RecommendationEngine {
    strategy: RwLock<RankingStrategy>,
    ledger: RwLock<InteractionLedger>,
    limit: usize,
}

impl RecommendationEngine {
    pub fn new(strategy: RankingStrategy, limit: usize) -> Self {
        Self {
            strategy: RwLock::new(strategy),
            ledger: RwLock::new(InteractionLedger::new()),
            limit,
        }
    }

    pub async fn strategy(&self) -> RankingStrategy {
        *self.strategy.read().await
    }

    pub async fn current_strategy_name(&self) -> &'static str {
        self.strategy().await.name()
    }

    /// Swaps the active strategy and returns the previous one.
    pub async fn set_strategy(&self, strategy: RankingStrategy) -> RankingStrategy {
        let previous = std::mem::replace(&mut *self.strategy.write().await, strategy);
        info!(from = %previous, to = %strategy, "Ranking strategy changed");
        previous
    }

    pub async fn record_interaction(&self, user: UserId, product: ProductId, quantity: u32) {
        self.ledger.write().await.record(user, product, quantity);
        debug!(%user, %product, quantity, "Interaction recorded");
    }

    pub async fn recommendations(&self, user: UserId, pool: &[Product]) -> Recommendations {
        let strategy = self.strategy().await;
        let ledger = self.ledger.read().await;
        let products = strategy.rank(user, pool, &ledger, self.limit);
        debug!(%user, %strategy, count = products.len(), "Ranked");
        Recommendations { strategy, products }
    }
}
