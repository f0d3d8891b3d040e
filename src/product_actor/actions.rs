//! Custom actions for the Product actor.
//!
//! Stock changes and manual discounts that go beyond a plain edit. They are
//! handled by [`ActorEntity::handle_action`](actor_framework::ActorEntity::handle_action).
//!
//! See [`impl ActorEntity for Product`](crate::model::Product#impl-ActorEntity-for-Product)
//! for the implementation details.

use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub enum ProductAction {
    /// Removes units from stock, e.g. after a purchase.
    ///
    /// # Errors
    /// Fails with `InsufficientStock` if the amount exceeds available stock.
    ReduceStock(u32),
    /// Replaces the stock level outright.
    SetStock(u32),
    /// Sets the current price to the base price less the given percentage.
    /// The pricing chain is not consulted.
    ///
    /// # Errors
    /// Fails with `InvalidInput` if the percentage is outside `0..=100`.
    ApplyDiscount(Decimal),
}
