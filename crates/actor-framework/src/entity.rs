//! # ActorEntity Trait
//!
//! The `ActorEntity` trait is the contract every resource must satisfy to be
//! managed by the generic [`ResourceActor`](crate::ResourceActor). It names the
//! DTOs for creation, update and custom actions, the view reported after a
//! committed write, the injected runtime context and the entity's error type.
//!
//! # Write Hooks
//!
//! `on_create`, `on_update` and `handle_action` always run against a *staged*
//! copy of the entity. The actor only writes the copy back to its store when
//! the hook returns `Ok`, so a failing hook can mutate freely without leaving a
//! half-applied record behind.
//!
//! Once a write is in the store, [`ActorEntity::on_commit`] runs on the stored
//! value. Whatever it returns is handed back to the caller, which makes it the
//! natural place for post-persist side effects (projections, notifications).

use async_trait::async_trait;
use std::fmt::{Debug, Display};

/// Trait that any resource entity must implement to be managed by ResourceActor.
///
/// # Async & Context
/// The hooks are `#[async_trait]` so they can call other actors or external
/// collaborators. `Context` is passed to `run()` rather than `new()`, which
/// lets dependencies be wired after the actor has been constructed.
#[async_trait]
pub trait ActorEntity: Clone + Debug + Send + Sync + 'static {
    /// Identifier assigned by the actor. Built from a monotonically increasing
    /// counter, so identifiers of deleted entities are never handed out again.
    type Id: Ord + Clone + Send + Sync + Display + Debug + From<u64>;

    /// The data required to create a new instance.
    type Create: Send + Sync + Debug;

    /// The data required to update an existing instance.
    type Update: Send + Sync + Debug;

    /// Enum representing resource-specific mutations (e.g. `ReduceStock`).
    type Action: Send + Sync + Debug;

    /// What a committed write reports back to the caller.
    type View: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// The error type for this entity.
    ///
    /// One error enum per actor rather than one per message: every hook
    /// returns the same type, so clients have a single thing to match on.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the full entity from the assigned id and the payload.
    /// Called synchronously before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Runs on the freshly built entity before it is first stored.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Applies an update to the staged copy.
    async fn on_update(
        &mut self,
        update: Self::Update,
        ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Applies a custom action to the staged copy.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Called on the stored value after a create, update or action has been
    /// written. Cannot fail: the write is already durable at this point.
    async fn on_commit(&self, ctx: &Self::Context) -> Self::View;

    /// Called with the removed value after a delete.
    async fn on_removed(&self, _ctx: &Self::Context) {}
}
