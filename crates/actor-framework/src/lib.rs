//! # Actor Framework
//!
//! Building blocks for type-safe, single-writer resource actors on Tokio. The
//! pattern pairs a **Resource-Oriented** request set (create, read, update,
//! delete, plus custom actions) with the **Actor Model**: each resource type is
//! owned by one task that processes requests sequentially.
//!
//! ## Architecture Overview
//!
//! 1. **Entity Layer** ([`ActorEntity`]) - the resource's business logic and hooks
//! 2. **Runtime Layer** ([`ResourceActor`]) - message processing and the keyed store
//! 3. **Interface Layer** ([`ResourceClient`], [`ActorClient`]) - typed async calls
//!
//! ## Write Semantics
//!
//! Mutating hooks run on a staged clone of the stored entity. The clone
//! replaces the stored value only when the hook succeeds, so a failed
//! request never leaves a partial write behind. After the write, the entity's
//! [`on_commit`](ActorEntity::on_commit) hook turns the stored value into the
//! [`View`](ActorEntity::View) returned to the caller.
//!
//! ## Context Injection
//!
//! Dependencies are injected at **runtime** via `run(context)`, not at
//! construction time:
//!
//! ```rust,ignore
//! let (actor, client) = ResourceActor::<Product>::new(32);
//! let handle = tokio::spawn(actor.run(CatalogContext { pricing, views, publisher }));
//! ```
//!
//! ## Concurrency Model
//!
//! - Each actor runs in its own Tokio task
//! - Messages are processed **sequentially** within an actor (no locks)
//! - Independent actors run in **parallel**
//! - Dropping every client closes the mailbox and ends the run loop
//!
//! ## Testing
//!
//! The [`mock`] module provides scripted clients for testing code around a
//! [`ResourceClient`] without spawning an actor.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;

pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response};
