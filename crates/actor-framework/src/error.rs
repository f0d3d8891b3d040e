//! # Framework Errors
//!
//! Errors raised by the actor runtime itself, plus the entity's own error
//! carried through unchanged so clients can match on it.

use crate::entity::ActorEntity;

/// Errors that can occur while talking to a [`ResourceActor`](crate::ResourceActor).
///
/// The type is generic over the entity so that both the identifier of a
/// missing item and the entity's domain error keep their concrete types on
/// the way back to the caller.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError<T: ActorEntity> {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(T::Id),
    #[error("Entity error: {0}")]
    Entity(#[source] T::Error),
}
