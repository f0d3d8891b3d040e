//! # Generic Messages
//!
//! The request enum exchanged between [`ResourceClient`](crate::ResourceClient)
//! and [`ResourceActor`](crate::ResourceActor).

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use tokio::sync::oneshot;

/// One-shot response channel used by actors.
pub type Response<T, R> = oneshot::Sender<Result<R, FrameworkError<T>>>;

/// Request sent to the actor.
///
/// The variants are the lifecycle operations every keyed resource supports:
/// create, read one, read all, update, delete, plus `Action` for
/// resource-specific mutations. Writes answer with the entity's
/// [`View`](ActorEntity::View) as produced by `on_commit`.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T, T::View>,
    },
    Get {
        id: T::Id,
        respond_to: Response<T, Option<T>>,
    },
    List {
        respond_to: Response<T, Vec<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T, T::View>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<T, ()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T, T::View>,
    },
}
