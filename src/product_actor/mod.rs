//! Product-specific resource logic: the pricing-aware write path, stock
//! actions and change publication.

mod actions;
mod context;
pub mod entity;
pub mod error;

pub use actions::*;
pub use context::*;
pub use error::*;

use crate::clients::ProductClient;
use actor_framework::ResourceActor;
use crate::model::Product;

/// Creates a new Product actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Product>, ProductClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    let client = ProductClient::new(generic_client);

    (actor, client)
}
