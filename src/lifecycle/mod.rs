//! Runtime orchestration and lifecycle management.
//!
//! - [`CatalogSystem`] spawns the product actor, injects its collaborators and
//!   hands out the [`CatalogService`](crate::service::CatalogService)
//! - [`setup_tracing`] initializes logging

pub mod catalog_system;
pub mod tracing;

pub use catalog_system::*;
pub use self::tracing::*;
