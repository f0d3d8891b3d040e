//! Catalog data: the authoritative [`Product`] record, the boundary DTOs that
//! feed it and the client-facing [`ProductView`] projection.

pub mod product;
pub mod user;
pub mod view;

pub use product::*;
pub use user::*;
pub use view::*;
