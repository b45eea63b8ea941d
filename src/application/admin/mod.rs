//! Application services for the administrative surface.

pub mod content;
pub mod products;

pub use content::{AdminContentError, AdminContentService};
pub use products::{AdminProductError, AdminProductService};
