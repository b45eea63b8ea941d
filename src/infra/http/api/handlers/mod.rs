//! API handlers organized by resource type.

mod content;
mod health;
mod products;

pub use content::*;
pub use health::*;
pub use products::*;
