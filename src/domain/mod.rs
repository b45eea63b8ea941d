pub mod documents;
pub mod entities;
pub mod error;
pub mod products;
pub mod validation;
