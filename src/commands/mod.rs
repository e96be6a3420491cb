pub mod build;
pub mod inspect;
pub mod validate;

// Re-export command functions for convenience
pub use build::build;
pub use inspect::{extract, list, lookup};
pub use validate::validate;
