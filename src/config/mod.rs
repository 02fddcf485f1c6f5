//! Configuration for the `flk` command line
//!
//! Provides types and discovery for `flamekit.toml`.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
