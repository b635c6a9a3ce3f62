//! methodref-core: Shared types, errors and configuration for methodref.

pub mod config;
pub mod error;
pub mod types;

pub use config::*;
pub use error::*;
pub use types::*;
