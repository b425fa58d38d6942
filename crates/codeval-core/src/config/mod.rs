//! Run configuration: console credentials, sandbox endpoint, model selection
//! and evaluation options.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::*;
