//! UI config sidecar: metric slider definitions and per-class metadata/rules.

pub mod default;
pub mod store;
pub mod types;

pub use default::*;
pub use store::*;
pub use types::*;
