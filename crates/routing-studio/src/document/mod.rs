//! Routing document domain types: typed sections, model-id naming, starter template.

pub mod naming;
pub mod serialize;
pub mod template;
pub mod types;

pub use naming::*;
pub use serialize::*;
pub use template::*;
pub use types::*;
