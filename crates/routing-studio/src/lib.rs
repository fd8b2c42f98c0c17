//! Routing document editing core: schema/parse, integrity validation,
//! rule-based model suggestions, and undo/redo over document snapshots.

pub mod bridge;
pub mod config;
pub mod document;
pub mod editor;
pub mod history;
pub mod mutate;
pub mod schema;
pub mod suggest;
pub mod uiconfig;
pub mod validate;
