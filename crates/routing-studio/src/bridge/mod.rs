//! Host bridge: message types, session mapping and the stdio loop.

pub mod protocol;
pub mod session;
pub mod stdio;

pub use protocol::*;
pub use session::*;
pub use stdio::run;
