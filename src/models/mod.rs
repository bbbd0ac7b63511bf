//! Domain and wire types.

pub mod content;
pub mod jsonrpc;
pub mod schema;
pub mod tool;
