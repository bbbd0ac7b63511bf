#![forbid(unsafe_code)]

//! Tool-serving runtime: register schema-described tools once and expose
//! them over a synchronous HTTP API and over MCP sessions streamed as SSE.

pub mod config;
pub mod errors;
pub mod mcp;
pub mod models;
pub mod schema;
pub mod tools;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
