//! HTTP API: server, response types, and the SSE log stream.

pub mod logs;
pub mod server;
pub mod types;
