//! Model Context Protocol surface: protocol types, dispatch, transports.

pub mod http;
pub mod protocol;
pub mod server;
pub mod stdio;
