// MCP surface: JSON-RPC protocol types, the tool dispatcher and the
// encrypted wallet session it persists.
pub mod encryption;
pub mod handler;
pub mod protocol;
pub mod session_store;
pub mod tools;
