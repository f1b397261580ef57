//! Protocol host - JSON-RPC over stdio exposing the tool router

mod messages;
mod prompts;
mod resources;
mod server;

pub use messages::{ErrorCode, JSONRPC_VERSION, Methods, RpcError, RpcRequest, RpcResponse};
pub use server::{McpServer, PROTOCOL_VERSION, SERVER_NAME};
