//! kqlgate - a tool-invocation gateway for catalog-driven KQL queries
//!
//! Callers name a tool and pass JSON arguments; the gateway resolves schema and
//! query definitions from a JSON catalog, renders parameterized KQL, and returns
//! text content blocks. A JSON-RPC stdio host exposes the tools to clients.

pub mod catalog;
pub mod config;
pub mod error;
pub mod fetch;
pub mod kql;
pub mod mcp;
pub mod tools;

pub use error::{GatewayError, Result};
