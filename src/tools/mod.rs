//! Tool System - descriptors, content blocks, and routing

mod content;
mod definition;
pub mod math;
mod router;

pub use content::ContentBlock;
pub use definition::{ToolDescriptor, ToolName, advertised};
pub use router::{ToolDispatcher, ToolRouter, require};
