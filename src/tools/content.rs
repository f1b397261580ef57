//! Typed tool response payloads

use serde::{Deserialize, Serialize};

/// One unit of a tool call's response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Text payload of the block
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text { text } => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_block_wire_shape() {
        let value = serde_json::to_value(ContentBlock::text("5")).unwrap();
        assert_eq!(value, json!({"type": "text", "text": "5"}));
    }

    #[test]
    fn test_text_block_parses() {
        let block: ContentBlock = serde_json::from_value(json!({"type": "text", "text": "hi"})).unwrap();
        assert_eq!(block.as_text(), "hi");
    }

    #[test]
    fn test_unknown_block_type_rejected() {
        let result = serde_json::from_value::<ContentBlock>(json!({"type": "audio", "data": ""}));
        assert!(result.is_err());
    }
}
