//! The `simple` prompt

use serde_json::{Map, Value, json};

use super::messages::RpcError;

pub const SIMPLE_PROMPT: &str = "simple";

/// Entries returned from `prompts/list`
pub fn list() -> Value {
    json!({
        "prompts": [{
            "name": SIMPLE_PROMPT,
            "description": "A simple prompt that can take optional context and topic arguments",
            "arguments": [
                {
                    "name": "context",
                    "description": "Additional context to consider",
                    "required": false
                },
                {
                    "name": "topic",
                    "description": "Specific topic to focus on",
                    "required": false
                }
            ]
        }]
    })
}

fn user_message(text: String) -> Value {
    json!({
        "role": "user",
        "content": { "type": "text", "text": text }
    })
}

/// Render a prompt by name for `prompts/get`
pub fn get(name: &str, arguments: Option<&Map<String, Value>>) -> Result<Value, RpcError> {
    if name != SIMPLE_PROMPT {
        return Err(RpcError::invalid_params(format!("Unknown prompt: {}", name)));
    }

    let argument = |key: &str| {
        arguments
            .and_then(|args| args.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    let mut messages = Vec::new();
    if let Some(context) = argument("context") {
        messages.push(user_message(format!("Here is some relevant context: {}", context)));
    }

    let ask = match argument("topic") {
        Some(topic) => format!("Please help me with the following topic: {}", topic),
        None => "Please help me with whatever questions I may have.".to_string(),
    };
    messages.push(user_message(ask));

    Ok(json!({
        "description": "A simple prompt with optional context and topic arguments",
        "messages": messages
    }))
}
