//! Static sample text resources

use serde_json::{Value, json};

use super::messages::RpcError;

const MIME_TYPE: &str = "text/plain";

/// (name, text) pairs served as `file:///<name>.txt`
const SAMPLES: [(&str, &str); 3] = [
    ("greeting", "Hello! This is a sample text resource."),
    ("help", "This server provides a few sample text resources for testing."),
    ("about", "This is the simple-resource MCP server implementation."),
];

fn uri(name: &str) -> String {
    format!("file:///{}.txt", name)
}

/// Entries returned from `resources/list`
pub fn list() -> Value {
    let resources: Vec<Value> = SAMPLES
        .iter()
        .map(|(name, _)| {
            json!({
                "uri": uri(name),
                "name": name,
                "description": format!("A sample text resource named {}", name),
                "mimeType": MIME_TYPE,
            })
        })
        .collect();
    json!({ "resources": resources })
}

/// Contents for `resources/read`
pub fn read(requested: &str) -> Result<Value, RpcError> {
    let (_, text) = SAMPLES
        .iter()
        .find(|(name, _)| uri(name) == requested)
        .ok_or_else(|| RpcError::invalid_params(format!("Unknown resource: {}", requested)))?;

    Ok(json!({
        "contents": [{
            "uri": requested,
            "mimeType": MIME_TYPE,
            "text": text,
        }]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_resources() {
        let listed = list();
        let uris: Vec<_> = listed["resources"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["uri"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            uris,
            vec!["file:///greeting.txt", "file:///help.txt", "file:///about.txt"]
        );
        assert_eq!(listed["resources"][0]["mimeType"], "text/plain");
        assert_eq!(
            listed["resources"][1]["description"],
            "A sample text resource named help"
        );
    }

    #[test]
    fn test_read_known_resource() {
        let contents = read("file:///greeting.txt").unwrap();
        assert_eq!(
            contents["contents"][0]["text"],
            "Hello! This is a sample text resource."
        );
    }

    #[test]
    fn test_read_unknown_resource() {
        let err = read("file:///missing.txt").unwrap_err();
        assert_eq!(err.code, super::super::messages::ErrorCode::INVALID_PARAMS);
    }
}
