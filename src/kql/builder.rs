//! Query text assembly from `<name>` placeholder templates

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::catalog::QueryEntry;
use crate::error::{GatewayError, Result};

/// Parameter name bound to the `querykql` tool's `parameter` argument
pub const DEFAULT_PARAMETER: &str = "parameter";

/// `<name>` token; group 1 is the name
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([A-Za-z_][A-Za-z0-9_]*)>").expect("placeholder pattern is valid"));

/// Distinct placeholder names in order of first appearance
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for captures in PLACEHOLDER.captures_iter(template) {
        if let Some(name) = captures.get(1).map(|m| m.as_str()) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Substitute placeholders in `template` with their values from `parameters`.
///
/// `<parameter>` must be bound when the template uses it. Any other `<name>`
/// is replaced when bound and kept as literal text otherwise. Values are
/// inserted literally and never rescanned.
pub fn render(template: &str, parameters: &HashMap<String, String>) -> Result<String> {
    if placeholders(template).contains(&DEFAULT_PARAMETER) && !parameters.contains_key(DEFAULT_PARAMETER) {
        return Err(GatewayError::MissingParameter(DEFAULT_PARAMETER.to_string()));
    }

    let rendered = PLACEHOLDER.replace_all(template, |captures: &Captures<'_>| {
        match parameters.get(&captures[1]) {
            Some(value) => value.clone(),
            None => captures[0].to_string(),
        }
    });

    Ok(rendered.into_owned())
}

/// Builds executable query text from catalog query entries
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryBuilder;

impl QueryBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Final query text for `entry` with `parameters` substituted
    pub fn build(&self, entry: &QueryEntry, parameters: &HashMap<String, String>) -> Result<String> {
        render(&entry.query_template, parameters)
    }
}
