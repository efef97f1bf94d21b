//! Message templates.
//!
//! Placeholders look like `{{user}}` or `{{broadcaster.name}}` and resolve
//! against the event payload. Dotted names walk into nested objects.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;
use thiserror::Error;

use super::config::PlaceholderPolicy;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_\-]+(?:\.[A-Za-z0-9_\-]+)*)\s*\}\}").expect("valid regex")
});

/// Template rendering errors (strict policy only).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unresolved placeholders: {}", .0.join(", "))]
    Unresolved(Vec<String>),
}

/// Look up a dotted path in a JSON value.
fn lookup<'a>(payload: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(payload, |value, segment| value.as_object()?.get(segment))
}

/// Text form of a payload value. `null` is present but renders empty.
fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => {
            value.to_string()
        }
    }
}

/// Render a template against an event payload.
pub fn render(
    template: &str,
    payload: &Value,
    policy: PlaceholderPolicy,
) -> Result<String, TemplateError> {
    let mut unresolved = Vec::new();

    let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
        let name = &caps[1];
        lookup(payload, name).map(value_text).unwrap_or_else(|| {
            unresolved.push(name.to_string());
            String::new()
        })
    });

    if policy == PlaceholderPolicy::Strict && !unresolved.is_empty() {
        return Err(TemplateError::Unresolved(unresolved));
    }

    Ok(rendered.into_owned())
}
