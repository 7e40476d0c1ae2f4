//! Placeholder expansion.
//!
//! Two syntaxes are supported:
//! * `${VAR}` / `${VAR:-default}` is replaced from the process environment
//!   when a suite file is loaded. Unknown variables without a default are
//!   left untouched.
//! * `{{name}}` is replaced at request time from values captured by earlier
//!   checks. Unknown names are an error.

use crate::utils::error::{ProbeError, Result};
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").expect("env var pattern")
});

static CAPTURE_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_.\-]+)\s*\}\}").expect("capture pattern"));

static WHOLE_CAPTURE_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\{\{\s*([A-Za-z0-9_.\-]+)\s*\}\}$").expect("whole capture pattern")
});

pub fn substitute_env_vars(content: &str) -> String {
    ENV_VAR
        .replace_all(content, |caps: &Captures| {
            let var_name = &caps[1];
            match (std::env::var(var_name), caps.get(2)) {
                (Ok(value), _) => value,
                (Err(_), Some(default)) => default.as_str().to_string(),
                (Err(_), None) => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Text form of a captured value when it is spliced into a string.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn render_str(template: &str, vars: &HashMap<String, Value>) -> Result<String> {
    let mut missing = Vec::new();
    let rendered = CAPTURE_VAR.replace_all(template, |caps: &Captures| {
        let name = &caps[1];
        match vars.get(name) {
            Some(value) => value_to_text(value),
            None => {
                missing.push(name.to_string());
                caps[0].to_string()
            }
        }
    });

    if !missing.is_empty() {
        return Err(ProbeError::TemplateError {
            message: format!("Unresolved variable(s): {}", missing.join(", ")),
        });
    }

    Ok(rendered.into_owned())
}

/// Renders every string inside a JSON document. A string that consists of a
/// single `{{name}}` is replaced by the captured value itself, keeping its
/// JSON type.
pub fn render_value(value: &Value, vars: &HashMap<String, Value>) -> Result<Value> {
    match value {
        Value::String(s) => {
            if let Some(caps) = WHOLE_CAPTURE_VAR.captures(s) {
                let name = &caps[1];
                return vars.get(name).cloned().ok_or_else(|| ProbeError::TemplateError {
                    message: format!("Unresolved variable(s): {}", name),
                });
            }
            Ok(Value::String(render_str(s, vars)?))
        }
        Value::Array(items) => items
            .iter()
            .map(|item| render_value(item, vars))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut rendered = serde_json::Map::with_capacity(map.len());
            for (key, item) in map {
                rendered.insert(key.clone(), render_value(item, vars)?);
            }
            Ok(Value::Object(rendered))
        }
        other => Ok(other.clone()),
    }
}
