use crate::config::suite_config::AssertSpec;
use crate::utils::error::ProbeError;
use crate::utils::template::value_to_text;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Object,
    Array,
    String,
    Number,
    Bool,
    Null,
}

impl JsonKind {
    fn parse(kind: &str) -> Option<Self> {
        match kind {
            "object" => Some(JsonKind::Object),
            "array" => Some(JsonKind::Array),
            "string" => Some(JsonKind::String),
            "number" => Some(JsonKind::Number),
            "bool" | "boolean" => Some(JsonKind::Bool),
            "null" => Some(JsonKind::Null),
            _ => None,
        }
    }

    fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => JsonKind::Object,
            Value::Array(_) => JsonKind::Array,
            Value::String(_) => JsonKind::String,
            Value::Number(_) => JsonKind::Number,
            Value::Bool(_) => JsonKind::Bool,
            Value::Null => JsonKind::Null,
        }
    }
}

/// A single expectation about a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Assertion {
    Exists { pointer: String },
    Absent { pointer: String },
    Equals { pointer: String, value: Value },
    EqualsVar { pointer: String, var: String },
    IsKind { pointer: String, kind: JsonKind },
    MinItems { pointer: String, min: usize },
    MaxItems { pointer: String, max: usize },
    LenEqualsVar { pointer: String, var: String },
    Contains { pointer: String, text: String },
    ContentType { contains: String },
    BodyStartsWith { prefix: String },
}

/// The parts of a response assertions look at.
#[derive(Debug, Clone, Copy)]
pub struct ResponseView<'a> {
    pub status: u16,
    pub content_type: Option<&'a str>,
    pub body: &'a [u8],
    pub json: Option<&'a Value>,
}

impl TryFrom<&AssertSpec> for Assertion {
    type Error = ProbeError;

    fn try_from(spec: &AssertSpec) -> Result<Self, Self::Error> {
        let pointer = spec.pointer.clone().unwrap_or_default();
        if !pointer.is_empty() && !pointer.starts_with('/') {
            return Err(config_error(format!(
                "JSON pointer '{}' must be empty or start with '/'",
                pointer
            )));
        }

        let mut candidates: Vec<Assertion> = Vec::new();

        if let Some(exists) = spec.exists {
            candidates.push(if exists {
                Assertion::Exists { pointer: pointer.clone() }
            } else {
                Assertion::Absent { pointer: pointer.clone() }
            });
        }
        if let Some(value) = &spec.equals {
            candidates.push(Assertion::Equals {
                pointer: pointer.clone(),
                value: value.clone(),
            });
        }
        if let Some(var) = &spec.equals_var {
            candidates.push(Assertion::EqualsVar {
                pointer: pointer.clone(),
                var: var.clone(),
            });
        }
        if let Some(kind) = &spec.kind {
            let kind = JsonKind::parse(kind).ok_or_else(|| {
                config_error(format!(
                    "Unknown kind '{}'. Valid kinds: object, array, string, number, bool, null",
                    kind
                ))
            })?;
            candidates.push(Assertion::IsKind {
                pointer: pointer.clone(),
                kind,
            });
        }
        if let Some(min) = spec.min_items {
            candidates.push(Assertion::MinItems {
                pointer: pointer.clone(),
                min,
            });
        }
        if let Some(max) = spec.max_items {
            candidates.push(Assertion::MaxItems {
                pointer: pointer.clone(),
                max,
            });
        }
        if let Some(var) = &spec.len_equals_var {
            candidates.push(Assertion::LenEqualsVar {
                pointer: pointer.clone(),
                var: var.clone(),
            });
        }
        if let Some(text) = &spec.contains {
            candidates.push(Assertion::Contains {
                pointer: pointer.clone(),
                text: text.clone(),
            });
        }
        if let Some(contains) = &spec.content_type {
            candidates.push(Assertion::ContentType {
                contains: contains.clone(),
            });
        }
        if let Some(prefix) = &spec.body_starts_with {
            candidates.push(Assertion::BodyStartsWith {
                prefix: prefix.clone(),
            });
        }

        match candidates.len() {
            1 => Ok(candidates.remove(0)),
            0 => Err(config_error("Assertion has no operator".to_string())),
            n => Err(config_error(format!(
                "Assertion has {} operators, expected exactly one",
                n
            ))),
        }
    }
}

fn config_error(message: String) -> ProbeError {
    ProbeError::ConfigValidationError {
        field: "assert".to_string(),
        message,
    }
}

fn display_pointer(pointer: &str) -> &str {
    if pointer.is_empty() {
        "<body>"
    } else {
        pointer
    }
}

fn lookup<'a>(json: Option<&'a Value>, pointer: &str) -> Result<&'a Value, String> {
    let json = json.ok_or_else(|| "response body is not JSON".to_string())?;
    json.pointer(pointer)
        .ok_or_else(|| format!("{} is missing", display_pointer(pointer)))
}

fn size_of(value: &Value, pointer: &str) -> Result<usize, String> {
    match value {
        Value::Array(items) => Ok(items.len()),
        Value::Object(map) => Ok(map.len()),
        other => Err(format!(
            "{} is {:?}, not an array or object",
            display_pointer(pointer),
            JsonKind::of(other)
        )),
    }
}

fn variable<'a>(vars: &'a HashMap<String, Value>, var: &str) -> Result<&'a Value, String> {
    vars.get(var)
        .ok_or_else(|| format!("variable '{}' was never captured", var))
}

fn as_count(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl Assertion {
    pub fn needs_json(&self) -> bool {
        !matches!(
            self,
            Assertion::ContentType { .. } | Assertion::BodyStartsWith { .. }
        )
    }

    /// Returns a human readable reason on failure.
    pub fn evaluate(
        &self,
        response: &ResponseView<'_>,
        vars: &HashMap<String, Value>,
    ) -> Result<(), String> {
        match self {
            Assertion::Exists { pointer } => lookup(response.json, pointer).map(|_| ()),
            Assertion::Absent { pointer } => match lookup(response.json, pointer) {
                Ok(_) => Err(format!("{} should be absent", display_pointer(pointer))),
                Err(_) if response.json.is_some() => Ok(()),
                Err(e) => Err(e),
            },
            Assertion::Equals { pointer, value } => {
                let actual = lookup(response.json, pointer)?;
                if actual == value {
                    Ok(())
                } else {
                    Err(format!(
                        "{} is {}, expected {}",
                        display_pointer(pointer),
                        actual,
                        value
                    ))
                }
            }
            Assertion::EqualsVar { pointer, var } => {
                let actual = lookup(response.json, pointer)?;
                let expected = variable(vars, var)?;
                let same = actual == expected || value_to_text(actual) == value_to_text(expected);
                if same {
                    Ok(())
                } else {
                    Err(format!(
                        "{} is {}, expected {} (from '{}')",
                        display_pointer(pointer),
                        actual,
                        expected,
                        var
                    ))
                }
            }
            Assertion::IsKind { pointer, kind } => {
                let actual = JsonKind::of(lookup(response.json, pointer)?);
                if actual == *kind {
                    Ok(())
                } else {
                    Err(format!(
                        "{} is {:?}, expected {:?}",
                        display_pointer(pointer),
                        actual,
                        kind
                    ))
                }
            }
            Assertion::MinItems { pointer, min } => {
                let size = size_of(lookup(response.json, pointer)?, pointer)?;
                if size >= *min {
                    Ok(())
                } else {
                    Err(format!(
                        "{} has {} items, expected at least {}",
                        display_pointer(pointer),
                        size,
                        min
                    ))
                }
            }
            Assertion::MaxItems { pointer, max } => {
                let size = size_of(lookup(response.json, pointer)?, pointer)?;
                if size <= *max {
                    Ok(())
                } else {
                    Err(format!(
                        "{} has {} items, expected at most {}",
                        display_pointer(pointer),
                        size,
                        max
                    ))
                }
            }
            Assertion::LenEqualsVar { pointer, var } => {
                let size = size_of(lookup(response.json, pointer)?, pointer)?;
                let captured = variable(vars, var)?;
                let expected = as_count(captured)
                    .ok_or_else(|| format!("variable '{}' is {}, not a count", var, captured))?;
                if size == expected {
                    Ok(())
                } else {
                    Err(format!(
                        "{} has {} items, expected {} (from '{}')",
                        display_pointer(pointer),
                        size,
                        expected,
                        var
                    ))
                }
            }
            Assertion::Contains { pointer, text } => match lookup(response.json, pointer)? {
                Value::String(s) if s.contains(text.as_str()) => Ok(()),
                Value::String(s) => Err(format!(
                    "{} ('{}') does not contain '{}'",
                    display_pointer(pointer),
                    s,
                    text
                )),
                other => Err(format!(
                    "{} is {:?}, not a string",
                    display_pointer(pointer),
                    JsonKind::of(other)
                )),
            },
            Assertion::ContentType { contains } => match response.content_type {
                Some(ct) if ct.contains(contains.as_str()) => Ok(()),
                Some(ct) => Err(format!("content-type is '{}', expected '{}'", ct, contains)),
                None => Err(format!("content-type header missing, expected '{}'", contains)),
            },
            Assertion::BodyStartsWith { prefix } => {
                if response.body.starts_with(prefix.as_bytes()) {
                    Ok(())
                } else {
                    Err(format!(
                        "body ({} bytes) does not start with '{}'",
                        response.body.len(),
                        prefix
                    ))
                }
            }
        }
    }
}
