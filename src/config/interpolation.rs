//! Variable interpolation for file set templates.
//!
//! Templates reference parameters with `${path}` where `path` is a dotted
//! lookup into the parameter object.
//!
//! # Syntax
//!
//! - `${name}` - top-level parameter
//! - `${computer.host}` - nested attribute
//! - `$${escaped}` - produces literal `${escaped}` in output
//! - `$` followed by anything else is literal, so nginx's `$host` and
//!   `$uri` pass through untouched
//!
//! # Example
//!
//! ```
//! use hostcook::config::{resolve_string, TemplateContext};
//! use serde_json::json;
//!
//! let ctx = TemplateContext::new(json!({"name": "web1", "computer": {"ip": "10.0.0.5"}}));
//! let out = resolve_string("listen ${computer.ip}; # ${name}", &ctx, "site.conf").unwrap();
//! assert_eq!(out, "listen 10.0.0.5; # web1");
//! ```

use crate::error::{CookError, Result};
use serde_json::Value;

/// A segment of an interpolated string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text
    Literal(String),
    /// Variable reference: ${name}
    Variable(String),
}

/// Split a template into literal and variable segments.
///
/// An unterminated `${` is kept as literal text.
pub fn parse_interpolation(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        literal.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(escaped) = after.strip_prefix("${") {
            // $${...} -> literal ${...}
            literal.push_str("${");
            rest = escaped;
        } else if let Some(body) = after.strip_prefix('{') {
            match body.find('}') {
                Some(end) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Variable(body[..end].trim().to_string()));
                    rest = &body[end + 1..];
                }
                None => {
                    literal.push_str("${");
                    rest = body;
                }
            }
        } else {
            literal.push('$');
            rest = after;
        }
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    segments
}

/// Parameters available to a template.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    params: Value,
}

impl TemplateContext {
    pub fn new(params: Value) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &Value {
        &self.params
    }

    /// Resolve a dotted path to its display string.
    ///
    /// Strings render bare, `null` renders empty, arrays and objects
    /// render as compact JSON.
    pub fn resolve(&self, path: &str) -> Option<String> {
        let value = path
            .split('.')
            .try_fold(&self.params, |node, key| match node {
                Value::Object(map) => map.get(key),
                Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })?;

        Some(match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => {
                value.to_string()
            }
        })
    }
}

/// Resolve all variables in a template.
///
/// # Errors
///
/// Returns `TemplateError` naming `source` if any variable is undefined.
pub fn resolve_string(input: &str, context: &TemplateContext, source: &str) -> Result<String> {
    let mut result = String::with_capacity(input.len());

    for segment in parse_interpolation(input) {
        match segment {
            Segment::Literal(text) => result.push_str(&text),
            Segment::Variable(name) => {
                let value = context
                    .resolve(&name)
                    .ok_or_else(|| CookError::TemplateError {
                        file: source.to_string(),
                        message: format!("Unresolved variable: ${{{}}}", name),
                    })?;
                result.push_str(&value);
            }
        }
    }

    Ok(result)
}
