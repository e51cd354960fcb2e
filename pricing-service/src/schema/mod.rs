//! Validation schema for plans, price components and fees.
//!
//! Every payload is checked in two passes. A structural pre-check runs on the
//! raw JSON so that bad discriminants, missing or mistyped fields and malformed
//! ids are reported at their exact path. The typed value is then checked with the
//! `validator` rules declared on the models plus the cross-field rules in
//! [`rules`]. All failures come back as one list of path-tagged issues.

mod impls;
mod issues;
mod normalize;
pub mod rules;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

pub use normalize::NormalizePrices;
pub use service_core::error::FieldIssue;

pub(crate) use issues::validation_issues;

use service_core::error::AppError;

pub const INVALID_TYPE: &str = "invalid_type";
pub const INVALID_DISCRIMINATOR: &str = "invalid_union_discriminator";
pub const REQUIRED: &str = "required";
pub const INVALID_UUID: &str = "invalid_uuid";
pub const INVALID_ENUM: &str = "invalid_enum_value";

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a value inside a payload, rendered as `model.data.rows.1.firstUnit`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.into()));
        Self(segments)
    }

    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                PathSegment::Key(key) => f.write_str(key)?,
                PathSegment::Index(index) => write!(f, "{}", index)?,
            }
        }
        Ok(())
    }
}

pub fn issue(path: &FieldPath, code: &str, message: impl Into<String>) -> FieldIssue {
    FieldIssue {
        path: path.to_string(),
        code: code.to_string(),
        message: message.into(),
    }
}

/// All issues found in one payload, sorted by path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("payload failed validation with {} issue(s)", .0.len())]
pub struct SchemaErrors(Vec<FieldIssue>);

impl SchemaErrors {
    pub fn new(mut issues: Vec<FieldIssue>) -> Self {
        issues.sort_by(|a, b| a.path.cmp(&b.path));
        Self(issues)
    }

    pub fn single(path: &FieldPath, code: &str, message: impl Into<String>) -> Self {
        Self(vec![issue(path, code, message)])
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.0
    }

    pub fn into_issues(self) -> Vec<FieldIssue> {
        self.0
    }

    /// Issues reported at exactly `path`.
    pub fn at(&self, path: &str) -> Vec<&FieldIssue> {
        self.0.iter().filter(|i| i.path == path).collect()
    }

    pub fn has_issue_at(&self, path: &str) -> bool {
        self.0.iter().any(|i| i.path == path)
    }
}

impl From<SchemaErrors> for AppError {
    fn from(errors: SchemaErrors) -> Self {
        AppError::InvalidFields(errors.into_issues())
    }
}

/// A payload shape the schema knows how to check.
pub trait Schema: DeserializeOwned {
    /// Label used in logs and metrics.
    const NAME: &'static str;

    /// Structural checks on the raw JSON, run before deserialization.
    fn precheck(_value: &Value, _path: &FieldPath, _issues: &mut Vec<FieldIssue>) {}

    /// Rules on the typed value.
    fn check(&self, path: &FieldPath, issues: &mut Vec<FieldIssue>);
}

/// Parse and validate a JSON payload.
pub fn parse<T: Schema>(value: &Value) -> Result<T, SchemaErrors> {
    let root = FieldPath::root();
    let mut issues = Vec::new();

    T::precheck(value, &root, &mut issues);
    if !issues.is_empty() {
        return Err(SchemaErrors::new(issues));
    }

    let parsed: T = serde_json::from_value(value.clone())
        .map_err(|e| SchemaErrors::single(&root, INVALID_TYPE, e.to_string()))?;

    parsed.check(&root, &mut issues);
    if issues.is_empty() {
        Ok(parsed)
    } else {
        Err(SchemaErrors::new(issues))
    }
}

/// Validate an already typed value.
pub fn validate<T: Schema>(value: &T) -> Result<(), SchemaErrors> {
    let mut issues = Vec::new();
    value.check(&FieldPath::root(), &mut issues);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(SchemaErrors::new(issues))
    }
}

/// Check a `{tag: "...", data: {...}}` union member.
///
/// Returns the tag when it is one of `allowed` and the payload is present.
pub(crate) fn check_discriminant<'a>(
    value: &'a Value,
    path: &FieldPath,
    tag: &str,
    allowed: &[&str],
    issues: &mut Vec<FieldIssue>,
) -> Option<&'a str> {
    let Some(object) = value.as_object() else {
        issues.push(issue(path, INVALID_TYPE, "Expected object"));
        return None;
    };

    let found = object.get(tag).and_then(Value::as_str);
    let Some(found) = found.filter(|t| allowed.contains(t)) else {
        let expected = allowed
            .iter()
            .map(|a| format!("'{}'", a))
            .collect::<Vec<_>>()
            .join(" | ");
        issues.push(issue(
            &path.key(tag),
            INVALID_DISCRIMINATOR,
            format!("Invalid discriminator value. Expected {}", expected),
        ));
        return None;
    };

    match object.get("data") {
        None | Some(Value::Null) => {
            issues.push(issue(&path.key("data"), REQUIRED, "Required"));
            None
        }
        Some(_) => Some(found),
    }
}

/// JSON shape a field must have before the typed model can accept it.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Shape {
    Text,
    Uuid,
    /// Non-negative integer.
    Count,
    /// Non-negative integer that fits in 32 bits.
    Count32,
    Int32,
    /// Object whose values are all strings.
    TextMap,
    OneOf(&'static [&'static str]),
    Object(&'static [Field]),
    ListOf(&'static Shape),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Field {
    name: &'static str,
    shape: Shape,
    required: bool,
}

impl Field {
    pub(crate) const fn required(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            required: true,
        }
    }

    pub(crate) const fn optional(name: &'static str, shape: Shape) -> Self {
        Self {
            name,
            shape,
            required: false,
        }
    }
}

fn received(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_issue(path: &FieldPath, expected: &str, value: &Value) -> FieldIssue {
    issue(
        path,
        INVALID_TYPE,
        format!("Expected {}, received {}", expected, received(value)),
    )
}

/// Check that `value` is an object holding `fields` with the right shapes.
///
/// Absent or null required fields are reported as `Required`.
pub(crate) fn check_object(
    value: &Value,
    path: &FieldPath,
    fields: &[Field],
    issues: &mut Vec<FieldIssue>,
) {
    let Some(object) = value.as_object() else {
        issues.push(type_issue(path, "object", value));
        return;
    };
    for field in fields {
        match object.get(field.name) {
            None | Some(Value::Null) if field.required => {
                issues.push(issue(&path.key(field.name), REQUIRED, "Required"));
            }
            None | Some(Value::Null) => {}
            Some(v) => check_value(v, &path.key(field.name), &field.shape, issues),
        }
    }
}

fn check_value(
    value: &Value,
    path: &FieldPath,
    shape: &Shape,
    issues: &mut Vec<FieldIssue>,
) {
    match shape {
        Shape::Text => {
            if !value.is_string() {
                issues.push(type_issue(path, "string", value));
            }
        }
        Shape::Uuid => match value.as_str() {
            Some(s) if uuid::Uuid::parse_str(s).is_ok() => {}
            Some(_) => issues.push(issue(path, INVALID_UUID, "Invalid uuid")),
            None => issues.push(type_issue(path, "string", value)),
        },
        Shape::Count => check_integer(
            value,
            path,
            value.as_u64().is_some(),
            "Expected non-negative integer",
            issues,
        ),
        Shape::Count32 => check_integer(
            value,
            path,
            value.as_u64().is_some_and(|n| u32::try_from(n).is_ok()),
            "Expected non-negative 32-bit integer",
            issues,
        ),
        Shape::Int32 => check_integer(
            value,
            path,
            value.as_i64().is_some_and(|n| i32::try_from(n).is_ok()),
            "Expected 32-bit integer",
            issues,
        ),
        Shape::TextMap => match value.as_object() {
            Some(object) => {
                for (key, v) in object {
                    if !v.is_string() {
                        issues.push(type_issue(&path.key(key.as_str()), "string", v));
                    }
                }
            }
            None => issues.push(type_issue(path, "object", value)),
        },
        Shape::OneOf(options) => match value.as_str() {
            Some(s) if options.contains(&s) => {}
            Some(s) => {
                let expected = options
                    .iter()
                    .map(|o| format!("'{}'", o))
                    .collect::<Vec<_>>()
                    .join(" | ");
                issues.push(issue(
                    path,
                    INVALID_ENUM,
                    format!("Invalid enum value. Expected {}, received '{}'", expected, s),
                ));
            }
            None => issues.push(type_issue(path, "string", value)),
        },
        Shape::Object(fields) => check_object(value, path, fields, issues),
        Shape::ListOf(item) => match value.as_array() {
            Some(items) => {
                for (i, v) in items.iter().enumerate() {
                    check_value(v, &path.index(i), item, issues);
                }
            }
            None => issues.push(type_issue(path, "array", value)),
        },
    }
}

fn check_integer(
    value: &Value,
    path: &FieldPath,
    fits: bool,
    message: &str,
    issues: &mut Vec<FieldIssue>,
) {
    if !value.is_number() {
        issues.push(type_issue(path, "number", value));
    } else if !fits {
        issues.push(issue(path, INVALID_TYPE, message));
    }
}
