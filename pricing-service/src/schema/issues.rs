//! Flattening of `validator` errors into path-tagged issues.

use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

use super::{issue, FieldIssue, FieldPath};

/// Append every error in `errors` to `issues`, rooted at `path`.
///
/// Field names are reported in their wire (camelCase) form.
pub(crate) fn validation_issues(
    path: &FieldPath,
    errors: &ValidationErrors,
    issues: &mut Vec<FieldIssue>,
) {
    for (field, kind) in errors.errors() {
        let field = field.to_string();
        let field_path = if field == "__all__" {
            path.clone()
        } else {
            path.key(camel_case(&field))
        };

        match kind {
            ValidationErrorsKind::Field(errs) => {
                for err in errs {
                    issues.push(issue(&field_path, &err.code, message_for(err)));
                }
            }
            ValidationErrorsKind::Struct(inner) => validation_issues(&field_path, inner, issues),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    validation_issues(&field_path.index(*index), inner, issues);
                }
            }
        }
    }
}

fn message_for(err: &ValidationError) -> String {
    if let Some(message) = &err.message {
        return message.to_string();
    }
    match &*err.code {
        "length" => length_message(err),
        "range" => "Value out of range".to_string(),
        code => format!("Invalid value ({})", code),
    }
}

fn length_message(err: &ValidationError) -> String {
    let param = |name: &str| err.params.get(name);
    let len = param("value").and_then(|v| v.as_str()).map(|s| s.chars().count() as u64);
    let min = param("min").and_then(|v| v.as_u64());
    let max = param("max").and_then(|v| v.as_u64());
    match (len, min, max) {
        (Some(len), Some(min), _) if len < min => {
            format!("String must contain at least {} character(s)", min)
        }
        (Some(_), _, Some(max)) => format!("String must contain at most {} character(s)", max),
        _ => "Invalid length".to_string(),
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for ch in field.chars() {
        if ch == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}
