//! Field-level validation shared by singleton documents and products.
//!
//! Errors are keyed by the path of the offending value, e.g.
//! `sliders[1].images[0].file`, so the dashboard can point at the exact input.

use std::fmt;

use sitedesk_api_types::{FieldErrors, MediaReference};
use uuid::Uuid;

pub const MAX_TEXT_CHARS: usize = 10_000;
pub const MAX_LIST_ITEMS: usize = 200;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: FieldErrors,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single failing field.
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(path, message);
        errors
    }

    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(path.into())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.fields.contains_key(path)
    }

    pub fn messages(&self, path: &str) -> &[String] {
        self.fields.get(path).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn fields(&self) -> &FieldErrors {
        &self.fields
    }

    pub fn into_fields(self) -> FieldErrors {
        self.fields
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (path, messages) in &self.fields {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{path}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// A value that can report constraint violations under a path prefix.
pub trait Validate {
    fn validate(&self, path: &str, errors: &mut ValidationErrors);
}

/// A serde_json decode error without the position suffix, which is
/// meaningless for in-memory values.
pub fn describe_type_error(err: &serde_json::Error) -> String {
    let message = err.to_string();
    match message.find(" at line ") {
        Some(index) => message[..index].to_string(),
        None => message,
    }
}

pub fn child_path(parent: &str, field: &str) -> String {
    if parent.is_empty() {
        field.to_string()
    } else {
        format!("{parent}.{field}")
    }
}

pub fn index_path(parent: &str, index: usize) -> String {
    format!("{parent}[{index}]")
}

/// Validate named fields of `$value`, each under `$path.<field>`.
macro_rules! validate_fields {
    ($value:expr, $path:expr, $errors:expr; $($field:ident),+ $(,)?) => {
        $(
            $crate::domain::validation::Validate::validate(
                &$value.$field,
                &$crate::domain::validation::child_path($path, stringify!($field)),
                $errors,
            );
        )+
    };
}
pub(crate) use validate_fields;

impl Validate for String {
    fn validate(&self, path: &str, errors: &mut ValidationErrors) {
        let chars = self.chars().count();
        if chars > MAX_TEXT_CHARS {
            errors.push(
                path,
                format!("must be at most {MAX_TEXT_CHARS} characters (got {chars})"),
            );
        }
    }
}

impl Validate for Uuid {
    fn validate(&self, _path: &str, _errors: &mut ValidationErrors) {}
}

impl<T: Validate> Validate for Option<T> {
    fn validate(&self, path: &str, errors: &mut ValidationErrors) {
        if let Some(value) = self {
            value.validate(path, errors);
        }
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self, path: &str, errors: &mut ValidationErrors) {
        if self.len() > MAX_LIST_ITEMS {
            errors.push(
                path,
                format!(
                    "must contain at most {MAX_LIST_ITEMS} items (got {})",
                    self.len()
                ),
            );
            return;
        }
        for (index, item) in self.iter().enumerate() {
            item.validate(&index_path(path, index), errors);
        }
    }
}

impl Validate for MediaReference {
    fn validate(&self, path: &str, errors: &mut ValidationErrors) {
        validate_fields!(self, path, errors; thumbnail, file);
        self.file_id
            .validate(&child_path(path, "fileId"), errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_every_message_with_its_path() {
        let mut errors = ValidationErrors::new();
        errors.push("title", "Title is required");
        errors.push("sliders[0].title", "too long");

        assert_eq!(
            errors.to_string(),
            "sliders[0].title: too long; title: Title is required"
        );
    }

    #[test]
    fn oversize_text_is_reported_at_its_path() {
        let mut errors = ValidationErrors::new();
        "x".repeat(MAX_TEXT_CHARS + 1).validate("footer.copywrite", &mut errors);

        assert!(errors.contains("footer.copywrite"));
    }

    #[test]
    fn nested_lists_use_indexed_paths() {
        let images = vec![
            MediaReference::file("ok.png"),
            MediaReference::file("y".repeat(MAX_TEXT_CHARS + 1)),
        ];
        let mut errors = ValidationErrors::new();
        images.validate("images", &mut errors);

        assert_eq!(errors.len(), 1);
        assert!(errors.contains("images[1].file"));
    }

    #[test]
    fn oversize_list_is_rejected_without_visiting_items() {
        let items = vec![String::new(); MAX_LIST_ITEMS + 1];
        let mut errors = ValidationErrors::new();
        items.validate("items", &mut errors);

        assert_eq!(errors.messages("items").len(), 1);
    }

    #[test]
    fn into_result_is_ok_only_when_empty() {
        assert!(ValidationErrors::new().into_result().is_ok());
        assert!(ValidationErrors::single("title", "x").into_result().is_err());
    }
}
