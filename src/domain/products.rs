//! Product input rules.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use sitedesk_api_types::{ProductAttribute, ProductDraft, ProductPatch};
use tracing::debug;

use super::validation::{Validate, ValidationErrors, describe_type_error, validate_fields};

pub const MAX_TITLE_CHARS: usize = 512;

/// Top-level fields accepted in product writes.
pub const FIELDS: &[&str] = &["title", "description", "images", "attributes"];

const TITLE_REQUIRED: &str = "Title is required";

impl Validate for ProductAttribute {
    fn validate(&self, path: &str, errors: &mut ValidationErrors) {
        validate_fields!(self, path, errors; key, value);
    }
}

/// Decode a create body, reporting type errors under the offending field.
pub fn draft_from_json(input: Map<String, Value>) -> Result<ProductDraft, ValidationErrors> {
    decode_fields(input)
}

/// Decode an update body; `null` leaves the field untouched.
pub fn patch_from_json(input: Map<String, Value>) -> Result<ProductPatch, ValidationErrors> {
    decode_fields(input)
}

fn decode_fields<T: DeserializeOwned>(input: Map<String, Value>) -> Result<T, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut supplied = Map::new();

    for (key, value) in input {
        if !FIELDS.contains(&key.as_str()) {
            debug!(field = %key, "Ignoring unknown product field");
            continue;
        }
        let mut single = Map::new();
        single.insert(key.clone(), value.clone());
        if let Err(err) = serde_json::from_value::<T>(Value::Object(single)) {
            errors.push(key, describe_type_error(&err));
            continue;
        }
        supplied.insert(key, value);
    }
    errors.into_result()?;

    serde_json::from_value(Value::Object(supplied))
        .map_err(|err| ValidationErrors::single("body", describe_type_error(&err)))
}

/// Trim and check a create request.
pub fn normalize_draft(mut draft: ProductDraft) -> Result<ProductDraft, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    draft.title = draft.title.trim().to_string();
    check_title(&draft.title, &mut errors);
    validate_fields!(draft, "", &mut errors; description, images, attributes);
    errors.into_result().map(|()| draft)
}

/// Trim and check an update request. Absent fields are not checked.
pub fn normalize_patch(mut patch: ProductPatch) -> Result<ProductPatch, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if let Some(title) = patch.title.as_mut() {
        *title = title.trim().to_string();
        check_title(title, &mut errors);
    }
    validate_fields!(patch, "", &mut errors; description, images, attributes);
    errors.into_result().map(|()| patch)
}

fn check_title(title: &str, errors: &mut ValidationErrors) {
    if title.is_empty() {
        errors.push("title", TITLE_REQUIRED);
        return;
    }
    let chars = title.chars().count();
    if chars > MAX_TITLE_CHARS {
        errors.push(
            "title",
            format!("must be at most {MAX_TITLE_CHARS} characters (got {chars})"),
        );
    }
}
