//! Singleton documents: schema metadata, validation and patch preparation.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use sitedesk_api_types::{
    AboutBlock, AboutItem, AboutUs, Footer, HomePage, KeyValue, NavChild, NavItem, Navigation,
    ProductsBlock, SharedSettings, SingletonKind, Slider, SocialLink, Stat, StatsBlock, Team,
    TeamMember, Testimonial, VideoBlock,
};

use super::validation::{Validate, ValidationErrors, describe_type_error, validate_fields};

/// A document kind that exists at most once.
///
/// All fields of an implementor must be optional on the wire (`serde(default)`),
/// so any subset of `FIELDS` deserializes on its own.
pub trait SingletonDocument:
    Serialize + DeserializeOwned + Default + Validate + Send + Sync + 'static
{
    const KIND: SingletonKind;
    /// Top-level field names accepted in a write.
    const FIELDS: &'static [&'static str];
    /// Human-readable name used in logs and error messages.
    const LABEL: &'static str;
}

impl SingletonDocument for SharedSettings {
    const KIND: SingletonKind = SingletonKind::Shared;
    const FIELDS: &'static [&'static str] = &[
        "title",
        "description",
        "keywords",
        "ctatext",
        "ctalink",
        "favicon",
        "nav",
        "footer",
    ];
    const LABEL: &'static str = "shared settings";
}

impl SingletonDocument for HomePage {
    const KIND: SingletonKind = SingletonKind::Homepage;
    const FIELDS: &'static [&'static str] = &[
        "sliders",
        "about",
        "products",
        "stats",
        "testimonials",
        "video",
    ];
    const LABEL: &'static str = "homepage";
}

impl SingletonDocument for AboutUs {
    const KIND: SingletonKind = SingletonKind::Aboutus;
    const FIELDS: &'static [&'static str] = &["title", "background", "banner", "items", "team"];
    const LABEL: &'static str = "about us";
}

/// A validated, canonicalized partial write for one singleton document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SingletonPatch {
    /// Top-level fields to overwrite, in canonical form.
    pub set: Map<String, Value>,
    /// Top-level fields supplied as `null`; they revert to their default.
    pub unset: Vec<String>,
    /// Supplied keys that are not part of the schema.
    pub ignored: Vec<String>,
}

impl SingletonPatch {
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.unset.is_empty()
    }

    pub fn touched_fields(&self) -> Vec<&str> {
        self.set
            .keys()
            .map(String::as_str)
            .chain(self.unset.iter().map(String::as_str))
            .collect()
    }
}

/// Check a partial document against `D` and turn it into a storable patch.
///
/// Each supplied field is type-checked on its own so a bad field never hides
/// errors in its siblings. Any error rejects the whole write.
pub fn prepare_patch<D: SingletonDocument>(
    input: Map<String, Value>,
) -> Result<SingletonPatch, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut patch = SingletonPatch::default();
    let mut supplied = Map::new();

    for (key, value) in input {
        if !D::FIELDS.contains(&key.as_str()) {
            patch.ignored.push(key);
            continue;
        }
        if value.is_null() {
            patch.unset.push(key);
            continue;
        }

        let mut single = Map::new();
        single.insert(key.clone(), value.clone());
        if let Err(err) = serde_json::from_value::<D>(Value::Object(single)) {
            errors.push(key, describe_type_error(&err));
            continue;
        }
        supplied.insert(key, value);
    }

    let candidate: D = match serde_json::from_value(Value::Object(supplied.clone())) {
        Ok(candidate) => candidate,
        Err(err) => {
            errors.push("document", describe_type_error(&err));
            return Err(errors);
        }
    };
    candidate.validate("", &mut errors);
    errors.into_result()?;

    let canonical = match serde_json::to_value(&candidate) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => {
            return Err(ValidationErrors::single(
                "document",
                "could not be serialized",
            ));
        }
    };

    for key in supplied.keys() {
        match canonical.get(key) {
            Some(value) => {
                patch.set.insert(key.clone(), value.clone());
            }
            None => patch.unset.push(key.clone()),
        }
    }

    Ok(patch)
}

/// Parse a stored body into `D`, filling absent fields with defaults.
pub fn from_stored<D: SingletonDocument>(body: Value) -> Result<D, serde_json::Error> {
    serde_json::from_value(body)
}

impl Validate for SharedSettings {
    fn validate(&self, path: &str, errors: &mut ValidationErrors) {
        validate_fields!(self, path, errors;
            title, description, keywords, ctatext, ctalink, favicon, nav, footer);
    }
}

impl Validate for Navigation {
    fn validate(&self, path: &str, errors: &mut ValidationErrors) {
        validate_fields!(self, path, errors; logo, items);
    }
}

impl Validate for NavItem {
    fn validate(&self, path: &str, errors: &mut ValidationErrors) {
        validate_fields!(self, path, errors; title, link, children);
    }
}

impl Validate for NavChild {
    fn validate(&self, path: &str, errors: &mut ValidationErrors) {
        validate_fields!(self, path, errors; title, link);
    }
}

impl Validate for Footer {
    fn validate(&self, path: &str, errors: &mut ValidationErrors) {
        validate_fields!(self, path, errors;
            copywrite, contactoffice, contactfactory, sociallinks);
    }
}

impl Validate for KeyValue {
    fn validate(&self, path: &str, errors: &mut ValidationErrors) {
        validate_fields!(self, path, errors; key, value);
    }
}

impl Validate for SocialLink {
    fn validate(&self, path: &str, errors: &mut ValidationErrors) {
        validate_fields!(self, path, errors; icon, link);
    }
}

impl<P: Validate> Validate for HomePage<P> {
    fn validate(&self, path: &str, errors: &mut ValidationErrors) {
        validate_fields!(self, path, errors;
            sliders, about, products, stats, testimonials, video);
    }
}

impl Validate for Slider {
    fn validate(&self, path: &str, errors: &mut ValidationErrors) {
        validate_fields!(self, path, errors; title, subtitle, images, background);
    }
}

impl Validate for AboutBlock {
    fn validate(&self, path: &str, errors: &mut ValidationErrors) {
        validate_fields!(self, path, errors; title, description);
    }
}

impl<P: Validate> Validate for ProductsBlock<P> {
    fn validate(&self, path: &str, errors: &mut ValidationErrors) {
        validate_fields!(self, path, errors; title, description, products);
    }
}

impl Validate for StatsBlock {
    fn validate(&self, path: &str, errors: &mut ValidationErrors) {
        validate_fields!(self, path, errors; title, image, stats);
    }
}

impl Validate for Stat {
    fn validate(&self, path: &str, errors: &mut ValidationErrors) {
        validate_fields!(self, path, errors; title, value);
    }
}

impl Validate for Testimonial {
    fn validate(&self, path: &str, errors: &mut ValidationErrors) {
        validate_fields!(self, path, errors; name, designation, comment);
    }
}

impl Validate for VideoBlock {
    fn validate(&self, path: &str, errors: &mut ValidationErrors) {
        validate_fields!(self, path, errors; thumbnail, link);
    }
}

impl Validate for AboutUs {
    fn validate(&self, path: &str, errors: &mut ValidationErrors) {
        validate_fields!(self, path, errors; title, background, banner, items, team);
    }
}

impl Validate for AboutItem {
    fn validate(&self, path: &str, errors: &mut ValidationErrors) {
        validate_fields!(self, path, errors; title, description, hash, image);
    }
}

impl Validate for Team {
    fn validate(&self, path: &str, errors: &mut ValidationErrors) {
        validate_fields!(self, path, errors; title, description, members);
    }
}

impl Validate for TeamMember {
    fn validate(&self, path: &str, errors: &mut ValidationErrors) {
        validate_fields!(self, path, errors; name, designation, description);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::domain::validation::MAX_TEXT_CHARS;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn supplied_fields_are_canonicalized() {
        let patch = prepare_patch::<HomePage>(object(json!({
            "sliders": [{ "title": "S1" }]
        })))
        .expect("valid patch");

        assert_eq!(
            patch.set["sliders"],
            json!([{ "title": "S1", "subtitle": "", "images": [] }])
        );
        assert!(patch.unset.is_empty());
    }

    #[test]
    fn unknown_fields_are_ignored_not_rejected() {
        let patch = prepare_patch::<SharedSettings>(object(json!({
            "title": "Acme",
            "legacy": true
        })))
        .expect("valid patch");

        assert_eq!(patch.ignored, vec!["legacy".to_string()]);
        assert!(patch.set.contains_key("title"));
        assert!(!patch.set.contains_key("legacy"));
    }

    #[test]
    fn null_fields_are_unset() {
        let patch = prepare_patch::<AboutUs>(object(json!({ "banner": null })))
            .expect("valid patch");

        assert_eq!(patch.unset, vec!["banner".to_string()]);
        assert!(patch.set.is_empty());
    }

    #[test]
    fn type_errors_are_collected_per_field() {
        let errors = prepare_patch::<SharedSettings>(object(json!({
            "title": 42,
            "nav": { "items": "not-a-list" },
            "description": "fine"
        })))
        .expect_err("invalid patch");

        assert!(errors.contains("title"));
        assert!(errors.contains("nav"));
        assert!(!errors.contains("description"));
        assert!(!errors.messages("title")[0].contains("line"));
    }

    #[test]
    fn nested_constraint_violation_rejects_whole_write() {
        let errors = prepare_patch::<HomePage>(object(json!({
            "about": { "title": "ok" },
            "sliders": [{ "title": "ok" }, { "title": "x".repeat(MAX_TEXT_CHARS + 1) }]
        })))
        .expect_err("oversize nested title");

        assert!(errors.contains("sliders[1].title"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn homepage_product_references_must_be_uuids() {
        let errors = prepare_patch::<HomePage>(object(json!({
            "products": { "products": ["not-a-uuid"] }
        })))
        .expect_err("bad reference");
        assert!(errors.contains("products"));

        let id = Uuid::new_v4();
        let patch = prepare_patch::<HomePage>(object(json!({
            "products": { "title": "Featured", "products": [id] }
        })))
        .expect("valid reference");
        assert_eq!(patch.set["products"]["products"][0], json!(id));
    }

    #[test]
    fn stored_body_fills_missing_fields() {
        let settings: SharedSettings = from_stored(json!({ "title": "Acme" })).unwrap();
        assert_eq!(settings.title, "Acme");
        assert!(settings.footer.sociallinks.is_empty());
    }
}
