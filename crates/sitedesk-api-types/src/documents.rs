//! Singleton page documents.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::media::MediaReference;

/// Site-wide SEO metadata, navigation and footer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedSettings {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub ctatext: String,
    pub ctalink: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<MediaReference>,
    pub nav: Navigation,
    pub footer: Footer,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Navigation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<MediaReference>,
    pub items: Vec<NavItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavItem {
    pub title: String,
    pub link: String,
    pub children: Vec<NavChild>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavChild {
    pub title: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Footer {
    pub copywrite: String,
    pub contactoffice: Vec<KeyValue>,
    pub contactfactory: Vec<KeyValue>,
    pub sociallinks: Vec<SocialLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLink {
    pub icon: String,
    pub link: String,
}

/// Homepage sections.
///
/// `P` is the representation of featured products: identifiers as stored,
/// or full product records once resolved for reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomePage<P = Uuid> {
    pub sliders: Vec<Slider>,
    pub about: AboutBlock,
    pub products: ProductsBlock<P>,
    pub stats: StatsBlock,
    pub testimonials: Vec<Testimonial>,
    pub video: VideoBlock,
}

impl<P> Default for HomePage<P> {
    fn default() -> Self {
        Self {
            sliders: Vec::new(),
            about: AboutBlock::default(),
            products: ProductsBlock::default(),
            stats: StatsBlock::default(),
            testimonials: Vec::new(),
            video: VideoBlock::default(),
        }
    }
}

impl<P> HomePage<P> {
    /// Swap the featured product representation, keeping every other section.
    pub fn with_products<Q>(self, products: Vec<Q>) -> HomePage<Q> {
        HomePage {
            sliders: self.sliders,
            about: self.about,
            products: ProductsBlock {
                title: self.products.title,
                description: self.products.description,
                products,
            },
            stats: self.stats,
            testimonials: self.testimonials,
            video: self.video,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Slider {
    pub title: String,
    pub subtitle: String,
    pub images: Vec<MediaReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<MediaReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AboutBlock {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductsBlock<P = Uuid> {
    pub title: String,
    pub description: String,
    pub products: Vec<P>,
}

impl<P> Default for ProductsBlock<P> {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            products: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsBlock {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<MediaReference>,
    pub stats: Vec<Stat>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stat {
    pub title: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Testimonial {
    pub name: String,
    pub designation: String,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoBlock {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<MediaReference>,
    pub link: String,
}

/// The "about us" page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AboutUs {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<MediaReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<MediaReference>,
    pub items: Vec<AboutItem>,
    pub team: Team,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AboutItem {
    pub title: String,
    pub description: String,
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<MediaReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Team {
    pub title: String,
    pub description: String,
    pub members: Vec<TeamMember>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamMember {
    pub name: String,
    pub designation: String,
    pub description: String,
}

/// A singleton document as returned by the API: the typed body plus its
/// well-known id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument<D> {
    pub id: String,
    #[serde(flatten)]
    pub document: D,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(rename = "updatedAt", with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::datetime;

    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: SharedSettings = serde_json::from_value(json!({ "title": "Acme" })).unwrap();
        assert_eq!(settings.title, "Acme");
        assert!(settings.description.is_empty());
        assert!(settings.nav.items.is_empty());
        assert!(settings.favicon.is_none());
    }

    #[test]
    fn homepage_products_can_be_swapped_for_resolved_records() {
        let id = Uuid::new_v4();
        let mut stored = HomePage::<Uuid>::default();
        stored.products.title = "Featured".into();
        stored.products.products = vec![id];

        let resolved = stored.with_products(vec![id.to_string()]);
        assert_eq!(resolved.products.title, "Featured");
        assert_eq!(resolved.products.products, vec![id.to_string()]);
    }

    #[test]
    fn stored_document_flattens_body_next_to_metadata() {
        let doc = StoredDocument {
            id: "shared".to_string(),
            document: SharedSettings {
                title: "Acme".into(),
                ..SharedSettings::default()
            },
            created_at: datetime!(2024-01-02 03:04:05 UTC),
            updated_at: datetime!(2024-01-02 03:04:05 UTC),
        };

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["id"], "shared");
        assert_eq!(value["title"], "Acme");
        assert_eq!(value["createdAt"], "2024-01-02T03:04:05Z");
        assert!(value.get("favicon").is_none());
    }

    #[test]
    fn media_reference_uses_camel_case_file_id() {
        let slider: Slider = serde_json::from_value(json!({
            "title": "S1",
            "images": [{ "file": "a.png", "fileId": "abc" }]
        }))
        .unwrap();
        assert_eq!(slider.images[0].file_id.as_deref(), Some("abc"));
    }
}
