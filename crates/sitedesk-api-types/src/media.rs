use serde::{Deserialize, Serialize};

/// Pointer to an image hosted by the external upload service.
///
/// `file_id` is the handle the dashboard needs to delete the asset later; the
/// server never touches the binary itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(rename = "fileId", skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
}

impl MediaReference {
    pub fn file(url: impl Into<String>) -> Self {
        Self {
            file: Some(url.into()),
            ..Self::default()
        }
    }
}
