use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The three documents that exist at most once per site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SingletonKind {
    Shared,
    Homepage,
    Aboutus,
}

impl SingletonKind {
    pub const ALL: [SingletonKind; 3] = [Self::Shared, Self::Homepage, Self::Aboutus];

    /// Well-known identifier, also used as the storage primary key.
    pub fn as_str(self) -> &'static str {
        match self {
            SingletonKind::Shared => "shared",
            SingletonKind::Homepage => "homepage",
            SingletonKind::Aboutus => "aboutus",
        }
    }
}

impl fmt::Display for SingletonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSingletonKind(pub String);

impl fmt::Display for UnknownSingletonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown singleton kind `{}` (expected shared, homepage or aboutus)",
            self.0
        )
    }
}

impl std::error::Error for UnknownSingletonKind {}

impl FromStr for SingletonKind {
    type Err = UnknownSingletonKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownSingletonKind(value.to_string()))
    }
}
