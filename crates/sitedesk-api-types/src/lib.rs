//! Wire types shared by the sitedesk server and its clients.
//!
//! Field names follow the JSON documents the dashboard has always exchanged
//! (`ctatext`, `fileId`, `copywrite`, ...), so they are kept verbatim even
//! where they read oddly.

mod documents;
mod envelope;
mod kind;
mod media;
mod product;

pub use documents::{
    AboutBlock, AboutItem, AboutUs, Footer, HomePage, KeyValue, NavChild, NavItem, Navigation,
    ProductsBlock, SharedSettings, Slider, SocialLink, Stat, StatsBlock, StoredDocument, Team,
    TeamMember, Testimonial, VideoBlock,
};
pub use envelope::{ApiFailure, ApiMessage, ApiSuccess, FieldErrors};
pub use kind::{SingletonKind, UnknownSingletonKind};
pub use media::MediaReference;
pub use product::{Product, ProductAttribute, ProductDraft, ProductPatch};
