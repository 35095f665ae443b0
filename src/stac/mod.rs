//! STAC 1.0.0 records as written to the catalog.
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{CatalogError, Result};

pub mod collection;
pub mod item;
pub mod layout;
pub mod media_type;
pub mod validate;

pub use collection::{
    AssetDefinition, Catalog, Collection, Extent, SpatialExtent, Summaries, TemporalExtent,
};
pub use item::{Item, Properties};
pub use layout::StacLayout;
pub use validate::SchemaValidator;

pub const STAC_VERSION: &str = "1.0.0";
pub const PROJECTION_EXTENSION: &str =
    "https://stac-extensions.github.io/projection/v1.1.0/schema.json";
pub const ITEM_ASSETS_EXTENSION: &str =
    "https://stac-extensions.github.io/item-assets/v1.0.0/schema.json";

/// Anything written as a standalone JSON document.
pub trait StacRecord: Serialize {
    fn id(&self) -> &str;
    fn links_mut(&mut self) -> &mut Vec<Link>;

    /// Replaces every link of relation `rel` with `link`.
    fn set_link(&mut self, link: Link) {
        let links = self.links_mut();
        links.retain(|existing| existing.rel != link.rel);
        links.push(link);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Link {
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
            media_type: None,
            title: None,
        }
    }

    /// A link to another JSON record.
    pub fn json(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self::new(rel, href).with_type(media_type::JSON)
    }

    pub fn with_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(flatten)]
    pub projection: Projection,
}

impl Asset {
    pub fn new(
        href: impl Into<String>,
        title: impl Into<String>,
        media_type: impl Into<String>,
        roles: &[&str],
    ) -> Self {
        Self {
            href: href.into(),
            title: Some(title.into()),
            media_type: Some(media_type.into()),
            roles: roles.iter().map(|role| role.to_string()).collect(),
            projection: Projection::default(),
        }
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderRole {
    Licensor,
    Producer,
    Processor,
    Host,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub roles: Vec<ProviderRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// `proj:*` fields of the projection extension.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    #[serde(rename = "proj:epsg", default, skip_serializing_if = "Option::is_none")]
    pub epsg: Option<u32>,
    #[serde(rename = "proj:bbox", default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
    #[serde(rename = "proj:shape", default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<[usize; 2]>,
    #[serde(rename = "proj:transform", default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Vec<f64>>,
}

impl Projection {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
}

/// First and last day of `year`, at midnight UTC.
pub fn year_interval(year: i32) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let day = |month, day| {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|datetime| datetime.and_utc())
            .ok_or_else(|| CatalogError::BadDate(year.to_string()))
    };
    Ok((day(1, 1)?, day(12, 31)?))
}
