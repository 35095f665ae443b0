use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{
    Asset, Item, Link, Provider, StacRecord, ITEM_ASSETS_EXTENSION, PROJECTION_EXTENSION,
    STAC_VERSION,
};
use crate::crs_geo::CrsBounds;

/// Bbox used when nothing better is known.
const GLOBAL_BBOX: [f64; 4] = [-180., -90., 180., 90.];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialExtent {
    pub bbox: Vec<[f64; 4]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalExtent {
    pub interval: Vec<[Option<DateTime<Utc>>; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub spatial: SpatialExtent,
    pub temporal: TemporalExtent,
}

impl Extent {
    pub fn new(bbox: [f64; 4], start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self {
            spatial: SpatialExtent { bbox: vec![bbox] },
            temporal: TemporalExtent {
                interval: vec![[start, end]],
            },
        }
    }

    /// Open ended from `start`, bbox to be filled from the items.
    pub fn open(start: DateTime<Utc>) -> Self {
        Self::new(GLOBAL_BBOX, Some(start), None)
    }
}

/// Entry of the item-assets extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

impl AssetDefinition {
    pub fn new(title: impl Into<String>, media_type: impl Into<String>, roles: &[&str]) -> Self {
        Self {
            title: Some(title.into()),
            media_type: Some(media_type.into()),
            roles: roles.iter().map(|role| role.to_string()).collect(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summaries {
    #[serde(rename = "proj:epsg", default, skip_serializing_if = "Vec::is_empty")]
    pub epsg: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(rename = "type")]
    pub kind: String,
    pub stac_version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stac_extensions: Vec<String>,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    pub license: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub providers: Vec<Provider>,
    pub extent: Extent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summaries: Option<Summaries>,
    pub links: Vec<Link>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub assets: BTreeMap<String, Asset>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub item_assets: BTreeMap<String, AssetDefinition>,
}

impl Collection {
    pub fn new(id: impl Into<String>, description: impl Into<String>, extent: Extent) -> Self {
        Self {
            kind: "Collection".into(),
            stac_version: STAC_VERSION.into(),
            stac_extensions: Vec::new(),
            id: id.into(),
            title: None,
            description: description.into(),
            keywords: Vec::new(),
            license: "other".into(),
            providers: Vec::new(),
            extent,
            summaries: None,
            links: Vec::new(),
            assets: BTreeMap::new(),
            item_assets: BTreeMap::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|keyword| keyword.to_string()).collect();
        self
    }

    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = license.into();
        self
    }

    pub fn with_providers(mut self, providers: Vec<Provider>) -> Self {
        self.providers = providers;
        self
    }

    pub fn add_extension(&mut self, uri: &str) {
        if !self.stac_extensions.iter().any(|existing| existing == uri) {
            self.stac_extensions.push(uri.into());
        }
    }

    pub fn add_link(&mut self, link: Link) {
        self.links.push(link);
    }

    /// Keeps the first asset registered under `key`.
    pub fn add_asset(&mut self, key: impl Into<String>, asset: Asset) {
        self.assets.entry(key.into()).or_insert(asset);
    }

    pub fn set_item_assets(&mut self, definitions: impl IntoIterator<Item = (String, AssetDefinition)>) {
        self.item_assets = definitions.into_iter().collect();
        self.add_extension(ITEM_ASSETS_EXTENSION);
    }

    pub fn set_epsg_summary(&mut self, epsg: Vec<u32>) {
        self.summaries = Some(Summaries { epsg });
        self.add_extension(PROJECTION_EXTENSION);
    }

    /// Union of the item footprints, earliest start and latest end.
    ///
    /// Leaves the extent untouched when `items` is empty.
    pub fn update_extent_from_items<'a>(&mut self, items: impl IntoIterator<Item = &'a Item>) {
        let mut bounds: Option<CrsBounds> = None;
        let mut start: Option<DateTime<Utc>> = None;
        let mut end: Option<DateTime<Utc>> = None;
        for item in items {
            if let Some(item_bounds) = item.bounds() {
                bounds = Some(match bounds {
                    Some(bounds) => bounds.union(&item_bounds),
                    None => item_bounds,
                });
            }
            let properties = &item.properties;
            if let Some(item_start) = properties.start_datetime.or(properties.datetime) {
                start = Some(start.map_or(item_start, |start| start.min(item_start)));
            }
            if let Some(item_end) = properties.end_datetime.or(properties.datetime) {
                end = Some(end.map_or(item_end, |end| end.max(item_end)));
            }
        }
        if let Some(bounds) = bounds {
            self.extent.spatial.bbox = vec![bounds.bbox()];
        }
        if start.is_some() || end.is_some() {
            self.extent.temporal.interval = vec![[start, end]];
        }
    }
}

/// Distinct EPSG codes declared by `items`, sorted.
pub fn epsg_summary<'a>(items: impl IntoIterator<Item = &'a Item>) -> Vec<u32> {
    items
        .into_iter()
        .flat_map(Item::epsg_codes)
        .sorted()
        .dedup()
        .collect()
}

impl StacRecord for Collection {
    fn id(&self) -> &str {
        &self.id
    }
    fn links_mut(&mut self) -> &mut Vec<Link> {
        &mut self.links
    }
}

/// The root `clms_catalog.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(rename = "type")]
    pub kind: String,
    pub stac_version: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub description: String,
    pub links: Vec<Link>,
}

impl Catalog {
    pub fn clms() -> Self {
        Self {
            kind: "Catalog".into(),
            stac_version: STAC_VERSION.into(),
            id: "clms_catalog".into(),
            title: Some("CLMS Catalog".into()),
            description: "Catalog of Copernicus Land Monitoring Service products.".into(),
            links: Vec::new(),
        }
    }

    /// Adds a `child` link unless one with the same href exists.
    pub fn add_child(&mut self, href: &str, title: Option<&str>) -> bool {
        if self
            .links
            .iter()
            .any(|link| link.rel == "child" && link.href == href)
        {
            return false;
        }
        let mut link = Link::json("child", href);
        link.title = title.map(str::to_owned);
        self.links.push(link);
        true
    }
}

impl StacRecord for Catalog {
    fn id(&self) -> &str {
        &self.id
    }
    fn links_mut(&mut self) -> &mut Vec<Link> {
        &mut self.links
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        crs_geo::WGS84,
        stac::{item::Properties, year_interval, Projection},
    };
    use chrono::TimeZone;
    use rstest::rstest;

    fn item(id: &str, year: i32, bbox: [f64; 4], epsg: u32) -> Item {
        let (start, end) = year_interval(year).unwrap();
        let mut item = Item::new(
            id,
            &CrsBounds::from_bbox(WGS84, bbox),
            Properties::new(start, end),
            "test",
        );
        item.set_projection(Projection {
            epsg: Some(epsg),
            ..Default::default()
        });
        item
    }

    #[rstest]
    fn extent_covers_all_items() {
        let items = [
            item("a", 2012, [0., 0., 1., 1.], 3035),
            item("b", 2018, [-2., 0.5, 0.5, 3.], 32632),
        ];
        let start = Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap();
        let mut collection = Collection::new("test", "Test", Extent::open(start));
        collection.update_extent_from_items(&items);
        assert_eq!(collection.extent.spatial.bbox, vec![[-2., 0., 1., 3.]]);
        let [first, last] = collection.extent.temporal.interval[0];
        assert_eq!(first, Some(Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap()));
        assert_eq!(last, Some(Utc.with_ymd_and_hms(2018, 12, 31, 0, 0, 0).unwrap()));
    }

    #[rstest]
    fn empty_items_keep_the_default_extent() {
        let start = Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap();
        let mut collection = Collection::new("test", "Test", Extent::open(start));
        collection.update_extent_from_items(std::iter::empty());
        assert_eq!(collection.extent, Extent::open(start));
    }

    #[rstest]
    fn epsg_summary_is_distinct_and_sorted() {
        let items = [
            item("a", 2018, [0., 0., 1., 1.], 32632),
            item("b", 2018, [0., 0., 1., 1.], 3035),
            item("c", 2018, [0., 0., 1., 1.], 32632),
        ];
        assert_eq!(epsg_summary(&items), [3035, 32632]);
    }

    #[rstest]
    fn first_asset_wins() {
        let start = Utc.with_ymd_and_hms(2006, 1, 1, 0, 0, 0).unwrap();
        let mut collection = Collection::new("test", "Test", Extent::open(start));
        collection.add_asset("a_xml", Asset::new("1/a.xml", "A", "application/xml", &[]));
        collection.add_asset("a_xml", Asset::new("2/a.xml", "A", "application/xml", &[]));
        assert_eq!(collection.assets["a_xml"].href, "1/a.xml");
    }

    #[rstest]
    fn catalog_children_are_unique() {
        let mut catalog = Catalog::clms();
        assert!(catalog.add_child("./eu-hydro/eu-hydro.json", Some("EU-Hydro")));
        assert!(!catalog.add_child("./eu-hydro/eu-hydro.json", Some("EU-Hydro")));
        assert_eq!(catalog.links.len(), 1);
    }
}
