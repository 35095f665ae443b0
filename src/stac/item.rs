use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{
    Asset, Geometry, Link, Projection, Provider, StacRecord, PROJECTION_EXTENSION, STAC_VERSION,
};
use crate::crs_geo::{CrsBounds, WGS84};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    /// Always null, the acquisition period is given as a range.
    pub datetime: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_datetime: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_datetime: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<Provider>>,
    #[serde(flatten)]
    pub projection: Projection,
}

impl Properties {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            datetime: None,
            start_datetime: Some(start),
            end_datetime: Some(end),
            created: None,
            description: None,
            providers: None,
            projection: Projection::default(),
        }
    }

    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_providers(mut self, providers: Vec<Provider>) -> Self {
        self.providers = Some(providers);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "type")]
    pub kind: String,
    pub stac_version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stac_extensions: Vec<String>,
    pub id: String,
    pub geometry: Geometry,
    pub bbox: Vec<f64>,
    pub properties: Properties,
    pub links: Vec<Link>,
    pub assets: BTreeMap<String, Asset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

impl Item {
    /// `footprint` must already be expressed in WGS84.
    pub fn new(
        id: impl Into<String>,
        footprint: &CrsBounds,
        properties: Properties,
        collection: &str,
    ) -> Self {
        debug_assert_eq!(footprint.epsg(), WGS84);
        Self {
            kind: "Feature".into(),
            stac_version: STAC_VERSION.into(),
            stac_extensions: Vec::new(),
            id: id.into(),
            geometry: footprint.polygon(),
            bbox: footprint.bbox().to_vec(),
            properties,
            links: Vec::new(),
            assets: BTreeMap::new(),
            collection: Some(collection.into()),
        }
    }

    pub fn add_extension(&mut self, uri: &str) {
        if !self.stac_extensions.iter().any(|existing| existing == uri) {
            self.stac_extensions.push(uri.into());
        }
    }

    /// Item level `proj:*` fields.
    pub fn set_projection(&mut self, projection: Projection) {
        self.properties.projection = projection;
        self.add_extension(PROJECTION_EXTENSION);
    }

    pub fn add_asset(&mut self, key: impl Into<String>, asset: Asset) {
        if !asset.projection.is_empty() {
            self.add_extension(PROJECTION_EXTENSION);
        }
        self.assets.insert(key.into(), asset);
    }

    pub fn add_link(&mut self, link: Link) {
        self.links.push(link);
    }

    /// Every EPSG code the item declares, in properties or assets.
    pub fn epsg_codes(&self) -> impl Iterator<Item = u32> + '_ {
        self.properties
            .projection
            .epsg
            .into_iter()
            .chain(self.assets.values().filter_map(|asset| asset.projection.epsg))
    }

    pub fn bounds(&self) -> Option<CrsBounds> {
        let bbox: [f64; 4] = self.bbox.as_slice().try_into().ok()?;
        Some(CrsBounds::from_bbox(WGS84, bbox))
    }
}

impl StacRecord for Item {
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
    use crate::stac::{media_type, year_interval};
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn item() -> Item {
        let (start, end) = year_interval(2018).unwrap();
        let footprint = CrsBounds::from_bbox(WGS84, [9.9, 51.9, 10.1, 52.1]);
        Item::new(
            "U2018_CLC2018_V2020_20u1",
            &footprint,
            Properties::new(start, end).with_description("CLC 2018"),
            "corine-land-cover-raster",
        )
    }

    #[rstest]
    fn datetime_is_serialized_as_null(item: Item) {
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["type"], "Feature");
        assert_eq!(value["properties"]["datetime"], json!(null));
        assert_eq!(
            value["properties"]["start_datetime"],
            "2018-01-01T00:00:00Z"
        );
        assert!(value["properties"].get("created").is_none());
        assert_eq!(value["collection"], "corine-land-cover-raster");
        assert_eq!(value["bbox"], json!([9.9, 51.9, 10.1, 52.1]));
    }

    #[rstest]
    fn projected_asset_declares_extension(mut item: Item) {
        assert!(item.stac_extensions.is_empty());
        item.add_asset(
            "legend_txt",
            Asset::new("legend.txt", "Legends", media_type::TEXT, &["metadata"]),
        );
        assert!(item.stac_extensions.is_empty());
        item.add_asset(
            "tif",
            Asset::new("a.tif", "Map", media_type::COG, &["data"]).with_projection(Projection {
                epsg: Some(3035),
                ..Default::default()
            }),
        );
        item.set_projection(Projection {
            epsg: Some(3035),
            ..Default::default()
        });
        assert_eq!(item.stac_extensions, [PROJECTION_EXTENSION]);
        assert_eq!(item.epsg_codes().collect::<Vec<_>>(), [3035, 3035]);
    }

    #[rstest]
    fn survives_a_round_trip(item: Item) {
        let text = serde_json::to_string(&item).unwrap();
        assert_eq!(serde_json::from_str::<Item>(&text).unwrap(), item);
    }

    #[rstest]
    fn set_link_replaces_same_relation(mut item: Item) {
        item.set_link(Link::json("parent", "../a.json"));
        item.set_link(Link::json("parent", "../b.json"));
        assert_eq!(item.links.len(), 1);
        assert_eq!(item.links[0].href, "../b.json");
    }
}
