//! EU-Hydro river network database, published as a bare collection.
use log::error;
use std::{convert::Infallible, path::Path};

use super::{common, Product};
use crate::{
    components::RasterFile,
    errors::{CatalogError, Result},
    stac::{media_type, year_interval, Asset, Collection, Extent, Item},
};

const TITLE: &str = "EU-Hydro River Network Database";
const DESCRIPTION: &str = "EU-Hydro is a dataset for all EEA38 countries and the United Kingdom \
providing photo-interpreted river network, consistent of surface interpretation of water bodies \
(lakes and wide rivers), and a drainage model (also called Drainage Network), derived from \
EU-DEM, with catchments and drainage lines and nodes.";
const KEYWORDS: &[&str] = &[
    "Hydrography",
    "Land cover",
    "River",
    "Environment",
    "Ocean",
    "Catchment area",
    "Land",
    "Hydrographic network",
    "Drainage system",
    "Hydrology",
    "Landscape alteration",
    "Inland water",
    "Canal",
    "Drainage",
    "Catchment",
    "Water body",
];
const BBOX: [f64; 4] = [-61.906047, -21.482245, 55.935919, 71.409109];
const EXTENSIONS: &[&str] = &["xml", "pdf", "gpkg", "gdb"];
const DATA: &[&str] = &["data"];
const METADATA: &[&str] = &["metadata"];

fn capitalize(word: &str) -> String {
    let mut characters = word.chars();
    match characters.next() {
        Some(first) => first
            .to_uppercase()
            .chain(characters.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Asset keyed by the file name; the title spells out its words without the extension.
pub fn create_asset(path: &Path) -> Result<(String, Asset)> {
    let name = common::file_name(path);
    let asset_id = common::asset_key(&name);
    let (media_type, roles) = match name.rsplit('.').next() {
        Some("gpkg") => (media_type::GEOPACKAGE, DATA),
        Some("gdb") => (media_type::FILEGDB, DATA),
        Some("xml") => (media_type::XML, METADATA),
        Some("pdf") => (media_type::PDF, METADATA),
        _ => return Err(CatalogError::UnknownAssetKey(name.clone())),
    };
    let words: Vec<&str> = asset_id.split('_').collect();
    let title = words[..words.len() - 1]
        .iter()
        .map(|word| capitalize(word))
        .collect::<Vec<_>>()
        .join(" ");
    Ok((
        asset_id,
        Asset::new(common::href(path), title, media_type, roles),
    ))
}

#[derive(Debug, Default)]
pub struct EuHydro;

impl Product for EuHydro {
    const COLLECTION_ID: &'static str = "eu-hydro";
    const SCHEMA: &'static str = "eu-hydro";
    type Unit = Infallible;

    fn discover(&self, _root: &Path) -> Result<Vec<Infallible>> {
        Err(CatalogError::NoItems(Self::COLLECTION_ID))
    }

    fn create_item<F: RasterFile>(&self, unit: &Infallible) -> Result<Item> {
        match *unit {}
    }

    fn create_collection(&self, root: Option<&Path>, _items: &[Item]) -> Result<Collection> {
        let (start, _) = year_interval(2006)?;
        let (_, end) = year_interval(2012)?;
        let mut collection = Collection::new(
            Self::COLLECTION_ID,
            DESCRIPTION,
            Extent::new(BBOX, Some(start), Some(end)),
        )
        .with_title(TITLE)
        .with_keywords(KEYWORDS)
        .with_providers(vec![common::clms_provider()]);
        collection.set_epsg_summary(vec![3035]);
        collection.add_link(common::clms_license());

        if let Some(root) = root {
            for path in common::by_extension(root, EXTENSIONS)? {
                match create_asset(&path) {
                    Ok((key, asset)) => collection.add_asset(key, asset),
                    Err(err) => error!("{}: {err}", Self::COLLECTION_ID),
                }
            }
        }
        Ok(collection)
    }
}
