//! Natura 2000 Land Cover/Land Use status, published as a bare collection.
use log::error;
use std::{convert::Infallible, path::Path};

use super::{common, Product};
use crate::{
    components::RasterFile,
    errors::{CatalogError, Result},
    stac::{media_type, year_interval, Asset, Collection, Extent, Item},
};

const TITLE: &str = "Natura 2000 Land Cover/Land Use Status";
const DESCRIPTION: &str = "The Copernicus Land Cover/Land Use (LC/LU) status map as part of the \
Copernicus Land Monitoring Service (CLMS) Local Component, tailored to the needs of biodiversity \
monitoring in selected Natura2000 sites (4790 sites of natural and semi-natural grassland \
formations listed in Annex I of the Habitats Directive) including a 2km buffer zone surrounding \
the sites and covering an area of 631.820 km² across Europe. LC/LU is extracted from VHR \
satellite data and other available data.";
const KEYWORDS: &[&str] = &[
    "Copernicus",
    "Satellite image interpretation",
    "Land monitoring",
    "Land",
    "Landscape alteration",
    "Land use",
    "Land cover",
    "Landscape",
];
const BBOX: [f64; 4] = [-16.82, 27.87, 33.17, 66.79];
const EXTENSIONS: &[&str] = &["xml", "lyr", "qml", "sld", "gpkg", "gdb", "zip"];
const DATA: &[&str] = &["data"];
const METADATA: &[&str] = &["metadata"];

/// Asset keyed by the file name, e.g. `N2K_2018_3035_v010_fgdb.zip`.
///
/// The year is the second `_` separated field and the format the last one before the extension.
pub fn create_asset(path: &Path) -> Result<(String, Asset)> {
    let name = common::file_name(path);
    let asset_id = common::asset_key(&name);
    let year = name
        .split('_')
        .nth(1)
        .ok_or_else(|| CatalogError::MissingNamePart {
            name: name.clone(),
            key: "year".into(),
        })?;
    let format = asset_id
        .rsplit('_')
        .nth(1)
        .unwrap_or_default()
        .to_uppercase();
    let status = format!("Natura 2000 {year} Land Cover/Land Use Status");
    let (title, media_type, roles) = match name.rsplit('.').next() {
        Some("zip") => (format!("Compressed {status} {format}"), media_type::ZIP, DATA),
        Some("gpkg") => (format!("{status} {format}"), media_type::GEOPACKAGE, DATA),
        Some("gdb") => (format!("{status} {format}"), media_type::FILEGDB, DATA),
        Some("xml") => (format!("{status} Metadata"), media_type::XML, METADATA),
        Some("lyr") => (
            format!("{status} ArcGIS Layer File"),
            media_type::OCTET_STREAM,
            METADATA,
        ),
        Some("qml") => (
            format!("{status} QGIS Layer File"),
            media_type::OCTET_STREAM,
            METADATA,
        ),
        Some("sld") => (
            format!("{status} OGC Layer File"),
            media_type::OCTET_STREAM,
            METADATA,
        ),
        _ => return Err(CatalogError::UnknownAssetKey(name.clone())),
    };
    Ok((
        asset_id,
        Asset::new(common::href(path), title, media_type, roles),
    ))
}

#[derive(Debug, Default)]
pub struct Natura2000;

impl Product for Natura2000 {
    const COLLECTION_ID: &'static str = "natura2000";
    const SCHEMA: &'static str = "n2k";
    type Unit = Infallible;

    fn discover(&self, _root: &Path) -> Result<Vec<Infallible>> {
        Err(CatalogError::NoItems(Self::COLLECTION_ID))
    }

    fn create_item<F: RasterFile>(&self, unit: &Infallible) -> Result<Item> {
        match *unit {}
    }

    fn create_collection(&self, root: Option<&Path>, _items: &[Item]) -> Result<Collection> {
        let (start, _) = year_interval(2006)?;
        let mut collection = Collection::new(
            Self::COLLECTION_ID,
            DESCRIPTION,
            Extent::new(BBOX, Some(start), None),
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

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;

    #[rstest]
    #[case(
        "N2K_2018_3035_v010_fgdb.zip",
        "Compressed Natura 2000 2018 Land Cover/Land Use Status FGDB",
        media_type::ZIP
    )]
    #[case(
        "N2K_2018_3035_v010.gpkg",
        "Natura 2000 2018 Land Cover/Land Use Status V010",
        media_type::GEOPACKAGE
    )]
    #[case(
        "N2K_2018_3035_v010_symbology.qml",
        "Natura 2000 2018 Land Cover/Land Use Status QGIS Layer File",
        media_type::OCTET_STREAM
    )]
    #[case(
        "N2K_2006_metadata.xml",
        "Natura 2000 2006 Land Cover/Land Use Status Metadata",
        media_type::XML
    )]
    fn titles(#[case] name: &str, #[case] title: &str, #[case] media_type: &str) {
        let (_, asset) = create_asset(Path::new(name)).unwrap();
        assert_eq!(asset.title.as_deref(), Some(title));
        assert_eq!(asset.media_type.as_deref(), Some(media_type));
    }

    #[rstest]
    fn names_without_year_are_rejected() {
        assert!(matches!(
            create_asset(Path::new("legend.lyr")),
            Err(CatalogError::MissingNamePart { .. })
        ));
    }

    #[rstest]
    fn collection_collects_every_format() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("N2K_2018_3035_v010_fgdb.gdb")).unwrap();
        for file in [
            "N2K_2018_3035_v010_fgdb.zip",
            "N2K_2018_3035_v010.gpkg",
            "N2K_2018_3035_v010.sld",
            "N2K_2018_3035_v010.lyr",
            "N2K_2018_metadata.xml",
            "readme.txt",
        ] {
            fs::write(dir.path().join(file), "").unwrap();
        }
        let collection = Natura2000.create_collection(Some(dir.path()), &[]).unwrap();
        let keys: Vec<_> = collection.assets.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            [
                "N2K_2018_3035_v010_fgdb_gdb",
                "N2K_2018_3035_v010_fgdb_zip",
                "N2K_2018_3035_v010_gpkg",
                "N2K_2018_3035_v010_lyr",
                "N2K_2018_3035_v010_sld",
                "N2K_2018_metadata_xml",
            ]
        );
        assert_eq!(collection.summaries.unwrap().epsg, [3035]);
    }
}
