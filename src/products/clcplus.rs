//! CORINE Land Cover Plus Backbone rasters.
use log::{debug, error, info};
use std::{
    path::{Path, PathBuf},
    sync::{Arc, LazyLock},
};

use super::{
    clc::{presentation_key, ITEM_ASSETS, ITEM_DESCRIPTION, PREVIEW_HREF},
    common, Product,
};
use crate::{
    components::{
        deconstruct, deconstruct_id, AssetTemplate, Field, FilenameGrammar, PresentationTable,
        RasterFile,
    },
    errors::Result,
    stac::{collection::epsg_summary, media_type, year_interval, Collection, Extent, Item, Properties},
};

pub static GRAMMAR: LazyLock<FilenameGrammar> = LazyLock::new(|| {
    FilenameGrammar::new(
        "clcplus",
        Field::Id,
        r"CLMS_CLCplus_(?P<product_acronym>[A-Z]{6})_(?P<reference_year>[0-9]{4})_(?P<resolution>[0-9a-z]{4})_(?P<extent>[0-9A-Za-z]{2,5})_(?P<epsg>[0-9]*)_(?P<version>V[0-9]_[0-9])",
    )
});

const TITLE: &str = "CORINE Land Cover Plus Backbone";
const DESCRIPTION: &str = "The CLC+ Backbone constitutes the first component of the CLMS's new \
'CLC+ Product Suite', which represents a true paradigm change in European land cover/land use \
(LC/LU) monitoring, building on the rich legacy of the European CORINE Land Cover (CLC) flagship \
product. The CLC+ Backbone is an object-oriented, large scale, wall-to-wall (EEA-38 + UK), \
high-resolution (HR) inventory of European LC in a vector format accompanied by a raster product \
layer, providing a consistent pan-European geometric backbone of Landscape Objects with limited, \
but robust thematic detail, on which many other applications can be built.";
const KEYWORDS: &[&str] = &["Copernicus", "Land Monitoring", "Land Cover", "CLC+"];

const COLLECTION_ASSETS: PresentationTable = PresentationTable(&[
    (
        "clcplus_product_specification",
        AssetTemplate::new("Product Specification", media_type::PDF, &["metadata"]),
    ),
    (
        "clcplus_product_specification_raster",
        AssetTemplate::new("Product Specification Raster", media_type::PDF, &["metadata"]),
    ),
]);

/// Region shown in asset titles for an extent code, in any case.
pub fn extent_label(extent: &str) -> &str {
    match extent.to_ascii_uppercase().as_str() {
        "EU" => "Europe",
        "GLP" => "Guadeloupe",
        "GUF" => "French Guyana",
        "MTQ" => "Martinique",
        "MYT" => "Mayotte",
        "REU" => "Réunion",
        _ => extent,
    }
}

#[derive(Debug)]
pub struct ClcPlusImage {
    pub image: PathBuf,
    pub files: Arc<[PathBuf]>,
}

#[derive(Debug, Default)]
pub struct ClcPlus;

impl Product for ClcPlus {
    const COLLECTION_ID: &'static str = "corine-land-cover-plus-raster";
    const SCHEMA: &'static str = "clcplus";
    type Unit = ClcPlusImage;

    fn discover(&self, root: &Path) -> Result<Vec<ClcPlusImage>> {
        let files: Arc<[PathBuf]> = common::files_under(root)?.into();
        let images: Vec<_> = files
            .iter()
            .filter(|file| {
                file.extension().is_some_and(|extension| extension == "tif")
                    && file
                        .parent()
                        .is_some_and(|dir| dir.to_string_lossy().contains("Data"))
            })
            .map(|image| ClcPlusImage {
                image: image.clone(),
                files: Arc::clone(&files),
            })
            .collect();
        debug!("Found {} CLC+ images under {}", images.len(), root.display());
        Ok(images)
    }

    fn create_item<F: RasterFile>(&self, unit: &ClcPlusImage) -> Result<Item> {
        let parts = deconstruct(&unit.image, &GRAMMAR).require(&GRAMMAR)?;
        let id = parts.get("id")?;
        let label = extent_label(parts.get("extent")?);
        let year = parts.year("reference_year")?;
        let (start, end) = year_interval(year)?;

        let raster = F::open(&unit.image)?.summary()?;
        let properties = Properties::new(start, end)
            .with_description(ITEM_DESCRIPTION.replace("{year}", &year.to_string()))
            .with_providers(vec![common::clms_provider()]);
        let mut item = Item::new(id, &raster.bounds.to_wgs84()?, properties, Self::COLLECTION_ID);
        item.add_link(common::clms_license());

        let own_prefix = format!("{id}.");
        let layer_suffix = format!("{}.tif.lyr", parts.get("extent")?);
        let readme = format!("readme_{id}.txt");
        let image_key = common::asset_key(&common::file_name(&unit.image));
        for file in unit.files.iter() {
            let name = common::file_name(file);
            if !(name.starts_with(&own_prefix)
                || name.ends_with(&layer_suffix)
                || name.ends_with("QGIS.txt")
                || name == readme)
                || name.ends_with("aux")
            {
                continue;
            }
            let asset = presentation_key(&deconstruct(file, &GRAMMAR)).and_then(|key| {
                let mut asset = ITEM_ASSETS.lookup(&key)?.asset(common::href(file), label);
                if common::asset_key(&name) == image_key {
                    asset = asset.with_projection(raster.projection());
                }
                Ok((format!("clc_map_{key}"), asset))
            });
            match asset {
                Ok((key, asset)) => item.add_asset(key, asset),
                Err(err) => error!("{id}: skipping {}: {err}", file.display()),
            }
        }
        item.add_asset("preview", ITEM_ASSETS.lookup("preview")?.asset(PREVIEW_HREF, label));
        info!("Created item {id}");
        Ok(item)
    }

    fn item_dir(&self, item: &Item) -> Option<String> {
        let dir = deconstruct_id(&item.id, &GRAMMAR)
            .format("clms_clcplus_{product_acronym}_{reference_year}_{resolution}_{version}")
            .unwrap_or_else(|_| item.id.clone());
        Some(dir)
    }

    fn create_collection(&self, root: Option<&Path>, items: &[Item]) -> Result<Collection> {
        let (start, _) = year_interval(1900)?;
        let mut collection = Collection::new(Self::COLLECTION_ID, DESCRIPTION, Extent::open(start))
            .with_title(TITLE)
            .with_keywords(KEYWORDS)
            .with_license("proprietary")
            .with_providers(vec![common::clms_provider()]);
        collection.set_item_assets(
            ITEM_ASSETS
                .iter()
                .map(|(key, template)| (format!("clc_map_{key}"), template.definition())),
        );
        collection.add_link(common::clms_license());

        if let Some(root) = root {
            for file in common::files_under(root)? {
                let name = common::file_name(&file);
                if !name.starts_with("CLC+BB_User_Manual") {
                    continue;
                }
                let key = if name.contains("raster") {
                    "clcplus_product_specification_raster"
                } else {
                    "clcplus_product_specification"
                };
                let template = COLLECTION_ASSETS.lookup(key)?;
                collection.add_asset(key, template.asset(common::href(&file), ""));
            }
        }
        collection.update_extent_from_items(items);
        collection.set_epsg_summary(epsg_summary(items));
        Ok(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::files::fake::FakeRaster;
    use rstest::rstest;
    use std::fs;

    const ID: &str = "CLMS_CLCplus_RASTER_2018_010m_eu_03035_V1_1";

    #[rstest]
    #[case("eu", "Europe")]
    #[case("GLP", "Guadeloupe")]
    #[case("reu", "Réunion")]
    #[case("XYZ", "XYZ")]
    fn extent_labels(#[case] extent: &str, #[case] label: &str) {
        assert_eq!(extent_label(extent), label);
    }

    #[rstest]
    fn grammar() {
        let parts = deconstruct(format!("Data/{ID}.tif"), &GRAMMAR)
            .require(&GRAMMAR)
            .unwrap();
        assert_eq!(parts.get("product_acronym").unwrap(), "RASTER");
        assert_eq!(parts.get("resolution").unwrap(), "010m");
        assert_eq!(parts.get("extent").unwrap(), "eu");
        assert_eq!(parts.get("epsg").unwrap(), "03035");
        assert_eq!(parts.get("version").unwrap(), "V1_1");
    }

    #[rstest]
    fn builds_item_and_collection() {
        let dir = tempfile::tempdir().unwrap();
        for file in [
            format!("Raster/Data/{ID}.tif"),
            format!("Raster/Data/{ID}.tif.ovr"),
            format!("Raster/Data/{ID}.tif.vat.dbf"),
            format!("Raster/Metadata/{ID}.xml"),
            "Raster/Documents/CLC+BB_User_Manual_raster.pdf".into(),
            "Raster/Documents/CLC+BB_User_Manual.pdf".into(),
        ] {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }

        let units = ClcPlus.discover(dir.path()).unwrap();
        assert_eq!(units.len(), 1);
        let item = ClcPlus.create_item::<FakeRaster>(&units[0]).unwrap();
        let keys: Vec<_> = item.assets.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            [
                "clc_map_tif",
                "clc_map_tif_ovr",
                "clc_map_tif_vat_dbf",
                "clc_map_xml",
                "preview"
            ]
        );
        assert_eq!(item.assets["clc_map_tif"].projection.epsg, Some(3035));
        assert!(item.assets["clc_map_xml"].projection.is_empty());
        assert_eq!(
            item.assets["clc_map_tif_ovr"].title.as_deref(),
            Some("Pyramid Europe")
        );
        assert_eq!(
            ClcPlus.item_dir(&item).unwrap(),
            "clms_clcplus_RASTER_2018_010m_V1_1"
        );

        let collection = ClcPlus.create_collection(Some(dir.path()), &[item]).unwrap();
        let keys: Vec<_> = collection.assets.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["clcplus_product_specification", "clcplus_product_specification_raster"]
        );
        assert_eq!(
            collection.extent.temporal.interval[0][0].unwrap().to_rfc3339(),
            "2018-01-01T00:00:00+00:00"
        );
    }
}
