//! Urban Atlas Building Height, one item per delivered city archive.
use log::{debug, error, info};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use super::{common, Product};
use crate::{
    components::{
        deconstruct_id, AssetTemplate, Field, FilenameGrammar, IsoMetadata, NameParts,
        PresentationTable, RasterFile,
    },
    errors::{CatalogError, Result},
    stac::{media_type, year_interval, Asset, Collection, Extent, Item, Properties},
};

/// Upper-cased archive stem, e.g. `AT001_WIEN_UA2012_DHM_V020`.
pub static GRAMMAR: LazyLock<FilenameGrammar> = LazyLock::new(|| {
    FilenameGrammar::new(
        "uabh",
        Field::Id,
        r"^(?P<city_code>[A-Z]{2}[0-9A-Z]{3,5})_(?P<city>[A-Z0-9_-]+?)_UA(?P<year>\d{4})_DHM_(?P<version>V\d{3})$",
    )
});

const TITLE: &str = "Urban Atlas Building Height 10m";
const DESCRIPTION: &str = "Urban Atlas building height over capital cities.";
const KEYWORDS: &[&str] = &["Buildings", "Building height", "Elevation"];
const BBOX: [f64; 4] = [-22.13, 35.07, 33.48, 64.38];

const DATA: &[&str] = &["data"];
const METADATA: &[&str] = &["metadata"];

const ITEM_ASSETS: PresentationTable = PresentationTable(&[
    (
        "dataset",
        AssetTemplate::new("Building height raster", media_type::GEOTIFF, DATA),
    ),
    (
        "metadata",
        AssetTemplate::new("Building height metadata", media_type::XML, METADATA),
    ),
    (
        "quality_check_report",
        AssetTemplate::new("Quality check report", media_type::PDF, METADATA),
    ),
    (
        "quality_control_report",
        AssetTemplate::new("Quality control report", media_type::PDF, METADATA),
    ),
    (
        "pixel_based_info_shp",
        AssetTemplate::new("Pixel based info shape format", media_type::OCTET_STREAM, METADATA),
    ),
    (
        "pixel_based_info_shx",
        AssetTemplate::new("Pixel based info shape index", media_type::OCTET_STREAM, METADATA),
    ),
    (
        "pixel_based_info_dbf",
        AssetTemplate::new("Pixel based info attribute", media_type::X_DBF, METADATA),
    ),
    (
        "pixel_based_info_prj",
        AssetTemplate::new("Pixel based info projection description", media_type::TEXT, METADATA),
    ),
    (
        "pixel_based_info_cpg",
        AssetTemplate::new("Pixel based info character encoding", media_type::TEXT, METADATA),
    ),
    (
        "compressed_dataset",
        AssetTemplate::new("Compressed building height raster", media_type::ZIP, DATA),
    ),
]);

/// Folders of an extracted archive that hold item assets.
const ASSET_FOLDERS: &[&str] = &["Dataset", "Doc", "Metadata", "PixelBasedInfo", "QC"];

fn folder_title(folder: &str, extension: &str) -> Option<String> {
    let title = match folder {
        "Dataset" => "Building Height Dataset",
        "Doc" => "Quality Check Report",
        "Metadata" => "Building Height Dataset Metadata",
        "PixelBasedInfo" => return Some(format!("pixel_based_info_{extension}")),
        "QC" => "Quality Control Report",
        _ => return None,
    };
    Some(title.into())
}

fn extension_media_type(extension: &str) -> Option<(&'static str, &'static [&'static str])> {
    Some(match extension {
        "tif" => (media_type::GEOTIFF, DATA),
        "zip" => (media_type::ZIP, DATA),
        "xml" => (media_type::XML, METADATA),
        "pdf" => (media_type::PDF, METADATA),
        "shp" | "shx" => (media_type::OCTET_STREAM, METADATA),
        "dbf" => (media_type::X_DBF, METADATA),
        "cpg" | "prj" => (media_type::TEXT, METADATA),
        _ => return None,
    })
}

/// `"{year} {City} building height {version}"`
pub fn describe(parts: &NameParts) -> Result<String> {
    let city = common::title_case(&parts.get("city")?.replace('_', " "));
    Ok(format!(
        "{} {city} building height {}",
        parts.get("year")?,
        parts.get("version")?
    ))
}

/// Asset for a file of an extracted archive, keyed by its name.
fn create_asset(path: &Path) -> Result<(String, Asset)> {
    let name = common::file_name(path);
    let unknown = || CatalogError::UnknownAssetKey(name.clone());
    let extension = name.rsplit('.').next().unwrap_or_default();
    let (media_type, roles) = extension_media_type(extension).ok_or_else(unknown)?;
    let title = if extension == "zip" {
        "Compressed Building Height Metadata".to_owned()
    } else {
        let folder = path
            .parent()
            .map(common::file_name)
            .unwrap_or_default();
        folder_title(&folder, extension).ok_or_else(unknown)?
    };
    Ok((
        common::asset_key(&name),
        Asset::new(common::href(path), title, media_type, roles),
    ))
}

#[derive(Debug)]
pub struct UabhArchive {
    /// The delivered `.zip`, extracted next to itself.
    pub archive: PathBuf,
}

#[derive(Debug, Default)]
pub struct Uabh;

impl Uabh {
    fn metadata_file(dir: &Path, city_code: &str) -> Result<PathBuf> {
        let metadata_dir = dir.join("Metadata");
        let mut candidates: Vec<PathBuf> = fs::read_dir(&metadata_dir)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| {
                let name = common::file_name(path);
                name.starts_with(city_code) && name.ends_with(".xml")
            })
            .collect();
        candidates.sort();
        candidates
            .into_iter()
            .next()
            .ok_or(CatalogError::MissingFile {
                what: "ISO metadata",
                path: metadata_dir,
            })
    }

    fn asset_files(dir: &Path, city_code: &str) -> Result<Vec<PathBuf>> {
        let files = common::files_under(dir)?;
        let in_folder = |path: &Path, folder: &str| {
            path.parent()
                .is_some_and(|parent| parent.to_string_lossy().ends_with(folder))
        };
        let mut assets = Vec::new();
        for folder in ASSET_FOLDERS {
            assets.extend(files.iter().filter(|path| {
                common::file_name(path).starts_with(city_code) && in_folder(path, folder)
            }).cloned());
        }
        assets.extend(files.iter().filter(|path| {
            let name = common::file_name(path);
            name.starts_with(city_code) && name.ends_with(".zip")
        }).cloned());
        Ok(assets)
    }
}

impl Product for Uabh {
    const COLLECTION_ID: &'static str = "urban-atlas-building-height";
    const SCHEMA: &'static str = "uabh";
    type Unit = UabhArchive;

    fn discover(&self, root: &Path) -> Result<Vec<UabhArchive>> {
        let archives: Vec<_> = common::files_under(root)?
            .into_iter()
            .filter(|path| path.extension().is_some_and(|extension| extension == "zip"))
            .map(|archive| UabhArchive { archive })
            .collect();
        debug!("Found {} UABH archives under {}", archives.len(), root.display());
        Ok(archives)
    }

    fn create_item<F: RasterFile>(&self, unit: &UabhArchive) -> Result<Item> {
        let dir = unit.archive.parent().unwrap_or(Path::new(""));
        let stem = common::file_name(&unit.archive);
        let product_id = stem.split('.').next().unwrap_or_default().to_uppercase();
        let parts = deconstruct_id(&product_id, &GRAMMAR).require(&GRAMMAR)?;
        let city_code = parts.get("city_code")?;

        let raster = F::open(dir.join("Dataset").join(format!("{product_id}.tif")))?.summary()?;
        let metadata = IsoMetadata::from_file(Self::metadata_file(dir, city_code)?)?;
        let (year_start, year_end) = year_interval(parts.year("year")?)?;

        let properties = Properties::new(
            metadata.start.unwrap_or(year_start),
            metadata.end.unwrap_or(year_end),
        )
        .with_created(metadata.created)
        .with_description(describe(&parts)?)
        .with_providers(vec![common::clms_provider()]);
        let mut item = Item::new(
            &product_id,
            &raster.bounds.to_wgs84()?,
            properties,
            Self::COLLECTION_ID,
        );
        item.set_projection(raster.truncated_projection());
        item.add_link(common::clms_license());

        for file in Self::asset_files(dir, city_code)? {
            match create_asset(&file) {
                Ok((key, asset)) => item.add_asset(key, asset),
                Err(err) => error!("{product_id}: skipping {}: {err}", file.display()),
            }
        }
        info!("Created item {product_id}");
        Ok(item)
    }

    fn create_collection(&self, _root: Option<&Path>, _items: &[Item]) -> Result<Collection> {
        let (start, _) = year_interval(2012)?;
        let mut collection = Collection::new(
            Self::COLLECTION_ID,
            DESCRIPTION,
            Extent::new(BBOX, Some(start), None),
        )
        .with_title(TITLE)
        .with_keywords(KEYWORDS)
        .with_providers(vec![common::clms_provider()]);
        collection.set_epsg_summary(vec![3035]);
        collection.set_item_assets(
            ITEM_ASSETS
                .iter()
                .map(|(key, template)| (key.to_owned(), template.definition())),
        );
        collection.add_link(common::clms_license());
        Ok(collection)
    }
}
