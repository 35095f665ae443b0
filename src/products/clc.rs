//! CORINE Land Cover rasters.
use log::{debug, error, info};
use std::{
    path::{Path, PathBuf},
    sync::{Arc, LazyLock},
};

use super::{common, Product};
use crate::{
    components::{
        deconstruct, deconstruct_id, AssetTemplate, Field, FilenameGrammar, NameParts,
        PresentationTable, RasterFile,
    },
    errors::Result,
    stac::{
        collection::epsg_summary, media_type, year_interval, Asset, Collection, Extent, Item,
        Properties,
    },
};

pub static GRAMMAR: LazyLock<FilenameGrammar> = LazyLock::new(|| {
    FilenameGrammar::new(
        "clc",
        Field::Id,
        r"U(?P<update_campaign>\d{4})_(?P<theme>CLC|CHA)(?P<reference_year>\d{4})_V(?P<release_year>\d{4})_(?P<release_number>[0-9a-z]*)_?(?P<country_code>[A-Z]*)?_?(?P<DOM_code>[A-Z]*)?",
    )
});

const TITLE: &str = "CORINE Land Cover Raster";
const DESCRIPTION: &str = "The European Commission launched the CORINE (Coordination of \
Information on the Environment) program in an effort to develop a standardized methodology for \
producing continent-scale land cover, biotope, and air quality maps. The CORINE Land Cover (CLC) \
product offers a pan-European land cover and land use inventory with 44 thematic classes, ranging \
from broad forested areas to individual vineyards.";
const KEYWORDS: &[&str] = &[
    "clms",
    "corine",
    "derived data",
    "land cover",
    "machine learning",
    "open data",
];

pub(crate) const ITEM_DESCRIPTION: &str = "Corine Land Cover {year} (CLC{year}) is one of the \
Corine Land Cover (CLC) datasets produced within the frame the Copernicus Land Monitoring Service \
referring to land cover / land use status of year {year}. CLC service has a long-time heritage \
(formerly known as \"CORINE Land Cover Programme\"), coordinated by the European Environment \
Agency (EEA). It provides consistent and thematically detailed information on land cover and land \
cover changes across Europe. CLC datasets are based on the classification of satellite images \
produced by the national teams of the participating countries - the EEA members and cooperating \
countries (EEA39). National CLC inventories are then further integrated into a seamless land \
cover map of Europe. The resulting European database relies on standard methodology and \
nomenclature with following base parameters: 44 classes in the hierarchical 3-level CLC \
nomenclature; minimum mapping unit (MMU) for status layers is 25 hectares; minimum width of \
linear elements is 100 metres. Change layers have higher resolution, i.e. minimum mapping unit \
(MMU) is 5 hectares for Land Cover Changes (LCC), and the minimum width of linear elements is 100 \
metres. The CLC service delivers important data sets supporting the implementation of key \
priority areas of the Environment Action Programmes of the European Union as e.g. protecting \
ecosystems, halting the loss of biological diversity, tracking the impacts of climate change, \
monitoring urban land take, assessing developments in agriculture or dealing with water \
resources directives. CLC belongs to the Pan-European component of the Copernicus Land \
Monitoring Service (https://land.copernicus.eu/), part of the European Copernicus Programme \
coordinated by the European Environment Agency, providing environmental information from a \
combination of air- and space-based observation systems and in-situ monitoring. Additional \
information about CLC product description including mapping guides can be found at \
https://land.copernicus.eu/user-corner/technical-library/. CLC class descriptions can be found at \
https://land.copernicus.eu/user-corner/technical-library/corine-land-cover-nomenclature-guidelines/html/.";

pub(crate) const PREVIEW_HREF: &str =
    "https://sdi.eea.europa.eu/public/catalogue-graphic-overview/960998c1-1870-4e82-8051-6485205ebbac.png";

const METADATA: &[&str] = &["metadata"];

/// Item assets of the CLC and CLC+ rasters, keyed by suffix.
pub(crate) const ITEM_ASSETS: PresentationTable = PresentationTable(&[
    (
        "tif",
        AssetTemplate::new(
            "Single Band Land Classification {label}",
            media_type::COG,
            &["data", "visual"],
        ),
    ),
    (
        "tif_xml",
        AssetTemplate::new("TIFF Metadata {label}", media_type::XML, METADATA),
    ),
    (
        "tif_aux_xml",
        AssetTemplate::new("TIFF Statistics {label}", media_type::XML, METADATA),
    ),
    (
        "tif_ovr",
        AssetTemplate::new("Pyramid {label}", media_type::GEOTIFF_PYRAMID, METADATA),
    ),
    (
        "tif_vat_cpg",
        AssetTemplate::new("Encoding {label}", media_type::TEXT, METADATA),
    ),
    (
        "tif_vat_dbf",
        AssetTemplate::new("Database {label}", media_type::DBF, METADATA),
    ),
    (
        "legend_txt",
        AssetTemplate::new("Legends {label}", media_type::TEXT, METADATA),
    ),
    (
        "tif_lyr",
        AssetTemplate::new("Legend Layer {label}", media_type::GEOTIFF_LAYER, METADATA),
    ),
    (
        "tfw",
        AssetTemplate::new("World File {label}", media_type::TEXT, METADATA),
    ),
    (
        "xml",
        AssetTemplate::new(
            "Single Band Land Classification Metadata {label}",
            media_type::XML,
            METADATA,
        ),
    ),
    (
        "readme_txt",
        AssetTemplate::new("Description {label}", media_type::TEXT, METADATA),
    ),
    (
        "preview",
        AssetTemplate::new(
            "Single Band Land Classification Thumbnail {label}",
            media_type::PNG,
            &["thumbnail"],
        ),
    ),
]);

const COLLECTION_ASSETS: PresentationTable = PresentationTable(&[
    (
        "clc_country_coverage",
        AssetTemplate::new("Coverage", media_type::PDF, METADATA),
    ),
    (
        "clc_file_naming",
        AssetTemplate::new("Naming Convention Description", media_type::TEXT, METADATA),
    ),
    (
        "readme",
        AssetTemplate::new("Description", media_type::TEXT, METADATA),
    ),
]);

/// Region shown in asset titles for a French overseas department code.
pub fn dom_label(code: &str) -> &str {
    match code {
        "" => "Europe",
        "GLP" => "Guadeloupe",
        "GUF" => "French Guyana",
        "MTQ" => "Martinique",
        "MYT" => "Mayotte",
        "REU" => "Réunion",
        other => other,
    }
}

/// Presentation key of an item file: readmes and QGIS legends are told apart by name.
pub(crate) fn presentation_key(parts: &NameParts) -> Result<String> {
    let id = parts.get("id")?;
    let suffix = common::asset_key(parts.get("suffix")?);
    Ok(if id.starts_with("readme") {
        format!("readme_{suffix}")
    } else if id.ends_with("QGIS") {
        format!("legend_{suffix}")
    } else {
        suffix
    })
}

#[derive(Debug)]
pub struct ClcImage {
    pub image: PathBuf,
    /// Every file of the archive, shared by all images.
    pub files: Arc<[PathBuf]>,
}

#[derive(Debug, Default)]
pub struct Clc;

impl Clc {
    fn is_image_dir(dir: &Path) -> bool {
        let dir = dir.to_string_lossy();
        dir.ends_with("DATA") || dir.ends_with("French_DOMs")
    }

    /// Files that belong to the item of `parts`, the image itself included.
    fn item_files<'a>(parts: &NameParts, files: &'a [PathBuf]) -> Result<Vec<&'a Path>> {
        let id = parts.get("id")?;
        let dom_code = parts.get("DOM_code")?;
        let campaign_dir = parts
            .format("U{update_campaign}_{theme}{reference_year}_V{release_year}")?
            .to_lowercase();
        let readme = format!("readme_{id}.txt");
        let layer_suffix = format!("{dom_code}.tif.lyr");
        let own_prefix = format!("{id}.");

        Ok(files
            .iter()
            .filter(|file| {
                let dir = file
                    .parent()
                    .map(|dir| dir.to_string_lossy().into_owned())
                    .unwrap_or_default();
                if dom_code.is_empty() && dir.contains("French_DOMs") {
                    return false;
                }
                if !dom_code.is_empty() && dir.contains("Legend") && !dir.contains("French_DOMs") {
                    return false;
                }
                if !dir.to_lowercase().contains(&campaign_dir) {
                    return false;
                }
                let name = common::file_name(file);
                name.starts_with(&own_prefix)
                    || name.ends_with(&layer_suffix)
                    || name.ends_with("QGIS.txt")
                    || name == readme
            })
            .filter(|file| !file.to_string_lossy().ends_with("aux"))
            .map(PathBuf::as_path)
            .collect())
    }

    fn collection_asset(path: &Path) -> Option<(String, Asset)> {
        let name = common::file_name(path);
        let key = if name.starts_with("clc-country-coverage") && name.ends_with("pdf") {
            "clc_country_coverage"
        } else if name.starts_with("clc-file-naming-convention") {
            "clc_file_naming"
        } else if name.starts_with("readme") && name.ends_with("raster.txt") {
            "readme"
        } else {
            return None;
        };
        let parts = deconstruct(path, &GRAMMAR);
        let asset_id = parts
            .get("id")
            .map(str::to_owned)
            .unwrap_or_else(|_| common::asset_key(&name));
        let template = COLLECTION_ASSETS.lookup(key).ok()?;
        Some((asset_id, template.asset(common::href(path), "")))
    }
}

impl Product for Clc {
    const COLLECTION_ID: &'static str = "corine-land-cover-raster";
    const SCHEMA: &'static str = "clc";
    type Unit = ClcImage;

    fn discover(&self, root: &Path) -> Result<Vec<ClcImage>> {
        let files: Arc<[PathBuf]> = common::files_under(root)?.into();
        let images: Vec<ClcImage> = files
            .iter()
            .filter(|file| {
                file.extension().is_some_and(|extension| extension == "tif")
                    && file.parent().is_some_and(Self::is_image_dir)
            })
            .map(|image| ClcImage {
                image: image.clone(),
                files: Arc::clone(&files),
            })
            .collect();
        debug!("Found {} CLC images under {}", images.len(), root.display());
        Ok(images)
    }

    fn create_item<F: RasterFile>(&self, unit: &ClcImage) -> Result<Item> {
        let parts = deconstruct(&unit.image, &GRAMMAR).require(&GRAMMAR)?;
        let id = parts.get("id")?;
        let dom_code = parts.get("DOM_code")?;
        let label = dom_label(dom_code);
        let year = parts.year("reference_year")?;
        let (start, end) = year_interval(year)?;

        let raster = F::open(&unit.image)?.summary()?;
        let properties = Properties::new(start, end)
            .with_description(ITEM_DESCRIPTION.replace("{year}", &year.to_string()))
            .with_providers(vec![common::clms_provider()]);
        let mut item = Item::new(
            id,
            &raster.bounds.to_wgs84()?,
            properties,
            Self::COLLECTION_ID,
        );
        item.add_link(common::clms_license());

        for file in Self::item_files(&parts, &unit.files)? {
            let file_parts = deconstruct(file, &GRAMMAR);
            let asset = presentation_key(&file_parts).and_then(|key| {
                let template = ITEM_ASSETS.lookup(&key)?;
                let asset_id = format!(
                    "{}_{}",
                    file_parts.get("id")?,
                    common::asset_key(file_parts.get("suffix")?)
                );
                Ok((asset_id, template.asset(common::href(file), label)))
            });
            match asset {
                Ok((asset_id, asset)) => item.add_asset(asset_id, asset),
                Err(err) => error!("{id}: skipping {}: {err}", file.display()),
            }
        }
        item.add_asset("preview", ITEM_ASSETS.lookup("preview")?.asset(PREVIEW_HREF, label));

        let image_key = common::asset_key(&common::file_name(&unit.image));
        if let Some(asset) = item.assets.remove(&image_key) {
            item.add_asset(image_key, asset.with_projection(raster.projection()));
        }
        info!("Created item {id}");
        Ok(item)
    }

    fn item_dir(&self, item: &Item) -> Option<String> {
        let parts = deconstruct_id(&item.id, &GRAMMAR);
        let dom_code = parts.get("DOM_code").unwrap_or_default();
        let dir = if dom_code.is_empty() {
            item.id.as_str()
        } else {
            item.id
                .strip_suffix(&format!("_FR_{dom_code}"))
                .unwrap_or(&item.id)
        };
        Some(dir.to_owned())
    }

    fn create_collection(&self, root: Option<&Path>, items: &[Item]) -> Result<Collection> {
        let (start, _) = year_interval(1990)?;
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
                if let Some((key, asset)) = Self::collection_asset(&file) {
                    collection.add_asset(key, asset);
                }
            }
        }
        collection.update_extent_from_items(items);
        collection.set_epsg_summary(epsg_summary(items));
        Ok(collection)
    }
}
