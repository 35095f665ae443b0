//! Vegetation Phenology and Productivity parameters from a local mirror of the HRVPP bucket.
use itertools::Itertools;
use log::{debug, error, info};
use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use super::{common, Product};
use crate::{
    components::{deconstruct, AssetTemplate, Field, FilenameGrammar, PresentationTable, RasterFile},
    errors::Result,
    stac::{media_type, year_interval, Collection, Extent, Item, Properties},
};

pub static GRAMMAR: LazyLock<FilenameGrammar> = LazyLock::new(|| {
    FilenameGrammar::new(
        "vpp",
        Field::Basename,
        r"^(?P<product>VPP)_(?P<year>\d{4})_(?P<sensor>S2)_(?P<tile>T\d{2}[A-Z]{3})-(?P<resolution>\d{3})m_(?P<version>V\d{3})_(?P<season>s\d)_(?P<parameter>[A-Z]+)\.tif$",
    )
});

/// Object key prefix of one season, relative to the bucket.
pub fn season_prefix(year: i32, season: &str) -> String {
    format!("CLMS/Pan-European/Biophysical/VPP/v01/{year}/{season}")
}

const TITLE: &str = "Vegetation Phenology and Productivity Parameters";
const DESCRIPTION: &str = "Vegetation Phenology and Productivity Parameters (VPP) product is part \
of the Copernicus Land Monitoring Service (CLMS), pan-European High Resolution Vegetation \
Phenology and Productivity (HR-VPP) product suite. The VPP product is comprised of 13 parameters \
that describe specific stages of the seasonal vegetation growth cycle. These parameters are \
extracted from Seasonal Trajectories of the Plant Phenology Index (PPI) derived from Sentinel-2 \
satellite observations at 10m resolution. Since growing seasons can traverse years, VPP \
parameters are provided for a maximum of two growing seasons per year. The parameters include \
(1) start of season (date, PPI value and slope), (2) end of season (date, PPI value and slope), \
(3)length of season, (4) minimum of season, (4) peak of the season (date and PPI value), (5) \
amplitude, (6) small integrated value and (7) large integrated value.";
const KEYWORDS: &[&str] = &[
    "agriculture",
    "clms",
    "derived data",
    "open data",
    "phenology",
    "plant phenology index",
    "vegetation",
];
const BBOX: [f64; 4] = [-25., 26., 45., 72.];
const EPSG: &[u32] = &[
    32620, 32621, 32622, 32625, 32626, 32627, 32628, 32629, 32630, 32631, 32632, 32633, 32634,
    32635, 32636, 32637, 32638, 32738, 32740,
];

const fn parameter(title: &'static str) -> AssetTemplate {
    AssetTemplate::new(title, media_type::GEOTIFF, &["data"])
}

/// Parameter titles; `{label}` is the product version.
const PARAMETERS: PresentationTable = PresentationTable(&[
    ("AMPL", parameter("Season Amplitude {label}")),
    ("EOSD", parameter("Day of End-of-Season {label}")),
    ("EOSV", parameter("Vegetation Index Value at EOSD {label}")),
    ("LENGTH", parameter("Length of Season {label}")),
    ("LSLOPE", parameter("Slope of The Greening Up Period {label}")),
    ("MAXD", parameter("Day of Maximum-of-Season {label}")),
    ("MAXV", parameter("Vegetation Index Value at MAXD {label}")),
    (
        "MINV",
        parameter("Average Vegetation Index Value of Minima on Left and Right Sides of Each Season {label}"),
    ),
    ("QFLAG", parameter("Quality Flag {label}")),
    ("RSLOPE", parameter("Slope of The Senescent Period {label}")),
    ("SOSD", parameter("Day of Start-of-Season {label}")),
    ("SOSV", parameter("Vegetation Index Value at SOSD {label}")),
    ("SPROD", parameter("Seasonal Productivity {label}")),
    ("TPROD", parameter("Total Productivity {label}")),
]);

/// All parameter files of one tile, season and year.
#[derive(Debug)]
pub struct VppTile {
    pub id: String,
    /// Object keys relative to the bucket root, sorted.
    pub keys: Vec<String>,
    pub root: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Vpp {
    pub bucket: String,
    pub start_year: i32,
    pub end_year: i32,
}

impl Default for Vpp {
    fn default() -> Self {
        Self {
            bucket: "HRVPP".into(),
            start_year: 2017,
            end_year: 2023,
        }
    }
}

impl Vpp {
    fn object_key(root: &Path, path: &Path) -> String {
        path.strip_prefix(root)
            .unwrap_or(path)
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .join("/")
    }

    fn item_id(key: &str) -> Result<String> {
        deconstruct(key, &GRAMMAR)
            .require(&GRAMMAR)?
            .format("VPP_{year}_{sensor}_{tile}-{resolution}m_{season}")
    }
}

/// `"010"` → `"10"`
fn resolution_metres(resolution: &str) -> &str {
    let trimmed = resolution.trim_start_matches('0');
    if trimmed.is_empty() {
        "0"
    } else {
        trimmed
    }
}

impl Product for Vpp {
    const COLLECTION_ID: &'static str = "vegetation-phenology-and-productivity";
    const SCHEMA: &'static str = "vpp";
    type Unit = VppTile;

    fn discover(&self, root: &Path) -> Result<Vec<VppTile>> {
        let mut tiles = Vec::new();
        for year in self.start_year..=self.end_year {
            for season in ["s1", "s2"] {
                let dir = root.join(season_prefix(year, season));
                if !dir.is_dir() {
                    debug!("No VPP objects under {}", dir.display());
                    continue;
                }
                let grouped = common::files_under(&dir)?
                    .into_iter()
                    .filter(|path| path.extension().is_some_and(|extension| extension == "tif"))
                    .map(|path| Self::object_key(root, &path))
                    .filter_map(|key| match Self::item_id(&key) {
                        Ok(id) => Some((id, key)),
                        Err(err) => {
                            debug!("Skipping {key}: {err}");
                            None
                        }
                    })
                    .into_group_map();
                tiles.extend(grouped.into_iter().sorted().map(|(id, mut keys)| {
                    keys.sort();
                    VppTile {
                        id,
                        keys,
                        root: root.to_path_buf(),
                    }
                }));
            }
        }
        debug!("Found {} VPP tiles under {}", tiles.len(), root.display());
        Ok(tiles)
    }

    fn create_item<F: RasterFile>(&self, unit: &VppTile) -> Result<Item> {
        let first = unit.keys.first().ok_or(crate::CatalogError::NoItems(Self::COLLECTION_ID))?;
        let parts = deconstruct(first, &GRAMMAR).require(&GRAMMAR)?;
        let year = parts.year("year")?;
        let (start, end) = year_interval(year)?;
        let season = parts.get("season")?;
        let description = format!(
            "The {year} season {} VPP product of tile {} at {} m resolution.",
            season.trim_start_matches('s'),
            parts.get("tile")?,
            resolution_metres(parts.get("resolution")?),
        );

        let path = unit.root.join(first);
        let raster = F::open(&path)?.summary()?;
        let properties = Properties::new(start, end)
            .with_created(common::modified(&path)?)
            .with_description(description)
            .with_providers(vec![common::clms_provider(), common::vito_provider()]);
        let mut item = Item::new(
            &unit.id,
            &raster.bounds.to_wgs84()?,
            properties,
            Self::COLLECTION_ID,
        );
        item.set_projection(raster.truncated_projection());
        item.add_link(common::clms_license());

        for key in &unit.keys {
            let parts = deconstruct(key, &GRAMMAR);
            let asset = parts.get("parameter").and_then(|parameter| {
                let template = PARAMETERS.lookup(parameter)?;
                Ok(template.asset(format!("s3://{}/{key}", self.bucket), parts.get("version")?))
            });
            match asset {
                Ok(asset) => item.add_asset(parts.get("id")?.to_lowercase(), asset),
                Err(err) => error!("{}: skipping {key}: {err}", unit.id),
            }
        }
        info!("Created item {}", unit.id);
        Ok(item)
    }

    fn create_collection(&self, _root: Option<&Path>, _items: &[Item]) -> Result<Collection> {
        let (start, _) = year_interval(2017)?;
        let mut collection = Collection::new(
            Self::COLLECTION_ID,
            DESCRIPTION,
            Extent::new(BBOX, Some(start), None),
        )
        .with_title(TITLE)
        .with_keywords(KEYWORDS)
        .with_providers(vec![common::clms_provider(), common::vito_provider()]);
        collection.set_item_assets(
            PARAMETERS
                .iter()
                .map(|(key, template)| (key.to_owned(), template.definition())),
        );
        collection.set_epsg_summary(EPSG.to_vec());
        collection.add_link(common::clms_license());
        Ok(collection)
    }
}
