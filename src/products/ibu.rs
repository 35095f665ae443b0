//! High Resolution Layer Imperviousness Built-up 10m tiles.
use log::{debug, error, info, warn};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use super::{common, Product};
use crate::{
    components::{
        deconstruct, AssetTemplate, Field, FilenameGrammar, IsoMetadata, PresentationTable,
        RasterFile,
    },
    errors::{CatalogError, Result},
    stac::{media_type, year_interval, Asset, Collection, Extent, Item, Projection, Properties},
};

/// e.g. `IBU_2018_010m_E40N20_03035_v010`
pub static GRAMMAR: LazyLock<FilenameGrammar> = LazyLock::new(|| {
    FilenameGrammar::new(
        "ibu10m",
        Field::Id,
        r"^(?P<product>IBU)_(?P<year>\d{4})_(?P<resolution>\d{3}m)_(?P<extent>[A-Z0-9]+)_(?P<epsg>\d{5})_(?P<asset>[A-Za-z0-9]+)$",
    )
});

const TITLE: &str = "High Resolution Layer Imperviousness Built-up 10m";
const DESCRIPTION: &str = "The Impervious Built-up layer is a thematic product showing the binary \
information of building (class 1) and no building (class 0) within the sealing outline derived \
from the IMD 2018 for the period 2018 for the EEA-39 area.";
const KEYWORDS: &[&str] = &[
    "Copernicus",
    "Imperviousness",
    "Built-up",
    "IBU",
    "High Resolution Layer",
    "Land cover",
    "Buildings",
];
const BBOX: [f64; 4] = [-31.285, 27.642, 44.807, 71.165];

const ITEM_ASSETS: PresentationTable = PresentationTable(&[
    (
        "builtup_map",
        AssetTemplate::new("Map", media_type::GEOTIFF, &["data"]),
    ),
    (
        "builtup_map_database",
        AssetTemplate::new("Map Database", media_type::DBF, &["metadata"]),
    ),
    (
        "builtup_map_worldfile",
        AssetTemplate::new("Map World File", media_type::TEXT, &["metadata"]),
    ),
]);

/// A GeoTIFF, its world file and the ISO metadata of its folder.
#[derive(Debug)]
pub struct IbuTile {
    pub tile: PathBuf,
    pub worldfile: PathBuf,
    pub metadata: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct Ibu10m;

impl Ibu10m {
    fn folder_tiles(folder: &Path) -> Result<Vec<IbuTile>> {
        let mut tiles: BTreeMap<String, PathBuf> = BTreeMap::new();
        let mut worldfiles: BTreeMap<String, PathBuf> = BTreeMap::new();
        let mut metadata = None;
        for path in common::files_under(folder)? {
            let (Some(stem), Some(extension)) = (path.file_stem(), path.extension()) else {
                continue;
            };
            let stem = stem.to_string_lossy().into_owned();
            match extension.to_string_lossy().to_lowercase().as_str() {
                "tif" => {
                    tiles.entry(stem).or_insert(path);
                }
                "tfw" => {
                    worldfiles.entry(stem).or_insert(path);
                }
                "xml" if metadata.is_none() => metadata = Some(path),
                _ => {}
            }
        }
        Ok(tiles
            .into_iter()
            .filter_map(|(stem, tile)| match worldfiles.remove(&stem) {
                Some(worldfile) => Some(IbuTile {
                    tile,
                    worldfile,
                    metadata: metadata.clone(),
                }),
                None => {
                    warn!("{}: no world file, skipping", tile.display());
                    None
                }
            })
            .collect())
    }

    fn collection_asset(path: &Path) -> Option<(String, Asset)> {
        let name = common::file_name(path);
        let (stem, extension) = name.rsplit_once('.')?;
        let (media_type, kind) = match extension {
            "xml" => (media_type::XML, "metadata"),
            "txt" => (media_type::TEXT, "color palette"),
            _ => return None,
        };
        let title = format!("{} {kind}", stem.replace('_', " "));
        Some((
            common::asset_key(&name).to_lowercase(),
            Asset::new(common::href(path), title, media_type, &["metadata"]),
        ))
    }
}

impl Product for Ibu10m {
    const COLLECTION_ID: &'static str = "imperviousness-built-up-10m";
    const SCHEMA: &'static str = "ibu10m";
    type Unit = IbuTile;

    fn discover(&self, root: &Path) -> Result<Vec<IbuTile>> {
        let mut folders: Vec<PathBuf> = fs::read_dir(root)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.is_dir())
            .collect();
        folders.sort();
        let mut units = Vec::new();
        for folder in folders {
            units.extend(Self::folder_tiles(&folder)?);
        }
        debug!("Found {} IBU tiles under {}", units.len(), root.display());
        Ok(units)
    }

    fn create_item<F: RasterFile>(&self, unit: &IbuTile) -> Result<Item> {
        let parts = deconstruct(&unit.tile, &GRAMMAR).require(&GRAMMAR)?;
        let id = parts.format("{product}_{year}_{resolution}_{extent}_{epsg}")?;
        let epsg: u32 = parts
            .get("epsg")?
            .parse()
            .map_err(|_| CatalogError::MissingEpsg(unit.tile.clone()))?;
        let metadata_path = unit.metadata.as_ref().ok_or_else(|| CatalogError::MissingFile {
            what: "ISO metadata",
            path: unit.tile.parent().unwrap_or(Path::new("")).to_path_buf(),
        })?;
        let metadata = IsoMetadata::from_file(metadata_path)?;
        let (start, end) = year_interval(parts.year("year")?)?;

        let raster = F::open(&unit.tile)?.summary()?;
        let properties = Properties::new(start, end)
            .with_created(metadata.created)
            .with_description(format!(
                "{} imperviousness built-up product {}",
                parts.get("year")?,
                parts.get("extent")?
            ))
            .with_providers(vec![common::clms_provider()]);
        let mut item = Item::new(&id, &raster.bounds.to_wgs84()?, properties, Self::COLLECTION_ID);
        item.set_projection(Projection {
            epsg: Some(epsg),
            ..raster.truncated_projection()
        });
        item.add_link(common::clms_license());

        let mut database = unit.tile.clone().into_os_string();
        database.push(".vat.dbf");
        let database = PathBuf::from(database);
        let mut files = vec![("builtup_map", &unit.tile), ("builtup_map_worldfile", &unit.worldfile)];
        if database.is_file() {
            files.push(("builtup_map_database", &database));
        }
        for (key, path) in files {
            match ITEM_ASSETS.lookup(key) {
                Ok(template) => item.add_asset(key, template.asset(common::href(path), "")),
                Err(err) => error!("{id}: {err}"),
            }
        }
        info!("Created item {id}");
        Ok(item)
    }

    fn item_dir(&self, _item: &Item) -> Option<String> {
        None
    }

    fn create_collection(&self, root: Option<&Path>, _items: &[Item]) -> Result<Collection> {
        let (start, _) = year_interval(2018)?;
        let mut collection = Collection::new(
            Self::COLLECTION_ID,
            DESCRIPTION,
            Extent::new(BBOX, Some(start), None),
        )
        .with_title(TITLE)
        .with_keywords(KEYWORDS)
        .with_providers(vec![common::clms_provider()]);
        collection.set_item_assets(
            ITEM_ASSETS
                .iter()
                .map(|(key, template)| (key.to_owned(), template.definition())),
        );
        collection.set_epsg_summary(vec![3035]);
        collection.add_link(common::clms_license());

        if let Some(root) = root {
            for file in common::files_under(root)? {
                if let Some((key, asset)) = Self::collection_asset(&file) {
                    collection.add_asset(key, asset);
                }
            }
        }
        Ok(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{files::fake::FakeRaster, iso_metadata::tests::DOCUMENT};
    use rstest::rstest;

    const TILE: &str = "IBU_2018_010m_E40N20_03035_v010";

    fn samples() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("E40N20");
        fs::create_dir_all(&folder).unwrap();
        for file in [
            format!("{TILE}.tif"),
            format!("{TILE}.tfw"),
            format!("{TILE}.tif.vat.dbf"),
            "IBU_2018_010m_E40N30_03035_v010.tif".into(),
            "IBU_2018_010m_Color_Table.txt".into(),
        ] {
            fs::write(folder.join(file), "").unwrap();
        }
        fs::write(folder.join("IBU_2018_010m_metadata.xml"), DOCUMENT).unwrap();
        dir
    }

    #[rstest]
    fn tiles_need_a_world_file() {
        let samples = samples();
        let units = Ibu10m.discover(samples.path()).unwrap();
        assert_eq!(units.len(), 1);
        assert!(units[0].worldfile.ends_with(format!("E40N20/{TILE}.tfw")));
        assert!(units[0].metadata.is_some());
    }

    #[rstest]
    fn item_takes_epsg_from_the_name() {
        let samples = samples();
        let units = Ibu10m.discover(samples.path()).unwrap();
        let item = Ibu10m.create_item::<FakeRaster>(&units[0]).unwrap();
        assert_eq!(item.id, "IBU_2018_010m_E40N20_03035");
        assert_eq!(item.properties.projection.epsg, Some(3035));
        assert_eq!(
            item.properties.description.as_deref(),
            Some("2018 imperviousness built-up product E40N20")
        );
        assert_eq!(
            item.properties.created.unwrap().to_rfc3339(),
            "2020-05-12T00:00:00+00:00"
        );
        let keys: Vec<_> = item.assets.keys().map(String::as_str).collect();
        assert_eq!(keys, ["builtup_map", "builtup_map_database", "builtup_map_worldfile"]);
        assert_eq!(Ibu10m.item_dir(&item), None);
    }

    #[rstest]
    fn grammar_keeps_the_file_suffix() {
        let parts = deconstruct(format!("E40N20/{TILE}.tif"), &GRAMMAR)
            .require(&GRAMMAR)
            .unwrap();
        assert_eq!(parts.get("asset").unwrap(), "v010");
        assert_eq!(parts.get("suffix").unwrap(), "tif");
        assert_eq!(parts.get("resolution").unwrap(), "010m");
    }

    #[rstest]
    #[case("IMD_2018_010m_E40N20_03035_v010.tif")]
    #[case("IBU_2018_10m_E40N20_03035_v010.tif")]
    #[case("IBU_2018_010m_e40n20_03035_v010.tif")]
    #[case("IBU_2018_010m_E40N20_3035_v010.tif")]
    #[case("IBU_2018_010m_E40N20_03035.tif")]
    #[case("IBU_2018_010m_Color_Table.txt")]
    fn foreign_names_are_rejected(#[case] name: &str) {
        let parts = deconstruct(format!("E40N20/{name}"), &GRAMMAR);
        assert!(matches!(
            parts.require(&GRAMMAR),
            Err(CatalogError::UnrecognizedName(_))
        ));
    }

    #[rstest]
    fn collection_assets_from_documents() {
        let samples = samples();
        let collection = Ibu10m.create_collection(Some(samples.path()), &[]).unwrap();
        let titles: Vec<_> = collection
            .assets
            .iter()
            .map(|(key, asset)| (key.as_str(), asset.title.as_deref().unwrap()))
            .collect();
        assert_eq!(
            titles,
            [
                ("ibu_2018_010m_color_table_txt", "IBU 2018 010m Color Table color palette"),
                ("ibu_2018_010m_metadata_xml", "IBU 2018 010m metadata metadata"),
            ]
        );
    }
}
