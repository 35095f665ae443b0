//! Batch driver: one product archive in, validated records out.
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use rayon::{prelude::*, ThreadPoolBuilder};
use std::path::{Path, PathBuf};

use crate::{
    components::RasterFile,
    errors::Result,
    products::Product,
    stac::{Collection, Item, SchemaValidator, StacLayout},
};

/// Where and how a run writes its records.
#[derive(Debug, Clone)]
pub struct Context {
    pub layout: StacLayout,
    /// Product schemas on disk; embedded copies are used for the ones missing.
    pub schema_dir: Option<PathBuf>,
    pub threads: usize,
    pub progress: bool,
}

impl Context {
    pub fn new(layout: StacLayout) -> Self {
        Self {
            layout,
            schema_dir: None,
            threads: 10,
            progress: false,
        }
    }

    fn validator<P: Product>(&self) -> Result<SchemaValidator> {
        SchemaValidator::for_product(P::SCHEMA, self.schema_dir.as_deref())
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len as u64);
        bar.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        bar
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub written: usize,
    pub failed: usize,
}

impl Report {
    fn merge(self, other: Self) -> Self {
        Self {
            written: self.written + other.written,
            failed: self.failed + other.failed,
        }
    }
}

/// Create, link, validate and write the item of one unit.
fn write_item<P: Product, F: RasterFile>(
    product: &P,
    unit: &P::Unit,
    validator: &SchemaValidator,
    layout: &StacLayout,
) -> Result<PathBuf> {
    let mut item: Item = product.create_item::<F>(unit)?;
    let path = layout.item_path(P::COLLECTION_ID, product.item_dir(&item).as_deref(), &item.id);
    layout.link_item(&mut item, &path)?;
    validator.validate(&item)?;
    layout.write(&path, &item)?;
    Ok(path)
}

/// Writes one item per unit found under `root`.
///
/// Units that fail are logged and counted; the batch carries on.
pub fn run_items<P: Product, F: RasterFile>(product: &P, root: &Path, ctx: &Context) -> Result<Report> {
    let units = product.discover(root)?;
    if units.is_empty() {
        warn!("Nothing to catalog for {} under {}", P::COLLECTION_ID, root.display());
        return Ok(Report::default());
    }
    info!("Cataloging {} {} units on {} threads", units.len(), P::COLLECTION_ID, ctx.threads);

    let validator = ctx.validator::<P>()?;
    let pool = ThreadPoolBuilder::new().num_threads(ctx.threads).build()?;
    let bar = ctx.progress_bar(units.len());
    bar.set_message(P::COLLECTION_ID);

    let report = pool.install(|| {
        units
            .par_iter()
            .map(|unit| {
                let outcome = write_item::<P, F>(product, unit, &validator, &ctx.layout);
                bar.inc(1);
                match outcome {
                    Ok(_) => Report { written: 1, failed: 0 },
                    Err(err) => {
                        error!("{}: {err}", P::COLLECTION_ID);
                        Report { written: 0, failed: 1 }
                    }
                }
            })
            .reduce(Report::default, Report::merge)
    });
    bar.finish_and_clear();

    info!(
        "{}: wrote {} items, {} failed",
        P::COLLECTION_ID,
        report.written,
        report.failed
    );
    Ok(report)
}

/// Builds the collection over the items already on disk and registers it in the root catalog.
pub fn run_collection<P: Product>(product: &P, root: Option<&Path>, ctx: &Context) -> Result<Collection> {
    let items = ctx.layout.read_items(P::COLLECTION_ID)?;
    let records: Vec<Item> = items.iter().map(|(_, item)| item.clone()).collect();

    let mut collection = product.create_collection(root, &records)?;
    ctx.layout.link_collection(&mut collection, &items)?;
    ctx.validator::<P>()?.validate(&collection)?;
    ctx.layout
        .write(&ctx.layout.collection_path(P::COLLECTION_ID), &collection)?;
    ctx.layout.register_collection(&collection)?;
    info!("Wrote collection {} with {} items", collection.id, items.len());
    Ok(collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        components::{files::fake::FakeRaster, iso_metadata::tests::DOCUMENT},
        products::{EuHydro, Ibu10m},
        stac::{layout::read, Catalog},
        CatalogError,
    };
    use std::fs;
    use test_log::test;

    fn context(dir: &Path) -> Context {
        Context {
            threads: 2,
            ..Context::new(StacLayout::new(dir.join("stac")))
        }
    }

    fn ibu_samples(dir: &Path) -> PathBuf {
        let root = dir.join("ibu");
        for tile in ["E40N20", "E40N30"] {
            let folder = root.join(tile);
            fs::create_dir_all(&folder).unwrap();
            for extension in ["tif", "tfw"] {
                fs::write(folder.join(format!("IBU_2018_010m_{tile}_03035_v010.{extension}")), "").unwrap();
            }
            fs::write(folder.join("metadata.xml"), DOCUMENT).unwrap();
        }
        // no ISO metadata next to this one
        let broken = root.join("E50N30");
        fs::create_dir_all(&broken).unwrap();
        for extension in ["tif", "tfw"] {
            fs::write(broken.join(format!("IBU_2018_010m_E50N30_03035_v010.{extension}")), "").unwrap();
        }
        root
    }

    #[test]
    fn failures_do_not_stop_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let root = ibu_samples(dir.path());
        let ctx = context(dir.path());

        let report = run_items::<_, FakeRaster>(&Ibu10m, &root, &ctx).unwrap();
        assert_eq!(report, Report { written: 2, failed: 1 });
        assert!(ctx
            .layout
            .item_path(Ibu10m::COLLECTION_ID, None, "IBU_2018_010m_E40N20_03035")
            .is_file());
    }

    #[test]
    fn collection_links_written_items() {
        let dir = tempfile::tempdir().unwrap();
        let root = ibu_samples(dir.path());
        let ctx = context(dir.path());
        run_items::<_, FakeRaster>(&Ibu10m, &root, &ctx).unwrap();

        let collection = run_collection(&Ibu10m, Some(&root), &ctx).unwrap();
        let items: Vec<_> = collection
            .links
            .iter()
            .filter(|link| link.rel == "item")
            .map(|link| link.href.as_str())
            .collect();
        assert_eq!(
            items,
            [
                "./IBU_2018_010m_E40N20_03035.json",
                "./IBU_2018_010m_E40N30_03035.json"
            ]
        );

        let catalog: Catalog = read(&ctx.layout.catalog_path()).unwrap();
        assert!(catalog
            .links
            .iter()
            .any(|link| link.rel == "child"
                && link.href == "./imperviousness-built-up-10m/imperviousness-built-up-10m.json"));
    }

    #[test]
    fn collection_only_products_refuse_items() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        assert!(matches!(
            run_items::<_, FakeRaster>(&EuHydro, dir.path(), &ctx),
            Err(CatalogError::NoItems(_))
        ));
        let collection = run_collection(&EuHydro, Some(dir.path()), &ctx).unwrap();
        assert!(collection.assets.is_empty());
        assert!(ctx.layout.collection_path("eu-hydro").is_file());
    }
}
