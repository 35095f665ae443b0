use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};
use env_logger::{Builder, Env, Target};
use log::{error, info};
use std::{
    fs::File,
    path::{Path, PathBuf},
};

use clms_stac::{
    audit::audit,
    config::Settings,
    pipeline::{run_collection, run_items, Context, Report},
    products::{Clc, ClcPlus, EuHydro, Ibu10m, Natura2000, Uabh, Vpp},
    stac::{Collection, StacLayout},
    GdalFile, ProductKind,
};

#[derive(Debug, Parser)]
#[command(name = "clms-stac", version, about = "Build STAC catalogs for CLMS product archives")]
struct Cli {
    /// Settings file, `clms-stac.toml` in the working directory by default
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Root of the written catalog
    #[arg(short, long, global = true)]
    stac_dir: Option<PathBuf>,

    /// Worker threads for item creation
    #[arg(short = 'n', long, global = true)]
    threads: Option<usize>,

    /// Append log records to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create one item per product unit found under ROOT
    Items { product: ProductKind, root: PathBuf },
    /// Create the collection over the items already written
    Collection {
        product: ProductKind,
        /// Product archive holding collection level documents
        root: Option<PathBuf>,
    },
    /// Check every record of the catalog
    Check,
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_secs();
    if let Some(path) = log_file {
        let file = File::options()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("cannot open log file {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn items(kind: ProductKind, root: &Path, settings: &Settings, ctx: &Context) -> Result<Report> {
    let report = match kind {
        ProductKind::Clc => run_items::<_, GdalFile>(&Clc, root, ctx)?,
        ProductKind::Clcplus => run_items::<_, GdalFile>(&ClcPlus, root, ctx)?,
        ProductKind::Vpp => run_items::<_, GdalFile>(&Vpp::from(&settings.vpp), root, ctx)?,
        ProductKind::Uabh => run_items::<_, GdalFile>(&Uabh, root, ctx)?,
        ProductKind::Ibu10m => run_items::<_, GdalFile>(&Ibu10m, root, ctx)?,
        ProductKind::EuHydro | ProductKind::N2k => {
            bail!("{} is published as a collection only", kind.collection_id())
        }
    };
    Ok(report)
}

fn collection(
    kind: ProductKind,
    root: Option<&Path>,
    settings: &Settings,
    ctx: &Context,
) -> Result<Collection> {
    let collection = match kind {
        ProductKind::Clc => run_collection(&Clc, root, ctx)?,
        ProductKind::Clcplus => run_collection(&ClcPlus, root, ctx)?,
        ProductKind::Vpp => run_collection(&Vpp::from(&settings.vpp), root, ctx)?,
        ProductKind::Uabh => run_collection(&Uabh, root, ctx)?,
        ProductKind::Ibu10m => run_collection(&Ibu10m, root, ctx)?,
        ProductKind::EuHydro => run_collection(&EuHydro, root, ctx)?,
        ProductKind::N2k => run_collection(&Natura2000, root, ctx)?,
    };
    Ok(collection)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let mut settings = Settings::load(cli.config.as_deref()).context("cannot load settings")?;
    if let Some(stac_dir) = cli.stac_dir {
        settings.stac_dir = stac_dir;
    }
    if let Some(threads) = cli.threads {
        settings.threads = threads;
    }

    let ctx = Context {
        schema_dir: Some(settings.schema_dir.clone()),
        threads: settings.threads,
        progress: true,
        ..Context::new(StacLayout::new(&settings.stac_dir))
    };

    match cli.command {
        Command::Items { product, root } => {
            let report = items(product, &root, &settings, &ctx)?;
            if report.failed > 0 {
                bail!(
                    "{} of {} {} items failed",
                    report.failed,
                    report.failed + report.written,
                    product.collection_id()
                );
            }
        }
        Command::Collection { product, root } => {
            let collection = collection(product, root.as_deref(), &settings, &ctx)?;
            info!("{} is up to date", collection.id);
        }
        Command::Check => {
            let findings = audit(ctx.layout.root(), ctx.schema_dir.as_deref())?;
            for finding in &findings {
                error!("{finding}");
            }
            if !findings.is_empty() {
                bail!("{} problems in {}", findings.len(), ctx.layout.root().display());
            }
            info!("{} is consistent", ctx.layout.root().display());
        }
    }
    Ok(())
}
