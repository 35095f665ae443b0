use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{errors::Result, products::Vpp};

/// Looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE: &str = "clms-stac.toml";

/// Settings loaded from `clms-stac.toml`; every field is optional.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Root of the written catalog.
    pub stac_dir: PathBuf,
    /// Product schemas, `{schema_dir}/{product}.json`.
    pub schema_dir: PathBuf,
    pub threads: usize,
    pub vpp: VppSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            stac_dir: PathBuf::from("stac_prod"),
            schema_dir: PathBuf::from("schema/products"),
            threads: 10,
            vpp: VppSettings::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct VppSettings {
    pub bucket: String,
    pub start_year: i32,
    pub end_year: i32,
}

impl Default for VppSettings {
    fn default() -> Self {
        let vpp = Vpp::default();
        Self {
            bucket: vpp.bucket,
            start_year: vpp.start_year,
            end_year: vpp.end_year,
        }
    }
}

impl From<&VppSettings> for Vpp {
    fn from(settings: &VppSettings) -> Self {
        Vpp {
            bucket: settings.bucket.clone(),
            start_year: settings.start_year,
            end_year: settings.end_year,
        }
    }
}

impl Settings {
    pub fn from_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads `path`, or `clms-stac.toml` if present, falling back to the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None if Path::new(CONFIG_FILE).is_file() => Path::new(CONFIG_FILE),
            None => return Ok(Self::default()),
        };
        debug!("Loading settings from {}", path.display());
        Self::from_str(&std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CatalogError;
    use rstest::rstest;

    #[rstest]
    fn empty_file_gives_defaults() {
        assert_eq!(Settings::from_str("").unwrap(), Settings::default());
    }

    #[rstest]
    fn partial_tables_keep_defaults() {
        let settings = Settings::from_str(
            r#"
            stac_dir = "out"
            [vpp]
            end_year = 2018
            "#,
        )
        .unwrap();
        assert_eq!(settings.stac_dir, Path::new("out"));
        assert_eq!(settings.threads, 10);
        assert_eq!(settings.vpp.bucket, "HRVPP");
        assert_eq!(Vpp::from(&settings.vpp).end_year, 2018);
    }

    #[rstest]
    fn wrong_types_are_reported() {
        assert!(matches!(
            Settings::from_str("threads = \"many\""),
            Err(CatalogError::ConfigError(_))
        ));
    }

    #[rstest]
    fn explicit_path_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "threads = 3").unwrap();
        assert_eq!(Settings::load(Some(&path)).unwrap().threads, 3);
    }
}
