use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    ProjError(#[from] proj::ProjError),
    #[error(transparent)]
    ProjCreateError(#[from] proj::ProjCreateError),
    #[error(transparent)]
    GdalError(#[from] gdal::errors::GdalError),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
    #[error(transparent)]
    XmlError(#[from] quick_xml::Error),
    #[error(transparent)]
    ConfigError(#[from] toml::de::Error),
    #[error(transparent)]
    WalkError(#[from] walkdir::Error),
    #[error(transparent)]
    ThreadPoolError(#[from] rayon::ThreadPoolBuildError),
    #[error("{name}: no `{key}` in file name")]
    MissingNamePart { name: String, key: String },
    #[error("{0}: file name does not follow the product naming convention")]
    UnrecognizedName(String),
    #[error("No presentation entry for asset key `{0}`")]
    UnknownAssetKey(String),
    #[error("Schema {0} could not be compiled: {1}")]
    BadSchema(String, String),
    #[error("Failed to create {id}. Reason: {reason}.")]
    Invalid { id: String, reason: String },
    #[error("{path}: missing `{field}` in metadata document")]
    MissingXmlField { path: String, field: &'static str },
    #[error("Could not parse date `{0}`")]
    BadDate(String),
    #[error("Reprojection from EPSG:{0} produced non-finite bounds")]
    NonFiniteBounds(u32),
    #[error("{0:?} carries no EPSG code")]
    MissingEpsg(PathBuf),
    #[error("No {what} found for {path:?}")]
    MissingFile { what: &'static str, path: PathBuf },
    #[error("{0} is published as a collection without items")]
    NoItems(&'static str),
}
