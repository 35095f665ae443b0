pub mod files;
pub mod iso_metadata;
pub mod metadata;
pub mod parser;
pub mod presentation;
pub mod transforms;

pub use files::{RasterFile, RasterSummary};
pub use iso_metadata::IsoMetadata;
pub use metadata::NameParts;
pub use parser::{deconstruct, deconstruct_id, split_name, Field, FilenameGrammar};
pub use presentation::{AssetTemplate, PresentationTable};
pub use transforms::GeoTransform;
