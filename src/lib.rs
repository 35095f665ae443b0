//! Build STAC catalogs for Copernicus Land Monitoring Service product archives.
//!
//! Every product family follows the same path: deconstruct file names with a
//! fixed grammar, read the raster georeferencing, reproject the footprint to
//! WGS84, assemble a STAC record, validate it against the product schema and
//! write it out. Records that fail are logged and skipped.

#[macro_use]
extern crate shrinkwraprs;

pub mod audit;
pub mod components;
pub mod config;
pub mod crs_geo;
mod errors;
pub mod pipeline;
pub mod products;
pub mod stac;

pub use components::files::{gdal_backend::GdalFile, RasterFile};
pub use crs_geo::CrsBounds;
pub use errors::{CatalogError, Result};
pub use products::{Product, ProductKind};
