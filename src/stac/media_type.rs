//! Media types used by CLMS assets.

pub const GEOTIFF: &str = "image/tiff; application=geotiff";
pub const COG: &str = "image/tiff; application=geotiff; profile=cloud-optimized";
pub const GEOTIFF_PYRAMID: &str = "image/tiff; application=geotiff; profile=pyramid";
pub const GEOTIFF_LAYER: &str = "image/tiff; application=geotiff; profile=layer";
pub const XML: &str = "application/xml";
pub const JSON: &str = "application/json";
pub const TEXT: &str = "text/plain";
pub const PDF: &str = "application/pdf";
pub const PNG: &str = "image/png";
pub const GEOPACKAGE: &str = "application/geopackage+sqlite3";
pub const FILEGDB: &str = "application/x-filegdb";
pub const ZIP: &str = "application/zip";
pub const DBF: &str = "application/dbf";
pub const X_DBF: &str = "application/x-dbf";
pub const OCTET_STREAM: &str = "application/octet-stream";
