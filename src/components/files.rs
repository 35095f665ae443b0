use std::{fmt::Debug, path::Path};

use crate::{
    components::transforms::GeoTransform, crs_geo::CrsBounds, errors::Result, stac::Projection,
};

/// Georeferencing read from a raster file.
pub trait RasterFile: Debug + Sized {
    fn open<P: AsRef<Path>>(path: P) -> Result<Self>;
    /// (rows, columns)
    fn shape(&self) -> (usize, usize);
    fn epsg(&self) -> Result<u32>;
    fn transform(&self) -> Result<GeoTransform>;

    fn bounds(&self) -> Result<CrsBounds> {
        Ok(CrsBounds::new(
            self.epsg()?,
            self.transform()?.bounds(self.shape()),
        ))
    }

    fn summary(&self) -> Result<RasterSummary> {
        let transform = self.transform()?;
        let shape = self.shape();
        Ok(RasterSummary {
            bounds: CrsBounds::new(self.epsg()?, transform.bounds(shape)),
            shape,
            transform,
        })
    }
}

/// Everything a catalog record needs from a raster, read in one go.
#[derive(Debug, Clone, Copy)]
pub struct RasterSummary {
    pub bounds: CrsBounds,
    pub shape: (usize, usize),
    pub transform: GeoTransform,
}

impl RasterSummary {
    pub fn epsg(&self) -> u32 {
        self.bounds.epsg()
    }

    /// Projection fields with the native bbox as is, plus the transform.
    pub fn projection(&self) -> Projection {
        Projection {
            epsg: Some(self.epsg()),
            bbox: Some(self.bounds.bbox().to_vec()),
            shape: Some([self.shape.0, self.shape.1]),
            transform: Some(self.transform.augmented().to_vec()),
        }
    }

    /// Projection fields with the native bbox truncated to whole units.
    pub fn truncated_projection(&self) -> Projection {
        Projection {
            epsg: Some(self.epsg()),
            bbox: Some(self.bounds.truncated().map(|v| v as f64).to_vec()),
            shape: Some([self.shape.0, self.shape.1]),
            transform: None,
        }
    }
}

pub mod gdal_backend {
    use std::path::PathBuf;

    use super::*;
    use crate::errors::CatalogError;
    use gdal::Dataset as GdalDataset;

    #[derive(Debug)]
    pub struct GdalFile {
        path: PathBuf,
        dataset: GdalDataset,
    }

    impl RasterFile for GdalFile {
        fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
            Ok(GdalFile {
                path: path.as_ref().to_path_buf(),
                dataset: GdalDataset::open(&path)?,
            })
        }
        fn shape(&self) -> (usize, usize) {
            let (width, height) = self.dataset.raster_size();
            (height, width)
        }
        fn epsg(&self) -> Result<u32> {
            let mut spatial_ref = self.dataset.spatial_ref()?;
            let code = match spatial_ref.auth_code() {
                Ok(code) => code,
                Err(_) => {
                    spatial_ref.auto_identify_epsg()?;
                    spatial_ref.auth_code()?
                }
            };
            u32::try_from(code).map_err(|_| CatalogError::MissingEpsg(self.path.clone()))
        }
        fn transform(&self) -> Result<GeoTransform> {
            Ok(GeoTransform::from_gdal(self.dataset.geo_transform()?))
        }
    }
}
