use geo::{AffineOps, AffineTransform, Coord, Rect};

/// Pixel to crs transform of a raster, in rasterio order `(a, b, c, d, e, f)`.
#[derive(Shrinkwrap, Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform(AffineTransform);

impl GeoTransform {
    pub fn new(a: f64, b: f64, xoff: f64, d: f64, e: f64, yoff: f64) -> Self {
        Self(AffineTransform::new(a, b, xoff, d, e, yoff))
    }

    /// GDAL orders coefficients as `[xoff, a, b, yoff, d, e]`.
    pub fn from_gdal(gdal_transform: [f64; 6]) -> Self {
        Self::new(
            gdal_transform[1],
            gdal_transform[2],
            gdal_transform[0],
            gdal_transform[4],
            gdal_transform[5],
            gdal_transform[3],
        )
    }

    /// Crs bounds covered by a raster of `shape` (rows, columns).
    pub fn bounds(&self, shape: (usize, usize)) -> Rect {
        let (height, width) = shape;
        let pixels = Rect::new(
            Coord { x: 0., y: 0. },
            Coord {
                x: width as f64,
                y: height as f64,
            },
        );
        // Rect::new normalises the corners, so a north-up raster with a
        // negative `e` still yields min < max.
        pixels.affine_transform(self)
    }

    /// The 3x3 augmented matrix, row major, as used by `proj:transform`.
    pub fn augmented(&self) -> [f64; 9] {
        [
            self.a(),
            self.b(),
            self.xoff(),
            self.d(),
            self.e(),
            self.yoff(),
            0.,
            0.,
            1.,
        ]
    }
}
