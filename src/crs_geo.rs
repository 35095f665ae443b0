use geo::{Coord, Rect};
use log::debug;
use proj::Proj;

use crate::{
    errors::{CatalogError, Result},
    stac::Geometry,
};

pub const WGS84: u32 = 4326;

/// Extra points sampled along each edge when reprojecting bounds.
const DENSIFY_POINTS: usize = 21;

/// Axis aligned bounds tagged with the EPSG code they are expressed in.
///
/// Derefs to the underlying [`Rect`].
#[derive(Shrinkwrap, Debug, Clone, Copy, PartialEq)]
pub struct CrsBounds {
    epsg: u32,
    #[shrinkwrap(main_field)]
    rect: Rect,
}

impl CrsBounds {
    pub fn new(epsg: u32, rect: Rect) -> Self {
        Self { epsg, rect }
    }

    pub fn from_bbox(epsg: u32, bbox: [f64; 4]) -> Self {
        let rect = Rect::new(
            Coord {
                x: bbox[0],
                y: bbox[1],
            },
            Coord {
                x: bbox[2],
                y: bbox[3],
            },
        );
        Self { epsg, rect }
    }

    pub fn epsg(&self) -> u32 {
        self.epsg
    }

    /// Bounds of this rect once reprojected to `epsg`.
    ///
    /// Edges are densified before transforming so curved edges in the target
    /// crs are still enclosed. Returns a copy if crs is same.
    pub fn with_crs(&self, epsg: u32) -> Result<Self> {
        if self.epsg == epsg {
            return Ok(*self);
        }
        let proj = Proj::new_known_crs(
            &format!("EPSG:{}", self.epsg),
            &format!("EPSG:{epsg}"),
            None,
        )?;

        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for point in self.edge_points() {
            let (x, y) = proj.convert(point).map_err(|err| {
                debug!("EPSG:{} point {point:?} has no EPSG:{epsg} image: {err}", self.epsg);
                CatalogError::NonFiniteBounds(self.epsg)
            })?;
            if !x.is_finite() || !y.is_finite() {
                return Err(CatalogError::NonFiniteBounds(self.epsg));
            }
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Ok(Self::from_bbox(epsg, [min_x, min_y, max_x, max_y]))
    }

    pub fn to_wgs84(&self) -> Result<Self> {
        self.with_crs(WGS84)
    }

    fn edge_points(&self) -> Vec<(f64, f64)> {
        let (min, max) = (self.min(), self.max());
        let steps = DENSIFY_POINTS + 1;
        let mut points = Vec::with_capacity(4 * steps);
        for step in 0..steps {
            let t = step as f64 / steps as f64;
            let x = min.x + t * (max.x - min.x);
            let y = min.y + t * (max.y - min.y);
            points.push((x, min.y));
            points.push((max.x, y));
            points.push((max.x - t * (max.x - min.x), max.y));
            points.push((min.x, max.y - t * (max.y - min.y)));
        }
        points
    }

    /// `[west, south, east, north]`
    pub fn bbox(&self) -> [f64; 4] {
        let (min, max) = (self.min(), self.max());
        [min.x, min.y, max.x, max.y]
    }

    /// Bbox with every coordinate truncated towards zero.
    pub fn truncated(&self) -> [i64; 4] {
        self.bbox().map(|value| value.trunc() as i64)
    }

    pub fn polygon(&self) -> Geometry {
        let ring = self
            .to_polygon()
            .exterior()
            .coords()
            .map(|coord| [coord.x, coord.y])
            .collect();
        Geometry::Polygon {
            coordinates: vec![ring],
        }
    }

    /// Smallest bounds enclosing both. Both sides must share a crs.
    pub fn union(&self, rhs: &Self) -> Self {
        let (lhs, rhs) = (self.bbox(), rhs.bbox());
        Self::from_bbox(
            self.epsg,
            [
                lhs[0].min(rhs[0]),
                lhs[1].min(rhs[1]),
                lhs[2].max(rhs[2]),
                lhs[3].max(rhs[3]),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn same_crs_is_identity() {
        let bounds = CrsBounds::from_bbox(WGS84, [5.0, 45.0, 6.0, 46.0]);
        assert_eq!(bounds.to_wgs84().unwrap(), bounds);
    }

    #[rstest]
    fn laea_europe_to_wgs84() {
        // EPSG:3035 false origin sits at 10E 52N.
        let bounds = CrsBounds::from_bbox(3035, [4311000., 3200000., 4331000., 3220000.]);
        let wgs84 = bounds.to_wgs84().unwrap();
        assert_eq!(wgs84.epsg(), WGS84);
        let [west, south, east, north] = wgs84.bbox();
        assert!(west < 10.0 && east > 10.0, "{west} {east}");
        assert!(south < 52.0 && north > 52.0, "{south} {north}");
        assert!(east - west < 0.5);
        assert!(north - south < 0.5);
    }

    #[rstest]
    #[case([1e30, 1e30, 2e30, 2e30])]
    #[case([4311000., 3200000., f64::INFINITY, 3220000.])]
    fn unprojectable_bounds_are_rejected(#[case] bbox: [f64; 4]) {
        let bounds = CrsBounds::from_bbox(3035, bbox);
        assert!(matches!(
            bounds.to_wgs84(),
            Err(CatalogError::NonFiniteBounds(3035))
        ));
    }

    #[rstest]
    fn unknown_target_crs_fails() {
        let bounds = CrsBounds::from_bbox(3035, [4311000., 3200000., 4331000., 3220000.]);
        assert!(matches!(
            bounds.with_crs(999999),
            Err(CatalogError::ProjCreateError(_))
        ));
    }

    #[rstest]
    fn derefs_to_the_rect() {
        let bounds = CrsBounds::from_bbox(3035, [0., 0., 20., 10.]);
        assert_eq!(bounds.width(), 20.);
        assert_eq!(bounds.height(), 10.);
        assert_eq!(bounds.center(), Coord { x: 10., y: 5. });
    }

    #[rstest]
    fn truncation_goes_towards_zero() {
        let bounds = CrsBounds::from_bbox(3035, [-1.7, 2.9, 10.2, 20.99]);
        assert_eq!(bounds.truncated(), [-1, 2, 10, 20]);
    }

    #[rstest]
    fn polygon_ring_is_closed() {
        let bounds = CrsBounds::from_bbox(WGS84, [1.0, 2.0, 3.0, 4.0]);
        let Geometry::Polygon { coordinates } = bounds.polygon();
        let ring = &coordinates[0];
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
        assert!(ring.contains(&[1.0, 2.0]));
        assert!(ring.contains(&[3.0, 4.0]));
    }

    #[rstest]
    fn union_encloses_both() {
        let a = CrsBounds::from_bbox(WGS84, [0.0, 0.0, 1.0, 1.0]);
        let b = CrsBounds::from_bbox(WGS84, [-1.0, 0.5, 0.5, 2.0]);
        assert_eq!(a.union(&b).bbox(), [-1.0, 0.0, 1.0, 2.0]);
    }
}
