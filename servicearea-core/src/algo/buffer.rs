//! Metric buffers around lon/lat geometries.
//!
//! Points are projected to a spherical Lambert cylindrical equal-area
//! projection, buffered there by a distance in metres and projected back.

use geo::{Buffer, Coord, MapCoords, MultiPolygon, Point};

use crate::{Distance, Error};

/// Default buffer distance in metres
pub const DEFAULT_BUFFER_DISTANCE: Distance = 400.0;

/// Authalic radius of the GRS80 ellipsoid in metres
const AUTHALIC_RADIUS: f64 = 6_371_007.181;

fn to_equal_area(coord: Coord<f64>) -> Coord<f64> {
    Coord {
        x: AUTHALIC_RADIUS * coord.x.to_radians(),
        y: AUTHALIC_RADIUS * coord.y.to_radians().sin(),
    }
}

fn from_equal_area(coord: Coord<f64>) -> Coord<f64> {
    Coord {
        x: (coord.x / AUTHALIC_RADIUS).to_degrees(),
        y: (coord.y / AUTHALIC_RADIUS).clamp(-1.0, 1.0).asin().to_degrees(),
    }
}

/// Buffers every lon/lat point by `distance` metres, in input order.
///
/// # Errors
///
/// Distance must be positive and finite, points must be valid lon/lat.
pub fn buffer_points(
    points: &[Point<f64>],
    distance: Distance,
) -> Result<Vec<MultiPolygon<f64>>, Error> {
    if !distance.is_finite() || distance <= 0.0 {
        return Err(Error::InvalidConfig(format!(
            "buffer distance must be a positive finite number, got {distance}"
        )));
    }

    points
        .iter()
        .map(|point| {
            if !(point.x().is_finite() && point.y().abs() <= 90.0) {
                return Err(Error::InvalidData(format!(
                    "({}, {}) is not a valid lon/lat coordinate",
                    point.x(),
                    point.y()
                )));
            }
            let projected = point.map_coords(to_equal_area);
            Ok(projected.buffer(distance).map_coords(from_equal_area))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use geo::{BoundingRect, Contains};

    use super::*;

    #[test]
    fn test_projection_round_trip() {
        let coord = Coord { x: 151.2, y: -33.87 };
        let back = from_equal_area(to_equal_area(coord));
        assert!((back.x - coord.x).abs() < 1e-9);
        assert!((back.y - coord.y).abs() < 1e-9);
    }

    #[test]
    fn test_buffer_at_equator() {
        let polygons = buffer_points(&[Point::new(0.0, 0.0)], 400.0).unwrap();
        assert_eq!(polygons.len(), 1);

        let buffered = &polygons[0];
        assert!(buffered.contains(&Point::new(0.0, 0.0)));

        let expected = (400.0 / AUTHALIC_RADIUS).to_degrees();
        let rect = buffered.bounding_rect().unwrap();
        assert!((rect.max().x - expected).abs() < expected * 0.1);
        assert!((rect.min().y + expected).abs() < expected * 0.1);
    }

    #[test]
    fn test_buffer_keeps_order() {
        let points = [Point::new(10.0, 50.0), Point::new(-70.0, -30.0)];
        let polygons = buffer_points(&points, 100.0).unwrap();
        assert!(polygons[0].contains(&points[0]));
        assert!(polygons[1].contains(&points[1]));
        assert!(!polygons[0].contains(&points[1]));
    }

    #[test]
    fn test_invalid_input() {
        let origin = [Point::new(0.0, 0.0)];
        assert!(matches!(
            buffer_points(&origin, 0.0),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            buffer_points(&origin, f64::NAN),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            buffer_points(&[Point::new(0.0, 91.0)], 10.0),
            Err(Error::InvalidData(_))
        ));
    }
}
