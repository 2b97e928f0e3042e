use geo::Point;
use pyo3::prelude::*;
use pyo3_stub_gen::derive::gen_stub_pyfunction;
use servicearea_core::prelude::*;
use wkt::ToWkt;

/// Buffer lon/lat points by a distance in metres
///
/// Points are projected to a cylindrical equal-area projection, buffered
/// and projected back to lon/lat.
///
/// Returns
/// -------
/// list[str]
///     One WKT multipolygon per input point
#[gen_stub_pyfunction]
#[pyfunction(name = "buffer_points")]
#[pyo3(signature = (lons, lats, distance=DEFAULT_BUFFER_DISTANCE))]
#[allow(clippy::needless_pass_by_value)]
pub fn py_buffer_points(lons: Vec<f64>, lats: Vec<f64>, distance: f64) -> PyResult<Vec<String>> {
    if lons.len() != lats.len() {
        return Err(PyErr::new::<pyo3::exceptions::PyValueError, _>(
            "lons and lats must have the same length",
        ));
    }
    let points: Vec<Point<f64>> = lons
        .iter()
        .zip(&lats)
        .map(|(&lon, &lat)| Point::new(lon, lat))
        .collect();

    let buffered = buffer_points(&points, distance).map_err(|e| {
        PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("Failed to buffer points: {e}"))
    })?;

    Ok(buffered
        .iter()
        .map(|polygons| polygons.to_wkt().to_string())
        .collect())
}
