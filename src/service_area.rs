use geo::Point;
use pyo3::prelude::*;
use pyo3_stub_gen::derive::{gen_stub_pyclass, gen_stub_pymethods};
use servicearea_core::prelude::*;
use wkt::ToWkt;

use crate::model::PyStreetNetwork;

/// ServiceArea
///
/// Computes service areas around street nodes: every node within ``radius``
/// network distance (sum of edge ``length``) of a source node.
///
/// Nodes that are missing from the network, or whose service area has too
/// few points for a polygon, are skipped without raising.
///
/// Example:
///
/// .. code-block:: python
///
///     area = ServiceArea(network, radius=400.0, crs="EPSG:4326")
///     nodes = area.nearest_nodes(df["lon"].tolist(), df["lat"].tolist())
///     polygons = area.service_area_polygons(nodes)  # WKT strings
#[gen_stub_pyclass]
#[pyclass(name = "ServiceArea")]
pub struct PyServiceArea {
    inner: ServiceAreaComputer,
}

#[gen_stub_pymethods]
#[pymethods]
impl PyServiceArea {
    #[new]
    #[pyo3(signature = (network, radius=DEFAULT_RADIUS, crs=DEFAULT_CRS))]
    pub fn new(network: &PyStreetNetwork, radius: f64, crs: &str) -> PyResult<Self> {
        let inner = ServiceAreaComputer::new(
            std::sync::Arc::clone(&network.graph),
            ServiceAreaConfig::new(radius, crs),
        )
        .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string()))?;

        Ok(PyServiceArea { inner })
    }

    #[getter]
    fn radius(&self) -> f64 {
        self.inner.radius()
    }

    #[getter]
    fn crs(&self) -> String {
        self.inner.crs().to_string()
    }

    /// Nearest network node for every (lon, lat) pair, in input order
    ///
    /// Raises
    /// ------
    /// ValueError
    ///     If the inputs differ in length, a coordinate is missing (NaN) or
    ///     the network is empty
    #[allow(clippy::needless_pass_by_value)]
    pub fn nearest_nodes(&self, lons: Vec<f64>, lats: Vec<f64>) -> PyResult<Vec<NodeKey>> {
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

        self.inner.snap_points(&points).map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
                "Failed to snap points: {e}"
            ))
        })
    }

    /// Nodes reachable from ``node`` as ``(node, distance)`` pairs, nearest first
    pub fn reachable(&self, node: NodeKey) -> PyResult<Vec<(NodeKey, f64)>> {
        let ego = self
            .inner
            .ego_subgraph(node)
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyKeyError, _>(e.to_string()))?;

        Ok(ego
            .nodes()
            .iter()
            .map(|reached| (reached.key, reached.distance))
            .collect())
    }

    /// Sorted union of all nodes inside the service areas of ``nodes``
    #[allow(clippy::needless_pass_by_value)]
    pub fn service_area_nodes(&self, nodes: Vec<NodeKey>) -> Vec<NodeKey> {
        let mut covered: Vec<NodeKey> = self.inner.service_area_nodes(&nodes).into_iter().collect();
        covered.sort_unstable();
        covered
    }

    /// Convex hull polygons (WKT) of the service areas of ``nodes``
    #[allow(clippy::needless_pass_by_value)]
    pub fn service_area_polygons(&self, nodes: Vec<NodeKey>) -> Vec<String> {
        self.inner
            .service_area_polygons(&nodes)
            .polygons()
            .iter()
            .map(|polygon| polygon.to_wkt().to_string())
            .collect()
    }

    /// Service area polygons as a GeoJSON FeatureCollection string with a ``crs`` member
    #[allow(clippy::needless_pass_by_value)]
    pub fn service_area_geojson(&self, nodes: Vec<NodeKey>) -> PyResult<String> {
        self.inner
            .service_area_polygons(&nodes)
            .to_geojson_string()
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(e.to_string()))
    }

    fn __repr__(&self) -> String {
        format!(
            "ServiceArea(radius={}, crs='{}', nodes={})",
            self.inner.radius(),
            self.inner.crs(),
            self.inner.graph().node_count()
        )
    }
}
