use std::path::Path;
use std::sync::Arc;

use pyo3::prelude::*;
use pyo3_stub_gen::derive::{gen_stub_pyclass, gen_stub_pymethods};
use servicearea_core::prelude::*;

/// StreetNetwork
///
/// A directed street graph with node coordinates and edge lengths, indexed
/// for nearest node lookups. Parallel edges are kept.
///
/// Example:
///
/// .. code-block:: python
///
///     network = StreetNetwork.from_node_link("walk_network.json")
///     area = ServiceArea(network, radius=400.0)
#[gen_stub_pyclass]
#[pyclass(name = "StreetNetwork")]
pub struct PyStreetNetwork {
    pub(crate) graph: Arc<StreetGraph>,
}

#[gen_stub_pymethods]
#[pymethods]
impl PyStreetNetwork {
    /// Load a graph saved as networkx node-link JSON
    ///
    /// Nodes need ``id``, ``x`` and ``y``, edges ``source``, ``target`` and
    /// ``length``. Undirected documents are walkable in both directions.
    ///
    /// Raises
    /// ------
    /// IOError
    ///     If the file cannot be read
    /// ValueError
    ///     If the document is not a valid street graph
    #[staticmethod]
    pub fn from_node_link(path: &str) -> PyResult<Self> {
        let graph = load_node_link_graph(Path::new(path)).map_err(|e| match e {
            Error::IoError(_) => PyErr::new::<pyo3::exceptions::PyIOError, _>(e.to_string()),
            _ => PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
                "Failed to load street network: {e}"
            )),
        })?;

        Ok(PyStreetNetwork {
            graph: Arc::new(graph),
        })
    }

    /// Build a graph from parallel node and edge arrays
    ///
    /// Parameters
    /// ----------
    /// ids, xs, ys : list
    ///     Node keys and coordinates
    /// sources, targets, lengths : list
    ///     Edge endpoints (node keys) and non-negative lengths
    /// directed : bool, default=True
    ///     If False every edge is added in both directions
    #[staticmethod]
    #[pyo3(signature = (ids, xs, ys, sources, targets, lengths, directed=true))]
    #[allow(clippy::needless_pass_by_value)]
    pub fn from_arrays(
        ids: Vec<NodeKey>,
        xs: Vec<f64>,
        ys: Vec<f64>,
        sources: Vec<NodeKey>,
        targets: Vec<NodeKey>,
        lengths: Vec<f64>,
        directed: bool,
    ) -> PyResult<Self> {
        if ids.len() != xs.len() || ids.len() != ys.len() {
            return Err(PyErr::new::<pyo3::exceptions::PyValueError, _>(
                "ids, xs and ys must have the same length",
            ));
        }
        if sources.len() != targets.len() || sources.len() != lengths.len() {
            return Err(PyErr::new::<pyo3::exceptions::PyValueError, _>(
                "sources, targets and lengths must have the same length",
            ));
        }

        let build = || -> Result<StreetGraph, Error> {
            let mut builder = StreetGraphBuilder::with_capacity(ids.len(), sources.len());
            for ((&id, &x), &y) in ids.iter().zip(&xs).zip(&ys) {
                builder.add_node(id, x, y)?;
            }
            for ((&source, &target), &length) in sources.iter().zip(&targets).zip(&lengths) {
                builder.add_edge(source, target, length)?;
                if !directed && source != target {
                    builder.add_edge(target, source, length)?;
                }
            }
            Ok(builder.build())
        };

        let graph = build().map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
                "Failed to build street network: {e}"
            ))
        })?;

        Ok(PyStreetNetwork {
            graph: Arc::new(graph),
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn __repr__(&self) -> String {
        format!(
            "StreetNetwork with {} nodes and {} edges",
            self.graph.node_count(),
            self.graph.edge_count()
        )
    }

    fn __str__(&self) -> String {
        self.__repr__()
    }
}
