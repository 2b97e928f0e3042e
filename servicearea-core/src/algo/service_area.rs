//! Service areas: nearest node snapping, bounded network expansion and
//! convex hull polygons around points of interest.

use std::sync::Arc;

use geo::{Intersects, Point, Polygon};
use geojson::{Feature, FeatureCollection};
use hashbrown::HashSet;
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use super::ego::EgoSubgraph;
use crate::{DEFAULT_CRS, DEFAULT_RADIUS, Distance, Error, NodeKey, RecordTable, StreetGraph};

/// Per-node failure. Absorbed by batch operations, which skip the node.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceAreaFailure {
    #[error("Node {node} cannot be expanded: not present in the street graph")]
    Expansion { node: NodeKey },
    #[error("Service area of node {node} has {points} points, a hull needs 3 or more non-collinear points")]
    Hull { node: NodeKey, points: usize },
}

impl ServiceAreaFailure {
    pub fn node(&self) -> NodeKey {
        match self {
            ServiceAreaFailure::Expansion { node } | ServiceAreaFailure::Hull { node, .. } => *node,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceAreaConfig {
    /// Expansion radius in the unit of edge `length`
    pub radius: Distance,
    /// Coordinate reference system tag attached to the output
    pub crs: String,
}

impl Default for ServiceAreaConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            crs: DEFAULT_CRS.to_string(),
        }
    }
}

impl ServiceAreaConfig {
    pub fn new(radius: Distance, crs: impl Into<String>) -> Self {
        Self {
            radius,
            crs: crs.into(),
        }
    }

    /// # Errors
    ///
    /// Radius must be finite and non-negative, the CRS tag non-empty.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "radius must be a non-negative finite number, got {}",
                self.radius
            )));
        }
        if self.crs.trim().is_empty() {
            return Err(Error::InvalidConfig("crs must not be empty".to_string()));
        }
        Ok(())
    }

    /// Whether the CRS tag names a lon/lat system, in which case snapping
    /// uses great-circle distance
    pub fn is_geographic(&self) -> bool {
        let crs = self.crs.trim().to_ascii_uppercase();
        GEOGRAPHIC_CRS.contains(&crs.as_str())
    }
}

/// Lon/lat reference systems recognised by [`ServiceAreaConfig::is_geographic`]
const GEOGRAPHIC_CRS: [&str; 7] = [
    "EPSG:4326",
    "EPSG:4258",
    "EPSG:4269",
    "EPSG:4283",
    "OGC:CRS84",
    "CRS84",
    "WGS84",
];

/// Polygons produced by [`ServiceAreaComputer::service_area_polygons`].
///
/// Polygons follow the order of the successfully processed input nodes but
/// do not carry the node they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceAreaCollection {
    polygons: Vec<Polygon<f64>>,
    crs: String,
    skipped: Vec<ServiceAreaFailure>,
}

impl ServiceAreaCollection {
    pub fn polygons(&self) -> &[Polygon<f64>] {
        &self.polygons
    }

    pub fn crs(&self) -> &str {
        &self.crs
    }

    /// Nodes dropped from the collection and why
    pub fn skipped(&self) -> &[ServiceAreaFailure] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Converts the collection to a `GeoJSON` `FeatureCollection` with a named `crs` member.
    pub fn to_geojson(&self) -> Result<FeatureCollection, Error> {
        let features = self
            .polygons
            .iter()
            .map(|polygon| {
                let geometry = geojson::Geometry::new(geojson::Value::from(polygon));
                let value = json!({
                    "type": "Feature",
                    "geometry": geometry,
                    "properties": {},
                });
                Feature::from_json_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut foreign_members = serde_json::Map::new();
        foreign_members.insert(
            "crs".to_string(),
            json!({
                "type": "name",
                "properties": { "name": self.crs },
            }),
        );

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: Some(foreign_members),
        })
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson()?).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

/// Computes service areas around street nodes of a single graph.
///
/// Holds the graph and an immutable configuration, every call is
/// independent of previous ones.
#[derive(Debug, Clone)]
pub struct ServiceAreaComputer {
    graph: Arc<StreetGraph>,
    config: ServiceAreaConfig,
}

impl ServiceAreaComputer {
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for an invalid radius or CRS.
    pub fn new(graph: Arc<StreetGraph>, config: ServiceAreaConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self { graph, config })
    }

    /// Same graph and CRS, different radius
    pub fn with_radius(&self, radius: Distance) -> Result<Self, Error> {
        Self::new(
            Arc::clone(&self.graph),
            ServiceAreaConfig {
                radius,
                crs: self.config.crs.clone(),
            },
        )
    }

    pub fn graph(&self) -> &StreetGraph {
        &self.graph
    }

    pub fn radius(&self) -> Distance {
        self.config.radius
    }

    pub fn crs(&self) -> &str {
        &self.config.crs
    }

    /// Nearest graph node for every record, in record order.
    ///
    /// # Errors
    ///
    /// Fails on an empty graph, a missing column or a non-numeric coordinate.
    pub fn snap_to_nearest_nodes(
        &self,
        records: &RecordTable,
        longitude_field: &str,
        latitude_field: &str,
    ) -> Result<Vec<NodeKey>, Error> {
        if self.graph.is_empty() {
            return Err(Error::EmptyGraph);
        }
        let points: Vec<Point<f64>> = records
            .query_points(longitude_field, latitude_field)?
            .into_iter()
            .map(|query| query.geometry)
            .collect();
        self.snap_points(&points)
    }

    /// Nearest graph node for every `(x, y)` point, in input order.
    ///
    /// Geographic CRS tags snap by great-circle distance, anything else by
    /// Euclidean distance in the graph's coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyGraph`] if the graph has no nodes and
    /// [`Error::InvalidData`] for a point with non-finite coordinates.
    pub fn snap_points(&self, points: &[Point<f64>]) -> Result<Vec<NodeKey>, Error> {
        if self.graph.is_empty() {
            return Err(Error::EmptyGraph);
        }
        if let Some((position, point)) = points
            .iter()
            .enumerate()
            .find(|(_, point)| !(point.x().is_finite() && point.y().is_finite()))
        {
            return Err(Error::InvalidData(format!(
                "Point {position} has non-finite coordinates ({}, {})",
                point.x(),
                point.y()
            )));
        }
        self.warn_points_outside_network(points);

        let geographic = self.config.is_geographic();
        points
            .par_iter()
            .map(|point| {
                let nearest = if geographic {
                    self.graph.nearest_node_geographic(point)
                } else {
                    self.graph.nearest_node(point)
                };
                nearest
                    .and_then(|index| self.graph.node_key(index))
                    .ok_or(Error::EmptyGraph)
            })
            .collect()
    }

    /// Neighbourhood of a single node within the configured radius
    pub fn ego_subgraph(&self, node: NodeKey) -> Result<EgoSubgraph, ServiceAreaFailure> {
        EgoSubgraph::expand(&self.graph, node, self.config.radius)
    }

    /// Union of all nodes inside the service areas of `nodes`.
    /// Nodes missing from the graph are skipped.
    pub fn service_area_nodes(&self, nodes: &[NodeKey]) -> HashSet<NodeKey> {
        self.service_area_nodes_with_skipped(nodes).0
    }

    /// Like [`Self::service_area_nodes`], also returning the skipped nodes
    pub fn service_area_nodes_with_skipped(
        &self,
        nodes: &[NodeKey],
    ) -> (HashSet<NodeKey>, Vec<ServiceAreaFailure>) {
        let mut covered = HashSet::new();
        let mut skipped = Vec::new();

        for &node in nodes {
            match self.ego_subgraph(node) {
                Ok(ego) => covered.extend(ego.node_keys()),
                Err(failure) => {
                    debug!("Skipping node {node}: {failure}");
                    skipped.push(failure);
                }
            }
        }

        info!(
            "Service area of {} nodes covers {} nodes ({} skipped)",
            nodes.len(),
            covered.len(),
            skipped.len()
        );
        (covered, skipped)
    }

    /// One convex hull polygon per node whose expansion and hull succeed
    pub fn service_area_polygons(&self, nodes: &[NodeKey]) -> ServiceAreaCollection {
        let mut polygons = Vec::with_capacity(nodes.len());
        let mut skipped = Vec::new();

        for &node in nodes {
            match self
                .ego_subgraph(node)
                .and_then(|ego| ego.convex_hull())
            {
                Ok(polygon) => polygons.push(polygon),
                Err(failure) => {
                    debug!("Skipping node {node}: {failure}");
                    skipped.push(failure);
                }
            }
        }

        info!(
            "Built {} service area polygons from {} nodes ({} skipped)",
            polygons.len(),
            nodes.len(),
            skipped.len()
        );
        ServiceAreaCollection {
            polygons,
            crs: self.config.crs.clone(),
            skipped,
        }
    }

    /// Snaps records and builds their service area polygons in one pass
    pub fn service_areas_for_records(
        &self,
        records: &RecordTable,
        longitude_field: &str,
        latitude_field: &str,
    ) -> Result<ServiceAreaCollection, Error> {
        let nodes = self.snap_to_nearest_nodes(records, longitude_field, latitude_field)?;
        Ok(self.service_area_polygons(&nodes))
    }

    #[allow(clippy::cast_precision_loss)]
    fn warn_points_outside_network(&self, points: &[Point<f64>]) {
        let Some(coverage) = self.graph.coverage() else {
            return;
        };
        if points.is_empty() {
            return;
        }

        let outside = points
            .iter()
            .filter(|point| !point.intersects(coverage))
            .count();

        if outside > 0 {
            let percentage = (outside as f64 / points.len() as f64) * 100.0;
            warn!(
                "{outside} of {} query points ({percentage:.1}%) are outside the street network \
                coverage area and will snap to its boundary",
                points.len()
            );
        }
    }
}
