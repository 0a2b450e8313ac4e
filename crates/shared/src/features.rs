//! Task records to map features.
//!
//! A render builds a [`FeatureCollection`] from one project's task records and
//! then reads it into [`MapFeature`]s in the display projection. Each feature
//! carries its task id and status as a structured [`TaskKey`].
use geo::{BoundingRect, Contains, Coord, LineString, MultiPolygon, Point, Polygon, Rect};

use crate::error::FeatureError;
use crate::models::{Geometry, Position, ProjectBoundarySet, TaskStatus};
use crate::projection::Projection;

/// Separator of the legacy `"{id}_{status}"` feature id.
pub const COMPOSITE_ID_SEPARATOR: char = '_';

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskKey {
    pub id: u64,
    pub status: TaskStatus,
}

impl TaskKey {
    pub fn new(id: u64, status: TaskStatus) -> Self {
        TaskKey { id, status }
    }

    /// Legacy feature id, e.g. `"42_READY"`.
    pub fn composite_id(&self) -> String {
        format!("{}{}{}", self.id, COMPOSITE_ID_SEPARATOR, self.status)
    }

    /// Parse a legacy feature id. Splits at the first separator, so the
    /// status may itself contain underscores but the id may not.
    pub fn from_composite_id(composite: &str) -> Option<Self> {
        let (id, status) = composite.split_once(COMPOSITE_ID_SEPARATOR)?;
        let id = id.parse().ok()?;
        if status.is_empty() {
            return None;
        }
        Some(TaskKey::new(id, TaskStatus::from(status)))
    }
}

/// Intermediate feature: key and geometry copied from a task record.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFeature {
    pub key: TaskKey,
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureCollection {
    pub features: Vec<TaskFeature>,
}

impl FeatureCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// One feature per task, in record order. Task properties are not copied;
/// styling only needs the key.
pub fn build_feature_collection(project: &ProjectBoundarySet) -> FeatureCollection {
    let features = project
        .task_boundaries
        .iter()
        .map(|task| TaskFeature {
            key: TaskKey::new(task.id, task.status.clone()),
            geometry: task.outline.geometry.clone(),
        })
        .collect();
    FeatureCollection { features }
}

/// A parsed task boundary in display coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct MapFeature {
    pub key: TaskKey,
    pub geometry: MultiPolygon<f64>,
}

impl MapFeature {
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.geometry.bounding_rect()
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.geometry.contains(&Point::new(x, y))
    }
}

/// Read every feature of `collection` into `projection`.
pub fn read_features(
    collection: &FeatureCollection,
    projection: Projection,
) -> Result<Vec<MapFeature>, FeatureError> {
    collection
        .features
        .iter()
        .map(|feature| read_feature(feature, projection))
        .collect()
}

fn read_feature(feature: &TaskFeature, projection: Projection) -> Result<MapFeature, FeatureError> {
    let task_id = feature.key.id;
    let geometry = feature
        .geometry
        .as_ref()
        .ok_or(FeatureError::MissingGeometry { task_id })?;

    let polygons = match geometry {
        Geometry::Polygon { coordinates } => vec![read_polygon(coordinates, projection, task_id)?],
        Geometry::MultiPolygon { coordinates } => coordinates
            .iter()
            .map(|rings| read_polygon(rings, projection, task_id))
            .collect::<Result<Vec<_>, _>>()?,
    };

    Ok(MapFeature {
        key: feature.key.clone(),
        geometry: MultiPolygon::new(polygons),
    })
}

fn read_polygon(
    rings: &[Vec<Position>],
    projection: Projection,
    task_id: u64,
) -> Result<Polygon<f64>, FeatureError> {
    let (exterior, interiors) = rings
        .split_first()
        .ok_or(FeatureError::MissingExteriorRing { task_id })?;
    let exterior = read_ring(exterior, projection, task_id)?;
    let interiors = interiors
        .iter()
        .map(|ring| read_ring(ring, projection, task_id))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn read_ring(
    ring: &[Position],
    projection: Projection,
    task_id: u64,
) -> Result<LineString<f64>, FeatureError> {
    if ring.len() < 3 {
        return Err(FeatureError::RingTooShort {
            task_id,
            len: ring.len(),
        });
    }
    let coords = ring
        .iter()
        .map(|position| match position.as_slice() {
            [lon, lat, ..] => {
                let (x, y) = projection.from_lonlat(*lon, *lat);
                Ok(Coord { x, y })
            }
            _ => Err(FeatureError::InvalidPosition { task_id }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(LineString::new(coords))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{Geometry, ProjectBoundarySet, TaskOutline, TaskRecord, TaskStatus};

    /// Axis-aligned lon/lat square as a closed polygon.
    pub fn square(lon: f64, lat: f64, size: f64) -> Geometry {
        Geometry::Polygon {
            coordinates: vec![vec![
                vec![lon, lat],
                vec![lon + size, lat],
                vec![lon + size, lat + size],
                vec![lon, lat + size],
                vec![lon, lat],
            ]],
        }
    }

    pub fn task(id: u64, status: TaskStatus, geometry: Geometry) -> TaskRecord {
        TaskRecord {
            id,
            status,
            outline: TaskOutline::new(geometry),
        }
    }

    pub fn project(id: u64, tasks: Vec<TaskRecord>) -> ProjectBoundarySet {
        ProjectBoundarySet {
            id,
            name: format!("Project {}", id),
            task_boundaries: tasks,
            updated_at: None,
            organisation: None,
        }
    }
}
