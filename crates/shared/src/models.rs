use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ProjectError;

/// Status label of a mapping task.
///
/// Known labels map to dedicated variants; anything else is kept verbatim in
/// `Unknown` so it still reaches the style lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    Ready,
    LockedForMapping,
    Mapped,
    LockedForValidation,
    Validated,
    Invalidated,
    Bad,
    Split,
    Archived,
    Unknown(String),
}

impl TaskStatus {
    pub const KNOWN: [TaskStatus; 9] = [
        TaskStatus::Ready,
        TaskStatus::LockedForMapping,
        TaskStatus::Mapped,
        TaskStatus::LockedForValidation,
        TaskStatus::Validated,
        TaskStatus::Invalidated,
        TaskStatus::Bad,
        TaskStatus::Split,
        TaskStatus::Archived,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Ready => "READY",
            TaskStatus::LockedForMapping => "LOCKED_FOR_MAPPING",
            TaskStatus::Mapped => "MAPPED",
            TaskStatus::LockedForValidation => "LOCKED_FOR_VALIDATION",
            TaskStatus::Validated => "VALIDATED",
            TaskStatus::Invalidated => "INVALIDATED",
            TaskStatus::Bad => "BAD",
            TaskStatus::Split => "SPLIT",
            TaskStatus::Archived => "ARCHIVED",
            TaskStatus::Unknown(label) => label,
        }
    }

    /// Human-readable label for legends ("LOCKED_FOR_MAPPING" -> "Locked for mapping").
    pub fn display_name(&self) -> String {
        let lower = self.as_str().replace('_', " ").to_lowercase();
        let mut chars = lower.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, TaskStatus::Unknown(_))
    }
}

impl From<&str> for TaskStatus {
    fn from(label: &str) -> Self {
        match label {
            "READY" => TaskStatus::Ready,
            "LOCKED_FOR_MAPPING" => TaskStatus::LockedForMapping,
            "MAPPED" => TaskStatus::Mapped,
            "LOCKED_FOR_VALIDATION" => TaskStatus::LockedForValidation,
            "VALIDATED" => TaskStatus::Validated,
            "INVALIDATED" => TaskStatus::Invalidated,
            "BAD" => TaskStatus::Bad,
            "SPLIT" => TaskStatus::Split,
            "ARCHIVED" => TaskStatus::Archived,
            other => TaskStatus::Unknown(other.to_string()),
        }
    }
}

impl From<String> for TaskStatus {
    fn from(label: String) -> Self {
        TaskStatus::from(label.as_str())
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Unknown(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A GeoJSON position: longitude, latitude and optional extra ordinates.
pub type Position = Vec<f64>;

/// GeoJSON geometry object. Task boundaries are always areal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
}

impl Geometry {
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
        }
    }
}

/// The GeoJSON feature wrapping a task outline as the backend sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutline {
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

fn feature_type() -> String {
    "Feature".to_string()
}

impl TaskOutline {
    pub fn new(geometry: Geometry) -> Self {
        TaskOutline {
            kind: feature_type(),
            geometry: Some(geometry),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: u64,
    #[serde(rename = "task_status_str")]
    pub status: TaskStatus,
    #[serde(rename = "outline_geojson")]
    pub outline: TaskOutline,
}

/// The organisation running a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organisation {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
}

impl Organisation {
    pub fn has_valid_slug(&self) -> bool {
        !self.slug.is_empty()
            && !self.slug.starts_with('-')
            && !self.slug.ends_with('-')
            && self
                .slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }
}

/// All task boundaries of one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBoundarySet {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub task_boundaries: Vec<TaskRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation: Option<Organisation>,
}

impl ProjectBoundarySet {
    /// Task ids must be unique and statuses known; a given organisation needs a usable slug.
    pub fn validate(&self) -> Result<(), ProjectError> {
        let mut seen = HashSet::new();
        for task in &self.task_boundaries {
            if !seen.insert(task.id) {
                return Err(ProjectError::DuplicateTask(task.id));
            }
            if !task.status.is_known() {
                return Err(ProjectError::UnknownStatus {
                    task_id: task.id,
                    status: task.status.to_string(),
                });
            }
        }
        if let Some(org) = &self.organisation {
            if !org.has_valid_slug() {
                return Err(ProjectError::InvalidSlug(org.slug.clone()));
            }
        }
        Ok(())
    }

    pub fn task(&self, task_id: u64) -> Option<&TaskRecord> {
        self.task_boundaries.iter().find(|t| t.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: u64) -> Option<&mut TaskRecord> {
        self.task_boundaries.iter_mut().find(|t| t.id == task_id)
    }
}

/// Find the boundary set for `project_id` in an externally supplied collection.
pub fn find_project(sets: &[ProjectBoundarySet], project_id: u64) -> Option<&ProjectBoundarySet> {
    sets.iter().find(|p| p.id == project_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_known_roundtrip() {
        let status: TaskStatus = serde_json::from_str("\"LOCKED_FOR_MAPPING\"").unwrap();
        assert_eq!(status, TaskStatus::LockedForMapping);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"LOCKED_FOR_MAPPING\"");
    }

    #[test]
    fn test_status_unknown_is_preserved() {
        let status: TaskStatus = serde_json::from_str("\"PENDING\"").unwrap();
        assert_eq!(status, TaskStatus::Unknown("PENDING".to_string()));
        assert!(!status.is_known());
        assert_eq!(status.to_string(), "PENDING");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(TaskStatus::LockedForMapping.display_name(), "Locked for mapping");
        assert_eq!(TaskStatus::Ready.display_name(), "Ready");
    }

    #[test]
    fn test_task_record_from_backend_json() {
        let json = r#"{
            "id": 42,
            "task_status_str": "READY",
            "outline_geojson": {
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[85.3, 27.7], [85.4, 27.7], [85.4, 27.8], [85.3, 27.7]]]
                },
                "properties": {"uid": 42}
            }
        }"#;
        let task: TaskRecord = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, 42);
        assert_eq!(task.status, TaskStatus::Ready);
        assert_eq!(task.outline.geometry.as_ref().unwrap().kind(), "Polygon");
    }

    #[test]
    fn test_task_record_without_geometry() {
        let json = r#"{"id": 7, "task_status_str": "MAPPED", "outline_geojson": {"type": "Feature"}}"#;
        let task: TaskRecord = serde_json::from_str(json).unwrap();
        assert!(task.outline.geometry.is_none());
    }

    fn task(id: u64, status: TaskStatus) -> TaskRecord {
        TaskRecord {
            id,
            status,
            outline: TaskOutline {
                kind: "Feature".to_string(),
                geometry: None,
            },
        }
    }

    fn project_with(tasks: Vec<TaskRecord>) -> ProjectBoundarySet {
        ProjectBoundarySet {
            id: 1,
            name: "One".to_string(),
            task_boundaries: tasks,
            updated_at: None,
            organisation: None,
        }
    }

    #[test]
    fn test_validate_accepts_unique_known_tasks() {
        let project = project_with(vec![task(1, TaskStatus::Ready), task(2, TaskStatus::Mapped)]);
        assert_eq!(project.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_duplicate_task_ids() {
        let project = project_with(vec![task(7, TaskStatus::Ready), task(7, TaskStatus::Mapped)]);
        assert_eq!(project.validate(), Err(ProjectError::DuplicateTask(7)));
    }

    #[test]
    fn test_validate_rejects_unknown_status() {
        let project = project_with(vec![task(3, TaskStatus::from("PENDING"))]);
        assert_eq!(
            project.validate(),
            Err(ProjectError::UnknownStatus {
                task_id: 3,
                status: "PENDING".to_string()
            })
        );
    }

    #[test]
    fn test_organisation_slug() {
        let mut org = Organisation {
            slug: "hot-osm".to_string(),
            name: "HOT".to_string(),
            description: String::new(),
            url: String::new(),
        };
        assert!(org.has_valid_slug());
        for bad in ["", "HOT", "hot osm", "-hot", "hot-"] {
            org.slug = bad.to_string();
            assert!(!org.has_valid_slug(), "{bad:?} accepted");
        }

        let mut project = project_with(vec![]);
        project.organisation = Some(org);
        assert_eq!(
            project.validate(),
            Err(ProjectError::InvalidSlug("hot-".to_string()))
        );
    }

    #[test]
    fn test_organisation_is_optional_on_the_wire() {
        let json = r#"{"id": 4, "name": "Four", "organisation": {"slug": "hot", "name": "HOT"}}"#;
        let project: ProjectBoundarySet = serde_json::from_str(json).unwrap();
        assert_eq!(project.organisation.as_ref().map(|o| o.slug.as_str()), Some("hot"));
        assert_eq!(project.organisation.unwrap().url, "");

        let bare = serde_json::to_value(project_with(vec![])).unwrap();
        assert!(bare.get("organisation").is_none());
    }

    #[test]
    fn test_find_project() {
        let sets = vec![
            ProjectBoundarySet {
                id: 1,
                name: "One".to_string(),
                task_boundaries: vec![],
                updated_at: None,
                organisation: None,
            },
            ProjectBoundarySet {
                id: 2,
                name: "Two".to_string(),
                task_boundaries: vec![],
                updated_at: None,
                organisation: None,
            },
        ];
        assert_eq!(find_project(&sets, 2).map(|p| p.name.as_str()), Some("Two"));
        assert!(find_project(&sets, 3).is_none());
    }
}
