use thiserror::Error;

/// Failure while reading task geometries into map features.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    #[error("task {task_id} has no outline geometry")]
    MissingGeometry { task_id: u64 },
    #[error("task {task_id} has a position with fewer than two ordinates")]
    InvalidPosition { task_id: u64 },
    #[error("task {task_id} has a polygon without an exterior ring")]
    MissingExteriorRing { task_id: u64 },
    #[error("task {task_id} has a ring with {len} positions (at least 3 required)")]
    RingTooShort { task_id: u64, len: usize },
}

/// Failure decoding an encoded project id from a route parameter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    #[error("route parameter is not valid base64: {0}")]
    Encoding(String),
    #[error("decoded route parameter {0:?} is not a project id")]
    NotAnId(String),
}

/// A project that cannot be accepted as submitted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectError {
    #[error("task {0} appears more than once")]
    DuplicateTask(u64),
    #[error("task {task_id} has unknown status {status}")]
    UnknownStatus { task_id: u64, status: String },
    #[error("organisation slug {0:?} must be lowercase letters, digits and dashes")]
    InvalidSlug(String),
}
