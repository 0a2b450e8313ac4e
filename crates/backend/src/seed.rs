use fieldmap_shared::features::{build_feature_collection, read_features};
use fieldmap_shared::models::ProjectBoundarySet;
use fieldmap_shared::projection::Projection;
use std::path::Path;

use crate::storage::Storage;

pub const SEED_FILE: &str = "projects.json";

/// Read the seed projects from `assets_dir/projects.json`.
pub fn load_projects(assets_dir: &Path) -> Result<Vec<ProjectBoundarySet>, String> {
    let path = assets_dir.join(SEED_FILE);
    let data = std::fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let projects: Vec<ProjectBoundarySet> = serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse {}: {}", SEED_FILE, e))?;

    for project in &projects {
        project
            .validate()
            .map_err(|e| format!("Project {} in {}: {}", project.id, SEED_FILE, e))?;
        read_features(&build_feature_collection(project), Projection::WebMercator)
            .map_err(|e| format!("Project {} in {}: {}", project.id, SEED_FILE, e))?;
    }
    Ok(projects)
}

/// Populate an empty store from the seed file. Returns how many projects were added.
pub fn seed_if_empty(storage: &Storage, assets_dir: &Path) -> Result<usize, String> {
    if storage.count_projects()? > 0 {
        return Ok(0);
    }
    let projects = load_projects(assets_dir)?;
    for project in &projects {
        storage.save_project(project)?;
    }
    tracing::info!(projects = projects.len(), "Seeded project boundaries");
    Ok(projects.len())
}
