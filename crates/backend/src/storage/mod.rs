use fieldmap_shared::models::{ProjectBoundarySet, TaskStatus};
use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const PROJECTS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("projects");

/// Project boundary sets keyed by project id, stored as JSON.
pub struct Storage {
    db: Database,
    path: PathBuf,
}

impl Storage {
    pub fn open(path: &Path) -> Result<Arc<Self>, String> {
        let db = Database::create(path)
            .map_err(|e| format!("Failed to open database at {}: {}", path.display(), e))?;

        // Ensure table exists
        let write_txn = db.begin_write().map_err(|e| e.to_string())?;
        {
            write_txn.open_table(PROJECTS_TABLE).map_err(|e| e.to_string())?;
        }
        write_txn.commit().map_err(|e| e.to_string())?;

        Ok(Arc::new(Storage {
            db,
            path: path.to_path_buf(),
        }))
    }

    pub fn save_project(&self, project: &ProjectBoundarySet) -> Result<(), String> {
        let json = serde_json::to_vec(project).map_err(|e| e.to_string())?;

        let write_txn = self.db.begin_write().map_err(|e| e.to_string())?;
        {
            let mut table = write_txn.open_table(PROJECTS_TABLE).map_err(|e| e.to_string())?;
            table
                .insert(project.id, json.as_slice())
                .map_err(|e| e.to_string())?;
        }
        write_txn.commit().map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn get_project(&self, id: u64) -> Result<Option<ProjectBoundarySet>, String> {
        let read_txn = self.db.begin_read().map_err(|e| e.to_string())?;
        let table = read_txn.open_table(PROJECTS_TABLE).map_err(|e| e.to_string())?;

        match table.get(id).map_err(|e| e.to_string())? {
            Some(value) => serde_json::from_slice(value.value())
                .map(Some)
                .map_err(|e| e.to_string()),
            None => Ok(None),
        }
    }

    /// All projects in id order.
    pub fn list_projects(&self) -> Result<Vec<ProjectBoundarySet>, String> {
        let read_txn = self.db.begin_read().map_err(|e| e.to_string())?;
        let table = read_txn.open_table(PROJECTS_TABLE).map_err(|e| e.to_string())?;

        let mut projects = Vec::new();
        for entry in table.iter().map_err(|e| e.to_string())? {
            let (_, value) = entry.map_err(|e| e.to_string())?;
            let project: ProjectBoundarySet =
                serde_json::from_slice(value.value()).map_err(|e| e.to_string())?;
            projects.push(project);
        }
        Ok(projects)
    }

    /// Store `project` under the next free id. The id is read and written in
    /// one write transaction, so concurrent creates never share an id.
    pub fn create_project(&self, mut project: ProjectBoundarySet) -> Result<ProjectBoundarySet, String> {
        let write_txn = self.db.begin_write().map_err(|e| e.to_string())?;
        {
            let mut table = write_txn.open_table(PROJECTS_TABLE).map_err(|e| e.to_string())?;
            let last = table
                .last()
                .map_err(|e| e.to_string())?
                .map(|(key, _)| key.value());
            project.id = last.map_or(1, |id| id + 1);

            let json = serde_json::to_vec(&project).map_err(|e| e.to_string())?;
            table
                .insert(project.id, json.as_slice())
                .map_err(|e| e.to_string())?;
        }
        write_txn.commit().map_err(|e| e.to_string())?;
        Ok(project)
    }

    /// Set one task's status. Returns the updated project, or `None` when
    /// either the project or the task does not exist.
    pub fn update_task_status(
        &self,
        project_id: u64,
        task_id: u64,
        status: TaskStatus,
        updated_at: &str,
    ) -> Result<Option<ProjectBoundarySet>, String> {
        let write_txn = self.db.begin_write().map_err(|e| e.to_string())?;
        let updated = {
            let mut table = write_txn.open_table(PROJECTS_TABLE).map_err(|e| e.to_string())?;
            let stored = table
                .get(project_id)
                .map_err(|e| e.to_string())?
                .map(|value| value.value().to_vec());

            let Some(bytes) = stored else {
                return Ok(None);
            };
            let mut project: ProjectBoundarySet =
                serde_json::from_slice(&bytes).map_err(|e| e.to_string())?;
            let Some(task) = project.task_mut(task_id) else {
                return Ok(None);
            };
            task.status = status;
            project.updated_at = Some(updated_at.to_string());

            let json = serde_json::to_vec(&project).map_err(|e| e.to_string())?;
            table
                .insert(project_id, json.as_slice())
                .map_err(|e| e.to_string())?;
            project
        };
        write_txn.commit().map_err(|e| e.to_string())?;
        Ok(Some(updated))
    }

    pub fn count_projects(&self) -> Result<u64, String> {
        let read_txn = self.db.begin_read().map_err(|e| e.to_string())?;
        let table = read_txn.open_table(PROJECTS_TABLE).map_err(|e| e.to_string())?;
        table.len().map_err(|e| e.to_string())
    }

    pub fn db_size_bytes(&self) -> Result<u64, String> {
        std::fs::metadata(&self.path)
            .map(|m| m.len())
            .map_err(|e| e.to_string())
    }

    pub fn delete_project(&self, id: u64) -> Result<bool, String> {
        let write_txn = self.db.begin_write().map_err(|e| e.to_string())?;
        let removed = {
            let mut table = write_txn.open_table(PROJECTS_TABLE).map_err(|e| e.to_string())?;
            let result = table.remove(id).map_err(|e| e.to_string())?;
            result.is_some()
        };
        write_txn.commit().map_err(|e| e.to_string())?;
        Ok(removed)
    }
}
