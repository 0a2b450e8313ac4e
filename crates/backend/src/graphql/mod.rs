use std::sync::Arc;

use async_graphql::{Context, InputObject, Json, Object, SimpleObject};
use fieldmap_shared::{
    extent::Extent,
    features::{build_feature_collection, read_features},
    models::{Organisation, ProjectBoundarySet, TaskOutline, TaskRecord, TaskStatus},
    projection::Projection,
    route::encode_project_id,
};

use crate::storage::Storage;

// GraphQL output types. Task fields keep the snake_case names the map client
// already reads, so a response deserializes straight into `ProjectBoundarySet`.

#[derive(SimpleObject)]
pub struct GqlTask {
    pub id: u64,
    #[graphql(name = "task_status_str")]
    pub status: String,
    #[graphql(name = "outline_geojson")]
    pub outline: Json<TaskOutline>,
}

impl From<TaskRecord> for GqlTask {
    fn from(t: TaskRecord) -> Self {
        GqlTask {
            id: t.id,
            status: t.status.to_string(),
            outline: Json(t.outline),
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlOrganisation {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub url: String,
}

impl From<Organisation> for GqlOrganisation {
    fn from(o: Organisation) -> Self {
        GqlOrganisation {
            slug: o.slug,
            name: o.name,
            description: o.description,
            url: o.url,
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlProject {
    pub id: u64,
    pub name: String,
    pub route_key: String,
    pub task_boundaries: Vec<GqlTask>,
    pub updated_at: Option<String>,
    pub organisation: Option<GqlOrganisation>,
}

impl From<ProjectBoundarySet> for GqlProject {
    fn from(p: ProjectBoundarySet) -> Self {
        GqlProject {
            id: p.id,
            name: p.name,
            route_key: encode_project_id(p.id),
            task_boundaries: p.task_boundaries.into_iter().map(GqlTask::from).collect(),
            updated_at: p.updated_at,
            organisation: p.organisation.map(GqlOrganisation::from),
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlProjectSummary {
    pub id: u64,
    pub name: String,
    pub route_key: String,
    pub task_count: u64,
    pub organisation: Option<GqlOrganisation>,
}

/// Extent in EPSG:3857 meters, plus the same box in degrees.
#[derive(SimpleObject)]
pub struct GqlExtent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl From<Extent> for GqlExtent {
    fn from(e: Extent) -> Self {
        let (west, south) = Projection::WebMercator.to_lonlat(e.min_x, e.min_y);
        let (east, north) = Projection::WebMercator.to_lonlat(e.max_x, e.max_y);
        GqlExtent {
            min_x: e.min_x,
            min_y: e.min_y,
            max_x: e.max_x,
            max_y: e.max_y,
            west,
            south,
            east,
            north,
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlStats {
    pub total_projects: u64,
    pub total_tasks: u64,
    pub db_size_bytes: u64,
}

// Input types

#[derive(InputObject)]
pub struct OrganisationInput {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub url: Option<String>,
}

impl From<OrganisationInput> for Organisation {
    fn from(o: OrganisationInput) -> Self {
        Organisation {
            slug: o.slug,
            name: o.name,
            description: o.description.unwrap_or_default(),
            url: o.url.unwrap_or_default(),
        }
    }
}

#[derive(InputObject)]
pub struct CreateProjectInput {
    pub name: String,
    pub task_boundaries: Json<Vec<TaskRecord>>,
    pub organisation: Option<OrganisationInput>,
}

/// Display-projection extent of a project's tasks; `None` when it has none.
fn project_extent(project: &ProjectBoundarySet) -> async_graphql::Result<Option<Extent>> {
    let features = read_features(&build_feature_collection(project), Projection::WebMercator)
        .map_err(|e| async_graphql::Error::new(e.to_string()))?;
    let extent = Extent::of_features(&features);
    Ok(if extent.is_empty() { None } else { Some(extent) })
}

// Query root

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn projects(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<GqlProjectSummary>> {
        let storage = ctx.data::<Arc<Storage>>()?;
        let projects = storage.list_projects().map_err(async_graphql::Error::new)?;
        Ok(projects
            .into_iter()
            .map(|p| GqlProjectSummary {
                id: p.id,
                route_key: encode_project_id(p.id),
                task_count: p.task_boundaries.len() as u64,
                name: p.name,
                organisation: p.organisation.map(GqlOrganisation::from),
            })
            .collect())
    }

    /// Organisations that run at least one project, by slug.
    async fn organisations(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<GqlOrganisation>> {
        let storage = ctx.data::<Arc<Storage>>()?;
        let projects = storage.list_projects().map_err(async_graphql::Error::new)?;
        let mut orgs: Vec<Organisation> = projects.into_iter().filter_map(|p| p.organisation).collect();
        orgs.sort_by(|a, b| a.slug.cmp(&b.slug));
        orgs.dedup_by(|a, b| a.slug == b.slug);
        Ok(orgs.into_iter().map(GqlOrganisation::from).collect())
    }

    /// Task boundaries of the given projects, or of every project.
    async fn project_task_boundaries(
        &self,
        ctx: &Context<'_>,
        ids: Option<Vec<u64>>,
    ) -> async_graphql::Result<Vec<GqlProject>> {
        let storage = ctx.data::<Arc<Storage>>()?;
        let projects = storage.list_projects().map_err(async_graphql::Error::new)?;
        Ok(projects
            .into_iter()
            .filter(|p| match &ids {
                Some(ids) => ids.contains(&p.id),
                None => true,
            })
            .map(GqlProject::from)
            .collect())
    }

    async fn project(&self, ctx: &Context<'_>, id: u64) -> async_graphql::Result<Option<GqlProject>> {
        let storage = ctx.data::<Arc<Storage>>()?;
        let project = storage.get_project(id).map_err(async_graphql::Error::new)?;
        Ok(project.map(GqlProject::from))
    }

    /// Extent of a project's tasks in EPSG:3857 meters.
    async fn project_extent(
        &self,
        ctx: &Context<'_>,
        id: u64,
    ) -> async_graphql::Result<Option<GqlExtent>> {
        let storage = ctx.data::<Arc<Storage>>()?;
        let project = storage
            .get_project(id)
            .map_err(async_graphql::Error::new)?
            .ok_or_else(|| async_graphql::Error::new("Project not found"))?;
        Ok(project_extent(&project)?.map(GqlExtent::from))
    }

    async fn task_statuses(&self) -> Vec<String> {
        TaskStatus::KNOWN.iter().map(|s| s.to_string()).collect()
    }

    async fn stats(&self, ctx: &Context<'_>) -> async_graphql::Result<GqlStats> {
        let storage = ctx.data::<Arc<Storage>>()?;
        let projects = storage.list_projects().map_err(async_graphql::Error::new)?;
        let db_size_bytes = storage.db_size_bytes().map_err(async_graphql::Error::new)?;
        Ok(GqlStats {
            total_projects: projects.len() as u64,
            total_tasks: projects.iter().map(|p| p.task_boundaries.len() as u64).sum(),
            db_size_bytes,
        })
    }
}

// Mutation root

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_project(
        &self,
        ctx: &Context<'_>,
        input: CreateProjectInput,
    ) -> async_graphql::Result<GqlProject> {
        let storage = ctx.data::<Arc<Storage>>()?;

        // The id is assigned by storage.
        let draft = ProjectBoundarySet {
            id: 0,
            name: input.name,
            task_boundaries: input.task_boundaries.0,
            updated_at: Some(chrono::Utc::now().to_rfc3339()),
            organisation: input.organisation.map(Organisation::from),
        };
        draft
            .validate()
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;
        // Reject outlines the map could not draw.
        project_extent(&draft)?;

        let project = storage
            .create_project(draft)
            .map_err(async_graphql::Error::new)?;
        tracing::info!(project_id = project.id, tasks = project.task_boundaries.len(), "Created project");

        Ok(GqlProject::from(project))
    }

    async fn update_task_status(
        &self,
        ctx: &Context<'_>,
        project_id: u64,
        task_id: u64,
        status: String,
    ) -> async_graphql::Result<GqlTask> {
        let status = TaskStatus::from(status);
        if !status.is_known() {
            return Err(async_graphql::Error::new(format!("Unknown task status: {}", status)));
        }
        let storage = ctx.data::<Arc<Storage>>()?;
        let now = chrono::Utc::now().to_rfc3339();

        let project = storage
            .update_task_status(project_id, task_id, status.clone(), &now)
            .map_err(async_graphql::Error::new)?
            .ok_or_else(|| async_graphql::Error::new("Task not found"))?;
        tracing::info!(project_id, task_id, %status, "Updated task status");

        project
            .task(task_id)
            .cloned()
            .map(GqlTask::from)
            .ok_or_else(|| async_graphql::Error::new("Task not found"))
    }

    async fn delete_project(&self, ctx: &Context<'_>, id: u64) -> async_graphql::Result<bool> {
        let storage = ctx.data::<Arc<Storage>>()?;
        storage.delete_project(id).map_err(async_graphql::Error::new)
    }
}

pub type Schema = async_graphql::Schema<QueryRoot, MutationRoot, async_graphql::EmptySubscription>;

pub fn build_schema(storage: Arc<Storage>) -> Schema {
    async_graphql::Schema::build(QueryRoot, MutationRoot, async_graphql::EmptySubscription)
        .data(storage)
        .finish()
}
