use fieldmap_shared::models::{Organisation, ProjectBoundarySet, TaskRecord, TaskStatus};
use serde::{Deserialize, Serialize};

const TASK_BOUNDARIES_QUERY: &str = r#"query TaskBoundaries($ids: [Int!]) {
    projectTaskBoundaries(ids: $ids) {
        id name updatedAt
        taskBoundaries { id task_status_str outline_geojson }
    }
}"#;

const UPDATE_TASK_STATUS_MUTATION: &str = r#"mutation UpdateTaskStatus($projectId: Int!, $taskId: Int!, $status: String!) {
    updateTaskStatus(projectId: $projectId, taskId: $taskId, status: $status) {
        id task_status_str outline_geojson
    }
}"#;

/// Build the variables JSON for a task boundaries query.
pub fn build_task_boundaries_variables(ids: Option<&[u64]>) -> serde_json::Value {
    serde_json::json!({ "ids": ids })
}

/// Build the variables JSON for a task status mutation.
pub fn build_update_status_variables(
    project_id: u64,
    task_id: u64,
    status: &TaskStatus,
) -> serde_json::Value {
    serde_json::json!({
        "projectId": project_id,
        "taskId": task_id,
        "status": status.as_str(),
    })
}

/// Build a shareable project URL from origin and encoded project id.
pub fn build_project_url(origin: &str, route_key: &str) -> String {
    format!("{}/project/{}", origin, route_key)
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphQLRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLError {
    pub message: String,
}

impl<T> GraphQLResponse<T> {
    /// First error wins; a response without data is an error too.
    pub fn into_result(self) -> Result<T, String> {
        if let Some(errors) = self.errors {
            if let Some(first) = errors.into_iter().next() {
                return Err(first.message);
            }
        }
        self.data.ok_or_else(|| "No data returned".to_string())
    }
}

pub fn origin() -> Option<String> {
    web_sys::window()?.location().origin().ok()
}

fn api_url() -> Result<String, String> {
    let origin = origin().ok_or_else(|| "No window origin".to_string())?;
    Ok(format!("{}/graphql", origin))
}

async fn query<T: for<'de> Deserialize<'de>>(
    query_str: &str,
    variables: Option<serde_json::Value>,
) -> Result<T, String> {
    let req = GraphQLRequest {
        query: query_str.to_string(),
        variables,
    };

    let resp = reqwest::Client::new()
        .post(api_url()?)
        .json(&req)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let gql_resp: GraphQLResponse<T> = resp.json().await.map_err(|e| e.to_string())?;
    gql_resp.into_result()
}

// Types mirroring the GraphQL schema

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: u64,
    pub name: String,
    pub route_key: String,
    pub task_count: u64,
    #[serde(default)]
    pub organisation: Option<Organisation>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectsResponse {
    pub projects: Vec<ProjectSummary>,
}

pub async fn fetch_projects() -> Result<Vec<ProjectSummary>, String> {
    let resp: ProjectsResponse =
        query(r#"query { projects { id name routeKey taskCount organisation { slug name description url } } }"#, None).await?;
    Ok(resp.projects)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskBoundariesResponse {
    pub project_task_boundaries: Vec<ProjectBoundarySet>,
}

pub async fn fetch_task_boundaries(ids: Option<&[u64]>) -> Result<Vec<ProjectBoundarySet>, String> {
    let resp: TaskBoundariesResponse = query(
        TASK_BOUNDARIES_QUERY,
        Some(build_task_boundaries_variables(ids)),
    )
    .await?;
    Ok(resp.project_task_boundaries)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskStatusResponse {
    pub update_task_status: TaskRecord,
}

pub async fn update_task_status(
    project_id: u64,
    task_id: u64,
    status: &TaskStatus,
) -> Result<TaskRecord, String> {
    let resp: UpdateTaskStatusResponse = query(
        UPDATE_TASK_STATUS_MUTATION,
        Some(build_update_status_variables(project_id, task_id, status)),
    )
    .await?;
    Ok(resp.update_task_status)
}
