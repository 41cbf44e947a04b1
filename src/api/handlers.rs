//! REST handlers. Each one extracts the caller's `userId` and defers to
//! [`ResourceService`](crate::core::service::ResourceService).

use crate::api::error::{invalid_body, ApiResult};
use crate::api::state::AppState;
use crate::domain::model::{
    CheckoutRecord, InviteOutcome, NewProject, PoolSummary, Project, Quantity, ResourceReceipt,
    ResourceView, UserId,
};
use crate::utils::error::HaasError;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity of the caller, already authenticated upstream.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[serde(flatten)]
    pub project: NewProject,
    #[serde(default)]
    pub user_id: String,
}

/// Body of checkout and checkin, read leniently so that membership is
/// decided before anything about the body is reported. A body that cannot be
/// read, or a `userId` that is not a string, leaves the caller anonymous.
#[derive(Debug)]
pub struct QuantityRequest {
    pub user_id: String,
    pub quantity: Result<Quantity, HaasError>,
}

impl QuantityRequest {
    pub fn from_body(body: Result<Json<Value>, JsonRejection>) -> Self {
        match body {
            Ok(Json(value)) => Self {
                user_id: value
                    .get("userId")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                quantity: Ok(Quantity::from_json(
                    value.get("quantity").unwrap_or(&Value::Null),
                )),
            },
            Err(rejection) => Self {
                user_id: String::new(),
                quantity: Err(invalid_body(rejection)),
            },
        }
    }

    /// The quantity, or the body error once the caller has been admitted.
    fn admitted_quantity(
        self,
        state: &AppState,
        project_id: &str,
        hwset_id: &str,
    ) -> ApiResult<(Quantity, String)> {
        match self.quantity {
            Ok(quantity) => Ok((quantity, self.user_id)),
            Err(e) => {
                state
                    .service
                    .authorize_resource(project_id, hwset_id, &self.user_id)?;
                Err(e)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteRequest {
    #[serde(default)]
    pub requesting_user: String,
    #[serde(default)]
    pub invite_user: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MembersResponse {
    pub members: Vec<UserId>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub message: String,
    pub version: String,
    pub started_at: DateTime<Utc>,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "HaaS API is running".to_string(),
        version: state.version.clone(),
        started_at: state.started_at,
    })
}

pub async fn list_hardware(State(state): State<AppState>) -> ApiResult<Json<Vec<PoolSummary>>> {
    Ok(Json(state.service.hardware_sets()?))
}

pub async fn create_project(
    State(state): State<AppState>,
    body: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let Json(request) = body.map_err(invalid_body)?;
    let project = state
        .service
        .create_project(&request.project, &request.user_id)?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Json<Vec<Project>> {
    Json(state.service.list_projects(&query.user_id))
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<Project>> {
    let project = state.service.get_project(&project_id, &query.user_id)?;
    Ok(Json(project))
}

pub async fn list_resources(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<Vec<ResourceView>>> {
    let views = state.service.list_resources(&project_id, &query.user_id)?;
    Ok(Json(views))
}

pub async fn checkout(
    State(state): State<AppState>,
    Path((project_id, hwset_id)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<ResourceReceipt>> {
    let (quantity, user_id) =
        QuantityRequest::from_body(body).admitted_quantity(&state, &project_id, &hwset_id)?;
    let receipt = state
        .service
        .checkout_resource(&project_id, &hwset_id, quantity, &user_id)?;
    Ok(Json(receipt))
}

pub async fn checkin(
    State(state): State<AppState>,
    Path((project_id, hwset_id)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<ResourceReceipt>> {
    let (quantity, user_id) =
        QuantityRequest::from_body(body).admitted_quantity(&state, &project_id, &hwset_id)?;
    let receipt = state
        .service
        .checkin_resource(&project_id, &hwset_id, quantity, &user_id)?;
    Ok(Json(receipt))
}

pub async fn resource_history(
    State(state): State<AppState>,
    Path((project_id, hwset_id)): Path<(String, String)>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<Vec<CheckoutRecord>>> {
    let history = state
        .service
        .resource_history(&project_id, &hwset_id, &query.user_id)?;
    Ok(Json(history))
}

pub async fn invite(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    body: Result<Json<InviteRequest>, JsonRejection>,
) -> ApiResult<Json<InviteOutcome>> {
    let Json(request) = body.map_err(invalid_body)?;
    let outcome = state.service.invite_member(
        &project_id,
        &request.requesting_user,
        &request.invite_user,
    )?;
    Ok(Json(outcome))
}

pub async fn list_members(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<MembersResponse>> {
    let members = state.service.list_members(&project_id, &query.user_id)?;
    Ok(Json(MembersResponse { members }))
}
