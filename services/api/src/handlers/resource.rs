use axum::extract::State;
use serde::{Deserialize, Serialize};

use cisne_auth_types::principal::Principal;
use cisne_core::envelope::Reply;
use cisne_core::extract::{JsonBody, PathParams, QueryString};
use cisne_domain::id::EntityId;
use cisne_domain::link::LinkKind;

use crate::domain::types::{Resource, ResourceFilter};
use crate::error::ApiError;
use crate::handlers::link::{LinkedResponse, list_linked};
use crate::handlers::patient::PatientResponse;
use crate::handlers::therapist::TherapistResponse;
use crate::handlers::{IdPath, today};
use crate::state::AppState;
use crate::usecase::link::Side;
use crate::usecase::resource::{
    CreateResourceUseCase, DeleteResourceUseCase, GetResourceUseCase, ListResourcesUseCase,
    PopularResourcesUseCase, ResourceFeedUseCase, ResourceInput, UpdateResourceUseCase,
};

#[derive(Debug, Serialize)]
pub struct ResourceResponse {
    pub id: EntityId,
    pub name: String,
    pub resource_type: Option<String>,
    pub description: Option<String>,
}

impl From<Resource> for ResourceResponse {
    fn from(resource: Resource) -> Self {
        Self {
            id: resource.id,
            name: resource.name,
            resource_type: resource.resource_type,
            description: resource.description,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ResourceRequest {
    pub name: Option<String>,
    pub resource_type: Option<String>,
    pub description: Option<String>,
}

impl From<ResourceRequest> for ResourceInput {
    fn from(body: ResourceRequest) -> Self {
        Self {
            name: body.name,
            resource_type: body.resource_type,
            description: body.description,
        }
    }
}

// ── GET /api/resources ───────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ResourceQuery {
    pub name: Option<String>,
    pub resource_type: Option<String>,
    /// Matches name or description.
    pub q: Option<String>,
}

pub async fn list_resources(
    State(state): State<AppState>,
    QueryString(query): QueryString<ResourceQuery>,
) -> Result<Reply<Vec<ResourceResponse>>, ApiError> {
    let usecase = ListResourcesUseCase {
        repo: state.resource_repo(),
    };
    let filter = ResourceFilter {
        name: query.name,
        resource_type: query.resource_type,
        search: query.q,
    };
    let resources = usecase.execute(&filter).await?;
    Ok(Reply::list(
        resources.into_iter().map(ResourceResponse::from).collect(),
    ))
}

// ── GET /api/resources/mine ──────────────────────────────────────────────────

pub async fn list_my_publications(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Reply<Vec<LinkedResponse<ResourceResponse>>>, ApiError> {
    let lookup = state.resource_repo();
    list_linked(&state, lookup, Side::Left, LinkKind::Publish, principal.id).await
}

// ── GET /api/resources/feed and /api/patients/{id}/feed ──────────────────────

async fn feed(
    state: &AppState,
    patient: EntityId,
) -> Result<Reply<Vec<ResourceResponse>>, ApiError> {
    let usecase = ResourceFeedUseCase {
        links: state.link_repo(),
        resources: state.resource_repo(),
        directory: state.directory(),
    };
    let resources = usecase.execute(patient).await?;
    Ok(Reply::list(
        resources.into_iter().map(ResourceResponse::from).collect(),
    ))
}

pub async fn get_my_feed(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Reply<Vec<ResourceResponse>>, ApiError> {
    feed(&state, principal.id).await
}

pub async fn get_patient_feed(
    _principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<Vec<ResourceResponse>>, ApiError> {
    feed(&state, path.id).await
}

// ── GET /api/resources/popular ───────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct PopularResourceResponse {
    #[serde(flatten)]
    pub resource: ResourceResponse,
    pub consumers: u64,
}

pub async fn list_popular_resources(
    State(state): State<AppState>,
) -> Result<Reply<Vec<PopularResourceResponse>>, ApiError> {
    let usecase = PopularResourcesUseCase {
        repo: state.resource_repo(),
    };
    let ranked = usecase.execute().await?;
    Ok(Reply::list(
        ranked
            .into_iter()
            .map(|(resource, consumers)| PopularResourceResponse {
                resource: resource.into(),
                consumers,
            })
            .collect(),
    ))
}

// ── GET /api/resources/{id} ──────────────────────────────────────────────────

pub async fn get_resource(
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<ResourceResponse>, ApiError> {
    let usecase = GetResourceUseCase {
        repo: state.resource_repo(),
    };
    Ok(Reply::ok(usecase.execute(path.id).await?.into()))
}

// ── POST /api/resources ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateResourceRequest {
    /// Publishing therapist when an admin creates the resource.
    pub therapist_id: Option<EntityId>,
    #[serde(flatten)]
    pub resource: ResourceRequest,
}

pub async fn create_resource(
    principal: Principal,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateResourceRequest>,
) -> Result<Reply<ResourceResponse>, ApiError> {
    let usecase = CreateResourceUseCase {
        repo: state.resource_repo(),
        directory: state.directory(),
    };
    let resource = usecase
        .execute(&principal, body.resource.into(), body.therapist_id, today())
        .await?;
    Ok(Reply::created(resource.into()))
}

// ── PUT /api/resources/{id} ──────────────────────────────────────────────────

pub async fn update_resource(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
    JsonBody(body): JsonBody<ResourceRequest>,
) -> Result<Reply<ResourceResponse>, ApiError> {
    let usecase = UpdateResourceUseCase {
        repo: state.resource_repo(),
        links: state.link_repo(),
    };
    let resource = usecase.execute(&principal, path.id, body.into()).await?;
    Ok(Reply::ok(resource.into()))
}

// ── DELETE /api/resources/{id} ───────────────────────────────────────────────

pub async fn delete_resource(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<()>, ApiError> {
    let usecase = DeleteResourceUseCase {
        repo: state.resource_repo(),
        links: state.link_repo(),
    };
    usecase.execute(&principal, path.id).await?;
    Ok(Reply::message("resource deleted"))
}

// ── GET /api/resources/{id}/publishers and /api/resources/{id}/consumers ─────

pub async fn list_publishers(
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<Vec<LinkedResponse<TherapistResponse>>>, ApiError> {
    let lookup = state.therapist_repo();
    list_linked(&state, lookup, Side::Right, LinkKind::Publish, path.id).await
}

pub async fn list_consumers(
    _principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<Vec<LinkedResponse<PatientResponse>>>, ApiError> {
    let lookup = state.patient_repo();
    list_linked(&state, lookup, Side::Right, LinkKind::Consume, path.id).await
}
