use axum::extract::State;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use cisne_auth_types::principal::Principal;
use cisne_core::envelope::Reply;
use cisne_core::extract::{JsonBody, PathParams, QueryString};
use cisne_domain::id::EntityId;
use cisne_domain::link::{LinkAttributes, LinkKey, LinkKind};

use crate::domain::types::{Centre, CentreFilter};
use crate::error::ApiError;
use crate::handlers::IdPath;
use crate::handlers::course::CourseResponse;
use crate::handlers::link::{
    LinkResponse, LinkedResponse, create_link, delete_link, list_linked, update_link,
};
use crate::handlers::therapist::TherapistResponse;
use crate::state::AppState;
use crate::usecase::centre::{
    CentreInput, CreateCentreUseCase, DeleteCentreUseCase, GetCentreUseCase, ListCentresUseCase,
    UpdateCentreUseCase,
};
use crate::usecase::link::Side;

#[derive(Debug, Serialize)]
pub struct CentreResponse {
    pub id: EntityId,
    pub cif: String,
    pub name: String,
    pub location: Option<String>,
    pub service_id: Option<EntityId>,
}

impl From<Centre> for CentreResponse {
    fn from(centre: Centre) -> Self {
        Self {
            id: centre.user_id,
            cif: centre.cif,
            name: centre.name,
            location: centre.location,
            service_id: centre.service_id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CentreRequest {
    pub cif: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub service_id: Option<EntityId>,
}

impl From<CentreRequest> for CentreInput {
    fn from(body: CentreRequest) -> Self {
        Self {
            cif: body.cif,
            name: body.name,
            location: body.location,
            service_id: body.service_id,
        }
    }
}

// ── GET /api/centres ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CentreQuery {
    pub name: Option<String>,
    pub location: Option<String>,
    pub cif: Option<String>,
}

pub async fn list_centres(
    State(state): State<AppState>,
    QueryString(query): QueryString<CentreQuery>,
) -> Result<Reply<Vec<CentreResponse>>, ApiError> {
    let usecase = ListCentresUseCase {
        repo: state.centre_repo(),
    };
    let filter = CentreFilter {
        name: query.name,
        location: query.location,
        cif: query.cif,
    };
    let centres = usecase.execute(&filter).await?;
    Ok(Reply::list(centres.into_iter().map(CentreResponse::from).collect()))
}

// ── GET /api/centres/{id} and /api/centres/me ────────────────────────────────

async fn show(state: &AppState, id: EntityId) -> Result<Reply<CentreResponse>, ApiError> {
    let usecase = GetCentreUseCase {
        repo: state.centre_repo(),
    };
    Ok(Reply::ok(usecase.execute(id).await?.into()))
}

pub async fn get_centre(
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<CentreResponse>, ApiError> {
    show(&state, path.id).await
}

pub async fn get_my_centre(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Reply<CentreResponse>, ApiError> {
    show(&state, principal.id).await
}

// ── POST /api/centres ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateCentreRequest {
    pub user_id: EntityId,
    #[serde(flatten)]
    pub centre: CentreRequest,
}

pub async fn create_centre(
    principal: Principal,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateCentreRequest>,
) -> Result<Reply<CentreResponse>, ApiError> {
    let usecase = CreateCentreUseCase {
        repo: state.centre_repo(),
        accounts: state.account_repo(),
        directory: state.directory(),
    };
    let centre = usecase
        .execute(&principal, body.user_id, body.centre.into())
        .await?;
    Ok(Reply::created(centre.into()))
}

// ── PUT /api/centres/{id} and /api/centres/me ────────────────────────────────

async fn update(
    state: &AppState,
    principal: &Principal,
    id: EntityId,
    body: CentreRequest,
) -> Result<Reply<CentreResponse>, ApiError> {
    let usecase = UpdateCentreUseCase {
        repo: state.centre_repo(),
        directory: state.directory(),
    };
    let centre = usecase.execute(principal, id, body.into()).await?;
    Ok(Reply::ok(centre.into()))
}

pub async fn update_centre(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
    JsonBody(body): JsonBody<CentreRequest>,
) -> Result<Reply<CentreResponse>, ApiError> {
    update(&state, &principal, path.id, body).await
}

pub async fn update_my_centre(
    principal: Principal,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CentreRequest>,
) -> Result<Reply<CentreResponse>, ApiError> {
    update(&state, &principal, principal.id, body).await
}

// ── DELETE /api/centres/{id} and /api/centres/me ─────────────────────────────

async fn remove(
    state: &AppState,
    principal: &Principal,
    id: EntityId,
) -> Result<Reply<()>, ApiError> {
    let usecase = DeleteCentreUseCase {
        repo: state.centre_repo(),
    };
    usecase.execute(principal, id).await?;
    Ok(Reply::message("centre deleted"))
}

pub async fn delete_centre(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<()>, ApiError> {
    remove(&state, &principal, path.id).await
}

pub async fn delete_my_centre(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Reply<()>, ApiError> {
    remove(&state, &principal, principal.id).await
}

// ── Employment: /api/centres/{id|me}/therapists ──────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EmployRequest {
    pub therapist_id: EntityId,
    pub contract: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContractRequest {
    pub contract: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TherapistPath {
    pub id: EntityId,
    pub therapist_id: EntityId,
}

#[derive(Debug, Deserialize)]
pub struct MyTherapistPath {
    pub therapist_id: EntityId,
}

fn employment(centre: EntityId, therapist: EntityId) -> LinkKey {
    LinkKey::new(LinkKind::Employs, centre, therapist)
}

fn contract(text: Option<String>) -> LinkAttributes {
    LinkAttributes { text, date: None }
}

pub async fn list_employees(
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<Vec<LinkedResponse<TherapistResponse>>>, ApiError> {
    let lookup = state.therapist_repo();
    list_linked(&state, lookup, Side::Left, LinkKind::Employs, path.id).await
}

pub async fn list_my_employees(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Reply<Vec<LinkedResponse<TherapistResponse>>>, ApiError> {
    let lookup = state.therapist_repo();
    list_linked(&state, lookup, Side::Left, LinkKind::Employs, principal.id).await
}

pub async fn employ(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
    JsonBody(body): JsonBody<EmployRequest>,
) -> Result<Reply<LinkResponse>, ApiError> {
    let key = employment(path.id, body.therapist_id);
    create_link(&state, &principal, key, contract(body.contract)).await
}

pub async fn employ_mine(
    principal: Principal,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<EmployRequest>,
) -> Result<Reply<LinkResponse>, ApiError> {
    let key = employment(principal.id, body.therapist_id);
    create_link(&state, &principal, key, contract(body.contract)).await
}

pub async fn update_contract(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<TherapistPath>,
    JsonBody(body): JsonBody<ContractRequest>,
) -> Result<Reply<LinkResponse>, ApiError> {
    let key = employment(path.id, path.therapist_id);
    update_link(&state, &principal, key, contract(body.contract)).await
}

pub async fn update_my_contract(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<MyTherapistPath>,
    JsonBody(body): JsonBody<ContractRequest>,
) -> Result<Reply<LinkResponse>, ApiError> {
    let key = employment(principal.id, path.therapist_id);
    update_link(&state, &principal, key, contract(body.contract)).await
}

pub async fn dismiss(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<TherapistPath>,
) -> Result<Reply<()>, ApiError> {
    delete_link(&state, &principal, employment(path.id, path.therapist_id)).await
}

pub async fn dismiss_mine(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<MyTherapistPath>,
) -> Result<Reply<()>, ApiError> {
    delete_link(&state, &principal, employment(principal.id, path.therapist_id)).await
}

// ── Postings: /api/centres/{id|me}/courses ───────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PostRequest {
    pub course_id: EntityId,
    pub post_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CoursePath {
    pub id: EntityId,
    pub course_id: EntityId,
}

#[derive(Debug, Deserialize)]
pub struct MyCoursePath {
    pub course_id: EntityId,
}

fn posting(centre: EntityId, course: EntityId) -> LinkKey {
    LinkKey::new(LinkKind::Posts, centre, course)
}

pub async fn list_posted_courses(
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<Vec<LinkedResponse<CourseResponse>>>, ApiError> {
    let lookup = state.course_repo();
    list_linked(&state, lookup, Side::Left, LinkKind::Posts, path.id).await
}

pub async fn list_my_posted_courses(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Reply<Vec<LinkedResponse<CourseResponse>>>, ApiError> {
    let lookup = state.course_repo();
    list_linked(&state, lookup, Side::Left, LinkKind::Posts, principal.id).await
}

pub async fn post_course(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
    JsonBody(body): JsonBody<PostRequest>,
) -> Result<Reply<LinkResponse>, ApiError> {
    let attrs = LinkAttributes {
        text: None,
        date: body.post_date,
    };
    create_link(&state, &principal, posting(path.id, body.course_id), attrs).await
}

pub async fn post_my_course(
    principal: Principal,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<PostRequest>,
) -> Result<Reply<LinkResponse>, ApiError> {
    let attrs = LinkAttributes {
        text: None,
        date: body.post_date,
    };
    let key = posting(principal.id, body.course_id);
    create_link(&state, &principal, key, attrs).await
}

pub async fn unpost_course(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<CoursePath>,
) -> Result<Reply<()>, ApiError> {
    delete_link(&state, &principal, posting(path.id, path.course_id)).await
}

pub async fn unpost_my_course(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<MyCoursePath>,
) -> Result<Reply<()>, ApiError> {
    delete_link(&state, &principal, posting(principal.id, path.course_id)).await
}
