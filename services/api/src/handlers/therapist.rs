use axum::extract::State;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use cisne_auth_types::principal::Principal;
use cisne_core::envelope::Reply;
use cisne_core::extract::{JsonBody, PathParams, QueryString};
use cisne_domain::id::EntityId;
use cisne_domain::link::{LinkAttributes, LinkKey, LinkKind};

use crate::domain::types::{Therapist, TherapistFilter};
use crate::error::ApiError;
use crate::handlers::IdPath;
use crate::handlers::centre::CentreResponse;
use crate::handlers::course::CourseResponse;
use crate::handlers::link::{
    LinkResponse, LinkedResponse, create_link, delete_link, list_linked, update_link,
};
use crate::handlers::patient::PatientResponse;
use crate::handlers::resource::ResourceResponse;
use crate::state::AppState;
use crate::usecase::course::AvailableCoursesUseCase;
use crate::usecase::link::Side;
use crate::usecase::therapist::{
    CreateTherapistUseCase, DeleteTherapistUseCase, GetTherapistUseCase, ListTherapistsUseCase,
    TherapistInput, UpdateTherapistUseCase,
};

#[derive(Debug, Serialize)]
pub struct TherapistResponse {
    pub id: EntityId,
    pub first_name: String,
    pub last_name: String,
    pub nif: String,
    pub society_id: Option<String>,
    pub profession: Option<String>,
}

impl From<Therapist> for TherapistResponse {
    fn from(therapist: Therapist) -> Self {
        Self {
            id: therapist.user_id,
            first_name: therapist.first_name,
            last_name: therapist.last_name,
            nif: therapist.nif,
            society_id: therapist.society_id,
            profession: therapist.profession,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TherapistRequest {
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nif: Option<String>,
    pub society_id: Option<String>,
    pub profession: Option<String>,
}

impl From<TherapistRequest> for TherapistInput {
    fn from(body: TherapistRequest) -> Self {
        Self {
            name: body.name,
            first_name: body.first_name,
            last_name: body.last_name,
            nif: body.nif,
            society_id: body.society_id,
            profession: body.profession,
        }
    }
}

// ── GET /api/therapists ──────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct TherapistQuery {
    pub name: Option<String>,
    pub profession: Option<String>,
}

pub async fn list_therapists(
    State(state): State<AppState>,
    QueryString(query): QueryString<TherapistQuery>,
) -> Result<Reply<Vec<TherapistResponse>>, ApiError> {
    let usecase = ListTherapistsUseCase {
        repo: state.therapist_repo(),
    };
    let filter = TherapistFilter {
        name: query.name,
        profession: query.profession,
    };
    let therapists = usecase.execute(&filter).await?;
    Ok(Reply::list(
        therapists.into_iter().map(TherapistResponse::from).collect(),
    ))
}

// ── GET /api/therapists/{id} and /api/therapists/me ──────────────────────────

async fn show(state: &AppState, id: EntityId) -> Result<Reply<TherapistResponse>, ApiError> {
    let usecase = GetTherapistUseCase {
        repo: state.therapist_repo(),
    };
    Ok(Reply::ok(usecase.execute(id).await?.into()))
}

pub async fn get_therapist(
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<TherapistResponse>, ApiError> {
    show(&state, path.id).await
}

pub async fn get_my_therapist(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Reply<TherapistResponse>, ApiError> {
    show(&state, principal.id).await
}

// ── POST /api/therapists ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateTherapistRequest {
    pub user_id: EntityId,
    #[serde(flatten)]
    pub therapist: TherapistRequest,
}

pub async fn create_therapist(
    principal: Principal,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateTherapistRequest>,
) -> Result<Reply<TherapistResponse>, ApiError> {
    let usecase = CreateTherapistUseCase {
        repo: state.therapist_repo(),
        accounts: state.account_repo(),
        directory: state.directory(),
    };
    let therapist = usecase
        .execute(&principal, body.user_id, body.therapist.into())
        .await?;
    Ok(Reply::created(therapist.into()))
}

// ── PUT /api/therapists/{id} and /api/therapists/me ──────────────────────────

async fn update(
    state: &AppState,
    principal: &Principal,
    id: EntityId,
    body: TherapistRequest,
) -> Result<Reply<TherapistResponse>, ApiError> {
    let usecase = UpdateTherapistUseCase {
        repo: state.therapist_repo(),
        directory: state.directory(),
    };
    let therapist = usecase.execute(principal, id, body.into()).await?;
    Ok(Reply::ok(therapist.into()))
}

pub async fn update_therapist(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
    JsonBody(body): JsonBody<TherapistRequest>,
) -> Result<Reply<TherapistResponse>, ApiError> {
    update(&state, &principal, path.id, body).await
}

pub async fn update_my_therapist(
    principal: Principal,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<TherapistRequest>,
) -> Result<Reply<TherapistResponse>, ApiError> {
    update(&state, &principal, principal.id, body).await
}

// ── DELETE /api/therapists/{id} and /api/therapists/me ───────────────────────

async fn remove(
    state: &AppState,
    principal: &Principal,
    id: EntityId,
) -> Result<Reply<()>, ApiError> {
    let usecase = DeleteTherapistUseCase {
        repo: state.therapist_repo(),
    };
    usecase.execute(principal, id).await?;
    Ok(Reply::message("therapist deleted"))
}

pub async fn delete_therapist(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<()>, ApiError> {
    remove(&state, &principal, path.id).await
}

pub async fn delete_my_therapist(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Reply<()>, ApiError> {
    remove(&state, &principal, principal.id).await
}

// ── Employers: /api/therapists/{id}/centres ──────────────────────────────────

pub async fn list_employers(
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<Vec<LinkedResponse<CentreResponse>>>, ApiError> {
    let lookup = state.centre_repo();
    list_linked(&state, lookup, Side::Right, LinkKind::Employs, path.id).await
}

pub async fn list_my_employers(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Reply<Vec<LinkedResponse<CentreResponse>>>, ApiError> {
    let lookup = state.centre_repo();
    list_linked(&state, lookup, Side::Right, LinkKind::Employs, principal.id).await
}

// ── Treatments: /api/therapists/{id|me}/patients ─────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TreatRequest {
    pub patient_id: EntityId,
    pub report: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub report: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PatientPath {
    pub id: EntityId,
    pub patient_id: EntityId,
}

#[derive(Debug, Deserialize)]
pub struct MyPatientPath {
    pub patient_id: EntityId,
}

fn treatment(therapist: EntityId, patient: EntityId) -> LinkKey {
    LinkKey::new(LinkKind::Treats, therapist, patient)
}

fn report(text: Option<String>) -> LinkAttributes {
    LinkAttributes { text, date: None }
}

pub async fn list_patients(
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<Vec<LinkedResponse<PatientResponse>>>, ApiError> {
    let lookup = state.patient_repo();
    list_linked(&state, lookup, Side::Left, LinkKind::Treats, path.id).await
}

pub async fn list_my_patients(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Reply<Vec<LinkedResponse<PatientResponse>>>, ApiError> {
    let lookup = state.patient_repo();
    list_linked(&state, lookup, Side::Left, LinkKind::Treats, principal.id).await
}

pub async fn treat(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
    JsonBody(body): JsonBody<TreatRequest>,
) -> Result<Reply<LinkResponse>, ApiError> {
    let key = treatment(path.id, body.patient_id);
    create_link(&state, &principal, key, report(body.report)).await
}

pub async fn treat_mine(
    principal: Principal,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<TreatRequest>,
) -> Result<Reply<LinkResponse>, ApiError> {
    let key = treatment(principal.id, body.patient_id);
    create_link(&state, &principal, key, report(body.report)).await
}

pub async fn update_report(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<PatientPath>,
    JsonBody(body): JsonBody<ReportRequest>,
) -> Result<Reply<LinkResponse>, ApiError> {
    let key = treatment(path.id, path.patient_id);
    update_link(&state, &principal, key, report(body.report)).await
}

pub async fn update_my_report(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<MyPatientPath>,
    JsonBody(body): JsonBody<ReportRequest>,
) -> Result<Reply<LinkResponse>, ApiError> {
    let key = treatment(principal.id, path.patient_id);
    update_link(&state, &principal, key, report(body.report)).await
}

pub async fn discharge(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<PatientPath>,
) -> Result<Reply<()>, ApiError> {
    delete_link(&state, &principal, treatment(path.id, path.patient_id)).await
}

pub async fn discharge_mine(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<MyPatientPath>,
) -> Result<Reply<()>, ApiError> {
    delete_link(&state, &principal, treatment(principal.id, path.patient_id)).await
}

// ── Purchases: /api/therapists/{id|me}/courses ───────────────────────────────

#[derive(Debug, Deserialize)]
pub struct BuyRequest {
    pub course_id: EntityId,
    pub buying_date: Option<NaiveDate>,
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

fn purchase(therapist: EntityId, course: EntityId) -> LinkKey {
    LinkKey::new(LinkKind::Buys, therapist, course)
}

pub async fn list_courses(
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<Vec<LinkedResponse<CourseResponse>>>, ApiError> {
    let lookup = state.course_repo();
    list_linked(&state, lookup, Side::Left, LinkKind::Buys, path.id).await
}

pub async fn list_my_courses(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Reply<Vec<LinkedResponse<CourseResponse>>>, ApiError> {
    let lookup = state.course_repo();
    list_linked(&state, lookup, Side::Left, LinkKind::Buys, principal.id).await
}

async fn available(
    state: &AppState,
    therapist: EntityId,
) -> Result<Reply<Vec<CourseResponse>>, ApiError> {
    let usecase = AvailableCoursesUseCase {
        links: state.link_repo(),
        courses: state.course_repo(),
        directory: state.directory(),
    };
    let courses = usecase.execute(therapist).await?;
    Ok(Reply::list(courses.into_iter().map(CourseResponse::from).collect()))
}

pub async fn list_available_courses(
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<Vec<CourseResponse>>, ApiError> {
    available(&state, path.id).await
}

pub async fn list_my_available_courses(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Reply<Vec<CourseResponse>>, ApiError> {
    available(&state, principal.id).await
}

pub async fn buy_course(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
    JsonBody(body): JsonBody<BuyRequest>,
) -> Result<Reply<LinkResponse>, ApiError> {
    let attrs = LinkAttributes {
        text: None,
        date: body.buying_date,
    };
    create_link(&state, &principal, purchase(path.id, body.course_id), attrs).await
}

pub async fn buy_my_course(
    principal: Principal,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<BuyRequest>,
) -> Result<Reply<LinkResponse>, ApiError> {
    let attrs = LinkAttributes {
        text: None,
        date: body.buying_date,
    };
    let key = purchase(principal.id, body.course_id);
    create_link(&state, &principal, key, attrs).await
}

pub async fn drop_course(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<CoursePath>,
) -> Result<Reply<()>, ApiError> {
    delete_link(&state, &principal, purchase(path.id, path.course_id)).await
}

pub async fn drop_my_course(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<MyCoursePath>,
) -> Result<Reply<()>, ApiError> {
    delete_link(&state, &principal, purchase(principal.id, path.course_id)).await
}

// ── Publications: /api/therapists/{id|me}/resources ──────────────────────────

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub resource_id: EntityId,
    pub publication_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ResourcePath {
    pub id: EntityId,
    pub resource_id: EntityId,
}

#[derive(Debug, Deserialize)]
pub struct MyResourcePath {
    pub resource_id: EntityId,
}

fn publication(therapist: EntityId, resource: EntityId) -> LinkKey {
    LinkKey::new(LinkKind::Publish, therapist, resource)
}

pub async fn list_publications(
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<Vec<LinkedResponse<ResourceResponse>>>, ApiError> {
    let lookup = state.resource_repo();
    list_linked(&state, lookup, Side::Left, LinkKind::Publish, path.id).await
}

pub async fn publish(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
    JsonBody(body): JsonBody<PublishRequest>,
) -> Result<Reply<LinkResponse>, ApiError> {
    let attrs = LinkAttributes {
        text: None,
        date: body.publication_date,
    };
    let key = publication(path.id, body.resource_id);
    create_link(&state, &principal, key, attrs).await
}

pub async fn publish_mine(
    principal: Principal,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<PublishRequest>,
) -> Result<Reply<LinkResponse>, ApiError> {
    let attrs = LinkAttributes {
        text: None,
        date: body.publication_date,
    };
    let key = publication(principal.id, body.resource_id);
    create_link(&state, &principal, key, attrs).await
}

pub async fn unpublish(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<ResourcePath>,
) -> Result<Reply<()>, ApiError> {
    delete_link(&state, &principal, publication(path.id, path.resource_id)).await
}

pub async fn unpublish_mine(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<MyResourcePath>,
) -> Result<Reply<()>, ApiError> {
    delete_link(&state, &principal, publication(principal.id, path.resource_id)).await
}
