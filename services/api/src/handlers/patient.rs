//! Patient endpoints. Patient records carry clinical data, so even reads
//! require an authenticated caller.

use axum::extract::State;
use serde::{Deserialize, Serialize};

use cisne_auth_types::principal::Principal;
use cisne_core::envelope::Reply;
use cisne_core::extract::{JsonBody, PathParams, QueryString};
use cisne_domain::id::EntityId;
use cisne_domain::link::{LinkAttributes, LinkKey, LinkKind};

use crate::domain::types::{Patient, PatientFilter};
use crate::error::ApiError;
use crate::handlers::IdPath;
use crate::handlers::link::{LinkResponse, LinkedResponse, create_link, delete_link, list_linked};
use crate::handlers::resource::ResourceResponse;
use crate::handlers::service::ServiceResponse;
use crate::handlers::therapist::TherapistResponse;
use crate::state::AppState;
use crate::usecase::link::Side;
use crate::usecase::patient::{
    CreatePatientUseCase, DeletePatientUseCase, GetPatientUseCase, ListPatientsUseCase,
    PatientInput, UpdatePatientUseCase,
};

#[derive(Debug, Serialize)]
pub struct PatientResponse {
    pub id: EntityId,
    pub first_name: String,
    pub last_name: String,
    pub nif: String,
    pub diagnosis: Option<String>,
}

impl From<Patient> for PatientResponse {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.user_id,
            first_name: patient.first_name,
            last_name: patient.last_name,
            nif: patient.nif,
            diagnosis: patient.diagnosis,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PatientRequest {
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nif: Option<String>,
    pub diagnosis: Option<String>,
}

impl From<PatientRequest> for PatientInput {
    fn from(body: PatientRequest) -> Self {
        Self {
            name: body.name,
            first_name: body.first_name,
            last_name: body.last_name,
            nif: body.nif,
            diagnosis: body.diagnosis,
        }
    }
}

// ── GET /api/patients ────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct PatientQuery {
    pub name: Option<String>,
    pub diagnosis: Option<String>,
}

pub async fn list_patients(
    _principal: Principal,
    State(state): State<AppState>,
    QueryString(query): QueryString<PatientQuery>,
) -> Result<Reply<Vec<PatientResponse>>, ApiError> {
    let usecase = ListPatientsUseCase {
        repo: state.patient_repo(),
    };
    let filter = PatientFilter {
        name: query.name,
        diagnosis: query.diagnosis,
    };
    let patients = usecase.execute(&filter).await?;
    Ok(Reply::list(patients.into_iter().map(PatientResponse::from).collect()))
}

// ── GET /api/patients/{id} and /api/patients/me ──────────────────────────────

async fn show(state: &AppState, id: EntityId) -> Result<Reply<PatientResponse>, ApiError> {
    let usecase = GetPatientUseCase {
        repo: state.patient_repo(),
    };
    Ok(Reply::ok(usecase.execute(id).await?.into()))
}

pub async fn get_patient(
    _principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<PatientResponse>, ApiError> {
    show(&state, path.id).await
}

pub async fn get_my_patient(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Reply<PatientResponse>, ApiError> {
    show(&state, principal.id).await
}

// ── POST /api/patients ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreatePatientRequest {
    pub user_id: EntityId,
    #[serde(flatten)]
    pub patient: PatientRequest,
}

pub async fn create_patient(
    principal: Principal,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreatePatientRequest>,
) -> Result<Reply<PatientResponse>, ApiError> {
    let usecase = CreatePatientUseCase {
        repo: state.patient_repo(),
        accounts: state.account_repo(),
        directory: state.directory(),
    };
    let patient = usecase
        .execute(&principal, body.user_id, body.patient.into())
        .await?;
    Ok(Reply::created(patient.into()))
}

// ── PUT /api/patients/{id} and /api/patients/me ──────────────────────────────

async fn update(
    state: &AppState,
    principal: &Principal,
    id: EntityId,
    body: PatientRequest,
) -> Result<Reply<PatientResponse>, ApiError> {
    let usecase = UpdatePatientUseCase {
        repo: state.patient_repo(),
        directory: state.directory(),
    };
    let patient = usecase.execute(principal, id, body.into()).await?;
    Ok(Reply::ok(patient.into()))
}

pub async fn update_patient(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
    JsonBody(body): JsonBody<PatientRequest>,
) -> Result<Reply<PatientResponse>, ApiError> {
    update(&state, &principal, path.id, body).await
}

pub async fn update_my_patient(
    principal: Principal,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<PatientRequest>,
) -> Result<Reply<PatientResponse>, ApiError> {
    update(&state, &principal, principal.id, body).await
}

// ── DELETE /api/patients/{id} and /api/patients/me ───────────────────────────

async fn remove(
    state: &AppState,
    principal: &Principal,
    id: EntityId,
) -> Result<Reply<()>, ApiError> {
    let usecase = DeletePatientUseCase {
        repo: state.patient_repo(),
    };
    usecase.execute(principal, id).await?;
    Ok(Reply::message("patient deleted"))
}

pub async fn delete_patient(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<()>, ApiError> {
    remove(&state, &principal, path.id).await
}

pub async fn delete_my_patient(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Reply<()>, ApiError> {
    remove(&state, &principal, principal.id).await
}

// ── Therapists treating: /api/patients/{id|me}/therapists ────────────────────

pub async fn list_therapists(
    _principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<Vec<LinkedResponse<TherapistResponse>>>, ApiError> {
    let lookup = state.therapist_repo();
    list_linked(&state, lookup, Side::Right, LinkKind::Treats, path.id).await
}

pub async fn list_my_therapists(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Reply<Vec<LinkedResponse<TherapistResponse>>>, ApiError> {
    let lookup = state.therapist_repo();
    list_linked(&state, lookup, Side::Right, LinkKind::Treats, principal.id).await
}

// ── Payments: /api/patients/{id|me}/services ─────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PayRequest {
    pub service_id: EntityId,
}

#[derive(Debug, Deserialize)]
pub struct ServicePath {
    pub id: EntityId,
    pub service_id: EntityId,
}

#[derive(Debug, Deserialize)]
pub struct MyServicePath {
    pub service_id: EntityId,
}

fn payment(patient: EntityId, service: EntityId) -> LinkKey {
    LinkKey::new(LinkKind::Pays, patient, service)
}

pub async fn list_services(
    _principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<Vec<LinkedResponse<ServiceResponse>>>, ApiError> {
    let lookup = state.service_repo();
    list_linked(&state, lookup, Side::Left, LinkKind::Pays, path.id).await
}

pub async fn list_my_services(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Reply<Vec<LinkedResponse<ServiceResponse>>>, ApiError> {
    let lookup = state.service_repo();
    list_linked(&state, lookup, Side::Left, LinkKind::Pays, principal.id).await
}

pub async fn pay_service(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
    JsonBody(body): JsonBody<PayRequest>,
) -> Result<Reply<LinkResponse>, ApiError> {
    let key = payment(path.id, body.service_id);
    create_link(&state, &principal, key, LinkAttributes::default()).await
}

pub async fn pay_my_service(
    principal: Principal,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<PayRequest>,
) -> Result<Reply<LinkResponse>, ApiError> {
    let key = payment(principal.id, body.service_id);
    create_link(&state, &principal, key, LinkAttributes::default()).await
}

pub async fn cancel_payment(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<ServicePath>,
) -> Result<Reply<()>, ApiError> {
    delete_link(&state, &principal, payment(path.id, path.service_id)).await
}

pub async fn cancel_my_payment(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<MyServicePath>,
) -> Result<Reply<()>, ApiError> {
    delete_link(&state, &principal, payment(principal.id, path.service_id)).await
}

// ── Consumption: /api/patients/{id|me}/resources ─────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ConsumeRequest {
    pub resource_id: EntityId,
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

fn consumption(patient: EntityId, resource: EntityId) -> LinkKey {
    LinkKey::new(LinkKind::Consume, patient, resource)
}

pub async fn list_resources(
    _principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<Vec<LinkedResponse<ResourceResponse>>>, ApiError> {
    let lookup = state.resource_repo();
    list_linked(&state, lookup, Side::Left, LinkKind::Consume, path.id).await
}

pub async fn list_my_resources(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Reply<Vec<LinkedResponse<ResourceResponse>>>, ApiError> {
    let lookup = state.resource_repo();
    list_linked(&state, lookup, Side::Left, LinkKind::Consume, principal.id).await
}

pub async fn consume_resource(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
    JsonBody(body): JsonBody<ConsumeRequest>,
) -> Result<Reply<LinkResponse>, ApiError> {
    let key = consumption(path.id, body.resource_id);
    create_link(&state, &principal, key, LinkAttributes::default()).await
}

pub async fn consume_my_resource(
    principal: Principal,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ConsumeRequest>,
) -> Result<Reply<LinkResponse>, ApiError> {
    let key = consumption(principal.id, body.resource_id);
    create_link(&state, &principal, key, LinkAttributes::default()).await
}

pub async fn release_resource(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<ResourcePath>,
) -> Result<Reply<()>, ApiError> {
    delete_link(&state, &principal, consumption(path.id, path.resource_id)).await
}

pub async fn release_my_resource(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<MyResourcePath>,
) -> Result<Reply<()>, ApiError> {
    delete_link(&state, &principal, consumption(principal.id, path.resource_id)).await
}
