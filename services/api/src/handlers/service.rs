use axum::extract::State;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use cisne_auth_types::principal::Principal;
use cisne_core::envelope::Reply;
use cisne_core::extract::{JsonBody, PathParams, QueryString};
use cisne_domain::id::EntityId;
use cisne_domain::link::LinkKind;

use crate::domain::types::{Service, ServiceFilter};
use crate::error::ApiError;
use crate::handlers::link::{LinkedResponse, list_linked};
use crate::handlers::patient::PatientResponse;
use crate::handlers::{IdPath, today};
use crate::state::AppState;
use crate::usecase::link::Side;
use crate::usecase::service::{
    CreateServiceUseCase, DeleteServiceUseCase, GetServiceUseCase, ListServicesUseCase,
    ServiceInput, UpdateServiceUseCase,
};

#[derive(Debug, Serialize)]
pub struct ServiceResponse {
    pub id: EntityId,
    pub invoice_id: Option<EntityId>,
    pub name: String,
    pub price: Option<f64>,
    pub tools: Option<String>,
    pub room: Option<String>,
    pub service_date: Option<NaiveDate>,
}

impl From<Service> for ServiceResponse {
    fn from(service: Service) -> Self {
        Self {
            id: service.id,
            invoice_id: service.invoice_id,
            name: service.name,
            price: service.price,
            tools: service.tools,
            room: service.room,
            service_date: service.date,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ServiceRequest {
    pub invoice_id: Option<EntityId>,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub tools: Option<String>,
    pub room: Option<String>,
    pub service_date: Option<NaiveDate>,
}

impl From<ServiceRequest> for ServiceInput {
    fn from(body: ServiceRequest) -> Self {
        Self {
            invoice_id: body.invoice_id,
            name: body.name,
            price: body.price,
            tools: body.tools,
            room: body.room,
            date: body.service_date,
        }
    }
}

// ── GET /api/services and /api/services/available ────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ServiceQuery {
    pub name: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl From<ServiceQuery> for ServiceFilter {
    fn from(query: ServiceQuery) -> Self {
        Self {
            name: query.name,
            min_price: query.min_price,
            max_price: query.max_price,
            from: query.from,
            to: query.to,
            available_from: None,
        }
    }
}

pub async fn list_services(
    State(state): State<AppState>,
    QueryString(query): QueryString<ServiceQuery>,
) -> Result<Reply<Vec<ServiceResponse>>, ApiError> {
    let usecase = ListServicesUseCase {
        repo: state.service_repo(),
    };
    let services = usecase.execute(&query.into()).await?;
    Ok(Reply::list(services.into_iter().map(ServiceResponse::from).collect()))
}

pub async fn list_available_services(
    State(state): State<AppState>,
    QueryString(query): QueryString<ServiceQuery>,
) -> Result<Reply<Vec<ServiceResponse>>, ApiError> {
    let usecase = ListServicesUseCase {
        repo: state.service_repo(),
    };
    let services = usecase.available(query.into(), today()).await?;
    Ok(Reply::list(services.into_iter().map(ServiceResponse::from).collect()))
}

// ── GET /api/services/{id} ───────────────────────────────────────────────────

pub async fn get_service(
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<ServiceResponse>, ApiError> {
    let usecase = GetServiceUseCase {
        repo: state.service_repo(),
    };
    Ok(Reply::ok(usecase.execute(path.id).await?.into()))
}

// ── POST /api/services ───────────────────────────────────────────────────────

pub async fn create_service(
    principal: Principal,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ServiceRequest>,
) -> Result<Reply<ServiceResponse>, ApiError> {
    let usecase = CreateServiceUseCase {
        repo: state.service_repo(),
        directory: state.directory(),
    };
    let service = usecase.execute(&principal, body.into()).await?;
    Ok(Reply::created(service.into()))
}

// ── PUT /api/services/{id} ───────────────────────────────────────────────────

pub async fn update_service(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
    JsonBody(body): JsonBody<ServiceRequest>,
) -> Result<Reply<ServiceResponse>, ApiError> {
    let usecase = UpdateServiceUseCase {
        repo: state.service_repo(),
        directory: state.directory(),
    };
    let service = usecase.execute(&principal, path.id, body.into()).await?;
    Ok(Reply::ok(service.into()))
}

// ── DELETE /api/services/{id} ────────────────────────────────────────────────

pub async fn delete_service(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<()>, ApiError> {
    let usecase = DeleteServiceUseCase {
        repo: state.service_repo(),
    };
    usecase.execute(&principal, path.id).await?;
    Ok(Reply::message("service deleted"))
}

// ── GET /api/services/{id}/patients ──────────────────────────────────────────

pub async fn list_payers(
    _principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<Vec<LinkedResponse<PatientResponse>>>, ApiError> {
    let lookup = state.patient_repo();
    list_linked(&state, lookup, Side::Right, LinkKind::Pays, path.id).await
}
