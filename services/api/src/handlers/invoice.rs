use axum::extract::State;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use cisne_auth_types::principal::Principal;
use cisne_core::envelope::Reply;
use cisne_core::extract::{JsonBody, PathParams, QueryString};
use cisne_domain::id::EntityId;

use crate::domain::types::{Invoice, InvoiceFilter, InvoiceKind};
use crate::error::ApiError;
use crate::handlers::IdPath;
use crate::state::AppState;
use crate::usecase::invoice::{
    CreateInvoiceUseCase, DeleteInvoiceUseCase, GetInvoiceUseCase, InvoiceInput,
    ListInvoicesUseCase, UpdateInvoiceUseCase,
};

fn kind_name(kind: InvoiceKind) -> &'static str {
    match kind {
        InvoiceKind::Service => "service",
        InvoiceKind::Course => "course",
    }
}

#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub id: EntityId,
    pub kind: Option<&'static str>,
    pub number: String,
    pub invoice_date: NaiveDate,
    pub tax_amount: Option<f64>,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
}

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: invoice.id,
            kind: invoice.kind.map(kind_name),
            number: invoice.number,
            invoice_date: invoice.date,
            tax_amount: invoice.tax_amount,
            payment_method: invoice.payment_method,
            payment_status: invoice.payment_status,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct InvoiceRequest {
    pub number: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub tax_amount: Option<f64>,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
}

impl From<InvoiceRequest> for InvoiceInput {
    fn from(body: InvoiceRequest) -> Self {
        Self {
            number: body.number,
            date: body.invoice_date,
            tax_amount: body.tax_amount,
            payment_method: body.payment_method,
            payment_status: body.payment_status,
        }
    }
}

// ── GET /api/invoices and /api/invoices/pending ──────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct InvoiceQuery {
    /// `service` or `course`.
    pub kind: Option<String>,
    pub payment_status: Option<String>,
    pub payment_method: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl InvoiceQuery {
    fn into_filter(self) -> InvoiceFilter {
        let kind = match self.kind.as_deref().map(str::trim) {
            Some(k) if k.eq_ignore_ascii_case("service") => Some(InvoiceKind::Service),
            Some(k) if k.eq_ignore_ascii_case("course") => Some(InvoiceKind::Course),
            _ => None,
        };
        InvoiceFilter {
            kind,
            payment_status: self.payment_status,
            payment_method: self.payment_method,
            from: self.from,
            to: self.to,
        }
    }
}

pub async fn list_invoices(
    principal: Principal,
    State(state): State<AppState>,
    QueryString(query): QueryString<InvoiceQuery>,
) -> Result<Reply<Vec<InvoiceResponse>>, ApiError> {
    let usecase = ListInvoicesUseCase {
        repo: state.invoice_repo(),
    };
    let invoices = usecase.execute(&principal, &query.into_filter()).await?;
    Ok(Reply::list(invoices.into_iter().map(InvoiceResponse::from).collect()))
}

pub async fn list_pending_invoices(
    principal: Principal,
    State(state): State<AppState>,
    QueryString(query): QueryString<InvoiceQuery>,
) -> Result<Reply<Vec<InvoiceResponse>>, ApiError> {
    let usecase = ListInvoicesUseCase {
        repo: state.invoice_repo(),
    };
    let invoices = usecase.pending(&principal, query.into_filter()).await?;
    Ok(Reply::list(invoices.into_iter().map(InvoiceResponse::from).collect()))
}

// ── GET /api/invoices/{id} ───────────────────────────────────────────────────

pub async fn get_invoice(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<InvoiceResponse>, ApiError> {
    let usecase = GetInvoiceUseCase {
        repo: state.invoice_repo(),
    };
    Ok(Reply::ok(usecase.execute(&principal, path.id).await?.into()))
}

// ── POST /api/invoices, /api/invoices/services, /api/invoices/courses ────────

async fn create(
    state: &AppState,
    principal: &Principal,
    body: InvoiceRequest,
    kind: Option<InvoiceKind>,
) -> Result<Reply<InvoiceResponse>, ApiError> {
    let usecase = CreateInvoiceUseCase {
        repo: state.invoice_repo(),
    };
    let invoice = usecase.execute(principal, body.into(), kind).await?;
    Ok(Reply::created(invoice.into()))
}

pub async fn create_invoice(
    principal: Principal,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<InvoiceRequest>,
) -> Result<Reply<InvoiceResponse>, ApiError> {
    create(&state, &principal, body, None).await
}

pub async fn create_service_invoice(
    principal: Principal,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<InvoiceRequest>,
) -> Result<Reply<InvoiceResponse>, ApiError> {
    create(&state, &principal, body, Some(InvoiceKind::Service)).await
}

pub async fn create_course_invoice(
    principal: Principal,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<InvoiceRequest>,
) -> Result<Reply<InvoiceResponse>, ApiError> {
    create(&state, &principal, body, Some(InvoiceKind::Course)).await
}

// ── PUT /api/invoices/{id} ───────────────────────────────────────────────────

pub async fn update_invoice(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
    JsonBody(body): JsonBody<InvoiceRequest>,
) -> Result<Reply<InvoiceResponse>, ApiError> {
    let usecase = UpdateInvoiceUseCase {
        repo: state.invoice_repo(),
    };
    let invoice = usecase.execute(&principal, path.id, body.into()).await?;
    Ok(Reply::ok(invoice.into()))
}

// ── PATCH /api/invoices/{id}/payment-status ──────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PaymentStatusRequest {
    pub payment_status: Option<String>,
}

pub async fn set_payment_status(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
    JsonBody(body): JsonBody<PaymentStatusRequest>,
) -> Result<Reply<InvoiceResponse>, ApiError> {
    let usecase = UpdateInvoiceUseCase {
        repo: state.invoice_repo(),
    };
    let invoice = usecase
        .set_payment_status(&principal, path.id, body.payment_status)
        .await?;
    Ok(Reply::ok(invoice.into()))
}

// ── DELETE /api/invoices/{id} ────────────────────────────────────────────────

pub async fn delete_invoice(
    principal: Principal,
    State(state): State<AppState>,
    PathParams(path): PathParams<IdPath>,
) -> Result<Reply<()>, ApiError> {
    let usecase = DeleteInvoiceUseCase {
        repo: state.invoice_repo(),
    };
    usecase.execute(&principal, path.id).await?;
    Ok(Reply::message("invoice deleted"))
}
