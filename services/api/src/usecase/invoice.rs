//! Invoices are back-office rows; every operation is ADMIN-only.

use chrono::NaiveDate;

use cisne_auth_types::principal::Principal;
use cisne_domain::entity::EntityKind;
use cisne_domain::id::EntityId;

use crate::domain::policy::{Action, authorize_role};
use crate::domain::repository::InvoiceRepository;
use crate::domain::types::{
    Invoice, InvoiceFilter, InvoiceKind, InvoicePatch, NewInvoice, PENDING_PAYMENT, non_blank,
};
use crate::error::ApiError;
use crate::usecase::{non_negative, ordered, required};

// ── Inputs ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InvoiceInput {
    pub number: Option<String>,
    pub date: Option<NaiveDate>,
    pub tax_amount: Option<f64>,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
}

impl InvoiceInput {
    /// New invoices without a payment status start out pending.
    pub fn validate(self) -> Result<NewInvoice, ApiError> {
        Ok(NewInvoice {
            number: required(self.number, "number")?,
            date: self.date.ok_or(ApiError::MissingField("date"))?,
            tax_amount: non_negative(self.tax_amount, "tax_amount")?,
            payment_method: non_blank(self.payment_method),
            payment_status: Some(
                non_blank(self.payment_status).unwrap_or_else(|| PENDING_PAYMENT.to_owned()),
            ),
        })
    }

    pub fn into_patch(self) -> Result<InvoicePatch, ApiError> {
        let number = match self.number {
            Some(number) => Some(required(Some(number), "number")?),
            None => None,
        };
        Ok(InvoicePatch {
            number,
            date: self.date,
            tax_amount: non_negative(self.tax_amount, "tax_amount")?,
            payment_method: non_blank(self.payment_method),
            payment_status: non_blank(self.payment_status),
        })
    }
}

// ── ListInvoices ─────────────────────────────────────────────────────────────

pub struct ListInvoicesUseCase<R: InvoiceRepository> {
    pub repo: R,
}

impl<R: InvoiceRepository> ListInvoicesUseCase<R> {
    pub async fn execute(
        &self,
        principal: &Principal,
        filter: &InvoiceFilter,
    ) -> Result<Vec<Invoice>, ApiError> {
        authorize_role(principal, Action::ManageCatalog).into_result()?;
        ordered(filter.from, filter.to, "from > to")?;
        self.repo.list(filter).await
    }

    /// Invoices whose payment status is still pending.
    pub async fn pending(
        &self,
        principal: &Principal,
        mut filter: InvoiceFilter,
    ) -> Result<Vec<Invoice>, ApiError> {
        filter.payment_status = Some(PENDING_PAYMENT.to_owned());
        self.execute(principal, &filter).await
    }
}

// ── GetInvoice ───────────────────────────────────────────────────────────────

pub struct GetInvoiceUseCase<R: InvoiceRepository> {
    pub repo: R,
}

impl<R: InvoiceRepository> GetInvoiceUseCase<R> {
    pub async fn execute(&self, principal: &Principal, id: EntityId) -> Result<Invoice, ApiError> {
        authorize_role(principal, Action::ManageCatalog).into_result()?;
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(EntityKind::Invoice))
    }
}

// ── CreateInvoice ────────────────────────────────────────────────────────────

pub struct CreateInvoiceUseCase<R: InvoiceRepository> {
    pub repo: R,
}

impl<R: InvoiceRepository> CreateInvoiceUseCase<R> {
    /// `kind` also registers the invoice in the service or course sub-table.
    pub async fn execute(
        &self,
        principal: &Principal,
        input: InvoiceInput,
        kind: Option<InvoiceKind>,
    ) -> Result<Invoice, ApiError> {
        authorize_role(principal, Action::ManageCatalog).into_result()?;
        let invoice = input.validate()?;
        let created = self.repo.create(&invoice, kind).await?;
        tracing::info!(invoice_id = %created.id, number = %created.number, "invoice created");
        Ok(created)
    }
}

// ── UpdateInvoice ────────────────────────────────────────────────────────────

pub struct UpdateInvoiceUseCase<R: InvoiceRepository> {
    pub repo: R,
}

impl<R: InvoiceRepository> UpdateInvoiceUseCase<R> {
    pub async fn execute(
        &self,
        principal: &Principal,
        id: EntityId,
        input: InvoiceInput,
    ) -> Result<Invoice, ApiError> {
        authorize_role(principal, Action::ManageCatalog).into_result()?;
        let patch = input.into_patch()?;
        if patch.is_empty() {
            return Err(ApiError::EmptyUpdate);
        }
        self.repo.update(id, &patch).await
    }

    pub async fn set_payment_status(
        &self,
        principal: &Principal,
        id: EntityId,
        status: Option<String>,
    ) -> Result<Invoice, ApiError> {
        authorize_role(principal, Action::ManageCatalog).into_result()?;
        let input = InvoiceInput {
            payment_status: Some(required(status, "payment_status")?),
            ..Default::default()
        };
        self.execute(principal, id, input).await
    }
}

// ── DeleteInvoice ────────────────────────────────────────────────────────────

pub struct DeleteInvoiceUseCase<R: InvoiceRepository> {
    pub repo: R,
}

impl<R: InvoiceRepository> DeleteInvoiceUseCase<R> {
    pub async fn execute(&self, principal: &Principal, id: EntityId) -> Result<(), ApiError> {
        authorize_role(principal, Action::ManageCatalog).into_result()?;
        if !self.repo.delete(id).await? {
            return Err(ApiError::NotFound(EntityKind::Invoice));
        }
        Ok(())
    }
}
