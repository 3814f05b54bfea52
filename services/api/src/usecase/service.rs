use chrono::NaiveDate;

use cisne_auth_types::principal::Principal;
use cisne_domain::entity::EntityKind;
use cisne_domain::id::EntityId;

use crate::domain::policy::{Action, authorize_role};
use crate::domain::repository::{EntityDirectory, ServiceRepository};
use crate::domain::types::{NewService, Service, ServiceFilter, ServicePatch, non_blank};
use crate::error::ApiError;
use crate::usecase::{ensure_exists, non_negative, ordered, required};

// ── Inputs ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct ServiceInput {
    pub invoice_id: Option<EntityId>,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub tools: Option<String>,
    pub room: Option<String>,
    pub date: Option<NaiveDate>,
}

impl ServiceInput {
    pub fn validate(self) -> Result<NewService, ApiError> {
        Ok(NewService {
            invoice_id: self.invoice_id,
            name: required(self.name, "name")?,
            price: non_negative(self.price, "price")?,
            tools: non_blank(self.tools),
            room: non_blank(self.room),
            date: self.date,
        })
    }

    pub fn into_patch(self) -> Result<ServicePatch, ApiError> {
        let name = match self.name {
            Some(name) => Some(required(Some(name), "name")?),
            None => None,
        };
        Ok(ServicePatch {
            invoice_id: self.invoice_id,
            name,
            price: non_negative(self.price, "price")?,
            tools: non_blank(self.tools),
            room: non_blank(self.room),
            date: self.date,
        })
    }
}

// ── ListServices ─────────────────────────────────────────────────────────────

pub struct ListServicesUseCase<R: ServiceRepository> {
    pub repo: R,
}

impl<R: ServiceRepository> ListServicesUseCase<R> {
    pub async fn execute(&self, filter: &ServiceFilter) -> Result<Vec<Service>, ApiError> {
        ordered(filter.min_price, filter.max_price, "min_price > max_price")?;
        ordered(filter.from, filter.to, "from > to")?;
        self.repo.list(filter).await
    }

    /// Services dated today or later, plus undated ones.
    pub async fn available(
        &self,
        mut filter: ServiceFilter,
        today: NaiveDate,
    ) -> Result<Vec<Service>, ApiError> {
        filter.available_from = Some(today);
        self.execute(&filter).await
    }
}

// ── GetService ───────────────────────────────────────────────────────────────

pub struct GetServiceUseCase<R: ServiceRepository> {
    pub repo: R,
}

impl<R: ServiceRepository> GetServiceUseCase<R> {
    pub async fn execute(&self, id: EntityId) -> Result<Service, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(EntityKind::Service))
    }
}

// ── CreateService ────────────────────────────────────────────────────────────

pub struct CreateServiceUseCase<R: ServiceRepository, D: EntityDirectory> {
    pub repo: R,
    pub directory: D,
}

impl<R: ServiceRepository, D: EntityDirectory> CreateServiceUseCase<R, D> {
    pub async fn execute(
        &self,
        principal: &Principal,
        input: ServiceInput,
    ) -> Result<Service, ApiError> {
        authorize_role(principal, Action::ManageCatalog).into_result()?;
        let service = input.validate()?;
        if let Some(invoice_id) = service.invoice_id {
            ensure_exists(&self.directory, EntityKind::Invoice, invoice_id).await?;
        }
        self.repo.create(&service).await
    }
}

// ── UpdateService ────────────────────────────────────────────────────────────

pub struct UpdateServiceUseCase<R: ServiceRepository, D: EntityDirectory> {
    pub repo: R,
    pub directory: D,
}

impl<R: ServiceRepository, D: EntityDirectory> UpdateServiceUseCase<R, D> {
    pub async fn execute(
        &self,
        principal: &Principal,
        id: EntityId,
        input: ServiceInput,
    ) -> Result<Service, ApiError> {
        authorize_role(principal, Action::ManageCatalog).into_result()?;
        let patch = input.into_patch()?;
        if patch.is_empty() {
            return Err(ApiError::EmptyUpdate);
        }
        if let Some(invoice_id) = patch.invoice_id {
            ensure_exists(&self.directory, EntityKind::Invoice, invoice_id).await?;
        }
        self.repo.update(id, &patch).await
    }
}

// ── DeleteService ────────────────────────────────────────────────────────────

pub struct DeleteServiceUseCase<R: ServiceRepository> {
    pub repo: R,
}

impl<R: ServiceRepository> DeleteServiceUseCase<R> {
    pub async fn execute(&self, principal: &Principal, id: EntityId) -> Result<(), ApiError> {
        authorize_role(principal, Action::ManageCatalog).into_result()?;
        if !self.repo.delete(id).await? {
            return Err(ApiError::NotFound(EntityKind::Service));
        }
        Ok(())
    }
}
