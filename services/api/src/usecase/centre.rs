use cisne_auth_types::principal::Principal;
use cisne_domain::entity::EntityKind;
use cisne_domain::id::EntityId;
use cisne_domain::role::Role;

use crate::domain::policy::{Action, authorize, authorize_role};
use crate::domain::repository::{AccountRepository, CentreRepository, EntityDirectory};
use crate::domain::types::{
    Centre, CentreFilter, CentrePatch, NewCentre, non_blank, normalize_natural_key,
};
use crate::error::ApiError;
use crate::usecase::{ensure_exists, required};

// ── Inputs ───────────────────────────────────────────────────────────────────

/// Centre fields as received, before validation.
#[derive(Debug, Default)]
pub struct CentreInput {
    pub cif: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub service_id: Option<EntityId>,
}

impl CentreInput {
    pub fn validate(self) -> Result<NewCentre, ApiError> {
        Ok(NewCentre {
            cif: normalize_natural_key(&required(self.cif, "cif")?),
            name: required(self.name, "name")?,
            location: Some(required(self.location, "location")?),
            service_id: self.service_id,
        })
    }

    /// Partial update: absent fields are left alone, blank required fields are rejected.
    pub fn into_patch(self) -> Result<CentrePatch, ApiError> {
        let cif = match self.cif {
            Some(cif) => Some(normalize_natural_key(&required(Some(cif), "cif")?)),
            None => None,
        };
        let name = match self.name {
            Some(name) => Some(required(Some(name), "name")?),
            None => None,
        };
        Ok(CentrePatch {
            cif,
            name,
            location: non_blank(self.location),
            service_id: self.service_id,
        })
    }
}

// ── ListCentres ──────────────────────────────────────────────────────────────

pub struct ListCentresUseCase<R: CentreRepository> {
    pub repo: R,
}

impl<R: CentreRepository> ListCentresUseCase<R> {
    pub async fn execute(&self, filter: &CentreFilter) -> Result<Vec<Centre>, ApiError> {
        self.repo.list(filter).await
    }
}

// ── GetCentre ────────────────────────────────────────────────────────────────

pub struct GetCentreUseCase<R: CentreRepository> {
    pub repo: R,
}

impl<R: CentreRepository> GetCentreUseCase<R> {
    pub async fn execute(&self, id: EntityId) -> Result<Centre, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(EntityKind::Centre))
    }
}

// ── CreateCentre (admin provisioning for an existing user) ───────────────────

pub struct CreateCentreUseCase<R: CentreRepository, A: AccountRepository, D: EntityDirectory> {
    pub repo: R,
    pub accounts: A,
    pub directory: D,
}

impl<R: CentreRepository, A: AccountRepository, D: EntityDirectory> CreateCentreUseCase<R, A, D> {
    pub async fn execute(
        &self,
        principal: &Principal,
        user_id: EntityId,
        input: CentreInput,
    ) -> Result<Centre, ApiError> {
        authorize_role(principal, Action::ManageUsers).into_result()?;
        let centre = input.validate()?;

        let user = self
            .accounts
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::NotFound(EntityKind::User))?;
        if user.role != Role::Centre {
            return Err(ApiError::ProfileRoleMismatch(EntityKind::Centre));
        }
        if self.directory.profile_kind(user_id).await?.is_some() {
            return Err(ApiError::ProfileExists);
        }
        if self.directory.cif_taken(&centre.cif, None).await? {
            return Err(ApiError::CifTaken);
        }
        if let Some(service_id) = centre.service_id {
            ensure_exists(&self.directory, EntityKind::Service, service_id).await?;
        }
        self.repo.create(user_id, &centre).await
    }
}

// ── UpdateCentre ─────────────────────────────────────────────────────────────

pub struct UpdateCentreUseCase<R: CentreRepository, D: EntityDirectory> {
    pub repo: R,
    pub directory: D,
}

impl<R: CentreRepository, D: EntityDirectory> UpdateCentreUseCase<R, D> {
    pub async fn execute(
        &self,
        principal: &Principal,
        id: EntityId,
        input: CentreInput,
    ) -> Result<Centre, ApiError> {
        let patch = input.into_patch()?;
        if patch.is_empty() {
            return Err(ApiError::EmptyUpdate);
        }
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(EntityKind::Centre))?;
        authorize(principal, Action::ManageCentre, Some(existing.user_id)).into_result()?;

        if let Some(cif) = &patch.cif {
            if self.directory.cif_taken(cif, Some(id)).await? {
                return Err(ApiError::CifTaken);
            }
        }
        if let Some(service_id) = patch.service_id {
            ensure_exists(&self.directory, EntityKind::Service, service_id).await?;
        }
        self.repo.update(id, &patch).await
    }
}

// ── DeleteCentre ─────────────────────────────────────────────────────────────

pub struct DeleteCentreUseCase<R: CentreRepository> {
    pub repo: R,
}

impl<R: CentreRepository> DeleteCentreUseCase<R> {
    pub async fn execute(&self, principal: &Principal, id: EntityId) -> Result<(), ApiError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(EntityKind::Centre))?;
        authorize(principal, Action::ManageCentre, Some(existing.user_id)).into_result()?;
        if !self.repo.delete(id).await? {
            return Err(ApiError::NotFound(EntityKind::Centre));
        }
        Ok(())
    }
}
