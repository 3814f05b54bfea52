use cisne_auth_types::principal::Principal;
use cisne_domain::entity::EntityKind;
use cisne_domain::id::EntityId;
use cisne_domain::role::Role;

use crate::domain::policy::{Action, authorize, authorize_role};
use crate::domain::repository::{AccountRepository, EntityDirectory, PatientRepository};
use crate::domain::types::{
    NewPatient, Patient, PatientFilter, PatientPatch, non_blank, normalize_natural_key,
};
use crate::error::ApiError;
use crate::usecase::required;
use crate::usecase::therapist::{ensure_nif_free, name_patch, person_name};

// ── Inputs ───────────────────────────────────────────────────────────────────

/// Patient fields as received. Name handling matches
/// [`TherapistInput`](crate::usecase::therapist::TherapistInput).
#[derive(Debug, Default)]
pub struct PatientInput {
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nif: Option<String>,
    pub diagnosis: Option<String>,
}

impl PatientInput {
    pub fn validate(self) -> Result<NewPatient, ApiError> {
        let (first_name, last_name) = person_name(self.name, self.first_name, self.last_name)?;
        Ok(NewPatient {
            first_name,
            last_name,
            nif: normalize_natural_key(&required(self.nif, "nif")?),
            diagnosis: non_blank(self.diagnosis),
        })
    }

    pub fn into_patch(self) -> Result<PatientPatch, ApiError> {
        let (first_name, last_name) = name_patch(self.name, self.first_name, self.last_name);
        let nif = match self.nif {
            Some(nif) => Some(normalize_natural_key(&required(Some(nif), "nif")?)),
            None => None,
        };
        Ok(PatientPatch {
            first_name,
            last_name,
            nif,
            diagnosis: non_blank(self.diagnosis),
        })
    }
}

// ── ListPatients ─────────────────────────────────────────────────────────────

pub struct ListPatientsUseCase<R: PatientRepository> {
    pub repo: R,
}

impl<R: PatientRepository> ListPatientsUseCase<R> {
    pub async fn execute(&self, filter: &PatientFilter) -> Result<Vec<Patient>, ApiError> {
        self.repo.list(filter).await
    }
}

// ── GetPatient ───────────────────────────────────────────────────────────────

pub struct GetPatientUseCase<R: PatientRepository> {
    pub repo: R,
}

impl<R: PatientRepository> GetPatientUseCase<R> {
    pub async fn execute(&self, id: EntityId) -> Result<Patient, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(EntityKind::Patient))
    }
}

// ── CreatePatient (admin provisioning for an existing user) ──────────────────

pub struct CreatePatientUseCase<R: PatientRepository, A: AccountRepository, D: EntityDirectory> {
    pub repo: R,
    pub accounts: A,
    pub directory: D,
}

impl<R: PatientRepository, A: AccountRepository, D: EntityDirectory>
    CreatePatientUseCase<R, A, D>
{
    pub async fn execute(
        &self,
        principal: &Principal,
        user_id: EntityId,
        input: PatientInput,
    ) -> Result<Patient, ApiError> {
        authorize_role(principal, Action::ManageUsers).into_result()?;
        let patient = input.validate()?;

        let user = self
            .accounts
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::NotFound(EntityKind::User))?;
        if user.role != Role::Patient {
            return Err(ApiError::ProfileRoleMismatch(EntityKind::Patient));
        }
        if self.directory.profile_kind(user_id).await?.is_some() {
            return Err(ApiError::ProfileExists);
        }
        ensure_nif_free(&self.directory, &patient.nif, None).await?;
        self.repo.create(user_id, &patient).await
    }
}

// ── UpdatePatient ────────────────────────────────────────────────────────────

pub struct UpdatePatientUseCase<R: PatientRepository, D: EntityDirectory> {
    pub repo: R,
    pub directory: D,
}

impl<R: PatientRepository, D: EntityDirectory> UpdatePatientUseCase<R, D> {
    pub async fn execute(
        &self,
        principal: &Principal,
        id: EntityId,
        input: PatientInput,
    ) -> Result<Patient, ApiError> {
        let patch = input.into_patch()?;
        if patch.is_empty() {
            return Err(ApiError::EmptyUpdate);
        }
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(EntityKind::Patient))?;
        authorize(principal, Action::ManagePatient, Some(existing.user_id)).into_result()?;

        if let Some(nif) = &patch.nif {
            ensure_nif_free(&self.directory, nif, Some(id)).await?;
        }
        self.repo.update(id, &patch).await
    }
}

// ── DeletePatient ────────────────────────────────────────────────────────────

pub struct DeletePatientUseCase<R: PatientRepository> {
    pub repo: R,
}

impl<R: PatientRepository> DeletePatientUseCase<R> {
    pub async fn execute(&self, principal: &Principal, id: EntityId) -> Result<(), ApiError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(EntityKind::Patient))?;
        authorize(principal, Action::ManagePatient, Some(existing.user_id)).into_result()?;
        if !self.repo.delete(id).await? {
            return Err(ApiError::NotFound(EntityKind::Patient));
        }
        Ok(())
    }
}
