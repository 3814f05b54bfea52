use cisne_auth_types::principal::Principal;
use cisne_domain::entity::EntityKind;
use cisne_domain::id::EntityId;
use cisne_domain::role::Role;

use crate::domain::policy::{Action, authorize, authorize_role};
use crate::domain::repository::{AccountRepository, EntityDirectory, TherapistRepository};
use crate::domain::types::{
    LAST_NAME_PLACEHOLDER, NewTherapist, PersonName, Therapist, TherapistFilter, TherapistPatch,
    non_blank, normalize_natural_key,
};
use crate::error::ApiError;
use crate::usecase::required;

// ── Inputs ───────────────────────────────────────────────────────────────────

/// Therapist fields as received. `name` is a display name split into first
/// and last name; explicit `first_name`/`last_name` take precedence.
#[derive(Debug, Default)]
pub struct TherapistInput {
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nif: Option<String>,
    pub society_id: Option<String>,
    pub profession: Option<String>,
}

impl TherapistInput {
    pub fn validate(self) -> Result<NewTherapist, ApiError> {
        let (first_name, last_name) = person_name(self.name, self.first_name, self.last_name)?;
        Ok(NewTherapist {
            first_name,
            last_name,
            nif: normalize_natural_key(&required(self.nif, "nif")?),
            society_id: non_blank(self.society_id),
            profession: non_blank(self.profession),
        })
    }

    pub fn into_patch(self) -> Result<TherapistPatch, ApiError> {
        let (first_name, last_name) = name_patch(self.name, self.first_name, self.last_name);
        let nif = match self.nif {
            Some(nif) => Some(normalize_natural_key(&required(Some(nif), "nif")?)),
            None => None,
        };
        Ok(TherapistPatch {
            first_name,
            last_name,
            nif,
            society_id: non_blank(self.society_id),
            profession: non_blank(self.profession),
        })
    }
}

/// First and last name for a new natural-person profile.
pub(crate) fn person_name(
    name: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
) -> Result<(String, String), ApiError> {
    if let Some(first) = non_blank(first_name) {
        let last = non_blank(last_name).unwrap_or_else(|| LAST_NAME_PLACEHOLDER.to_owned());
        return Ok((first, last));
    }
    let split = name
        .as_deref()
        .and_then(PersonName::split)
        .ok_or(ApiError::MissingField("name"))?;
    Ok((split.first, split.last))
}

/// Name fields of a partial update. A display name overrides both parts.
pub(crate) fn name_patch(
    name: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
) -> (Option<String>, Option<String>) {
    match name.as_deref().and_then(PersonName::split) {
        Some(split) => (Some(split.first), Some(split.last)),
        None => (non_blank(first_name), non_blank(last_name)),
    }
}

/// Reject a NIF already used by any natural person other than `except`.
pub(crate) async fn ensure_nif_free<D: EntityDirectory>(
    directory: &D,
    nif: &str,
    except: Option<EntityId>,
) -> Result<(), ApiError> {
    match directory.nif_holder(nif, except).await? {
        Some(EntityKind::Therapist) => Err(ApiError::NifTakenByTherapist),
        Some(_) => Err(ApiError::NifTakenByPatient),
        None => Ok(()),
    }
}

// ── ListTherapists ───────────────────────────────────────────────────────────

pub struct ListTherapistsUseCase<R: TherapistRepository> {
    pub repo: R,
}

impl<R: TherapistRepository> ListTherapistsUseCase<R> {
    pub async fn execute(&self, filter: &TherapistFilter) -> Result<Vec<Therapist>, ApiError> {
        self.repo.list(filter).await
    }
}

// ── GetTherapist ─────────────────────────────────────────────────────────────

pub struct GetTherapistUseCase<R: TherapistRepository> {
    pub repo: R,
}

impl<R: TherapistRepository> GetTherapistUseCase<R> {
    pub async fn execute(&self, id: EntityId) -> Result<Therapist, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(EntityKind::Therapist))
    }
}

// ── CreateTherapist (admin provisioning for an existing user) ────────────────

pub struct CreateTherapistUseCase<R: TherapistRepository, A: AccountRepository, D: EntityDirectory>
{
    pub repo: R,
    pub accounts: A,
    pub directory: D,
}

impl<R: TherapistRepository, A: AccountRepository, D: EntityDirectory>
    CreateTherapistUseCase<R, A, D>
{
    pub async fn execute(
        &self,
        principal: &Principal,
        user_id: EntityId,
        input: TherapistInput,
    ) -> Result<Therapist, ApiError> {
        authorize_role(principal, Action::ManageUsers).into_result()?;
        let therapist = input.validate()?;

        let user = self
            .accounts
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::NotFound(EntityKind::User))?;
        if user.role != Role::Therapist {
            return Err(ApiError::ProfileRoleMismatch(EntityKind::Therapist));
        }
        if self.directory.profile_kind(user_id).await?.is_some() {
            return Err(ApiError::ProfileExists);
        }
        ensure_nif_free(&self.directory, &therapist.nif, None).await?;
        self.repo.create(user_id, &therapist).await
    }
}

// ── UpdateTherapist ──────────────────────────────────────────────────────────

pub struct UpdateTherapistUseCase<R: TherapistRepository, D: EntityDirectory> {
    pub repo: R,
    pub directory: D,
}

impl<R: TherapistRepository, D: EntityDirectory> UpdateTherapistUseCase<R, D> {
    pub async fn execute(
        &self,
        principal: &Principal,
        id: EntityId,
        input: TherapistInput,
    ) -> Result<Therapist, ApiError> {
        let patch = input.into_patch()?;
        if patch.is_empty() {
            return Err(ApiError::EmptyUpdate);
        }
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(EntityKind::Therapist))?;
        authorize(principal, Action::ManageTherapist, Some(existing.user_id)).into_result()?;

        if let Some(nif) = &patch.nif {
            ensure_nif_free(&self.directory, nif, Some(id)).await?;
        }
        self.repo.update(id, &patch).await
    }
}

// ── DeleteTherapist ──────────────────────────────────────────────────────────

pub struct DeleteTherapistUseCase<R: TherapistRepository> {
    pub repo: R,
}

impl<R: TherapistRepository> DeleteTherapistUseCase<R> {
    pub async fn execute(&self, principal: &Principal, id: EntityId) -> Result<(), ApiError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(EntityKind::Therapist))?;
        authorize(principal, Action::ManageTherapist, Some(existing.user_id)).into_result()?;
        if !self.repo.delete(id).await? {
            return Err(ApiError::NotFound(EntityKind::Therapist));
        }
        Ok(())
    }
}
