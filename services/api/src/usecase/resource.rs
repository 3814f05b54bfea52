use chrono::NaiveDate;

use cisne_auth_types::principal::Principal;
use cisne_domain::entity::EntityKind;
use cisne_domain::id::EntityId;
use cisne_domain::link::{LinkKey, LinkKind};
use cisne_domain::role::Role;

use crate::domain::policy::{Action, authorize, authorize_role};
use crate::domain::repository::{
    BatchLookup, EntityDirectory, LinkRepository, ResourceRepository,
};
use crate::domain::types::{NewResource, Resource, ResourceFilter, ResourcePatch, non_blank};
use crate::error::ApiError;
use crate::usecase::link::{owner_via, rights_of};
use crate::usecase::{ensure_exists, required};

/// Entries returned by the popularity ranking.
pub const POPULAR_LIMIT: u64 = 10;

// ── Inputs ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct ResourceInput {
    pub name: Option<String>,
    pub resource_type: Option<String>,
    pub description: Option<String>,
}

impl ResourceInput {
    pub fn validate(self) -> Result<NewResource, ApiError> {
        Ok(NewResource {
            name: required(self.name, "name")?,
            resource_type: non_blank(self.resource_type),
            description: non_blank(self.description),
        })
    }

    pub fn into_patch(self) -> Result<ResourcePatch, ApiError> {
        let name = match self.name {
            Some(name) => Some(required(Some(name), "name")?),
            None => None,
        };
        Ok(ResourcePatch {
            name,
            resource_type: non_blank(self.resource_type),
            description: non_blank(self.description),
        })
    }
}

// ── ListResources ────────────────────────────────────────────────────────────

pub struct ListResourcesUseCase<R: ResourceRepository> {
    pub repo: R,
}

impl<R: ResourceRepository> ListResourcesUseCase<R> {
    pub async fn execute(&self, filter: &ResourceFilter) -> Result<Vec<Resource>, ApiError> {
        self.repo.list(filter).await
    }
}

// ── GetResource ──────────────────────────────────────────────────────────────

pub struct GetResourceUseCase<R: ResourceRepository> {
    pub repo: R,
}

impl<R: ResourceRepository> GetResourceUseCase<R> {
    pub async fn execute(&self, id: EntityId) -> Result<Resource, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(EntityKind::Resource))
    }
}

// ── CreateResource ───────────────────────────────────────────────────────────

pub struct CreateResourceUseCase<R: ResourceRepository, D: EntityDirectory> {
    pub repo: R,
    pub directory: D,
}

impl<R: ResourceRepository, D: EntityDirectory> CreateResourceUseCase<R, D> {
    /// A THERAPIST publishes what it creates; ADMIN may name the publisher.
    pub async fn execute(
        &self,
        principal: &Principal,
        input: ResourceInput,
        therapist_id: Option<EntityId>,
        today: NaiveDate,
    ) -> Result<Resource, ApiError> {
        authorize_role(principal, Action::ManageResource).into_result()?;
        let resource = input.validate()?;

        let publisher = match principal.role {
            Role::Therapist => Some(principal.id),
            _ => therapist_id,
        };
        if let Some(therapist) = publisher {
            ensure_exists(&self.directory, EntityKind::Therapist, therapist).await?;
        }

        let created = self
            .repo
            .create(&resource, publisher.map(|therapist| (therapist, today)))
            .await?;
        tracing::info!(resource_id = %created.id, published_by = ?publisher, "resource created");
        Ok(created)
    }
}

// ── UpdateResource ───────────────────────────────────────────────────────────

pub struct UpdateResourceUseCase<R: ResourceRepository, L: LinkRepository> {
    pub repo: R,
    pub links: L,
}

impl<R: ResourceRepository, L: LinkRepository> UpdateResourceUseCase<R, L> {
    /// Only a therapist with a `publish` row on the resource may edit it.
    pub async fn execute(
        &self,
        principal: &Principal,
        id: EntityId,
        input: ResourceInput,
    ) -> Result<Resource, ApiError> {
        let patch = input.into_patch()?;
        if patch.is_empty() {
            return Err(ApiError::EmptyUpdate);
        }
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(ApiError::NotFound(EntityKind::Resource));
        }
        let owner = owner_via(&self.links, LinkKind::Publish, id, principal).await?;
        authorize(principal, Action::ManageResource, owner).into_result()?;
        self.repo.update(id, &patch).await
    }
}

// ── DeleteResource ───────────────────────────────────────────────────────────

pub struct DeleteResourceUseCase<R: ResourceRepository, L: LinkRepository> {
    pub repo: R,
    pub links: L,
}

impl<R: ResourceRepository, L: LinkRepository> DeleteResourceUseCase<R, L> {
    pub async fn execute(&self, principal: &Principal, id: EntityId) -> Result<(), ApiError> {
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(ApiError::NotFound(EntityKind::Resource));
        }
        let owner = owner_via(&self.links, LinkKind::Publish, id, principal).await?;
        authorize(principal, Action::ManageResource, owner).into_result()?;

        let unlink = if principal.is_admin() {
            None
        } else {
            Some(LinkKey::new(LinkKind::Publish, principal.id, id))
        };
        if !self.repo.delete(id, unlink).await? {
            return Err(ApiError::NotFound(EntityKind::Resource));
        }
        tracing::info!(resource_id = %id, actor = %principal.id, "resource deleted");
        Ok(())
    }
}

// ── Feed ─────────────────────────────────────────────────────────────────────

/// Resources published by any therapist treating the patient.
pub struct ResourceFeedUseCase<L: LinkRepository, B: BatchLookup<Resource>, D: EntityDirectory> {
    pub links: L,
    pub resources: B,
    pub directory: D,
}

impl<L: LinkRepository, B: BatchLookup<Resource>, D: EntityDirectory>
    ResourceFeedUseCase<L, B, D>
{
    pub async fn execute(&self, patient_id: EntityId) -> Result<Vec<Resource>, ApiError> {
        ensure_exists(&self.directory, EntityKind::Patient, patient_id).await?;

        let therapists: Vec<EntityId> = self
            .links
            .list_by_right(LinkKind::Treats, patient_id)
            .await?
            .into_iter()
            .map(|link| link.key.left)
            .collect();
        let published = rights_of(&self.links, LinkKind::Publish, &therapists).await?;
        if published.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<EntityId> = published.into_iter().collect();
        self.resources.find_many(&ids).await
    }
}

// ── Popular ──────────────────────────────────────────────────────────────────

pub struct PopularResourcesUseCase<R: ResourceRepository> {
    pub repo: R,
}

impl<R: ResourceRepository> PopularResourcesUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<(Resource, u64)>, ApiError> {
        self.repo.most_consumed(POPULAR_LIMIT).await
    }
}
