//! Relationship rows: create, update, delete and list, for every link kind.
//!
//! Creation runs a fixed protocol: authorize against the left endpoint,
//! resolve both endpoints, reject duplicates, check cross-relationship
//! preconditions, then insert with payload defaults.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;

use cisne_auth_types::principal::Principal;
use cisne_domain::id::EntityId;
use cisne_domain::link::{Link, LinkAttributes, LinkKey, LinkKind, LinkPayload};

use crate::domain::policy::{Action, authorize};
use crate::domain::repository::{BatchLookup, EntityDirectory, LinkRepository};
use crate::domain::types::{Identified, Linked, non_blank};
use crate::error::ApiError;
use crate::usecase::ensure_exists;

/// Which endpoint of a relationship a listing is anchored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Centres that employ `therapist`.
pub(crate) async fn employers<L: LinkRepository>(
    links: &L,
    therapist: EntityId,
) -> Result<Vec<EntityId>, ApiError> {
    Ok(links
        .list_by_right(LinkKind::Employs, therapist)
        .await?
        .into_iter()
        .map(|link| link.key.left)
        .collect())
}

/// Whether some centre employing `therapist` posts `course`.
pub(crate) async fn course_offered_to<L: LinkRepository>(
    links: &L,
    therapist: EntityId,
    course: EntityId,
) -> Result<bool, ApiError> {
    for centre in employers(links, therapist).await? {
        let key = LinkKey::new(LinkKind::Posts, centre, course);
        if links.find(key).await?.is_some() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Left endpoint of a `kind` row on `right`, preferring the caller's own row.
///
/// Used to resolve the owner of catalog rows whose rights come from a
/// relationship (a centre posting a course, a therapist publishing a resource).
pub(crate) async fn owner_via<L: LinkRepository>(
    links: &L,
    kind: LinkKind,
    right: EntityId,
    principal: &Principal,
) -> Result<Option<EntityId>, ApiError> {
    let owners: Vec<EntityId> = links
        .list_by_right(kind, right)
        .await?
        .into_iter()
        .map(|link| link.key.left)
        .collect();
    if owners.contains(&principal.id) {
        return Ok(Some(principal.id));
    }
    Ok(owners.first().copied())
}

// ── CreateLink ───────────────────────────────────────────────────────────────

pub struct CreateLinkUseCase<L: LinkRepository, D: EntityDirectory> {
    pub links: L,
    pub directory: D,
}

impl<L: LinkRepository, D: EntityDirectory> CreateLinkUseCase<L, D> {
    pub async fn execute(
        &self,
        principal: &Principal,
        key: LinkKey,
        attrs: LinkAttributes,
        today: NaiveDate,
    ) -> Result<Link, ApiError> {
        let kind = key.kind;
        authorize(principal, Action::from(kind), Some(key.left)).into_result()?;

        ensure_exists(&self.directory, kind.left(), key.left).await?;
        ensure_exists(&self.directory, kind.right(), key.right).await?;

        if self.links.find(key).await?.is_some() {
            return Err(ApiError::LinkExists(kind));
        }

        if kind == LinkKind::Buys && !course_offered_to(&self.links, key.left, key.right).await? {
            return Err(ApiError::CourseNotOffered);
        }

        let link = Link {
            key,
            payload: kind.payload_from(attrs, today),
        };
        self.links.insert(&link).await?;
        tracing::info!(
            kind = %kind,
            left = %key.left,
            right = %key.right,
            actor = %principal.id,
            "relationship created"
        );
        Ok(link)
    }
}

// ── UpdateLink ───────────────────────────────────────────────────────────────

/// Replace the attribute of an existing row. Only rows that carry text or a
/// date can be updated; the attribute must match what the row carries.
pub struct UpdateLinkUseCase<L: LinkRepository> {
    pub links: L,
}

impl<L: LinkRepository> UpdateLinkUseCase<L> {
    pub async fn execute(
        &self,
        principal: &Principal,
        key: LinkKey,
        attrs: LinkAttributes,
    ) -> Result<Link, ApiError> {
        authorize(principal, Action::from(key.kind), Some(key.left)).into_result()?;
        let existing = self
            .links
            .find(key)
            .await?
            .ok_or(ApiError::LinkNotFound(key.kind))?;

        let payload = match (&existing.payload, non_blank(attrs.text), attrs.date) {
            (LinkPayload::Contract(_), Some(text), _) => LinkPayload::Contract(text),
            (LinkPayload::Report(_), Some(text), _) => LinkPayload::Report(text),
            (LinkPayload::Dated(_), _, Some(date)) => LinkPayload::Dated(date),
            _ => return Err(ApiError::EmptyUpdate),
        };
        if !self.links.update_payload(key, &payload).await? {
            return Err(ApiError::LinkNotFound(key.kind));
        }
        Ok(Link { key, payload })
    }
}

// ── DeleteLink ───────────────────────────────────────────────────────────────

pub struct DeleteLinkUseCase<L: LinkRepository> {
    pub links: L,
}

impl<L: LinkRepository> DeleteLinkUseCase<L> {
    pub async fn execute(&self, principal: &Principal, key: LinkKey) -> Result<(), ApiError> {
        authorize(principal, Action::from(key.kind), Some(key.left)).into_result()?;
        if !self.links.delete(key).await? {
            return Err(ApiError::LinkNotFound(key.kind));
        }
        tracing::info!(
            kind = %key.kind,
            left = %key.left,
            right = %key.right,
            actor = %principal.id,
            "relationship deleted"
        );
        Ok(())
    }
}

// ── ListLinked ───────────────────────────────────────────────────────────────

/// Rows on the far side of every `kind` relationship anchored on one entity,
/// each paired with its relationship row.
pub struct ListLinkedUseCase<L: LinkRepository, B, D: EntityDirectory> {
    pub links: L,
    pub lookup: B,
    pub directory: D,
}

impl<L: LinkRepository, B, D: EntityDirectory> ListLinkedUseCase<L, B, D> {
    pub async fn execute<T>(
        &self,
        side: Side,
        kind: LinkKind,
        id: EntityId,
    ) -> Result<Vec<Linked<T>>, ApiError>
    where
        T: Identified,
        B: BatchLookup<T>,
    {
        let (anchor, rows) = match side {
            Side::Left => (kind.left(), self.links.list_by_left(kind, id).await),
            Side::Right => (kind.right(), self.links.list_by_right(kind, id).await),
        };
        let rows = rows?;
        if rows.is_empty() {
            ensure_exists(&self.directory, anchor, id).await?;
            return Ok(Vec::new());
        }

        let far = |link: &Link| match side {
            Side::Left => link.key.right,
            Side::Right => link.key.left,
        };
        let ids: Vec<EntityId> = rows.iter().map(far).collect();
        let mut items: HashMap<EntityId, T> = self
            .lookup
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|item| (item.entity_id(), item))
            .collect();

        Ok(rows
            .into_iter()
            .filter_map(|link| {
                items
                    .remove(&far(&link))
                    .map(|item| Linked { item, link })
            })
            .collect())
    }
}

/// Distinct far-side ids of `kind` rows whose left endpoint is in `lefts`.
pub(crate) async fn rights_of<L: LinkRepository>(
    links: &L,
    kind: LinkKind,
    lefts: &[EntityId],
) -> Result<BTreeSet<EntityId>, ApiError> {
    let mut rights = BTreeSet::new();
    for left in lefts {
        for link in links.list_by_left(kind, *left).await? {
            rights.insert(link.key.right);
        }
    }
    Ok(rights)
}
