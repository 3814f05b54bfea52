use chrono::NaiveDate;

use cisne_auth_types::principal::Principal;
use cisne_domain::entity::EntityKind;
use cisne_domain::id::EntityId;
use cisne_domain::link::{LinkKey, LinkKind};
use cisne_domain::role::Role;

use crate::domain::policy::{Action, authorize, authorize_role};
use crate::domain::repository::{BatchLookup, CourseRepository, EntityDirectory, LinkRepository};
use crate::domain::types::{Course, CourseFilter, CoursePatch, NewCourse, non_blank};
use crate::error::ApiError;
use crate::usecase::link::{employers, owner_via, rights_of};
use crate::usecase::{ensure_exists, non_negative, ordered, required};

// ── Inputs ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct CourseInput {
    pub invoice_id: Option<EntityId>,
    pub name: Option<String>,
    pub teacher: Option<String>,
    pub price: Option<f64>,
    pub course_type: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

impl CourseInput {
    pub fn validate(self) -> Result<NewCourse, ApiError> {
        Ok(NewCourse {
            invoice_id: self.invoice_id,
            name: required(self.name, "name")?,
            teacher: non_blank(self.teacher),
            price: non_negative(self.price, "price")?,
            course_type: non_blank(self.course_type),
            description: non_blank(self.description),
            date: self.date,
        })
    }

    pub fn into_patch(self) -> Result<CoursePatch, ApiError> {
        let name = match self.name {
            Some(name) => Some(required(Some(name), "name")?),
            None => None,
        };
        Ok(CoursePatch {
            invoice_id: self.invoice_id,
            name,
            teacher: non_blank(self.teacher),
            price: non_negative(self.price, "price")?,
            course_type: non_blank(self.course_type),
            description: non_blank(self.description),
            date: self.date,
        })
    }
}

// ── ListCourses ──────────────────────────────────────────────────────────────

pub struct ListCoursesUseCase<R: CourseRepository> {
    pub repo: R,
}

impl<R: CourseRepository> ListCoursesUseCase<R> {
    pub async fn execute(&self, filter: &CourseFilter) -> Result<Vec<Course>, ApiError> {
        ordered(filter.min_price, filter.max_price, "min_price > max_price")?;
        self.repo.list(filter).await
    }

    /// Courses dated today or later, plus undated ones.
    pub async fn available(
        &self,
        mut filter: CourseFilter,
        today: NaiveDate,
    ) -> Result<Vec<Course>, ApiError> {
        filter.available_from = Some(today);
        self.execute(&filter).await
    }
}

// ── GetCourse ────────────────────────────────────────────────────────────────

pub struct GetCourseUseCase<R: CourseRepository> {
    pub repo: R,
}

impl<R: CourseRepository> GetCourseUseCase<R> {
    pub async fn execute(&self, id: EntityId) -> Result<Course, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(EntityKind::Course))
    }
}

// ── CreateCourse ─────────────────────────────────────────────────────────────

pub struct CreateCourseUseCase<R: CourseRepository, D: EntityDirectory> {
    pub repo: R,
    pub directory: D,
}

impl<R: CourseRepository, D: EntityDirectory> CreateCourseUseCase<R, D> {
    /// A CENTRE always posts the course it creates; the `posts` row is written
    /// with the course. ADMIN may name a centre to post on its behalf.
    pub async fn execute(
        &self,
        principal: &Principal,
        input: CourseInput,
        centre_id: Option<EntityId>,
        today: NaiveDate,
    ) -> Result<Course, ApiError> {
        authorize_role(principal, Action::ManageCourse).into_result()?;
        let course = input.validate()?;

        let centre = match principal.role {
            Role::Centre => Some(principal.id),
            _ => centre_id,
        };
        if let Some(centre) = centre {
            ensure_exists(&self.directory, EntityKind::Centre, centre).await?;
        }
        if let Some(invoice_id) = course.invoice_id {
            ensure_exists(&self.directory, EntityKind::Invoice, invoice_id).await?;
        }

        let created = self
            .repo
            .create(&course, centre.map(|centre| (centre, today)))
            .await?;
        tracing::info!(course_id = %created.id, posted_by = ?centre, "course created");
        Ok(created)
    }
}

// ── UpdateCourse ─────────────────────────────────────────────────────────────

pub struct UpdateCourseUseCase<R: CourseRepository, L: LinkRepository, D: EntityDirectory> {
    pub repo: R,
    pub links: L,
    pub directory: D,
}

impl<R: CourseRepository, L: LinkRepository, D: EntityDirectory> UpdateCourseUseCase<R, L, D> {
    pub async fn execute(
        &self,
        principal: &Principal,
        id: EntityId,
        input: CourseInput,
    ) -> Result<Course, ApiError> {
        let patch = input.into_patch()?;
        if patch.is_empty() {
            return Err(ApiError::EmptyUpdate);
        }
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(ApiError::NotFound(EntityKind::Course));
        }
        let owner = owner_via(&self.links, LinkKind::Posts, id, principal).await?;
        authorize(principal, Action::ManageCourse, owner).into_result()?;

        if let Some(invoice_id) = patch.invoice_id {
            ensure_exists(&self.directory, EntityKind::Invoice, invoice_id).await?;
        }
        self.repo.update(id, &patch).await
    }
}

// ── DeleteCourse ─────────────────────────────────────────────────────────────

pub struct DeleteCourseUseCase<R: CourseRepository, L: LinkRepository> {
    pub repo: R,
    pub links: L,
}

impl<R: CourseRepository, L: LinkRepository> DeleteCourseUseCase<R, L> {
    /// A centre's rights over a course come from its `posts` row, so a
    /// centre-initiated delete removes that row first. ADMIN deletes directly.
    pub async fn execute(&self, principal: &Principal, id: EntityId) -> Result<(), ApiError> {
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(ApiError::NotFound(EntityKind::Course));
        }
        let owner = owner_via(&self.links, LinkKind::Posts, id, principal).await?;
        authorize(principal, Action::ManageCourse, owner).into_result()?;

        let unlink = if principal.is_admin() {
            None
        } else {
            Some(LinkKey::new(LinkKind::Posts, principal.id, id))
        };
        if !self.repo.delete(id, unlink).await? {
            return Err(ApiError::NotFound(EntityKind::Course));
        }
        tracing::info!(course_id = %id, actor = %principal.id, "course deleted");
        Ok(())
    }
}

// ── AvailableCourses ─────────────────────────────────────────────────────────

/// Courses a therapist can still buy: posted by any centre that employs the
/// therapist, minus the ones already bought.
pub struct AvailableCoursesUseCase<L: LinkRepository, B: BatchLookup<Course>, D: EntityDirectory> {
    pub links: L,
    pub courses: B,
    pub directory: D,
}

impl<L: LinkRepository, B: BatchLookup<Course>, D: EntityDirectory>
    AvailableCoursesUseCase<L, B, D>
{
    pub async fn execute(&self, therapist_id: EntityId) -> Result<Vec<Course>, ApiError> {
        ensure_exists(&self.directory, EntityKind::Therapist, therapist_id).await?;

        let centres = employers(&self.links, therapist_id).await?;
        let mut offered = rights_of(&self.links, LinkKind::Posts, &centres).await?;
        for bought in self.links.list_by_left(LinkKind::Buys, therapist_id).await? {
            offered.remove(&bought.key.right);
        }
        if offered.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<EntityId> = offered.into_iter().collect();
        self.courses.find_many(&ids).await
    }
}
