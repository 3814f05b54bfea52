use anyhow::Context as _;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

use cisne_api_schema::{
    centres, course_invoices, courses, invoices, natural_persons, patients, resources,
    service_invoices, services, therapists, users,
};
use cisne_domain::entity::EntityKind;
use cisne_domain::id::EntityId;
use cisne_domain::role::Role;

use crate::domain::repository::EntityDirectory;
use crate::error::ApiError;

#[derive(Clone)]
pub struct DbEntityDirectory {
    pub db: DatabaseConnection,
}

impl EntityDirectory for DbEntityDirectory {
    async fn exists(&self, kind: EntityKind, id: EntityId) -> Result<bool, ApiError> {
        let id = id.get();
        let count = match kind {
            EntityKind::User => users::Entity::find_by_id(id).count(&self.db).await,
            EntityKind::Centre => centres::Entity::find_by_id(id).count(&self.db).await,
            EntityKind::Therapist => therapists::Entity::find_by_id(id).count(&self.db).await,
            EntityKind::Patient => patients::Entity::find_by_id(id).count(&self.db).await,
            EntityKind::Service => services::Entity::find_by_id(id).count(&self.db).await,
            EntityKind::Course => courses::Entity::find_by_id(id).count(&self.db).await,
            EntityKind::Resource => resources::Entity::find_by_id(id).count(&self.db).await,
            EntityKind::Invoice => invoices::Entity::find_by_id(id).count(&self.db).await,
            EntityKind::ServiceInvoice => {
                service_invoices::Entity::find_by_id(id)
                    .count(&self.db)
                    .await
            }
            EntityKind::CourseInvoice => {
                course_invoices::Entity::find_by_id(id)
                    .count(&self.db)
                    .await
            }
        }
        .with_context(|| format!("check {kind} exists"))?;
        Ok(count > 0)
    }

    async fn nif_holder(
        &self,
        nif: &str,
        except: Option<EntityId>,
    ) -> Result<Option<EntityKind>, ApiError> {
        let mut query =
            natural_persons::Entity::find().filter(natural_persons::Column::Nif.eq(nif));
        if let Some(owner) = except {
            query = query.filter(natural_persons::Column::UserId.ne(owner.get()));
        }
        let holder = query.one(&self.db).await.context("find nif holder")?;
        Ok(holder.map(|row| match row.kind.parse::<Role>() {
            Ok(Role::Therapist) => EntityKind::Therapist,
            _ => EntityKind::Patient,
        }))
    }

    async fn cif_taken(&self, cif: &str, except: Option<EntityId>) -> Result<bool, ApiError> {
        let mut query = centres::Entity::find().filter(centres::Column::Cif.eq(cif));
        if let Some(owner) = except {
            query = query.filter(centres::Column::UserId.ne(owner.get()));
        }
        let count = query.count(&self.db).await.context("check centre cif")?;
        Ok(count > 0)
    }

    async fn profile_kind(&self, user_id: EntityId) -> Result<Option<EntityKind>, ApiError> {
        for kind in [EntityKind::Centre, EntityKind::Therapist, EntityKind::Patient] {
            if self.exists(kind, user_id).await? {
                return Ok(Some(kind));
            }
        }
        Ok(None)
    }
}
