use anyhow::{Context as _, anyhow};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};

use cisne_api_schema::{buys, consume, employs, pays, posts, publish, treats};
use cisne_domain::id::EntityId;
use cisne_domain::link::{Link, LinkKey, LinkKind, LinkPayload};

use crate::domain::repository::LinkRepository;
use crate::error::ApiError;
use crate::infra::{internal, write_error};

// ── Link repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbLinkRepository {
    pub db: DatabaseConnection,
}

impl LinkRepository for DbLinkRepository {
    async fn find(&self, key: LinkKey) -> Result<Option<Link>, ApiError> {
        let (l, r) = (key.left.get(), key.right.get());
        let link = match key.kind {
            LinkKind::Employs => employs::Entity::find_by_id((l, r))
                .one(&self.db)
                .await
                .context("find employs")?
                .map(employs_link),
            LinkKind::Treats => treats::Entity::find_by_id((l, r))
                .one(&self.db)
                .await
                .context("find treats")?
                .map(treats_link),
            LinkKind::Pays => pays::Entity::find_by_id((l, r))
                .one(&self.db)
                .await
                .context("find pays")?
                .map(pays_link),
            LinkKind::Posts => posts::Entity::find_by_id((l, r))
                .one(&self.db)
                .await
                .context("find posts")?
                .map(posts_link),
            LinkKind::Buys => buys::Entity::find_by_id((l, r))
                .one(&self.db)
                .await
                .context("find buys")?
                .map(buys_link),
            LinkKind::Publish => publish::Entity::find_by_id((l, r))
                .one(&self.db)
                .await
                .context("find publish")?
                .map(publish_link),
            LinkKind::Consume => consume::Entity::find_by_id((l, r))
                .one(&self.db)
                .await
                .context("find consume")?
                .map(consume_link),
        };
        Ok(link)
    }

    async fn insert(&self, link: &Link) -> Result<(), ApiError> {
        insert_link(&self.db, link).await
    }

    async fn update_payload(
        &self,
        key: LinkKey,
        payload: &LinkPayload,
    ) -> Result<bool, ApiError> {
        let (l, r) = (key.left.get(), key.right.get());
        let mismatch = || payload_mismatch(key.kind);
        let result = match key.kind {
            LinkKind::Employs => {
                let text = payload.text().ok_or_else(mismatch)?;
                employs::Entity::update_many()
                    .col_expr(employs::Column::Contract, Expr::value(text))
                    .filter(employs::Column::CentreId.eq(l))
                    .filter(employs::Column::TherapistId.eq(r))
                    .exec(&self.db)
                    .await
            }
            LinkKind::Treats => {
                let text = payload.text().ok_or_else(mismatch)?;
                treats::Entity::update_many()
                    .col_expr(treats::Column::Report, Expr::value(text))
                    .filter(treats::Column::TherapistId.eq(l))
                    .filter(treats::Column::PatientId.eq(r))
                    .exec(&self.db)
                    .await
            }
            LinkKind::Posts => {
                let date = payload.date().ok_or_else(mismatch)?;
                posts::Entity::update_many()
                    .col_expr(posts::Column::PostDate, Expr::value(date))
                    .filter(posts::Column::CentreId.eq(l))
                    .filter(posts::Column::CourseId.eq(r))
                    .exec(&self.db)
                    .await
            }
            LinkKind::Buys => {
                let date = payload.date().ok_or_else(mismatch)?;
                buys::Entity::update_many()
                    .col_expr(buys::Column::BuyingDate, Expr::value(date))
                    .filter(buys::Column::TherapistId.eq(l))
                    .filter(buys::Column::CourseId.eq(r))
                    .exec(&self.db)
                    .await
            }
            LinkKind::Publish => {
                let date = payload.date().ok_or_else(mismatch)?;
                publish::Entity::update_many()
                    .col_expr(publish::Column::PublicationDate, Expr::value(date))
                    .filter(publish::Column::TherapistId.eq(l))
                    .filter(publish::Column::ResourceId.eq(r))
                    .exec(&self.db)
                    .await
            }
            // payload-free rows: nothing to update, report whether the row exists
            LinkKind::Pays | LinkKind::Consume => return Ok(self.find(key).await?.is_some()),
        };
        let result = result.map_err(|e| internal(e, "update link payload"))?;
        Ok(result.rows_affected > 0)
    }

    async fn delete(&self, key: LinkKey) -> Result<bool, ApiError> {
        delete_link(&self.db, key)
            .await
            .map_err(|e| internal(e, "delete link"))
    }

    async fn list_by_left(&self, kind: LinkKind, left: EntityId) -> Result<Vec<Link>, ApiError> {
        let id = left.get();
        let links = match kind {
            LinkKind::Employs => employs::Entity::find()
                .filter(employs::Column::CentreId.eq(id))
                .order_by_asc(employs::Column::TherapistId)
                .all(&self.db)
                .await
                .context("list employs by centre")?
                .into_iter()
                .map(employs_link)
                .collect(),
            LinkKind::Treats => treats::Entity::find()
                .filter(treats::Column::TherapistId.eq(id))
                .order_by_asc(treats::Column::PatientId)
                .all(&self.db)
                .await
                .context("list treats by therapist")?
                .into_iter()
                .map(treats_link)
                .collect(),
            LinkKind::Pays => pays::Entity::find()
                .filter(pays::Column::PatientId.eq(id))
                .order_by_asc(pays::Column::ServiceId)
                .all(&self.db)
                .await
                .context("list pays by patient")?
                .into_iter()
                .map(pays_link)
                .collect(),
            LinkKind::Posts => posts::Entity::find()
                .filter(posts::Column::CentreId.eq(id))
                .order_by_asc(posts::Column::CourseId)
                .all(&self.db)
                .await
                .context("list posts by centre")?
                .into_iter()
                .map(posts_link)
                .collect(),
            LinkKind::Buys => buys::Entity::find()
                .filter(buys::Column::TherapistId.eq(id))
                .order_by_asc(buys::Column::CourseId)
                .all(&self.db)
                .await
                .context("list buys by therapist")?
                .into_iter()
                .map(buys_link)
                .collect(),
            LinkKind::Publish => publish::Entity::find()
                .filter(publish::Column::TherapistId.eq(id))
                .order_by_asc(publish::Column::ResourceId)
                .all(&self.db)
                .await
                .context("list publish by therapist")?
                .into_iter()
                .map(publish_link)
                .collect(),
            LinkKind::Consume => consume::Entity::find()
                .filter(consume::Column::PatientId.eq(id))
                .order_by_asc(consume::Column::ResourceId)
                .all(&self.db)
                .await
                .context("list consume by patient")?
                .into_iter()
                .map(consume_link)
                .collect(),
        };
        Ok(links)
    }

    async fn list_by_right(
        &self,
        kind: LinkKind,
        right: EntityId,
    ) -> Result<Vec<Link>, ApiError> {
        let id = right.get();
        let links = match kind {
            LinkKind::Employs => employs::Entity::find()
                .filter(employs::Column::TherapistId.eq(id))
                .order_by_asc(employs::Column::CentreId)
                .all(&self.db)
                .await
                .context("list employs by therapist")?
                .into_iter()
                .map(employs_link)
                .collect(),
            LinkKind::Treats => treats::Entity::find()
                .filter(treats::Column::PatientId.eq(id))
                .order_by_asc(treats::Column::TherapistId)
                .all(&self.db)
                .await
                .context("list treats by patient")?
                .into_iter()
                .map(treats_link)
                .collect(),
            LinkKind::Pays => pays::Entity::find()
                .filter(pays::Column::ServiceId.eq(id))
                .order_by_asc(pays::Column::PatientId)
                .all(&self.db)
                .await
                .context("list pays by service")?
                .into_iter()
                .map(pays_link)
                .collect(),
            LinkKind::Posts => posts::Entity::find()
                .filter(posts::Column::CourseId.eq(id))
                .order_by_asc(posts::Column::CentreId)
                .all(&self.db)
                .await
                .context("list posts by course")?
                .into_iter()
                .map(posts_link)
                .collect(),
            LinkKind::Buys => buys::Entity::find()
                .filter(buys::Column::CourseId.eq(id))
                .order_by_asc(buys::Column::TherapistId)
                .all(&self.db)
                .await
                .context("list buys by course")?
                .into_iter()
                .map(buys_link)
                .collect(),
            LinkKind::Publish => publish::Entity::find()
                .filter(publish::Column::ResourceId.eq(id))
                .order_by_asc(publish::Column::TherapistId)
                .all(&self.db)
                .await
                .context("list publish by resource")?
                .into_iter()
                .map(publish_link)
                .collect(),
            LinkKind::Consume => consume::Entity::find()
                .filter(consume::Column::ResourceId.eq(id))
                .order_by_asc(consume::Column::PatientId)
                .all(&self.db)
                .await
                .context("list consume by resource")?
                .into_iter()
                .map(consume_link)
                .collect(),
        };
        Ok(links)
    }
}

// ── Shared writes (also used inside catalog transactions) ────────────────────

/// Insert one relationship row. A composite-key violation becomes `LinkExists`.
pub(crate) async fn insert_link<C: ConnectionTrait>(db: &C, link: &Link) -> Result<(), ApiError> {
    let kind = link.key.kind;
    let (l, r) = (link.key.left.get(), link.key.right.get());
    let mismatch = || payload_mismatch(kind);
    let result = match kind {
        LinkKind::Employs => {
            let contract = link.payload.text().ok_or_else(mismatch)?.to_owned();
            employs::Entity::insert(employs::ActiveModel {
                centre_id: Set(l),
                therapist_id: Set(r),
                contract: Set(contract),
            })
            .exec_without_returning(db)
            .await
        }
        LinkKind::Treats => {
            let report = link.payload.text().ok_or_else(mismatch)?.to_owned();
            treats::Entity::insert(treats::ActiveModel {
                therapist_id: Set(l),
                patient_id: Set(r),
                report: Set(report),
            })
            .exec_without_returning(db)
            .await
        }
        LinkKind::Pays => {
            pays::Entity::insert(pays::ActiveModel {
                patient_id: Set(l),
                service_id: Set(r),
            })
            .exec_without_returning(db)
            .await
        }
        LinkKind::Posts => {
            let date = link.payload.date().ok_or_else(mismatch)?;
            posts::Entity::insert(posts::ActiveModel {
                centre_id: Set(l),
                course_id: Set(r),
                post_date: Set(date),
            })
            .exec_without_returning(db)
            .await
        }
        LinkKind::Buys => {
            let date = link.payload.date().ok_or_else(mismatch)?;
            buys::Entity::insert(buys::ActiveModel {
                therapist_id: Set(l),
                course_id: Set(r),
                buying_date: Set(date),
            })
            .exec_without_returning(db)
            .await
        }
        LinkKind::Publish => {
            let date = link.payload.date().ok_or_else(mismatch)?;
            publish::Entity::insert(publish::ActiveModel {
                therapist_id: Set(l),
                resource_id: Set(r),
                publication_date: Set(date),
            })
            .exec_without_returning(db)
            .await
        }
        LinkKind::Consume => {
            consume::Entity::insert(consume::ActiveModel {
                patient_id: Set(l),
                resource_id: Set(r),
            })
            .exec_without_returning(db)
            .await
        }
    };
    result
        .map(|_| ())
        .map_err(|e| write_error(e, ApiError::LinkExists(kind), "insert link"))
}

/// Delete one relationship row. Returns `true` if it existed.
pub(crate) async fn delete_link<C: ConnectionTrait>(db: &C, key: LinkKey) -> Result<bool, DbErr> {
    let id = (key.left.get(), key.right.get());
    let result = match key.kind {
        LinkKind::Employs => employs::Entity::delete_by_id(id).exec(db).await?,
        LinkKind::Treats => treats::Entity::delete_by_id(id).exec(db).await?,
        LinkKind::Pays => pays::Entity::delete_by_id(id).exec(db).await?,
        LinkKind::Posts => posts::Entity::delete_by_id(id).exec(db).await?,
        LinkKind::Buys => buys::Entity::delete_by_id(id).exec(db).await?,
        LinkKind::Publish => publish::Entity::delete_by_id(id).exec(db).await?,
        LinkKind::Consume => consume::Entity::delete_by_id(id).exec(db).await?,
    };
    Ok(result.rows_affected > 0)
}

fn payload_mismatch(kind: LinkKind) -> ApiError {
    ApiError::Internal(anyhow!("payload does not match {kind} row"))
}

// ── Model conversions ────────────────────────────────────────────────────────

fn link(kind: LinkKind, left: i32, right: i32, payload: LinkPayload) -> Link {
    Link {
        key: LinkKey::new(kind, EntityId::new(left), EntityId::new(right)),
        payload,
    }
}

fn employs_link(m: employs::Model) -> Link {
    link(
        LinkKind::Employs,
        m.centre_id,
        m.therapist_id,
        LinkPayload::Contract(m.contract),
    )
}

fn treats_link(m: treats::Model) -> Link {
    link(
        LinkKind::Treats,
        m.therapist_id,
        m.patient_id,
        LinkPayload::Report(m.report),
    )
}

fn pays_link(m: pays::Model) -> Link {
    link(LinkKind::Pays, m.patient_id, m.service_id, LinkPayload::Bare)
}

fn posts_link(m: posts::Model) -> Link {
    link(
        LinkKind::Posts,
        m.centre_id,
        m.course_id,
        LinkPayload::Dated(m.post_date),
    )
}

fn buys_link(m: buys::Model) -> Link {
    link(
        LinkKind::Buys,
        m.therapist_id,
        m.course_id,
        LinkPayload::Dated(m.buying_date),
    )
}

fn publish_link(m: publish::Model) -> Link {
    link(
        LinkKind::Publish,
        m.therapist_id,
        m.resource_id,
        LinkPayload::Dated(m.publication_date),
    )
}

fn consume_link(m: consume::Model) -> Link {
    link(LinkKind::Consume, m.patient_id, m.resource_id, LinkPayload::Bare)
}
