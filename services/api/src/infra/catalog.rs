use std::collections::HashMap;

use anyhow::Context as _;
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};

use cisne_api_schema::{consume, courses, resources, services};
use cisne_domain::entity::EntityKind;
use cisne_domain::id::EntityId;
use cisne_domain::link::{Link, LinkKey, LinkKind, LinkPayload};

use crate::domain::repository::{
    BatchLookup, CourseRepository, ResourceRepository, ServiceRepository,
};
use crate::domain::types::{
    Course, CourseFilter, CoursePatch, NewCourse, NewResource, NewService, Resource,
    ResourceFilter, ResourcePatch, Service, ServiceFilter, ServicePatch,
};
use crate::error::ApiError;
use crate::infra::link::{delete_link, insert_link};
use crate::infra::{internal, raw_ids, txn_error, update_error};

// ── Service repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbServiceRepository {
    pub db: DatabaseConnection,
}

impl ServiceRepository for DbServiceRepository {
    async fn list(&self, filter: &ServiceFilter) -> Result<Vec<Service>, ApiError> {
        let mut query = services::Entity::find();
        if let Some(name) = &filter.name {
            query = query.filter(services::Column::Name.contains(name));
        }
        if let Some(min) = filter.min_price {
            query = query.filter(services::Column::Price.gte(min));
        }
        if let Some(max) = filter.max_price {
            query = query.filter(services::Column::Price.lte(max));
        }
        if let Some(from) = filter.from {
            query = query.filter(services::Column::ServiceDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(services::Column::ServiceDate.lte(to));
        }
        if let Some(day) = filter.available_from {
            query = query.filter(
                Condition::any()
                    .add(services::Column::ServiceDate.gte(day))
                    .add(services::Column::ServiceDate.is_null()),
            );
        }
        let models = query
            .order_by_asc(services::Column::Id)
            .all(&self.db)
            .await
            .context("list services")?;
        Ok(models.into_iter().map(service_from_model).collect())
    }

    async fn find_by_id(&self, id: EntityId) -> Result<Option<Service>, ApiError> {
        let model = services::Entity::find_by_id(id.get())
            .one(&self.db)
            .await
            .context("find service by id")?;
        Ok(model.map(service_from_model))
    }

    async fn create(&self, service: &NewService) -> Result<Service, ApiError> {
        let model = services::ActiveModel {
            invoice_id: Set(service.invoice_id.map(EntityId::get)),
            name: Set(service.name.clone()),
            price: Set(service.price),
            tools: Set(service.tools.clone()),
            room: Set(service.room.clone()),
            service_date: Set(service.date),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("create service")?;
        Ok(service_from_model(model))
    }

    async fn update(&self, id: EntityId, patch: &ServicePatch) -> Result<Service, ApiError> {
        let mut am = services::ActiveModel {
            id: Set(id.get()),
            ..Default::default()
        };
        if let Some(invoice_id) = patch.invoice_id {
            am.invoice_id = Set(Some(invoice_id.get()));
        }
        if let Some(name) = &patch.name {
            am.name = Set(name.clone());
        }
        if let Some(price) = patch.price {
            am.price = Set(Some(price));
        }
        if let Some(tools) = &patch.tools {
            am.tools = Set(Some(tools.clone()));
        }
        if let Some(room) = &patch.room {
            am.room = Set(Some(room.clone()));
        }
        if let Some(date) = patch.date {
            am.service_date = Set(Some(date));
        }
        let model = am.update(&self.db).await.map_err(|e| {
            update_error(e, ApiError::NotFound(EntityKind::Service), None, "update service")
        })?;
        Ok(service_from_model(model))
    }

    async fn delete(&self, id: EntityId) -> Result<bool, ApiError> {
        let result = services::Entity::delete_by_id(id.get())
            .exec(&self.db)
            .await
            .context("delete service")?;
        Ok(result.rows_affected > 0)
    }
}

impl BatchLookup<Service> for DbServiceRepository {
    async fn find_many(&self, ids: &[EntityId]) -> Result<Vec<Service>, ApiError> {
        let models = services::Entity::find()
            .filter(services::Column::Id.is_in(raw_ids(ids)))
            .order_by_asc(services::Column::Id)
            .all(&self.db)
            .await
            .context("find services by ids")?;
        Ok(models.into_iter().map(service_from_model).collect())
    }
}

fn service_from_model(model: services::Model) -> Service {
    Service {
        id: EntityId::new(model.id),
        invoice_id: model.invoice_id.map(EntityId::new),
        name: model.name,
        price: model.price,
        tools: model.tools,
        room: model.room,
        date: model.service_date,
    }
}

// ── Course repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCourseRepository {
    pub db: DatabaseConnection,
}

impl CourseRepository for DbCourseRepository {
    async fn list(&self, filter: &CourseFilter) -> Result<Vec<Course>, ApiError> {
        let mut query = courses::Entity::find();
        if let Some(name) = &filter.name {
            query = query.filter(courses::Column::Name.contains(name));
        }
        if let Some(teacher) = &filter.teacher {
            query = query.filter(courses::Column::Teacher.contains(teacher));
        }
        if let Some(course_type) = &filter.course_type {
            query = query.filter(courses::Column::CourseType.eq(course_type.as_str()));
        }
        if let Some(min) = filter.min_price {
            query = query.filter(courses::Column::Price.gte(min));
        }
        if let Some(max) = filter.max_price {
            query = query.filter(courses::Column::Price.lte(max));
        }
        if let Some(day) = filter.available_from {
            query = query.filter(
                Condition::any()
                    .add(courses::Column::CourseDate.gte(day))
                    .add(courses::Column::CourseDate.is_null()),
            );
        }
        let models = query
            .order_by_asc(courses::Column::Id)
            .all(&self.db)
            .await
            .context("list courses")?;
        Ok(models.into_iter().map(course_from_model).collect())
    }

    async fn find_by_id(&self, id: EntityId) -> Result<Option<Course>, ApiError> {
        let model = courses::Entity::find_by_id(id.get())
            .one(&self.db)
            .await
            .context("find course by id")?;
        Ok(model.map(course_from_model))
    }

    async fn create(
        &self,
        course: &NewCourse,
        posted_by: Option<(EntityId, NaiveDate)>,
    ) -> Result<Course, ApiError> {
        let model = self
            .db
            .transaction::<_, courses::Model, ApiError>(|txn| {
                let course = course.clone();
                Box::pin(async move {
                    let model = courses::ActiveModel {
                        invoice_id: Set(course.invoice_id.map(EntityId::get)),
                        name: Set(course.name),
                        teacher: Set(course.teacher),
                        price: Set(course.price),
                        course_type: Set(course.course_type),
                        description: Set(course.description),
                        course_date: Set(course.date),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    .map_err(|e| internal(e, "insert course"))?;

                    if let Some((centre, date)) = posted_by {
                        let posting = Link {
                            key: LinkKey::new(LinkKind::Posts, centre, EntityId::new(model.id)),
                            payload: LinkPayload::Dated(date),
                        };
                        insert_link(txn, &posting).await?;
                    }
                    Ok(model)
                })
            })
            .await
            .map_err(|e| txn_error(e, "create course"))?;
        Ok(course_from_model(model))
    }

    async fn update(&self, id: EntityId, patch: &CoursePatch) -> Result<Course, ApiError> {
        let mut am = courses::ActiveModel {
            id: Set(id.get()),
            ..Default::default()
        };
        if let Some(invoice_id) = patch.invoice_id {
            am.invoice_id = Set(Some(invoice_id.get()));
        }
        if let Some(name) = &patch.name {
            am.name = Set(name.clone());
        }
        if let Some(teacher) = &patch.teacher {
            am.teacher = Set(Some(teacher.clone()));
        }
        if let Some(price) = patch.price {
            am.price = Set(Some(price));
        }
        if let Some(course_type) = &patch.course_type {
            am.course_type = Set(Some(course_type.clone()));
        }
        if let Some(description) = &patch.description {
            am.description = Set(Some(description.clone()));
        }
        if let Some(date) = patch.date {
            am.course_date = Set(Some(date));
        }
        let model = am.update(&self.db).await.map_err(|e| {
            update_error(e, ApiError::NotFound(EntityKind::Course), None, "update course")
        })?;
        Ok(course_from_model(model))
    }

    async fn delete(&self, id: EntityId, unlink: Option<LinkKey>) -> Result<bool, ApiError> {
        let deleted = self
            .db
            .transaction::<_, bool, ApiError>(|txn| {
                Box::pin(async move {
                    if let Some(key) = unlink {
                        delete_link(txn, key)
                            .await
                            .map_err(|e| internal(e, "delete course posting"))?;
                    }
                    let result = courses::Entity::delete_by_id(id.get())
                        .exec(txn)
                        .await
                        .map_err(|e| internal(e, "delete course row"))?;
                    Ok(result.rows_affected > 0)
                })
            })
            .await
            .map_err(|e| txn_error(e, "delete course"))?;
        Ok(deleted)
    }
}

impl BatchLookup<Course> for DbCourseRepository {
    async fn find_many(&self, ids: &[EntityId]) -> Result<Vec<Course>, ApiError> {
        let models = courses::Entity::find()
            .filter(courses::Column::Id.is_in(raw_ids(ids)))
            .order_by_asc(courses::Column::Id)
            .all(&self.db)
            .await
            .context("find courses by ids")?;
        Ok(models.into_iter().map(course_from_model).collect())
    }
}

fn course_from_model(model: courses::Model) -> Course {
    Course {
        id: EntityId::new(model.id),
        invoice_id: model.invoice_id.map(EntityId::new),
        name: model.name,
        teacher: model.teacher,
        price: model.price,
        course_type: model.course_type,
        description: model.description,
        date: model.course_date,
    }
}

// ── Resource repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbResourceRepository {
    pub db: DatabaseConnection,
}

impl ResourceRepository for DbResourceRepository {
    async fn list(&self, filter: &ResourceFilter) -> Result<Vec<Resource>, ApiError> {
        let mut query = resources::Entity::find();
        if let Some(name) = &filter.name {
            query = query.filter(resources::Column::Name.contains(name));
        }
        if let Some(resource_type) = &filter.resource_type {
            query = query.filter(resources::Column::ResourceType.eq(resource_type.as_str()));
        }
        if let Some(term) = &filter.search {
            query = query.filter(
                Condition::any()
                    .add(resources::Column::Name.contains(term))
                    .add(resources::Column::Description.contains(term)),
            );
        }
        let models = query
            .order_by_asc(resources::Column::Id)
            .all(&self.db)
            .await
            .context("list resources")?;
        Ok(models.into_iter().map(resource_from_model).collect())
    }

    async fn find_by_id(&self, id: EntityId) -> Result<Option<Resource>, ApiError> {
        let model = resources::Entity::find_by_id(id.get())
            .one(&self.db)
            .await
            .context("find resource by id")?;
        Ok(model.map(resource_from_model))
    }

    async fn create(
        &self,
        resource: &NewResource,
        published_by: Option<(EntityId, NaiveDate)>,
    ) -> Result<Resource, ApiError> {
        let model = self
            .db
            .transaction::<_, resources::Model, ApiError>(|txn| {
                let resource = resource.clone();
                Box::pin(async move {
                    let model = resources::ActiveModel {
                        name: Set(resource.name),
                        resource_type: Set(resource.resource_type),
                        description: Set(resource.description),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    .map_err(|e| internal(e, "insert resource"))?;

                    if let Some((therapist, date)) = published_by {
                        let publication = Link {
                            key: LinkKey::new(
                                LinkKind::Publish,
                                therapist,
                                EntityId::new(model.id),
                            ),
                            payload: LinkPayload::Dated(date),
                        };
                        insert_link(txn, &publication).await?;
                    }
                    Ok(model)
                })
            })
            .await
            .map_err(|e| txn_error(e, "create resource"))?;
        Ok(resource_from_model(model))
    }

    async fn update(&self, id: EntityId, patch: &ResourcePatch) -> Result<Resource, ApiError> {
        let mut am = resources::ActiveModel {
            id: Set(id.get()),
            ..Default::default()
        };
        if let Some(name) = &patch.name {
            am.name = Set(name.clone());
        }
        if let Some(resource_type) = &patch.resource_type {
            am.resource_type = Set(Some(resource_type.clone()));
        }
        if let Some(description) = &patch.description {
            am.description = Set(Some(description.clone()));
        }
        let model = am.update(&self.db).await.map_err(|e| {
            update_error(
                e,
                ApiError::NotFound(EntityKind::Resource),
                None,
                "update resource",
            )
        })?;
        Ok(resource_from_model(model))
    }

    async fn delete(&self, id: EntityId, unlink: Option<LinkKey>) -> Result<bool, ApiError> {
        let deleted = self
            .db
            .transaction::<_, bool, ApiError>(|txn| {
                Box::pin(async move {
                    if let Some(key) = unlink {
                        delete_link(txn, key)
                            .await
                            .map_err(|e| internal(e, "delete resource publication"))?;
                    }
                    let result = resources::Entity::delete_by_id(id.get())
                        .exec(txn)
                        .await
                        .map_err(|e| internal(e, "delete resource row"))?;
                    Ok(result.rows_affected > 0)
                })
            })
            .await
            .map_err(|e| txn_error(e, "delete resource"))?;
        Ok(deleted)
    }

    async fn most_consumed(&self, limit: u64) -> Result<Vec<(Resource, u64)>, ApiError> {
        let counts: Vec<(i32, i64)> = consume::Entity::find()
            .select_only()
            .column(consume::Column::ResourceId)
            .column_as(consume::Column::PatientId.count(), "uses")
            .group_by(consume::Column::ResourceId)
            .into_tuple()
            .all(&self.db)
            .await
            .context("count resource consumption")?;
        let counts: HashMap<i32, u64> = counts
            .into_iter()
            .map(|(id, uses)| (id, u64::try_from(uses).unwrap_or_default()))
            .collect();

        let models = resources::Entity::find()
            .order_by_asc(resources::Column::Id)
            .all(&self.db)
            .await
            .context("list resources for ranking")?;
        let mut ranked: Vec<(Resource, u64)> = models
            .into_iter()
            .map(|m| {
                let uses = counts.get(&m.id).copied().unwrap_or_default();
                (resource_from_model(m), uses)
            })
            .collect();
        // stable sort keeps id order among ties
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(ranked)
    }
}

impl BatchLookup<Resource> for DbResourceRepository {
    async fn find_many(&self, ids: &[EntityId]) -> Result<Vec<Resource>, ApiError> {
        let models = resources::Entity::find()
            .filter(resources::Column::Id.is_in(raw_ids(ids)))
            .order_by_asc(resources::Column::Id)
            .all(&self.db)
            .await
            .context("find resources by ids")?;
        Ok(models.into_iter().map(resource_from_model).collect())
    }
}

fn resource_from_model(model: resources::Model) -> Resource {
    Resource {
        id: EntityId::new(model.id),
        name: model.name,
        resource_type: model.resource_type,
        description: model.description,
    }
}
