use anyhow::Context as _;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};

use cisne_api_schema::{centres, natural_persons, patients, therapists};
use cisne_domain::entity::EntityKind;
use cisne_domain::id::EntityId;
use cisne_domain::role::Role;

use crate::domain::repository::{
    BatchLookup, CentreRepository, PatientRepository, TherapistRepository,
};
use crate::domain::types::{
    Centre, CentreFilter, CentrePatch, NewCentre, NewPatient, NewTherapist, Patient,
    PatientFilter, PatientPatch, Therapist, TherapistFilter, TherapistPatch,
    normalize_natural_key,
};
use crate::error::ApiError;
use crate::infra::{raw_ids, txn_error, update_error, write_error};

// ── Shared inserts (also used by registration) ───────────────────────────────

pub(crate) async fn insert_centre<C: ConnectionTrait>(
    db: &C,
    user_id: EntityId,
    centre: &NewCentre,
) -> Result<centres::Model, DbErr> {
    centres::ActiveModel {
        user_id: Set(user_id.get()),
        cif: Set(centre.cif.clone()),
        name: Set(centre.name.clone()),
        location: Set(centre.location.clone()),
        service_id: Set(centre.service_id.map(EntityId::get)),
    }
    .insert(db)
    .await
}

/// Record `nif` as held by `user_id`, replacing whatever NIF the user held
/// before. Fails with the conflict naming the current holder's kind.
///
/// Run inside the transaction that writes the profile row.
pub(crate) async fn claim_nif<C: ConnectionTrait>(
    db: &C,
    user_id: EntityId,
    nif: &str,
    holder: Role,
) -> Result<(), ApiError> {
    release_nif(db, user_id).await?;
    let inserted = natural_persons::Entity::insert(natural_persons::ActiveModel {
        user_id: Set(user_id.get()),
        nif: Set(nif.to_owned()),
        kind: Set(holder.as_str().to_owned()),
    })
    .on_conflict(
        OnConflict::column(natural_persons::Column::Nif)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(db)
    .await
    .context("claim nif")?;
    if inserted > 0 {
        return Ok(());
    }

    let current = natural_persons::Entity::find()
        .filter(natural_persons::Column::Nif.eq(nif))
        .one(db)
        .await
        .context("find nif holder")?;
    match current.map(|row| row.kind.parse::<Role>()) {
        Some(Ok(Role::Therapist)) => Err(ApiError::NifTakenByTherapist),
        _ => Err(ApiError::NifTakenByPatient),
    }
}

async fn release_nif<C: ConnectionTrait>(db: &C, user_id: EntityId) -> Result<(), ApiError> {
    natural_persons::Entity::delete_by_id(user_id.get())
        .exec(db)
        .await
        .context("release nif")?;
    Ok(())
}

pub(crate) async fn insert_therapist<C: ConnectionTrait>(
    db: &C,
    user_id: EntityId,
    therapist: &NewTherapist,
) -> Result<therapists::Model, ApiError> {
    claim_nif(db, user_id, &therapist.nif, Role::Therapist).await?;
    therapists::ActiveModel {
        user_id: Set(user_id.get()),
        first_name: Set(therapist.first_name.clone()),
        last_name: Set(therapist.last_name.clone()),
        nif: Set(therapist.nif.clone()),
        society_id: Set(therapist.society_id.clone()),
        profession: Set(therapist.profession.clone()),
    }
    .insert(db)
    .await
    .map_err(|e| write_error(e, ApiError::NifTakenByTherapist, "insert therapist"))
}

pub(crate) async fn insert_patient<C: ConnectionTrait>(
    db: &C,
    user_id: EntityId,
    patient: &NewPatient,
) -> Result<patients::Model, ApiError> {
    claim_nif(db, user_id, &patient.nif, Role::Patient).await?;
    patients::ActiveModel {
        user_id: Set(user_id.get()),
        first_name: Set(patient.first_name.clone()),
        last_name: Set(patient.last_name.clone()),
        nif: Set(patient.nif.clone()),
        diagnosis: Set(patient.diagnosis.clone()),
    }
    .insert(db)
    .await
    .map_err(|e| write_error(e, ApiError::NifTakenByPatient, "insert patient"))
}

// ── Centre repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCentreRepository {
    pub db: DatabaseConnection,
}

impl CentreRepository for DbCentreRepository {
    async fn list(&self, filter: &CentreFilter) -> Result<Vec<Centre>, ApiError> {
        let mut query = centres::Entity::find();
        if let Some(name) = &filter.name {
            query = query.filter(centres::Column::Name.contains(name));
        }
        if let Some(location) = &filter.location {
            query = query.filter(centres::Column::Location.contains(location));
        }
        if let Some(cif) = &filter.cif {
            query = query.filter(centres::Column::Cif.eq(normalize_natural_key(cif)));
        }
        let models = query
            .order_by_asc(centres::Column::UserId)
            .all(&self.db)
            .await
            .context("list centres")?;
        Ok(models.into_iter().map(centre_from_model).collect())
    }

    async fn find_by_id(&self, id: EntityId) -> Result<Option<Centre>, ApiError> {
        let model = centres::Entity::find_by_id(id.get())
            .one(&self.db)
            .await
            .context("find centre by id")?;
        Ok(model.map(centre_from_model))
    }

    async fn create(&self, user_id: EntityId, centre: &NewCentre) -> Result<Centre, ApiError> {
        let model = insert_centre(&self.db, user_id, centre)
            .await
            .map_err(|e| write_error(e, ApiError::CifTaken, "create centre"))?;
        Ok(centre_from_model(model))
    }

    async fn update(&self, id: EntityId, patch: &CentrePatch) -> Result<Centre, ApiError> {
        let mut am = centres::ActiveModel {
            user_id: Set(id.get()),
            ..Default::default()
        };
        if let Some(cif) = &patch.cif {
            am.cif = Set(cif.clone());
        }
        if let Some(name) = &patch.name {
            am.name = Set(name.clone());
        }
        if let Some(location) = &patch.location {
            am.location = Set(Some(location.clone()));
        }
        if let Some(service_id) = patch.service_id {
            am.service_id = Set(Some(service_id.get()));
        }
        let model = am.update(&self.db).await.map_err(|e| {
            update_error(
                e,
                ApiError::NotFound(EntityKind::Centre),
                Some(ApiError::CifTaken),
                "update centre",
            )
        })?;
        Ok(centre_from_model(model))
    }

    async fn delete(&self, id: EntityId) -> Result<bool, ApiError> {
        let result = centres::Entity::delete_by_id(id.get())
            .exec(&self.db)
            .await
            .context("delete centre")?;
        Ok(result.rows_affected > 0)
    }
}

impl BatchLookup<Centre> for DbCentreRepository {
    async fn find_many(&self, ids: &[EntityId]) -> Result<Vec<Centre>, ApiError> {
        let models = centres::Entity::find()
            .filter(centres::Column::UserId.is_in(raw_ids(ids)))
            .order_by_asc(centres::Column::UserId)
            .all(&self.db)
            .await
            .context("find centres by ids")?;
        Ok(models.into_iter().map(centre_from_model).collect())
    }
}

fn centre_from_model(model: centres::Model) -> Centre {
    Centre {
        user_id: EntityId::new(model.user_id),
        cif: model.cif,
        name: model.name,
        location: model.location,
        service_id: model.service_id.map(EntityId::new),
    }
}

// ── Therapist repository ─────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTherapistRepository {
    pub db: DatabaseConnection,
}

impl TherapistRepository for DbTherapistRepository {
    async fn list(&self, filter: &TherapistFilter) -> Result<Vec<Therapist>, ApiError> {
        let mut query = therapists::Entity::find();
        if let Some(name) = &filter.name {
            query = query.filter(
                Condition::any()
                    .add(therapists::Column::FirstName.contains(name))
                    .add(therapists::Column::LastName.contains(name)),
            );
        }
        if let Some(profession) = &filter.profession {
            query = query.filter(therapists::Column::Profession.contains(profession));
        }
        let models = query
            .order_by_asc(therapists::Column::UserId)
            .all(&self.db)
            .await
            .context("list therapists")?;
        Ok(models.into_iter().map(therapist_from_model).collect())
    }

    async fn find_by_id(&self, id: EntityId) -> Result<Option<Therapist>, ApiError> {
        let model = therapists::Entity::find_by_id(id.get())
            .one(&self.db)
            .await
            .context("find therapist by id")?;
        Ok(model.map(therapist_from_model))
    }

    async fn create(
        &self,
        user_id: EntityId,
        therapist: &NewTherapist,
    ) -> Result<Therapist, ApiError> {
        let therapist = therapist.clone();
        let model = self
            .db
            .transaction::<_, therapists::Model, ApiError>(|txn| {
                Box::pin(async move { insert_therapist(txn, user_id, &therapist).await })
            })
            .await
            .map_err(|e| txn_error(e, "create therapist"))?;
        Ok(therapist_from_model(model))
    }

    async fn update(&self, id: EntityId, patch: &TherapistPatch) -> Result<Therapist, ApiError> {
        let patch = patch.clone();
        let model = self
            .db
            .transaction::<_, therapists::Model, ApiError>(|txn| {
                Box::pin(async move {
                    if let Some(nif) = &patch.nif {
                        if therapists::Entity::find_by_id(id.get())
                            .one(txn)
                            .await
                            .context("find therapist for update")?
                            .is_none()
                        {
                            return Err(ApiError::NotFound(EntityKind::Therapist));
                        }
                        claim_nif(txn, id, nif, Role::Therapist).await?;
                    }
                    let mut am = therapists::ActiveModel {
                        user_id: Set(id.get()),
                        ..Default::default()
                    };
                    if let Some(first_name) = &patch.first_name {
                        am.first_name = Set(first_name.clone());
                    }
                    if let Some(last_name) = &patch.last_name {
                        am.last_name = Set(last_name.clone());
                    }
                    if let Some(nif) = &patch.nif {
                        am.nif = Set(nif.clone());
                    }
                    if let Some(society_id) = &patch.society_id {
                        am.society_id = Set(Some(society_id.clone()));
                    }
                    if let Some(profession) = &patch.profession {
                        am.profession = Set(Some(profession.clone()));
                    }
                    am.update(txn).await.map_err(|e| {
                        update_error(
                            e,
                            ApiError::NotFound(EntityKind::Therapist),
                            Some(ApiError::NifTakenByTherapist),
                            "update therapist",
                        )
                    })
                })
            })
            .await
            .map_err(|e| txn_error(e, "update therapist"))?;
        Ok(therapist_from_model(model))
    }

    async fn delete(&self, id: EntityId) -> Result<bool, ApiError> {
        self.db
            .transaction::<_, bool, ApiError>(|txn| {
                Box::pin(async move {
                    let result = therapists::Entity::delete_by_id(id.get())
                        .exec(txn)
                        .await
                        .context("delete therapist")?;
                    release_nif(txn, id).await?;
                    Ok(result.rows_affected > 0)
                })
            })
            .await
            .map_err(|e| txn_error(e, "delete therapist"))
    }
}

impl BatchLookup<Therapist> for DbTherapistRepository {
    async fn find_many(&self, ids: &[EntityId]) -> Result<Vec<Therapist>, ApiError> {
        let models = therapists::Entity::find()
            .filter(therapists::Column::UserId.is_in(raw_ids(ids)))
            .order_by_asc(therapists::Column::UserId)
            .all(&self.db)
            .await
            .context("find therapists by ids")?;
        Ok(models.into_iter().map(therapist_from_model).collect())
    }
}

fn therapist_from_model(model: therapists::Model) -> Therapist {
    Therapist {
        user_id: EntityId::new(model.user_id),
        first_name: model.first_name,
        last_name: model.last_name,
        nif: model.nif,
        society_id: model.society_id,
        profession: model.profession,
    }
}

// ── Patient repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPatientRepository {
    pub db: DatabaseConnection,
}

impl PatientRepository for DbPatientRepository {
    async fn list(&self, filter: &PatientFilter) -> Result<Vec<Patient>, ApiError> {
        let mut query = patients::Entity::find();
        if let Some(name) = &filter.name {
            query = query.filter(
                Condition::any()
                    .add(patients::Column::FirstName.contains(name))
                    .add(patients::Column::LastName.contains(name)),
            );
        }
        if let Some(diagnosis) = &filter.diagnosis {
            query = query.filter(patients::Column::Diagnosis.contains(diagnosis));
        }
        let models = query
            .order_by_asc(patients::Column::UserId)
            .all(&self.db)
            .await
            .context("list patients")?;
        Ok(models.into_iter().map(patient_from_model).collect())
    }

    async fn find_by_id(&self, id: EntityId) -> Result<Option<Patient>, ApiError> {
        let model = patients::Entity::find_by_id(id.get())
            .one(&self.db)
            .await
            .context("find patient by id")?;
        Ok(model.map(patient_from_model))
    }

    async fn create(&self, user_id: EntityId, patient: &NewPatient) -> Result<Patient, ApiError> {
        let patient = patient.clone();
        let model = self
            .db
            .transaction::<_, patients::Model, ApiError>(|txn| {
                Box::pin(async move { insert_patient(txn, user_id, &patient).await })
            })
            .await
            .map_err(|e| txn_error(e, "create patient"))?;
        Ok(patient_from_model(model))
    }

    async fn update(&self, id: EntityId, patch: &PatientPatch) -> Result<Patient, ApiError> {
        let patch = patch.clone();
        let model = self
            .db
            .transaction::<_, patients::Model, ApiError>(|txn| {
                Box::pin(async move {
                    if let Some(nif) = &patch.nif {
                        if patients::Entity::find_by_id(id.get())
                            .one(txn)
                            .await
                            .context("find patient for update")?
                            .is_none()
                        {
                            return Err(ApiError::NotFound(EntityKind::Patient));
                        }
                        claim_nif(txn, id, nif, Role::Patient).await?;
                    }
                    let mut am = patients::ActiveModel {
                        user_id: Set(id.get()),
                        ..Default::default()
                    };
                    if let Some(first_name) = &patch.first_name {
                        am.first_name = Set(first_name.clone());
                    }
                    if let Some(last_name) = &patch.last_name {
                        am.last_name = Set(last_name.clone());
                    }
                    if let Some(nif) = &patch.nif {
                        am.nif = Set(nif.clone());
                    }
                    if let Some(diagnosis) = &patch.diagnosis {
                        am.diagnosis = Set(Some(diagnosis.clone()));
                    }
                    am.update(txn).await.map_err(|e| {
                        update_error(
                            e,
                            ApiError::NotFound(EntityKind::Patient),
                            Some(ApiError::NifTakenByPatient),
                            "update patient",
                        )
                    })
                })
            })
            .await
            .map_err(|e| txn_error(e, "update patient"))?;
        Ok(patient_from_model(model))
    }

    async fn delete(&self, id: EntityId) -> Result<bool, ApiError> {
        self.db
            .transaction::<_, bool, ApiError>(|txn| {
                Box::pin(async move {
                    let result = patients::Entity::delete_by_id(id.get())
                        .exec(txn)
                        .await
                        .context("delete patient")?;
                    release_nif(txn, id).await?;
                    Ok(result.rows_affected > 0)
                })
            })
            .await
            .map_err(|e| txn_error(e, "delete patient"))
    }
}

impl BatchLookup<Patient> for DbPatientRepository {
    async fn find_many(&self, ids: &[EntityId]) -> Result<Vec<Patient>, ApiError> {
        let models = patients::Entity::find()
            .filter(patients::Column::UserId.is_in(raw_ids(ids)))
            .order_by_asc(patients::Column::UserId)
            .all(&self.db)
            .await
            .context("find patients by ids")?;
        Ok(models.into_iter().map(patient_from_model).collect())
    }
}

fn patient_from_model(model: patients::Model) -> Patient {
    Patient {
        user_id: EntityId::new(model.user_id),
        first_name: model.first_name,
        last_name: model.last_name,
        nif: model.nif,
        diagnosis: model.diagnosis,
    }
}
