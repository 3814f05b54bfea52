use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};

use cisne_api_schema::users;
use cisne_domain::id::EntityId;

use crate::domain::repository::AccountRepository;
use crate::domain::types::{NewAccount, NewProfile, User};
use crate::error::ApiError;
use crate::infra::profile::{insert_centre, insert_patient, insert_therapist};
use crate::infra::{txn_error, write_error};

#[derive(Clone)]
pub struct DbAccountRepository {
    pub db: DatabaseConnection,
}

impl AccountRepository for DbAccountRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_id(&self, id: EntityId) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find_by_id(id.get())
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(user_from_model).transpose()
    }

    async fn list(&self, email_contains: Option<&str>) -> Result<Vec<User>, ApiError> {
        let mut query = users::Entity::find();
        if let Some(fragment) = email_contains {
            query = query.filter(users::Column::Email.contains(fragment));
        }
        let models = query
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await
            .context("list users")?;
        models.into_iter().map(user_from_model).collect()
    }

    async fn register(&self, account: &NewAccount) -> Result<User, ApiError> {
        let model = self
            .db
            .transaction::<_, users::Model, ApiError>(|txn| {
                let account = account.clone();
                Box::pin(async move {
                    let user = users::ActiveModel {
                        email: Set(account.email.clone()),
                        password_hash: Set(account.password_hash.clone()),
                        role: Set(account.profile.role().as_str().to_owned()),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    .map_err(|e| write_error(e, ApiError::EmailTaken, "insert user"))?;

                    let user_id = EntityId::new(user.id);
                    match &account.profile {
                        NewProfile::Centre(centre) => {
                            insert_centre(txn, user_id, centre)
                                .await
                                .map_err(|e| write_error(e, ApiError::CifTaken, "insert centre"))?;
                        }
                        NewProfile::Therapist(therapist) => {
                            insert_therapist(txn, user_id, therapist).await?;
                        }
                        NewProfile::Patient(patient) => {
                            insert_patient(txn, user_id, patient).await?;
                        }
                    }
                    Ok(user)
                })
            })
            .await
            .map_err(|e| txn_error(e, "register account"))?;
        user_from_model(model)
    }

    async fn delete(&self, id: EntityId) -> Result<bool, ApiError> {
        let result = users::Entity::delete_by_id(id.get())
            .exec(&self.db)
            .await
            .context("delete user")?;
        Ok(result.rows_affected > 0)
    }
}

fn user_from_model(model: users::Model) -> Result<User, ApiError> {
    let role = model
        .role
        .parse()
        .with_context(|| format!("stored role of user {}", model.id))?;
    Ok(User {
        id: EntityId::new(model.id),
        email: model.email,
        password_hash: model.password_hash,
        role,
    })
}
