use sea_orm::entity::prelude::*;

/// Therapist published a resource. Keyed by `(therapist_id, resource_id)`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "publish")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub therapist_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub resource_id: i32,
    pub publication_date: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::therapists::Entity",
        from = "Column::TherapistId",
        to = "super::therapists::Column::UserId"
    )]
    Therapist,
    #[sea_orm(
        belongs_to = "super::resources::Entity",
        from = "Column::ResourceId",
        to = "super::resources::Column::Id"
    )]
    Resource,
}

impl Related<super::therapists::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Therapist.def()
    }
}

impl Related<super::resources::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Resource.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
