use sea_orm::entity::prelude::*;

/// Centre employs therapist. Keyed by `(centre_id, therapist_id)`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "employs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub centre_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub therapist_id: i32,
    pub contract: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::centres::Entity",
        from = "Column::CentreId",
        to = "super::centres::Column::UserId"
    )]
    Centre,
    #[sea_orm(
        belongs_to = "super::therapists::Entity",
        from = "Column::TherapistId",
        to = "super::therapists::Column::UserId"
    )]
    Therapist,
}

impl Related<super::centres::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Centre.def()
    }
}

impl Related<super::therapists::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Therapist.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
