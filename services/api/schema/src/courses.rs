use sea_orm::entity::prelude::*;

/// Training course offered by centres and bought by therapists.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub invoice_id: Option<i32>,
    pub name: String,
    pub teacher: Option<String>,
    pub price: Option<f64>,
    pub course_type: Option<String>,
    pub description: Option<String>,
    pub course_date: Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course_invoices::Entity",
        from = "Column::InvoiceId",
        to = "super::course_invoices::Column::InvoiceId"
    )]
    CourseInvoice,
}

impl Related<super::course_invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CourseInvoice.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
