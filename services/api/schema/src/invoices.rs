use sea_orm::entity::prelude::*;

/// Billing header shared by service and course invoices.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub number: String,
    pub invoice_date: Date,
    pub tax_amount: Option<f64>,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::service_invoices::Entity")]
    ServiceInvoice,
    #[sea_orm(has_one = "super::course_invoices::Entity")]
    CourseInvoice,
}

impl Related<super::service_invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceInvoice.def()
    }
}

impl Related<super::course_invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CourseInvoice.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
