use sea_orm::entity::prelude::*;

/// Bookable clinical service.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "services")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub invoice_id: Option<i32>,
    pub name: String,
    pub price: Option<f64>,
    pub tools: Option<String>,
    pub room: Option<String>,
    pub service_date: Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::service_invoices::Entity",
        from = "Column::InvoiceId",
        to = "super::service_invoices::Column::InvoiceId"
    )]
    ServiceInvoice,
}

impl Related<super::service_invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceInvoice.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
