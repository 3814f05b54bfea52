use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Invoices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Invoices::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Invoices::Number)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Invoices::InvoiceDate).date().not_null())
                    .col(ColumnDef::new(Invoices::TaxAmount).double())
                    .col(ColumnDef::new(Invoices::PaymentMethod).string())
                    .col(ColumnDef::new(Invoices::PaymentStatus).string())
                    .to_owned(),
            )
            .await?;

        for table in [InvoiceKind::ServiceInvoices, InvoiceKind::CourseInvoices] {
            manager
                .create_table(
                    Table::create()
                        .table(table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InvoiceKind::InvoiceId)
                                .integer()
                                .not_null()
                                .primary_key(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .from(table, InvoiceKind::InvoiceId)
                                .to(Invoices::Table, Invoices::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [InvoiceKind::CourseInvoices, InvoiceKind::ServiceInvoices] {
            manager
                .drop_table(Table::drop().table(table).to_owned())
                .await?;
        }
        manager
            .drop_table(Table::drop().table(Invoices::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Invoices {
    Table,
    Id,
    Number,
    InvoiceDate,
    TaxAmount,
    PaymentMethod,
    PaymentStatus,
}

#[derive(Iden, Clone, Copy)]
enum InvoiceKind {
    ServiceInvoices,
    CourseInvoices,
    InvoiceId,
}
