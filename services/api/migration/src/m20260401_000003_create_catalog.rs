use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Services::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Services::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Services::InvoiceId).integer())
                    .col(ColumnDef::new(Services::Name).string().not_null())
                    .col(ColumnDef::new(Services::Price).double())
                    .col(ColumnDef::new(Services::Tools).string())
                    .col(ColumnDef::new(Services::Room).string())
                    .col(ColumnDef::new(Services::ServiceDate).date())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Services::Table, Services::InvoiceId)
                            .to(ServiceInvoices::Table, ServiceInvoices::InvoiceId)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Courses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Courses::InvoiceId).integer())
                    .col(ColumnDef::new(Courses::Name).string().not_null())
                    .col(ColumnDef::new(Courses::Teacher).string())
                    .col(ColumnDef::new(Courses::Price).double())
                    .col(ColumnDef::new(Courses::CourseType).string())
                    .col(ColumnDef::new(Courses::Description).text())
                    .col(ColumnDef::new(Courses::CourseDate).date())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Courses::Table, Courses::InvoiceId)
                            .to(CourseInvoices::Table, CourseInvoices::InvoiceId)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Resources::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Resources::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Resources::Name).string().not_null())
                    .col(ColumnDef::new(Resources::ResourceType).string())
                    .col(ColumnDef::new(Resources::Description).text())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Resources::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Services::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Services {
    Table,
    Id,
    InvoiceId,
    Name,
    Price,
    Tools,
    Room,
    ServiceDate,
}

#[derive(Iden)]
enum Courses {
    Table,
    Id,
    InvoiceId,
    Name,
    Teacher,
    Price,
    CourseType,
    Description,
    CourseDate,
}

#[derive(Iden)]
enum Resources {
    Table,
    Id,
    Name,
    ResourceType,
    Description,
}

#[derive(Iden)]
enum ServiceInvoices {
    Table,
    InvoiceId,
}

#[derive(Iden)]
enum CourseInvoices {
    Table,
    InvoiceId,
}
