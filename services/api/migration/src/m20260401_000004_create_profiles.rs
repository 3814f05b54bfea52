use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Centres::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Centres::UserId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Centres::Cif).string().not_null().unique_key())
                    .col(ColumnDef::new(Centres::Name).string().not_null())
                    .col(ColumnDef::new(Centres::Location).string())
                    .col(ColumnDef::new(Centres::ServiceId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Centres::Table, Centres::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Centres::Table, Centres::ServiceId)
                            .to(Services::Table, Services::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Therapists::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Therapists::UserId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Therapists::FirstName).string().not_null())
                    .col(ColumnDef::new(Therapists::LastName).string().not_null())
                    .col(
                        ColumnDef::new(Therapists::Nif)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Therapists::SocietyId).string())
                    .col(ColumnDef::new(Therapists::Profession).string())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Therapists::Table, Therapists::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Patients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Patients::UserId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Patients::FirstName).string().not_null())
                    .col(ColumnDef::new(Patients::LastName).string().not_null())
                    .col(ColumnDef::new(Patients::Nif).string().not_null().unique_key())
                    .col(ColumnDef::new(Patients::Diagnosis).text())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Patients::Table, Patients::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Patients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Therapists::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Centres::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Centres {
    Table,
    UserId,
    Cif,
    Name,
    Location,
    ServiceId,
}

#[derive(Iden)]
enum Therapists {
    Table,
    UserId,
    FirstName,
    LastName,
    Nif,
    SocietyId,
    Profession,
}

#[derive(Iden)]
enum Patients {
    Table,
    UserId,
    FirstName,
    LastName,
    Nif,
    Diagnosis,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum Services {
    Table,
    Id,
}
