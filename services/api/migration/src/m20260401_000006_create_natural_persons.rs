use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// One row per therapist or patient profile. `nif` is unique here, so the
/// namespace shared by both profile tables is enforced by a single constraint.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(NaturalPersons::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NaturalPersons::UserId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(NaturalPersons::Nif)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(NaturalPersons::Kind).string_len(16).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(NaturalPersons::Table, NaturalPersons::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        let db = manager.get_connection();
        db.execute_unprepared(
            "INSERT INTO natural_persons (user_id, nif, kind) \
             SELECT user_id, nif, 'THERAPIST' FROM therapists",
        )
        .await?;
        db.execute_unprepared(
            "INSERT INTO natural_persons (user_id, nif, kind) \
             SELECT user_id, nif, 'PATIENT' FROM patients",
        )
        .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NaturalPersons::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum NaturalPersons {
    Table,
    UserId,
    Nif,
    Kind,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
