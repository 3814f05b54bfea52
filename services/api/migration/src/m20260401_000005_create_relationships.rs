use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

enum Payload {
    Text(Links),
    Date(Links),
}

/// One join table: `(left column, referenced table)`, same for the right side,
/// plus the optional payload column.
struct LinkTable {
    table: Links,
    left: (Links, Endpoints, Endpoints),
    right: (Links, Endpoints, Endpoints),
    payload: Option<Payload>,
}

const LINK_TABLES: [LinkTable; 7] = [
    LinkTable {
        table: Links::Employs,
        left: (Links::CentreId, Endpoints::Centres, Endpoints::UserId),
        right: (Links::TherapistId, Endpoints::Therapists, Endpoints::UserId),
        payload: Some(Payload::Text(Links::Contract)),
    },
    LinkTable {
        table: Links::Treats,
        left: (Links::TherapistId, Endpoints::Therapists, Endpoints::UserId),
        right: (Links::PatientId, Endpoints::Patients, Endpoints::UserId),
        payload: Some(Payload::Text(Links::Report)),
    },
    LinkTable {
        table: Links::Pays,
        left: (Links::PatientId, Endpoints::Patients, Endpoints::UserId),
        right: (Links::ServiceId, Endpoints::Services, Endpoints::Id),
        payload: None,
    },
    LinkTable {
        table: Links::Posts,
        left: (Links::CentreId, Endpoints::Centres, Endpoints::UserId),
        right: (Links::CourseId, Endpoints::Courses, Endpoints::Id),
        payload: Some(Payload::Date(Links::PostDate)),
    },
    LinkTable {
        table: Links::Buys,
        left: (Links::TherapistId, Endpoints::Therapists, Endpoints::UserId),
        right: (Links::CourseId, Endpoints::Courses, Endpoints::Id),
        payload: Some(Payload::Date(Links::BuyingDate)),
    },
    LinkTable {
        table: Links::Publish,
        left: (Links::TherapistId, Endpoints::Therapists, Endpoints::UserId),
        right: (Links::ResourceId, Endpoints::Resources, Endpoints::Id),
        payload: Some(Payload::Date(Links::PublicationDate)),
    },
    LinkTable {
        table: Links::Consume,
        left: (Links::PatientId, Endpoints::Patients, Endpoints::UserId),
        right: (Links::ResourceId, Endpoints::Resources, Endpoints::Id),
        payload: None,
    },
];

fn create_statement(link: &LinkTable) -> TableCreateStatement {
    let (left_col, left_table, left_key) = link.left;
    let (right_col, right_table, right_key) = link.right;

    let mut stmt = Table::create();
    stmt.table(link.table)
        .if_not_exists()
        .col(ColumnDef::new(left_col).integer().not_null())
        .col(ColumnDef::new(right_col).integer().not_null());
    match link.payload {
        Some(Payload::Text(col)) => {
            stmt.col(ColumnDef::new(col).text().not_null());
        }
        Some(Payload::Date(col)) => {
            stmt.col(ColumnDef::new(col).date().not_null());
        }
        None => {}
    }
    stmt.primary_key(Index::create().col(left_col).col(right_col))
        .foreign_key(
            ForeignKey::create()
                .from(link.table, left_col)
                .to(left_table, left_key)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .from(link.table, right_col)
                .to(right_table, right_key)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

/// Lookups by the right endpoint (e.g. "who posts this course") cannot use
/// the composite primary key, so each table gets a secondary index.
fn right_index(link: &LinkTable) -> IndexCreateStatement {
    let (right_col, _, _) = link.right;
    Index::create()
        .if_not_exists()
        .name(format!(
            "idx_{}_{}",
            link.table.to_string(),
            right_col.to_string()
        ))
        .table(link.table)
        .col(right_col)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for link in &LINK_TABLES {
            manager.create_table(create_statement(link)).await?;
            manager.create_index(right_index(link)).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for link in LINK_TABLES.iter().rev() {
            manager
                .drop_table(Table::drop().table(link.table).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(Iden, Clone, Copy)]
enum Links {
    Employs,
    Treats,
    Pays,
    Posts,
    Buys,
    Publish,
    Consume,
    CentreId,
    TherapistId,
    PatientId,
    ServiceId,
    CourseId,
    ResourceId,
    Contract,
    Report,
    PostDate,
    BuyingDate,
    PublicationDate,
}

#[derive(Iden, Clone, Copy)]
enum Endpoints {
    Centres,
    Therapists,
    Patients,
    Services,
    Courses,
    Resources,
    UserId,
    Id,
}
