use sea_orm_migration::prelude::*;

mod m20260401_000001_create_users;
mod m20260401_000002_create_invoices;
mod m20260401_000003_create_catalog;
mod m20260401_000004_create_profiles;
mod m20260401_000005_create_relationships;
mod m20260401_000006_create_natural_persons;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260401_000001_create_users::Migration),
            Box::new(m20260401_000002_create_invoices::Migration),
            Box::new(m20260401_000003_create_catalog::Migration),
            Box::new(m20260401_000004_create_profiles::Migration),
            Box::new(m20260401_000005_create_relationships::Migration),
            Box::new(m20260401_000006_create_natural_persons::Migration),
        ]
    }
}
