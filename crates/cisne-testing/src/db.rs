//! Throwaway databases for integration tests.

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use cisne_api_migration::Migrator;

/// Connect to a fresh in-memory SQLite database and run every migration.
///
/// The pool is pinned to one connection: each SQLite `:memory:` connection
/// is its own database.
pub async fn migrated_sqlite() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("connect to in-memory sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}
