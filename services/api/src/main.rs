use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use cisne_api::config::ApiConfig;
use cisne_api::router::build_router;
use cisne_api::state::AppState;
use cisne_api_migration::Migrator;
use cisne_auth_types::token::TokenSettings;
use cisne_core::config::Config;
use cisne_core::tracing::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = ApiConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    if config.run_migrations {
        Migrator::up(&db, None)
            .await
            .expect("failed to apply migrations");
        info!("database migrations applied");
    }

    let state = AppState {
        db,
        tokens: TokenSettings::new(config.jwt_secret.clone(), config.jwt_ttl()),
    };

    let router = build_router(state, &config.cors_allowed_origins);
    let http_addr = format!("0.0.0.0:{}", config.api_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("cisne api listening on {http_addr}");
    axum::serve(listener, router).await.expect("server error");
}
