use axum::Router;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use platter_core::auth::token::TokenService;
use platter_core::create_pool;

mod error;
mod handlers;
mod models;

use handlers::{
    ApiDoc, AppState, admin_router, auth_router, order_router, restaurant_router,
};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../platter-core/migrations");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let secret_key = std::env::var("SECRET_KEY").expect("SECRET_KEY required");
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8100".to_string());

    let pool = create_pool(&database_url);
    {
        let mut conn = pool.get()?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| format!("Failed to run migrations: {e}"))?;
    }

    let tokens = match std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES") {
        Ok(minutes) => TokenService::new(&secret_key, chrono::TimeDelta::minutes(minutes.parse()?)),
        Err(_) => TokenService::with_default_ttl(&secret_key),
    };

    let state = AppState { pool, tokens };

    let app = Router::new()
        .merge(auth_router())
        .merge(admin_router())
        .merge(restaurant_router())
        .merge(order_router())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Platter API listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
