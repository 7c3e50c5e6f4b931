//! HTTP server for the stuff scheduling API.
//!
//! Run from repo root: `cargo run -p stuff-scheduling-server`

use stuff_scheduling::config::StoreBackend;
use stuff_scheduling::{app, apply_migrations, entities, AppState, Settings};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("stuff_scheduling=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let model = entities::model()?;

    let state = match settings.store {
        StoreBackend::Memory => {
            tracing::warn!("using the in-memory store; data is lost on exit");
            AppState::in_memory(settings.app_name.as_str(), model)
        }
        StoreBackend::Postgres => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(settings.max_connections)
                .connect(&settings.database_url)
                .await?;
            if settings.run_migrations {
                apply_migrations(&pool, &settings.db_schema, &model).await?;
            }
            AppState::postgres(settings.app_name.as_str(), model, pool, &settings.db_schema)
        }
    };
    let router = app(state).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(settings.bind_addr.as_str()).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
