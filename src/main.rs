mod auth;
mod dao;
mod model;
mod page;
mod routes;
mod state;
mod utils;

use auth::auth;
use axum::middleware::from_fn_with_state;
use axum::routing::put;
use axum::{serve, Router};
use dao::{KeyValueStore, PgStore};
use dotenvy::dotenv;
use routes::{dispatch, update_promo};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use state::AppState;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use utils::{get_env, get_env_or};

const DEFAULT_TRACING_LEVEL: &str = "promo_page=debug";
const DATABASE_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_ASSETS_DIR: &str = "public";
const ADMIN_PROMO_PATH: &str = "/admin/promo";

#[tokio::main]
async fn main() {
    _ = dotenv();
    let database_url = get_env("DATABASE_URL");
    let server_address = get_env("SERVER_ADDRESS");
    let api_key_digest = get_env("ENCRYPTED_API_KEY");
    let assets_dir = get_env_or("ASSETS_DIR", DEFAULT_ASSETS_DIR);
    configure_tracing();
    let db_connection_pool = create_db_connection_pool(&database_url).await;
    let state = AppState::new(PgStore::new(db_connection_pool), &assets_dir, api_key_digest);
    tracing::info!("Serving assets from: {}", assets_dir);
    let listener = create_listener(&server_address).await;
    serve(listener, create_router(state))
        .await
        .expect("Server failed to start");
}

fn configure_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or(DEFAULT_TRACING_LEVEL.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn create_db_connection_pool(database_url: &str) -> Pool<Postgres> {
    PgPoolOptions::new()
        .max_connections(DATABASE_MAX_CONNECTIONS)
        .connect(database_url)
        .await
        .expect("Creating database connection pool failed")
}

async fn create_listener(server_address: &str) -> TcpListener {
    let listener = TcpListener::bind(&server_address)
        .await
        .expect("Creating tcp listener failed");
    tracing::info!("Listening on address: {}", server_address);
    listener
}

fn create_router<S: KeyValueStore>(state: AppState<S>) -> Router {
    Router::new()
        .route(
            ADMIN_PROMO_PATH,
            put(update_promo::<S>)
                .route_layer(from_fn_with_state(state.clone(), auth::<S>))
                .fallback(dispatch::<S>),
        )
        .fallback(dispatch::<S>)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
