//! Photo Gallery Backend
//!
//! A REST backend serving categorized images and visitor comments from a
//! flat-file JSON store, with a single shared admin password for uploads and
//! edits.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod uploads;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::SessionStore;
use config::{Config, LogFormat};
use db::{Repository, Store};
use errors::AppError;
use uploads::{UploadStore, UPLOADS_ROUTE};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub sessions: Arc<SessionStore>,
    pub uploads: Arc<UploadStore>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Open the store and uploads directory described by `config`.
    pub async fn from_config(config: Config) -> Result<Self, AppError> {
        let store = Store::open(&config.db_path).await?;
        let uploads = Arc::new(UploadStore::open(&config.uploads_dir).await?);
        let repo = Arc::new(Repository::new(store, uploads.clone()));
        let sessions = Arc::new(SessionStore::new(
            config.admin_password.clone(),
            config.session_ttl,
        ));

        Ok(Self {
            repo,
            sessions,
            uploads,
            config: Arc::new(config),
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }

    tracing::info!("Starting Photo Gallery Backend");
    tracing::info!("Public dir: {:?}", config.public_dir);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.uses_default_password() {
        tracing::warn!(
            "GALLERY_ADMIN_PASSWORD is not set; the default admin password is in use!"
        );
    }

    let bind_addr = config.bind_addr;
    let state = AppState::from_config(config).await?;
    tracing::info!("Store path: {:?}", state.repo.store().path());
    tracing::info!("Uploads dir: {:?}", state.uploads.dir());

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.config.uploads_dir);
    let public = ServeDir::new(&state.config.public_dir);
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        // Images
        .route("/upload", post(api::upload_images))
        .route("/images", get(api::list_images))
        .route("/images/{id}", put(api::update_image).delete(api::delete_image))
        // Comments
        .route("/comments", get(api::list_comments).post(api::add_comment))
        // Session
        .route("/login", post(api::login))
        .route("/logout", get(api::logout))
        .route("/isAdmin", get(api::is_admin))
        // Health check
        .route("/health", get(health_check))
        // Static files
        .nest_service(UPLOADS_ROUTE, uploads)
        .fallback_service(public)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
