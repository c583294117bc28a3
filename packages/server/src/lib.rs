#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the ward map application.
//!
//! Serves ward records and priority rankings under `/v1/tables`, and
//! natural-language questions under `/v1/query/ask`. Every request reads a
//! fresh snapshot: the live JSON-lines file when the ingestion process has
//! produced one, otherwise the static CSV. Data and LLM problems degrade
//! into well-formed JSON bodies; only a missing fallback file at startup is
//! fatal.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use ward_map_ai::config::AiConfig;
use ward_map_ai::resolver::AnswerResolver;
use ward_map_source::SourcePaths;
use ward_map_source::selector::SourceSelector;

/// Number of wards summarized for the ask endpoint.
pub const ASK_TOP_N: usize = 3;

/// Default `n` for the top-priority endpoint.
pub const DEFAULT_TOP_N: usize = 3;

/// Shared application state.
///
/// Holds no data: each request reads its own snapshot through the selector.
pub struct AppState {
    /// Chooses between the live and static sources per request.
    pub selector: Arc<SourceSelector>,
    /// Answers questions, with or without an LLM behind it.
    pub resolver: Arc<AnswerResolver>,
}

/// Listener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind_addr: String,
    /// Port to listen on.
    pub port: u16,
}

impl ServerConfig {
    /// Reads `BIND_ADDR` and `PORT`, defaulting to `0.0.0.0:5000`.
    #[must_use]
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);
        Self { bind_addr, port }
    }
}

/// Registers the API routes.
///
/// Paths are registered without trailing slashes; wrap the app in
/// [`middleware::NormalizePath::trim`] so `/v1/tables/wards/` matches too.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1")
            .route("/health", web::get().to(handlers::health))
            .route("/tables/wards", web::get().to(handlers::wards))
            .route(
                "/tables/highest_priority",
                web::get().to(handlers::highest_priority),
            )
            .route("/tables/top_priority", web::get().to(handlers::top_priority))
            .route("/query/ask", web::post().to(handlers::ask)),
    );
}

/// Checks that the fallback CSV exists before the server starts.
///
/// # Errors
///
/// Returns [`std::io::ErrorKind::NotFound`] if `paths.fallback` is not a file.
pub fn verify_fallback(paths: &SourcePaths) -> std::io::Result<()> {
    if paths.fallback.is_file() {
        return Ok(());
    }
    Err(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("fallback CSV {} not found", paths.fallback.display()),
    ))
}

/// Starts the ward map API server.
///
/// Reads source paths, LLM settings, and listener settings from the
/// environment, verifies the fallback CSV exists, and starts the Actix-Web
/// HTTP server. The caller provides the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the fallback file is missing, the
/// LLM provider cannot be built, or the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let paths = SourcePaths::from_env();
    verify_fallback(&paths).inspect_err(|e| log::error!("{e}"))?;
    log::info!(
        "Serving wards from {} (fallback {})",
        paths.live.display(),
        paths.fallback.display()
    );

    let ai_config = AiConfig::from_env();
    let resolver = AnswerResolver::from_config(&ai_config).map_err(std::io::Error::other)?;
    if resolver.has_provider() {
        log::info!("LLM answers enabled");
    } else {
        log::info!("LLM answers disabled, serving placeholder answers");
    }

    let state = web::Data::new(AppState {
        selector: Arc::new(SourceSelector::from_paths(&paths)),
        resolver: Arc::new(resolver),
    });

    let ServerConfig { bind_addr, port } = ServerConfig::from_env();

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(middleware::NormalizePath::trim())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
