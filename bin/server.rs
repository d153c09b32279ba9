// Lobbyist Registry - Web Server
// JSON API over the same report/mutation service the CLI uses

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use clap::Parser;
use lobbyist_registry::{
    get_lobbyist_detail, logging, num_clients, num_employers, num_lobbyists, open_database,
    register_year, search_lobbyists, set_salutation, top_n_compensated, Config,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
struct AppState {
    // The connection is not safe for concurrent use; requests take turns.
    db: Arc<Mutex<Connection>>,
}

impl AppState {
    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock leaves the connection itself usable
        self.db.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    fn failed(data: T, message: &str) -> Self {
        Self {
            success: false,
            data,
            error: Some(message.to_string()),
        }
    }
}

/// Stats response
#[derive(Serialize)]
struct StatsResponse {
    lobbyists: i64,
    employers: i64,
    clients: i64,
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default = "match_everything")]
    pattern: String,
}

fn match_everything() -> String {
    "%".to_string()
}

#[derive(Deserialize)]
struct TopParams {
    n: u32,
    year: i32,
}

#[derive(Deserialize)]
struct YearBody {
    year: i32,
}

#[derive(Deserialize)]
struct SalutationBody {
    salutation: String,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/stats - Table counts
async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    let conn = state.conn();

    let stats = StatsResponse {
        lobbyists: num_lobbyists(&conn),
        employers: num_employers(&conn),
        clients: num_clients(&conn),
    };

    Json(ApiResponse::ok(stats))
}

/// GET /api/lobbyists?pattern= - Search by first or last name
async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> impl IntoResponse {
    let conn = state.conn();
    Json(ApiResponse::ok(search_lobbyists(&conn, &params.pattern)))
}

/// GET /api/lobbyists/:id - Lobbyist detail
async fn get_detail(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    let conn = state.conn();

    match get_lobbyist_detail(&conn, id) {
        Some(detail) => (StatusCode::OK, Json(ApiResponse::ok(Some(detail)))).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::failed(None::<()>, "No lobbyist with that ID was found.")),
        )
            .into_response(),
    }
}

/// GET /api/top?n=&year= - Top N by compensation
async fn get_top(State(state): State<AppState>, Query(params): Query<TopParams>) -> impl IntoResponse {
    let conn = state.conn();
    Json(ApiResponse::ok(top_n_compensated(&conn, params.n, params.year)))
}

/// POST /api/lobbyists/:id/years - Register a year
async fn post_year(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<YearBody>,
) -> impl IntoResponse {
    let conn = state.conn();
    mutation_response(register_year(&conn, id, body.year))
}

/// PUT /api/lobbyists/:id/salutation - Set or clear the salutation
async fn put_salutation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<SalutationBody>,
) -> impl IntoResponse {
    let conn = state.conn();
    mutation_response(set_salutation(&conn, id, &body.salutation))
}

fn mutation_response(applied: bool) -> axum::response::Response {
    if applied {
        (StatusCode::OK, Json(ApiResponse::ok(true))).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::failed(false, "No lobbyist with that ID was found.")),
        )
            .into_response()
    }
}

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/stats", get(get_stats))
        .route("/lobbyists", get(search))
        .route("/lobbyists/:id", get(get_detail))
        .route("/lobbyists/:id/years", post(post_year))
        .route("/lobbyists/:id/salutation", put(put_salutation))
        .route("/top", get(get_top))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

/// JSON API for the Chicago lobbyist registry.
#[derive(Parser, Debug)]
#[command(name = "lobbyist-server", version, about)]
struct Args {
    /// SQLite database file (overrides the config file)
    #[arg(long, env = "LOBBYIST_DB", value_name = "PATH")]
    db: Option<PathBuf>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:3000")]
    addr: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_from_file(&config_path)?;
    logging::init_stderr_logging(&config.log_level);

    let db_path = config.resolve_database(args.db.as_deref());
    let conn = open_database(&db_path).map_err(|e| {
        error!(%e, path = %db_path.display(), "cannot open database");
        e
    })?;
    info!(path = %db_path.display(), "database opened");

    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
    };

    let listener = tokio::net::TcpListener::bind(&args.addr).await?;
    info!(addr = %args.addr, "server listening");

    axum::serve(listener, router(state)).await?;

    Ok(())
}
