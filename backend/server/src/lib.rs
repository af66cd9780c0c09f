//! Documentation of the restaurant map backend.
//!
//! Serves restaurants and dishes to the map front end as JSON.
//!
//!
//!
//! # Data Sources
//!
//! Picked once at startup with `DATA_SOURCE`.
//!
//! - `snapshot` (default): `restaurants.json` and `dishes.json` read from
//!   `SNAPSHOT_DIR`, or fetched from `SNAPSHOT_URL`, then kept in memory
//! - `database`: MySQL, queried on every request
//!
//! If the source is broken at startup the server still comes up. Requests
//! that need the catalog answer 500 with the reason until it is fixed and the
//! server restarted. `/health` reports the same.
//!
//!
//!
//! # Endpoints
//!
//! | Path | Notes |
//! |---|---|
//! | `GET /api/restaurants` | highest rating first |
//! | `GET /api/restaurants/:id` | 404 when unknown |
//! | `GET /api/restaurants/:id/menu` | empty when unknown |
//! | `GET /api/dishes` | `search`, `category`, `min_price`, `max_price` |
//! | `GET /api/dishes/:id` | 404 when unknown |
//! | `GET /api/dishes/:id/restaurants` | empty when unknown |
//! | `GET /api/search` | `query` (comma separated), `type` |
//! | `GET /health` | source and counts |
//!
//!
//!
//! # Logging
//!
//! `RUST_LOG` drives the filter, e.g. `RUST_LOG=menumap=debug,bank=debug`.
//! Build with `--features verbose` to also trace every request.
//!
//!
//!
//! # Setup
//!
//! Serve the bundled snapshot.
//! ```sh
//! RUST_LOG=info cargo run -p backend
//! ```
//!
//! Serve from MySQL.
//! ```sh
//! mysql < backend/server/sql/schema.sql
//! DATA_SOURCE=database DB_HOST=127.0.0.1 DB_USER=map cargo run -p backend
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    routing::get,
};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod database;
pub mod error;
pub mod routes;
pub mod search;
pub mod state;
pub mod store;
pub mod utils;

use routes::{
    dish_handler, dish_restaurants_handler, dishes_handler, health_handler, menu_handler,
    not_found_handler, restaurant_handler, restaurants_handler, search_handler,
};
use state::AppState;

pub async fn start_server() -> std::io::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await;

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!(
        "Server running on {address}, serving from {}",
        state.store.source()
    );

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");

    Ok(())
}

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .route("/api/restaurants", get(restaurants_handler))
        .route("/api/restaurants/:id", get(restaurant_handler))
        .route("/api/restaurants/:id/menu", get(menu_handler))
        .route("/api/dishes", get(dishes_handler))
        .route("/api/dishes/:id", get(dish_handler))
        .route("/api/dishes/:id/restaurants", get(dish_restaurants_handler))
        .route("/api/search", get(search_handler))
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        .layer(SetResponseHeaderLayer::overriding(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        ))
        .layer(cors)
        .with_state(state);

    #[cfg(feature = "verbose")]
    let app = app.layer(tower_http::trace::TraceLayer::new_for_http());

    app
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
