pub mod routes;
pub mod state;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/participants", get(routes::participants))
        .route("/api/report", get(routes::report))
        .route("/api/sentiment/{value}", get(routes::sentiment))
        .route("/api/contribution/{value}", get(routes::contribution))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
