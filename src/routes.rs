use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        disputes::dispute_handler, offers::offer_handler, orders::order_handler,
        reviews::review_handler,
    },
    middleware::auth,
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest("/offers", offer_handler().layer(middleware::from_fn(auth)))
        .nest("/orders", order_handler().layer(middleware::from_fn(auth)))
        .nest(
            "/disputes",
            dispute_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/reviews",
            review_handler().layer(middleware::from_fn(auth)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
}
