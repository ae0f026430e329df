pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;
pub mod ws;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/refresh", post(routes::auth::refresh))
        .route("/me", get(routes::auth::me))
        .route("/me", put(routes::auth::update_me))
        .route("/password", put(routes::auth::change_password))
        .route("/password-reset", post(routes::auth::request_password_reset))
        .route(
            "/password-reset/confirm",
            post(routes::auth::confirm_password_reset),
        );

    let party_routes = Router::new()
        .route("/", get(routes::party::list))
        .route("/", post(routes::party::create))
        .route("/{party_id}", get(routes::party::get))
        .route("/{party_id}/join", post(routes::party::join))
        .route("/{party_id}/invite", post(routes::party::invite))
        .route("/{party_id}/status", put(routes::party::set_status))
        .route("/{party_id}/reopen-request", post(routes::party::reopen_request))
        .route("/{party_id}/coupon", post(routes::coupon::apply))
        .route("/{party_id}/message", post(routes::message::create))
        .route("/{party_id}/product", post(routes::product::add))
        .route("/{party_id}/product/{product_id}", delete(routes::product::remove))
        .route(
            "/{party_id}/product/{product_id}/status",
            put(routes::product::set_status),
        )
        .route(
            "/{party_id}/product/{product_id}/reaction",
            post(routes::product::react),
        )
        .route("/{party_id}/shares", get(routes::payment::shares))
        .route("/{party_id}/payment/order", post(routes::payment::create_order))
        .route("/{party_id}/payment/capture", post(routes::payment::capture));

    let notification_routes = Router::new()
        .route("/", get(routes::notification::list))
        .route("/", delete(routes::notification::clear))
        .route("/read-all", put(routes::notification::mark_all_read))
        .route("/{notification_id}/read", put(routes::notification::mark_read));

    let catalog_routes = Router::new()
        .route("/", get(routes::catalog::get))
        .route("/", put(routes::catalog::replace))
        .route("/", delete(routes::catalog::clear));

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/party", party_routes)
        .nest("/notification", notification_routes)
        .nest("/catalog", catalog_routes);

    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .merge(health)
        .route("/ws", get(ws::handler::ws_upgrade))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
