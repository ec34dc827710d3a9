use axum::{
    http::Method,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers;
use crate::middleware::require_session;
use crate::state::AppState;

/// Builds the service router. Rate limiting is layered on by the binary so
/// in-process tests can drive the router without peer-address plumbing.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/credentials", post(handlers::auth::create_credentials))
        .route("/login", post(handlers::auth::login))
        .route("/token", post(handlers::auth::refresh))
        .route(
            "/auth/passcode/{user_id}/verify-passcode",
            put(handlers::passcodes::verify_passcode),
        )
        .route(
            "/auth/passcode/{user_id}/reset-passcode",
            put(handlers::passcodes::reset_passcode),
        )
        .route("/password/verify", post(handlers::passwords::verify_password))
        .route(
            "/password/forgot-password",
            post(handlers::passwords::forgot_password),
        )
        .route(
            "/password/reset-password",
            put(handlers::passwords::reset_password),
        )
        .route(
            "/data/{user_id}",
            delete(handlers::data_deletion::delete_user_data),
        );

    let session_routes = Router::new()
        .route("/logout/{user_id}", post(handlers::auth::logout))
        .route(
            "/password/{user_id}/update-password",
            put(handlers::passwords::update_password),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::PUT,
                            Method::DELETE,
                            Method::OPTIONS,
                        ])
                        .allow_headers(Any)
                        .max_age(std::time::Duration::from_secs(24 * 60 * 60)),
                ),
        )
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}
