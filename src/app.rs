use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::middleware::{handle_panic, log_failed_requests, token_auth_middleware};
use crate::state::AppState;

/// Build the full HTTP router.
///
/// Layers, outermost first: body size limit, CORS, request tracing, failure
/// logging, panic recovery, token authentication, handlers.
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new()
        .merge(public_routes())
        .merge(bookmark_routes())
        .merge(tag_routes())
        .layer(middleware::from_fn_with_state(state.clone(), token_auth_middleware))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(log_failed_requests));

    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security));
    }

    router
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes))
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/ping", get(public::ping_get))
        .route("/auth/register", post(public::auth::register_post))
        .route("/auth/login", post(public::auth::login_post))
}

fn bookmark_routes() -> Router<AppState> {
    use protected::bookmark;

    Router::new()
        .route("/bookmark", post(bookmark::create_post))
        .route("/bookmark/list", post(bookmark::list_post))
        .route("/bookmark/:id", patch(bookmark::update_patch).delete(bookmark::delete))
}

fn tag_routes() -> Router<AppState> {
    use protected::tag;

    Router::new()
        .route("/tag", get(tag::list_get).post(tag::create_post))
        .route("/tag/:id", patch(tag::update_patch).delete(tag::delete))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
