//! Router configuration.

use std::sync::Arc;

use axum::{Router, routing::get};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::app::AppState;

use super::handlers::{
    ApiDoc, create_item_handler, create_user_handler, delete_item_handler, delete_user_handler,
    get_item_handler, get_user_handler, health_check_handler, list_items_handler,
    list_users_handler, not_found_handler, readiness_handler, update_item_handler,
    update_user_handler,
};
use super::middleware::{PipelineTimeouts, apply_pipeline};

/// Routes only, without the request pipeline
pub fn api_routes(app_state: Arc<AppState>) -> Router {
    let v1 = Router::new()
        .route("/users", get(list_users_handler).post(create_user_handler))
        .route(
            "/users/{id}",
            get(get_user_handler)
                .put(update_user_handler)
                .delete(delete_user_handler),
        )
        .route("/items", get(list_items_handler).post(create_item_handler))
        .route(
            "/items/{id}",
            get(get_item_handler)
                .put(update_item_handler)
                .delete(delete_item_handler),
        );

    Router::new()
        .nest("/api/v1", v1)
        .route("/health", get(health_check_handler))
        .route("/health/ready", get(readiness_handler))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(not_found_handler)
        .with_state(app_state)
}

/// Create the application router with the full request pipeline
pub fn create_router(app_state: Arc<AppState>, timeouts: PipelineTimeouts) -> Router {
    apply_pipeline(api_routes(app_state), timeouts)
}
