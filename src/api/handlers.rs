//! HTTP request handlers with OpenAPI documentation.

use std::error::Error as _;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{error, warn};
use utoipa::OpenApi;

use crate::app::AppState;
use crate::domain::{
    AppError, CreateItemRequest, CreateUserRequest, ErrorResponse, HealthResponse, Item, Role,
    UpdateItemRequest, UpdateUserRequest, UserResponse,
};

use super::extract::ValidatedJson;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    info(
        title = "CRUD Service API",
        version = "0.1.0",
        description = "API for managing users and items",
        license(
            name = "MIT"
        )
    ),
    paths(
        list_users_handler,
        get_user_handler,
        create_user_handler,
        update_user_handler,
        delete_user_handler,
        list_items_handler,
        get_item_handler,
        create_item_handler,
        update_item_handler,
        delete_item_handler,
        health_check_handler,
        readiness_handler,
    ),
    components(
        schemas(
            UserResponse,
            CreateUserRequest,
            UpdateUserRequest,
            Role,
            Item,
            CreateItemRequest,
            UpdateItemRequest,
            HealthResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "users", description = "User management endpoints"),
        (name = "items", description = "Item management endpoints"),
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;

/// Parse a path identifier into a non-negative integer.
///
/// Any id that parses is handed to the gateway, so an unknown id such as `0`
/// is a 404 rather than a 400.
pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 0 => Ok(id),
        _ => Err(AppError::invalid_input("Invalid ID format").with_detail("id", raw)),
    }
}

/// List all users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    responses(
        (status = 200, description = "List of users", body = Vec<UserResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = state.users.list_all().await?;
    Ok(Json(users))
}

/// Get a single user by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let id = parse_id(&id)?;
    let user = state.users.get_by_id(id).await?;
    Ok(Json(user))
}

/// Create a new user
///
/// The password is hashed before it is stored and is never returned.
/// `role` defaults to `user`.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_user_handler(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = state.users.create(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Update a user
///
/// Only the fields present in the body are changed.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn update_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let id = parse_id(&id)?;
    let user = state.users.update(id, payload).await?;
    Ok(Json(user))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn delete_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List all items
#[utoipa::path(
    get,
    path = "/api/v1/items",
    tag = "items",
    responses(
        (status = 200, description = "List of items", body = Vec<Item>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_items_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Item>>, AppError> {
    let items = state.items.list_all().await?;
    Ok(Json(items))
}

/// Get a single item by ID
#[utoipa::path(
    get,
    path = "/api/v1/items/{id}",
    tag = "items",
    params(
        ("id" = i64, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item found", body = Item),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_item_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Item>, AppError> {
    let id = parse_id(&id)?;
    let item = state.items.get_by_id(id).await?;
    Ok(Json(item))
}

/// Create a new item
#[utoipa::path(
    post,
    path = "/api/v1/items",
    tag = "items",
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_item_handler(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<CreateItemRequest>,
) -> Result<(StatusCode, Json<Item>), AppError> {
    let item = state.items.create(payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Update an item
#[utoipa::path(
    put,
    path = "/api/v1/items/{id}",
    tag = "items",
    params(
        ("id" = i64, Path, description = "Item ID")
    ),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn update_item_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateItemRequest>,
) -> Result<Json<Item>, AppError> {
    let id = parse_id(&id)?;
    let item = state.items.update(id, payload).await?;
    Ok(Json(item))
}

/// Delete an item
#[utoipa::path(
    delete,
    path = "/api/v1/items/{id}",
    tag = "items",
    params(
        ("id" = i64, Path, description = "Item ID")
    ),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn delete_item_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    state.items.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Liveness check. Never touches the database.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
pub async fn health_check_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Readiness probe
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Database reachable", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn readiness_handler(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    match state.db_client.health_check().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse::ok())),
        Err(e) => {
            warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse::unavailable()),
            )
        }
    }
}

/// Fallback for unmatched routes
pub async fn not_found_handler() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            code: "NOT_FOUND".to_string(),
            message: "The requested resource was not found".to_string(),
            details: None,
        }),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.kind().status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            let mut causes = Vec::new();
            let mut source = self.source();
            while let Some(cause) = source {
                causes.push(cause.to_string());
                source = cause.source();
            }
            error!(
                code = %self.kind(),
                message = %self.message(),
                causes = ?causes,
                "Server error"
            );
        }

        (status, Json(self.to_response())).into_response()
    }
}
