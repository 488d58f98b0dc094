//! Domain layer containing core business types, traits, and error definitions.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{AppError, BoxError, ErrorKind, ErrorResponse};
pub use traits::{DatabaseClient, ItemRepository, UserRepository};
pub use types::{
    CreateItemRequest, CreateUserRequest, HealthResponse, Item, Role, UpdateItemRequest,
    UpdateUserRequest, User, UserResponse,
};
