//! Application layer containing business logic and shared state.

pub mod item_service;
pub mod password;
pub mod service;
pub mod state;
pub mod user_service;

pub use item_service::ItemService;
pub use password::PasswordHasher;
pub use service::{DEFAULT_OPERATION_TIMEOUT, ServiceConfig};
pub use state::AppState;
pub use user_service::UserService;
