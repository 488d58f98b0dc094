//! The API layer, containing web handlers, extractors, middleware and routing.

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use extract::ValidatedJson;
pub use handlers::ApiDoc;
pub use middleware::{PipelineTimeouts, apply_pipeline};
pub use router::{api_routes, create_router};
