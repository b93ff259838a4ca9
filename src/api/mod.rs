pub mod handlers;
pub mod routes;

pub use handlers::{ApiError, AppState, DataResponse, ErrorResponse};
pub use routes::create_api_router;
