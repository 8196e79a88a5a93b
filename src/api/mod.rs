pub mod request;
pub mod response;
pub mod routes;

pub use request::BatchEvaluateRequest;
pub use response::{BatchEvaluateResponse, ErrorResponse, HealthResponse, ReadyResponse};
pub use routes::{create_router, AppState};
