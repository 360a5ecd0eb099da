mod error;
mod handler;
mod pipelines;
mod router;

pub use error::{ApiError, recover_error};
pub use handler::SERVICE_UNAVAILABLE;
pub use pipelines::Pipelines;
pub use router::routes;
