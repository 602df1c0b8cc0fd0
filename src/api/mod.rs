//! HTTP application layer

mod error;
mod routes;

pub use error::{is_production_mode, set_production_mode, ApiError, ErrorResponse};
pub use routes::{create_router, render_config};
