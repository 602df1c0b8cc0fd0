//! api-rendr - declarative route definitions rendered into an axum router

pub mod config;
pub mod error;
pub mod types;

pub mod parser;
pub mod handler;
pub mod endpoint;
pub mod router;
pub mod api;

pub use config::{Config, RouterConfig};
pub use endpoint::{Endpoint, EndpointDefs};
pub use error::{Error, ParseError, Result};
pub use handler::{Handler, Next};
pub use parser::parse_expression;
pub use router::{render, render_into, Renderer, RouteSink, RouteTable};
pub use types::*;
