//! Rendering endpoint definitions into an axum router

mod render;
mod table;

pub use render::{render, render_into, Renderer, RouteSink};
pub use table::{RouteEntry, RouteTable};
