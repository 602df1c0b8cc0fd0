//! Application router built from a [`Config`]

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::endpoint::{load_document, serve_dir, Endpoint, EndpointDefs};
use crate::error::Result;
use crate::router::Renderer;

/// Render the configured endpoint document and static directories
pub fn render_config(config: &Config) -> Result<Renderer> {
    let mut renderer = Renderer::new(config.router);

    if let Some(path) = &config.endpoints {
        let defs = EndpointDefs::from_document(load_document(path)?)?;
        tracing::info!("Rendering {} endpoint entries from {:?}", defs.len(), path);
        renderer.render(&defs, &config.mount_path)?;
    }

    let statics: EndpointDefs = config
        .static_dirs
        .iter()
        .map(|mount| -> (String, Endpoint) { (mount.route.clone(), serve_dir(&mount.dir)) })
        .collect();
    renderer.render(&statics, &config.mount_path)?;

    Ok(renderer)
}

/// Create the application router
pub fn create_router(config: &Config) -> Result<Router> {
    let router = render_config(config)?.into_router()?;
    Ok(router.layer(TraceLayer::new_for_http()))
}
