//! Tree renderer
//!
//! Walks an [`EndpointDefs`] tree and registers every leaf on a
//! [`RouteSink`]. Sub-trees are rendered with the parent's key appended to
//! the mount path, onto the same sink.

use axum::Router;
use serde_json::Value;
use tower_http::services::ServeDir;
use tracing::debug;

use super::table::RouteTable;
use crate::config::RouterConfig;
use crate::endpoint::{value_kind, Endpoint, EndpointDefs};
use crate::error::{Error, Result};
use crate::handler::Handler;
use crate::parser::parse_expression;
use crate::types::{HttpMethod, ResolvedEndpoint};

/// Target of route registrations
pub trait RouteSink<S> {
    /// Bind `handler` to `method` on `route`, after anything already bound there
    fn register(&mut self, method: HttpMethod, route: &str, handler: Handler<S>);

    /// Serve `dir` under `route` for every method
    fn mount_static(&mut self, route: &str, dir: ServeDir);
}

/// Register every entry of `defs` below `mount_path`.
///
/// Stops at the first bad entry. Entries registered before it stay
/// registered.
pub fn render_into<S, K>(sink: &mut K, defs: &EndpointDefs<S>, mount_path: &str) -> Result<()>
where
    K: RouteSink<S> + ?Sized,
    S: Clone + Send + Sync + 'static,
{
    for (expression, endpoint) in defs.iter() {
        render_entry(sink, expression, endpoint, mount_path)?;
    }
    Ok(())
}

fn render_entry<S, K>(sink: &mut K, expression: &str, endpoint: &Endpoint<S>, mount_path: &str) -> Result<()>
where
    K: RouteSink<S> + ?Sized,
    S: Clone + Send + Sync + 'static,
{
    match endpoint {
        Endpoint::Handler(handler) => {
            let resolved = parse_expression(expression, mount_path)?;
            let method = resolved.method_or_all();
            debug!("{} {} FN {}", method, resolved.route, handler.name());
            sink.register(method, &resolved.route, handler.clone());
        }
        Endpoint::Chain(handlers) => {
            let resolved = parse_expression(expression, mount_path)?;
            let method = resolved.method_or_all();
            debug!("ROUTE {} MULTI-HANDLERS ({})", resolved.route, handlers.len());
            for handler in handlers {
                debug!("+ {} {} FN {}", method, resolved.route, handler.name());
                sink.register(method, &resolved.route, handler.clone());
            }
        }
        Endpoint::Fixed(body) => {
            let resolved = parse_expression(expression, mount_path)?;
            register_fixed(sink, &resolved, body);
        }
        Endpoint::Nested(defs) => {
            let mount = nested_mount_path(mount_path, expression);
            debug!("ROUTE {} (RECURSIVE)", mount);
            render_into(sink, defs, &mount)?;
        }
        Endpoint::Static(dir) => {
            let resolved = parse_expression(expression, mount_path)?;
            debug!("{} STATIC", resolved.route);
            sink.mount_static(&resolved.route, dir.clone());
        }
        Endpoint::Document(value) => render_document(sink, expression, value, mount_path)?,
    }
    Ok(())
}

/// Strings are fixed bodies, objects are sub-trees, anything else is an error
fn render_document<S, K>(sink: &mut K, expression: &str, value: &Value, mount_path: &str) -> Result<()>
where
    K: RouteSink<S> + ?Sized,
    S: Clone + Send + Sync + 'static,
{
    match value {
        Value::String(body) => {
            let resolved = parse_expression(expression, mount_path)?;
            register_fixed(sink, &resolved, body);
        }
        Value::Object(entries) => {
            let mount = nested_mount_path(mount_path, expression);
            debug!("ROUTE {} (RECURSIVE)", mount);
            for (key, value) in entries {
                render_document(sink, key, value, &mount)?;
            }
        }
        other => {
            return Err(Error::UnexpectedValue {
                expression: expression.to_string(),
                found: value_kind(other),
            })
        }
    }
    Ok(())
}

fn register_fixed<S, K>(sink: &mut K, resolved: &ResolvedEndpoint, body: &str)
where
    K: RouteSink<S> + ?Sized,
    S: Clone + Send + Sync + 'static,
{
    let method = resolved.method_or_all();
    debug!("{} {} FIXED STRING {}", method, resolved.route, preview(body));
    sink.register(method, &resolved.route, Handler::text(body));
}

/// The key of a nested entry is a literal path fragment, never a method
fn nested_mount_path(mount_path: &str, expression: &str) -> String {
    format!("{}{}", mount_path.trim(), expression.trim())
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(40) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}

/// Renders definitions into one [`RouteTable`] and hands back the router
pub struct Renderer<S = ()> {
    table: RouteTable<S>,
}

impl<S> Default for Renderer<S> {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

impl<S> Renderer<S> {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            table: RouteTable::new(config),
        }
    }

    /// Routes registered so far
    pub fn table(&self) -> &RouteTable<S> {
        &self.table
    }
}

impl<S> Renderer<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Register `defs` below `mount_path`.
    ///
    /// Calling this again adds to the same table; repeated bindings are
    /// kept in order, not replaced.
    pub fn render(&mut self, defs: &EndpointDefs<S>, mount_path: &str) -> Result<&mut Self> {
        render_into(&mut self.table, defs, mount_path)?;
        Ok(self)
    }

    pub fn into_router(self) -> Result<Router<S>> {
        self.table.into_router()
    }
}

/// Render `defs` with the default router options
pub fn render<S>(defs: &EndpointDefs<S>) -> Result<Router<S>>
where
    S: Clone + Send + Sync + 'static,
{
    let mut renderer = Renderer::default();
    renderer.render(defs, "")?;
    renderer.into_router()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;
    use serde_json::json;

    /// Records registrations instead of building a router
    #[derive(Default)]
    struct Recorder {
        routes: Vec<(HttpMethod, String, &'static str)>,
        statics: Vec<String>,
    }

    impl RouteSink<()> for Recorder {
        fn register(&mut self, method: HttpMethod, route: &str, handler: Handler<()>) {
            self.routes.push((method, route.to_string(), handler.name()));
        }

        fn mount_static(&mut self, route: &str, _dir: ServeDir) {
            self.statics.push(route.to_string());
        }
    }

    impl Recorder {
        fn bindings(&self) -> Vec<(HttpMethod, &str)> {
            self.routes.iter().map(|(m, r, _)| (*m, r.as_str())).collect()
        }
    }

    fn named(name: &'static str) -> Handler<()> {
        Handler::middleware(move |_req, _next| async move { name }).with_name(name)
    }

    #[test]
    fn test_nested_paths_compose() {
        let defs: EndpointDefs = EndpointDefs::new().entry(
            "/orders",
            EndpointDefs::new().entry("/items", EndpointDefs::new().entry("GET /detail", named("detail"))),
        );

        let mut sink = Recorder::default();
        render_into(&mut sink, &defs, "").unwrap();
        assert_eq!(sink.bindings(), vec![(HttpMethod::Get, "/orders/items/detail")]);
    }

    #[test]
    fn test_orders_example_tree() {
        let defs: EndpointDefs = crate::endpoints! {
            "ALL /" => "Try endpoint /orders",
            "/orders" => crate::endpoints! {
                "POST" => named("create"),
                "GET" => named("list"),
                "/:ordId" => crate::endpoints! {
                    "GET" => named("get"),
                    "/items" => crate::endpoints! {
                        "GET" => named("items"),
                        "/detail" => crate::endpoints! {
                            "GET" => "Not implemented yet!",
                        },
                    },
                },
            },
            "ALL /help" => "This is the help to show...",
        };

        let mut sink = Recorder::default();
        render_into(&mut sink, &defs, "").unwrap();
        assert_eq!(
            sink.bindings(),
            vec![
                (HttpMethod::All, "/"),
                (HttpMethod::Post, "/orders"),
                (HttpMethod::Get, "/orders"),
                (HttpMethod::Get, "/orders/:ordId"),
                (HttpMethod::Get, "/orders/:ordId/items"),
                (HttpMethod::Get, "/orders/:ordId/items/detail"),
                (HttpMethod::All, "/help"),
            ]
        );
    }

    #[test]
    fn test_nested_key_is_not_parsed_as_method() {
        let defs: EndpointDefs = EndpointDefs::new().entry("GET", EndpointDefs::new().entry("POST /x", named("x")));

        let mut sink = Recorder::default();
        render_into(&mut sink, &defs, "/api").unwrap();
        assert_eq!(sink.bindings(), vec![(HttpMethod::Post, "/apiGET/x")]);
    }

    fn chain_names(handlers: Vec<Handler<()>>) -> Vec<&'static str> {
        let defs: EndpointDefs = EndpointDefs::new().entry("PUT /orders/:id", handlers);

        let mut sink = Recorder::default();
        render_into(&mut sink, &defs, "").unwrap();
        assert!(sink
            .routes
            .iter()
            .all(|(m, r, _)| *m == HttpMethod::Put && r == "/orders/:id"));
        sink.routes.iter().map(|(_, _, name)| *name).collect()
    }

    #[test]
    fn test_chain_registers_in_order() {
        assert_eq!(
            chain_names(vec![named("auth"), named("validate"), named("save")]),
            vec!["auth", "validate", "save"]
        );
        assert_eq!(
            chain_names(vec![named("save"), named("auth"), named("validate")]),
            vec!["save", "auth", "validate"]
        );
    }

    #[test]
    fn test_chain_without_middle_handler() {
        assert_eq!(
            chain_names(vec![named("auth"), named("save")]),
            vec!["auth", "save"]
        );
    }

    #[test]
    fn test_path_only_leaf_uses_wildcard_method() {
        let defs: EndpointDefs = EndpointDefs::new()
            .entry("/ping", "pong")
            .entry("/handler", named("h"));

        let mut sink = Recorder::default();
        render_into(&mut sink, &defs, "").unwrap();
        assert_eq!(
            sink.bindings(),
            vec![(HttpMethod::All, "/ping"), (HttpMethod::All, "/handler")]
        );
    }

    #[test]
    fn test_static_mount_uses_resolved_route() {
        let defs: EndpointDefs = EndpointDefs::new().entry(
            "/app",
            EndpointDefs::new().entry("/assets", ServeDir::new("public")),
        );

        let mut sink = Recorder::default();
        render_into(&mut sink, &defs, "").unwrap();
        assert!(sink.routes.is_empty());
        assert_eq!(sink.statics, vec!["/app/assets"]);
    }

    #[test]
    fn test_parse_error_keeps_earlier_entries() {
        let defs: EndpointDefs = EndpointDefs::new()
            .entry("GET /first", "1")
            .entry("GET", "no mount path")
            .entry("GET /third", "3");

        let mut sink = Recorder::default();
        let err = render_into(&mut sink, &defs, "").unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(ref e) if e.kind == ParseErrorKind::MissingMountPath
        ));
        assert_eq!(sink.bindings(), vec![(HttpMethod::Get, "/first")]);
    }

    #[test]
    fn test_error_in_nested_tree_propagates() {
        let defs: EndpointDefs = EndpointDefs::new()
            .entry("GET /a", "a")
            .entry("/deep", EndpointDefs::new().entry("FETCH /b", "b"))
            .entry("GET /c", "c");

        let mut sink = Recorder::default();
        let err = render_into(&mut sink, &defs, "").unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(ref e) if e.kind == ParseErrorKind::UnknownMethod("fetch".into())
        ));
        assert_eq!(sink.bindings(), vec![(HttpMethod::Get, "/a")]);
    }

    #[test]
    fn test_document_values() {
        let defs: EndpointDefs = EndpointDefs::from_document(json!({
            "GET /": "Welcome",
            "/api": {
                "GET /status": "OK",
                "GET /version": "1.0.0",
            },
        }))
        .unwrap();

        let mut sink = Recorder::default();
        render_into(&mut sink, &defs, "").unwrap();
        assert_eq!(
            sink.bindings(),
            vec![
                (HttpMethod::Get, "/"),
                (HttpMethod::Get, "/api/status"),
                (HttpMethod::Get, "/api/version"),
            ]
        );
        assert!(sink.routes.iter().all(|(_, _, name)| *name == "fixed string"));
    }

    #[test]
    fn test_unexpected_document_value() {
        let defs: EndpointDefs = EndpointDefs::from_document(json!({
            "GET /before": "kept",
            "GET /answer": 42,
            "GET /after": "never",
        }))
        .unwrap();

        let mut sink = Recorder::default();
        let err = render_into(&mut sink, &defs, "").unwrap_err();
        match err {
            Error::UnexpectedValue { expression, found } => {
                assert_eq!(expression, "GET /answer");
                assert_eq!(found, "a number");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(sink.bindings(), vec![(HttpMethod::Get, "/before")]);
    }

    #[test]
    fn test_renderer_accumulates_duplicates() {
        let defs: EndpointDefs = EndpointDefs::new().entry("GET /dup", "once");

        let mut renderer = Renderer::default();
        renderer.render(&defs, "").unwrap().render(&defs, "").unwrap();

        let entries = renderer.table().entries();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.path == "/dup" && e.method == HttpMethod::Get));
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(50);
        assert_eq!(preview(&long).chars().count(), 40);
        assert_eq!(preview("short"), "short");
    }
}
