//! Endpoint definitions
//!
//! An [`EndpointDefs`] maps route expressions to [`Endpoint`] values. The
//! value's variant decides how the entry is registered.

mod document;

use std::path::Path;

use tower_http::services::ServeDir;

use crate::error::{Error, Result};
use crate::handler::Handler;

pub use document::load_document;
pub(crate) use document::value_kind;

/// What a route expression points at
#[derive(Debug, Clone)]
pub enum Endpoint<S = ()> {
    /// A single handler
    Handler(Handler<S>),
    /// Handlers registered in order on the same method and route
    Chain(Vec<Handler<S>>),
    /// A fixed response body
    Fixed(String),
    /// Sub-routes mounted under the entry's key
    Nested(EndpointDefs<S>),
    /// Files served from a directory, for every method
    Static(ServeDir),
    /// A value loaded from a definition document, classified when rendered:
    /// strings are fixed bodies and objects are sub-routes
    Document(serde_json::Value),
}

impl<S> Endpoint<S> {
    /// Short variant name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Endpoint::Handler(_) => "handler",
            Endpoint::Chain(_) => "chain",
            Endpoint::Fixed(_) => "fixed string",
            Endpoint::Nested(_) => "nested",
            Endpoint::Static(_) => "static",
            Endpoint::Document(_) => "document",
        }
    }
}

impl<S> From<Handler<S>> for Endpoint<S> {
    fn from(handler: Handler<S>) -> Self {
        Endpoint::Handler(handler)
    }
}

impl<S> From<Vec<Handler<S>>> for Endpoint<S> {
    fn from(handlers: Vec<Handler<S>>) -> Self {
        Endpoint::Chain(handlers)
    }
}

impl<S> From<&str> for Endpoint<S> {
    fn from(body: &str) -> Self {
        Endpoint::Fixed(body.to_string())
    }
}

impl<S> From<String> for Endpoint<S> {
    fn from(body: String) -> Self {
        Endpoint::Fixed(body)
    }
}

impl<S> From<EndpointDefs<S>> for Endpoint<S> {
    fn from(defs: EndpointDefs<S>) -> Self {
        Endpoint::Nested(defs)
    }
}

impl<S> From<ServeDir> for Endpoint<S> {
    fn from(dir: ServeDir) -> Self {
        Endpoint::Static(dir)
    }
}

impl<S> From<serde_json::Value> for Endpoint<S> {
    fn from(value: serde_json::Value) -> Self {
        Endpoint::Document(value)
    }
}

/// Wrap an axum handler as an endpoint
pub fn handler<H, T, S>(handler: H) -> Endpoint<S>
where
    H: axum::handler::Handler<T, S>,
    T: 'static,
    S: Clone + Send + Sync + 'static,
{
    Endpoint::Handler(Handler::new(handler))
}

/// Handlers run in order on one route
pub fn chain<S>(handlers: impl IntoIterator<Item = Handler<S>>) -> Endpoint<S> {
    Endpoint::Chain(handlers.into_iter().collect())
}

/// Serve the files under `dir`
pub fn serve_dir<S>(dir: impl AsRef<Path>) -> Endpoint<S> {
    Endpoint::Static(ServeDir::new(dir))
}

/// Ordered route expression to endpoint entries
#[derive(Debug, Clone)]
pub struct EndpointDefs<S = ()> {
    entries: Vec<(String, Endpoint<S>)>,
}

impl<S> Default for EndpointDefs<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<S> EndpointDefs<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`push`](Self::push)
    pub fn entry(mut self, expression: impl Into<String>, endpoint: impl Into<Endpoint<S>>) -> Self {
        self.push(expression, endpoint);
        self
    }

    /// Append an entry. Entries are registered in the order they were added.
    pub fn push(&mut self, expression: impl Into<String>, endpoint: impl Into<Endpoint<S>>) {
        self.entries.push((expression.into(), endpoint.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Endpoint<S>)> {
        self.entries.iter().map(|(expression, endpoint)| (expression.as_str(), endpoint))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Definitions from a parsed document whose root is an object.
    ///
    /// Values are kept as [`Endpoint::Document`] and only classified when
    /// rendered, so a bad value surfaces as an error during rendering.
    pub fn from_document(document: serde_json::Value) -> Result<Self> {
        match document {
            serde_json::Value::Object(map) => Ok(map
                .into_iter()
                .map(|(expression, value)| (expression, Endpoint::Document(value)))
                .collect()),
            other => Err(Error::InvalidDocument(format!(
                "expected an object at the root, found {}",
                value_kind(&other)
            ))),
        }
    }
}

impl<S, K, V> FromIterator<(K, V)> for EndpointDefs<S>
where
    K: Into<String>,
    V: Into<Endpoint<S>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut defs = Self::new();
        for (expression, endpoint) in iter {
            defs.push(expression, endpoint);
        }
        defs
    }
}

/// Build [`EndpointDefs`] from `expression => endpoint` pairs.
///
/// ```ignore
/// let api = endpoints! {
///     "GET /" => "Try /orders",
///     "/orders" => endpoints! {
///         "GET" => handler(list_orders),
///         "POST" => handler(create_order),
///     },
/// };
/// ```
#[macro_export]
macro_rules! endpoints {
    ($($expression:expr => $endpoint:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut defs = $crate::endpoint::EndpointDefs::new();
        $(defs.push($expression, $endpoint);)*
        defs
    }};
}
