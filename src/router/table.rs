//! Route table
//!
//! Collects registrations per path, in order, and turns them into an
//! `axum::Router`. Each path becomes a single axum route whose handler
//! walks the path's layers, so the same method may be bound several times
//! and non-standard verbs (`PURGE`, `M-SEARCH`, ...) work like any other.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::routing::{any, MethodRouter};
use axum::Router;
use serde::Serialize;
use tower_http::services::ServeDir;

use super::render::RouteSink;
use crate::config::RouterConfig;
use crate::error::{Error, Result};
use crate::handler::{Handler, Layer, Next};
use crate::types::HttpMethod;

/// One registration, as listed by [`RouteTable::entries`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    pub method: HttpMethod,
    pub path: String,
    pub handler: &'static str,
}

struct PathStack<S> {
    path: String,
    layers: Vec<Layer<S>>,
}

struct StaticMount {
    route: String,
    dir: ServeDir,
}

pub struct RouteTable<S = ()> {
    config: RouterConfig,
    paths: Vec<PathStack<S>>,
    index: HashMap<String, usize>,
    statics: Vec<StaticMount>,
}

impl<S> Default for RouteTable<S> {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

impl<S> RouteSink<S> for RouteTable<S> {
    fn register(&mut self, method: HttpMethod, route: &str, handler: Handler<S>) {
        let key = self.stack_key(route);
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                self.paths.push(PathStack {
                    path: key.clone(),
                    layers: Vec::new(),
                });
                self.index.insert(key, self.paths.len() - 1);
                self.paths.len() - 1
            }
        };
        self.paths[slot].layers.push(Layer { method, handler });
    }

    fn mount_static(&mut self, route: &str, dir: ServeDir) {
        self.statics.push(StaticMount {
            route: route.to_string(),
            dir,
        });
    }
}

impl<S> RouteTable<S> {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            paths: Vec::new(),
            index: HashMap::new(),
            statics: Vec::new(),
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Every registration, paths in first-registration order
    pub fn entries(&self) -> Vec<RouteEntry> {
        self.paths
            .iter()
            .flat_map(|stack| {
                stack.layers.iter().map(|layer| RouteEntry {
                    method: layer.method,
                    path: stack.path.clone(),
                    handler: layer.handler.name(),
                })
            })
            .collect()
    }

    /// Routes with a static directory mounted
    pub fn static_routes(&self) -> Vec<&str> {
        self.statics.iter().map(|mount| mount.route.as_str()).collect()
    }

    /// Non-strict tables store `/path/` and `/path` under one key
    fn stack_key(&self, route: &str) -> String {
        if self.config.strict {
            return route.to_string();
        }
        match route.trim_end_matches('/') {
            "" if route.starts_with('/') => "/".to_string(),
            trimmed => trimmed.to_string(),
        }
    }

    fn check_static_conflicts(&self) -> Result<()> {
        let mut prefixes: Vec<String> = Vec::with_capacity(self.statics.len());
        let mut seen = HashSet::new();

        for mount in &self.statics {
            let prefix = static_prefix(&mount.route)?;
            if !seen.insert(prefix.clone()) {
                return Err(Error::RouteConflict(format!(
                    "two static directories mounted at {}",
                    prefix
                )));
            }
            if prefix == "/" {
                // served as the fallback, below every route
                continue;
            }

            // routes below the prefix take precedence over the directory
            if let Some(stack) = self
                .paths
                .iter()
                .find(|stack| stack.path.trim_end_matches('/') == prefix)
            {
                return Err(Error::RouteConflict(format!(
                    "route {} is also the mount point of a static directory",
                    stack.path
                )));
            }

            let nested = format!("{}/", prefix);
            if let Some(other) = prefixes
                .iter()
                .find(|other| other.starts_with(&nested) || nested.starts_with(&format!("{}/", other)))
            {
                return Err(Error::RouteConflict(format!(
                    "static directories mounted at {} and {} overlap",
                    other, prefix
                )));
            }
            prefixes.push(prefix);
        }
        Ok(())
    }
}

impl<S> RouteTable<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Build the axum router.
    ///
    /// Fails on options axum cannot honor, on paths that do not start with
    /// `/` and on static directories overlapping other routes.
    pub fn into_router(self) -> Result<Router<S>> {
        self.config.validate()?;
        self.check_static_conflicts()?;

        let strict = self.config.strict;
        let mut router = Router::new();

        for stack in self.paths {
            let path = axum_path(&stack.path)?;
            let method_router = dispatch(stack.layers.into());
            // a catch-all already answers the trailing slash spelling
            if !strict && path != "/" && !path.contains("{*") {
                router = router.route(&format!("{}/", path), method_router.clone());
            }
            router = router.route(&path, method_router);
        }

        for mount in self.statics {
            let prefix = static_prefix(&mount.route)?;
            router = if prefix == "/" {
                router.fallback_service(mount.dir)
            } else {
                router.nest_service(&nest_path(&prefix)?, mount.dir)
            };
        }

        Ok(router)
    }
}

/// One axum handler per path, answering every method by walking the stack
fn dispatch<S>(stack: Arc<[Layer<S>]>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    any(move |State(state): State<S>, req: Request| Next::new(stack.clone(), state).run(req))
}

/// Rewrite `:name` captures as `{name}` and `*name` as `{*name}`.
///
/// Segments already written as `{name}` or `{*name}` are kept. A catch-all
/// must be the last segment and literal segments may not contain braces.
fn axum_path(route: &str) -> Result<String> {
    if !route.starts_with('/') {
        return Err(Error::InvalidRoute(route.to_string()));
    }
    let invalid = || Error::InvalidRoute(route.to_string());

    let segments: Vec<&str> = route.split('/').collect();
    let last = segments.len() - 1;
    let mut rewritten = Vec::with_capacity(segments.len());
    for (i, segment) in segments.into_iter().enumerate() {
        let (name, catch_all) = if let Some(name) = segment.strip_prefix(':') {
            if name.is_empty() {
                return Err(invalid());
            }
            (name, false)
        } else if let Some(name) = segment.strip_prefix('*') {
            (if name.is_empty() { "wildcard" } else { name }, true)
        } else if let Some(inner) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            match inner.strip_prefix('*') {
                Some(name) => (name, true),
                None => (inner, false),
            }
        } else if segment.contains(['{', '}']) {
            return Err(invalid());
        } else {
            rewritten.push(segment.to_string());
            continue;
        };

        if name.is_empty() || name.contains(['{', '}', '*', ':']) || (catch_all && i != last) {
            return Err(invalid());
        }
        rewritten.push(if catch_all {
            format!("{{*{}}}", name)
        } else {
            format!("{{{}}}", name)
        });
    }
    Ok(rewritten.join("/"))
}

/// Mount point for `nest_service`: captures are allowed, a catch-all is not
fn nest_path(prefix: &str) -> Result<String> {
    let path = axum_path(prefix)?;
    if path.contains("{*") {
        return Err(Error::InvalidRoute(prefix.to_string()));
    }
    Ok(path)
}

fn static_prefix(route: &str) -> Result<String> {
    if !route.starts_with('/') {
        return Err(Error::InvalidRoute(route.to_string()));
    }
    match route.trim_end_matches('/') {
        "" => Ok("/".to_string()),
        trimmed => Ok(trimmed.to_string()),
    }
}
