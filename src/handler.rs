//! Route handlers and the continuation passed between them
//!
//! Every registration on a path becomes a layer in that path's stack. A
//! request walks the stack in registration order: the first layer whose
//! method matches is invoked with a [`Next`] pointing just past it, and a
//! handler that wants the rest of the chain to run calls [`Next::run`].

use std::any::type_name;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use futures::future::{BoxFuture, FutureExt};

use crate::types::HttpMethod;

type HandlerFn<S> = dyn Fn(Request, Next<S>) -> BoxFuture<'static, Response> + Send + Sync;

/// A type-erased request handler
pub struct Handler<S = ()> {
    name: &'static str,
    call: Arc<HandlerFn<S>>,
}

impl<S> Clone for Handler<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            call: self.call.clone(),
        }
    }
}

impl<S> fmt::Debug for Handler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").field("name", &self.name).finish()
    }
}

impl<S> Handler<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Wrap an axum handler. It always produces the response and never
    /// continues down the chain.
    pub fn new<H, T>(handler: H) -> Self
    where
        H: axum::handler::Handler<T, S>,
        T: 'static,
    {
        Self::from_fn(type_name::<H>(), move |req, next: Next<S>| {
            axum::handler::Handler::call(handler.clone(), req, next.state).boxed()
        })
    }

    /// Wrap a function that receives the continuation and decides whether
    /// to call it.
    pub fn middleware<F, Fut>(f: F) -> Self
    where
        F: Fn(Request, Next<S>) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoResponse,
    {
        Self::from_fn(type_name::<F>(), move |req, next| {
            f(req, next).map(IntoResponse::into_response).boxed()
        })
    }

    /// Respond with `body` verbatim as an HTML document
    pub fn text(body: impl Into<String>) -> Self {
        let body = Bytes::from(body.into());
        Self::from_fn("fixed string", move |_, _| {
            let body = body.clone();
            async move { Html(body).into_response() }.boxed()
        })
    }

    fn from_fn<F>(name: &'static str, f: F) -> Self
    where
        F: Fn(Request, Next<S>) -> BoxFuture<'static, Response> + Send + Sync + 'static,
    {
        Self {
            name,
            call: Arc::new(f),
        }
    }
}

impl<S> Handler<S> {
    /// Type name of the wrapped function, used in logs and route listings
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Replace the listed name, e.g. for closures whose type name says little
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub(crate) fn call(&self, req: Request, next: Next<S>) -> BoxFuture<'static, Response> {
        (self.call)(req, next)
    }
}

/// One registration in a path's stack
#[derive(Debug)]
pub(crate) struct Layer<S> {
    pub method: HttpMethod,
    pub handler: Handler<S>,
}

/// The rest of a path's handler stack, from the layer after the current one
pub struct Next<S = ()> {
    stack: Arc<[Layer<S>]>,
    position: usize,
    state: S,
}

impl<S> Next<S> {
    pub(crate) fn new(stack: Arc<[Layer<S>]>, state: S) -> Self {
        Self {
            stack,
            position: 0,
            state,
        }
    }

    /// Router state the handlers were registered with
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Invoke the next layer that answers the request's method.
    ///
    /// Responds `404 Not Found` once the stack is exhausted.
    pub fn run(mut self, req: Request) -> BoxFuture<'static, Response> {
        while self.position < self.stack.len() {
            let layer = &self.stack[self.position];
            self.position += 1;
            if layer.method.matches(req.method()) {
                let handler = layer.handler.clone();
                return handler.call(req, self);
            }
        }
        async { StatusCode::NOT_FOUND.into_response() }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::State;
    use axum::http::{HeaderValue, Method};

    fn request(method: Method) -> Request {
        Request::builder()
            .method(method)
            .uri("/")
            .body(Body::empty())
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn stack<S>(layers: Vec<(HttpMethod, Handler<S>)>) -> Arc<[Layer<S>]> {
        layers
            .into_iter()
            .map(|(method, handler)| Layer { method, handler })
            .collect()
    }

    #[tokio::test]
    async fn test_first_matching_layer_answers() {
        let layers = stack(vec![
            (HttpMethod::Post, Handler::<()>::text("post")),
            (HttpMethod::Get, Handler::text("first get")),
            (HttpMethod::Get, Handler::text("second get")),
        ]);

        let response = Next::new(layers, ()).run(request(Method::GET)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "first get");
    }

    #[tokio::test]
    async fn test_fixed_string_is_html() {
        let layers = stack(vec![(HttpMethod::All, Handler::<()>::text("<b>hi</b> & bye"))]);

        let response = Next::new(layers, ()).run(request(Method::DELETE)).await;
        assert_eq!(
            response.headers().get("content-type"),
            Some(&HeaderValue::from_static("text/html; charset=utf-8"))
        );
        assert_eq!(body_string(response).await, "<b>hi</b> & bye");
    }

    #[tokio::test]
    async fn test_middleware_continues() {
        let tag = Handler::<()>::middleware(|req: Request, next: Next| async move {
            let mut response = next.run(req).await;
            response
                .headers_mut()
                .insert("x-chain", HeaderValue::from_static("tagged"));
            response
        });
        let layers = stack(vec![
            (HttpMethod::Get, tag),
            (HttpMethod::Get, Handler::new(|| async { "done" })),
        ]);

        let response = Next::new(layers, ()).run(request(Method::GET)).await;
        assert_eq!(response.headers().get("x-chain").unwrap(), "tagged");
        assert_eq!(body_string(response).await, "done");
    }

    #[tokio::test]
    async fn test_middleware_short_circuits() {
        let deny = Handler::<()>::middleware(|_req: Request, _next: Next| async {
            (StatusCode::FORBIDDEN, "denied")
        });
        let layers = stack(vec![
            (HttpMethod::All, deny),
            (HttpMethod::Get, Handler::text("never")),
        ]);

        let response = Next::new(layers, ()).run(request(Method::GET)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_string(response).await, "denied");
    }

    #[tokio::test]
    async fn test_exhausted_stack_is_not_found() {
        let pass = Handler::<()>::middleware(|req: Request, next: Next| next.run(req));
        let layers = stack(vec![(HttpMethod::Get, pass)]);

        let response = Next::new(layers.clone(), ()).run(request(Method::GET)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = Next::new(layers, ()).run(request(Method::POST)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_axum_handler_sees_state() {
        let handler = Handler::new(|State(greeting): State<&'static str>| async move {
            format!("{greeting}, world")
        });
        let layers = stack(vec![(HttpMethod::Get, handler)]);

        let response = Next::new(layers, "hello").run(request(Method::GET)).await;
        assert_eq!(body_string(response).await, "hello, world");
    }

    #[test]
    fn test_handler_names() {
        assert_eq!(Handler::<()>::text("x").name(), "fixed string");
        let named = Handler::<()>::new(|| async { "ok" });
        assert!(named.name().contains("handler"));
        assert_eq!(named.with_name("list_orders").name(), "list_orders");
    }
}
