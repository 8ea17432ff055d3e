//! Ordered route table.
//!
//! A pattern ending in `*` matches every path starting with what precedes
//! the `*`; any other pattern must equal the path. Entries are tried in
//! registration order and the first one matching both path and method wins.

use std::future::Future;
use std::pin::Pin;

use crate::http::connection::Dispatcher;
use crate::http::request::Method;

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + 'a>>;

/// A route handler. It gets the dispatcher for the duration of one request
/// and writes the whole response through it.
pub type Handler<V> = for<'a> fn(&'a mut Dispatcher<V>) -> HandlerFuture<'a>;

pub struct Route<V> {
    pub pattern: String,
    pub method: Method,
    pub handler: Handler<V>,
}

impl<V> Route<V> {
    pub fn matches(&self, path: &str, method: Method) -> bool {
        let path_match = self.pattern == path
            || self
                .pattern
                .strip_suffix('*')
                .is_some_and(|prefix| path.starts_with(prefix));

        path_match && self.method.accepts(method)
    }
}

pub struct Router<V> {
    routes: Vec<Route<V>>,
}

impl<V> Default for Router<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Router<V> {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Appends a route; it only wins for requests no earlier route matches.
    pub fn route(mut self, pattern: impl Into<String>, method: Method, handler: Handler<V>) -> Self {
        self.routes.push(Route {
            pattern: pattern.into(),
            method,
            handler,
        });
        self
    }

    /// Index of the first route matching `path` and `method`.
    pub fn position(&self, path: &str, method: Method) -> Option<usize> {
        self.routes.iter().position(|r| r.matches(path, method))
    }

    pub fn find(&self, path: &str, method: Method) -> Option<&Route<V>> {
        self.position(path, method).map(|i| &self.routes[i])
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
