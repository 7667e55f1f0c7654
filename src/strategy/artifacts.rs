//! Route and middleware descriptors a strategy hands to the host router.

use std::fmt;
use std::sync::Arc;

use http::Method;

use crate::adapter::AuthenticateOptions;
use crate::request::{AuthRequest, Flow, Middleware, run_chain};

/// Named middleware a strategy exposes.
pub trait MiddlewareDescriptor: Send + Sync {
    fn name(&self) -> &str;

    /// `true` when the middleware must be bound per route through
    /// [`apply`](Self::apply); `false` when it can be mounted once globally.
    fn is_dynamic(&self) -> bool;

    /// Produce the middleware function, optionally with per-call options.
    fn apply(&self, options: Option<AuthenticateOptions>) -> Middleware;
}

impl fmt::Debug for dyn MiddlewareDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareDescriptor")
            .field("name", &self.name())
            .field("is_dynamic", &self.is_dynamic())
            .finish()
    }
}

/// One HTTP endpoint the host must mount.
#[derive(Clone)]
pub struct RouteDescriptor {
    pub path: String,
    pub method: Method,
    pub middlewares: Vec<Middleware>,
    pub handler: Middleware,
}

impl RouteDescriptor {
    pub fn new(path: impl Into<String>, method: Method, handler: Middleware) -> Self {
        Self {
            path: path.into(),
            method,
            middlewares: Vec::new(),
            handler,
        }
    }

    pub fn with_middleware(mut self, middleware: Middleware) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Run the middleware chain, then the handler.
    pub async fn dispatch(&self, request: AuthRequest) -> Flow {
        match run_chain(&self.middlewares, request).await {
            Flow::Continue(request) => (self.handler)(request).await,
            other => other,
        }
    }
}

impl fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("path", &self.path)
            .field("method", &self.method)
            .field("middlewares", &self.middlewares.len())
            .finish_non_exhaustive()
    }
}

/// Selection passed to `get_middlewares`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MiddlewareFilter<'a> {
    #[default]
    All,
    Named(&'a str),
    /// Middleware safe to mount once globally.
    OnlyGlobal,
    /// Middleware that must be bound per route.
    OnlyDynamic,
}

impl<'a> From<&'a str> for MiddlewareFilter<'a> {
    fn from(name: &'a str) -> Self {
        MiddlewareFilter::Named(name)
    }
}

/// Result of a named or unfiltered artifact lookup.
#[derive(Debug, Clone)]
pub enum Selected<T> {
    One(T),
    Many(Vec<T>),
    Missing,
}

impl<T> Selected<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Selected::One(item) => vec![item],
            Selected::Many(items) => items,
            Selected::Missing => Vec::new(),
        }
    }

    /// The single named item, if this was a named lookup that matched.
    pub fn one(self) -> Option<T> {
        match self {
            Selected::One(item) => Some(item),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Selected::Missing)
    }
}

/// Insertion-ordered map with unique keys; inserting an existing key
/// replaces the value in place.
#[derive(Debug, Clone)]
pub struct Artifacts<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for Artifacts<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> Artifacts<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: T) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut().map(|(_, value)| value)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(key, _)| key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Artifacts<Arc<dyn MiddlewareDescriptor>> {
    pub fn select(&self, filter: MiddlewareFilter<'_>) -> Selected<Arc<dyn MiddlewareDescriptor>> {
        match filter {
            MiddlewareFilter::All => Selected::Many(self.values().cloned().collect()),
            MiddlewareFilter::Named(name) => match self.get(name) {
                Some(m) => Selected::One(Arc::clone(m)),
                None => Selected::Missing,
            },
            MiddlewareFilter::OnlyGlobal => {
                Selected::Many(self.values().filter(|m| !m.is_dynamic()).cloned().collect())
            }
            MiddlewareFilter::OnlyDynamic => {
                Selected::Many(self.values().filter(|m| m.is_dynamic()).cloned().collect())
            }
        }
    }
}

impl Artifacts<RouteDescriptor> {
    pub fn select(&self, name: Option<&str>) -> Selected<RouteDescriptor> {
        match name {
            None => Selected::Many(self.values().cloned().collect()),
            Some(name) => match self.get(name) {
                Some(route) => Selected::One(route.clone()),
                None => Selected::Missing,
            },
        }
    }
}
