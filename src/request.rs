//! Request, response and middleware primitives shared by strategies and adapters.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use http::header::{self, HeaderName, HeaderValue};
use http::{HeaderMap, Method, StatusCode};
use serde_json::{Map, Value};

use crate::Error;
use crate::outcome::Identity;

/// Serialized session contents attached to a request by the host.
pub type SessionData = Map<String, Value>;

/// Middleware and route handler function.
///
/// Receives the request by value and decides whether the chain continues,
/// answers, or fails.
pub type Middleware = Arc<dyn Fn(AuthRequest) -> BoxFuture<'static, Flow> + Send + Sync>;

/// Wrap an async closure as a [`Middleware`].
pub fn middleware_fn<F, Fut>(f: F) -> Middleware
where
    F: Fn(AuthRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Flow> + Send + 'static,
{
    Arc::new(move |request| f(request).boxed())
}

/// Run middlewares in order, stopping at the first one that does not continue.
pub async fn run_chain(chain: &[Middleware], request: AuthRequest) -> Flow {
    let mut request = request;
    for middleware in chain {
        match middleware(request).await {
            Flow::Continue(next) => request = next,
            other => return other,
        }
    }
    Flow::Continue(request)
}

/// Inbound request as seen by the authentication layer.
#[derive(Debug, Clone, Default)]
pub struct AuthRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    /// Decoded query string parameters.
    pub query: HashMap<String, String>,
    /// Parsed body fields (form or JSON object).
    pub body: Map<String, Value>,
    /// Session attached by the host's session store, if any.
    pub session: Option<SessionData>,
    /// Identity set by a successful authentication.
    pub identity: Option<Identity>,
    user_property: Option<String>,
}

impl AuthRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Build from `http` request parts; the query string is URL-decoded.
    pub fn from_parts(parts: &http::request::Parts) -> Self {
        let query = parts
            .uri
            .query()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();

        Self {
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
            headers: parts.headers.clone(),
            query,
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => tracing::warn!(header = name, "ignoring invalid header"),
        }
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_body_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Map<String, Value>) -> Self {
        self.body = body;
        self
    }

    pub fn with_session(mut self, session: SessionData) -> Self {
        self.session = Some(session);
        self
    }

    /// Header value as UTF-8; empty values count as absent.
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
    }

    /// Query parameter; empty values count as absent.
    pub fn query_str(&self, name: &str) -> Option<&str> {
        self.query
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// String body field; empty values count as absent.
    pub fn body_str(&self, name: &str) -> Option<&str> {
        self.body
            .get(name)
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|h| h.split(';'))
            .map(str::trim)
            .find_map(|pair| {
                let (key, value) = pair.split_once('=')?;
                (key.trim() == name).then(|| value.trim())
            })
            .filter(|v| !v.is_empty())
    }

    pub fn login(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }

    pub fn logout(&mut self) {
        self.identity = None;
        if let Some(session) = self.session.as_mut() {
            session.remove(crate::adapter::SESSION_USER_KEY);
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Mark the request as passed through the adapter's initialize component.
    pub fn initialize(&mut self, user_property: impl Into<String>) {
        self.user_property = Some(user_property.into());
    }

    pub fn is_initialized(&self) -> bool {
        self.user_property.is_some()
    }

    /// Name under which the host exposes the identity, once initialized.
    pub fn user_property(&self) -> Option<&str> {
        self.user_property.as_deref()
    }
}

/// Terminal response produced by a middleware or handler.
#[derive(Debug, Clone)]
pub struct AuthResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<String>,
    /// Session of the answered request, for the host to save.
    pub session: Option<SessionData>,
}

impl AuthResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: None,
            session: None,
        }
    }

    /// Carry the request's session so a login or flash message survives the redirect.
    pub fn with_session(mut self, session: Option<SessionData>) -> Self {
        self.session = session;
        self
    }

    pub fn redirect(location: &str) -> Self {
        let mut response = Self::new(StatusCode::FOUND);
        match HeaderValue::from_str(location) {
            Ok(value) => {
                response.headers.insert(header::LOCATION, value);
            }
            Err(_) => tracing::warn!(location, "redirect location is not a valid header value"),
        }
        response
    }

    pub fn unauthorized(challenge: Option<&str>) -> Self {
        let mut response = Self::new(StatusCode::UNAUTHORIZED);
        if let Some(value) = challenge.and_then(|c| HeaderValue::from_str(c).ok()) {
            response.headers.insert(header::WWW_AUTHENTICATE, value);
        }
        response
    }

    pub fn from_error(error: &Error) -> Self {
        Self {
            body: Some(error.to_string()),
            ..Self::new(error.status_code())
        }
    }

    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    pub fn is_redirect(&self) -> bool {
        self.status.is_redirection()
    }
}

/// What a middleware decided.
#[derive(Debug)]
pub enum Flow {
    /// Hand the request to the next handler in the chain.
    Continue(AuthRequest),
    /// Answer immediately.
    Respond(AuthResponse),
    /// Pass the error to the host's error handling chain.
    Fail(Error),
}

impl Flow {
    pub fn is_continue(&self) -> bool {
        matches!(self, Flow::Continue(_))
    }

    pub fn request(&self) -> Option<&AuthRequest> {
        match self {
            Flow::Continue(request) => Some(request),
            _ => None,
        }
    }

    pub fn into_request(self) -> Option<AuthRequest> {
        match self {
            Flow::Continue(request) => Some(request),
            _ => None,
        }
    }

    pub fn response(&self) -> Option<&AuthResponse> {
        match self {
            Flow::Respond(response) => Some(response),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Flow::Fail(error) => Some(error),
            _ => None,
        }
    }
}
