//! Identity-provider adapter boundary.
//!
//! Strategies never talk to providers or session stores directly. They
//! register a [`Registration`] with an injected [`IdentityAdapter`] and ask it
//! for `authenticate` middleware. [`InProcessAdapter`] is a working
//! implementation that keeps everything in the current process.

mod exchange;
mod in_process;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

pub use exchange::{CallbackParams, Profile, ProviderExchange, ProviderGrant};
pub use in_process::InProcessAdapter;

use crate::outcome::{Identity, ValidationError, Verification};
use crate::request::{AuthRequest, Middleware};

/// Session key under which the serialized identity is stored.
pub const SESSION_USER_KEY: &str = "user";

/// Session key holding the list of failure messages for the next page.
pub const SESSION_MESSAGES_KEY: &str = "messages";

/// Turns an identity into the value kept in the session.
pub type SerializeUser = Arc<
    dyn Fn(Identity) -> BoxFuture<'static, Result<serde_json::Value, ValidationError>>
        + Send
        + Sync,
>;

/// Restores an identity from the value kept in the session.
pub type DeserializeUser =
    Arc<dyn Fn(serde_json::Value) -> BoxFuture<'static, Result<Identity, ValidationError>> + Send + Sync>;

/// Wrap an async closure as a [`SerializeUser`] hook.
pub fn serializer<F, Fut>(f: F) -> SerializeUser
where
    F: Fn(Identity) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<serde_json::Value, ValidationError>> + Send + 'static,
{
    Arc::new(move |identity| f(identity).boxed())
}

/// Wrap an async closure as a [`DeserializeUser`] hook.
pub fn deserializer<F, Fut>(f: F) -> DeserializeUser
where
    F: Fn(serde_json::Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Identity, ValidationError>> + Send + 'static,
{
    Arc::new(move |stored| f(stored).boxed())
}

/// Verifier for schemes that authenticate from a single request.
#[async_trait]
pub trait RequestVerifier: Send + Sync {
    /// Human-readable scheme label used in errors and logs.
    fn scheme(&self) -> &'static str;

    async fn verify(&self, request: &AuthRequest) -> Verification;

    /// `WWW-Authenticate` challenge for unauthenticated requests.
    fn challenge(&self) -> Option<String> {
        None
    }
}

/// Verifier invoked with the grant a provider delivered on the callback leg.
#[async_trait]
pub trait ProfileVerifier: Send + Sync {
    async fn verify(&self, grant: ProviderGrant) -> Verification;
}

/// Everything an adapter needs to drive a redirect-flow provider.
#[derive(Clone)]
pub struct ProviderRegistration {
    pub name: String,
    pub client_id: String,
    pub client_secret: SecretString,
    pub callback_url: String,
    pub authorization_endpoint: String,
    pub scope: Vec<String>,
    pub scope_separator: &'static str,
    pub verifier: Arc<dyn ProfileVerifier>,
}

impl fmt::Debug for ProviderRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistration")
            .field("name", &self.name)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("callback_url", &self.callback_url)
            .field("authorization_endpoint", &self.authorization_endpoint)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl ProviderRegistration {
    /// Provider authorization URL for the redirect leg.
    pub fn authorization_url(&self, options: &AuthenticateOptions) -> crate::Result<url::Url> {
        let mut url = url::Url::parse(&self.authorization_endpoint).map_err(|e| {
            crate::Error::Adapter(format!(
                "invalid authorization endpoint for {}: {}",
                self.name, e
            ))
        })?;

        let scope = if options.scope.is_empty() {
            &self.scope
        } else {
            &options.scope
        };

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.client_id)
                .append_pair("redirect_uri", &self.callback_url);
            if !scope.is_empty() {
                query.append_pair("scope", &scope.join(self.scope_separator));
            }
            if let Some(state) = &options.state {
                query.append_pair("state", state);
            }
        }

        Ok(url)
    }
}

/// What a strategy registers with the adapter.
#[derive(Clone)]
pub enum Registration {
    Request(Arc<dyn RequestVerifier>),
    Provider(ProviderRegistration),
}

impl Registration {
    pub fn is_provider(&self) -> bool {
        matches!(self, Registration::Provider(_))
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Registration::Request(verifier) => {
                f.debug_tuple("Request").field(&verifier.scheme()).finish()
            }
            Registration::Provider(provider) => f.debug_tuple("Provider").field(provider).finish(),
        }
    }
}

/// Options for one `authenticate` middleware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthenticateOptions {
    /// Persist the identity into the session on success.
    pub session: bool,
    pub failure_redirect: Option<String>,
    /// Record the failure reason as a flash message.
    pub failure_message: bool,
    pub success_redirect: Option<String>,
    pub scope: Vec<String>,
    pub state: Option<String>,
}

impl Default for AuthenticateOptions {
    fn default() -> Self {
        Self {
            session: true,
            failure_redirect: None,
            failure_message: false,
            success_redirect: None,
            scope: Vec::new(),
            state: None,
        }
    }
}

impl AuthenticateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for stateless schemes: no session persistence.
    pub fn stateless() -> Self {
        Self {
            session: false,
            ..Self::default()
        }
    }

    pub fn session(mut self, session: bool) -> Self {
        self.session = session;
        self
    }

    pub fn failure_redirect(mut self, path: impl Into<String>) -> Self {
        self.failure_redirect = Some(path.into());
        self
    }

    pub fn failure_message(mut self, enabled: bool) -> Self {
        self.failure_message = enabled;
        self
    }

    pub fn success_redirect(mut self, path: impl Into<String>) -> Self {
        self.success_redirect = Some(path.into());
        self
    }

    pub fn scope(mut self, scope: Vec<String>) -> Self {
        self.scope = scope;
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }
}

/// Options for the adapter's initialize component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitializeOptions {
    pub user_property: String,
}

impl Default for InitializeOptions {
    fn default() -> Self {
        Self {
            user_property: "user".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Session,
    Initialize,
}

/// Framework component the host mounts at application start.
#[derive(Clone)]
pub struct Component {
    kind: ComponentKind,
    middleware: Middleware,
}

impl Component {
    pub fn new(kind: ComponentKind, middleware: Middleware) -> Self {
        Self { kind, middleware }
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn middleware(&self) -> &Middleware {
        &self.middleware
    }

    pub fn into_middleware(self) -> Middleware {
        self.middleware
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// The identity-provider adapter collaborator.
///
/// Holds process-wide strategy registrations; injected into the orchestrator
/// so tests can substitute a fake.
pub trait IdentityAdapter: Send + Sync {
    /// Register (or replace) the strategy known as `name`.
    fn use_strategy(&self, name: &str, registration: Registration);

    /// Middleware enforcing authentication against the named strategy.
    fn authenticate(&self, name: &str, options: AuthenticateOptions) -> Middleware;

    fn initialize(&self, options: InitializeOptions) -> Component;

    fn session(&self) -> Component;

    fn serialize_user(&self, serialize: SerializeUser);

    fn deserialize_user(&self, deserialize: DeserializeUser);
}
