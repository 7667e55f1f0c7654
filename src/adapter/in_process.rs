//! In-process identity adapter.

use std::sync::{Arc, PoisonError, RwLock};

use dashmap::DashMap;
use serde_json::Value;

use super::{
    AuthenticateOptions, CallbackParams, Component, ComponentKind, DeserializeUser,
    IdentityAdapter, InitializeOptions, ProviderExchange, ProviderRegistration, Registration,
    RequestVerifier, SESSION_MESSAGES_KEY, SESSION_USER_KEY, SerializeUser,
};
use crate::outcome::Verification;
use crate::request::{AuthRequest, AuthResponse, Flow, Middleware, SessionData, middleware_fn};
use crate::{Error, Result};

/// Adapter that verifies requests and drives provider redirects in the
/// current process.
///
/// Cloning is cheap; clones share registrations and session hooks.
#[derive(Clone, Default)]
pub struct InProcessAdapter {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    registrations: DashMap<String, Registration>,
    serializer: RwLock<Option<SerializeUser>>,
    deserializer: RwLock<Option<DeserializeUser>>,
    exchange: RwLock<Option<Arc<dyn ProviderExchange>>>,
}

impl InProcessAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the code-for-token exchange used on provider callbacks.
    pub fn with_exchange(self, exchange: Arc<dyn ProviderExchange>) -> Self {
        *self
            .inner
            .exchange
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(exchange);
        self
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.inner.registrations.contains_key(name)
    }

    pub fn registration(&self, name: &str) -> Option<Registration> {
        self.inner.registrations.get(name).map(|r| r.value().clone())
    }

    pub fn strategy_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .registrations
            .iter()
            .map(|r| r.key().clone())
            .collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for InProcessAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InProcessAdapter")
            .field("strategies", &self.strategy_names())
            .finish_non_exhaustive()
    }
}

impl IdentityAdapter for InProcessAdapter {
    fn use_strategy(&self, name: &str, registration: Registration) {
        let provider = registration.is_provider();
        if self
            .inner
            .registrations
            .insert(name.to_string(), registration)
            .is_some()
        {
            tracing::warn!(strategy = name, "replacing existing strategy registration");
        } else {
            tracing::debug!(strategy = name, provider, "registered strategy");
        }
    }

    fn authenticate(&self, name: &str, options: AuthenticateOptions) -> Middleware {
        let inner = Arc::clone(&self.inner);
        let name = name.to_string();
        middleware_fn(move |request| {
            let inner = Arc::clone(&inner);
            let name = name.clone();
            let options = options.clone();
            async move { inner.authenticate(&name, &options, request).await }
        })
    }

    fn initialize(&self, options: InitializeOptions) -> Component {
        let user_property = options.user_property;
        Component::new(
            ComponentKind::Initialize,
            middleware_fn(move |mut request: AuthRequest| {
                request.initialize(user_property.clone());
                async move { Flow::Continue(request) }
            }),
        )
    }

    fn session(&self) -> Component {
        let inner = Arc::clone(&self.inner);
        Component::new(
            ComponentKind::Session,
            middleware_fn(move |request| {
                let inner = Arc::clone(&inner);
                async move { inner.restore_session(request).await }
            }),
        )
    }

    fn serialize_user(&self, serialize: SerializeUser) {
        *self
            .inner
            .serializer
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(serialize);
    }

    fn deserialize_user(&self, deserialize: DeserializeUser) {
        *self
            .inner
            .deserializer
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(deserialize);
    }
}

/// Append to the session's message list, replacing a non-list value.
fn push_message(session: &mut SessionData, message: &str) {
    let entry = session
        .entry(SESSION_MESSAGES_KEY)
        .or_insert_with(|| Value::Array(Vec::new()));
    match entry {
        Value::Array(messages) => messages.push(Value::from(message)),
        other => *other = Value::Array(vec![Value::from(message)]),
    }
}

impl Inner {
    async fn authenticate(
        &self,
        name: &str,
        options: &AuthenticateOptions,
        request: AuthRequest,
    ) -> Flow {
        if !request.is_initialized() {
            return Flow::Fail(Error::NotInitialized);
        }

        let Some(registration) = self.registrations.get(name).map(|r| r.value().clone()) else {
            return Flow::Fail(Error::UnknownStrategy(name.to_string()));
        };

        match registration {
            Registration::Request(verifier) => {
                let outcome = verifier.verify(&request).await;
                self.conclude(name, outcome, options, request, Some(&verifier))
                    .await
            }
            Registration::Provider(provider) => {
                let Some(params) = CallbackParams::from_request(&request) else {
                    return match provider.authorization_url(options) {
                        Ok(url) => {
                            tracing::debug!(strategy = name, "redirecting to provider");
                            Flow::Respond(AuthResponse::redirect(url.as_str()))
                        }
                        Err(e) => Flow::Fail(e),
                    };
                };
                let outcome = self.complete_callback(&provider, &params).await;
                self.conclude(name, outcome, options, request, None).await
            }
        }
    }

    async fn complete_callback(
        &self,
        provider: &ProviderRegistration,
        params: &CallbackParams,
    ) -> Verification {
        if let Some(denial) = params.denial() {
            return Verification::Denied(Error::Adapter(format!(
                "{} denied authorization: {}",
                provider.name, denial
            )));
        }

        let exchange = self
            .exchange
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let Some(exchange) = exchange else {
            return Verification::Errored(Error::Adapter(format!(
                "no provider exchange configured for {}",
                provider.name
            )));
        };

        match exchange.exchange(provider, params).await {
            Ok(grant) => provider.verifier.verify(grant).await,
            Err(e) => Verification::Errored(e),
        }
    }

    async fn conclude(
        &self,
        name: &str,
        outcome: Verification,
        options: &AuthenticateOptions,
        mut request: AuthRequest,
        verifier: Option<&Arc<dyn RequestVerifier>>,
    ) -> Flow {
        let error = match outcome {
            Verification::Verified(identity) => {
                if let Err(e) = self.persist(options, &mut request, &identity).await {
                    return Flow::Fail(e);
                }
                request.login(identity);
                tracing::debug!(strategy = name, "authenticated");
                return match &options.success_redirect {
                    Some(path) => {
                        Flow::Respond(AuthResponse::redirect(path).with_session(request.session))
                    }
                    None => Flow::Continue(request),
                };
            }
            Verification::Denied(e) | Verification::Errored(e) => e,
        };

        tracing::warn!(strategy = name, error = %error, "authentication failed");

        if let Some(path) = &options.failure_redirect {
            let message = options.failure_message.then(|| error.to_string());
            if let (Some(message), Some(session)) = (&message, request.session.as_mut()) {
                push_message(session, message);
            }
            let mut response = AuthResponse::redirect(path).with_session(request.session);
            response.body = message;
            return Flow::Respond(response);
        }

        if error.is_credential_absent()
            && let Some(challenge) = verifier.and_then(|v| v.challenge())
        {
            return Flow::Respond(AuthResponse::unauthorized(Some(&challenge)));
        }

        Flow::Fail(error)
    }

    async fn persist(
        &self,
        options: &AuthenticateOptions,
        request: &mut AuthRequest,
        identity: &Value,
    ) -> Result<()> {
        if !options.session || request.session.is_none() {
            return Ok(());
        }

        let serializer = self
            .serializer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| Error::Session("no user serializer registered".into()))?;

        let stored = serializer(identity.clone())
            .await
            .map_err(|e| Error::Session(format!("failed to serialize user: {}", e)))?;

        if let Some(session) = request.session.as_mut() {
            session.insert(SESSION_USER_KEY.to_string(), stored);
        }
        Ok(())
    }

    async fn restore_session(&self, mut request: AuthRequest) -> Flow {
        let Some(stored) = request
            .session
            .as_ref()
            .and_then(|s| s.get(SESSION_USER_KEY))
            .cloned()
        else {
            return Flow::Continue(request);
        };

        let deserializer = self
            .deserializer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let Some(deserializer) = deserializer else {
            return Flow::Fail(Error::Session("no user deserializer registered".into()));
        };

        match deserializer(stored).await {
            Ok(identity) => {
                request.login(identity);
                Flow::Continue(request)
            }
            Err(e) => Flow::Fail(Error::Session(format!(
                "failed to deserialize user out of session: {}",
                e
            ))),
        }
    }
}
