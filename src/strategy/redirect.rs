//! Redirect-flow providers.
//!
//! One template serves Facebook, Google and Twitter. Each registers two
//! routes:
//!
//! - `auth`: begins the flow by redirecting to the provider.
//! - `auth_callback`: receives the provider's answer, authenticates, then
//!   redirects to `redirect_path` or hands over to the next handler.

use std::sync::Arc;

use async_trait::async_trait;
use http::Method;
use secrecy::ExposeSecret;

use super::artifacts::{Artifacts, MiddlewareDescriptor, RouteDescriptor};
use super::name::StrategyType;
use super::{AuthStrategy, completion_handler, guard_artifacts};
use crate::Error;
use crate::adapter::{
    AuthenticateOptions, IdentityAdapter, ProfileVerifier, ProviderGrant, ProviderRegistration,
    Registration,
};
use crate::config::{OAuthConfig, ProviderArgs};
use crate::outcome::{FailureShape, Validator, Verification};

/// Built-in identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Facebook,
    Google,
    Twitter,
}

impl ProviderKind {
    pub fn strategy_type(&self) -> StrategyType {
        match self {
            ProviderKind::Facebook => StrategyType::Facebook,
            ProviderKind::Google => StrategyType::Google,
            ProviderKind::Twitter => StrategyType::Twitter,
        }
    }

    pub fn name(&self) -> &'static str {
        self.strategy_type().as_str()
    }

    pub fn authorization_endpoint(&self) -> &'static str {
        match self {
            ProviderKind::Facebook => "https://www.facebook.com/v3.2/dialog/oauth",
            ProviderKind::Google => "https://accounts.google.com/o/oauth2/v2/auth",
            ProviderKind::Twitter => "https://twitter.com/i/oauth2/authorize",
        }
    }

    pub fn scope_separator(&self) -> &'static str {
        match self {
            ProviderKind::Facebook => ",",
            ProviderKind::Google | ProviderKind::Twitter => " ",
        }
    }

    /// Scope requested when the configuration names none.
    pub fn default_scope(&self) -> &'static [&'static str] {
        match self {
            ProviderKind::Facebook => &[],
            ProviderKind::Google => &["profile", "email"],
            ProviderKind::Twitter => &["tweet.read", "users.read"],
        }
    }
}

/// Two-leg redirect strategy for one provider.
pub struct RedirectStrategy {
    kind: ProviderKind,
    config: OAuthConfig,
    middlewares: Artifacts<Arc<dyn MiddlewareDescriptor>>,
    routes: Artifacts<RouteDescriptor>,
}

impl RedirectStrategy {
    pub fn new(kind: ProviderKind, config: OAuthConfig) -> Self {
        Self {
            kind,
            config,
            middlewares: Artifacts::new(),
            routes: Artifacts::new(),
        }
    }

    pub fn facebook(config: OAuthConfig) -> Self {
        Self::new(ProviderKind::Facebook, config)
    }

    pub fn google(config: OAuthConfig) -> Self {
        Self::new(ProviderKind::Google, config)
    }

    pub fn twitter(config: OAuthConfig) -> Self {
        Self::new(ProviderKind::Twitter, config)
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn scope(&self) -> Vec<String> {
        if self.config.scope.is_empty() {
            self.kind
                .default_scope()
                .iter()
                .map(|s| s.to_string())
                .collect()
        } else {
            self.config.scope.clone()
        }
    }

    fn registration(&self) -> ProviderRegistration {
        ProviderRegistration {
            name: self.kind.name().to_string(),
            client_id: self.config.client_id.clone(),
            client_secret: self.config.client_secret.clone(),
            callback_url: self.config.callback_url.clone(),
            authorization_endpoint: self
                .config
                .authorization_url
                .clone()
                .unwrap_or_else(|| self.kind.authorization_endpoint().to_string()),
            scope: self.scope(),
            scope_separator: self.kind.scope_separator(),
            verifier: Arc::new(ProviderVerifier {
                label: self.kind.strategy_type().label(),
                validate: self.config.validate.clone(),
            }),
        }
    }

    /// Options for the callback leg's authenticate step.
    fn callback_options(&self) -> AuthenticateOptions {
        match &self.config.failure_path {
            Some(path) => AuthenticateOptions::default()
                .failure_redirect(path)
                .failure_message(true),
            None => AuthenticateOptions::default(),
        }
    }
}

impl AuthStrategy for RedirectStrategy {
    fn init(&mut self, adapter: &Arc<dyn IdentityAdapter>) {
        let name = self.kind.name();
        adapter.use_strategy(name, Registration::Provider(self.registration()));

        self.middlewares = guard_artifacts(name, adapter);

        let begin = RouteDescriptor::new(
            self.config
                .auth_path
                .clone()
                .unwrap_or_else(|| format!("/auth/{}", name)),
            self.config.auth_http_method.clone().unwrap_or(Method::GET),
            adapter.authenticate(name, AuthenticateOptions::default().scope(self.scope())),
        );

        let callback = RouteDescriptor::new(
            self.config
                .callback_path
                .clone()
                .unwrap_or_else(|| format!("/auth/{}/callback", name)),
            Method::GET,
            completion_handler(self.config.redirect_path.clone()),
        )
        .with_middleware(adapter.authenticate(name, self.callback_options()));

        tracing::debug!(
            strategy = name,
            auth_path = %begin.path,
            callback_path = %callback.path,
            "registered redirect routes"
        );

        self.routes.insert("auth", begin);
        self.routes.insert("auth_callback", callback);
    }

    fn middlewares(&self) -> &Artifacts<Arc<dyn MiddlewareDescriptor>> {
        &self.middlewares
    }

    fn routes(&self) -> &Artifacts<RouteDescriptor> {
        &self.routes
    }
}

struct ProviderVerifier {
    label: &'static str,
    validate: Option<Validator<ProviderArgs>>,
}

#[async_trait]
impl ProfileVerifier for ProviderVerifier {
    async fn verify(&self, grant: ProviderGrant) -> Verification {
        let Some(validate) = &self.validate else {
            return Verification::Denied(Error::MissingValidator { scheme: self.label });
        };

        let args = (
            grant.access_token.expose_secret().to_string(),
            grant.secondary.as_ref().map(|s| s.expose_secret().to_string()),
            grant.profile,
        );
        Verification::settle(validate(args).await, FailureShape::Denial)
    }
}
