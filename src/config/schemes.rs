//! Per-scheme configuration.
//!
//! Each config carries the scheme's fields plus an optional `validate`
//! callback. A config without a validator is accepted here; the scheme reports
//! `Missing <scheme> validator` on its first authentication attempt.

use std::fmt;
use std::future::Future;

use http::Method;
use jsonwebtoken::Algorithm;
use secrecy::SecretString;

use crate::adapter::{
    DeserializeUser, Profile, SerializeUser, deserializer, serializer,
};
use crate::extract::{TokenExtractor, UserCredentials};
use crate::outcome::{Identity, ValidationError, ValidationResult, Validator, validator};

/// Provider callback arguments: access token, refresh token (or token
/// secret), profile.
pub type ProviderArgs = (String, Option<String>, Profile);

/// Token (JWT) scheme.
#[derive(Clone)]
pub struct TokenConfig {
    pub secret_or_key: Option<SecretString>,
    pub algorithms: Vec<Algorithm>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub ignore_expiration: bool,
    pub extractor: TokenExtractor,
    pub validate: Option<Validator<Identity>>,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret_or_key: None,
            algorithms: vec![Algorithm::HS256],
            issuer: None,
            audience: None,
            ignore_expiration: false,
            extractor: TokenExtractor::default(),
            validate: None,
        }
    }
}

impl TokenConfig {
    pub fn new(secret_or_key: impl Into<String>) -> Self {
        Self {
            secret_or_key: Some(SecretString::from(secret_or_key.into())),
            ..Default::default()
        }
    }

    pub fn algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.algorithms = algorithms;
        self
    }

    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn ignore_expiration(mut self, ignore: bool) -> Self {
        self.ignore_expiration = ignore;
        self
    }

    pub fn extractor(mut self, extractor: TokenExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Validator receiving the decoded claims.
    pub fn with_validator<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Identity) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ValidationResult> + Send + 'static,
    {
        self.validate = Some(validator(f));
        self
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("algorithms", &self.algorithms)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ignore_expiration", &self.ignore_expiration)
            .field("extractor", &self.extractor)
            .field("validate", &self.validate.is_some())
            .finish_non_exhaustive()
    }
}

/// API key scheme.
#[derive(Clone, Default)]
pub struct ApiKeyConfig {
    pub header: Option<String>,
    pub query_param: Option<String>,
    pub validate: Option<Validator<String>>,
}

impl ApiKeyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>) -> Self {
        self.header = Some(name.into());
        self
    }

    pub fn query_param(mut self, name: impl Into<String>) -> Self {
        self.query_param = Some(name.into());
        self
    }

    pub fn with_validator<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ValidationResult> + Send + 'static,
    {
        self.validate = Some(validator(f));
        self
    }
}

impl fmt::Debug for ApiKeyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyConfig")
            .field("header", &self.header)
            .field("query_param", &self.query_param)
            .field("validate", &self.validate.is_some())
            .finish()
    }
}

/// Username/password schemes (local form login and HTTP basic).
#[derive(Clone, Default)]
pub struct UserPasswordConfig {
    pub auth_path: Option<String>,
    pub auth_http_method: Option<Method>,
    /// Where a failed login on the `auth` route redirects, with the error
    /// recorded as a session message. Unset, failures go to the host's
    /// error chain (or the basic challenge) instead of redirecting.
    pub failure_path: Option<String>,
    pub redirect_path: Option<String>,
    pub username_field: Option<String>,
    pub password_field: Option<String>,
    /// Realm advertised in the basic challenge.
    pub realm: Option<String>,
    /// Persist the identity into the session after login.
    ///
    /// Defaults to `true` for local and `false` for basic, whose clients
    /// resend credentials on every request. Set it explicitly to keep a
    /// basic login in the session.
    pub session: Option<bool>,
    pub validate: Option<Validator<UserCredentials>>,
}

impl UserPasswordConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auth_path(mut self, path: impl Into<String>) -> Self {
        self.auth_path = Some(path.into());
        self
    }

    pub fn auth_http_method(mut self, method: Method) -> Self {
        self.auth_http_method = Some(method);
        self
    }

    pub fn failure_path(mut self, path: impl Into<String>) -> Self {
        self.failure_path = Some(path.into());
        self
    }

    pub fn redirect_path(mut self, path: impl Into<String>) -> Self {
        self.redirect_path = Some(path.into());
        self
    }

    pub fn fields(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username_field = Some(username.into());
        self.password_field = Some(password.into());
        self
    }

    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    pub fn session(mut self, session: bool) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_validator<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(UserCredentials) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ValidationResult> + Send + 'static,
    {
        self.validate = Some(validator(f));
        self
    }
}

impl fmt::Debug for UserPasswordConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPasswordConfig")
            .field("auth_path", &self.auth_path)
            .field("auth_http_method", &self.auth_http_method)
            .field("failure_path", &self.failure_path)
            .field("redirect_path", &self.redirect_path)
            .field("session", &self.session)
            .field("validate", &self.validate.is_some())
            .finish_non_exhaustive()
    }
}

/// Redirect-flow provider (Facebook, Google, Twitter).
#[derive(Clone)]
pub struct OAuthConfig {
    /// Client ID (consumer key for Twitter).
    pub client_id: String,
    /// Client secret (consumer secret for Twitter).
    pub client_secret: SecretString,
    /// Absolute URL the provider redirects back to.
    pub callback_url: String,
    pub auth_path: Option<String>,
    pub callback_path: Option<String>,
    pub auth_http_method: Option<Method>,
    pub failure_path: Option<String>,
    pub redirect_path: Option<String>,
    pub scope: Vec<String>,
    /// Overrides the provider's authorization endpoint.
    pub authorization_url: Option<String>,
    pub validate: Option<Validator<ProviderArgs>>,
}

impl OAuthConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            callback_url: callback_url.into(),
            auth_path: None,
            callback_path: None,
            auth_http_method: None,
            failure_path: None,
            redirect_path: None,
            scope: Vec::new(),
            authorization_url: None,
            validate: None,
        }
    }

    pub fn auth_path(mut self, path: impl Into<String>) -> Self {
        self.auth_path = Some(path.into());
        self
    }

    pub fn callback_path(mut self, path: impl Into<String>) -> Self {
        self.callback_path = Some(path.into());
        self
    }

    pub fn auth_http_method(mut self, method: Method) -> Self {
        self.auth_http_method = Some(method);
        self
    }

    pub fn failure_path(mut self, path: impl Into<String>) -> Self {
        self.failure_path = Some(path.into());
        self
    }

    pub fn redirect_path(mut self, path: impl Into<String>) -> Self {
        self.redirect_path = Some(path.into());
        self
    }

    pub fn scope<I, S>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = scope.into_iter().map(Into::into).collect();
        self
    }

    pub fn authorization_url(mut self, url: impl Into<String>) -> Self {
        self.authorization_url = Some(url.into());
        self
    }

    /// Validator receiving `(access_token, refresh_token, profile)`.
    pub fn with_validator<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(String, Option<String>, Profile) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ValidationResult> + Send + 'static,
    {
        self.validate = Some(validator(move |(access, secondary, profile): ProviderArgs| {
            f(access, secondary, profile)
        }));
        self
    }
}

impl fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("callback_url", &self.callback_url)
            .field("auth_path", &self.auth_path)
            .field("callback_path", &self.callback_path)
            .field("failure_path", &self.failure_path)
            .field("redirect_path", &self.redirect_path)
            .field("scope", &self.scope)
            .field("validate", &self.validate.is_some())
            .finish_non_exhaustive()
    }
}

/// Session wiring. Its presence alone enables the session component.
#[derive(Clone, Default)]
pub struct SessionOptions {
    pub serialize: Option<SerializeUser>,
    pub deserialize: Option<DeserializeUser>,
}

impl SessionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serialize<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Identity) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, ValidationError>> + Send + 'static,
    {
        self.serialize = Some(serializer(f));
        self
    }

    pub fn deserialize<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(serde_json::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Identity, ValidationError>> + Send + 'static,
    {
        self.deserialize = Some(deserializer(f));
        self
    }
}

impl fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionOptions")
            .field("serialize", &self.serialize.is_some())
            .field("deserialize", &self.deserialize.is_some())
            .finish()
    }
}
