//! Authentication configuration.
//!
//! ```rust,no_run
//! use authmux::{AuthConfig, AuthSettings};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut settings = AuthSettings::load("config/auth.json").await?;
//! settings.apply_env_overrides();
//! settings.validate()?;
//!
//! let mut config = AuthConfig::from_settings(settings)?;
//! if let Some(local) = config.local.take() {
//!     config = config.local(local.with_validator(|creds| async move {
//!         Ok(json!({ "username": creds.username }))
//!     }));
//! }
//! # Ok(())
//! # }
//! ```

pub mod schemes;
pub mod settings;

pub use schemes::{
    ApiKeyConfig, OAuthConfig, ProviderArgs, SessionOptions, TokenConfig, UserPasswordConfig,
};
pub use settings::{
    ApiKeySettings, AuthSettings, ExtractorSettings, OAuthSettings, SessionSettings,
    TokenSettings, UserPasswordSettings,
};

use http::Method;
use secrecy::SecretString;
use thiserror::Error;

/// Errors that can occur in configuration operations
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required key not found
    #[error("Key not found: {key}")]
    NotFound {
        /// The key that was not found
        key: String,
    },

    /// Invalid configuration value
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// The settings key, e.g. `google.callbackURL`
        key: String,
        /// What is wrong with the value
        message: String,
    },

    /// Settings file is not valid JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Settings file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Multiple validation errors
    #[error("{0}")]
    ValidationErrors(ValidationErrors),
}

/// Every problem found by one validation pass.
#[derive(Debug)]
pub struct ValidationErrors(pub Vec<ConfigError>);

impl ValidationErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Validation failed: ")?;
        let msgs: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", msgs.join("; "))
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

pub(crate) fn parse_method(method: &str) -> Result<Method, http::method::InvalidMethod> {
    Method::from_bytes(method.to_ascii_uppercase().as_bytes())
}

fn method_field(section: &str, method: Option<String>) -> ConfigResult<Option<Method>> {
    method
        .map(|m| {
            parse_method(&m).map_err(|_| ConfigError::InvalidValue {
                key: format!("{}.authHttpMethod", section),
                message: format!("unsupported method '{}'", m),
            })
        })
        .transpose()
}

/// Top-level configuration: one optional section per scheme.
///
/// Sections that are `None` produce no strategy.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub jwt: Option<TokenConfig>,
    pub api_key: Option<ApiKeyConfig>,
    pub facebook: Option<OAuthConfig>,
    pub google: Option<OAuthConfig>,
    pub twitter: Option<OAuthConfig>,
    pub local: Option<UserPasswordConfig>,
    pub basic: Option<UserPasswordConfig>,
    pub session_options: Option<SessionOptions>,
}

impl AuthConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jwt(mut self, config: TokenConfig) -> Self {
        self.jwt = Some(config);
        self
    }

    pub fn api_key(mut self, config: ApiKeyConfig) -> Self {
        self.api_key = Some(config);
        self
    }

    pub fn facebook(mut self, config: OAuthConfig) -> Self {
        self.facebook = Some(config);
        self
    }

    pub fn google(mut self, config: OAuthConfig) -> Self {
        self.google = Some(config);
        self
    }

    pub fn twitter(mut self, config: OAuthConfig) -> Self {
        self.twitter = Some(config);
        self
    }

    pub fn local(mut self, config: UserPasswordConfig) -> Self {
        self.local = Some(config);
        self
    }

    pub fn basic(mut self, config: UserPasswordConfig) -> Self {
        self.basic = Some(config);
        self
    }

    pub fn session_options(mut self, options: SessionOptions) -> Self {
        self.session_options = Some(options);
        self
    }

    /// Build from loaded settings. Validators are attached afterwards.
    pub fn from_settings(settings: AuthSettings) -> ConfigResult<Self> {
        let jwt = settings.jwt.map(|s| {
            let mut config = TokenConfig {
                secret_or_key: s.secret_or_key,
                issuer: s.issuer,
                audience: s.audience,
                ignore_expiration: s.ignore_expiration,
                ..TokenConfig::default()
            };
            if !s.algorithms.is_empty() {
                config.algorithms = s.algorithms;
            }
            if let Some(extractor) = s.jwt_from_request {
                config.extractor = extractor.into();
            }
            config
        });

        let api_key = settings.api_key.map(|s| ApiKeyConfig {
            header: s.api_key_header,
            query_param: s.api_key_query_param,
            validate: None,
        });

        Ok(Self {
            jwt,
            api_key,
            facebook: oauth("facebook", settings.facebook)?,
            google: oauth("google", settings.google)?,
            twitter: oauth("twitter", settings.twitter)?,
            local: user_password("local", settings.local)?,
            basic: user_password("basic", settings.basic)?,
            session_options: settings.session_options.map(|_| SessionOptions::default()),
        })
    }
}

fn oauth(section: &str, settings: Option<OAuthSettings>) -> ConfigResult<Option<OAuthConfig>> {
    let Some(s) = settings else {
        return Ok(None);
    };

    let required = |value: Option<String>, field: &str| {
        value.filter(|v| !v.is_empty()).ok_or_else(|| ConfigError::NotFound {
            key: format!("{}.{}", section, field),
        })
    };

    let client_secret: SecretString = s.client_secret.ok_or_else(|| ConfigError::NotFound {
        key: format!("{}.clientSecret", section),
    })?;

    Ok(Some(OAuthConfig {
        client_id: required(s.client_id, "clientID")?,
        client_secret,
        callback_url: required(s.callback_url, "callbackURL")?,
        auth_path: s.auth_path,
        callback_path: s.callback_path,
        auth_http_method: method_field(section, s.auth_http_method)?,
        failure_path: s.failure_path,
        redirect_path: s.redirect_path,
        scope: s.scope,
        authorization_url: s.authorization_url,
        validate: None,
    }))
}

fn user_password(
    section: &str,
    settings: Option<UserPasswordSettings>,
) -> ConfigResult<Option<UserPasswordConfig>> {
    let Some(s) = settings else {
        return Ok(None);
    };

    Ok(Some(UserPasswordConfig {
        auth_path: s.auth_path,
        auth_http_method: method_field(section, s.auth_http_method)?,
        failure_path: s.failure_path,
        redirect_path: s.redirect_path,
        username_field: s.username_field,
        password_field: s.password_field,
        realm: s.realm,
        session: s.session,
        validate: None,
    }))
}
