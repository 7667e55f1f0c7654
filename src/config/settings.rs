//! Serializable auth settings.
//!
//! The callback-free half of [`AuthConfig`](super::AuthConfig), loaded from a
//! JSON file with camelCase keys:
//!
//! ```json
//! {
//!   "jwt": { "secretOrKey": "...", "algorithms": ["HS256"] },
//!   "apiKey": { "apiKeyHeader": "x-service-key", "apiKeyQueryParam": "key" },
//!   "google": {
//!     "clientID": "...", "clientSecret": "...",
//!     "callbackURL": "https://app.example/auth/google/callback",
//!     "failurePath": "/login"
//!   },
//!   "local": { "authPath": "/login", "redirectPath": "/" },
//!   "sessionOptions": {}
//! }
//! ```

use std::path::Path;

use jsonwebtoken::Algorithm;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};

use super::{ConfigError, ConfigResult, ValidationErrors};
use crate::extract::TokenExtractor;

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "AUTHMUX_";

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSettings {
    #[serde(default)]
    pub jwt: Option<TokenSettings>,
    #[serde(default)]
    pub api_key: Option<ApiKeySettings>,
    #[serde(default)]
    pub facebook: Option<OAuthSettings>,
    #[serde(default)]
    pub google: Option<OAuthSettings>,
    #[serde(default)]
    pub twitter: Option<OAuthSettings>,
    #[serde(default)]
    pub local: Option<UserPasswordSettings>,
    #[serde(default)]
    pub basic: Option<UserPasswordSettings>,
    #[serde(default)]
    pub session_options: Option<SessionSettings>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSettings {
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub secret_or_key: Option<SecretString>,
    #[serde(default)]
    pub algorithms: Vec<Algorithm>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    #[serde(default)]
    pub ignore_expiration: bool,
    #[serde(default)]
    pub jwt_from_request: Option<ExtractorSettings>,
}

/// Serializable token location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtractorSettings {
    BearerHeader,
    AuthScheme(String),
    Header(String),
    QueryParam(String),
    BodyField(String),
    Cookie(String),
    FirstOf(Vec<ExtractorSettings>),
}

impl From<ExtractorSettings> for TokenExtractor {
    fn from(settings: ExtractorSettings) -> Self {
        match settings {
            ExtractorSettings::BearerHeader => TokenExtractor::BearerHeader,
            ExtractorSettings::AuthScheme(s) => TokenExtractor::AuthScheme(s),
            ExtractorSettings::Header(s) => TokenExtractor::Header(s),
            ExtractorSettings::QueryParam(s) => TokenExtractor::QueryParam(s),
            ExtractorSettings::BodyField(s) => TokenExtractor::BodyField(s),
            ExtractorSettings::Cookie(s) => TokenExtractor::Cookie(s),
            ExtractorSettings::FirstOf(list) => {
                TokenExtractor::FirstOf(list.into_iter().map(Into::into).collect())
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeySettings {
    pub api_key_header: Option<String>,
    pub api_key_query_param: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPasswordSettings {
    pub auth_path: Option<String>,
    pub auth_http_method: Option<String>,
    pub failure_path: Option<String>,
    pub redirect_path: Option<String>,
    pub username_field: Option<String>,
    pub password_field: Option<String>,
    pub realm: Option<String>,
    pub session: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthSettings {
    #[serde(rename = "clientID", alias = "consumerKey", default)]
    pub client_id: Option<String>,
    #[serde(
        alias = "consumerSecret",
        default,
        deserialize_with = "deserialize_secret"
    )]
    pub client_secret: Option<SecretString>,
    #[serde(rename = "callbackURL", default)]
    pub callback_url: Option<String>,
    pub auth_path: Option<String>,
    pub callback_path: Option<String>,
    pub auth_http_method: Option<String>,
    pub failure_path: Option<String>,
    pub redirect_path: Option<String>,
    #[serde(default)]
    pub scope: Vec<String>,
    #[serde(rename = "authorizationURL")]
    pub authorization_url: Option<String>,
}

/// Marker section: present means sessions are enabled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionSettings {}

impl AuthSettings {
    /// Load settings from a JSON file; a missing file yields empty settings.
    pub async fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !tokio::fs::try_exists(path).await? {
            tracing::debug!(path = %path.display(), "auth settings file not found");
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Apply `AUTHMUX_*` secret overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`, keyed by environment variable name.
    ///
    /// Only sections that are already present are overridden.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |suffix: &str| {
            lookup(&format!("{}{}", ENV_PREFIX, suffix)).filter(|v| !v.is_empty())
        };

        if let Some(jwt) = self.jwt.as_mut()
            && let Some(secret) = var("JWT_SECRET")
        {
            jwt.secret_or_key = Some(SecretString::from(secret));
        }

        for (name, provider) in [
            ("FACEBOOK", self.facebook.as_mut()),
            ("GOOGLE", self.google.as_mut()),
            ("TWITTER", self.twitter.as_mut()),
        ] {
            let Some(provider) = provider else { continue };
            if let Some(id) = var(&format!("{}_CLIENT_ID", name)) {
                provider.client_id = Some(id);
            }
            if let Some(secret) = var(&format!("{}_CLIENT_SECRET", name)) {
                provider.client_secret = Some(SecretString::from(secret));
            }
        }
    }

    /// Structural checks. Missing validators are not reported here.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut errors = Vec::new();

        if let Some(jwt) = &self.jwt
            && jwt.secret_or_key.is_none()
        {
            errors.push(invalid("jwt.secretOrKey", "is required"));
        }

        for (name, provider) in self.providers() {
            if provider.client_id.as_deref().is_none_or(str::is_empty) {
                errors.push(invalid(format!("{}.clientID", name), "is required"));
            }
            if provider.client_secret.is_none() {
                errors.push(invalid(format!("{}.clientSecret", name), "is required"));
            }
            match provider.callback_url.as_deref() {
                None => errors.push(invalid(format!("{}.callbackURL", name), "is required")),
                Some(url) => {
                    if let Err(e) = url::Url::parse(url) {
                        errors.push(invalid(format!("{}.callbackURL", name), e.to_string()));
                    }
                }
            }
            check_path(&mut errors, name, "authPath", &provider.auth_path);
            check_path(&mut errors, name, "callbackPath", &provider.callback_path);
            check_path(&mut errors, name, "failurePath", &provider.failure_path);
            check_path(&mut errors, name, "redirectPath", &provider.redirect_path);
            check_method(&mut errors, name, &provider.auth_http_method);
        }

        for (name, section) in [("local", &self.local), ("basic", &self.basic)] {
            let Some(section) = section else { continue };
            check_path(&mut errors, name, "authPath", &section.auth_path);
            check_path(&mut errors, name, "failurePath", &section.failure_path);
            check_path(&mut errors, name, "redirectPath", &section.redirect_path);
            check_method(&mut errors, name, &section.auth_http_method);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::ValidationErrors(ValidationErrors(errors)))
        }
    }

    fn providers(&self) -> impl Iterator<Item = (&'static str, &OAuthSettings)> {
        [
            ("facebook", self.facebook.as_ref()),
            ("google", self.google.as_ref()),
            ("twitter", self.twitter.as_ref()),
        ]
        .into_iter()
        .filter_map(|(name, p)| p.map(|p| (name, p)))
    }
}

fn invalid(key: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.into(),
        message: message.into(),
    }
}

fn check_path(errors: &mut Vec<ConfigError>, section: &str, field: &str, path: &Option<String>) {
    if let Some(path) = path
        && !path.starts_with('/')
    {
        errors.push(invalid(
            format!("{}.{}", section, field),
            format!("'{}' must start with '/'", path),
        ));
    }
}

fn check_method(errors: &mut Vec<ConfigError>, section: &str, method: &Option<String>) {
    if let Some(method) = method
        && super::parse_method(method).is_err()
    {
        errors.push(invalid(
            format!("{}.authHttpMethod", section),
            format!("unsupported method '{}'", method),
        ));
    }
}
