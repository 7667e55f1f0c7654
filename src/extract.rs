//! Credential extraction from inbound requests.
//!
//! Extractors are pure lookups: they never verify anything and never fail
//! loudly. A `None` (or a credential-absent [`Error`]) is turned into the
//! scheme's "not provided" outcome by the calling strategy.

use std::fmt;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};

use crate::Error;
use crate::request::AuthRequest;

/// Header consulted when the configured API key header is absent.
pub const FALLBACK_API_KEY_HEADER: &str = "x-api-key";

/// Where a token-scheme credential is read from.
#[derive(Clone, Default)]
pub enum TokenExtractor {
    /// `Authorization: Bearer <token>`.
    #[default]
    BearerHeader,
    /// `Authorization: <scheme> <token>` with a custom scheme.
    AuthScheme(String),
    Header(String),
    QueryParam(String),
    BodyField(String),
    Cookie(String),
    /// First extractor that yields a token.
    FirstOf(Vec<TokenExtractor>),
    Custom(Arc<dyn Fn(&AuthRequest) -> Option<String> + Send + Sync>),
}

impl TokenExtractor {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&AuthRequest) -> Option<String> + Send + Sync + 'static,
    {
        TokenExtractor::Custom(Arc::new(f))
    }

    pub fn extract(&self, request: &AuthRequest) -> Option<String> {
        match self {
            TokenExtractor::BearerHeader => request
                .header_str(AUTHORIZATION.as_str())
                .and_then(|h| auth_scheme_token(h, "bearer"))
                .map(str::to_string),
            TokenExtractor::AuthScheme(scheme) => request
                .header_str(AUTHORIZATION.as_str())
                .and_then(|h| auth_scheme_token(h, scheme))
                .map(str::to_string),
            TokenExtractor::Header(name) => request.header_str(name).map(str::to_string),
            TokenExtractor::QueryParam(name) => request.query_str(name).map(str::to_string),
            TokenExtractor::BodyField(name) => request.body_str(name).map(str::to_string),
            TokenExtractor::Cookie(name) => request.cookie(name).map(str::to_string),
            TokenExtractor::FirstOf(extractors) => {
                extractors.iter().find_map(|e| e.extract(request))
            }
            TokenExtractor::Custom(f) => f(request).filter(|t| !t.is_empty()),
        }
    }
}

impl fmt::Debug for TokenExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenExtractor::BearerHeader => f.write_str("BearerHeader"),
            TokenExtractor::AuthScheme(s) => f.debug_tuple("AuthScheme").field(s).finish(),
            TokenExtractor::Header(s) => f.debug_tuple("Header").field(s).finish(),
            TokenExtractor::QueryParam(s) => f.debug_tuple("QueryParam").field(s).finish(),
            TokenExtractor::BodyField(s) => f.debug_tuple("BodyField").field(s).finish(),
            TokenExtractor::Cookie(s) => f.debug_tuple("Cookie").field(s).finish(),
            TokenExtractor::FirstOf(list) => f.debug_tuple("FirstOf").field(list).finish(),
            TokenExtractor::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Token from an authorization header value using `scheme`.
///
/// The scheme matches case-insensitively; values with extra segments are
/// rejected.
pub fn auth_scheme_token<'a>(header_value: &'a str, scheme: &str) -> Option<&'a str> {
    let mut parts = header_value.split_whitespace();
    if !parts.next()?.eq_ignore_ascii_case(scheme) {
        return None;
    }
    let token = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some(token)
}

/// API key lookup: configured header, then [`FALLBACK_API_KEY_HEADER`], then
/// the configured query parameter.
pub fn api_key(
    request: &AuthRequest,
    header: Option<&str>,
    query_param: Option<&str>,
) -> Option<String> {
    header
        .and_then(|name| request.header_str(name))
        .or_else(|| request.header_str(FALLBACK_API_KEY_HEADER))
        .or_else(|| query_param.and_then(|name| request.query_str(name)))
        .map(str::to_string)
}

/// Username/password pair handed to password-based validators.
#[derive(Clone)]
pub struct UserCredentials {
    pub username: String,
    pub password: SecretString,
}

impl UserCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Credentials from body fields, falling back to the query string.
pub fn form_credentials(
    request: &AuthRequest,
    username_field: &str,
    password_field: &str,
) -> Option<UserCredentials> {
    let lookup = |field: &str| request.body_str(field).or_else(|| request.query_str(field));
    let username = lookup(username_field)?;
    let password = lookup(password_field)?;
    Some(UserCredentials::new(username, password))
}

/// Credentials from an `Authorization: Basic` header.
pub fn basic_credentials(request: &AuthRequest) -> Result<UserCredentials, Error> {
    let encoded = request
        .header_str(AUTHORIZATION.as_str())
        .and_then(|h| auth_scheme_token(h, "basic"))
        .ok_or(Error::CredentialNotProvided {
            scheme: "Basic",
            what: "Credentials",
        })?;

    let malformed = |message: &str| Error::MalformedCredential {
        scheme: "Basic",
        message: message.to_string(),
    };

    let decoded = STANDARD
        .decode(encoded)
        .map_err(|_| malformed("invalid base64"))?;
    let decoded = String::from_utf8(decoded).map_err(|_| malformed("invalid UTF-8"))?;
    let (username, password) = decoded
        .split_once(':')
        .ok_or_else(|| malformed("missing ':' separator"))?;

    Ok(UserCredentials::new(username, password))
}
