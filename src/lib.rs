//! # authmux
//!
//! Pluggable authentication orchestration for HTTP services.
//!
//! A declarative [`AuthConfig`] enumerates the enabled credential schemes
//! (token, API key, username/password, HTTP basic and OAuth-style redirect
//! providers). The [`AuthOrchestrator`] builds one strategy per scheme, wires
//! each into an injected [`IdentityAdapter`], and exposes route and middleware
//! descriptors the host server mounts without knowing scheme details.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use authmux::{
//!     ApiKeyConfig, AuthConfig, AuthOrchestrator, InProcessAdapter, MiddlewareFilter, StrategyType,
//! };
//! use serde_json::json;
//!
//! # fn main() {
//! let config = AuthConfig::new().api_key(
//!     ApiKeyConfig::new()
//!         .header("x-service-key")
//!         .with_validator(|key: String| async move {
//!             Ok(json!({ "key": key }))
//!         }),
//! );
//!
//! let adapter = Arc::new(InProcessAdapter::new());
//! let mut auth = AuthOrchestrator::new(config, adapter);
//! let components = auth.init(None);
//!
//! let guard = auth
//!     .get_strategy(StrategyType::ApiKey.as_str())
//!     .and_then(|s| s.get_middlewares(MiddlewareFilter::OnlyDynamic).into_vec().pop());
//! # let _ = (components, guard);
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod adapter;
pub mod config;
pub mod extract;
pub mod middleware;
pub mod orchestrator;
pub mod outcome;
pub mod prelude;
pub mod request;
pub mod strategy;

pub use adapter::{
    AuthenticateOptions, CallbackParams, Component, ComponentKind, DeserializeUser,
    IdentityAdapter, InProcessAdapter, InitializeOptions, Profile, ProfileVerifier,
    ProviderExchange, ProviderGrant, ProviderRegistration, Registration, RequestVerifier,
    SerializeUser,
};
pub use config::{
    ApiKeyConfig, AuthConfig, AuthSettings, ConfigError, OAuthConfig, SessionOptions,
    TokenConfig, UserPasswordConfig,
};
pub use extract::{TokenExtractor, UserCredentials};
pub use middleware::{AUTHENTICATED_ONLY, AuthenticatedOnlyMiddleware};
pub use orchestrator::AuthOrchestrator;
pub use outcome::{Identity, ValidationError, ValidationResult, Validator, Verification};
pub use request::{AuthRequest, AuthResponse, Flow, Middleware, middleware_fn, run_chain};
pub use strategy::{
    ApiKeyStrategy, Artifacts, AuthStrategy, BasicStrategy, LocalStrategy, MiddlewareDescriptor,
    MiddlewareFilter, ProviderKind, RedirectStrategy, RouteDescriptor, Selected, StrategyType,
    TokenStrategy,
};

/// Error type for authmux operations.
///
/// Every failure produced while authenticating a request ends up in one of
/// these variants and travels through [`Verification`] or [`Flow::Fail`];
/// nothing is raised across the strategy boundary.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The request carried no candidate credential for the scheme.
    #[error("{what} not provided")]
    CredentialNotProvided {
        /// Scheme that looked for the credential
        scheme: &'static str,
        /// What was missing, as shown to the client
        what: &'static str,
    },

    /// A credential was present but could not be decoded.
    #[error("Malformed {scheme} credential: {message}")]
    MalformedCredential {
        /// Scheme that tried to decode the credential
        scheme: &'static str,
        /// Why decoding failed
        message: String,
    },

    /// The scheme was configured without a `validate` callback.
    #[error("Missing {scheme} validator")]
    MissingValidator {
        /// Scheme whose `validate` callback is absent
        scheme: &'static str,
    },

    /// Token signature or claims did not verify.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// The host `validate` callback returned an error value.
    ///
    /// The wrapped error is the exact object the callback returned.
    #[error("{0}")]
    Validation(ValidationError),

    /// No strategy is registered with the adapter under this name.
    #[error("Unknown authentication strategy \"{0}\"")]
    UnknownStrategy(String),

    /// The adapter's initialize component did not run for this request.
    #[error("Authentication adapter not initialized for this request")]
    NotInitialized,

    /// Session serialization or restoration failed.
    #[error("Session error: {0}")]
    Session(String),

    /// Adapter-level failure (provider redirect or exchange).
    #[error("Adapter error: {0}")]
    Adapter(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error category, one per failure class of the verification pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Extraction found no usable credential.
    CredentialAbsent,
    /// The credential was checked and refused.
    VerificationFailure,
    /// Missing validator, bad settings, unknown strategy names.
    Configuration,
    /// Redirect-flow and session plumbing owned by the adapter.
    Adapter,
    /// IO and serialization.
    Internal,
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::CredentialNotProvided { .. } | Error::MalformedCredential { .. } => {
                ErrorCategory::CredentialAbsent
            }
            Error::InvalidToken(_) | Error::Validation(_) => ErrorCategory::VerificationFailure,
            Error::MissingValidator { .. }
            | Error::UnknownStrategy(_)
            | Error::NotInitialized
            | Error::Config(_) => ErrorCategory::Configuration,
            Error::Session(_) | Error::Adapter(_) => ErrorCategory::Adapter,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Internal,
        }
    }

    pub fn is_credential_absent(&self) -> bool {
        self.category() == ErrorCategory::CredentialAbsent
    }

    pub fn is_configuration_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    /// HTTP status a host should answer with when it renders this error.
    pub fn status_code(&self) -> http::StatusCode {
        match self {
            Error::MalformedCredential { .. } => http::StatusCode::BAD_REQUEST,
            Error::CredentialNotProvided { .. }
            | Error::InvalidToken(_)
            | Error::Validation(_) => http::StatusCode::UNAUTHORIZED,
            Error::Adapter(_) => http::StatusCode::BAD_GATEWAY,
            _ => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The host error carried by [`Error::Validation`], if any.
    pub fn validation_error(&self) -> Option<&ValidationError> {
        match self {
            Error::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(e) => Error::Io(e),
            ConfigError::Serialization(e) => Error::Json(e),
            other => Error::Config(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
