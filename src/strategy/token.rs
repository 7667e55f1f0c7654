//! Token (JWT) strategy.

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use secrecy::ExposeSecret;

use super::artifacts::{Artifacts, MiddlewareDescriptor, RouteDescriptor};
use super::name::{JWT, StrategyType};
use super::{AuthStrategy, guard_artifacts};
use crate::Error;
use crate::adapter::{IdentityAdapter, Registration, RequestVerifier};
use crate::config::TokenConfig;
use crate::extract::TokenExtractor;
use crate::outcome::{FailureShape, Identity, Validator, Verification};
use crate::request::AuthRequest;

const LABEL: &str = "JWT";

/// Authenticates a signed token carried by the request.
///
/// Registers no routes; hosts gate routes with the `authenticated_only`
/// middleware.
pub struct TokenStrategy {
    config: TokenConfig,
    middlewares: Artifacts<Arc<dyn MiddlewareDescriptor>>,
    routes: Artifacts<RouteDescriptor>,
}

impl TokenStrategy {
    pub fn new(config: TokenConfig) -> Self {
        Self {
            config,
            middlewares: Artifacts::new(),
            routes: Artifacts::new(),
        }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }
}

impl AuthStrategy for TokenStrategy {
    fn init(&mut self, adapter: &Arc<dyn IdentityAdapter>) {
        adapter.use_strategy(
            JWT,
            Registration::Request(Arc::new(TokenVerifier::new(&self.config))),
        );
        self.middlewares = guard_artifacts(JWT, adapter);
        tracing::debug!(strategy = %StrategyType::Jwt, extractor = ?self.config.extractor, "strategy initialized");
    }

    fn middlewares(&self) -> &Artifacts<Arc<dyn MiddlewareDescriptor>> {
        &self.middlewares
    }

    fn routes(&self) -> &Artifacts<RouteDescriptor> {
        &self.routes
    }
}

struct TokenVerifier {
    extractor: TokenExtractor,
    key: std::result::Result<DecodingKey, String>,
    validation: Validation,
    validate: Option<Validator<Identity>>,
}

impl TokenVerifier {
    fn new(config: &TokenConfig) -> Self {
        let algorithm = config
            .algorithms
            .first()
            .copied()
            .unwrap_or(Algorithm::HS256);

        let mut validation = Validation::new(algorithm);
        if !config.algorithms.is_empty() {
            validation.algorithms = config.algorithms.clone();
        }
        validation.required_spec_claims.clear();
        validation.validate_exp = !config.ignore_expiration;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            extractor: config.extractor.clone(),
            key: decoding_key(config, algorithm),
            validation,
            validate: config.validate.clone(),
        }
    }
}

fn decoding_key(config: &TokenConfig, algorithm: Algorithm) -> std::result::Result<DecodingKey, String> {
    let secret = config
        .secret_or_key
        .as_ref()
        .ok_or_else(|| "no JWT secretOrKey configured".to_string())?
        .expose_secret()
        .as_bytes();

    let key = match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
            return Ok(DecodingKey::from_secret(secret));
        }
        Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(secret),
        Algorithm::EdDSA => DecodingKey::from_ed_pem(secret),
        _ => DecodingKey::from_rsa_pem(secret),
    };
    key.map_err(|e| format!("invalid JWT key for {:?}: {}", algorithm, e))
}

#[async_trait]
impl RequestVerifier for TokenVerifier {
    fn scheme(&self) -> &'static str {
        LABEL
    }

    async fn verify(&self, request: &AuthRequest) -> Verification {
        let Some(token) = self.extractor.extract(request) else {
            return Verification::Errored(Error::CredentialNotProvided {
                scheme: LABEL,
                what: "Auth token",
            });
        };

        let key = match &self.key {
            Ok(key) => key,
            Err(message) => return Verification::Errored(Error::Config(message.clone())),
        };

        let claims = match jsonwebtoken::decode::<Identity>(&token, key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::warn!(error = %e, "JWT validation failed");
                return Verification::Denied(Error::InvalidToken(e.to_string()));
            }
        };

        let Some(validate) = &self.validate else {
            return Verification::Denied(Error::MissingValidator { scheme: LABEL });
        };
        Verification::settle(validate(claims).await, FailureShape::Denial)
    }
}
