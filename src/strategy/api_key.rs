//! API key strategy.

use std::sync::Arc;

use async_trait::async_trait;

use super::artifacts::{Artifacts, MiddlewareDescriptor, RouteDescriptor};
use super::name::API_KEY;
use super::{AuthStrategy, guard_artifacts};
use crate::Error;
use crate::adapter::{IdentityAdapter, Registration, RequestVerifier};
use crate::config::ApiKeyConfig;
use crate::extract;
use crate::outcome::{FailureShape, Validator, Verification};
use crate::request::AuthRequest;

const LABEL: &str = "API Key";

/// Authenticates a static API key from a header or query parameter.
pub struct ApiKeyStrategy {
    config: ApiKeyConfig,
    middlewares: Artifacts<Arc<dyn MiddlewareDescriptor>>,
    routes: Artifacts<RouteDescriptor>,
}

impl ApiKeyStrategy {
    pub fn new(config: ApiKeyConfig) -> Self {
        Self {
            config,
            middlewares: Artifacts::new(),
            routes: Artifacts::new(),
        }
    }
}

impl AuthStrategy for ApiKeyStrategy {
    fn init(&mut self, adapter: &Arc<dyn IdentityAdapter>) {
        adapter.use_strategy(
            API_KEY,
            Registration::Request(Arc::new(ApiKeyVerifier {
                header: self.config.header.clone(),
                query_param: self.config.query_param.clone(),
                validate: self.config.validate.clone(),
            })),
        );
        self.middlewares = guard_artifacts(API_KEY, adapter);
        tracing::debug!(
            strategy = API_KEY,
            header = ?self.config.header,
            query_param = ?self.config.query_param,
            "strategy initialized"
        );
    }

    fn middlewares(&self) -> &Artifacts<Arc<dyn MiddlewareDescriptor>> {
        &self.middlewares
    }

    fn routes(&self) -> &Artifacts<RouteDescriptor> {
        &self.routes
    }
}

struct ApiKeyVerifier {
    header: Option<String>,
    query_param: Option<String>,
    validate: Option<Validator<String>>,
}

#[async_trait]
impl RequestVerifier for ApiKeyVerifier {
    fn scheme(&self) -> &'static str {
        LABEL
    }

    /// Failures here use the bare `(error)` shape, including validator errors.
    async fn verify(&self, request: &AuthRequest) -> Verification {
        let Some(key) =
            extract::api_key(request, self.header.as_deref(), self.query_param.as_deref())
        else {
            return Verification::Errored(Error::CredentialNotProvided {
                scheme: LABEL,
                what: LABEL,
            });
        };

        let Some(validate) = &self.validate else {
            return Verification::Errored(Error::MissingValidator { scheme: LABEL });
        };
        Verification::settle(validate(key).await, FailureShape::Bare)
    }
}
