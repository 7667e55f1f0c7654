//! HTTP basic authentication.

use std::sync::Arc;

use async_trait::async_trait;
use http::Method;

use super::artifacts::{Artifacts, MiddlewareDescriptor, RouteDescriptor};
use super::name::BASIC;
use super::{AuthStrategy, completion_handler, guard_artifacts, login_options};
use crate::Error;
use crate::adapter::{IdentityAdapter, Registration, RequestVerifier};
use crate::config::UserPasswordConfig;
use crate::extract::{UserCredentials, basic_credentials};
use crate::outcome::{FailureShape, Validator, Verification};
use crate::request::AuthRequest;

const LABEL: &str = "Basic";

pub const DEFAULT_REALM: &str = "Users";

/// `Authorization: Basic` credentials. Stateless unless configured otherwise.
pub struct BasicStrategy {
    config: UserPasswordConfig,
    middlewares: Artifacts<Arc<dyn MiddlewareDescriptor>>,
    routes: Artifacts<RouteDescriptor>,
}

impl BasicStrategy {
    pub fn new(config: UserPasswordConfig) -> Self {
        Self {
            config,
            middlewares: Artifacts::new(),
            routes: Artifacts::new(),
        }
    }
}

impl AuthStrategy for BasicStrategy {
    fn init(&mut self, adapter: &Arc<dyn IdentityAdapter>) {
        let config = &self.config;
        adapter.use_strategy(
            BASIC,
            Registration::Request(Arc::new(BasicVerifier {
                realm: config
                    .realm
                    .clone()
                    .unwrap_or_else(|| DEFAULT_REALM.to_string()),
                validate: config.validate.clone(),
            })),
        );

        self.middlewares = guard_artifacts(BASIC, adapter);

        let path = config
            .auth_path
            .clone()
            .unwrap_or_else(|| format!("/auth/{}", BASIC));
        let options = login_options(config.failure_path.as_deref(), config.session.unwrap_or(false));
        let route = RouteDescriptor::new(
            path,
            config.auth_http_method.clone().unwrap_or(Method::POST),
            completion_handler(config.redirect_path.clone()),
        )
        .with_middleware(adapter.authenticate(BASIC, options));

        tracing::debug!(strategy = BASIC, path = %route.path, method = %route.method, "registered auth route");
        self.routes.insert("auth", route);
    }

    fn middlewares(&self) -> &Artifacts<Arc<dyn MiddlewareDescriptor>> {
        &self.middlewares
    }

    fn routes(&self) -> &Artifacts<RouteDescriptor> {
        &self.routes
    }
}

struct BasicVerifier {
    realm: String,
    validate: Option<Validator<UserCredentials>>,
}

#[async_trait]
impl RequestVerifier for BasicVerifier {
    fn scheme(&self) -> &'static str {
        LABEL
    }

    async fn verify(&self, request: &AuthRequest) -> Verification {
        let credentials = match basic_credentials(request) {
            Ok(credentials) => credentials,
            Err(e) => return Verification::Errored(e),
        };

        let Some(validate) = &self.validate else {
            return Verification::Denied(Error::MissingValidator { scheme: LABEL });
        };
        Verification::settle(validate(credentials).await, FailureShape::Denial)
    }

    fn challenge(&self) -> Option<String> {
        Some(format!("Basic realm=\"{}\"", self.realm))
    }
}
