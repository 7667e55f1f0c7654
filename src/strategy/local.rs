//! Username/password form login.

use std::sync::Arc;

use async_trait::async_trait;
use http::Method;

use super::artifacts::{Artifacts, MiddlewareDescriptor, RouteDescriptor};
use super::name::LOCAL;
use super::{AuthStrategy, completion_handler, guard_artifacts, login_options};
use crate::Error;
use crate::adapter::{IdentityAdapter, Registration, RequestVerifier};
use crate::config::UserPasswordConfig;
use crate::extract::{UserCredentials, form_credentials};
use crate::outcome::{FailureShape, Validator, Verification};
use crate::request::AuthRequest;

const LABEL: &str = "Local";

pub const DEFAULT_USERNAME_FIELD: &str = "username";
pub const DEFAULT_PASSWORD_FIELD: &str = "password";

/// Form login: credentials from body fields, with a single `auth` route.
pub struct LocalStrategy {
    config: UserPasswordConfig,
    middlewares: Artifacts<Arc<dyn MiddlewareDescriptor>>,
    routes: Artifacts<RouteDescriptor>,
}

impl LocalStrategy {
    pub fn new(config: UserPasswordConfig) -> Self {
        Self {
            config,
            middlewares: Artifacts::new(),
            routes: Artifacts::new(),
        }
    }
}

impl AuthStrategy for LocalStrategy {
    fn init(&mut self, adapter: &Arc<dyn IdentityAdapter>) {
        let config = &self.config;
        adapter.use_strategy(
            LOCAL,
            Registration::Request(Arc::new(LocalVerifier {
                username_field: config
                    .username_field
                    .clone()
                    .unwrap_or_else(|| DEFAULT_USERNAME_FIELD.to_string()),
                password_field: config
                    .password_field
                    .clone()
                    .unwrap_or_else(|| DEFAULT_PASSWORD_FIELD.to_string()),
                validate: config.validate.clone(),
            })),
        );

        self.middlewares = guard_artifacts(LOCAL, adapter);

        let path = config
            .auth_path
            .clone()
            .unwrap_or_else(|| format!("/auth/{}", LOCAL));
        let options = login_options(config.failure_path.as_deref(), config.session.unwrap_or(true));
        let route = RouteDescriptor::new(
            path,
            config.auth_http_method.clone().unwrap_or(Method::POST),
            completion_handler(config.redirect_path.clone()),
        )
        .with_middleware(adapter.authenticate(LOCAL, options));

        tracing::debug!(strategy = LOCAL, path = %route.path, method = %route.method, "registered auth route");
        self.routes.insert("auth", route);
    }

    fn middlewares(&self) -> &Artifacts<Arc<dyn MiddlewareDescriptor>> {
        &self.middlewares
    }

    fn routes(&self) -> &Artifacts<RouteDescriptor> {
        &self.routes
    }
}

struct LocalVerifier {
    username_field: String,
    password_field: String,
    validate: Option<Validator<UserCredentials>>,
}

#[async_trait]
impl RequestVerifier for LocalVerifier {
    fn scheme(&self) -> &'static str {
        LABEL
    }

    async fn verify(&self, request: &AuthRequest) -> Verification {
        let Some(credentials) = form_credentials(request, &self.username_field, &self.password_field)
        else {
            return Verification::Errored(Error::CredentialNotProvided {
                scheme: LABEL,
                what: "Credentials",
            });
        };

        let Some(validate) = &self.validate else {
            return Verification::Denied(Error::MissingValidator { scheme: LABEL });
        };
        Verification::settle(validate(credentials).await, FailureShape::Denial)
    }
}
