//! Credential-scheme strategies and the artifacts they expose.

mod api_key;
mod artifacts;
mod basic;
mod local;
pub mod name;
mod redirect;
mod token;
mod traits;

use std::sync::Arc;

pub use api_key::ApiKeyStrategy;
pub use artifacts::{Artifacts, MiddlewareDescriptor, MiddlewareFilter, RouteDescriptor, Selected};
pub use basic::BasicStrategy;
pub use local::LocalStrategy;
pub use name::StrategyType;
pub use redirect::{ProviderKind, RedirectStrategy};
pub use token::TokenStrategy;
pub use traits::AuthStrategy;

use crate::adapter::{AuthenticateOptions, IdentityAdapter};
use crate::middleware::{AUTHENTICATED_ONLY, AuthenticatedOnlyMiddleware};
use crate::request::{AuthRequest, AuthResponse, Flow, Middleware, middleware_fn};

/// Terminal route handler: redirect to `redirect_path` when set, otherwise
/// hand over to the next handler. The redirect carries the request's session.
pub(crate) fn completion_handler(redirect_path: Option<String>) -> Middleware {
    middleware_fn(move |request: AuthRequest| {
        let flow = match &redirect_path {
            Some(path) => {
                Flow::Respond(AuthResponse::redirect(path).with_session(request.session))
            }
            None => Flow::Continue(request),
        };
        async move { flow }
    })
}

/// Options for a login route's authenticate step.
pub(crate) fn login_options(failure_path: Option<&str>, session: bool) -> AuthenticateOptions {
    let options = AuthenticateOptions::default().session(session);
    match failure_path {
        Some(path) => options.failure_redirect(path).failure_message(true),
        None => options,
    }
}

pub(crate) fn guard_artifacts(
    strategy: &str,
    adapter: &Arc<dyn IdentityAdapter>,
) -> Artifacts<Arc<dyn MiddlewareDescriptor>> {
    let mut middlewares: Artifacts<Arc<dyn MiddlewareDescriptor>> = Artifacts::new();
    middlewares.insert(
        AUTHENTICATED_ONLY,
        Arc::new(AuthenticatedOnlyMiddleware::new(strategy, Arc::clone(adapter))),
    );
    middlewares
}
