//! "Require this scheme" guard shared by every built-in strategy.

use std::fmt;
use std::sync::Arc;

use crate::adapter::{AuthenticateOptions, IdentityAdapter};
use crate::request::Middleware;
use crate::strategy::MiddlewareDescriptor;

/// Key under which strategies expose the guard.
pub const AUTHENTICATED_ONLY: &str = "authenticated_only";

/// Middleware descriptor that enforces authentication against one strategy.
///
/// Always dynamic: it is bound to a strategy per route and cannot be mounted
/// once globally.
#[derive(Clone)]
pub struct AuthenticatedOnlyMiddleware {
    strategy: String,
    adapter: Arc<dyn IdentityAdapter>,
}

impl AuthenticatedOnlyMiddleware {
    pub fn new(strategy: impl Into<String>, adapter: Arc<dyn IdentityAdapter>) -> Self {
        Self {
            strategy: strategy.into(),
            adapter,
        }
    }

    /// Name of the strategy this guard enforces.
    pub fn strategy(&self) -> &str {
        &self.strategy
    }
}

impl MiddlewareDescriptor for AuthenticatedOnlyMiddleware {
    fn name(&self) -> &str {
        AUTHENTICATED_ONLY
    }

    fn is_dynamic(&self) -> bool {
        true
    }

    fn apply(&self, options: Option<AuthenticateOptions>) -> Middleware {
        self.adapter
            .authenticate(&self.strategy, options.unwrap_or_default())
    }
}

impl fmt::Debug for AuthenticatedOnlyMiddleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedOnlyMiddleware")
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}
