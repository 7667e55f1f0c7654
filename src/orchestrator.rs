//! Strategy registry and initialization sequence.

use std::sync::Arc;

use crate::adapter::{Component, IdentityAdapter, InitializeOptions};
use crate::config::{AuthConfig, SessionOptions};
use crate::strategy::name::{API_KEY, BASIC, JWT, LOCAL};
use crate::strategy::{
    ApiKeyStrategy, Artifacts, AuthStrategy, BasicStrategy, LocalStrategy, MiddlewareDescriptor,
    MiddlewareFilter, RedirectStrategy, RouteDescriptor, TokenStrategy,
};

/// Owns the named strategies built from an [`AuthConfig`] and drives their
/// registration with the adapter.
///
/// Built-in strategies are inserted in a fixed order: jwt, api-key,
/// facebook, google, twitter, local, basic. Sections absent from the config
/// are skipped.
///
/// [`init`](Self::init) is expected to run once; calling it again registers
/// every strategy with the adapter a second time.
pub struct AuthOrchestrator {
    adapter: Arc<dyn IdentityAdapter>,
    session_options: Option<SessionOptions>,
    strategies: Artifacts<Box<dyn AuthStrategy>>,
    initialized: bool,
}

impl AuthOrchestrator {
    pub fn new(config: AuthConfig, adapter: Arc<dyn IdentityAdapter>) -> Self {
        let AuthConfig {
            jwt,
            api_key,
            facebook,
            google,
            twitter,
            local,
            basic,
            session_options,
        } = config;

        let mut orchestrator = Self {
            adapter,
            session_options,
            strategies: Artifacts::new(),
            initialized: false,
        };

        if let Some(config) = jwt {
            orchestrator.add_strategy(JWT, TokenStrategy::new(config));
        }
        if let Some(config) = api_key {
            orchestrator.add_strategy(API_KEY, ApiKeyStrategy::new(config));
        }
        for strategy in [
            facebook.map(RedirectStrategy::facebook),
            google.map(RedirectStrategy::google),
            twitter.map(RedirectStrategy::twitter),
        ]
        .into_iter()
        .flatten()
        {
            orchestrator.add_strategy(strategy.kind().name(), strategy);
        }
        if let Some(config) = local {
            orchestrator.add_strategy(LOCAL, LocalStrategy::new(config));
        }
        if let Some(config) = basic {
            orchestrator.add_strategy(BASIC, BasicStrategy::new(config));
        }

        orchestrator
    }

    /// Insert or replace the strategy registered under `name`.
    pub fn add_strategy<S: AuthStrategy + 'static>(
        &mut self,
        name: impl Into<String>,
        strategy: S,
    ) -> &mut Self {
        self.add_boxed_strategy(name, Box::new(strategy))
    }

    pub fn add_boxed_strategy(
        &mut self,
        name: impl Into<String>,
        strategy: Box<dyn AuthStrategy>,
    ) -> &mut Self {
        let name = name.into();
        if self.initialized {
            tracing::warn!(strategy = %name, "strategy added after init; it is not registered with the adapter");
        }
        tracing::debug!(strategy = %name, replaced = self.strategies.contains(&name), "adding strategy");
        self.strategies.insert(name, strategy);
        self
    }

    pub fn get_strategy(&self, name: &str) -> Option<&dyn AuthStrategy> {
        self.strategies.get(name).map(|s| s.as_ref())
    }

    pub fn has_strategy(&self, name: &str) -> bool {
        self.strategies.contains(name)
    }

    /// Strategy names in registry order.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.names()
    }

    pub fn strategies(&self) -> impl Iterator<Item = (&str, &dyn AuthStrategy)> {
        self.strategies.iter().map(|(name, s)| (name, s.as_ref()))
    }

    pub fn adapter(&self) -> &Arc<dyn IdentityAdapter> {
        &self.adapter
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Every strategy's routes, in registry order.
    pub fn routes(&self) -> Vec<RouteDescriptor> {
        self.strategies
            .values()
            .flat_map(|s| s.get_routes(None).into_vec())
            .collect()
    }

    /// Every strategy's middleware matching `filter`, in registry order.
    pub fn middlewares(&self, filter: MiddlewareFilter<'_>) -> Vec<Arc<dyn MiddlewareDescriptor>> {
        self.strategies
            .values()
            .flat_map(|s| s.get_middlewares(filter).into_vec())
            .collect()
    }

    /// Wire session hooks, build the adapter components and initialize every
    /// strategy.
    ///
    /// Returns the components to mount at application start: the session
    /// component first when session options are configured, the initialize
    /// component last.
    pub fn init(&mut self, options: Option<InitializeOptions>) -> Vec<Component> {
        if self.initialized {
            tracing::warn!("auth orchestrator initialized more than once");
        }

        let mut components = Vec::new();
        if let Some(session) = &self.session_options {
            components.push(self.adapter.session());
            if let Some(serialize) = &session.serialize {
                self.adapter.serialize_user(Arc::clone(serialize));
            }
            if let Some(deserialize) = &session.deserialize {
                self.adapter.deserialize_user(Arc::clone(deserialize));
            }
        }

        components.push(self.adapter.initialize(options.unwrap_or_default()));

        for strategy in self.strategies.values_mut() {
            strategy.init(&self.adapter);
        }
        self.initialized = true;

        tracing::info!(
            strategies = ?self.strategies.names(),
            components = components.len(),
            sessions = self.session_options.is_some(),
            "authentication initialized"
        );

        components
    }
}

impl std::fmt::Debug for AuthOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthOrchestrator")
            .field("strategies", &self.strategies.names())
            .field("session_options", &self.session_options)
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}
