//! Authentication strategy trait.

use std::sync::Arc;

use super::artifacts::{Artifacts, MiddlewareDescriptor, MiddlewareFilter, RouteDescriptor, Selected};
use crate::adapter::IdentityAdapter;

/// One credential scheme.
///
/// A strategy is inert until [`init`](Self::init) registers it with the
/// adapter and fills its middleware and route tables; afterwards both tables
/// are read-only.
pub trait AuthStrategy: Send + Sync {
    /// Register with the adapter and build middleware and routes.
    ///
    /// Called once by the orchestrator. Performs no I/O.
    fn init(&mut self, adapter: &Arc<dyn IdentityAdapter>);

    fn middlewares(&self) -> &Artifacts<Arc<dyn MiddlewareDescriptor>>;

    fn routes(&self) -> &Artifacts<RouteDescriptor>;

    fn get_middlewares(&self, filter: MiddlewareFilter<'_>) -> Selected<Arc<dyn MiddlewareDescriptor>> {
        self.middlewares().select(filter)
    }

    fn get_routes(&self, name: Option<&str>) -> Selected<RouteDescriptor> {
        self.routes().select(name)
    }
}
