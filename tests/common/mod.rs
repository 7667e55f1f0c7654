//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use authmux::{
    AuthRequest, AuthenticateOptions, Component, ComponentKind, DeserializeUser, Flow,
    IdentityAdapter, InitializeOptions, Middleware, Registration, SerializeUser, middleware_fn,
};

/// One call observed by [`RecordingAdapter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Use { name: String, provider: bool },
    Authenticate { name: String, options: AuthenticateOptions },
    Initialize(InitializeOptions),
    Session,
    SerializeUser,
    DeserializeUser,
}

/// Adapter that records every call and lets all requests through.
#[derive(Default)]
pub struct RecordingAdapter {
    calls: Mutex<Vec<Call>>,
    registrations: Mutex<Vec<(String, Registration)>>,
}

impl RecordingAdapter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn registration(&self, name: &str) -> Option<Registration> {
        self.registrations
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, r)| r.clone())
    }

    pub fn registered_names(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Use { name, .. } => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn authenticate_calls(&self) -> Vec<(String, AuthenticateOptions)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Authenticate { name, options } => Some((name, options)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn pass_through() -> Middleware {
    middleware_fn(|request: AuthRequest| async move { Flow::Continue(request) })
}

impl IdentityAdapter for RecordingAdapter {
    fn use_strategy(&self, name: &str, registration: Registration) {
        self.record(Call::Use {
            name: name.to_string(),
            provider: registration.is_provider(),
        });
        self.registrations
            .lock()
            .unwrap()
            .push((name.to_string(), registration));
    }

    fn authenticate(&self, name: &str, options: AuthenticateOptions) -> Middleware {
        self.record(Call::Authenticate {
            name: name.to_string(),
            options,
        });
        pass_through()
    }

    fn initialize(&self, options: InitializeOptions) -> Component {
        self.record(Call::Initialize(options));
        Component::new(ComponentKind::Initialize, pass_through())
    }

    fn session(&self) -> Component {
        self.record(Call::Session);
        Component::new(ComponentKind::Session, pass_through())
    }

    fn serialize_user(&self, _serialize: SerializeUser) {
        self.record(Call::SerializeUser);
    }

    fn deserialize_user(&self, _deserialize: DeserializeUser) {
        self.record(Call::DeserializeUser);
    }
}

/// Route crate logs to the test writer; filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A request that has passed the adapter's initialize component.
pub fn initialized(request: AuthRequest) -> AuthRequest {
    let mut request = request;
    request.initialize("user");
    request
}
