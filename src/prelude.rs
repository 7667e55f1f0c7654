//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits
//! for wiring authentication into a host server.
//!
//! # Usage
//!
//! ```rust
//! use authmux::prelude::*;
//! ```

// Core types
pub use crate::Error;
pub use crate::Result;
pub use crate::{AuthOrchestrator, Identity, ValidationError, Verification};

// Configuration
pub use crate::config::{
    ApiKeyConfig, AuthConfig, AuthSettings, OAuthConfig, SessionOptions, TokenConfig,
    UserPasswordConfig,
};

// Adapter
pub use crate::adapter::{
    AuthenticateOptions, Component, IdentityAdapter, InProcessAdapter, InitializeOptions,
    Profile, ProviderExchange,
};

// Strategies
pub use crate::strategy::{
    AuthStrategy, MiddlewareDescriptor, MiddlewareFilter, RouteDescriptor, Selected, StrategyType,
};

// Request flow
pub use crate::request::{AuthRequest, AuthResponse, Flow, Middleware, middleware_fn, run_chain};
pub use crate::extract::{TokenExtractor, UserCredentials};
