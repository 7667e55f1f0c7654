//! Verification outcome protocol.
//!
//! Every scheme funnels its verification attempt into exactly one
//! [`Verification`]. The three variants mirror the three completion shapes
//! hosts observe:
//!
//! | variant        | completion shape     |
//! |----------------|----------------------|
//! | `Verified(id)` | `(null, identity)`   |
//! | `Denied(err)`  | `(error, false)`     |
//! | `Errored(err)` | `(error)`            |
//!
//! Host `validate` callbacks report failure by *returning* an error value
//! (`Err`) rather than panicking; the error object is passed through
//! untouched inside [`Error::Validation`].

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::{Error, Result};

/// Opaque verified identity produced by a host `validate` callback.
pub type Identity = serde_json::Value;

/// Error value returned by a host `validate` callback.
pub type ValidationError = Arc<dyn std::error::Error + Send + Sync>;

pub type ValidationResult = std::result::Result<Identity, ValidationError>;

/// Host-supplied single-argument verification callback.
pub type Validator<A> = Arc<dyn Fn(A) -> BoxFuture<'static, ValidationResult> + Send + Sync>;

/// Wrap an async closure as a [`Validator`].
pub fn validator<A, F, Fut>(f: F) -> Validator<A>
where
    A: 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ValidationResult> + Send + 'static,
{
    Arc::new(move |arg| f(arg).boxed())
}

/// Outcome of one verification attempt.
#[derive(Debug)]
pub enum Verification {
    Verified(Identity),
    Denied(Error),
    Errored(Error),
}

/// How a scheme reports a `validate` error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailureShape {
    /// `(error, false)`
    Denial,
    /// `(error)`
    Bare,
}

impl Verification {
    /// Normalize a `validate` result into an outcome.
    pub(crate) fn settle(result: ValidationResult, shape: FailureShape) -> Self {
        match result {
            Ok(identity) => Verification::Verified(identity),
            Err(error) => {
                let error = Error::Validation(error);
                match shape {
                    FailureShape::Denial => Verification::Denied(error),
                    FailureShape::Bare => Verification::Errored(error),
                }
            }
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, Verification::Verified(_))
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Verification::Verified(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Verification::Denied(error) | Verification::Errored(error) => Some(error),
            Verification::Verified(_) => None,
        }
    }

    /// The explicit success flag carried by the outcome, `Some(false)` only
    /// for the `(error, false)` shape.
    pub fn success_flag(&self) -> Option<bool> {
        match self {
            Verification::Denied(_) => Some(false),
            _ => None,
        }
    }

    pub fn into_result(self) -> Result<Identity> {
        match self {
            Verification::Verified(identity) => Ok(identity),
            Verification::Denied(error) | Verification::Errored(error) => Err(error),
        }
    }
}
