//! Callback-leg types for redirect-flow providers.

use std::fmt;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::ProviderRegistration;
use crate::request::AuthRequest;

/// Normalized user profile returned by a provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub provider: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<String>,
    /// Provider payload as received.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub raw: serde_json::Value,
}

impl Profile {
    pub fn new(provider: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.emails.push(email.into());
        self
    }
}

/// Tokens and profile delivered by a completed provider exchange.
///
/// `secondary` is the refresh token for OAuth 2 providers and the token
/// secret for OAuth 1.0a providers.
#[derive(Clone)]
pub struct ProviderGrant {
    pub access_token: SecretString,
    pub secondary: Option<SecretString>,
    pub profile: Profile,
}

impl ProviderGrant {
    pub fn new(access_token: impl Into<String>, profile: Profile) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            secondary: None,
            profile,
        }
    }

    pub fn with_secondary(mut self, secondary: impl Into<String>) -> Self {
        self.secondary = Some(SecretString::from(secondary.into()));
        self
    }
}

impl fmt::Debug for ProviderGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderGrant")
            .field("access_token", &"[redacted]")
            .field("secondary", &self.secondary.as_ref().map(|_| "[redacted]"))
            .field("profile", &self.profile)
            .finish()
    }
}

/// Query parameters a provider sends back to the callback route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub oauth_token: Option<String>,
    pub oauth_verifier: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// `None` when the request is not a provider callback (first leg).
    pub fn from_request(request: &AuthRequest) -> Option<Self> {
        let get = |name: &str| request.query_str(name).map(str::to_string);
        let params = Self {
            code: get("code"),
            state: get("state"),
            oauth_token: get("oauth_token"),
            oauth_verifier: get("oauth_verifier"),
            error: get("error"),
            error_description: get("error_description"),
        };

        (params.code.is_some() || params.oauth_token.is_some() || params.error.is_some())
            .then_some(params)
    }

    /// Provider-reported failure message.
    pub fn denial(&self) -> Option<String> {
        let error = self.error.as_deref()?;
        Some(match self.error_description.as_deref() {
            Some(description) => format!("{}: {}", error, description),
            None => error.to_string(),
        })
    }
}

/// Code-for-token exchange against a provider.
///
/// The network leg lives outside this crate; hosts plug in their HTTP client.
#[async_trait]
pub trait ProviderExchange: Send + Sync {
    async fn exchange(
        &self,
        provider: &ProviderRegistration,
        params: &CallbackParams,
    ) -> crate::Result<ProviderGrant>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_params_first_leg() {
        assert_eq!(CallbackParams::from_request(&AuthRequest::get("/auth/google")), None);
    }

    #[test]
    fn test_callback_params_code() {
        let request = AuthRequest::get("/auth/google/callback")
            .with_query("code", "abc")
            .with_query("state", "s1");
        let params = CallbackParams::from_request(&request).unwrap();
        assert_eq!(params.code.as_deref(), Some("abc"));
        assert_eq!(params.state.as_deref(), Some("s1"));
        assert_eq!(params.denial(), None);
    }

    #[test]
    fn test_callback_params_denial() {
        let request = AuthRequest::get("/cb")
            .with_query("error", "access_denied")
            .with_query("error_description", "user cancelled");
        let params = CallbackParams::from_request(&request).unwrap();
        assert_eq!(params.denial().as_deref(), Some("access_denied: user cancelled"));
    }

    #[test]
    fn test_grant_debug_redacts() {
        let grant = ProviderGrant::new("at-123", Profile::new("google", "42")).with_secondary("rt");
        let debug = format!("{:?}", grant);
        assert!(!debug.contains("at-123"));
        assert!(debug.contains("42"));
    }
}
