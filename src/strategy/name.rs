//! Canonical strategy names.

use std::fmt;
use std::str::FromStr;

pub const JWT: &str = "jwt";
pub const API_KEY: &str = "api-key";
pub const FACEBOOK: &str = "facebook";
pub const GOOGLE: &str = "google";
pub const TWITTER: &str = "twitter";
pub const LOCAL: &str = "local";
pub const BASIC: &str = "basic";

/// Built-in credential schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyType {
    Jwt,
    ApiKey,
    Facebook,
    Google,
    Twitter,
    Local,
    Basic,
}

impl StrategyType {
    /// Construction priority of the orchestrator.
    pub const ALL: [StrategyType; 7] = [
        StrategyType::Jwt,
        StrategyType::ApiKey,
        StrategyType::Facebook,
        StrategyType::Google,
        StrategyType::Twitter,
        StrategyType::Local,
        StrategyType::Basic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyType::Jwt => JWT,
            StrategyType::ApiKey => API_KEY,
            StrategyType::Facebook => FACEBOOK,
            StrategyType::Google => GOOGLE,
            StrategyType::Twitter => TWITTER,
            StrategyType::Local => LOCAL,
            StrategyType::Basic => BASIC,
        }
    }

    /// Label used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            StrategyType::Jwt => "JWT",
            StrategyType::ApiKey => "API Key",
            StrategyType::Facebook => "Facebook",
            StrategyType::Google => "Google",
            StrategyType::Twitter => "Twitter",
            StrategyType::Local => "Local",
            StrategyType::Basic => "Basic",
        }
    }

    pub fn is_redirect_flow(&self) -> bool {
        matches!(
            self,
            StrategyType::Facebook | StrategyType::Google | StrategyType::Twitter
        )
    }
}

impl fmt::Display for StrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| crate::Error::UnknownStrategy(s.to_string()))
    }
}
