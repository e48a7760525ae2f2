//! Credential types.
//!
//! Credentials are a closed sum: a record holds either a basic
//! user/password pair or an oauth bearer token, never both.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Authentication scheme named by an `auth` record's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    Basic,
    Oauth,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Oauth => "oauth",
        }
    }

    /// Parse the wire value of `type`. Matching is exact.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "basic" => Some(Self::Basic),
            "oauth" => Some(Self::Oauth),
            _ => None,
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP basic credentials.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BasicCredentials {
    pub user: String,
    pub password: String,
}

/// OAuth bearer token.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct OauthCredentials {
    pub token: String,
}

// Debug output never includes secrets.
impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Debug for OauthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OauthCredentials")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Credentials carried by an `auth` record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Credentials {
    Basic(BasicCredentials),
    Oauth(OauthCredentials),
}

impl Credentials {
    pub fn basic(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic(BasicCredentials {
            user: user.into(),
            password: password.into(),
        })
    }

    pub fn oauth(token: impl Into<String>) -> Self {
        Self::Oauth(OauthCredentials {
            token: token.into(),
        })
    }

    /// The `type` a record holding these credentials declares.
    pub fn auth_type(&self) -> AuthType {
        match self {
            Self::Basic(_) => AuthType::Basic,
            Self::Oauth(_) => AuthType::Oauth,
        }
    }
}
