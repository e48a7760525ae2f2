//! Error types for document decoding and validation.

use crate::kind::RecordKind;

/// Why a document could not be turned into a [`Record`](crate::Record).
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported rktVersion '{0}' (expected '{expected}')", expected = crate::CONFIG_VERSION)]
    UnsupportedVersion(String),

    #[error("unknown rktKind '{0}'")]
    UnknownKind(String),

    #[error("{kind} record: {reason}")]
    InvalidField { kind: RecordKind, reason: String },

    #[error("{kind} record: {reason}")]
    CredentialShape { kind: RecordKind, reason: String },
}

impl SchemaError {
    pub(crate) fn invalid(kind: RecordKind, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            kind,
            reason: reason.into(),
        }
    }

    pub(crate) fn credential_shape(kind: RecordKind, reason: impl Into<String>) -> Self {
        Self::CredentialShape {
            kind,
            reason: reason.into(),
        }
    }

    /// True when the credentials disagree with the record's declared type.
    pub fn is_credential_shape(&self) -> bool {
        matches!(self, Self::CredentialShape { .. })
    }
}
