//! Wire form of a configuration document.
//!
//! Every file under a `*.d` directory holds one JSON object with a shared
//! envelope (`rktVersion`, `rktKind`) and the fields of exactly one kind.
//! Unknown fields are rejected at parse time; fields that belong to a
//! different kind are rejected by [`Document::into_record`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::credentials::{AuthType, BasicCredentials, Credentials, OauthCredentials};
use crate::error::SchemaError;
use crate::kind::RecordKind;
use crate::record::{AuthRecord, DockerAuthRecord, PathsRecord, Record, Stage1Record};
use crate::CONFIG_VERSION;

/// Placeholder written over secrets by [`Document::redact_secrets`].
pub const REDACTED: &str = "[REDACTED]";

/// A configuration document as it appears on disk.
///
/// Empty strings and empty arrays are treated as absent and are omitted
/// when serializing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    #[serde(rename = "rktVersion", default)]
    pub rkt_version: String,

    #[serde(rename = "rktKind", default)]
    pub rkt_kind: String,

    /// Auth scheme, `auth` records only
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub auth_type: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub registries: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<WireCredentials>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data: String,

    #[serde(rename = "stage1-images", default, skip_serializing_if = "String::is_empty")]
    pub stage1_images: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Stage1 image version. Not to be confused with `rktVersion`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub location: String,
}

/// Flat credentials object: `{"user", "password"}` or `{"token"}`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WireCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl fmt::Debug for WireCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WireCredentials")
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| REDACTED))
            .field("token", &self.token.as_ref().map(|_| REDACTED))
            .finish()
    }
}

impl Document {
    /// Parse a document from raw file bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SchemaError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Check the envelope and return the document's kind.
    ///
    /// The version is checked before the kind, so a document with both an
    /// unknown version and an unknown kind reports the version.
    pub fn kind(&self) -> Result<RecordKind, SchemaError> {
        if self.rkt_version != CONFIG_VERSION {
            return Err(SchemaError::UnsupportedVersion(self.rkt_version.clone()));
        }
        RecordKind::from_wire(&self.rkt_kind)
            .ok_or_else(|| SchemaError::UnknownKind(self.rkt_kind.clone()))
    }

    /// Validate the document and convert it into a typed record.
    pub fn into_record(self) -> Result<Record, SchemaError> {
        match self.kind()? {
            RecordKind::Auth => self.into_auth().map(Record::Auth),
            RecordKind::DockerAuth => self.into_docker_auth().map(Record::DockerAuth),
            RecordKind::Paths => self.into_paths().map(Record::Paths),
            RecordKind::Stage1 => self.into_stage1().map(Record::Stage1),
        }
    }

    /// Replace every password and token with [`REDACTED`].
    ///
    /// Returns true if anything was replaced.
    pub fn redact_secrets(&mut self) -> bool {
        let Some(credentials) = self.credentials.as_mut() else {
            return false;
        };
        let mut redacted = false;
        for secret in [&mut credentials.password, &mut credentials.token] {
            if let Some(value) = secret.as_mut() {
                *value = REDACTED.to_string();
                redacted = true;
            }
        }
        redacted
    }

    fn into_auth(self) -> Result<AuthRecord, SchemaError> {
        let kind = RecordKind::Auth;
        self.reject_paths_fields(kind)?;
        self.reject_stage1_fields(kind)?;
        reject(kind, "registries", !self.registries.is_empty())?;

        let auth_type = match self.auth_type.as_str() {
            "" => return Err(SchemaError::invalid(kind, "missing 'type'")),
            other => AuthType::from_wire(other).ok_or_else(|| {
                SchemaError::invalid(
                    kind,
                    format!("unsupported type '{}' (expected 'basic' or 'oauth')", other),
                )
            })?,
        };
        let domains = scope_keys(kind, "domains", self.domains)?;
        let wire = self
            .credentials
            .ok_or_else(|| SchemaError::credential_shape(kind, "missing 'credentials'"))?;
        let credentials = match auth_type {
            AuthType::Basic => Credentials::Basic(wire.into_basic(kind)?),
            AuthType::Oauth => Credentials::Oauth(wire.into_oauth(kind)?),
        };

        Ok(AuthRecord {
            domains,
            credentials,
        })
    }

    fn into_docker_auth(self) -> Result<DockerAuthRecord, SchemaError> {
        let kind = RecordKind::DockerAuth;
        self.reject_paths_fields(kind)?;
        self.reject_stage1_fields(kind)?;
        reject(kind, "type", !self.auth_type.is_empty())?;
        reject(kind, "domains", !self.domains.is_empty())?;

        let registries = scope_keys(kind, "registries", self.registries)?;
        let credentials = self
            .credentials
            .ok_or_else(|| SchemaError::credential_shape(kind, "missing 'credentials'"))?
            .into_basic(kind)?;

        Ok(DockerAuthRecord {
            registries,
            credentials,
        })
    }

    fn into_paths(self) -> Result<PathsRecord, SchemaError> {
        let kind = RecordKind::Paths;
        self.reject_auth_fields(kind)?;
        self.reject_stage1_fields(kind)?;
        Ok(PathsRecord {
            data: self.data,
            stage1_images: self.stage1_images,
        })
    }

    fn into_stage1(self) -> Result<Stage1Record, SchemaError> {
        let kind = RecordKind::Stage1;
        self.reject_auth_fields(kind)?;
        self.reject_paths_fields(kind)?;
        Ok(Stage1Record {
            name: self.name,
            version: self.version,
            location: self.location,
        })
    }

    fn reject_auth_fields(&self, kind: RecordKind) -> Result<(), SchemaError> {
        reject(kind, "type", !self.auth_type.is_empty())?;
        reject(kind, "domains", !self.domains.is_empty())?;
        reject(kind, "registries", !self.registries.is_empty())?;
        reject(kind, "credentials", self.credentials.is_some())
    }

    fn reject_paths_fields(&self, kind: RecordKind) -> Result<(), SchemaError> {
        reject(kind, "data", !self.data.is_empty())?;
        reject(kind, "stage1-images", !self.stage1_images.is_empty())
    }

    fn reject_stage1_fields(&self, kind: RecordKind) -> Result<(), SchemaError> {
        reject(kind, "name", !self.name.is_empty())?;
        reject(kind, "version", !self.version.is_empty())?;
        reject(kind, "location", !self.location.is_empty())
    }
}

fn reject(kind: RecordKind, field: &str, present: bool) -> Result<(), SchemaError> {
    if present {
        return Err(SchemaError::invalid(
            kind,
            format!("'{}' is not allowed in a {} record", field, kind),
        ));
    }
    Ok(())
}

/// Validate a `domains` or `registries` list.
fn scope_keys(kind: RecordKind, field: &str, keys: Vec<String>) -> Result<Vec<String>, SchemaError> {
    if keys.is_empty() {
        return Err(SchemaError::invalid(
            kind,
            format!("'{}' must list at least one entry", field),
        ));
    }
    let mut seen = HashSet::new();
    for key in &keys {
        if key.is_empty() {
            return Err(SchemaError::invalid(
                kind,
                format!("'{}' contains an empty entry", field),
            ));
        }
        if !seen.insert(key.as_str()) {
            return Err(SchemaError::invalid(
                kind,
                format!("'{}' lists '{}' more than once", field, key),
            ));
        }
    }
    Ok(keys)
}

impl WireCredentials {
    fn into_basic(self, kind: RecordKind) -> Result<BasicCredentials, SchemaError> {
        if self.token.is_some() {
            return Err(SchemaError::credential_shape(
                kind,
                "basic credentials must not carry 'token'",
            ));
        }
        let user = non_empty(self.user).ok_or_else(|| {
            SchemaError::credential_shape(kind, "basic credentials require a non-empty 'user'")
        })?;
        let password = non_empty(self.password).ok_or_else(|| {
            SchemaError::credential_shape(kind, "basic credentials require a non-empty 'password'")
        })?;
        Ok(BasicCredentials { user, password })
    }

    fn into_oauth(self, kind: RecordKind) -> Result<OauthCredentials, SchemaError> {
        if self.user.is_some() || self.password.is_some() {
            return Err(SchemaError::credential_shape(
                kind,
                "oauth credentials must not carry 'user' or 'password'",
            ));
        }
        let token = non_empty(self.token).ok_or_else(|| {
            SchemaError::credential_shape(kind, "oauth credentials require a non-empty 'token'")
        })?;
        Ok(OauthCredentials { token })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl From<&BasicCredentials> for WireCredentials {
    fn from(basic: &BasicCredentials) -> Self {
        Self {
            user: Some(basic.user.clone()),
            password: Some(basic.password.clone()),
            token: None,
        }
    }
}

impl From<&Credentials> for WireCredentials {
    fn from(credentials: &Credentials) -> Self {
        match credentials {
            Credentials::Basic(basic) => basic.into(),
            Credentials::Oauth(oauth) => Self {
                token: Some(oauth.token.clone()),
                ..Self::default()
            },
        }
    }
}

impl From<&Record> for Document {
    fn from(record: &Record) -> Self {
        let mut doc = Document {
            rkt_version: CONFIG_VERSION.to_string(),
            rkt_kind: record.kind().as_str().to_string(),
            ..Document::default()
        };
        match record {
            Record::Auth(auth) => {
                doc.auth_type = auth.credentials.auth_type().as_str().to_string();
                doc.domains = auth.domains.clone();
                doc.credentials = Some((&auth.credentials).into());
            }
            Record::DockerAuth(docker) => {
                doc.registries = docker.registries.clone();
                doc.credentials = Some((&docker.credentials).into());
            }
            Record::Paths(paths) => {
                doc.data = paths.data.clone();
                doc.stage1_images = paths.stage1_images.clone();
            }
            Record::Stage1(stage1) => {
                doc.name = stage1.name.clone();
                doc.version = stage1.version.clone();
                doc.location = stage1.location.clone();
            }
        }
        doc
    }
}
