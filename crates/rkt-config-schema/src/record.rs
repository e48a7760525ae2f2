//! Typed configuration records.
//!
//! A [`Record`] is the validated form of a [`Document`](crate::Document).
//! The discriminant is authoritative and the payloads do not overlap, so a
//! `paths` record cannot carry credentials and an `auth` record cannot carry
//! a data directory.

use crate::credentials::{BasicCredentials, Credentials};
use crate::kind::RecordKind;

/// Credentials for one or more image-fetch domains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRecord {
    /// Domains the credentials apply to. Never empty, no duplicates.
    pub domains: Vec<String>,
    pub credentials: Credentials,
}

/// Basic credentials for one or more Docker registries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerAuthRecord {
    /// Registries the credentials apply to. Never empty, no duplicates.
    pub registries: Vec<String>,
    pub credentials: BasicCredentials,
}

/// Filesystem locations used by the runtime.
///
/// An empty string means the field is unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathsRecord {
    pub data: String,
    pub stage1_images: String,
}

/// Default stage1 image selection.
///
/// An empty string means the field is unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stage1Record {
    pub name: String,
    pub version: String,
    pub location: String,
}

/// A validated configuration record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Auth(AuthRecord),
    DockerAuth(DockerAuthRecord),
    Paths(PathsRecord),
    Stage1(Stage1Record),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Auth(_) => RecordKind::Auth,
            Self::DockerAuth(_) => RecordKind::DockerAuth,
            Self::Paths(_) => RecordKind::Paths,
            Self::Stage1(_) => RecordKind::Stage1,
        }
    }
}

impl PathsRecord {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.stage1_images.is_empty()
    }
}

impl Stage1Record {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.version.is_empty() && self.location.is_empty()
    }
}

impl From<AuthRecord> for Record {
    fn from(record: AuthRecord) -> Self {
        Self::Auth(record)
    }
}

impl From<DockerAuthRecord> for Record {
    fn from(record: DockerAuthRecord) -> Self {
        Self::DockerAuth(record)
    }
}

impl From<PathsRecord> for Record {
    fn from(record: PathsRecord) -> Self {
        Self::Paths(record)
    }
}

impl From<Stage1Record> for Record {
    fn from(record: Stage1Record) -> Self {
        Self::Stage1(record)
    }
}
