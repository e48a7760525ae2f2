//! Record Normaliser
//!
//! Splits multi-scope records so that each normalised record occupies
//! exactly one composite key. `auth` records split per domain,
//! `dockerAuth` records per registry; singleton kinds pass through.

use std::fmt;

use rkt_config_schema::{
    AuthRecord, BasicCredentials, Credentials, DockerAuthRecord, PathsRecord, Record, RecordKind,
    Stage1Record,
};
use serde::{Serialize, Serializer};

/// Identity under which two records collide or merge.
///
/// Ordering groups by kind (`auth`, `dockerAuth`, `paths`, `stage1`) and then
/// by the raw bytes of the scope key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CompositeKey {
    Auth(String),
    DockerAuth(String),
    Paths,
    Stage1,
}

impl CompositeKey {
    pub fn kind(&self) -> RecordKind {
        match self {
            CompositeKey::Auth(_) => RecordKind::Auth,
            CompositeKey::DockerAuth(_) => RecordKind::DockerAuth,
            CompositeKey::Paths => RecordKind::Paths,
            CompositeKey::Stage1 => RecordKind::Stage1,
        }
    }

    /// The domain or registry, for scoped kinds.
    pub fn scope(&self) -> Option<&str> {
        match self {
            CompositeKey::Auth(scope) | CompositeKey::DockerAuth(scope) => Some(scope.as_str()),
            CompositeKey::Paths | CompositeKey::Stage1 => None,
        }
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope() {
            Some(scope) => write!(f, "{}/{}", self.kind(), scope),
            None => write!(f, "{}", self.kind()),
        }
    }
}

impl Serialize for CompositeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Credentials for exactly one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainAuth {
    pub domain: String,
    pub credentials: Credentials,
}

/// Basic credentials for exactly one registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryAuth {
    pub registry: String,
    pub credentials: BasicCredentials,
}

/// A record reduced to a single composite key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedRecord {
    Auth(DomainAuth),
    DockerAuth(RegistryAuth),
    Paths(PathsRecord),
    Stage1(Stage1Record),
}

impl NormalizedRecord {
    pub fn key(&self) -> CompositeKey {
        match self {
            NormalizedRecord::Auth(auth) => CompositeKey::Auth(auth.domain.clone()),
            NormalizedRecord::DockerAuth(docker) => CompositeKey::DockerAuth(docker.registry.clone()),
            NormalizedRecord::Paths(_) => CompositeKey::Paths,
            NormalizedRecord::Stage1(_) => CompositeKey::Stage1,
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            NormalizedRecord::Auth(_) => RecordKind::Auth,
            NormalizedRecord::DockerAuth(_) => RecordKind::DockerAuth,
            NormalizedRecord::Paths(_) => RecordKind::Paths,
            NormalizedRecord::Stage1(_) => RecordKind::Stage1,
        }
    }

    /// Restore the input-schema form, with a one-element scope list for
    /// scoped kinds.
    pub fn to_record(&self) -> Record {
        match self {
            NormalizedRecord::Auth(auth) => Record::Auth(AuthRecord {
                domains: vec![auth.domain.clone()],
                credentials: auth.credentials.clone(),
            }),
            NormalizedRecord::DockerAuth(docker) => Record::DockerAuth(DockerAuthRecord {
                registries: vec![docker.registry.clone()],
                credentials: docker.credentials.clone(),
            }),
            NormalizedRecord::Paths(paths) => Record::Paths(paths.clone()),
            NormalizedRecord::Stage1(stage1) => Record::Stage1(stage1.clone()),
        }
    }
}

/// Split a record into one normalised record per scope key.
pub fn normalize(record: Record) -> Vec<NormalizedRecord> {
    match record {
        Record::Auth(AuthRecord {
            domains,
            credentials,
        }) => domains
            .into_iter()
            .map(|domain| {
                NormalizedRecord::Auth(DomainAuth {
                    domain,
                    credentials: credentials.clone(),
                })
            })
            .collect(),
        Record::DockerAuth(DockerAuthRecord {
            registries,
            credentials,
        }) => registries
            .into_iter()
            .map(|registry| {
                NormalizedRecord::DockerAuth(RegistryAuth {
                    registry,
                    credentials: credentials.clone(),
                })
            })
            .collect(),
        Record::Paths(paths) => vec![NormalizedRecord::Paths(paths)],
        Record::Stage1(stage1) => vec![NormalizedRecord::Stage1(stage1)],
    }
}
