//! rkt Configuration Schema
//!
//! Defines the `v1` JSON documents found under `auth.d`, `paths.d` and
//! `stage1.d`, and the typed records they decode into.

pub mod credentials;
pub mod document;
pub mod error;
pub mod kind;
pub mod record;

pub use credentials::{AuthType, BasicCredentials, Credentials, OauthCredentials};
pub use document::{Document, WireCredentials, REDACTED};
pub use error::SchemaError;
pub use kind::RecordKind;
pub use record::{AuthRecord, DockerAuthRecord, PathsRecord, Record, Stage1Record};

/// The only `rktVersion` this implementation understands.
pub const CONFIG_VERSION: &str = "v1";
