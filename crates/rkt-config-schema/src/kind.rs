//! Record kind discriminant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The `rktKind` of a configuration document.
///
/// Variant order is the order records are grouped in when emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    #[serde(rename = "auth")]
    Auth,
    #[serde(rename = "dockerAuth")]
    DockerAuth,
    #[serde(rename = "paths")]
    Paths,
    #[serde(rename = "stage1")]
    Stage1,
}

impl RecordKind {
    /// All recognised kinds.
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Auth,
        RecordKind::DockerAuth,
        RecordKind::Paths,
        RecordKind::Stage1,
    ];

    /// Wire name as it appears in `rktKind`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::DockerAuth => "dockerAuth",
            Self::Paths => "paths",
            Self::Stage1 => "stage1",
        }
    }

    /// Look up a kind by its wire name. Matching is exact.
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Whether records of this kind are split per scope key (domain or registry).
    pub fn is_scoped(&self) -> bool {
        matches!(self, Self::Auth | Self::DockerAuth)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
