//! Inspection Emitter
//!
//! Renders the effective configuration for the `config` command as
//! `{"stage0": [...]}`. Records appear once each, scoped records with a
//! single domain or registry, sorted by composite key.

use rkt_config_schema::Document;
use serde::{Deserialize, Serialize};

use super::effective::EffectiveConfig;
use super::layer::RecordSource;
use super::normalize::CompositeKey;

/// Rendering switches for the `config` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitOptions {
    /// Indented multi-line output instead of a single line
    pub pretty: bool,
    /// Replace passwords and tokens with a placeholder
    pub redact: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            redact: false,
        }
    }
}

/// The inspection document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage0Document {
    pub stage0: Vec<Document>,
}

impl Stage0Document {
    pub fn from_config(config: &EffectiveConfig, redact: bool) -> Self {
        let stage0 = config
            .records()
            .iter()
            .map(|record| {
                let mut document = Document::from(record);
                if redact {
                    document.redact_secrets();
                }
                document
            })
            .collect();
        Self { stage0 }
    }

    /// Index of a record equal to `document`, searching by content.
    pub fn position(&self, document: &Document) -> Option<usize> {
        self.stage0.iter().position(|candidate| candidate == document)
    }

    pub fn contains(&self, document: &Document) -> bool {
        self.position(document).is_some()
    }
}

/// Provenance of one effective entry.
#[derive(Debug, Serialize)]
pub struct KeySources<'a> {
    pub key: &'a CompositeKey,
    pub sources: &'a [RecordSource],
}

/// Provenance of the whole effective configuration.
#[derive(Debug, Serialize)]
pub struct SourcesDocument<'a> {
    pub sources: Vec<KeySources<'a>>,
}

impl<'a> SourcesDocument<'a> {
    pub fn from_config(config: &'a EffectiveConfig) -> Self {
        let sources = config
            .iter()
            .map(|(key, entry)| KeySources {
                key,
                sources: &entry.sources,
            })
            .collect();
        Self { sources }
    }
}

/// Render the `stage0` document.
pub fn render_stage0(config: &EffectiveConfig, options: EmitOptions) -> Result<String, serde_json::Error> {
    to_json(&Stage0Document::from_config(config, options.redact), options.pretty)
}

/// Render the provenance document.
pub fn render_sources(config: &EffectiveConfig, pretty: bool) -> Result<String, serde_json::Error> {
    to_json(&SourcesDocument::from_config(config), pretty)
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
