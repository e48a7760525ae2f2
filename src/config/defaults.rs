//! Built-in defaults
//!
//! Used by the effective view for any `paths` or `stage1` field that no
//! layer sets. Defaults are never emitted in the `stage0` document.

use rkt_config_schema::{PathsRecord, Stage1Record};

use super::merge::FieldMerge;

pub const DEFAULT_DATA_DIR: &str = "/var/lib/rkt";
pub const DEFAULT_STAGE1_IMAGES_DIR: &str = "/usr/lib/rkt/stage1-images";
pub const DEFAULT_STAGE1_NAME: &str = "coreos.com/rkt/stage1-coreos";

/// Built-in default configuration values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinDefaults {
    pub paths: PathsRecord,

    /// Location is empty: without configuration the stage1 image is
    /// resolved from the stage1 images directory by name and version.
    pub stage1: Stage1Record,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            paths: PathsRecord {
                data: DEFAULT_DATA_DIR.to_string(),
                stage1_images: DEFAULT_STAGE1_IMAGES_DIR.to_string(),
            },
            stage1: Stage1Record {
                name: DEFAULT_STAGE1_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                location: String::new(),
            },
        }
    }
}

impl BuiltinDefaults {
    /// Overlay configured paths on the defaults.
    pub fn fill_paths(&self, configured: Option<&PathsRecord>) -> PathsRecord {
        let mut paths = self.paths.clone();
        if let Some(configured) = configured {
            paths.merge_from(configured.clone());
        }
        paths
    }

    /// Overlay a configured stage1 selection on the defaults.
    pub fn fill_stage1(&self, configured: Option<&Stage1Record>) -> Stage1Record {
        let mut stage1 = self.stage1.clone();
        if let Some(configured) = configured {
            stage1.merge_from(configured.clone());
        }
        stage1
    }
}
