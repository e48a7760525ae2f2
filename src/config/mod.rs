//! Layered stage0 configuration
//!
//! Loads the system tree (e.g. `/usr/lib/rkt`) and the user tree
//! (e.g. `/etc/rkt`), each holding `auth.d`, `paths.d` and `stage1.d`, and
//! merges them per composite key:
//! 1. Reader parses and validates every `*.json` document
//! 2. Normaliser splits records per domain / registry
//! 3. Layer loader collects one tree into a conflict-free layer
//! 4. Merger folds the user layer over the system layer

mod defaults;
mod effective;
mod emit;
mod error;
mod layer;
mod merge;
mod normalize;
mod reader;

pub use defaults::{
    BuiltinDefaults, DEFAULT_DATA_DIR, DEFAULT_STAGE1_IMAGES_DIR, DEFAULT_STAGE1_NAME,
};
pub use effective::EffectiveConfig;
pub use emit::{
    render_sources, render_stage0, EmitOptions, KeySources, SourcesDocument, Stage0Document,
};
pub use error::{ErrorKind, LoadError};
pub use layer::{ConfigTree, Layer, LayerEntry, RecordSource, TreeOrigin};
pub use merge::{merge, merge_layers, EffectiveEntry, EffectiveMap, MergePolicy};
pub use normalize::{normalize, CompositeKey, DomainAuth, NormalizedRecord, RegistryAuth};
pub use reader::{parse_document, read_dir, ConfigDir, ParsedFile};
