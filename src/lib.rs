//! rkt stage0 configuration loader
//!
//! Reads versioned JSON configuration from a system tree and a user tree,
//! merges them per domain, registry and field, and exposes the effective
//! configuration to the runtime and to the `config` inspection command.

pub mod config;
pub mod logging;

pub use config::{
    ConfigTree, EffectiveConfig, EmitOptions, ErrorKind, Layer, LoadError, Stage0Document,
    TreeOrigin,
};
pub use rkt_config_schema as schema;
