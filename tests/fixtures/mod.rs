//! Test fixtures for layered configuration trees
//!
//! Materialises a system tree and a user tree under a temporary directory
//! and writes documents into their `auth.d`, `paths.d` and `stage1.d`
//! directories.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use rkt_config::config::{ConfigDir, EffectiveConfig, LoadError, Stage0Document};
use rkt_config::schema::Document;
use serde_json::Value;
use tempfile::TempDir;

/// A temporary system tree and user tree.
pub struct Trees {
    _root: TempDir,
    pub system: PathBuf,
    pub user: PathBuf,
}

impl Trees {
    pub fn new() -> Self {
        let root = TempDir::new().expect("create temp dir");
        let system = root.path().join("usr/lib/rkt");
        let user = root.path().join("etc/rkt");
        Self {
            _root: root,
            system,
            user,
        }
    }

    pub fn write_system(&self, dir: ConfigDir, name: &str, document: &Value) {
        write_document(&self.system, dir, name, document);
    }

    pub fn write_user(&self, dir: ConfigDir, name: &str, document: &Value) {
        write_document(&self.user, dir, name, document);
    }

    pub fn write_user_raw(&self, dir: ConfigDir, name: &str, contents: &str) {
        write_raw(&self.user, dir, name, contents);
    }

    pub fn load(&self) -> Result<EffectiveConfig, LoadError> {
        EffectiveConfig::load(&self.system, &self.user)
    }

    /// Load and build the `config` document, panicking on load errors.
    pub fn stage0(&self) -> Stage0Document {
        let config = self.load().expect("configuration should load");
        Stage0Document::from_config(&config, false)
    }
}

pub fn write_document(base: &Path, dir: ConfigDir, name: &str, document: &Value) {
    let contents = serde_json::to_string(document).expect("serialize document");
    write_raw(base, dir, name, &contents);
}

pub fn write_raw(base: &Path, dir: ConfigDir, name: &str, contents: &str) {
    let dir = base.join(dir.dir_name());
    fs::create_dir_all(&dir).expect("create config dir");
    fs::write(dir.join(name), contents).expect("write config file");
}

/// Assert that `expected` appears in the document, matching by content.
pub fn assert_contains(document: &Stage0Document, expected: &Value) {
    let wanted: Document =
        serde_json::from_value(expected.clone()).expect("expected value is a valid document");
    assert!(
        document.contains(&wanted),
        "expected to find {} in {}",
        expected,
        serde_json::to_string_pretty(document).unwrap_or_default()
    );
}
