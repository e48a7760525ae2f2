//! Effective configuration
//!
//! The immutable result of folding the system layer under the user layer.
//! This is what the runtime queries and what `config` prints.

use std::path::Path;

use rkt_config_schema::{PathsRecord, Record, Stage1Record};
use tracing::info;

use super::defaults::BuiltinDefaults;
use super::error::LoadError;
use super::layer::{ConfigTree, Layer};
use super::merge::{merge_layers, EffectiveEntry, EffectiveMap};
use super::normalize::{CompositeKey, DomainAuth, NormalizedRecord, RegistryAuth};

/// Effective configuration with provenance
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    entries: EffectiveMap,
    defaults: BuiltinDefaults,
}

impl EffectiveConfig {
    /// Load and merge the system tree and the user tree.
    pub fn load(system: &Path, user: &Path) -> Result<Self, LoadError> {
        Self::load_trees(&[ConfigTree::system(system), ConfigTree::user(user)])
    }

    /// Load trees in precedence order (first is base, last wins).
    ///
    /// Every tree is loaded before merging so a broken override tree fails
    /// the load even when the base tree is fine.
    pub fn load_trees(trees: &[ConfigTree]) -> Result<Self, LoadError> {
        let layers = trees
            .iter()
            .map(Layer::load)
            .collect::<Result<Vec<_>, _>>()?;
        let config = Self::from_layers(layers);
        info!(records = config.len(), "effective configuration ready");
        Ok(config)
    }

    /// Merge already-loaded layers in precedence order.
    pub fn from_layers<I>(layers: I) -> Self
    where
        I: IntoIterator<Item = Layer>,
    {
        Self {
            entries: merge_layers(layers),
            defaults: BuiltinDefaults::default(),
        }
    }

    /// Replace the built-in defaults used by [`paths`](Self::paths) and
    /// [`stage1`](Self::stage1).
    pub fn with_defaults(mut self, defaults: BuiltinDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Credentials for an exact domain. No case folding is applied.
    pub fn credentials_for_domain(&self, domain: &str) -> Option<&DomainAuth> {
        match self.get(&CompositeKey::Auth(domain.to_string()))?.record {
            NormalizedRecord::Auth(ref auth) => Some(auth),
            _ => None,
        }
    }

    /// Docker credentials for an exact registry.
    pub fn credentials_for_registry(&self, registry: &str) -> Option<&RegistryAuth> {
        match self.get(&CompositeKey::DockerAuth(registry.to_string()))?.record {
            NormalizedRecord::DockerAuth(ref docker) => Some(docker),
            _ => None,
        }
    }

    /// Effective paths, with unset fields taken from the defaults.
    pub fn paths(&self) -> PathsRecord {
        self.defaults.fill_paths(self.configured_paths())
    }

    /// Effective stage1 selection, with unset fields taken from the defaults.
    pub fn stage1(&self) -> Stage1Record {
        self.defaults.fill_stage1(self.configured_stage1())
    }

    /// The merged `paths` record, if any layer has one.
    pub fn configured_paths(&self) -> Option<&PathsRecord> {
        match self.get(&CompositeKey::Paths)?.record {
            NormalizedRecord::Paths(ref paths) => Some(paths),
            _ => None,
        }
    }

    /// The merged `stage1` record, if any layer has one.
    pub fn configured_stage1(&self) -> Option<&Stage1Record> {
        match self.get(&CompositeKey::Stage1)?.record {
            NormalizedRecord::Stage1(ref stage1) => Some(stage1),
            _ => None,
        }
    }

    pub fn get(&self, key: &CompositeKey) -> Option<&EffectiveEntry> {
        self.entries.get(key)
    }

    /// Entries in composite-key order.
    pub fn iter(&self) -> impl Iterator<Item = (&CompositeKey, &EffectiveEntry)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &CompositeKey> {
        self.entries.keys()
    }

    /// Every effective record in input-schema form, one per composite key.
    pub fn records(&self) -> Vec<Record> {
        self.entries
            .values()
            .map(|entry| entry.record.to_record())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::{DEFAULT_DATA_DIR, DEFAULT_STAGE1_NAME};
    use crate::config::layer::TreeOrigin;
    use rkt_config_schema::Credentials;
    use std::fs;
    use tempfile::TempDir;

    fn view(system: &[(&str, &str)], user: &[(&str, &str)]) -> EffectiveConfig {
        let system = Layer::from_documents(TreeOrigin::System, system.iter().copied()).unwrap();
        let user = Layer::from_documents(TreeOrigin::User, user.iter().copied()).unwrap();
        EffectiveConfig::from_layers([system, user])
    }

    #[test]
    fn test_credentials_for_domain_is_exact() {
        let config = view(
            &[],
            &[(
                "basic.json",
                r#"{"rktVersion":"v1","rktKind":"auth","type":"basic","domains":["coreos.com"],"credentials":{"user":"user","password":"userPassword"}}"#,
            )],
        );

        let auth = config.credentials_for_domain("coreos.com").unwrap();
        assert_eq!(auth.credentials, Credentials::basic("user", "userPassword"));
        assert!(config.credentials_for_domain("CoreOS.com").is_none());
        assert!(config.credentials_for_domain("quay.io").is_none());
        assert!(config.credentials_for_registry("coreos.com").is_none());
    }

    #[test]
    fn test_credentials_for_registry() {
        let config = view(
            &[(
                "docker.json",
                r#"{"rktVersion":"v1","rktKind":"dockerAuth","registries":["quay.io","gcr.io"],"credentials":{"user":"docker","password":"dockerPassword"}}"#,
            )],
            &[(
                "docker.json",
                r#"{"rktVersion":"v1","rktKind":"dockerAuth","registries":["gcr.io"],"credentials":{"user":"over","password":"written"}}"#,
            )],
        );

        assert_eq!(config.credentials_for_registry("quay.io").unwrap().credentials.user, "docker");
        assert_eq!(config.credentials_for_registry("gcr.io").unwrap().credentials.user, "over");
    }

    #[test]
    fn test_paths_and_stage1_fall_back_to_defaults() {
        let config = view(&[], &[]);
        assert!(config.is_empty());
        assert!(config.configured_paths().is_none());
        assert_eq!(config.paths().data, DEFAULT_DATA_DIR);
        assert_eq!(config.stage1().name, DEFAULT_STAGE1_NAME);
    }

    #[test]
    fn test_custom_defaults() {
        let mut defaults = BuiltinDefaults::default();
        defaults.paths.data = "/srv/rkt".to_string();

        let config = view(&[], &[]).with_defaults(defaults);
        assert_eq!(config.paths().data, "/srv/rkt");
    }

    #[test]
    fn test_records_restore_input_form() {
        let config = view(
            &[],
            &[(
                "basic.json",
                r#"{"rktVersion":"v1","rktKind":"auth","type":"oauth","domains":["tectonic.com","coreos.com"],"credentials":{"token":"t"}}"#,
            )],
        );

        let records = config.records();
        assert_eq!(records.len(), 2);
        for record in records {
            let Record::Auth(auth) = record else {
                panic!("expected auth record");
            };
            assert_eq!(auth.domains.len(), 1);
        }
    }

    #[test]
    fn test_load_reads_both_trees() {
        let system = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        fs::create_dir_all(system.path().join("paths.d")).unwrap();
        fs::write(
            system.path().join("paths.d/paths.json"),
            r#"{"rktVersion":"v1","rktKind":"paths","data":"/usr/lib/rkt/data","stage1-images":"/usr/lib/rkt/stage1-images"}"#,
        )
        .unwrap();
        fs::create_dir_all(user.path().join("paths.d")).unwrap();
        fs::write(
            user.path().join("paths.d/paths.json"),
            r#"{"rktVersion":"v1","rktKind":"paths","data":"/home/me/rkt/data"}"#,
        )
        .unwrap();

        let config = EffectiveConfig::load(system.path(), user.path()).unwrap();
        let paths = config.configured_paths().unwrap();
        assert_eq!(paths.data, "/home/me/rkt/data");
        assert_eq!(paths.stage1_images, "/usr/lib/rkt/stage1-images");
    }

    #[test]
    fn test_load_fails_on_broken_user_tree() {
        let system = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        fs::create_dir_all(user.path().join("stage1.d")).unwrap();
        fs::write(user.path().join("stage1.d/stage1.json"), "not json").unwrap();

        assert!(EffectiveConfig::load(system.path(), user.path()).is_err());
    }
}
