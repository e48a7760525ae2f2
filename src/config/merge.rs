//! Configuration merge logic
//!
//! Layers are folded in order, later layers overriding earlier ones per
//! composite key:
//! - `auth`, `dockerAuth`: REPLACE (the overriding record wins wholesale)
//! - `paths`, `stage1`: field-wise (non-empty overriding fields win)
//!
//! Arrays are never unioned. After normalisation every scoped record owns
//! exactly one domain or registry, so replacement is per scope key.

use std::collections::btree_map::{self, BTreeMap};

use rkt_config_schema::{PathsRecord, RecordKind, Stage1Record};
use tracing::debug;

use super::layer::{Layer, RecordSource};
use super::normalize::{CompositeKey, NormalizedRecord};

/// How two records under the same composite key combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// The overriding record replaces the base record.
    Replace,
    /// Each non-empty field of the overriding record replaces the base field.
    FieldWise,
}

impl MergePolicy {
    pub fn for_kind(kind: RecordKind) -> Self {
        match kind {
            RecordKind::Auth | RecordKind::DockerAuth => MergePolicy::Replace,
            RecordKind::Paths | RecordKind::Stage1 => MergePolicy::FieldWise,
        }
    }
}

/// A merged record and the files that produced it, in layer order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveEntry {
    pub record: NormalizedRecord,
    pub sources: Vec<RecordSource>,
}

/// Merged records by composite key.
pub type EffectiveMap = BTreeMap<CompositeKey, EffectiveEntry>;

/// Field-wise override for singleton records.
pub(crate) trait FieldMerge {
    fn merge_from(&mut self, overlay: Self);
}

impl FieldMerge for PathsRecord {
    fn merge_from(&mut self, overlay: Self) {
        override_field(&mut self.data, overlay.data);
        override_field(&mut self.stage1_images, overlay.stage1_images);
    }
}

impl FieldMerge for Stage1Record {
    fn merge_from(&mut self, overlay: Self) {
        override_field(&mut self.name, overlay.name);
        override_field(&mut self.version, overlay.version);
        override_field(&mut self.location, overlay.location);
    }
}

fn override_field(base: &mut String, overlay: String) {
    if !overlay.is_empty() {
        *base = overlay;
    }
}

/// Merge a system layer with a user layer. The user layer wins.
pub fn merge(system: Layer, user: Layer) -> EffectiveMap {
    merge_layers([system, user])
}

/// Merge layers in order (first is base, last has highest precedence).
pub fn merge_layers<I>(layers: I) -> EffectiveMap
where
    I: IntoIterator<Item = Layer>,
{
    layers.into_iter().fold(EffectiveMap::new(), |mut merged, layer| {
        apply_layer(&mut merged, layer);
        merged
    })
}

fn apply_layer(merged: &mut EffectiveMap, layer: Layer) {
    for (key, entry) in layer {
        match merged.entry(key) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(EffectiveEntry {
                    record: entry.record,
                    sources: vec![entry.source],
                });
            }
            btree_map::Entry::Occupied(mut slot) => {
                let policy = MergePolicy::for_kind(slot.key().kind());
                debug!(
                    key = %slot.key(),
                    ?policy,
                    path = %entry.source.path.display(),
                    "overriding config record"
                );
                let current = slot.get_mut();
                match policy {
                    MergePolicy::Replace => {
                        current.record = entry.record;
                        current.sources = vec![entry.source];
                    }
                    MergePolicy::FieldWise => {
                        merge_fields(&mut current.record, entry.record);
                        current.sources.push(entry.source);
                    }
                }
            }
        }
    }
}

fn merge_fields(base: &mut NormalizedRecord, overlay: NormalizedRecord) {
    match (base, overlay) {
        (NormalizedRecord::Paths(base), NormalizedRecord::Paths(overlay)) => {
            base.merge_from(overlay)
        }
        (NormalizedRecord::Stage1(base), NormalizedRecord::Stage1(overlay)) => {
            base.merge_from(overlay)
        }
        // Equal keys imply equal kinds; scoped kinds never reach here.
        (base, overlay) => *base = overlay,
    }
}
