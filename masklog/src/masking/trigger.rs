//! Trigger rules and the case-folded lookup table built from them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::labels::MaskLabel;

/// How a configured key is matched and what happens to its value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TriggerRule {
    /// Match the key only with its exact case.
    #[serde(alias = "case_sensitive")]
    pub case_sensitive: bool,
    /// Primitive applied to the matched value.
    #[serde(alias = "mask_label", alias = "maskMethod")]
    pub mask_label: MaskLabel,
    /// `false` deletes the matched key instead of masking it.
    #[serde(alias = "should_appear")]
    pub should_appear: bool,
}

impl TriggerRule {
    /// A case-insensitive rule that masks with `label`.
    #[must_use]
    pub fn mask(label: MaskLabel) -> Self {
        Self {
            case_sensitive: false,
            mask_label: label,
            should_appear: true,
        }
    }

    /// A case-insensitive rule that removes the key.
    #[must_use]
    pub fn remove() -> Self {
        Self {
            case_sensitive: false,
            mask_label: MaskLabel::Default,
            should_appear: false,
        }
    }

    #[must_use]
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }
}

/// A rule together with the key it was configured under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trigger {
    /// Configured key, original case.
    pub key: String,
    pub rule: TriggerRule,
}

/// Lower-cased key to the triggers registered under it.
///
/// Built once and never mutated; replace the owning masker to change it.
/// Within a bucket triggers are ordered by their original key, so lookups do
/// not depend on configuration iteration order.
#[derive(Clone, Debug, Default)]
pub struct TriggerTable {
    buckets: HashMap<String, Vec<Trigger>>,
}

impl TriggerTable {
    /// Builds the table from `(key, rule)` pairs.
    pub fn new<I, K>(triggers: I) -> Self
    where
        I: IntoIterator<Item = (K, TriggerRule)>,
        K: Into<String>,
    {
        let mut buckets: HashMap<String, Vec<Trigger>> = HashMap::new();
        for (key, rule) in triggers {
            let key = key.into();
            buckets
                .entry(key.to_lowercase())
                .or_default()
                .push(Trigger { key, rule });
        }
        for bucket in buckets.values_mut() {
            bucket.sort_by(|a, b| a.key.cmp(&b.key));
        }
        Self { buckets }
    }

    /// Resolves the trigger for a document key.
    ///
    /// Precedence within the lower-cased bucket:
    /// 1. a case-sensitive trigger whose key equals `key` exactly;
    /// 2. a case-insensitive trigger whose key equals `key` exactly;
    /// 3. the first case-insensitive trigger.
    ///
    /// Case-sensitive triggers never match a key that differs in case.
    pub fn lookup(&self, key: &str) -> Option<&Trigger> {
        let bucket = self.buckets.get(&key.to_lowercase())?;

        bucket
            .iter()
            .find(|t| t.rule.case_sensitive && t.key == key)
            .or_else(|| {
                bucket
                    .iter()
                    .find(|t| !t.rule.case_sensitive && t.key == key)
            })
            .or_else(|| bucket.iter().find(|t| !t.rule.case_sensitive))
    }

    /// Number of configured triggers.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl<K> FromIterator<(K, TriggerRule)> for TriggerTable
where
    K: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, TriggerRule)>>(iter: I) -> Self {
        Self::new(iter)
    }
}
