//! Depth-bounded document walker.

use serde_json::{Map, Value};

use super::{
    labels::DEFAULT_MASK_SYMBOL,
    trigger::{TriggerRule, TriggerTable},
};
use crate::config::MaskerConfig;

/// Failures of a single masking call. No partially masked output is ever
/// returned alongside them.
#[derive(Debug, thiserror::Error)]
pub enum MaskError {
    /// The input is not a syntactically valid JSON document.
    #[error("failed to parse document: {0}")]
    Parse(#[source] serde_json::Error),
    /// The document nests deeper than the configured maximum.
    #[error("max recursion depth reached: {max_depth}")]
    DepthExceeded { max_depth: usize },
    /// The masked tree could not be written back out.
    #[error("failed to serialize masked document: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Applies a trigger table to JSON documents.
///
/// A `Masker` is immutable once built and is shared freely between threads;
/// swap in a new one to change its configuration.
///
/// Only object keys trigger masking. Array elements are always walked,
/// scalars pass through, and a masked or removed value is never walked
/// further.
#[derive(Clone, Debug)]
pub struct Masker {
    max_depth: usize,
    mask_symbol: char,
    triggers: TriggerTable,
}

impl Masker {
    /// Builds a masker from its configuration.
    #[must_use]
    pub fn new(config: MaskerConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            mask_symbol: config.mask_symbol,
            triggers: TriggerTable::new(config.triggers),
        }
    }

    /// Builds a masker from an already constructed table.
    #[must_use]
    pub fn with_triggers(max_depth: usize, triggers: TriggerTable) -> Self {
        Self {
            max_depth,
            mask_symbol: DEFAULT_MASK_SYMBOL,
            triggers,
        }
    }

    #[must_use]
    pub fn with_mask_symbol(mut self, mask_symbol: char) -> Self {
        self.mask_symbol = mask_symbol;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn mask_symbol(&self) -> char {
        self.mask_symbol
    }

    pub fn triggers(&self) -> &TriggerTable {
        &self.triggers
    }

    /// Masks a serialized JSON document and returns it serialized again.
    ///
    /// Key order and number formatting of the output are not guaranteed to
    /// match the input.
    pub fn mask(&self, document: &[u8]) -> Result<Vec<u8>, MaskError> {
        let masked = self.mask_document(document)?;
        serde_json::to_vec(&masked).map_err(MaskError::Serialize)
    }

    /// Text counterpart of [`Masker::mask`].
    pub fn mask_str(&self, document: &str) -> Result<String, MaskError> {
        let masked = self.mask_document(document.as_bytes())?;
        serde_json::to_string(&masked).map_err(MaskError::Serialize)
    }

    /// Parses and masks a serialized document, returning the masked tree.
    pub fn mask_document(&self, document: &[u8]) -> Result<Value, MaskError> {
        let tree = serde_json::from_slice(document).map_err(MaskError::Parse)?;
        self.mask_value(tree)
    }

    /// Masks an already deserialized document.
    pub fn mask_value(&self, document: Value) -> Result<Value, MaskError> {
        self.walk(document, 0)
    }

    fn walk(&self, node: Value, depth: usize) -> Result<Value, MaskError> {
        if depth > self.max_depth {
            return Err(MaskError::DepthExceeded {
                max_depth: self.max_depth,
            });
        }

        match node {
            Value::Object(entries) => self.walk_object(entries, depth).map(Value::Object),
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.walk(item, depth + 1))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            scalar => Ok(scalar),
        }
    }

    fn walk_object(
        &self,
        entries: Map<String, Value>,
        depth: usize,
    ) -> Result<Map<String, Value>, MaskError> {
        let mut masked = Map::with_capacity(entries.len());
        for (key, value) in entries {
            match self.triggers.lookup(&key).map(|trigger| trigger.rule) {
                None => {
                    let value = self.walk(value, depth + 1)?;
                    masked.insert(key, value);
                }
                Some(TriggerRule {
                    should_appear: false,
                    ..
                }) => {}
                Some(rule) => {
                    let result = rule.mask_label.apply(key, value, self.mask_symbol);
                    masked.insert(result.key, result.value);
                }
            }
        }
        Ok(masked)
    }
}

impl Default for Masker {
    fn default() -> Self {
        Self::new(MaskerConfig::default())
    }
}
