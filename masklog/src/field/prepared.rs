use std::sync::Arc;

use super::{Field, FieldValue};
use crate::{masking::Masker, registry};

const NO_ACTIVE_MASKER: &str = "no active masker";

/// Fields that went through the pipeline and may be handed to a sink.
///
/// This is the only field collection that implements `slog::KV`, so an
/// unmasked secure document cannot be emitted by accident. Cloning is cheap.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedFields {
    fields: Arc<[Field]>,
}

impl PreparedFields {
    /// Prepares `fields`, masking secure documents with `masker`.
    ///
    /// Without a masker, secure documents fail soft with a "no active masker"
    /// error.
    pub fn new<I>(fields: I, masker: Option<&Masker>) -> Self
    where
        I: IntoIterator<Item = Field>,
    {
        let fields = fields.into_iter();
        let mut prepared = Vec::with_capacity(2 * fields.size_hint().0);

        for field in fields {
            let field = mask_field(field, masker);
            let fail = field.error().map(|err| {
                Field::new(field.fail_key(), FieldValue::Error(err.to_string()))
            });
            prepared.push(field);
            prepared.extend(fail);
        }

        Self {
            fields: prepared.into(),
        }
    }

    /// Prepares `fields` with the process-wide active masker.
    pub fn with_active_masker<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = Field>,
    {
        let masker = registry::active_masker();
        Self::new(fields, masker.as_deref())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn as_slice(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// These fields followed by `other`.
    pub fn extended(&self, other: &PreparedFields) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        let fields: Vec<Field> = self.iter().chain(other.iter()).cloned().collect();
        Self {
            fields: fields.into(),
        }
    }

    /// First field stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.key() == key)
    }
}

impl Default for PreparedFields {
    fn default() -> Self {
        Self {
            fields: Arc::from(Vec::new()),
        }
    }
}

impl<'a> IntoIterator for &'a PreparedFields {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// Masking failure keeps the raw document and records the error.
fn mask_field(field: Field, masker: Option<&Masker>) -> Field {
    if field.error().is_some() || !field.value().is_secure() {
        return field;
    }

    let (key, value, _) = field.into_parts();
    let FieldValue::Secure(raw) = value else {
        return Field::new(key, value);
    };

    match masker.map(|masker| masker.mask_document(&raw)) {
        Some(Ok(masked)) => Field::new(key, FieldValue::Masked(masked)),
        Some(Err(err)) => Field::failed(key, FieldValue::Secure(raw), err),
        None => Field::failed(key, FieldValue::Secure(raw), NO_ACTIVE_MASKER),
    }
}
