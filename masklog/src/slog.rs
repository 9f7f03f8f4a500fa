//! Adapters for emitting prepared fields and masked documents through `slog`.
//!
//! This module connects the field pipeline with `slog`:
//! - [`PreparedFields`] implements `slog::KV`, emitting fields in order under
//!   their runtime keys.
//! - [`FieldValue`] implements `slog::Value`; nested documents are emitted as
//!   structured JSON via `slog`'s nested-value support.
//! - [`MaskedJson`] logs any serializable value after routing it through a
//!   [`Masker`].
//!
//! Logging APIs here are infallible: a document that cannot be masked is
//! replaced by a placeholder string rather than emitted raw.

use serde::Serialize;
use serde_json::Value as JsonValue;
use slog::{Key, Record, Result as SlogResult, Serializer, Value as SlogValue, KV};

use crate::{
    field::{FieldValue, PreparedFields},
    masking::Masker,
};

/// Placeholder logged when a value could not be masked.
pub const MASK_FAILED_PLACEHOLDER: &str = "[MASKING FAILED]";

impl SlogValue for FieldValue {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        match self {
            FieldValue::Int(v) => serializer.emit_i64(key, *v),
            FieldValue::Uint(v) => serializer.emit_u64(key, *v),
            FieldValue::Float(v) => serializer.emit_f64(key, *v),
            FieldValue::Bool(v) => serializer.emit_bool(key, *v),
            FieldValue::Str(v) | FieldValue::Error(v) | FieldValue::Caller(v) => {
                serializer.emit_str(key, v)
            }
            FieldValue::Json(v) | FieldValue::Masked(v) => {
                SlogValue::serialize(&slog::Serde(v.clone()), record, key, serializer)
            }
            // Only reachable for documents whose masking failed.
            FieldValue::Secure(raw) => serializer.emit_str(key, &String::from_utf8_lossy(raw)),
        }
    }
}

impl KV for PreparedFields {
    fn serialize(&self, record: &Record<'_>, serializer: &mut dyn Serializer) -> SlogResult {
        for field in self {
            SlogValue::serialize(
                field.value(),
                record,
                Key::from(field.key().to_string()),
                serializer,
            )?;
        }
        Ok(())
    }
}

/// A `slog::Value` that emits an owned masked payload as structured JSON.
pub struct MaskedJson {
    value: JsonValue,
}

impl MaskedJson {
    fn new(value: JsonValue) -> Self {
        Self { value }
    }

    /// The payload that will be logged.
    pub fn value(&self) -> &JsonValue {
        &self.value
    }
}

impl SlogValue for MaskedJson {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        let nested = slog::Serde(self.value.clone());
        SlogValue::serialize(&nested, record, key, serializer)
    }
}

/// Converts values into a `slog::Value` that logs their masked form as JSON.
///
/// ## Example
/// ```ignore
/// use masklog::slog::IntoMaskedJson;
///
/// info!(logger, "request"; "body" => request.into_masked_json(&masker));
/// ```
pub trait IntoMaskedJson: Serialize {
    /// Serializes `self`, masks it and returns a `slog::Value` for the result.
    ///
    /// If serialization or masking fails, the returned value stores
    /// [`MASK_FAILED_PLACEHOLDER`] as a JSON string.
    fn into_masked_json(&self, masker: &Masker) -> MaskedJson {
        let masked = serde_json::to_value(self)
            .ok()
            .and_then(|value| masker.mask_value(value).ok())
            .unwrap_or_else(|| JsonValue::String(MASK_FAILED_PLACEHOLDER.to_string()));
        MaskedJson::new(masked)
    }
}

impl<T> IntoMaskedJson for T where T: Serialize + ?Sized {}
