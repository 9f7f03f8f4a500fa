//! Typed log fields and the pipeline that prepares them for emission.
//!
//! Fields are built per log call with the constructors in this module. Before
//! a field reaches a record sink it is prepared: secure documents go through
//! the masker, and every field carrying an error gains a `<key>_FAIL` sibling.
//! Failures stay local to the field; the rest of the statement is still
//! emitted.

mod prepared;

use std::{error::Error as StdError, fmt, panic::Location};

use serde::Serialize;
use serde_json::Value;

pub use prepared::PreparedFields;

/// Suffix of the synthetic field reporting a field's error.
pub const FAIL_SUFFIX: &str = "_FAIL";

/// Key used by [`error`].
pub const ERROR_KEY: &str = "error";

/// Key of the call-site field attached to every record.
pub const CALLER_KEY: &str = "caller";

/// The value of a field, tagged with its semantic type.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Str(String),
    /// Text of an error.
    Error(String),
    /// `file:line` of a call site.
    Caller(String),
    /// Nested data emitted as-is.
    Json(Value),
    /// Raw document that must pass the masker before emission.
    ///
    /// After preparation this only remains when masking failed.
    Secure(Vec<u8>),
    /// A secure document after masking.
    Masked(Value),
}

impl FieldValue {
    /// Whether the value still has to be routed through the masker.
    pub fn is_secure(&self) -> bool {
        matches!(self, FieldValue::Secure(_))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Uint(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Bool(v) => write!(f, "{v}"),
            FieldValue::Str(v) | FieldValue::Error(v) | FieldValue::Caller(v) => f.write_str(v),
            FieldValue::Json(v) | FieldValue::Masked(v) => write!(f, "{v}"),
            FieldValue::Secure(raw) => f.write_str(&String::from_utf8_lossy(raw)),
        }
    }
}

/// A single key/value pair of a log call.
///
/// `error` is set when building or masking the value failed. It never aborts
/// the log statement; preparation turns it into a `<key>_FAIL` sibling.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    key: String,
    value: FieldValue,
    error: Option<String>,
}

impl Field {
    pub fn new(key: impl Into<String>, value: FieldValue) -> Self {
        Self {
            key: key.into(),
            value,
            error: None,
        }
    }

    /// A field whose value could not be built or masked.
    pub fn failed(key: impl Into<String>, value: FieldValue, error: impl fmt::Display) -> Self {
        Self {
            key: key.into(),
            value,
            error: Some(error.to_string()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Key of the sibling that reports this field's error.
    pub fn fail_key(&self) -> String {
        format!("{}{FAIL_SUFFIX}", self.key)
    }

    pub(crate) fn into_parts(self) -> (String, FieldValue, Option<String>) {
        (self.key, self.value, self.error)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.value)
    }
}

pub fn int(key: impl Into<String>, value: impl Into<i64>) -> Field {
    Field::new(key, FieldValue::Int(value.into()))
}

pub fn uint(key: impl Into<String>, value: impl Into<u64>) -> Field {
    Field::new(key, FieldValue::Uint(value.into()))
}

pub fn float(key: impl Into<String>, value: impl Into<f64>) -> Field {
    Field::new(key, FieldValue::Float(value.into()))
}

pub fn bool(key: impl Into<String>, value: bool) -> Field {
    Field::new(key, FieldValue::Bool(value))
}

pub fn string(key: impl Into<String>, value: impl Into<String>) -> Field {
    Field::new(key, FieldValue::Str(value.into()))
}

/// Any `Display` value, rendered to text when the field is built.
pub fn display(key: impl Into<String>, value: &impl fmt::Display) -> Field {
    Field::new(key, FieldValue::Str(value.to_string()))
}

/// An error under the key `"error"`.
pub fn error<E>(err: &E) -> Field
where
    E: StdError + ?Sized,
{
    error_named(ERROR_KEY, err)
}

pub fn error_named<E>(key: impl Into<String>, err: &E) -> Field
where
    E: StdError + ?Sized,
{
    Field::new(key, FieldValue::Error(err.to_string()))
}

/// A raw JSON document embedded unmasked.
///
/// If the document does not parse, the raw text is kept and the field carries
/// the parse error.
pub fn json(key: impl Into<String>, document: impl AsRef<[u8]>) -> Field {
    let document = document.as_ref();
    match serde_json::from_slice(document) {
        Ok(value) => Field::new(key, FieldValue::Json(value)),
        Err(err) => Field::failed(
            key,
            FieldValue::Str(String::from_utf8_lossy(document).into_owned()),
            err,
        ),
    }
}

/// Any serializable value as nested data, unmasked.
pub fn serialized<T>(key: impl Into<String>, value: &T) -> Field
where
    T: Serialize + ?Sized,
{
    match serde_json::to_value(value) {
        Ok(value) => Field::new(key, FieldValue::Json(value)),
        Err(err) => Field::failed(key, FieldValue::Json(Value::Null), err),
    }
}

/// A raw JSON document that is masked before emission.
pub fn secure(key: impl Into<String>, document: impl Into<Vec<u8>>) -> Field {
    Field::new(key, FieldValue::Secure(document.into()))
}

/// A serializable value that is masked before emission.
pub fn secure_serialized<T>(key: impl Into<String>, value: &T) -> Field
where
    T: Serialize + ?Sized,
{
    match serde_json::to_vec(value) {
        Ok(document) => secure(key, document),
        Err(err) => Field::failed(key, FieldValue::Json(Value::Null), err),
    }
}

/// The `file:line` of the caller.
///
/// Propagates through functions marked `#[track_caller]`, so a logging method
/// reports the line that called it.
#[track_caller]
pub fn caller(key: impl Into<String>) -> Field {
    let location = Location::caller();
    Field::new(
        key,
        FieldValue::Caller(format!("{}:{}", location.file(), location.line())),
    )
}
