//! Masking primitives bound to mask labels.
//!
//! Primitives are pure `(key, value)` transformations. They do not traverse
//! documents, resolve triggers, or decide whether a key is sensitive; the
//! engine hands them a single matched entry and stores whatever they return.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Symbol used to mask characters when the configuration does not pick one.
pub const DEFAULT_MASK_SYMBOL: char = '*';

/// Fixed width of the CVV mask, independent of the input length.
const CVV_MASK_WIDTH: usize = 3;

/// Named masking primitive attached to a trigger.
///
/// Labels deserialize from their upper snake case names (`PASSWORD`,
/// `CARD_NUMBER`, ...). Any label string this crate does not know falls back
/// to [`MaskLabel::Default`], which leaves the entry untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaskLabel {
    /// Every character replaced, length preserved.
    Password,
    /// Replaced by three mask symbols regardless of length.
    Cvv,
    /// First and last character visible.
    Name,
    /// First six and last four characters visible.
    CardNumber,
    /// First two and last four characters visible.
    PhoneNumber,
    /// First character and the `@domain` part visible.
    Email,
    /// Identity.
    #[default]
    #[serde(other)]
    Default,
}

/// Output of a masking primitive.
///
/// Primitives may rename the key; the engine writes `value` under `key` in
/// place of the matched entry.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskResult {
    /// Key the masked value is stored under.
    pub key: String,
    /// Masked value.
    pub value: Value,
}

/// Signature shared by every masking primitive.
pub type MaskFn = fn(String, Value, char) -> MaskResult;

impl MaskLabel {
    /// All labels, in declaration order.
    pub const ALL: [MaskLabel; 7] = [
        MaskLabel::Password,
        MaskLabel::Cvv,
        MaskLabel::Name,
        MaskLabel::CardNumber,
        MaskLabel::PhoneNumber,
        MaskLabel::Email,
        MaskLabel::Default,
    ];

    /// Returns the primitive registered for this label.
    #[must_use]
    pub fn primitive(self) -> MaskFn {
        match self {
            MaskLabel::Password => mask_password,
            MaskLabel::Cvv => mask_cvv,
            MaskLabel::Name => mask_name,
            MaskLabel::CardNumber => mask_card_number,
            MaskLabel::PhoneNumber => mask_phone_number,
            MaskLabel::Email => mask_email,
            MaskLabel::Default => keep_unchanged,
        }
    }

    /// Applies this label's primitive to `(key, value)`.
    ///
    /// This method is total (it does not return errors).
    #[must_use]
    pub fn apply(self, key: String, value: Value, mask_symbol: char) -> MaskResult {
        (self.primitive())(key, value, mask_symbol)
    }
}

fn mask_password(key: String, value: Value, mask_symbol: char) -> MaskResult {
    let len = stringify(&value).chars().count();
    MaskResult {
        key,
        value: Value::String(repeat_symbol(mask_symbol, len)),
    }
}

fn mask_cvv(key: String, _value: Value, mask_symbol: char) -> MaskResult {
    MaskResult {
        key,
        value: Value::String(repeat_symbol(mask_symbol, CVV_MASK_WIDTH)),
    }
}

fn mask_name(key: String, value: Value, mask_symbol: char) -> MaskResult {
    masked_between(key, &value, 1, 1, mask_symbol)
}

fn mask_card_number(key: String, value: Value, mask_symbol: char) -> MaskResult {
    masked_between(key, &value, 6, 4, mask_symbol)
}

fn mask_phone_number(key: String, value: Value, mask_symbol: char) -> MaskResult {
    masked_between(key, &value, 2, 4, mask_symbol)
}

// Without an `@` the whole value counts as the visible prefix, so it comes
// out unmasked.
fn mask_email(key: String, value: Value, mask_symbol: char) -> MaskResult {
    let text = stringify(&value);
    let total = text.chars().count();
    let (leading, trailing) = match text.chars().position(|c| c == '@') {
        Some(at) => (1, total - at),
        None => (total, 0),
    };
    MaskResult {
        key,
        value: Value::String(mask_between(&text, leading, trailing, mask_symbol)),
    }
}

fn keep_unchanged(key: String, value: Value, _mask_symbol: char) -> MaskResult {
    MaskResult { key, value }
}

fn masked_between(
    key: String,
    value: &Value,
    leading: usize,
    trailing: usize,
    mask_symbol: char,
) -> MaskResult {
    MaskResult {
        key,
        value: Value::String(mask_between(
            &stringify(value),
            leading,
            trailing,
            mask_symbol,
        )),
    }
}

/// Renders a document value as the text the primitives operate on.
///
/// Strings are used verbatim (no quotes); every other value uses its compact
/// JSON form.
fn stringify(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(text) => Cow::Borrowed(text),
        other => Cow::Owned(other.to_string()),
    }
}

/// Keeps `leading` and `trailing` characters and masks the non-whitespace
/// characters between them.
///
/// Operates on Unicode scalar values. Values shorter than
/// `leading + trailing` are masked entirely.
fn mask_between(value: &str, leading: usize, trailing: usize, mask_symbol: char) -> String {
    let chars: Vec<char> = value.chars().collect();
    let total = chars.len();
    if total < leading + trailing {
        return repeat_symbol(mask_symbol, total);
    }

    let mut masked = String::with_capacity(value.len());
    masked.extend(&chars[..leading]);
    masked.extend(
        chars[leading..total - trailing]
            .iter()
            .map(|&c| if c.is_whitespace() { c } else { mask_symbol }),
    );
    masked.extend(&chars[total - trailing..]);
    masked
}

fn repeat_symbol(mask_symbol: char, len: usize) -> String {
    std::iter::repeat(mask_symbol).take(len).collect()
}
