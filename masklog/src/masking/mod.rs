//! Sensitive-data masking for JSON documents.
//!
//! - **`trigger`**: which keys are sensitive (`TriggerRule`, `TriggerTable`)
//! - **`labels`**: how a matched value is masked (`MaskLabel` and its primitives)
//! - **`engine`**: the depth-bounded walker tying both together (`Masker`)

mod engine;
mod labels;
mod trigger;

pub use engine::{MaskError, Masker};
pub use labels::{MaskFn, MaskLabel, MaskResult, DEFAULT_MASK_SYMBOL};
pub use trigger::{Trigger, TriggerRule, TriggerTable};
