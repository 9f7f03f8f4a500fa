//! Structured logging with masking of sensitive JSON fields.
//!
//! This crate separates:
//! - **Triggers**: which object keys are sensitive, and whether they are masked
//!   or removed.
//! - **Labels**: how a matched value is masked (password, card number, email, ...).
//!
//! The [`Masker`] walks a JSON document up to a fixed depth and applies the
//! configured rules. Log fields built with [`field::secure`] are routed through
//! it before they reach a record sink; fields that fail to build or mask are
//! still emitted, followed by a `<key>_FAIL` sibling carrying the error.
//!
//! With the `gateway` feature (default), a [`Logger`] writes each record to a
//! `slog` logger and fans the statement out to notification channels without
//! blocking the caller.
//!
//! What this crate does not do:
//! - format or ship records (bring your own `slog` drain)
//! - implement concrete notification transports
//! - retry failed deliveries

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::future_not_send,
    clippy::option_if_let_else
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

// Module declarations
pub mod config;
pub mod field;
mod level;
pub mod masking;
pub mod registry;
pub mod slog;

#[cfg(feature = "gateway")]
pub mod gateway;
#[cfg(feature = "gateway")]
mod logger;

// Re-exports
pub use config::{ConfigError, LoggerConfig, MaskerConfig, DEFAULT_MAX_DEPTH};
pub use field::{Field, FieldValue, PreparedFields};
pub use level::Level;
pub use masking::{MaskError, MaskLabel, Masker, TriggerRule, TriggerTable};

#[cfg(feature = "gateway")]
pub use gateway::{
    DeliveryChannel, DeliveryError, Gateway, GatewayError, MarkdownRenderer, Placeholder,
    Renderer,
};
#[cfg(feature = "gateway")]
pub use logger::Logger;
