//! Process-wide active masker and logger.
//!
//! Passing an `Arc<Masker>` or a [`Logger`](crate::Logger) explicitly is the
//! primary API. This registry exists for call sites that cannot be handed one.
//! Each slot holds an immutable value that is replaced as a whole; readers
//! never block and never observe a partially updated masker.

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::masking::Masker;

static ACTIVE_MASKER: ArcSwapOption<Masker> = ArcSwapOption::const_empty();

/// The currently installed masker, if any.
pub fn active_masker() -> Option<Arc<Masker>> {
    ACTIVE_MASKER.load_full()
}

/// Installs `masker` and returns the one it replaced.
pub fn replace_masker(masker: Arc<Masker>) -> Option<Arc<Masker>> {
    ACTIVE_MASKER.swap(Some(masker))
}

/// Removes the active masker.
pub fn clear_masker() -> Option<Arc<Masker>> {
    ACTIVE_MASKER.swap(None)
}

#[cfg(feature = "gateway")]
mod logger {
    use std::sync::Arc;

    use arc_swap::ArcSwapOption;

    use crate::logger::Logger;

    static ACTIVE_LOGGER: ArcSwapOption<Logger> = ArcSwapOption::const_empty();

    /// The currently installed logger, if any.
    pub fn active_logger() -> Option<Arc<Logger>> {
        ACTIVE_LOGGER.load_full()
    }

    /// Installs `logger` together with its masker and returns the logger it
    /// replaced.
    pub fn replace_logger(logger: Logger) -> Option<Arc<Logger>> {
        super::replace_masker(Arc::clone(logger.masker()));
        ACTIVE_LOGGER.swap(Some(Arc::new(logger)))
    }

    /// Removes the active logger. The active masker is left in place.
    pub fn clear_logger() -> Option<Arc<Logger>> {
        ACTIVE_LOGGER.swap(None)
    }
}

#[cfg(feature = "gateway")]
pub use logger::{active_logger, clear_logger, replace_logger};
