//! Delivery channel contract.

use async_trait::async_trait;

use crate::level::Level;

/// Failure reported by a delivery channel.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The remote end refused the message.
    #[error("delivery rejected: {0}")]
    Rejected(String),
    /// Transport or client failure.
    #[error(transparent)]
    Transport(#[from] Box<dyn std::error::Error + Send + Sync>),
    /// The dispatch task panicked.
    #[error("delivery task panicked")]
    Panicked,
    /// The dispatch task was cancelled before finishing.
    #[error("delivery task was cancelled")]
    Cancelled,
}

impl DeliveryError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }
}

/// An external destination for rendered notifications (chat bot, pager, ...).
///
/// Implementations are shared between concurrent dispatches and must not
/// assume any ordering relative to other channels.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn deliver(&self, level: Level, text: &str) -> Result<(), DeliveryError>;
}

/// Forwards only notifications at or above `min_level` to the inner channel.
#[derive(Clone, Debug)]
pub struct LevelFilter<C> {
    min_level: Level,
    inner: C,
}

impl<C> LevelFilter<C> {
    pub fn new(min_level: Level, inner: C) -> Self {
        Self { min_level, inner }
    }

    pub fn min_level(&self) -> Level {
        self.min_level
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

#[async_trait]
impl<C> DeliveryChannel for LevelFilter<C>
where
    C: DeliveryChannel,
{
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn deliver(&self, level: Level, text: &str) -> Result<(), DeliveryError> {
        if level < self.min_level {
            return Ok(());
        }
        self.inner.deliver(level, text).await
    }
}
