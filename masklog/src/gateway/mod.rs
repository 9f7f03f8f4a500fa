//! Best-effort fan-out of rendered log statements to delivery channels.
//!
//! A [`Gateway`] renders a [`Placeholder`] once and dispatches the text to
//! every configured [`DeliveryChannel`] concurrently, each on its own task.
//! A failing or panicking channel does not affect its siblings; the gateway
//! waits for all of them and reports the failures together. It imposes no
//! deadline of its own.

mod channel;
mod render;

use std::{fmt, sync::Arc};

use futures::future::join_all;

pub use channel::{DeliveryChannel, DeliveryError, LevelFilter};
pub use render::{MarkdownRenderer, Placeholder, RenderError, Renderer};

/// A channel that failed to receive a notification.
#[derive(Debug)]
pub struct ChannelFailure {
    pub channel: String,
    pub error: DeliveryError,
}

impl fmt::Display for ChannelFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.channel, self.error)
    }
}

/// Outcome of a gateway dispatch that did not fully succeed.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("failed to render notification: {0}")]
    Render(#[from] RenderError),
    #[error("{failed} of {attempted} deliveries failed", failed = .failures.len())]
    Delivery {
        attempted: usize,
        failures: Vec<ChannelFailure>,
    },
}

/// Renders log statements and fans them out to delivery channels.
#[derive(Clone)]
pub struct Gateway {
    renderer: Arc<dyn Renderer>,
    channels: Vec<Arc<dyn DeliveryChannel>>,
}

impl Gateway {
    /// A gateway with the Markdown renderer and no channels.
    pub fn new() -> Self {
        Self {
            renderer: Arc::new(MarkdownRenderer),
            channels: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_renderer<R>(mut self, renderer: R) -> Self
    where
        R: Renderer + 'static,
    {
        self.renderer = Arc::new(renderer);
        self
    }

    #[must_use]
    pub fn with_channel<C>(mut self, channel: C) -> Self
    where
        C: DeliveryChannel + 'static,
    {
        self.channels.push(Arc::new(channel));
        self
    }

    /// Adds shared channels, or replaces the current ones when `replace` is set.
    #[must_use]
    pub fn with_channels<I>(mut self, replace: bool, channels: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn DeliveryChannel>>,
    {
        if replace {
            self.channels.clear();
        }
        self.channels.extend(channels);
        self
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Renders `placeholder` and delivers it to every channel.
    ///
    /// Must be called from within a tokio runtime. Returns once every dispatch
    /// has finished; the order in which channels complete is unspecified.
    pub async fn notify(&self, placeholder: &Placeholder) -> Result<(), GatewayError> {
        let text: Arc<str> = self.renderer.render(placeholder)?.into();
        let level = placeholder.level;

        let dispatches = self.channels.iter().map(|channel| {
            let channel = Arc::clone(channel);
            let text = Arc::clone(&text);
            tokio::spawn(async move { channel.deliver(level, &text).await })
        });
        let outcomes = join_all(dispatches).await;

        let failures: Vec<ChannelFailure> = self
            .channels
            .iter()
            .zip(outcomes)
            .filter_map(|(channel, outcome)| {
                let error = match outcome {
                    Ok(Ok(())) => return None,
                    Ok(Err(err)) => err,
                    Err(join_err) if join_err.is_panic() => DeliveryError::Panicked,
                    Err(_) => DeliveryError::Cancelled,
                };
                Some(ChannelFailure {
                    channel: channel.name().to_string(),
                    error,
                })
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(GatewayError::Delivery {
                attempted: self.channels.len(),
                failures,
            })
        }
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field(
                "channels",
                &self.channels.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}
