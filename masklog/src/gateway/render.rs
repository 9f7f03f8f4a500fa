//! Rendering a log statement into notification text.

use std::fmt::Write as _;

use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::{field::PreparedFields, level::Level};

/// Failure to render a notification.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to format timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
    #[error("failed to write rendered text: {0}")]
    Write(#[from] std::fmt::Error),
}

/// Everything a renderer may show about one log statement.
#[derive(Clone, Debug)]
pub struct Placeholder {
    pub time: OffsetDateTime,
    pub level: Level,
    pub source: String,
    pub context_fields: PreparedFields,
    pub fields: PreparedFields,
    pub message: String,
}

/// Turns a [`Placeholder`] into the text sent to delivery channels.
pub trait Renderer: Send + Sync {
    fn render(&self, placeholder: &Placeholder) -> Result<String, RenderError>;
}

impl<F> Renderer for F
where
    F: Fn(&Placeholder) -> Result<String, RenderError> + Send + Sync,
{
    fn render(&self, placeholder: &Placeholder) -> Result<String, RenderError> {
        self(placeholder)
    }
}

/// Renders notifications as a Markdown block.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn render(&self, placeholder: &Placeholder) -> Result<String, RenderError> {
        let mut out = String::new();

        writeln!(out, "**Time:**\n*{}*\n", placeholder.time.format(&Rfc3339)?)?;
        writeln!(out, "**Level:**\n*{}*\n", placeholder.level)?;
        writeln!(out, "**Origin:**\n*{}*\n", placeholder.source)?;

        if !placeholder.context_fields.is_empty() {
            writeln!(out, "**Context Fields:**")?;
            for field in &placeholder.context_fields {
                writeln!(out, "*{}*: {}", field.key(), field.value())?;
            }
            writeln!(out)?;
        }

        if !placeholder.fields.is_empty() {
            writeln!(out, "**Fields:**")?;
            for field in &placeholder.fields {
                writeln!(out, "*{}*: {}", field.key(), field.value())?;
            }
            writeln!(out)?;
        }

        write!(out, "**Message:**\n*{}*", placeholder.message)?;
        Ok(out)
    }
}
