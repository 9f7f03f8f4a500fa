//! Logging facade over a `slog` record sink and a notification [`Gateway`].
//!
//! A log call prepares its fields, writes the local record synchronously and
//! returns. Notification delivery is spawned as a detached task on the
//! logger's tokio runtime, bounded by a fixed number of in-flight permits.
//! When every permit is taken the notification is dropped with a warning.
//! Delivery failures are logged through the same sink as warnings and never
//! reach the caller.

use std::{iter, sync::Arc};

use time::OffsetDateTime;
use tokio::{runtime::Handle, sync::Semaphore};

use crate::{
    config::LoggerConfig,
    field::{self, Field, PreparedFields, CALLER_KEY},
    gateway::{Gateway, GatewayError, Placeholder},
    level::Level,
    masking::Masker,
};

/// Cheaply cloneable logger. Clones share the masker, gateway and
/// notification permits.
#[derive(Clone)]
pub struct Logger {
    sink: slog::Logger,
    level: Level,
    source: Arc<str>,
    masker: Arc<Masker>,
    context: PreparedFields,
    gateway: Arc<Gateway>,
    runtime: Option<Handle>,
    in_flight: Arc<Semaphore>,
}

impl Logger {
    /// Builds a logger writing records to `sink`.
    ///
    /// Captures the current tokio runtime, if any, for notification dispatch.
    /// Without a runtime, notifications are skipped and only records are
    /// written.
    pub fn new(config: LoggerConfig, sink: slog::Logger) -> Self {
        Self {
            sink,
            level: config.level,
            source: config.source.into(),
            masker: Arc::new(Masker::new(config.masker)),
            context: PreparedFields::default(),
            gateway: Arc::new(Gateway::new()),
            runtime: Handle::try_current().ok(),
            in_flight: Arc::new(Semaphore::new(config.max_in_flight_notifications.max(1))),
        }
    }

    /// Uses a shared masker instead of the one built from configuration.
    #[must_use]
    pub fn with_masker(mut self, masker: Arc<Masker>) -> Self {
        self.masker = masker;
        self
    }

    #[must_use]
    pub fn with_gateway(mut self, gateway: Gateway) -> Self {
        self.gateway = Arc::new(gateway);
        self
    }

    /// Dispatches notifications on `runtime`.
    #[must_use]
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// A child logger attaching `fields` to every record and notification.
    ///
    /// The fields are prepared once, here.
    #[must_use]
    pub fn with_fields<I>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = Field>,
    {
        let prepared = PreparedFields::new(fields, Some(&self.masker));
        let mut child = self.clone();
        child.sink = self.sink.new(slog::OwnedKV(prepared.clone()));
        child.context = self.context.extended(&prepared);
        child
    }

    pub fn masker(&self) -> &Arc<Masker> {
        &self.masker
    }

    pub fn context_fields(&self) -> &PreparedFields {
        &self.context
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    #[track_caller]
    pub fn debug<I>(&self, message: &str, fields: I)
    where
        I: IntoIterator<Item = Field>,
    {
        self.log(Level::Debug, message, fields);
    }

    #[track_caller]
    pub fn info<I>(&self, message: &str, fields: I)
    where
        I: IntoIterator<Item = Field>,
    {
        self.log(Level::Info, message, fields);
    }

    #[track_caller]
    pub fn warn<I>(&self, message: &str, fields: I)
    where
        I: IntoIterator<Item = Field>,
    {
        self.log(Level::Warn, message, fields);
    }

    #[track_caller]
    pub fn error<I>(&self, message: &str, fields: I)
    where
        I: IntoIterator<Item = Field>,
    {
        self.log(Level::Error, message, fields);
    }

    #[track_caller]
    pub fn critical<I>(&self, message: &str, fields: I)
    where
        I: IntoIterator<Item = Field>,
    {
        self.log(Level::Critical, message, fields);
    }

    /// Writes one record and schedules its notification.
    ///
    /// Every record gets a `caller` field with the call site.
    #[track_caller]
    pub fn log<I>(&self, level: Level, message: &str, fields: I)
    where
        I: IntoIterator<Item = Field>,
    {
        if !self.enabled(level) {
            return;
        }

        let caller = field::caller(CALLER_KEY);
        let fields = PreparedFields::new(
            fields.into_iter().chain(iter::once(caller)),
            Some(&self.masker),
        );

        let record = self.sink.new(slog::OwnedKV(fields.clone()));
        emit(&record, level, message);

        self.dispatch(level, message, fields);
    }

    fn dispatch(&self, level: Level, message: &str, fields: PreparedFields) {
        if self.gateway.is_empty() {
            return;
        }
        let Some(runtime) = &self.runtime else {
            slog::debug!(self.sink, "notification skipped: no async runtime"; "level" => level.as_str());
            return;
        };
        // Taken before spawning: at most one task exists per permit.
        let Ok(permit) = Arc::clone(&self.in_flight).try_acquire_owned() else {
            slog::warn!(self.sink, "notification dropped: too many in flight"; "level" => level.as_str());
            return;
        };

        let placeholder = Placeholder {
            time: OffsetDateTime::now_utc(),
            level,
            source: self.source.to_string(),
            context_fields: self.context.clone(),
            fields,
            message: message.to_owned(),
        };
        let gateway = Arc::clone(&self.gateway);
        let sink = self.sink.clone();

        runtime.spawn(async move {
            let _permit = permit;
            if let Err(err) = gateway.notify(&placeholder).await {
                report(&sink, &err);
            }
        });
    }
}

fn emit(sink: &slog::Logger, level: Level, message: &str) {
    match level {
        Level::Debug => slog::debug!(sink, "{}", message),
        Level::Info => slog::info!(sink, "{}", message),
        Level::Warn => slog::warn!(sink, "{}", message),
        Level::Error => slog::error!(sink, "{}", message),
        Level::Critical => slog::crit!(sink, "{}", message),
    }
}

fn report(sink: &slog::Logger, err: &GatewayError) {
    match err {
        GatewayError::Delivery { failures, .. } => {
            for failure in failures {
                slog::warn!(sink, "notification delivery failed";
                    "channel" => %failure.channel,
                    "error" => %failure.error);
            }
        }
        GatewayError::Render(_) => {
            slog::warn!(sink, "notification rendering failed"; "error" => %err);
        }
    }
}
