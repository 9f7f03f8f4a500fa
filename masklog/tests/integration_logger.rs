//! Integration tests for the logger facade and the notification gateway.
//!
//! These tests verify that:
//! - records reach the `slog` drain with prepared fields and the call site
//! - a failing or panicking delivery channel does not affect its siblings
//! - delivery failures are logged locally and never reach the caller

#![cfg(feature = "gateway")]

use std::{
    fmt::Arguments,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use masklog::{
    field::{self, PreparedFields},
    gateway::{ChannelFailure, LevelFilter, RenderError},
    registry, DeliveryChannel, DeliveryError, Gateway, GatewayError, Level, Logger, LoggerConfig,
    MaskLabel, MaskerConfig, Placeholder, TriggerRule,
};
use time::OffsetDateTime;
use tokio::sync::mpsc;

// ============================================================================
// Test drain
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedRecord {
    level: slog::Level,
    message: String,
    fields: Vec<(String, String)>,
}

impl CapturedRecord {
    fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn position(&self, key: &str) -> usize {
        self.fields.iter().position(|(k, _)| k == key).unwrap()
    }
}

#[derive(Default)]
struct StringSerializer {
    fields: Vec<(String, String)>,
}

impl slog::Serializer for StringSerializer {
    fn emit_arguments(&mut self, key: slog::Key, val: &Arguments<'_>) -> slog::Result {
        self.fields.push((key.to_string(), val.to_string()));
        Ok(())
    }

    fn emit_serde(&mut self, key: slog::Key, val: &dyn slog::SerdeValue) -> slog::Result {
        let json = serde_json::to_string(val.as_serde()).unwrap();
        self.fields.push((key.to_string(), json));
        Ok(())
    }
}

#[derive(Clone, Default)]
struct MemoryDrain {
    records: Arc<Mutex<Vec<CapturedRecord>>>,
}

impl MemoryDrain {
    fn records(&self) -> Vec<CapturedRecord> {
        self.records.lock().unwrap().clone()
    }

    async fn wait_for(&self, message: &str) -> CapturedRecord {
        for _ in 0..200 {
            if let Some(record) = self.records().into_iter().find(|r| r.message == message) {
                return record;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("no record with message {message:?}");
    }
}

impl slog::Drain for MemoryDrain {
    type Ok = ();
    type Err = slog::Never;

    fn log(
        &self,
        record: &slog::Record<'_>,
        values: &slog::OwnedKVList,
    ) -> Result<Self::Ok, Self::Err> {
        use slog::KV;

        let mut serializer = StringSerializer::default();
        record.kv().serialize(record, &mut serializer).unwrap();
        values.serialize(record, &mut serializer).unwrap();
        self.records.lock().unwrap().push(CapturedRecord {
            level: record.level(),
            message: record.msg().to_string(),
            fields: serializer.fields,
        });
        Ok(())
    }
}

fn logger_with(config: LoggerConfig) -> (Logger, MemoryDrain) {
    let drain = MemoryDrain::default();
    let sink = slog::Logger::root(drain.clone(), slog::o!());
    (Logger::new(config, sink), drain)
}

fn config() -> LoggerConfig {
    LoggerConfig {
        source: "billing".to_string(),
        level: Level::Info,
        masker: MaskerConfig::default()
            .with_trigger("password", TriggerRule::remove())
            .with_trigger("email", TriggerRule::mask(MaskLabel::Email)),
        ..LoggerConfig::default()
    }
}

// ============================================================================
// Test channels
// ============================================================================

struct Recording {
    name: &'static str,
    sent: mpsc::UnboundedSender<(Level, String)>,
}

#[async_trait]
impl DeliveryChannel for Recording {
    fn name(&self) -> &str {
        self.name
    }

    async fn deliver(&self, level: Level, text: &str) -> Result<(), DeliveryError> {
        self.sent
            .send((level, text.to_owned()))
            .map_err(|_| DeliveryError::rejected("receiver dropped"))
    }
}

struct Failing;

#[async_trait]
impl DeliveryChannel for Failing {
    fn name(&self) -> &str {
        "failing"
    }

    async fn deliver(&self, _level: Level, _text: &str) -> Result<(), DeliveryError> {
        Err(DeliveryError::rejected("chat is down"))
    }
}

struct Panicking;

#[async_trait]
impl DeliveryChannel for Panicking {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn deliver(&self, _level: Level, _text: &str) -> Result<(), DeliveryError> {
        panic!("channel bug")
    }
}

struct Stalled;

#[async_trait]
impl DeliveryChannel for Stalled {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn deliver(&self, _level: Level, _text: &str) -> Result<(), DeliveryError> {
        std::future::pending().await
    }
}

fn placeholder(level: Level, message: &str) -> Placeholder {
    Placeholder {
        time: OffsetDateTime::UNIX_EPOCH,
        level,
        source: "billing".to_string(),
        context_fields: PreparedFields::default(),
        fields: PreparedFields::new([field::int("attempt", 2)], None),
        message: message.to_string(),
    }
}

fn failed_channels(failures: &[ChannelFailure]) -> Vec<&str> {
    let mut names: Vec<&str> = failures.iter().map(|f| f.channel.as_str()).collect();
    names.sort_unstable();
    names
}

// ============================================================================
// Records
// ============================================================================

#[test]
fn test_record_carries_prepared_fields_and_caller() {
    let (logger, drain) = logger_with(config());

    logger.warn(
        "login rejected",
        [
            field::secure("request", r#"{"password":"pw","email":"ada@example.com"}"#),
            field::secure("raw", "{not json"),
            field::int("attempt", 3),
        ],
    );

    let records = drain.records();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.level, slog::Level::Warning);
    assert_eq!(record.message, "login rejected");
    assert_eq!(
        record.field("request"),
        Some(r#"{"email":"a**@example.com"}"#)
    );
    assert_eq!(record.field("raw"), Some("{not json"));
    assert!(record
        .field("raw_FAIL")
        .unwrap()
        .starts_with("failed to parse document"));
    assert_eq!(record.field("attempt"), Some("3"));
    assert!(record.position("raw") < record.position("raw_FAIL"));
    assert!(record.position("raw_FAIL") < record.position("attempt"));
    assert!(record
        .field("caller")
        .unwrap()
        .contains("integration_logger.rs:"));
}

#[test]
fn test_records_below_level_are_dropped() {
    let (logger, drain) = logger_with(LoggerConfig {
        level: Level::Warn,
        ..config()
    });

    logger.debug("noise", []);
    logger.info("noise", []);
    logger.error("kept", []);
    logger.critical("kept", []);

    let levels: Vec<slog::Level> = drain.records().iter().map(|r| r.level).collect();
    assert_eq!(levels, [slog::Level::Error, slog::Level::Critical]);
}

#[test]
fn test_context_fields_are_attached_to_every_record() {
    let (logger, drain) = logger_with(config());
    let scoped = logger.with_fields([
        field::string("request_id", "r-17"),
        field::secure("user", r#"{"email":"bob@example.com"}"#),
    ]);

    scoped.info("first", []);
    scoped.info("second", [field::bool("cached", true)]);
    logger.info("unscoped", []);

    assert_eq!(scoped.context_fields().len(), 2);
    let records = drain.records();
    for record in &records[..2] {
        assert_eq!(record.field("request_id"), Some("r-17"));
        assert_eq!(record.field("user"), Some(r#"{"email":"b**@example.com"}"#));
    }
    assert_eq!(records[1].field("cached"), Some("true"));
    assert_eq!(records[2].field("request_id"), None);
}

#[test]
fn test_logging_without_runtime_skips_notifications() {
    let (sent, mut received) = mpsc::unbounded_channel();
    let (logger, drain) = logger_with(config());
    let logger = logger.with_gateway(Gateway::new().with_channel(Recording {
        name: "chat",
        sent,
    }));

    logger.error("no runtime here", []);

    assert_eq!(drain.records()[0].message, "no runtime here");
    assert!(received.try_recv().is_err());
}

// ============================================================================
// Gateway
// ============================================================================

#[tokio::test]
async fn test_gateway_isolates_failing_channels() {
    let (sent, mut received) = mpsc::unbounded_channel();
    let gateway = Gateway::new()
        .with_channel(Recording {
            name: "chat",
            sent: sent.clone(),
        })
        .with_channel(Failing)
        .with_channel(Panicking)
        .with_channel(Recording { name: "pager", sent });

    let err = gateway
        .notify(&placeholder(Level::Error, "disk full"))
        .await
        .unwrap_err();

    match err {
        GatewayError::Delivery {
            attempted,
            failures,
        } => {
            assert_eq!(attempted, 4);
            assert_eq!(failed_channels(&failures), ["failing", "panicking"]);
            let panicked = failures.iter().find(|f| f.channel == "panicking").unwrap();
            assert!(matches!(panicked.error, DeliveryError::Panicked));
        }
        other => panic!("unexpected error {other:?}"),
    }

    for _ in 0..2 {
        let (level, text) = received.recv().await.unwrap();
        assert_eq!(level, Level::Error);
        assert!(text.contains("**Fields:**\n*attempt*: 2"));
        assert!(text.ends_with("**Message:**\n*disk full*"));
    }
}

#[tokio::test]
async fn test_gateway_without_failures_is_ok() {
    let (sent, mut received) = mpsc::unbounded_channel();
    let gateway = Gateway::new().with_channel(Recording { name: "chat", sent });

    gateway
        .notify(&placeholder(Level::Info, "deployed"))
        .await
        .unwrap();
    assert!(received.recv().await.is_some());
}

#[tokio::test]
async fn test_render_failure_fails_the_gateway_call() {
    let (sent, mut received) = mpsc::unbounded_channel();
    let gateway = Gateway::new()
        .with_renderer(|_: &Placeholder| Err::<String, _>(RenderError::Write(std::fmt::Error)))
        .with_channel(Recording { name: "chat", sent });

    let err = gateway
        .notify(&placeholder(Level::Info, "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Render(_)));
    assert!(received.try_recv().is_err());
}

#[tokio::test]
async fn test_level_filter_skips_lower_levels() {
    let (sent, mut received) = mpsc::unbounded_channel();
    let filtered = LevelFilter::new(Level::Error, Recording { name: "pager", sent });

    filtered.deliver(Level::Warn, "ignored").await.unwrap();
    filtered.deliver(Level::Critical, "paged").await.unwrap();

    assert_eq!(filtered.name(), "pager");
    assert_eq!(received.recv().await.unwrap().1, "paged");
    assert!(received.try_recv().is_err());
}

// ============================================================================
// Logger and gateway together
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_delivery_failure_is_logged_not_returned() {
    let (sent, mut received) = mpsc::unbounded_channel();
    let (logger, drain) = logger_with(config());
    let logger = logger.with_gateway(
        Gateway::new()
            .with_channel(Failing)
            .with_channel(Recording { name: "chat", sent }),
    );

    // Returns unit: nothing from delivery can reach the caller.
    logger.error(
        "payment failed",
        [field::secure("customer", r#"{"email":"eve@example.com","password":"x"}"#)],
    );

    let (level, text) = tokio::time::timeout(Duration::from_secs(5), received.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(level, Level::Error);
    assert!(text.contains("**Origin:**\n*billing*"));
    assert!(text.contains(r#"*customer*: {"email":"e**@example.com"}"#));
    assert!(!text.contains("password"));

    let warning = drain.wait_for("notification delivery failed").await;
    assert_eq!(warning.level, slog::Level::Warning);
    assert_eq!(warning.field("channel"), Some("failing"));
    assert_eq!(warning.field("error"), Some("delivery rejected: chat is down"));

    assert_eq!(drain.records()[0].message, "payment failed");
}

#[tokio::test]
async fn test_context_fields_reach_notifications() {
    let (sent, mut received) = mpsc::unbounded_channel();
    let (logger, _drain) = logger_with(config());
    let logger = logger
        .with_gateway(Gateway::new().with_channel(Recording { name: "chat", sent }))
        .with_fields([field::string("tenant", "acme")]);

    logger.info("invoice sent", []);

    let (_, text) = tokio::time::timeout(Duration::from_secs(5), received.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(text.contains("**Context Fields:**\n*tenant*: acme\n"));
    assert!(text.contains("**Fields:**\n*caller*: "));
}

#[tokio::test]
async fn test_notifications_beyond_in_flight_limit_are_dropped() {
    let (logger, drain) = logger_with(LoggerConfig {
        max_in_flight_notifications: 2,
        ..config()
    });
    let logger = logger.with_gateway(Gateway::new().with_channel(Stalled));

    for _ in 0..500 {
        logger.info("tick", []);
    }

    let records = drain.records();
    let count = |message: &str| records.iter().filter(|r| r.message == message).count();
    assert_eq!(count("tick"), 500);
    assert_eq!(count("notification dropped: too many in flight"), 498);

    let dropped = records
        .iter()
        .find(|r| r.message == "notification dropped: too many in flight")
        .unwrap();
    assert_eq!(dropped.level, slog::Level::Warning);
    assert_eq!(dropped.field("level"), Some("Info"));
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_replacing_logger_installs_its_masker() {
    let (logger, _drain) = logger_with(config());
    let masker = Arc::clone(logger.masker());

    registry::replace_logger(logger);

    let active = registry::active_masker().unwrap();
    assert!(Arc::ptr_eq(&active, &masker));
    assert!(registry::active_logger().is_some());

    let prepared = PreparedFields::with_active_masker([field::secure(
        "body",
        r#"{"password":"pw"}"#,
    )]);
    assert_eq!(prepared.get("body").unwrap().to_string(), "body: {}");

    registry::clear_logger();
    registry::clear_masker();
    assert!(registry::active_logger().is_none());
}
