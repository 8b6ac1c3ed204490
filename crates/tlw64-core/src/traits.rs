//! Seams between the adapter and its host.
//!
//! The adapter never touches the radio itself. It hands [`Transaction`]s to a
//! [`CommandChannel`] and reports what it learns through an [`EventSink`].
//! [`BleChannel`](crate::ble::BleChannel) and
//! [`MockChannel`](crate::mock::MockChannel) implement the channel side;
//! [`BroadcastSink`](crate::events::BroadcastSink) and
//! [`TracingSink`](crate::events::TracingSink) the sink side.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::transaction::Transaction;

/// A buffer or reading delivered by the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Raw frame from the notify characteristic.
    Control(Bytes),
    /// Value of the standard battery level characteristic.
    BatteryLevel(u8),
}

/// Callback the channel invokes for every [`Inbound`] item.
///
/// Invoked from the channel's own task; must not block.
pub type InboundHandler = Arc<dyn Fn(Inbound) + Send + Sync>;

/// Transport that executes transactions against a band.
///
/// # Example
///
/// ```ignore
/// use tlw64_core::{CommandChannel, Result, Transaction};
/// use tlw64_core::commands::encode_vibration;
///
/// async fn buzz<C: CommandChannel>(channel: &C) -> Result<()> {
///     let tx = Transaction::builder("vibrate").write(encode_vibration(1, 3)).build();
///     channel.submit(tx).await
/// }
/// ```
#[async_trait]
pub trait CommandChannel: Send + Sync {
    /// Execute every step of the transaction, in order.
    ///
    /// Steps already executed stay executed when a later step fails.
    async fn submit(&self, transaction: Transaction) -> Result<()>;

    /// Route inbound buffers and readings to `handler`, replacing any
    /// previously installed handler.
    async fn set_inbound_handler(&self, handler: InboundHandler) -> Result<()>;
}

/// Severity of a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackLevel {
    /// Confirmation.
    Info,
    /// Request partly ignored.
    Warn,
    /// Request failed.
    Error,
}

impl fmt::Display for FeedbackLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackLevel::Info => write!(f, "info"),
            FeedbackLevel::Warn => write!(f, "warn"),
            FeedbackLevel::Error => write!(f, "error"),
        }
    }
}

/// Receiver for what the adapter learns and wants to tell the user.
///
/// Calls happen synchronously on whichever task produced the information.
pub trait EventSink: Send + Sync {
    /// The band reported its battery level.
    fn on_battery_level(&self, percent: u8);

    /// The band reported its firmware version.
    fn on_firmware_version(&self, version: &str);

    /// Diagnostic line for the host's log.
    fn on_log_event(&self, message: &str);

    /// Short message for the user (toast, status line).
    fn on_user_feedback(&self, level: FeedbackLevel, message: &str);
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn on_battery_level(&self, percent: u8) {
        (**self).on_battery_level(percent);
    }

    fn on_firmware_version(&self, version: &str) {
        (**self).on_firmware_version(version);
    }

    fn on_log_event(&self, message: &str) {
        (**self).on_log_event(message);
    }

    fn on_user_feedback(&self, level: FeedbackLevel, message: &str) {
        (**self).on_user_feedback(level, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<String>>);

    impl EventSink for Collect {
        fn on_battery_level(&self, percent: u8) {
            self.0.lock().unwrap().push(format!("battery {percent}"));
        }
        fn on_firmware_version(&self, version: &str) {
            self.0.lock().unwrap().push(format!("firmware {version}"));
        }
        fn on_log_event(&self, message: &str) {
            self.0.lock().unwrap().push(format!("log {message}"));
        }
        fn on_user_feedback(&self, level: FeedbackLevel, message: &str) {
            self.0.lock().unwrap().push(format!("{level} {message}"));
        }
    }

    #[test]
    fn test_arc_forwards() {
        let inner = Arc::new(Collect::default());
        let sink: Arc<dyn EventSink> = inner.clone();
        sink.on_battery_level(40);
        sink.on_firmware_version("RM07");
        sink.on_log_event("hello");
        sink.on_user_feedback(FeedbackLevel::Warn, "careful");

        assert_eq!(
            *inner.0.lock().unwrap(),
            vec!["battery 40", "firmware RM07", "log hello", "warn careful"]
        );
    }

    #[test]
    fn test_handler_is_shareable() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = seen.clone();
        let handler: InboundHandler = Arc::new(move |item| captured.lock().unwrap().push(item));

        let cloned = handler.clone();
        handler(Inbound::BatteryLevel(5));
        cloned(Inbound::Control(Bytes::from_static(&[0xA0])));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                Inbound::BatteryLevel(5),
                Inbound::Control(Bytes::from_static(&[0xA0]))
            ]
        );
    }

    #[test]
    fn test_feedback_level_serialization() {
        assert_eq!(
            serde_json::to_string(&FeedbackLevel::Error).unwrap(),
            r#""error""#
        );
    }
}
