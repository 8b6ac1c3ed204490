//! Event sinks for battery, firmware, log and feedback reports.
//!
//! [`BroadcastSink`] republishes everything the adapter reports as
//! [`WatchEvent`]s on a `tokio::sync::broadcast` channel, so several
//! consumers (a UI, a logger, a test) can follow one band. [`TracingSink`]
//! only writes to `tracing` and is handy when nobody needs the events.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::traits::{EventSink, FeedbackLevel};

/// Everything an [`EventSink`] can be told, as one serializable value.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new event types
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum WatchEvent {
    /// Battery level in percent.
    BatteryLevel { percent: u8 },
    /// Firmware version string.
    FirmwareVersion { version: String },
    /// Diagnostic log line.
    Log { message: String },
    /// User-facing message.
    Feedback {
        level: FeedbackLevel,
        message: String,
    },
}

/// Sender for watch events.
pub type EventSender = broadcast::Sender<WatchEvent>;

/// Receiver for watch events.
pub type EventReceiver = broadcast::Receiver<WatchEvent>;

/// Sink that broadcasts [`WatchEvent`]s to any number of receivers.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: EventSender,
}

impl BroadcastSink {
    /// Create a sink buffering up to `capacity` events per receiver.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events sent from now on.
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    fn send(&self, event: WatchEvent) {
        // No receivers is fine
        let _ = self.sender.send(event);
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(100)
    }
}

impl EventSink for BroadcastSink {
    fn on_battery_level(&self, percent: u8) {
        self.send(WatchEvent::BatteryLevel { percent });
    }

    fn on_firmware_version(&self, version: &str) {
        self.send(WatchEvent::FirmwareVersion {
            version: version.to_string(),
        });
    }

    fn on_log_event(&self, message: &str) {
        self.send(WatchEvent::Log {
            message: message.to_string(),
        });
    }

    fn on_user_feedback(&self, level: FeedbackLevel, message: &str) {
        self.send(WatchEvent::Feedback {
            level,
            message: message.to_string(),
        });
    }
}

/// Sink that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn on_battery_level(&self, percent: u8) {
        info!("Battery level: {}%", percent);
    }

    fn on_firmware_version(&self, version: &str) {
        info!("Firmware version: {}", version);
    }

    fn on_log_event(&self, message: &str) {
        debug!("{}", message);
    }

    fn on_user_feedback(&self, level: FeedbackLevel, message: &str) {
        match level {
            FeedbackLevel::Info => info!("{}", message),
            FeedbackLevel::Warn => warn!("{}", message),
            FeedbackLevel::Error => error!("{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = WatchEvent::Feedback {
            level: FeedbackLevel::Warn,
            message: "Only 3 alarms are supported.".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"feedback""#));
        assert!(json.contains(r#""level":"warn""#));

        let back: WatchEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[tokio::test]
    async fn test_broadcast_sink() {
        let sink = BroadcastSink::new(8);
        let mut rx = sink.subscribe();
        assert_eq!(sink.receiver_count(), 1);

        sink.on_battery_level(77);
        sink.on_firmware_version("RM07JV000404");
        sink.on_log_event("Unhandled opcode 0xFF: [FF]");

        assert_eq!(
            rx.recv().await.unwrap(),
            WatchEvent::BatteryLevel { percent: 77 }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            WatchEvent::FirmwareVersion {
                version: "RM07JV000404".to_string()
            }
        );
        assert!(matches!(rx.recv().await.unwrap(), WatchEvent::Log { .. }));
    }

    #[test]
    fn test_send_without_receivers() {
        let sink = BroadcastSink::default();
        sink.on_user_feedback(FeedbackLevel::Info, "nobody listening");
        assert_eq!(sink.receiver_count(), 0);
    }

    #[test]
    fn test_tracing_sink_does_not_panic() {
        let sink = TracingSink;
        sink.on_battery_level(1);
        sink.on_firmware_version("x");
        sink.on_log_event("y");
        for level in [FeedbackLevel::Info, FeedbackLevel::Warn, FeedbackLevel::Error] {
            sink.on_user_feedback(level, "z");
        }
    }
}
