//! The TLW64 adapter.
//!
//! [`Watch`] turns host requests (time sync, alarms, notifications, calls)
//! into transactions on a [`CommandChannel`] and turns inbound frames into
//! state updates and [`EventSink`] reports. It never retries: failures are
//! either surfaced to the user through the sink or only logged, depending on
//! how visible the operation is.

use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, PrimitiveDateTime};
use tracing::{debug, info, warn};

use tlw64_types::{Alarm, DisplaySettings, MAX_ALARMS, UserProfile};

use crate::commands::{
    RepetitionMode, encode_alarm, encode_datetime, encode_display_settings,
    encode_factory_reset, encode_icon, encode_notification_stop, encode_notification_text,
    encode_user_data, encode_vibration, repetition_mask,
};
use crate::config::Config;
use crate::dispatch::{InboundEvent, dispatch};
use crate::error::{Error, Result};
use crate::init::initialization;
use crate::presentation::{
    CallSpec, NotificationSpec, PresentationAction, PresentationState, Presenter, Vibration,
};
use crate::settings::SettingsSnapshot;
use crate::traits::{CommandChannel, EventSink, FeedbackLevel, Inbound, InboundHandler};
use crate::transaction::Transaction;

/// Shown when an enabled alarm targets a slot the band does not have.
pub const ALARM_SLOT_WARNING: &str = "Only 3 alarms are supported.";
/// Shown after alarms were sent and at least one is enabled.
pub const ALARMS_SET: &str = "Alarms sent to band";
/// Shown after alarms were sent and none is enabled.
pub const ALARMS_DISABLED: &str = "All alarms disabled";

/// Last values reported by the band. Overwritten, never accumulated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    /// Last battery level in percent.
    pub battery_level: Option<u8>,
    /// Last firmware version string.
    pub firmware_version: Option<String>,
}

/// Protocol adapter for one TLW64 band.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tlw64_core::{BroadcastSink, MockChannel, SettingsSnapshot, Watch};
///
/// #[tokio::main]
/// async fn main() -> tlw64_core::Result<()> {
///     let watch = Arc::new(Watch::new(
///         MockChannel::new(),
///         Arc::new(BroadcastSink::default()),
///         SettingsSnapshot::default(),
///     ));
///     watch.attach().await?;
///     watch.initialize().await?;
///     assert_eq!(watch.channel().transactions().len(), 1);
///     Ok(())
/// }
/// ```
pub struct Watch<C> {
    channel: C,
    sink: Arc<dyn EventSink>,
    settings: RwLock<SettingsSnapshot>,
    repetition: RepetitionMode,
    presenter: Mutex<Presenter>,
    status: RwLock<DeviceStatus>,
}

impl<C: CommandChannel> std::fmt::Debug for Watch<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watch")
            .field("repetition", &self.repetition)
            .field("status", &self.status())
            .field("presentation", &self.presentation_state())
            .finish_non_exhaustive()
    }
}

impl<C: CommandChannel> Watch<C> {
    /// Create an adapter with the default (cascading) alarm repetition.
    pub fn new(channel: C, sink: Arc<dyn EventSink>, settings: SettingsSnapshot) -> Self {
        Self {
            channel,
            sink,
            settings: RwLock::new(settings),
            repetition: RepetitionMode::default(),
            presenter: Mutex::new(Presenter::new()),
            status: RwLock::new(DeviceStatus::default()),
        }
    }

    /// Create an adapter from loaded configuration.
    pub fn from_config(channel: C, sink: Arc<dyn EventSink>, config: &Config) -> Self {
        Self::new(channel, sink, config.snapshot())
            .with_repetition_mode(config.alarms.repetition)
    }

    /// Set how alarm repetition is encoded.
    #[must_use]
    pub fn with_repetition_mode(mut self, mode: RepetitionMode) -> Self {
        self.repetition = mode;
        self
    }

    /// The underlying channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// How alarm repetition is encoded.
    pub fn repetition_mode(&self) -> RepetitionMode {
        self.repetition
    }

    /// Current settings snapshot.
    pub fn settings(&self) -> SettingsSnapshot {
        *self.settings.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Last values reported by the band.
    pub fn status(&self) -> DeviceStatus {
        self.status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// What the band is showing.
    pub fn presentation_state(&self) -> PresentationState {
        self.presenter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state()
    }

    /// Route the channel's inbound frames into [`Watch::handle_inbound`].
    ///
    /// The channel only holds a weak reference, so dropping the last `Arc`
    /// stops delivery.
    pub async fn attach(self: &Arc<Self>) -> Result<()>
    where
        C: 'static,
    {
        let weak: Weak<Self> = Arc::downgrade(self);
        let handler: InboundHandler = Arc::new(move |inbound| {
            if let Some(watch) = weak.upgrade() {
                watch.handle_inbound(inbound);
            }
        });
        self.channel.set_inbound_handler(handler).await
    }

    /// Run the initialization handshake with the current local time.
    pub async fn initialize(&self) -> Result<()> {
        self.initialize_at(local_now()).await
    }

    /// Run the initialization handshake with an explicit clock value.
    #[tracing::instrument(skip(self))]
    pub async fn initialize_at(&self, now: PrimitiveDateTime) -> Result<()> {
        info!("Initializing");
        let tx = initialization(&self.settings(), now);
        self.submit_or_report(tx, "Error initializing band").await?;
        info!("Initialization done");
        Ok(())
    }

    /// Sync the band's clock to the current local time.
    pub async fn set_time(&self) -> Result<()> {
        self.set_time_at(local_now()).await
    }

    /// Sync the band's clock. Failures are logged, not shown to the user.
    #[tracing::instrument(skip(self))]
    pub async fn set_time_at(&self, now: PrimitiveDateTime) -> Result<()> {
        let tx = Transaction::builder("setTime")
            .write(encode_datetime(now))
            .build();
        self.channel.submit(tx).await.inspect_err(|e| {
            warn!("Unable to set time: {}", e);
        })
    }

    /// Program all alarms in one transaction.
    ///
    /// Every position is checked before anything is encoded; one bad slot
    /// abandons the whole request.
    #[tracing::instrument(skip(self, alarms), fields(count = alarms.len()))]
    pub async fn set_alarms(&self, alarms: &[Alarm]) -> Result<()> {
        if let Some(bad) = alarms.iter().find(|alarm| !alarm.has_valid_slot()) {
            warn!("Rejecting alarm at position {}", bad.position);
            if bad.enabled {
                self.sink
                    .on_user_feedback(FeedbackLevel::Warn, ALARM_SLOT_WARNING);
            }
            return Err(Error::InvalidAlarmSlot {
                position: bad.position,
                max: MAX_ALARMS,
            });
        }

        let tx = Transaction::builder("Set alarm")
            .write_all(
                alarms
                    .iter()
                    .map(|alarm| encode_alarm(alarm, repetition_mask(alarm.repetition, self.repetition))),
            )
            .build();

        match self.channel.submit(tx).await {
            Ok(()) => {
                let message = if alarms.iter().any(|alarm| alarm.enabled) {
                    ALARMS_SET
                } else {
                    ALARMS_DISABLED
                };
                self.sink.on_user_feedback(FeedbackLevel::Info, message);
                Ok(())
            }
            Err(e) => {
                self.sink.on_user_feedback(
                    FeedbackLevel::Error,
                    &format!("Error sending alarms to band: {}", e),
                );
                Err(e)
            }
        }
    }

    /// Push new display settings to the band.
    ///
    /// The stored snapshot only changes once the band accepted the write.
    #[tracing::instrument(skip(self))]
    pub async fn set_display_settings(&self, display_settings: DisplaySettings) -> Result<()> {
        let tx = Transaction::builder("setDisplaySettings")
            .write(encode_display_settings(&display_settings))
            .build();
        self.submit_or_report(tx, "Error updating display settings")
            .await?;
        self.settings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .display = display_settings;
        Ok(())
    }

    /// Push a new user profile to the band.
    ///
    /// The stored snapshot only changes once the band accepted the write.
    #[tracing::instrument(skip(self))]
    pub async fn set_user_profile(&self, profile: UserProfile) -> Result<()> {
        let tx = Transaction::builder("setUserData")
            .write(encode_user_data(&profile))
            .build();
        self.submit_or_report(tx, "Error updating user data").await?;
        self.settings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .profile = profile;
        Ok(())
    }

    /// Wipe the band.
    #[tracing::instrument(skip(self))]
    pub async fn factory_reset(&self) -> Result<()> {
        let tx = Transaction::builder("factoryReset")
            .write(encode_factory_reset())
            .build();
        self.submit_or_report(tx, "Error during factory reset").await
    }

    /// Show an app notification.
    #[tracing::instrument(skip(self, notification), fields(id = notification.id, kind = ?notification.kind))]
    pub async fn on_notification(&self, notification: &NotificationSpec) {
        let actions = self.present(|p| p.on_notification(notification));
        self.perform(actions).await;
    }

    /// React to a call state change.
    #[tracing::instrument(skip(self, call), fields(command = ?call.command))]
    pub async fn on_set_call_state(&self, call: &CallSpec) {
        let actions = self.present(|p| p.on_call(call));
        self.perform(actions).await;
    }

    /// Buzz so the user can find the band.
    #[tracing::instrument(skip(self))]
    pub async fn on_find_device(&self, start: bool) {
        let actions = self.present(|p| p.on_find_device(start));
        self.perform(actions).await;
    }

    /// A notification was dismissed on the phone.
    #[tracing::instrument(skip(self))]
    pub async fn on_delete_notification(&self, id: i32) {
        let actions = self.present(|p| p.on_delete_notification(id));
        self.perform(actions).await;
    }

    /// Apply one inbound item.
    ///
    /// Returns the dispatched event for control frames and `None` for
    /// battery-service readings and empty frames. Never fails.
    pub fn handle_inbound(&self, inbound: Inbound) -> Option<InboundEvent> {
        match inbound {
            Inbound::Control(frame) => {
                debug!("Inbound frame: {:02X?}", &frame[..]);
                let event = dispatch(&frame)?;
                self.apply(&event);
                Some(event)
            }
            Inbound::BatteryLevel(percent) => {
                info!("Battery level: {}%", percent);
                self.update_status(|status| status.battery_level = Some(percent));
                self.sink.on_battery_level(percent);
                None
            }
        }
    }

    fn apply(&self, event: &InboundEvent) {
        match event {
            InboundEvent::FirmwareVersion { version } => {
                info!("{}", event);
                self.update_status(|status| status.firmware_version = Some(version.clone()));
                self.sink.on_firmware_version(version);
            }
            InboundEvent::BatteryLevel { percent } => {
                info!("{} (deprecated, battery service is used instead)", event);
                self.update_status(|status| status.battery_level = Some(*percent));
            }
            InboundEvent::Unhandled { .. } => {
                warn!("{}", event);
                self.sink.on_log_event(&event.to_string());
            }
            _ => info!("{}", event),
        }
    }

    /// Submit, and on failure log and tell the user `"{context}: {error}"`.
    async fn submit_or_report(&self, tx: Transaction, context: &str) -> Result<()> {
        let name = tx.name().to_string();
        self.channel.submit(tx).await.inspect_err(|e| {
            warn!("Transaction '{}' failed: {}", name, e);
            self.sink
                .on_user_feedback(FeedbackLevel::Error, &format!("{}: {}", context, e));
        })
    }

    fn update_status(&self, f: impl FnOnce(&mut DeviceStatus)) {
        let mut status = self.status.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut *status);
    }

    fn present<F>(&self, f: F) -> Vec<PresentationAction>
    where
        F: FnOnce(&mut Presenter) -> Vec<PresentationAction>,
    {
        let mut presenter = self.presenter.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *presenter)
    }

    async fn perform(&self, actions: Vec<PresentationAction>) {
        for action in actions {
            match action {
                PresentationAction::ShowText { kind, text } => {
                    let tx = Transaction::builder("showNotification")
                        .write_all(encode_notification_text(kind, &text))
                        .build();
                    if let Err(e) = self.channel.submit(tx).await {
                        self.sink.on_user_feedback(
                            FeedbackLevel::Error,
                            &format!("Error showing notification: {}", e),
                        );
                    }
                }
                PresentationAction::ShowIcon(icon) => {
                    let tx = Transaction::builder("showIcon")
                        .write(encode_icon(icon))
                        .build();
                    if let Err(e) = self.channel.submit(tx).await {
                        self.sink.on_user_feedback(
                            FeedbackLevel::Error,
                            &format!("Error showing icon: {}", e),
                        );
                    }
                }
                PresentationAction::Stop => {
                    let tx = Transaction::builder("clearNotification")
                        .write(encode_notification_stop())
                        .build();
                    if let Err(e) = self.channel.submit(tx).await {
                        warn!("Unable to stop notification: {}", e);
                    }
                }
                PresentationAction::Vibrate(vibration) => self.vibrate(vibration).await,
            }
        }
    }

    async fn vibrate(&self, vibration: Vibration) {
        let tx = Transaction::builder("vibrate")
            .write(encode_vibration(vibration.duration, vibration.count))
            .build();
        if let Err(e) = self.channel.submit(tx).await {
            warn!("Unable to set vibration: {}", e);
        }
    }
}

/// Local wall-clock time, falling back to UTC when the offset is unknown.
fn local_now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    PrimitiveDateTime::new(now.date(), now.time())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{BroadcastSink, WatchEvent};
    use crate::mock::MockChannel;
    use crate::presentation::{CallCommand, NotificationKind};
    use bytes::Bytes;
    use time::macros::datetime;
    use tlw64_types::Weekday;

    fn watch_with(channel: MockChannel) -> (Watch<MockChannel>, BroadcastSink) {
        let sink = BroadcastSink::new(32);
        let watch = Watch::new(channel, Arc::new(sink.clone()), SettingsSnapshot::default());
        (watch, sink)
    }

    fn drain(rx: &mut crate::events::EventReceiver) -> Vec<WatchEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_set_time_writes_one_frame() {
        let (watch, _) = watch_with(MockChannel::new());
        watch
            .set_time_at(datetime!(2024-02-29 13:37:00))
            .await
            .unwrap();

        let txs = watch.channel().transactions();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].name(), "setTime");
        assert_eq!(
            watch.channel().writes(),
            vec![Bytes::from_static(&[0xA3, 0x07, 0xE8, 2, 29, 13, 37, 0])]
        );
    }

    #[tokio::test]
    async fn test_set_time_failure_is_not_surfaced() {
        let (watch, sink) = watch_with(MockChannel::builder().should_fail(true).build());
        let mut rx = sink.subscribe();

        assert!(watch.set_time().await.is_err());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_alarms_one_transaction() {
        let (watch, sink) = watch_with(MockChannel::new());
        let mut rx = sink.subscribe();

        let alarms = [
            Alarm::new(0, 7, 0).repeat(Weekday::Monday),
            Alarm::new(1, 8, 30).enabled(false),
        ];
        watch.set_alarms(&alarms).await.unwrap();

        let txs = watch.channel().transactions();
        assert_eq!(txs.len(), 1);
        let writes: Vec<_> = txs[0].writes().cloned().collect();
        assert_eq!(writes.len(), 2);
        assert_eq!(&writes[0][..], &[0xAB, 0x7F, 7, 0, 2, 10, 2, 0, 1]);
        assert_eq!(&writes[1][..], &[0xAB, 0x00, 8, 30, 0, 0, 0, 0, 2]);

        assert_eq!(
            drain(&mut rx),
            vec![WatchEvent::Feedback {
                level: FeedbackLevel::Info,
                message: ALARMS_SET.to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_exact_repetition_mode() {
        let (watch, _) = watch_with(MockChannel::new());
        let watch = watch.with_repetition_mode(RepetitionMode::Exact);

        let alarm = Alarm::new(2, 6, 45).repeat(Weekday::Monday | Weekday::Wednesday);
        watch.set_alarms(&[alarm]).await.unwrap();
        assert_eq!(watch.channel().writes()[0][1], 0x05);
    }

    #[tokio::test]
    async fn test_all_alarms_disabled_feedback() {
        let (watch, sink) = watch_with(MockChannel::new());
        let mut rx = sink.subscribe();

        watch
            .set_alarms(&[Alarm::new(0, 6, 0).enabled(false)])
            .await
            .unwrap();
        assert_eq!(
            drain(&mut rx),
            vec![WatchEvent::Feedback {
                level: FeedbackLevel::Info,
                message: ALARMS_DISABLED.to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_disabled_bad_slot_is_rejected_quietly() {
        let (watch, sink) = watch_with(MockChannel::new());
        let mut rx = sink.subscribe();

        let err = watch
            .set_alarms(&[Alarm::new(0, 6, 0), Alarm::new(5, 6, 0).enabled(false)])
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(watch.channel().transactions().is_empty());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_alarm_submit_failure_is_surfaced() {
        let (watch, sink) = watch_with(
            MockChannel::builder()
                .should_fail(true)
                .fail_message("link lost")
                .build(),
        );
        let mut rx = sink.subscribe();

        assert!(watch.set_alarms(&[Alarm::new(0, 6, 0)]).await.is_err());
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        let WatchEvent::Feedback { level, message } = &events[0] else {
            panic!("expected feedback, got {:?}", events[0]);
        };
        assert_eq!(*level, FeedbackLevel::Error);
        assert!(message.contains("link lost"));
    }

    #[tokio::test]
    async fn test_display_settings_update_snapshot() {
        let (watch, _) = watch_with(MockChannel::new());
        let display = DisplaySettings::new(
            tlw64_types::Units::Imperial,
            tlw64_types::ClockFormat::H12,
        );
        watch.set_display_settings(display).await.unwrap();

        assert_eq!(watch.settings().display, display);
        assert_eq!(
            watch.channel().writes(),
            vec![Bytes::from_static(&[0xA0, 2, 2])]
        );
    }

    #[tokio::test]
    async fn test_user_profile_update_snapshot() {
        let (watch, _) = watch_with(MockChannel::new());
        let profile = UserProfile {
            weight_kg: 60,
            ..Default::default()
        };
        watch.set_user_profile(profile).await.unwrap();

        assert_eq!(watch.settings().profile, profile);
        let writes = watch.channel().writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0][0], 0xA9);
        assert_eq!(writes[0][4], 60);
    }

    #[tokio::test]
    async fn test_user_profile_failure_is_surfaced_and_not_stored() {
        let (watch, sink) = watch_with(
            MockChannel::builder()
                .should_fail(true)
                .fail_message("write rejected")
                .build(),
        );
        let mut rx = sink.subscribe();
        let profile = UserProfile {
            weight_kg: 90,
            ..Default::default()
        };

        assert!(watch.set_user_profile(profile).await.is_err());
        assert_eq!(watch.settings().profile, UserProfile::default());
        assert_eq!(
            drain(&mut rx),
            vec![WatchEvent::Feedback {
                level: FeedbackLevel::Error,
                message: "Error updating user data: Channel error: write rejected".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_display_settings_failure_is_surfaced_and_not_stored() {
        let (watch, sink) = watch_with(MockChannel::builder().should_fail(true).build());
        let mut rx = sink.subscribe();
        let display = DisplaySettings::new(
            tlw64_types::Units::Imperial,
            tlw64_types::ClockFormat::H12,
        );

        assert!(watch.set_display_settings(display).await.is_err());
        assert_eq!(watch.settings().display, DisplaySettings::default());
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [WatchEvent::Feedback {
                level: FeedbackLevel::Error,
                ..
            }]
        ));
    }

    #[tokio::test]
    async fn test_initialization_failure_is_surfaced() {
        let (watch, sink) = watch_with(MockChannel::builder().connected(false).build());
        let mut rx = sink.subscribe();

        let err = watch
            .initialize_at(datetime!(2026-10-19 08:15:30))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotConnected));
        assert_eq!(
            drain(&mut rx),
            vec![WatchEvent::Feedback {
                level: FeedbackLevel::Error,
                message: "Error initializing band: Not connected to device".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_factory_reset_failure_is_surfaced() {
        let (watch, sink) = watch_with(MockChannel::builder().should_fail(true).build());
        let mut rx = sink.subscribe();

        assert!(watch.factory_reset().await.is_err());
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [WatchEvent::Feedback {
                level: FeedbackLevel::Error,
                ..
            }]
        ));
    }

    #[tokio::test]
    async fn test_vibration_failure_only_logged() {
        let (watch, sink) = watch_with(MockChannel::builder().should_fail(true).build());
        let mut rx = sink.subscribe();

        watch.on_find_device(true).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_icon_failure_surfaced_and_vibration_still_sent() {
        let channel = MockChannel::builder().transient_failures(1).build();
        let (watch, sink) = watch_with(channel);
        let mut rx = sink.subscribe();

        watch
            .on_notification(&NotificationSpec::new(1, NotificationKind::Email))
            .await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            WatchEvent::Feedback { level: FeedbackLevel::Error, message } if message.contains("icon")
        ));
        // Only the vibration made it through
        assert_eq!(
            watch.channel().writes(),
            vec![encode_vibration(1, 1)]
        );
    }

    #[tokio::test]
    async fn test_call_end_sends_stop_and_silence() {
        let (watch, _) = watch_with(MockChannel::new());
        watch
            .on_set_call_state(&CallSpec::new(CallCommand::End))
            .await;

        let names: Vec<String> = watch
            .channel()
            .transactions()
            .iter()
            .map(|tx| tx.name().to_string())
            .collect();
        assert_eq!(names, vec!["clearNotification", "vibrate"]);
        assert_eq!(
            watch.channel().writes(),
            vec![
                Bytes::from_static(&[0xC1, 0x04]),
                Bytes::from_static(&[0xAB, 0, 0, 0, 0, 0, 7, 1]),
            ]
        );
    }

    #[test]
    fn test_inbound_battery_paths() {
        let (watch, sink) = watch_with(MockChannel::new());
        let mut rx = sink.subscribe();

        // Legacy report only updates state
        let event = watch.handle_inbound(Inbound::Control(Bytes::from_static(&[0xA2, 40])));
        assert_eq!(event, Some(InboundEvent::BatteryLevel { percent: 40 }));
        assert_eq!(watch.status().battery_level, Some(40));
        assert!(drain(&mut rx).is_empty());

        // Battery service is reported
        assert_eq!(watch.handle_inbound(Inbound::BatteryLevel(55)), None);
        assert_eq!(watch.status().battery_level, Some(55));
        assert_eq!(
            drain(&mut rx),
            vec![WatchEvent::BatteryLevel { percent: 55 }]
        );
    }

    #[test]
    fn test_inbound_empty_frame() {
        let (watch, _) = watch_with(MockChannel::new());
        assert_eq!(watch.handle_inbound(Inbound::Control(Bytes::new())), None);
        assert_eq!(watch.status(), DeviceStatus::default());
    }

    #[test]
    fn test_firmware_version_overwrites() {
        let (watch, _) = watch_with(MockChannel::new());
        watch.handle_inbound(Inbound::Control(Bytes::from_static(b"\xA1V1")));
        watch.handle_inbound(Inbound::Control(Bytes::from_static(b"\xA1V2")));
        assert_eq!(watch.status().firmware_version.as_deref(), Some("V2"));
    }
}
