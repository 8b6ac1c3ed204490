//! Mock command channel for testing.
//!
//! [`MockChannel`] implements [`CommandChannel`] without any radio. It
//! records every transaction it accepts and plays the band's part on request:
//! answering battery reads, replying to the firmware request, and letting
//! tests inject arbitrary inbound frames.
//!
//! # Features
//!
//! - **Failure injection**: fail every submission, or only the next few
//! - **Latency simulation**: delay each submission to mimic slow BLE writes
//! - **Band simulation**: canned battery level and firmware version answers

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use tlw64_types::Opcode;

use crate::error::{Error, Result};
use crate::traits::{CommandChannel, Inbound, InboundHandler};
use crate::transaction::{DeviceState, Step, Transaction};

/// A channel that records transactions instead of sending them.
///
/// # Example
///
/// ```
/// use tlw64_core::{CommandChannel, MockChannel, Transaction};
/// use tlw64_core::commands::encode_vibration;
///
/// #[tokio::main]
/// async fn main() {
///     let channel = MockChannel::new();
///     let tx = Transaction::builder("vibrate").write(encode_vibration(1, 3)).build();
///     channel.submit(tx).await.unwrap();
///     assert_eq!(channel.writes(), vec![encode_vibration(1, 3)]);
/// }
/// ```
pub struct MockChannel {
    address: String,
    connected: AtomicBool,
    transactions: RwLock<Vec<Transaction>>,
    handler: RwLock<Option<InboundHandler>>,
    state: RwLock<Option<DeviceState>>,
    notifications_enabled: AtomicBool,
    battery_level: RwLock<Option<u8>>,
    firmware_version: RwLock<Option<String>>,
    submit_count: AtomicU32,
    should_fail: AtomicBool,
    fail_message: RwLock<String>,
    /// Simulated submit latency in milliseconds (0 = no delay).
    latency_ms: AtomicU64,
    /// Number of submissions to fail before succeeding.
    fail_count: AtomicU32,
    /// Failures left before submissions succeed again.
    remaining_failures: AtomicU32,
}

impl std::fmt::Debug for MockChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockChannel")
            .field("address", &self.address)
            .field("connected", &self.connected.load(Ordering::Relaxed))
            .field("submit_count", &self.submit_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        MockChannelBuilder::new().build()
    }
}

impl MockChannel {
    /// Create a connected channel that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start configuring a channel.
    pub fn builder() -> MockChannelBuilder {
        MockChannelBuilder::new()
    }

    /// Fake device address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Whether the fake link is up.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Bring the fake link up or down.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Relaxed);
    }

    /// Transactions accepted so far, in submission order.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every buffer written by accepted transactions, in order.
    pub fn writes(&self) -> Vec<Bytes> {
        self.transactions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .flat_map(|tx| tx.writes().cloned())
            .collect()
    }

    /// Forget recorded transactions and reset the submission counter.
    pub fn clear(&self) {
        self.transactions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.submit_count.store(0, Ordering::Relaxed);
    }

    /// Number of submissions attempted, including failed ones.
    pub fn submit_count(&self) -> u32 {
        self.submit_count.load(Ordering::Relaxed)
    }

    /// Last lifecycle marker seen.
    pub fn state(&self) -> Option<DeviceState> {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a transaction subscribed to notifications.
    pub fn notifications_enabled(&self) -> bool {
        self.notifications_enabled.load(Ordering::Relaxed)
    }

    /// Whether an inbound handler is installed.
    pub fn has_handler(&self) -> bool {
        self.handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Inject a frame as if the band sent it on the notify characteristic.
    ///
    /// Returns `false` when no handler is installed.
    pub fn deliver(&self, frame: &[u8]) -> bool {
        self.emit(Inbound::Control(Bytes::copy_from_slice(frame)))
    }

    /// Inject a battery service reading.
    ///
    /// Returns `false` when no handler is installed.
    pub fn deliver_battery_level(&self, percent: u8) -> bool {
        self.emit(Inbound::BatteryLevel(percent))
    }

    /// Set the level answered to battery reads (`None` = no answer).
    pub fn set_battery_level(&self, level: Option<u8>) {
        *self
            .battery_level
            .write()
            .unwrap_or_else(PoisonError::into_inner) = level;
    }

    /// Make every submission fail.
    pub fn set_should_fail(&self, fail: bool, message: Option<&str>) {
        self.should_fail.store(fail, Ordering::Relaxed);
        if let Some(msg) = message {
            *self
                .fail_message
                .write()
                .unwrap_or_else(PoisonError::into_inner) = msg.to_string();
        }
    }

    /// Set simulated submit latency.
    ///
    /// Set to `Duration::ZERO` to disable latency simulation.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Fail the next `count` submissions, then succeed.
    pub fn set_transient_failures(&self, count: u32) {
        self.fail_count.store(count, Ordering::Relaxed);
        self.remaining_failures.store(count, Ordering::Relaxed);
    }

    /// Re-arm the transient failure counter.
    pub fn reset_transient_failures(&self) {
        self.remaining_failures
            .store(self.fail_count.load(Ordering::Relaxed), Ordering::Relaxed);
    }

    /// Transient failures left.
    pub fn remaining_failures(&self) -> u32 {
        self.remaining_failures.load(Ordering::Relaxed)
    }

    fn emit(&self, inbound: Inbound) -> bool {
        let handler = self
            .handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match handler {
            Some(handler) => {
                handler(inbound);
                true
            }
            None => false,
        }
    }

    async fn check_should_fail(&self) -> Result<()> {
        let latency = self.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        if !self.is_connected() {
            return Err(Error::NotConnected);
        }

        let fail = |this: &Self| {
            Error::channel(
                this.fail_message
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone(),
            )
        };

        if self.remaining_failures.load(Ordering::Relaxed) > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::Relaxed);
            return Err(fail(self));
        }

        if self.should_fail.load(Ordering::Relaxed) {
            Err(fail(self))
        } else {
            Ok(())
        }
    }

    fn firmware_reply(&self) -> Option<Bytes> {
        let version = self
            .firmware_version
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()?;
        let mut buf = BytesMut::with_capacity(1 + version.len());
        buf.put_u8(Opcode::FirmwareVersion.as_byte());
        buf.put_slice(version.as_bytes());
        Some(buf.freeze())
    }
}

#[async_trait]
impl CommandChannel for MockChannel {
    async fn submit(&self, transaction: Transaction) -> Result<()> {
        self.submit_count.fetch_add(1, Ordering::Relaxed);
        self.check_should_fail().await?;

        debug!(
            "Mock accepted '{}' ({} steps)",
            transaction.name(),
            transaction.len()
        );

        for step in transaction.steps() {
            match step {
                Step::SetState(state) => {
                    *self.state.write().unwrap_or_else(PoisonError::into_inner) = Some(*state);
                }
                Step::EnableNotifications => {
                    self.notifications_enabled.store(true, Ordering::Relaxed);
                }
                Step::Write(buf) => {
                    if buf[..] == [Opcode::FirmwareVersion.as_byte()]
                        && let Some(reply) = self.firmware_reply()
                    {
                        self.emit(Inbound::Control(reply));
                    }
                }
                Step::ReadBatteryLevel => {
                    let level = *self
                        .battery_level
                        .read()
                        .unwrap_or_else(PoisonError::into_inner);
                    if let Some(level) = level {
                        self.emit(Inbound::BatteryLevel(level));
                    }
                }
            }
        }

        self.transactions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(transaction);
        Ok(())
    }

    async fn set_inbound_handler(&self, handler: InboundHandler) -> Result<()> {
        *self.handler.write().unwrap_or_else(PoisonError::into_inner) = Some(handler);
        Ok(())
    }
}

/// Builder for [`MockChannel`].
#[derive(Debug, Clone)]
pub struct MockChannelBuilder {
    connected: bool,
    battery_level: Option<u8>,
    firmware_version: Option<String>,
    should_fail: bool,
    fail_message: String,
    transient_failures: u32,
    latency: Duration,
}

impl Default for MockChannelBuilder {
    fn default() -> Self {
        Self {
            connected: true,
            battery_level: None,
            firmware_version: None,
            should_fail: false,
            fail_message: "Mock failure".to_string(),
            transient_failures: 0,
            latency: Duration::ZERO,
        }
    }
}

impl MockChannelBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the fake link up or down.
    #[must_use]
    pub fn connected(mut self, connected: bool) -> Self {
        self.connected = connected;
        self
    }

    /// Answer battery reads with this level.
    #[must_use]
    pub fn battery_level(mut self, level: u8) -> Self {
        self.battery_level = Some(level);
        self
    }

    /// Answer firmware requests with this version string.
    #[must_use]
    pub fn firmware_version(mut self, version: impl Into<String>) -> Self {
        self.firmware_version = Some(version.into());
        self
    }

    /// Fail every submission.
    #[must_use]
    pub fn should_fail(mut self, fail: bool) -> Self {
        self.should_fail = fail;
        self
    }

    /// Message carried by injected failures.
    #[must_use]
    pub fn fail_message(mut self, message: impl Into<String>) -> Self {
        self.fail_message = message.into();
        self
    }

    /// Fail the first `count` submissions.
    #[must_use]
    pub fn transient_failures(mut self, count: u32) -> Self {
        self.transient_failures = count;
        self
    }

    /// Delay every submission.
    #[must_use]
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Build the channel.
    #[must_use]
    pub fn build(self) -> MockChannel {
        MockChannel {
            address: format!("MOCK-{:06X}", rand::random::<u32>() % 0xFFFFFF),
            connected: AtomicBool::new(self.connected),
            transactions: RwLock::new(Vec::new()),
            handler: RwLock::new(None),
            state: RwLock::new(None),
            notifications_enabled: AtomicBool::new(false),
            battery_level: RwLock::new(self.battery_level),
            firmware_version: RwLock::new(self.firmware_version),
            submit_count: AtomicU32::new(0),
            should_fail: AtomicBool::new(self.should_fail),
            fail_message: RwLock::new(self.fail_message),
            latency_ms: AtomicU64::new(self.latency.as_millis() as u64),
            fail_count: AtomicU32::new(self.transient_failures),
            remaining_failures: AtomicU32::new(self.transient_failures),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{encode_factory_reset, encode_firmware_request};
    use std::sync::{Arc, Mutex};

    fn collecting_handler() -> (InboundHandler, Arc<Mutex<Vec<Inbound>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = seen.clone();
        let handler: InboundHandler = Arc::new(move |item| captured.lock().unwrap().push(item));
        (handler, seen)
    }

    #[tokio::test]
    async fn test_records_transactions() {
        let channel = MockChannel::new();
        assert!(channel.address().starts_with("MOCK-"));

        let tx = Transaction::builder("factoryReset")
            .write(encode_factory_reset())
            .build();
        channel.submit(tx.clone()).await.unwrap();

        assert_eq!(channel.transactions(), vec![tx]);
        assert_eq!(channel.writes(), vec![encode_factory_reset()]);
        assert_eq!(channel.submit_count(), 1);

        channel.clear();
        assert!(channel.transactions().is_empty());
        assert_eq!(channel.submit_count(), 0);
    }

    #[tokio::test]
    async fn test_should_fail() {
        let channel = MockChannel::new();
        channel.set_should_fail(true, Some("Test error"));

        let result = channel.submit(Transaction::builder("x").build()).await;
        let err = result.unwrap_err();
        assert!(err.is_channel());
        assert!(err.to_string().contains("Test error"));
        assert!(channel.transactions().is_empty());
        assert_eq!(channel.submit_count(), 1);
    }

    #[tokio::test]
    async fn test_transient_failures() {
        let channel = MockChannel::builder().transient_failures(2).build();

        for _ in 0..2 {
            assert!(channel.submit(Transaction::builder("x").build()).await.is_err());
        }
        assert_eq!(channel.remaining_failures(), 0);
        assert!(channel.submit(Transaction::builder("x").build()).await.is_ok());

        channel.reset_transient_failures();
        assert_eq!(channel.remaining_failures(), 2);
    }

    #[tokio::test]
    async fn test_disconnected() {
        let channel = MockChannel::builder().connected(false).build();
        let result = channel.submit(Transaction::builder("x").build()).await;
        assert!(matches!(result, Err(Error::NotConnected)));

        channel.set_connected(true);
        assert!(channel.submit(Transaction::builder("x").build()).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency() {
        let channel = MockChannel::builder()
            .latency(Duration::from_millis(200))
            .build();
        let start = tokio::time::Instant::now();
        channel.submit(Transaction::builder("x").build()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(200));

        channel.set_latency(Duration::ZERO);
        let start = tokio::time::Instant::now();
        channel.submit(Transaction::builder("x").build()).await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_simulated_band_answers() {
        let channel = MockChannel::builder()
            .battery_level(64)
            .firmware_version("RM07JV000404")
            .build();
        let (handler, seen) = collecting_handler();
        channel.set_inbound_handler(handler).await.unwrap();
        assert!(channel.has_handler());

        let tx = Transaction::builder("init")
            .set_state(DeviceState::Initializing)
            .enable_notifications()
            .read_battery_level()
            .write(encode_firmware_request())
            .set_state(DeviceState::Initialized)
            .build();
        channel.submit(tx).await.unwrap();

        assert!(channel.notifications_enabled());
        assert_eq!(channel.state(), Some(DeviceState::Initialized));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                Inbound::BatteryLevel(64),
                Inbound::Control(Bytes::from_static(b"\xA1RM07JV000404")),
            ]
        );
    }

    #[tokio::test]
    async fn test_deliver() {
        let channel = MockChannel::new();
        assert!(!channel.deliver(&[0xA0]));

        let (handler, seen) = collecting_handler();
        channel.set_inbound_handler(handler).await.unwrap();
        assert!(channel.deliver(&[0xA0]));
        assert!(channel.deliver_battery_level(12));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                Inbound::Control(Bytes::from_static(&[0xA0])),
                Inbound::BatteryLevel(12),
            ]
        );
    }
}
