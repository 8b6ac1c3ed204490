//! BLE command channel.
//!
//! [`BleChannel`] executes transactions against a connected band using
//! btleplug. Control writes go to the vendor control characteristic with
//! response, battery reads hit the standard battery service, and notify
//! frames are forwarded to the installed [`InboundHandler`] from a spawned
//! task.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{Characteristic, Peripheral as _, WriteType};
use btleplug::platform::{Adapter, Peripheral};
use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use tlw64_types::uuids::{BATTERY_LEVEL, CONTROL, NOTIFY};

use crate::error::{Error, Result};
use crate::traits::{CommandChannel, Inbound, InboundHandler};
use crate::transaction::{DeviceState, Step, Transaction};

/// Default timeout for establishing a connection.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default timeout for service discovery.
const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for characteristic reads.
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for characteristic writes.
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// BLE timeouts.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tlw64_core::ble::ConnectionConfig;
///
/// let config = ConnectionConfig::default()
///     .connection_timeout(Duration::from_secs(20))
///     .write_timeout(Duration::from_secs(5));
/// assert_eq!(config.write_timeout, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Timeout for establishing a BLE connection.
    pub connection_timeout: Duration,
    /// Timeout for service discovery after connection.
    pub discovery_timeout: Duration,
    /// Timeout for each characteristic read.
    pub read_timeout: Duration,
    /// Timeout for each characteristic write.
    pub write_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connection_timeout: DEFAULT_CONNECT_TIMEOUT,
            discovery_timeout: DEFAULT_DISCOVERY_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

impl ConnectionConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set the service discovery timeout.
    #[must_use]
    pub fn discovery_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout = timeout;
        self
    }

    /// Set the read timeout.
    #[must_use]
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the write timeout.
    #[must_use]
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}

/// A connected band.
///
/// # Cleanup
///
/// Call [`BleChannel::disconnect`] before dropping. Dropping a connected
/// channel aborts the notification task and disconnects in the background.
pub struct BleChannel {
    /// Kept alive for the lifetime of the peripheral connection.
    #[allow(dead_code)]
    adapter: Adapter,
    peripheral: Peripheral,
    name: Option<String>,
    characteristics: HashMap<Uuid, Characteristic>,
    /// Held for the duration of one transaction.
    in_flight: Mutex<()>,
    handler: Arc<RwLock<Option<InboundHandler>>>,
    notification_handle: Mutex<Option<JoinHandle<()>>>,
    state: watch::Sender<Option<DeviceState>>,
    disconnected: AtomicBool,
    config: ConnectionConfig,
}

impl std::fmt::Debug for BleChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BleChannel")
            .field("name", &self.name)
            .field("characteristics", &self.characteristics.len())
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl BleChannel {
    /// Connect to a peripheral the host has already discovered.
    ///
    /// Fails with [`Error::CharacteristicNotFound`] if the band does not
    /// expose the control and notify characteristics.
    #[tracing::instrument(level = "info", skip_all, fields(connect_timeout = ?config.connection_timeout))]
    pub async fn from_peripheral(
        adapter: Adapter,
        peripheral: Peripheral,
        config: ConnectionConfig,
    ) -> Result<Self> {
        info!("Connecting to band...");
        timeout(config.connection_timeout, peripheral.connect())
            .await
            .map_err(|_| Error::timeout("connect to band", config.connection_timeout))??;
        info!("Connected!");

        info!("Discovering services...");
        timeout(config.discovery_timeout, peripheral.discover_services())
            .await
            .map_err(|_| Error::timeout("discover services", config.discovery_timeout))??;

        let services = peripheral.services();
        let mut characteristics = HashMap::new();
        for service in &services {
            debug!("  Service: {}", service.uuid);
            for characteristic in &service.characteristics {
                debug!("    Characteristic: {}", characteristic.uuid);
                characteristics.insert(characteristic.uuid, characteristic.clone());
            }
        }

        for required in [CONTROL, NOTIFY] {
            if !characteristics.contains_key(&required) {
                return Err(Error::characteristic_not_found(
                    required.to_string(),
                    services.len(),
                ));
            }
        }

        let name = peripheral
            .properties()
            .await?
            .and_then(|props| props.local_name);

        let (state, _) = watch::channel(None);
        Ok(Self {
            adapter,
            peripheral,
            name,
            characteristics,
            in_flight: Mutex::new(()),
            handler: Arc::new(RwLock::new(None)),
            notification_handle: Mutex::new(None),
            state,
            disconnected: AtomicBool::new(false),
            config,
        })
    }

    /// Advertised name of the band.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Timeouts in use.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Last lifecycle marker executed.
    pub fn state(&self) -> Option<DeviceState> {
        *self.state.borrow()
    }

    /// Follow lifecycle markers as they are executed.
    pub fn subscribe_state(&self) -> watch::Receiver<Option<DeviceState>> {
        self.state.subscribe()
    }

    /// Whether the BLE stack reports a live link.
    pub async fn is_connected(&self) -> bool {
        self.peripheral.is_connected().await.unwrap_or(false)
    }

    /// Stop notifications and drop the link.
    #[tracing::instrument(level = "info", skip(self), fields(band = ?self.name))]
    pub async fn disconnect(&self) -> Result<()> {
        info!("Disconnecting from band...");
        self.disconnected.store(true, Ordering::SeqCst);
        if let Some(handle) = self.notification_handle.lock().await.take() {
            handle.abort();
        }
        self.peripheral.disconnect().await?;
        Ok(())
    }

    fn characteristic(&self, uuid: Uuid) -> Result<&Characteristic> {
        self.characteristics.get(&uuid).ok_or_else(|| {
            Error::characteristic_not_found(uuid.to_string(), self.peripheral.services().len())
        })
    }

    async fn execute(&self, step: &Step) -> Result<()> {
        if needs_link(step) && self.disconnected.load(Ordering::SeqCst) {
            return Err(Error::NotConnected);
        }
        match step {
            Step::SetState(state) => {
                info!("Band state: {}", state);
                self.state.send_replace(Some(*state));
            }
            Step::EnableNotifications => self.enable_notifications().await?,
            Step::Write(buf) => self.write_control(buf).await?,
            Step::ReadBatteryLevel => self.read_battery_level().await?,
        }
        Ok(())
    }

    async fn write_control(&self, buf: &Bytes) -> Result<()> {
        let characteristic = self.characteristic(CONTROL)?;
        debug!("Write {:02X?}", &buf[..]);
        timeout(
            self.config.write_timeout,
            self.peripheral
                .write(characteristic, buf, WriteType::WithResponse),
        )
        .await
        .map_err(|_| Error::timeout("write control", self.config.write_timeout))??;
        Ok(())
    }

    async fn read_battery_level(&self) -> Result<()> {
        let characteristic = self.characteristic(BATTERY_LEVEL)?;
        let data = timeout(self.config.read_timeout, self.peripheral.read(characteristic))
            .await
            .map_err(|_| Error::timeout("read battery level", self.config.read_timeout))??;

        match data.first() {
            Some(&percent) => self.emit(Inbound::BatteryLevel(percent)),
            None => warn!("Empty battery level read"),
        }
        Ok(())
    }

    async fn enable_notifications(&self) -> Result<()> {
        let characteristic = self.characteristic(NOTIFY)?;
        self.peripheral.subscribe(characteristic).await?;
        let mut stream = self.peripheral.notifications().await?;

        let handler = Arc::clone(&self.handler);
        let handle = tokio::spawn(async move {
            while let Some(notification) = stream.next().await {
                if notification.uuid != NOTIFY {
                    continue;
                }
                let current = handler
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone();
                if let Some(callback) = current {
                    callback(Inbound::Control(Bytes::from(notification.value)));
                }
            }
            debug!("Notification stream ended");
        });

        if let Some(previous) = self.notification_handle.lock().await.replace(handle) {
            previous.abort();
        }
        Ok(())
    }

    fn emit(&self, inbound: Inbound) {
        let current = self
            .handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(callback) = current {
            callback(inbound);
        }
    }
}

/// Whether a step talks to the band. Lifecycle markers stay local.
fn needs_link(step: &Step) -> bool {
    !matches!(step, Step::SetState(_))
}

#[async_trait]
impl CommandChannel for BleChannel {
    #[tracing::instrument(level = "debug", skip_all, fields(transaction = %transaction.name()))]
    async fn submit(&self, transaction: Transaction) -> Result<()> {
        let _guard = self.in_flight.lock().await;
        for step in transaction.steps() {
            self.execute(step).await.inspect_err(|e| {
                warn!("Transaction '{}' failed: {}", transaction.name(), e);
            })?;
        }
        Ok(())
    }

    async fn set_inbound_handler(&self, handler: InboundHandler) -> Result<()> {
        *self.handler.write().unwrap_or_else(PoisonError::into_inner) = Some(handler);
        Ok(())
    }
}

impl Drop for BleChannel {
    fn drop(&mut self) {
        if self.disconnected.swap(true, Ordering::SeqCst) {
            return;
        }
        warn!(
            band = ?self.name,
            "BleChannel dropped without calling disconnect(), cleaning up in the background"
        );

        if let Ok(mut slot) = self.notification_handle.try_lock()
            && let Some(handle) = slot.take()
        {
            handle.abort();
        }

        let peripheral = self.peripheral.clone();
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                if let Err(e) = peripheral.disconnect().await {
                    debug!(error = %e, "Background disconnect failed");
                }
            });
        }
    }
}
