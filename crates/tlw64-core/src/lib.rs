//! Protocol adapter for the TLW64 wrist band.
//!
//! The band speaks a small single-opcode protocol over one BLE control
//! characteristic (outgoing commands) and one notify characteristic
//! (acks and reports). This crate encodes host requests into command
//! buffers, decodes the notify stream, and sequences the initialization
//! handshake.
//!
//! # Layers
//!
//! | Module | Role |
//! |--------|------|
//! | [`commands`] | Pure encoders, one per command |
//! | [`dispatch`] | Pure decoder for inbound frames |
//! | [`transaction`], [`init`] | Ordered batches of writes and markers |
//! | [`presentation`] | What to show and how to buzz for notifications and calls |
//! | [`watch`] | The adapter tying it together over a [`CommandChannel`] |
//! | [`ble`] | btleplug transport |
//! | [`mock`] | In-memory transport for tests |
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use btleplug::api::{Central, Manager as _, Peripheral as _, ScanFilter};
//! use btleplug::platform::Manager;
//! use tlw64_core::{BleChannel, BroadcastSink, Config, Watch};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("tlw64.toml")?;
//!
//!     // Finding the band is up to the host
//!     let manager = Manager::new().await?;
//!     let adapter = manager.adapters().await?.into_iter().next().ok_or("no adapter")?;
//!     adapter.start_scan(ScanFilter::default()).await?;
//!     tokio::time::sleep(Duration::from_secs(5)).await;
//!     let mut band = None;
//!     for peripheral in adapter.peripherals().await? {
//!         if let Some(props) = peripheral.properties().await?
//!             && props.local_name.as_deref() == Some("TLW64")
//!         {
//!             band = Some(peripheral);
//!             break;
//!         }
//!     }
//!     let peripheral = band.ok_or("band not found")?;
//!
//!     let channel =
//!         BleChannel::from_peripheral(adapter, peripheral, config.ble.connection_config()).await?;
//!
//!     let sink = BroadcastSink::default();
//!     let mut events = sink.subscribe();
//!     let watch = Arc::new(Watch::from_config(channel, Arc::new(sink), &config));
//!     watch.attach().await?;
//!     watch.initialize().await?;
//!
//!     while let Ok(event) = events.recv().await {
//!         println!("{:?}", event);
//!     }
//!     Ok(())
//! }
//! ```

pub mod ble;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod init;
pub mod mock;
pub mod presentation;
pub mod settings;
pub mod traits;
pub mod transaction;
pub mod watch;

pub use tlw64_types::types;
pub use tlw64_types::uuids;

pub use ble::{BleChannel, ConnectionConfig};
pub use commands::RepetitionMode;
pub use config::Config;
pub use dispatch::{InboundEvent, dispatch};
pub use error::{Error, Result};
pub use events::{BroadcastSink, TracingSink, WatchEvent};
pub use init::initialization;
pub use mock::{MockChannel, MockChannelBuilder};
pub use presentation::{
    CallCommand, CallSpec, NotificationKind, NotificationSpec, PresentationState, Presenter,
};
pub use settings::SettingsSnapshot;
pub use traits::{CommandChannel, EventSink, FeedbackLevel, Inbound, InboundHandler};
pub use transaction::{DeviceState, Step, Transaction};
pub use watch::{DeviceStatus, Watch};

/// Type alias for an adapter shared across tasks.
///
/// [`Watch::attach`] needs the adapter behind an `Arc` so the channel's
/// inbound handler can reach it.
pub type SharedWatch<C> = std::sync::Arc<Watch<C>>;
