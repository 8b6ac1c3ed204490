//! Inbound opcode dispatcher.
//!
//! The band answers on the notify characteristic with single-opcode frames.
//! [`dispatch`] maps one frame to an [`InboundEvent`]. It is total: an empty
//! buffer yields `None`, and anything it cannot interpret (unknown opcode, a
//! known opcode with a payload too short for its layout) yields
//! [`InboundEvent::Unhandled`] with the raw bytes kept for diagnostics.

use std::fmt;

use serde::{Deserialize, Serialize};

use tlw64_types::{DateTimeEcho, Opcode};

/// Semantic meaning of one inbound frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Display settings were applied.
    DisplaySettingsAck,
    /// Firmware version string, verbatim.
    ///
    /// The band reports a shorter string than the vendor app shows
    /// (e.g. `RM07JV000404` vs `RM07JV000404_15897`).
    FirmwareVersion { version: String },
    /// Battery level from the legacy `0xA2` report.
    ///
    /// Kept for diagnostics only; the standard battery service is the
    /// source of truth.
    BatteryLevel { percent: u8 },
    /// Date and time echoed after a time sync.
    DateTimeAck { datetime: DateTimeEcho },
    /// User data was applied.
    UserDataAck,
    /// An alarm (or vibration) was applied.
    AlarmAck,
    /// Factory reset was accepted.
    FactoryResetAck,
    /// A notification is on screen.
    NotificationAck,
    /// An icon is on screen.
    IconAck,
    /// Device settings were applied.
    DeviceSettingsAck,
    /// Anything the dispatcher does not understand.
    Unhandled { opcode: u8, raw: Vec<u8> },
}

impl InboundEvent {
    /// Whether this event is a decode anomaly.
    pub fn is_unhandled(&self) -> bool {
        matches!(self, InboundEvent::Unhandled { .. })
    }
}

impl fmt::Display for InboundEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InboundEvent::DisplaySettingsAck => write!(f, "Display settings updated"),
            InboundEvent::FirmwareVersion { version } => {
                write!(f, "Firmware version is: {}", version)
            }
            InboundEvent::BatteryLevel { percent } => write!(f, "Battery level is: {}%", percent),
            InboundEvent::DateTimeAck { datetime } => write!(f, "Time is set to: {}", datetime),
            InboundEvent::UserDataAck => write!(f, "User data updated"),
            InboundEvent::AlarmAck => write!(f, "Alarm updated"),
            InboundEvent::FactoryResetAck => write!(f, "Factory reset requested"),
            InboundEvent::NotificationAck => write!(f, "Notification is displayed"),
            InboundEvent::IconAck => write!(f, "Icon is displayed"),
            InboundEvent::DeviceSettingsAck => write!(f, "Device settings updated"),
            InboundEvent::Unhandled { opcode, raw } => {
                write!(f, "Unhandled opcode 0x{:02X}: {:02X?}", opcode, raw)
            }
        }
    }
}

/// Map one inbound frame to its event.
///
/// # Examples
///
/// ```
/// use tlw64_core::dispatch::{InboundEvent, dispatch};
///
/// assert_eq!(dispatch(&[]), None);
/// assert_eq!(dispatch(&[0xA9]), Some(InboundEvent::UserDataAck));
/// assert!(dispatch(&[0xFF]).unwrap().is_unhandled());
/// ```
pub fn dispatch(data: &[u8]) -> Option<InboundEvent> {
    let (&first, payload) = data.split_first()?;

    let unhandled = || InboundEvent::Unhandled {
        opcode: first,
        raw: data.to_vec(),
    };

    let Ok(opcode) = Opcode::try_from(first) else {
        return Some(unhandled());
    };

    let event = match opcode {
        Opcode::DisplaySettings => InboundEvent::DisplaySettingsAck,
        Opcode::FirmwareVersion => InboundEvent::FirmwareVersion {
            version: String::from_utf8_lossy(payload).into_owned(),
        },
        Opcode::Battery => match payload.first() {
            Some(&percent) => InboundEvent::BatteryLevel { percent },
            None => unhandled(),
        },
        Opcode::DateTime => match DateTimeEcho::from_bytes(payload) {
            Ok(datetime) => InboundEvent::DateTimeAck { datetime },
            Err(_) => unhandled(),
        },
        Opcode::UserData => InboundEvent::UserDataAck,
        Opcode::Alarm => InboundEvent::AlarmAck,
        Opcode::FactoryReset => InboundEvent::FactoryResetAck,
        Opcode::Notification => InboundEvent::NotificationAck,
        Opcode::Icon => InboundEvent::IconAck,
        Opcode::DeviceSettings => InboundEvent::DeviceSettingsAck,
    };
    Some(event)
}
