//! Command opcodes and argument constants of the TLW64 protocol.
//!
//! Every buffer exchanged with the band, in either direction, starts with one
//! of the [`Opcode`] bytes. The band echoes the opcode of a request back on the
//! notify characteristic, so the same byte means "set X" on the way out and
//! "X was applied" (or "here is X") on the way in.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// First byte of every command or notification buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Opcode {
    /// Distance units and clock format.
    /// Format: `[0xA0, units, clock]`
    DisplaySettings = 0xA0,
    /// Firmware version request / report.
    /// Format out: `[0xA1]`, in: `[0xA1, ascii...]`
    FirmwareVersion = 0xA1,
    /// Legacy battery report.
    /// Format in: `[0xA2, percent]`
    Battery = 0xA2,
    /// Date and time.
    /// Format: `[0xA3, year_hi, year_lo, month, day, hour, minute, second]`
    DateTime = 0xA3,
    /// User profile (stride, weight, step goal, age, gender).
    UserData = 0xA9,
    /// Alarm slot, also used for one-shot vibration.
    Alarm = 0xAB,
    /// Factory reset.
    /// Format: `[0xAD]`
    FactoryReset = 0xAD,
    /// Notification text, notification type or stop.
    Notification = 0xC1,
    /// Notification icon.
    /// Format: `[0xC3, icon]`
    Icon = 0xC3,
    /// Device behavior settings.
    DeviceSettings = 0xD3,
}

impl Opcode {
    /// Every known opcode, in ascending byte order.
    pub const ALL: [Opcode; 10] = [
        Opcode::DisplaySettings,
        Opcode::FirmwareVersion,
        Opcode::Battery,
        Opcode::DateTime,
        Opcode::UserData,
        Opcode::Alarm,
        Opcode::FactoryReset,
        Opcode::Notification,
        Opcode::Icon,
        Opcode::DeviceSettings,
    ];

    /// The wire byte of this opcode.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Opcode {
    type Error = ParseError;

    /// Convert a byte value to an `Opcode`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tlw64_types::Opcode;
    ///
    /// assert_eq!(Opcode::try_from(0xA3), Ok(Opcode::DateTime));
    /// assert!(Opcode::try_from(0xFF).is_err());
    /// ```
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0xA0 => Ok(Opcode::DisplaySettings),
            0xA1 => Ok(Opcode::FirmwareVersion),
            0xA2 => Ok(Opcode::Battery),
            0xA3 => Ok(Opcode::DateTime),
            0xA9 => Ok(Opcode::UserData),
            0xAB => Ok(Opcode::Alarm),
            0xAD => Ok(Opcode::FactoryReset),
            0xC1 => Ok(Opcode::Notification),
            0xC3 => Ok(Opcode::Icon),
            0xD3 => Ok(Opcode::DeviceSettings),
            _ => Err(ParseError::UnknownOpcode(value)),
        }
    }
}

impl From<Opcode> for u8 {
    fn from(opcode: Opcode) -> Self {
        opcode as u8
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Opcode::DisplaySettings => "display settings",
            Opcode::FirmwareVersion => "firmware version",
            Opcode::Battery => "battery",
            Opcode::DateTime => "date/time",
            Opcode::UserData => "user data",
            Opcode::Alarm => "alarm",
            Opcode::FactoryReset => "factory reset",
            Opcode::Notification => "notification",
            Opcode::Icon => "icon",
            Opcode::DeviceSettings => "device settings",
        };
        write!(f, "{} (0x{:02X})", name, self.as_byte())
    }
}

// --- Notification frame tags ---

/// Second byte of a notification text frame.
pub const NOTIFICATION_HEADER: u8 = 0x01;

/// Notification type: incoming call.
pub const NOTIFICATION_CALL: u8 = 0x02;

/// Notification type: SMS.
pub const NOTIFICATION_SMS: u8 = 0x03;

/// Stops whatever notification is on screen (used to end a ringing call).
pub const NOTIFICATION_STOP: u8 = 0x04;

/// Maximum number of encoded text bytes in one notification frame.
pub const NOTIFICATION_TEXT_MAX: usize = 18;

/// Kind tag sent in the second notification frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum NotificationType {
    /// Incoming call screen.
    Call = NOTIFICATION_CALL,
    /// SMS screen.
    Sms = NOTIFICATION_SMS,
}

// --- Icons ---

/// Icon shown by the `0xC3` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Icon {
    /// QQ messenger.
    Qq = 0x01,
    /// WeChat, used for every chat application.
    WeChat = 0x02,
    /// Envelope, the fallback for anything else.
    Mail = 0x04,
}

// --- Alarm repetition bits ---

/// Repeat on Monday.
pub const REPEAT_MONDAY: u8 = 0x01;
/// Repeat on Tuesday.
pub const REPEAT_TUESDAY: u8 = 0x02;
/// Repeat on Wednesday.
pub const REPEAT_WEDNESDAY: u8 = 0x04;
/// Repeat on Thursday.
pub const REPEAT_THURSDAY: u8 = 0x08;
/// Repeat on Friday.
pub const REPEAT_FRIDAY: u8 = 0x10;
/// Repeat on Saturday.
pub const REPEAT_SATURDAY: u8 = 0x20;
/// Repeat on Sunday.
pub const REPEAT_SUNDAY: u8 = 0x40;

/// Number of alarm slots on the band.
pub const MAX_ALARMS: usize = 3;
