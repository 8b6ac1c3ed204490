//! Platform-agnostic protocol types for the TLW64 wrist band.
//!
//! This crate holds the vocabulary shared by everything that talks to the
//! band: opcodes and argument constants, BLE UUIDs, and the domain types the
//! host hands to the adapter (display settings, user profile, alarms).
//!
//! # Example
//!
//! ```
//! use tlw64_types::{Alarm, Opcode, Weekday};
//!
//! let alarm = Alarm::new(0, 7, 15).repeat(Weekday::Monday);
//! assert!(alarm.has_valid_slot());
//! assert_eq!(Opcode::Alarm.as_byte(), 0xAB);
//! ```

pub mod error;
pub mod opcode;
pub mod types;
pub mod uuid;

pub use error::{ParseError, ParseResult};
pub use opcode::{Icon, MAX_ALARMS, NOTIFICATION_TEXT_MAX, NotificationType, Opcode};
pub use types::{
    Alarm, ClockFormat, DateTimeEcho, DisplaySettings, Gender, Units, UserProfile, Weekday,
    Weekdays,
};
pub use uuid as uuids;
