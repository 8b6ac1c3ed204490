//! Initialization sequencer.
//!
//! Bringing the band up is one transaction with a fixed order. Settings
//! writes must precede the battery and firmware requests; the band was
//! captured answering reliably only in this order.

use time::PrimitiveDateTime;

use crate::commands::{
    encode_datetime, encode_device_settings, encode_display_settings, encode_firmware_request,
    encode_user_data,
};
use crate::settings::SettingsSnapshot;
use crate::transaction::{DeviceState, Transaction};

/// Build the initialization transaction.
///
/// Steps, in order: `Initializing` marker, notify subscription, date/time,
/// display settings, user data, device settings, battery level read,
/// firmware version request, `Initialized` marker.
///
/// The result only depends on its inputs, so re-running initialization
/// re-sends the same buffers.
pub fn initialization(settings: &SettingsSnapshot, now: PrimitiveDateTime) -> Transaction {
    Transaction::builder("Initializing")
        .set_state(DeviceState::Initializing)
        .enable_notifications()
        .write(encode_datetime(now))
        .write(encode_display_settings(&settings.display))
        .write(encode_user_data(&settings.profile))
        .write(encode_device_settings())
        .read_battery_level()
        .write(encode_firmware_request())
        .set_state(DeviceState::Initialized)
        .build()
}
