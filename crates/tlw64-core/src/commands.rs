//! Command encoders for the TLW64 control characteristic.
//!
//! Every function here is pure and returns immutable [`Bytes`] buffers with a
//! fixed, positional layout. The band addresses fields by offset only, so no
//! field may be dropped or reordered. Encoders never fail on in-range input;
//! range checks (alarm slots) belong to the caller.

use bytes::{BufMut, Bytes, BytesMut};
use encoding_rs::{EUC_JP, EncoderResult};
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;
use tracing::warn;

use tlw64_types::opcode::{NOTIFICATION_HEADER, NOTIFICATION_STOP, NOTIFICATION_TEXT_MAX};
use tlw64_types::{
    Alarm, DisplaySettings, Icon, NotificationType, Opcode, UserProfile, Weekday, Weekdays,
};

/// Length of a date/time frame.
pub const DATETIME_LEN: usize = 8;
/// Length of a user data frame.
pub const USER_DATA_LEN: usize = 17;
/// Length of a device settings frame.
pub const DEVICE_SETTINGS_LEN: usize = 7;
/// Length of an alarm frame.
pub const ALARM_LEN: usize = 9;
/// Length of a vibration frame.
pub const VIBRATION_LEN: usize = 8;

/// Screen-on time written with the user data, in seconds.
const SCREEN_TIMEOUT: u8 = 5;

/// How a host weekday set is turned into the alarm repetition byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepetitionMode {
    /// Captured vendor behavior: a single selected day also enables every
    /// following day through Sunday. "Once" and multi-day selections cannot
    /// be expressed and encode as 0.
    #[default]
    Cascade,
    /// The selected days are written bit for bit.
    Exact,
}

/// Compute the repetition byte of an alarm frame.
///
/// # Examples
///
/// ```
/// use tlw64_core::commands::{RepetitionMode, repetition_mask};
/// use tlw64_types::{Weekday, Weekdays};
///
/// // Friday cascades into Saturday and Sunday.
/// assert_eq!(repetition_mask(Weekday::Friday.into(), RepetitionMode::Cascade), 0x70);
/// assert_eq!(repetition_mask(Weekday::Friday.into(), RepetitionMode::Exact), 0x10);
/// assert_eq!(repetition_mask(Weekdays::ONCE, RepetitionMode::Cascade), 0x00);
/// ```
pub fn repetition_mask(days: Weekdays, mode: RepetitionMode) -> u8 {
    match mode {
        RepetitionMode::Exact => days.bits(),
        RepetitionMode::Cascade => match days.single_day() {
            Some(first) => Weekday::ALL
                .into_iter()
                .filter(|day| *day >= first)
                .fold(0, |mask, day| mask | day.bit()),
            None => {
                warn!(
                    "Alarm repetition 0x{:02X} cannot be expressed, sending no repetition",
                    days.bits()
                );
                0
            }
        },
    }
}

/// Encode the current date and time.
///
/// Format: `[0xA3, year_hi, year_lo, month, day, hour, minute, second]`
pub fn encode_datetime(now: PrimitiveDateTime) -> Bytes {
    let year = now.year().clamp(0, i32::from(u16::MAX)) as u16;

    let mut buf = BytesMut::with_capacity(DATETIME_LEN);
    buf.put_u8(Opcode::DateTime.as_byte());
    buf.put_u16(year);
    buf.put_u8(u8::from(now.month()));
    buf.put_u8(now.day());
    buf.put_u8(now.hour());
    buf.put_u8(now.minute());
    buf.put_u8(now.second());
    buf.freeze()
}

/// Encode distance units and clock format.
///
/// Format: `[0xA0, units, clock]`
pub fn encode_display_settings(settings: &DisplaySettings) -> Bytes {
    Bytes::copy_from_slice(&[
        Opcode::DisplaySettings.as_byte(),
        settings.units as u8,
        settings.clock_format as u8,
    ])
}

/// Encode the wearer's profile.
pub fn encode_user_data(profile: &UserProfile) -> Bytes {
    let mut buf = BytesMut::with_capacity(USER_DATA_LEN);
    buf.put_u8(Opcode::UserData.as_byte());
    buf.put_u8(0); // unknown
    buf.put_u8(profile.stride_length_cm());
    buf.put_u8(0); // unknown
    buf.put_u8(profile.weight_kg.min(u16::from(u8::MAX)) as u8);
    buf.put_u8(SCREEN_TIMEOUT);
    buf.put_u8(0); // unknown
    buf.put_u8(0); // unknown
    buf.put_u16(profile.step_goal);
    buf.put_u8(1); // raise hand to wake
    buf.put_u8(0xFF); // unknown
    buf.put_u8(0); // unknown
    buf.put_u8(profile.age);
    buf.put_u8(profile.gender.as_byte());
    buf.put_u8(0); // "lost" function, off
    buf.put_u8(2); // unknown
    buf.freeze()
}

/// Encode the device behavior settings.
///
/// Everything after the opcode was captured from the vendor app; only the
/// first argument (inactivity reminder, off) is understood.
pub fn encode_device_settings() -> Bytes {
    Bytes::copy_from_slice(&[
        Opcode::DeviceSettings.as_byte(),
        0x00,
        0x3C,
        0x02,
        0x03,
        0x01,
        0x00,
    ])
}

/// Encode one alarm slot.
///
/// Format: `[0xAB, repetition, hour, minute, vib_duration, vib_count, ?, 0, slot]`
/// where `slot` is `position + 1`. The caller must have checked
/// [`Alarm::has_valid_slot`].
pub fn encode_alarm(alarm: &Alarm, repetition: u8) -> Bytes {
    let on = |value: u8| if alarm.enabled { value } else { 0 };
    Bytes::copy_from_slice(&[
        Opcode::Alarm.as_byte(),
        repetition,
        alarm.hour,
        alarm.minute,
        on(2),
        on(10),
        on(2),
        0,
        (alarm.position + 1) as u8,
    ])
}

/// Encode a one-shot vibration.
///
/// The band has no vibrate command; a vibration is an alarm frame with no
/// day, time or slot.
pub fn encode_vibration(duration: u8, count: u8) -> Bytes {
    Bytes::copy_from_slice(&[
        Opcode::Alarm.as_byte(),
        0,
        0,
        0,
        duration,
        count,
        7, // sniffed from the vendor app
        1,
    ])
}

/// Encode an icon frame.
pub fn encode_icon(icon: Icon) -> Bytes {
    Bytes::copy_from_slice(&[Opcode::Icon.as_byte(), icon as u8])
}

/// Encode a notification as its text frame followed by its type frame.
///
/// The text is converted to EUC-JP and cut at
/// [`NOTIFICATION_TEXT_MAX`] bytes, which may split a multi-byte glyph.
/// Shorter text is not padded.
pub fn encode_notification_text(kind: NotificationType, text: &str) -> [Bytes; 2] {
    let encoded = encode_euc_jp(text);
    let length = encoded.len().min(NOTIFICATION_TEXT_MAX);

    let mut frame = BytesMut::with_capacity(length + 2);
    frame.put_u8(Opcode::Notification.as_byte());
    frame.put_u8(NOTIFICATION_HEADER);
    frame.put_slice(&encoded[..length]);

    [
        frame.freeze(),
        Bytes::copy_from_slice(&[Opcode::Notification.as_byte(), kind as u8]),
    ]
}

/// Encode the frame that clears the notification on screen.
pub fn encode_notification_stop() -> Bytes {
    Bytes::copy_from_slice(&[Opcode::Notification.as_byte(), NOTIFICATION_STOP])
}

/// Encode a factory reset.
pub fn encode_factory_reset() -> Bytes {
    Bytes::copy_from_slice(&[Opcode::FactoryReset.as_byte()])
}

/// Encode a firmware version request.
pub fn encode_firmware_request() -> Bytes {
    Bytes::copy_from_slice(&[Opcode::FirmwareVersion.as_byte()])
}

/// Convert text to EUC-JP, replacing unmappable characters with `?`.
fn encode_euc_jp(text: &str) -> Vec<u8> {
    let mut encoder = EUC_JP.new_encoder();
    let mut out = Vec::new();
    let mut src = text;
    loop {
        let needed = encoder
            .max_buffer_length_from_utf8_without_replacement(src.len())
            .unwrap_or(src.len() * 3 + 16);
        out.reserve(needed);
        let (result, read) = encoder.encode_from_utf8_to_vec_without_replacement(src, &mut out, true);
        src = &src[read..];
        match result {
            EncoderResult::InputEmpty => break,
            EncoderResult::OutputFull => {}
            EncoderResult::Unmappable(_) => out.push(b'?'),
        }
    }
    out
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Alarm frames are always nine bytes and end with the one-based slot.
        #[test]
        fn alarm_frame_layout(
            position in 0usize..3,
            enabled: bool,
            bits in 0u8..0x80,
            hour in 0u8..24,
            minute in 0u8..60,
            exact: bool,
        ) {
            let alarm = Alarm {
                position,
                enabled,
                repetition: Weekdays::from_bits(bits),
                hour,
                minute,
            };
            let mode = if exact { RepetitionMode::Exact } else { RepetitionMode::Cascade };
            let buf = encode_alarm(&alarm, repetition_mask(alarm.repetition, mode));
            prop_assert_eq!(buf.len(), ALARM_LEN);
            prop_assert_eq!(buf[0], 0xAB);
            prop_assert_eq!(buf[2], hour);
            prop_assert_eq!(buf[3], minute);
            prop_assert_eq!(buf[8] as usize, position + 1);
        }

        /// Notification text never exceeds the cap and is never padded.
        #[test]
        fn notification_text_capped(text in "\\PC{0,40}") {
            let [frame, kind] = encode_notification_text(NotificationType::Sms, &text);
            let payload = frame.len() - 2;
            prop_assert!(payload <= NOTIFICATION_TEXT_MAX);
            prop_assert_eq!(payload, encode_euc_jp(&text).len().min(NOTIFICATION_TEXT_MAX));
            prop_assert_eq!(kind.len(), 2);
        }

        /// The cascade mask of a single day covers that day and everything after it.
        #[test]
        fn cascade_covers_following_days(index in 0usize..7) {
            let first = Weekday::ALL[index];
            let mask = repetition_mask(first.into(), RepetitionMode::Cascade);
            for (i, day) in Weekday::ALL.into_iter().enumerate() {
                prop_assert_eq!(mask & day.bit() != 0, i >= index);
            }
        }
    }
}
