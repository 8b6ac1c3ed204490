//! Core types for TLW64 settings, alarms and device reports.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::opcode::{
    MAX_ALARMS, REPEAT_FRIDAY, REPEAT_MONDAY, REPEAT_SATURDAY, REPEAT_SUNDAY, REPEAT_THURSDAY,
    REPEAT_TUESDAY, REPEAT_WEDNESDAY,
};

/// Distance units shown on the band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum Units {
    /// Kilometers.
    #[default]
    Metric = 0x01,
    /// Miles.
    Imperial = 0x02,
}

/// Clock format shown on the band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum ClockFormat {
    /// 24-hour clock.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "24h"))]
    H24 = 0x01,
    /// 12-hour clock with AM/PM.
    #[cfg_attr(feature = "serde", serde(rename = "12h"))]
    H12 = 0x02,
}

/// Display preferences derived from the host's locale settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplaySettings {
    /// Distance units.
    #[cfg_attr(feature = "serde", serde(default))]
    pub units: Units,
    /// Clock format.
    #[cfg_attr(feature = "serde", serde(default))]
    pub clock_format: ClockFormat,
}

impl DisplaySettings {
    /// Create display settings from units and clock format.
    pub fn new(units: Units, clock_format: ClockFormat) -> Self {
        Self {
            units,
            clock_format,
        }
    }
}

/// Wearer gender, used by the band's stride and calorie estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Gender {
    /// Male.
    #[default]
    Male,
    /// Female.
    Female,
}

impl Gender {
    /// Wire value: 1 for male, 2 for female.
    #[must_use]
    pub fn as_byte(self) -> u8 {
        match self {
            Gender::Male => 1,
            Gender::Female => 2,
        }
    }
}

/// Stride used when the height is unknown, male.
pub const DEFAULT_STRIDE_MALE_CM: u8 = 78;

/// Stride used when the height is unknown, female.
pub const DEFAULT_STRIDE_FEMALE_CM: u8 = 70;

/// Read-only snapshot of the wearer's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UserProfile {
    /// Weight in kilograms.
    pub weight_kg: u16,
    /// Height in centimeters; 0 when unknown.
    pub height_cm: u16,
    /// Age in years.
    pub age: u8,
    /// Gender.
    pub gender: Gender,
    /// Daily step goal.
    pub step_goal: u16,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            weight_kg: 70,
            height_cm: 175,
            age: 25,
            gender: Gender::Male,
            step_goal: 8000,
        }
    }
}

impl UserProfile {
    /// Estimated stride length in centimeters.
    ///
    /// `ceil(height * 0.415)` for men and `ceil(height * 0.413)` for women,
    /// falling back to 78 / 70 cm when the height is unknown.
    ///
    /// # Examples
    ///
    /// ```
    /// use tlw64_types::{Gender, UserProfile};
    ///
    /// let profile = UserProfile { height_cm: 160, gender: Gender::Female, ..Default::default() };
    /// assert_eq!(profile.stride_length_cm(), 67);
    /// ```
    #[must_use]
    pub fn stride_length_cm(&self) -> u8 {
        let (factor, fallback) = match self.gender {
            Gender::Male => (0.415, DEFAULT_STRIDE_MALE_CM),
            Gender::Female => (0.413, DEFAULT_STRIDE_FEMALE_CM),
        };
        if self.height_cm == 0 {
            return fallback;
        }
        (f64::from(self.height_cm) * factor).ceil().min(255.0) as u8
    }
}

/// A day of the week, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All days, Monday through Sunday.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Repetition bit of this day.
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Weekday::Monday => REPEAT_MONDAY,
            Weekday::Tuesday => REPEAT_TUESDAY,
            Weekday::Wednesday => REPEAT_WEDNESDAY,
            Weekday::Thursday => REPEAT_THURSDAY,
            Weekday::Friday => REPEAT_FRIDAY,
            Weekday::Saturday => REPEAT_SATURDAY,
            Weekday::Sunday => REPEAT_SUNDAY,
        }
    }
}

/// Set of weekdays an alarm repeats on.
///
/// Bit layout matches the band: Monday is bit 0, Sunday is bit 6.
/// The empty set means "ring once".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Weekdays(u8);

impl Weekdays {
    /// No repetition.
    pub const ONCE: Weekdays = Weekdays(0);
    /// Monday to Friday.
    pub const WORKDAYS: Weekdays = Weekdays(0x1F);
    /// Every day.
    pub const EVERY_DAY: Weekdays = Weekdays(0x7F);

    /// Build a set from raw bits; bit 7 is dropped.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Weekdays(bits & 0x7F)
    }

    /// Raw bits of the set.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether the set contains `day`.
    #[must_use]
    pub const fn contains(self, day: Weekday) -> bool {
        self.0 & day.bit() != 0
    }

    /// Whether the set is empty.
    #[must_use]
    pub const fn is_once(self) -> bool {
        self.0 == 0
    }

    /// The only day in the set, if it holds exactly one.
    #[must_use]
    pub fn single_day(self) -> Option<Weekday> {
        if self.0.count_ones() != 1 {
            return None;
        }
        Weekday::ALL.into_iter().find(|day| self.contains(*day))
    }
}

impl From<Weekday> for Weekdays {
    fn from(day: Weekday) -> Self {
        Weekdays(day.bit())
    }
}

impl FromIterator<Weekday> for Weekdays {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        iter.into_iter().fold(Weekdays::ONCE, |acc, day| acc | day)
    }
}

impl BitOr<Weekday> for Weekdays {
    type Output = Weekdays;

    fn bitor(self, day: Weekday) -> Weekdays {
        Weekdays(self.0 | day.bit())
    }
}

impl BitOr for Weekday {
    type Output = Weekdays;

    fn bitor(self, other: Weekday) -> Weekdays {
        Weekdays(self.bit() | other.bit())
    }
}

impl BitOr for Weekdays {
    type Output = Weekdays;

    fn bitor(self, other: Weekdays) -> Weekdays {
        Weekdays(self.0 | other.0)
    }
}

impl BitOrAssign<Weekday> for Weekdays {
    fn bitor_assign(&mut self, day: Weekday) {
        self.0 |= day.bit();
    }
}

/// An alarm as configured by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Alarm {
    /// Slot index, valid in `0..MAX_ALARMS`.
    pub position: usize,
    /// Whether the alarm rings.
    pub enabled: bool,
    /// Days the alarm repeats on.
    pub repetition: Weekdays,
    /// Hour of day, 0-23.
    pub hour: u8,
    /// Minute, 0-59.
    pub minute: u8,
}

impl Alarm {
    /// Create an enabled, non-repeating alarm.
    pub fn new(position: usize, hour: u8, minute: u8) -> Self {
        Self {
            position,
            enabled: true,
            repetition: Weekdays::ONCE,
            hour,
            minute,
        }
    }

    /// Set the enabled flag.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the repetition days.
    #[must_use]
    pub fn repeat(mut self, repetition: impl Into<Weekdays>) -> Self {
        self.repetition = repetition.into();
        self
    }

    /// Whether the position fits one of the band's slots.
    #[must_use]
    pub fn has_valid_slot(&self) -> bool {
        self.position < MAX_ALARMS
    }
}

/// Number of payload bytes in a date/time echo (after the opcode).
pub const DATETIME_PAYLOAD_BYTES: usize = 7;

/// Date and time as echoed by the band after a time sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DateTimeEcho {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTimeEcho {
    /// Parse the payload of a date/time frame (the bytes after the opcode).
    ///
    /// The year is big-endian (`b0 * 256 + b1`), followed by month, day,
    /// hour, minute and second.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InsufficientBytes`] if `payload` holds fewer than
    /// [`DATETIME_PAYLOAD_BYTES`] bytes.
    pub fn from_bytes(payload: &[u8]) -> Result<Self, ParseError> {
        use bytes::Buf;

        if payload.len() < DATETIME_PAYLOAD_BYTES {
            return Err(ParseError::InsufficientBytes {
                expected: DATETIME_PAYLOAD_BYTES,
                actual: payload.len(),
            });
        }

        let mut buf = payload;
        Ok(DateTimeEcho {
            year: buf.get_u16(),
            month: buf.get_u8(),
            day: buf.get_u8(),
            hour: buf.get_u8(),
            minute: buf.get_u8(),
            second: buf.get_u8(),
        })
    }

    /// Convert to a calendar date-time, if the fields form a valid one.
    #[must_use]
    pub fn to_datetime(&self) -> Option<time::PrimitiveDateTime> {
        let month = time::Month::try_from(self.month).ok()?;
        let date = time::Date::from_calendar_date(i32::from(self.year), month, self.day).ok()?;
        let time = time::Time::from_hms(self.hour, self.minute, self.second).ok()?;
        Some(time::PrimitiveDateTime::new(date, time))
    }
}

impl From<time::PrimitiveDateTime> for DateTimeEcho {
    fn from(dt: time::PrimitiveDateTime) -> Self {
        Self {
            year: dt.year().clamp(0, i32::from(u16::MAX)) as u16,
            month: u8::from(dt.month()),
            day: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
        }
    }
}

impl fmt::Display for DateTimeEcho {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{} {}:{}:{}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}
