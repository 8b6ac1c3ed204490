//! Read-only settings snapshot.
//!
//! The host owns the wearer's preferences and profile; the adapter takes a
//! copy of them and writes them to the band during initialization.

use serde::{Deserialize, Serialize};

use tlw64_types::{DisplaySettings, UserProfile};

/// Everything the band is told about its wearer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    /// Units and clock format.
    #[serde(default)]
    pub display: DisplaySettings,
    /// Weight, height, age, gender and step goal.
    #[serde(default)]
    pub profile: UserProfile,
}

impl SettingsSnapshot {
    /// Create a snapshot.
    pub fn new(display: DisplaySettings, profile: UserProfile) -> Self {
        Self { display, profile }
    }
}
