//! Error types for tlw64-core.
//!
//! Errors fall into three groups:
//!
//! | Group | Variants | Handling |
//! |-------|----------|----------|
//! | Validation | [`Error::InvalidAlarmSlot`] | Request abandoned before any buffer is built |
//! | Channel | [`Error::Channel`], [`Error::Bluetooth`], [`Error::NotConnected`], [`Error::Timeout`], [`Error::CharacteristicNotFound`] | Reported, never retried |
//! | Setup | [`Error::InvalidConfig`], [`Error::Io`] | Fix configuration, then retry |
//!
//! Malformed or unknown inbound buffers are not errors at all: the dispatcher
//! turns them into [`crate::InboundEvent::Unhandled`] and the adapter logs them.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when talking to a TLW64 band.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An alarm addressed a slot the band does not have.
    #[error("Alarm position {position} out of range (band has {max} slots)")]
    InvalidAlarmSlot {
        /// The requested position.
        position: usize,
        /// Number of slots on the band.
        max: usize,
    },

    /// The command channel rejected a transaction.
    #[error("Channel error: {0}")]
    Channel(String),

    /// Bluetooth Low Energy error.
    #[error("Bluetooth error: {0}")]
    Bluetooth(#[from] btleplug::Error),

    /// Operation attempted while not connected to the band.
    #[error("Not connected to device")]
    NotConnected,

    /// Required BLE characteristic not found on the band.
    #[error("Characteristic not found: {uuid} (searched in {service_count} services)")]
    CharacteristicNotFound {
        /// The UUID that was not found.
        uuid: String,
        /// Number of services that were searched.
        service_count: usize,
    },

    /// Operation timed out.
    #[error("Operation '{operation}' timed out after {duration:?}")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The timeout duration.
        duration: Duration,
    },

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create a channel error.
    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel(message.into())
    }

    /// Create a timeout error with operation context.
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a characteristic not found error.
    pub fn characteristic_not_found(uuid: impl Into<String>, service_count: usize) -> Self {
        Self::CharacteristicNotFound {
            uuid: uuid.into(),
            service_count,
        }
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Whether the request was rejected before anything was sent.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidAlarmSlot { .. })
    }

    /// Whether the failure happened while handing buffers to the band.
    pub fn is_channel(&self) -> bool {
        matches!(
            self,
            Self::Channel(_)
                | Self::Bluetooth(_)
                | Self::NotConnected
                | Self::Timeout { .. }
                | Self::CharacteristicNotFound { .. }
        )
    }
}

/// Result type alias using tlw64-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidAlarmSlot {
            position: 3,
            max: 3,
        };
        assert_eq!(
            err.to_string(),
            "Alarm position 3 out of range (band has 3 slots)"
        );

        let err = Error::channel("queue closed");
        assert_eq!(err.to_string(), "Channel error: queue closed");

        let err = Error::NotConnected;
        assert_eq!(err.to_string(), "Not connected to device");

        let err = Error::characteristic_not_found("000033f1", 4);
        assert!(err.to_string().contains("000033f1"));
        assert!(err.to_string().contains("4 services"));

        let err = Error::timeout("write control", Duration::from_secs(10));
        assert!(err.to_string().contains("write control"));
        assert!(err.to_string().contains("10s"));
    }

    #[test]
    fn test_classification() {
        assert!(
            Error::InvalidAlarmSlot {
                position: 5,
                max: 3
            }
            .is_validation()
        );
        assert!(!Error::NotConnected.is_validation());
        assert!(Error::NotConnected.is_channel());
        assert!(Error::channel("x").is_channel());
        assert!(!Error::invalid_config("x").is_channel());
    }

    #[test]
    fn test_btleplug_error_conversion() {
        fn _assert_from_impl<T: From<btleplug::Error>>() {}
        _assert_from_impl::<Error>();
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }
}
