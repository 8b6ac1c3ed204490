//! Bluetooth UUIDs for the TLW64 band.
//!
//! The band exposes one vendor service with a write-only control
//! characteristic and a notify characteristic, next to the standard
//! Battery service.

use uuid::{Uuid, uuid};

// --- Vendor service ---

/// Vendor service carrying the command protocol.
pub const TLW64_SERVICE: Uuid = uuid!("000055ff-0000-1000-8000-00805f9b34fb");

/// Control characteristic; every outgoing command buffer is written here.
pub const CONTROL: Uuid = uuid!("000033f1-0000-1000-8000-00805f9b34fb");

/// Notify characteristic; acks and reports arrive here.
pub const NOTIFY: Uuid = uuid!("000033f2-0000-1000-8000-00805f9b34fb");

// --- Standard BLE services ---

/// Battery service.
pub const BATTERY_SERVICE: Uuid = uuid!("0000180f-0000-1000-8000-00805f9b34fb");

/// Battery level characteristic (percent, one byte).
pub const BATTERY_LEVEL: Uuid = uuid!("00002a19-0000-1000-8000-00805f9b34fb");
