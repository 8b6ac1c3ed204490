//! Ordered command transactions.
//!
//! A [`Transaction`] is what the adapter hands to a
//! [`CommandChannel`](crate::traits::CommandChannel) in one go: an
//! append-only list of [`Step`]s that the channel executes in order. Steps
//! are built up front with a [`TransactionBuilder`], so a request that fails
//! validation never produces a partial transaction.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Lifecycle marker emitted inside a transaction.
///
/// The host owns the device lifecycle; the adapter only brackets the
/// initialization transaction with these two markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceState {
    /// Initialization has started.
    Initializing,
    /// Initialization has finished.
    Initialized,
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceState::Initializing => write!(f, "initializing"),
            DeviceState::Initialized => write!(f, "initialized"),
        }
    }
}

/// One unit of work inside a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Report a lifecycle transition to the host.
    SetState(DeviceState),
    /// Subscribe to the notify characteristic.
    EnableNotifications,
    /// Write a command buffer to the control characteristic.
    Write(Bytes),
    /// Read the standard battery level characteristic.
    ReadBatteryLevel,
}

/// An ordered batch of steps submitted as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    name: String,
    steps: Vec<Step>,
}

impl Transaction {
    /// Start building a transaction. The name is used for logging only.
    pub fn builder(name: impl Into<String>) -> TransactionBuilder {
        TransactionBuilder::new(name)
    }

    /// Name of the logical operation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All steps, in execution order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Command buffers written by this transaction, in order.
    pub fn writes(&self) -> impl Iterator<Item = &Bytes> {
        self.steps.iter().filter_map(|step| match step {
            Step::Write(buf) => Some(buf),
            _ => None,
        })
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the transaction has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Consume the transaction, yielding its steps.
    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }
}

/// Builder that appends steps in call order.
///
/// # Example
///
/// ```
/// use tlw64_core::transaction::{Step, Transaction};
/// use tlw64_core::commands::encode_factory_reset;
///
/// let tx = Transaction::builder("factoryReset")
///     .write(encode_factory_reset())
///     .build();
/// assert_eq!(tx.steps(), &[Step::Write(encode_factory_reset())]);
/// ```
#[derive(Debug, Clone)]
#[must_use = "a transaction does nothing until it is built and submitted"]
pub struct TransactionBuilder {
    name: String,
    steps: Vec<Step>,
}

impl TransactionBuilder {
    /// Create an empty builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Append a lifecycle marker.
    pub fn set_state(mut self, state: DeviceState) -> Self {
        self.steps.push(Step::SetState(state));
        self
    }

    /// Append a notify subscription.
    pub fn enable_notifications(mut self) -> Self {
        self.steps.push(Step::EnableNotifications);
        self
    }

    /// Append a control write.
    pub fn write(mut self, buf: impl Into<Bytes>) -> Self {
        self.steps.push(Step::Write(buf.into()));
        self
    }

    /// Append several control writes.
    pub fn write_all<I>(mut self, bufs: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Bytes>,
    {
        self.steps
            .extend(bufs.into_iter().map(|buf| Step::Write(buf.into())));
        self
    }

    /// Append a battery level read.
    pub fn read_battery_level(mut self) -> Self {
        self.steps.push(Step::ReadBatteryLevel);
        self
    }

    /// Finish the transaction.
    pub fn build(self) -> Transaction {
        Transaction {
            name: self.name,
            steps: self.steps,
        }
    }
}
