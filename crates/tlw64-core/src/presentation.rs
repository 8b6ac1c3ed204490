//! Notification presentation state machine.
//!
//! The band can show one thing at a time: a text screen (SMS or call) or an
//! icon. [`Presenter`] decides, for each host notification or call event,
//! which [`PresentationAction`]s to emit and tracks what is on screen. Showing
//! something new simply overwrites the old screen; only calls are cleared
//! explicitly.

use serde::{Deserialize, Serialize};
use tracing::debug;

use tlw64_types::{Icon, NotificationType};

/// Vibration used for messages.
pub const MESSAGE_VIBRATION: Vibration = Vibration::new(1, 1);
/// Vibration used for incoming calls.
pub const CALL_VIBRATION: Vibration = Vibration::new(3, 5);
/// Vibration used for "find my band".
pub const FIND_VIBRATION: Vibration = Vibration::new(1, 3);
/// Stops any ongoing vibration.
pub const NO_VIBRATION: Vibration = Vibration::new(0, 0);

/// Class of an incoming app notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// SMS and other generic text messages.
    Sms,
    /// Chat applications (WeChat, QQ, messengers).
    Chat,
    /// E-mail.
    Email,
    /// Anything else.
    Other,
}

/// An app notification as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSpec {
    /// Host-side notification id.
    pub id: i32,
    /// Notification class.
    pub kind: NotificationKind,
    /// Sender shown on SMS screens.
    pub sender: Option<String>,
    /// Title, unused by the band.
    pub title: Option<String>,
    /// Body, unused by the band.
    pub body: Option<String>,
}

impl NotificationSpec {
    /// Create a notification with no text fields.
    pub fn new(id: i32, kind: NotificationKind) -> Self {
        Self {
            id,
            kind,
            sender: None,
            title: None,
            body: None,
        }
    }

    /// Set the sender.
    #[must_use]
    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }
}

/// Call state change reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallCommand {
    /// The phone is ringing.
    Incoming,
    /// An outgoing call was placed.
    Outgoing,
    /// The call was picked up.
    Accept,
    /// The call started.
    Start,
    /// The call was rejected.
    Reject,
    /// The call was ignored.
    Ignore,
    /// The call ended.
    End,
}

/// A call event as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSpec {
    /// What happened.
    pub command: CallCommand,
    /// Contact name, if known.
    pub name: Option<String>,
    /// Phone number, if known.
    pub number: Option<String>,
}

impl CallSpec {
    /// Create a call event without caller details.
    pub fn new(command: CallCommand) -> Self {
        Self {
            command,
            name: None,
            number: None,
        }
    }

    /// Set the contact name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the phone number.
    #[must_use]
    pub fn number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }

    /// Text shown on the call screen: the name, else the number.
    pub fn display_text(&self) -> &str {
        self.name
            .as_deref()
            .or(self.number.as_deref())
            .unwrap_or_default()
    }
}

/// A vibration pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vibration {
    /// Length of each buzz, in device units.
    pub duration: u8,
    /// Number of buzzes.
    pub count: u8,
}

impl Vibration {
    /// Create a vibration pattern.
    pub const fn new(duration: u8, count: u8) -> Self {
        Self { duration, count }
    }
}

/// What is currently on the band's screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shown {
    /// SMS text screen.
    Sms,
    /// An icon.
    Icon(Icon),
    /// Incoming call screen.
    Call,
}

/// Presentation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationState {
    /// Nothing on screen.
    #[default]
    Idle,
    /// Something is on screen.
    Showing(Shown),
}

/// A command the adapter should send to the band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentationAction {
    /// Show a text screen.
    ShowText {
        kind: NotificationType,
        text: String,
    },
    /// Show an icon.
    ShowIcon(Icon),
    /// Clear the screen.
    Stop,
    /// Vibrate.
    Vibrate(Vibration),
}

/// Decides what to show for notification and call events.
#[derive(Debug, Clone, Default)]
pub struct Presenter {
    state: PresentationState,
}

impl Presenter {
    /// Create an idle presenter.
    pub fn new() -> Self {
        Self::default()
    }

    /// What is on screen.
    pub fn state(&self) -> PresentationState {
        self.state
    }

    /// Handle an incoming app notification.
    pub fn on_notification(&mut self, notification: &NotificationSpec) -> Vec<PresentationAction> {
        let (shown, show) = match notification.kind {
            NotificationKind::Sms => (
                Shown::Sms,
                PresentationAction::ShowText {
                    kind: NotificationType::Sms,
                    text: notification.sender.clone().unwrap_or_default(),
                },
            ),
            NotificationKind::Chat => (
                Shown::Icon(Icon::WeChat),
                PresentationAction::ShowIcon(Icon::WeChat),
            ),
            NotificationKind::Email | NotificationKind::Other => (
                Shown::Icon(Icon::Mail),
                PresentationAction::ShowIcon(Icon::Mail),
            ),
        };
        self.transition(PresentationState::Showing(shown));
        vec![show, PresentationAction::Vibrate(MESSAGE_VIBRATION)]
    }

    /// Handle a call state change.
    pub fn on_call(&mut self, call: &CallSpec) -> Vec<PresentationAction> {
        if call.command == CallCommand::Incoming {
            self.transition(PresentationState::Showing(Shown::Call));
            vec![
                PresentationAction::ShowText {
                    kind: NotificationType::Call,
                    text: call.display_text().to_string(),
                },
                PresentationAction::Vibrate(CALL_VIBRATION),
            ]
        } else {
            self.transition(PresentationState::Idle);
            vec![
                PresentationAction::Stop,
                PresentationAction::Vibrate(NO_VIBRATION),
            ]
        }
    }

    /// Handle a "find my band" request. Does not touch the screen.
    pub fn on_find_device(&self, start: bool) -> Vec<PresentationAction> {
        if start {
            vec![PresentationAction::Vibrate(FIND_VIBRATION)]
        } else {
            Vec::new()
        }
    }

    /// Handle deletion of a notification. The band cannot dismiss by id.
    pub fn on_delete_notification(&self, id: i32) -> Vec<PresentationAction> {
        debug!("Ignoring deletion of notification {}", id);
        Vec::new()
    }

    fn transition(&mut self, next: PresentationState) {
        debug!("Presentation {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
