//! Transport contract: the inbound event the core consumes and the structured
//! reply it produces. The chat-transport collaborator owns both ends: it maps
//! raw platform updates into [`InboundEvent`] and renders [`Reply`] into a
//! concrete message with the button layout named by [`ScreenLevel`].

/// One inbound chat event: a free-text message or a button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Chat identity, externally assigned and immutable.
    pub chat_id: i64,
    /// Display name as currently reported by the transport.
    pub display_name: String,
    /// True for button callbacks; the payload is then an action code.
    pub is_callback: bool,
    /// Raw message text or callback data.
    pub payload: String,
}

impl InboundEvent {
    pub fn message(chat_id: i64, display_name: &str, text: &str) -> Self {
        Self {
            chat_id,
            display_name: display_name.to_string(),
            is_callback: false,
            payload: text.to_string(),
        }
    }

    pub fn callback(chat_id: i64, display_name: &str, data: &str) -> Self {
        Self {
            chat_id,
            display_name: display_name.to_string(),
            is_callback: true,
            payload: data.to_string(),
        }
    }
}

/// Which reply-button layout should accompany a reply. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenLevel {
    /// No buttons at all (validation and infrastructure replies).
    Empty,
    /// Greeting screen: "my wishlist" / "find user".
    Start,
    /// Own list turned out empty.
    EmptyList,
    /// Own list with edit controls.
    Me,
    /// Someone else's list, read-only.
    OtherUser,
    /// Awaiting a free-text answer; cancel button only.
    Edit,
    /// Confirmation screen with an OK button.
    Service,
    /// Extended confirmation screen.
    ServiceExtended,
}

/// Structured reply descriptor handed back to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub chat_id: i64,
    pub text: String,
    pub level: ScreenLevel,
}

impl Reply {
    pub fn new(chat_id: i64, text: impl Into<String>, level: ScreenLevel) -> Self {
        Self {
            chat_id,
            text: text.into(),
            level,
        }
    }
}
