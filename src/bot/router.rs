//! Conversation routing vocabulary. The reference design kept a string-keyed
//! handler table; here the action set is a closed enum and dispatch is an
//! exhaustive match in the handler, so a new action is a compile-time-checked
//! addition instead of a runtime registration.

/// Every action the conversation knows. `Default` is the fallback
/// interpretation for free text that answers no pending prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Back,
    ShowMine,
    ShowOther,
    Add,
    Delete,
    SetPassword,
    Default,
}

impl Action {
    /// Parse a wire action code (callback data or a typed command). Free text
    /// that is not a code returns `None` and is interpreted against the
    /// session's pending action instead.
    pub fn parse(code: &str) -> Option<Action> {
        match code {
            "/start" => Some(Action::Start),
            "/back" => Some(Action::Back),
            "/show_me" => Some(Action::ShowMine),
            "/show_user" => Some(Action::ShowOther),
            "/add" => Some(Action::Add),
            "/delete" => Some(Action::Delete),
            "/password" => Some(Action::SetPassword),
            _ => None,
        }
    }

    /// Wire code for logging.
    pub fn code(self) -> &'static str {
        match self {
            Action::Start => "/start",
            Action::Back => "/back",
            Action::ShowMine => "/show_me",
            Action::ShowOther => "/show_user",
            Action::Add => "/add",
            Action::Delete => "/delete",
            Action::SetPassword => "/password",
            Action::Default => "default",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Action;

    #[test]
    fn codes_round_trip() {
        for action in [
            Action::Start,
            Action::Back,
            Action::ShowMine,
            Action::ShowOther,
            Action::Add,
            Action::Delete,
            Action::SetPassword,
        ] {
            assert_eq!(Action::parse(action.code()), Some(action));
        }
    }

    #[test]
    fn free_text_is_not_an_action() {
        assert_eq!(Action::parse("Bicycle"), None);
        assert_eq!(Action::parse("/unknown"), None);
        assert_eq!(Action::parse(""), None);
        // The default marker is internal, never a wire code.
        assert_eq!(Action::parse("default"), None);
    }
}
