//! Key bindings for the status demo.

/// What a key press asks the runtime to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Toast,
    Fetch,
    Pull,
    Fail,
    Dismiss,
    Quit,
}

/// Definition of a key binding.
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub key: char,
    /// Short label shown on the options line.
    pub label: &'static str,
    pub action: Action,
}

impl KeyBinding {
    /// Returns the options-line hint, e.g., "t: toast".
    pub fn hint(&self) -> String {
        format!("{}: {}", self.key, self.label)
    }
}

/// Available bindings, in options-line order.
pub const BINDINGS: &[KeyBinding] = &[
    KeyBinding {
        key: 't',
        label: "toast",
        action: Action::Toast,
    },
    KeyBinding {
        key: 'f',
        label: "fetch",
        action: Action::Fetch,
    },
    KeyBinding {
        key: 'p',
        label: "pull (blocking)",
        action: Action::Pull,
    },
    KeyBinding {
        key: 'e',
        label: "failing push",
        action: Action::Fail,
    },
    KeyBinding {
        key: 'q',
        label: "quit",
        action: Action::Quit,
    },
];

impl Action {
    /// Looks up the action bound to a character key (case-insensitive).
    pub fn for_key(key: char) -> Option<Action> {
        let key = key.to_ascii_lowercase();
        BINDINGS.iter().find(|b| b.key == key).map(|b| b.action)
    }
}

/// Joined hints for the options region.
pub fn options_line() -> String {
    BINDINGS
        .iter()
        .map(KeyBinding::hint)
        .collect::<Vec<_>>()
        .join(" | ")
}
