use std::fmt::{self, Display};

/// The `type` of a password input. Toggling visibility flips both password
/// inputs between these together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputType {
    /// Characters are masked
    #[default]
    Password,

    /// Characters are shown as typed
    Text,
}

impl InputType {
    /// The type to use when the "show passwords" checkbox is (or isn't) checked.
    pub fn for_checked(checked: bool) -> Self {
        if checked {
            Self::Text
        } else {
            Self::Password
        }
    }

    /// The value of the HTML `type` attribute
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::Text => "text",
        }
    }

    /// Render a value the way an input of this type would show it.
    pub fn mask(self, value: &str) -> String {
        match self {
            Self::Password => "*".repeat(value.chars().count()),
            Self::Text => value.to_string(),
        }
    }
}

impl Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
