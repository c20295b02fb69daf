//! Password policy for account creation.
//!
//! Three independent requirements drive the live checklist on the signup
//! form; submission is allowed only when all of them hold.

#[cfg(test)]
#[path = "password_test.rs"]
mod password_test;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const SPECIAL_CHARS: &str = "!@#$%^&*";

/// Which password requirements the current input satisfies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PasswordRequirements {
    pub min_length: bool,
    pub has_number: bool,
    pub has_special_char: bool,
}

impl PasswordRequirements {
    /// Evaluate `password` against the policy. Length counts characters, not bytes.
    #[must_use]
    pub fn check(password: &str) -> Self {
        Self {
            min_length: password.chars().count() >= MIN_PASSWORD_LENGTH,
            has_number: password.chars().any(|c| c.is_ascii_digit()),
            has_special_char: password.chars().any(|c| SPECIAL_CHARS.contains(c)),
        }
    }

    #[must_use]
    pub fn all_met(self) -> bool {
        self.min_length && self.has_number && self.has_special_char
    }

    /// Checklist rows as `(label, satisfied)`, in display order.
    #[must_use]
    pub fn checklist(self) -> [(&'static str, bool); 3] {
        [
            ("At least 8 characters", self.min_length),
            ("Contains a number", self.has_number),
            ("Contains a special character", self.has_special_char),
        ]
    }
}
