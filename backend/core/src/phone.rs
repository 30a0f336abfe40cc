//! Sender phone numbers as received from the telephony provider.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of trailing digits left visible by [`PhoneNumber::masked`].
const VISIBLE_DIGITS: usize = 4;

/// A sender address, usually E.164 (`+15551234567`).
///
/// The provider's value is kept verbatim (apart from surrounding whitespace)
/// so it can be matched against stored contributor phones exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Returns `None` for empty or whitespace-only input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// All digits except the last four replaced by `*`.
    ///
    /// `+15551234567` becomes `+*******4567`. Non-digit characters are kept so
    /// the shape of the number stays recognisable.
    pub fn masked(&self) -> String {
        let total_digits = self.0.chars().filter(|c| c.is_ascii_digit()).count();
        let hide = total_digits.saturating_sub(VISIBLE_DIGITS);

        let mut seen = 0;
        self.0
            .chars()
            .map(|c| {
                if c.is_ascii_digit() {
                    seen += 1;
                    if seen <= hide {
                        return '*';
                    }
                }
                c
            })
            .collect()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
