use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A key on the dialer keypad. Only digits can ever match the secret number.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DialerKey {
    Digit(u8),
    Star,
    Hash,
}

impl DialerKey {
    pub fn digit(&self) -> Option<u8> {
        match self {
            DialerKey::Digit(d) => Some(*d),
            DialerKey::Star | DialerKey::Hash => None,
        }
    }
}

impl TryFrom<char> for DialerKey {
    type Error = char;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            '*' => Ok(DialerKey::Star),
            '#' => Ok(DialerKey::Hash),
            // to_digit(10) yields 0..=9, which always fits
            _ => c
                .to_digit(10)
                .map(|d| DialerKey::Digit(d as u8))
                .ok_or(c),
        }
    }
}

impl Display for DialerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DialerKey::Digit(d) => write!(f, "{}", d),
            DialerKey::Star => f.write_str("*"),
            DialerKey::Hash => f.write_str("#"),
        }
    }
}
