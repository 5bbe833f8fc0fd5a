use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const SPACE_LABEL: &str = "SPACE";

const ENGLISH_ROWS: &[&[&str]] = &[
    &["1", "2", "3", "4", "5", "6", "7", "8", "9", "0", "-", "="],
    &["Q", "W", "E", "R", "T", "Y", "U", "I", "O", "P", "[", "]"],
    &["A", "S", "D", "F", "G", "H", "J", "K", "L", ";", "'", "\\"],
    &["Z", "X", "C", "V", "B", "N", "M", ",", ".", "/"],
];

const NORWEGIAN_ROWS: &[&[&str]] = &[
    &["1", "2", "3", "4", "5", "6", "7", "8", "9", "0", "+", "\\"],
    &["Q", "W", "E", "R", "T", "Y", "U", "I", "O", "P", "Å", "¨"],
    &["A", "S", "D", "F", "G", "H", "J", "K", "L", "Ø", "Æ", "'"],
    &["<", "Z", "X", "C", "V", "B", "N", "M", ",", ".", "-"],
];

/// Physical keyboard an exercise is meant to be typed on
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
pub enum KeyboardLayout {
    #[default]
    English,
    Norwegian,
}

impl KeyboardLayout {
    /// Keycap rows from the number row down; the space bar is not included.
    pub fn rows(&self) -> &'static [&'static [&'static str]] {
        match self {
            KeyboardLayout::English => ENGLISH_ROWS,
            KeyboardLayout::Norwegian => NORWEGIAN_ROWS,
        }
    }

    /// Keycap label that produces `c`, if this layout has one
    pub fn key_for(&self, c: char) -> Option<&'static str> {
        if c == ' ' {
            return Some(SPACE_LABEL);
        }

        let label: String = c.to_uppercase().collect();
        self.rows()
            .iter()
            .flat_map(|row| row.iter())
            .find(|key| **key == label)
            .copied()
    }

    /// Lenient name lookup; anything unrecognised falls back to English.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl FromStr for KeyboardLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "english" | "en" | "us" => Ok(KeyboardLayout::English),
            "norwegian" | "norsk" | "no" | "nb" => Ok(KeyboardLayout::Norwegian),
            other => Err(format!("unknown keyboard layout: {other}")),
        }
    }
}
