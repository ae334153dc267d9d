//! Escalation feedback and card themes

use serde::{Deserialize, Serialize};
use crate::types::ProposalError;

/// Offset the decline button jumps to, in pixels and degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DodgeVector {
    pub x: i32,
    pub y: i32,
    pub rotation: i32,
}

impl DodgeVector {
    pub const fn new(x: i32, y: i32, rotation: i32) -> Self {
        Self { x, y, rotation }
    }
}

/// What the decline button looks like after `count` declines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationFeedback {
    /// Button text
    pub label: String,
    /// Border/text color token
    pub color_token: String,
    /// Deterministic dodge offset
    pub dodge: DodgeVector,
}

/// One row of an escalation table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tier {
    pub label: &'static str,
    pub color_token: &'static str,
    pub dodge: DodgeVector,
}

/// Visual variant of the card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Purple night theme with a staged reveal
    #[default]
    Lavender,
    /// Autumn leaves theme
    Autumn,
}

const LAVENDER_TIERS: [Tier; 3] = [
    Tier { label: "Not sure yet", color_token: "#a78bfa", dodge: DodgeVector::new(0, 0, 0) },
    Tier { label: "I need time", color_token: "#9370db", dodge: DodgeVector::new(-48, 16, -8) },
    Tier { label: "Still thinking...", color_token: "#7c5cd4", dodge: DodgeVector::new(64, -24, 12) },
];

const AUTUMN_TIERS: [Tier; 3] = [
    Tier { label: "Not yet", color_token: "#8b2e2e", dodge: DodgeVector::new(0, 0, 0) },
    Tier { label: "Think again 🥺?", color_token: "#6b1f23", dodge: DodgeVector::new(56, 12, 10) },
    Tier { label: "Babe nauuuuu 😭", color_token: "#4a1419", dodge: DodgeVector::new(-72, -20, -15) },
];

const LAVENDER_MESSAGES: [&str; 4] = [
    "Hey you, we've made some cute memories together and I'm looking forward to making a lot more",
    "I really don't need a special day to love you, but Valentine seems like the perfect excuse to show you how much you mean to me",
    "So...",
    "Will you be my valentine? (I promise to buy you chocolate)",
];

const AUTUMN_MESSAGES: [&str; 1] = ["Will you be my valentine? 🍂"];

impl Theme {
    /// Escalation rows, mildest first
    pub fn tiers(&self) -> &'static [Tier] {
        match self {
            Self::Lavender => &LAVENDER_TIERS,
            Self::Autumn => &AUTUMN_TIERS,
        }
    }

    /// Messages shown when the caller supplies none
    pub fn default_messages(&self) -> Vec<String> {
        let messages: &[&str] = match self {
            Self::Lavender => &LAVENDER_MESSAGES,
            Self::Autumn => &AUTUMN_MESSAGES,
        };
        messages.iter().map(|m| m.to_string()).collect()
    }
}

impl std::str::FromStr for Theme {
    type Err = ProposalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lavender" => Ok(Self::Lavender),
            "autumn" => Ok(Self::Autumn),
            other => Err(ProposalError::UnknownTheme(other.to_string())),
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lavender => write!(f, "lavender"),
            Self::Autumn => write!(f, "autumn"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_parse_is_case_insensitive() {
        assert_eq!("Autumn".parse::<Theme>().unwrap(), Theme::Autumn);
        assert_eq!(" lavender ".parse::<Theme>().unwrap(), Theme::Lavender);
    }

    #[test]
    fn test_unknown_theme_rejected() {
        let err = "winter".parse::<Theme>().unwrap_err();
        assert!(matches!(err, ProposalError::UnknownTheme(ref t) if t == "winter"));
    }

    #[test]
    fn test_first_tier_does_not_move() {
        for theme in [Theme::Lavender, Theme::Autumn] {
            assert_eq!(theme.tiers()[0].dodge, DodgeVector::default());
        }
    }
}
