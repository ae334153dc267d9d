//! Controller state definitions

use serde::{Deserialize, Serialize};

/// Where the card currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControllerState {
    /// Revealing message `stage`, buttons hidden
    Staging { stage: usize },
    /// Question shown, affirm/decline buttons visible
    AwaitingResponse,
    /// Affirmed - absorbing
    Affirmed,
    /// Decline threshold reached - absorbing
    DeclinedFinal,
}

impl ControllerState {
    /// Affirmed or DeclinedFinal
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Affirmed | Self::DeclinedFinal)
    }

    /// Buttons are only rendered while awaiting a response
    pub fn buttons_visible(&self) -> bool {
        matches!(self, Self::AwaitingResponse)
    }

    /// The outcome this state implies
    pub fn outcome(&self) -> ResponseOutcome {
        match self {
            Self::Affirmed => ResponseOutcome::Affirmed,
            Self::DeclinedFinal => ResponseOutcome::DeclinedFinal,
            _ => ResponseOutcome::Pending,
        }
    }

    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            Self::Staging { .. } => "\x1b[90m",     // Gray
            Self::AwaitingResponse => "\x1b[35m",   // Magenta
            Self::Affirmed => "\x1b[32m",           // Green
            Self::DeclinedFinal => "\x1b[31m",      // Red
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }

    /// Get emoji for state
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Staging { .. } => "✉️",
            Self::AwaitingResponse => "💜",
            Self::Affirmed => "🎉",
            Self::DeclinedFinal => "💔",
        }
    }
}

impl std::fmt::Display for ControllerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Staging { stage } => write!(f, "STAGING({})", stage),
            Self::AwaitingResponse => write!(f, "AWAITING_RESPONSE"),
            Self::Affirmed => write!(f, "AFFIRMED"),
            Self::DeclinedFinal => write!(f, "DECLINED_FINAL"),
        }
    }
}

/// Final answer of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseOutcome {
    Pending,
    Affirmed,
    DeclinedFinal,
}

impl std::fmt::Display for ResponseOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Pending => "PENDING",
            Self::Affirmed => "AFFIRMED",
            Self::DeclinedFinal => "DECLINED_FINAL",
        };
        write!(f, "{}", name)
    }
}
