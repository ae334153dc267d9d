//! Reason codes attached to every controller transition

use serde::{Deserialize, Serialize};

/// Why the controller ended up where it is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // R001: Reveal
    // =========================================================================
    /// Card opened on its first message
    R001_FIRST_STAGE,
    /// Moved to the next message
    R001_STAGE_ADVANCED,
    /// Still on the current message
    R001_STAGE_HELD,

    // =========================================================================
    // R002: Question
    // =========================================================================
    /// Question reached, buttons visible
    R002_AWAITING_RESPONSE,

    // =========================================================================
    // R003: Affirm
    // =========================================================================
    /// Affirmed, celebration shown
    R003_AFFIRMED,

    // =========================================================================
    // R004: Decline
    // =========================================================================
    /// Decline counted, feedback escalated
    R004_DECLINE_COUNTED,
    /// Threshold reached, decline button withdrawn
    R004_DECLINE_WITHDRAWN,

    // =========================================================================
    // R005: Ignored inputs
    // =========================================================================
    /// Response input before the buttons are visible
    R005_BUTTONS_HIDDEN,
    /// Input after a terminal state
    R005_ALREADY_RESOLVED,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::R001_FIRST_STAGE => "R001_FIRST_STAGE",
            Self::R001_STAGE_ADVANCED => "R001_STAGE_ADVANCED",
            Self::R001_STAGE_HELD => "R001_STAGE_HELD",
            Self::R002_AWAITING_RESPONSE => "R002_AWAITING_RESPONSE",
            Self::R003_AFFIRMED => "R003_AFFIRMED",
            Self::R004_DECLINE_COUNTED => "R004_DECLINE_COUNTED",
            Self::R004_DECLINE_WITHDRAWN => "R004_DECLINE_WITHDRAWN",
            Self::R005_BUTTONS_HIDDEN => "R005_BUTTONS_HIDDEN",
            Self::R005_ALREADY_RESOLVED => "R005_ALREADY_RESOLVED",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::R001_FIRST_STAGE => "First message revealed",
            Self::R001_STAGE_ADVANCED => "Next message revealed",
            Self::R001_STAGE_HELD => "Waiting on current message",
            Self::R002_AWAITING_RESPONSE => "Question asked",
            Self::R003_AFFIRMED => "Said yes",
            Self::R004_DECLINE_COUNTED => "Decline counted",
            Self::R004_DECLINE_WITHDRAWN => "Decline button withdrawn",
            Self::R005_BUTTONS_HIDDEN => "Buttons not shown yet",
            Self::R005_ALREADY_RESOLVED => "Already answered",
        }
    }

    /// Did this reason come from an input that changed nothing?
    pub fn is_ignored(&self) -> bool {
        matches!(
            self,
            Self::R001_STAGE_HELD | Self::R005_BUTTONS_HIDDEN | Self::R005_ALREADY_RESOLVED
        )
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
