//! Observable controller state, the projection every renderer consumes

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::types::{ControllerState, EscalationFeedback, ReasonCode, Response, ResponseOutcome};

/// Output structure for each controller input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerOutput {
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Current state
    pub state: ControllerState,
    /// Pending / Affirmed / DeclinedFinal
    pub outcome: ResponseOutcome,
    /// Current reveal stage
    pub stage: usize,
    /// Number of messages
    pub stage_count: usize,
    /// Text revealed at `stage`
    pub text: String,
    /// Accepted declines so far
    pub decline_count: u32,
    /// Declines at which the decline button is withdrawn
    pub decline_threshold: u32,
    /// Are affirm/decline visible?
    pub buttons_visible: bool,
    /// Is the decline button still there?
    pub decline_available: bool,
    /// Decline button appearance, present while it is shown
    pub feedback: Option<EscalationFeedback>,
    /// Notification dispatched by this input, if any
    pub notified: Option<Response>,
    /// Reason for current state
    pub reason: ReasonCode,
}

impl ControllerOutput {
    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let color = self.state.color_code();
        let reset = ControllerState::color_reset();

        format!(
            "{}{} stage={}/{} | state={} | declines={} | {}{}",
            color,
            self.state.emoji(),
            self.stage + 1,
            self.stage_count,
            self.state,
            self.decline_count,
            self.reason.code(),
            reset
        )
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "stage={}/{} | state={} | outcome={} | declines={} | reason={}",
            self.stage + 1,
            self.stage_count,
            self.state,
            self.outcome,
            self.decline_count,
            self.reason.code()
        )
    }
}
