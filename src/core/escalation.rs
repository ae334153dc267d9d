//! Decline escalation: decline count → button label, color and dodge
//!
//! Pure lookup. Counts at or past `threshold - 1` clamp to the last tier;
//! the table never wraps around.

use crate::DECLINE_THRESHOLD;
use crate::types::{EscalationFeedback, ProposalError, ProposalResult, Theme, Tier};

/// Escalation table for one theme and threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclineEscalation {
    theme: Theme,
    threshold: u32,
}

impl Default for DeclineEscalation {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            threshold: DECLINE_THRESHOLD,
        }
    }
}

impl DeclineEscalation {
    /// Create a table; `threshold` must be at least 1
    pub fn new(theme: Theme, threshold: u32) -> ProposalResult<Self> {
        if threshold == 0 {
            return Err(ProposalError::InvalidThreshold(threshold));
        }
        Ok(Self { theme, threshold })
    }

    /// Feedback shown after `count` declines
    pub fn feedback_for(&self, count: u32) -> EscalationFeedback {
        let tier = self.tier_for(count);
        EscalationFeedback {
            label: tier.label.to_string(),
            color_token: tier.color_token.to_string(),
            dodge: tier.dodge,
        }
    }

    fn tier_for(&self, count: u32) -> Tier {
        let tiers = self.theme.tiers();
        let last_tier = (self.threshold - 1) as usize;
        let index = (count as usize).min(last_tier).min(tiers.len() - 1);
        tiers[index]
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}
