//! Inputs accepted by the controller and the responses they notify

use serde::{Deserialize, Serialize};

/// The only externally triggerable inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Input {
    Advance,
    Affirm,
    Decline,
}

impl std::fmt::Display for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Advance => "advance",
            Self::Affirm => "affirm",
            Self::Decline => "decline",
        };
        write!(f, "{}", name)
    }
}

/// Response label carried by a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Response {
    Yes,
    No,
}

impl Response {
    /// Wire label ("yes" / "no")
    pub fn label(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }

    /// Email subject line
    pub fn subject(&self) -> String {
        format!(
            "Valentine's Proposal Response - {}",
            self.label().to_uppercase()
        )
    }

    /// Human-readable message body
    pub fn message(&self) -> &'static str {
        match self {
            Self::Yes => "She said yes, I hope you have your gifts ready!",
            Self::No => "She attempted to say no",
        }
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// When declines produce a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyPolicy {
    /// Only the decline that reaches the threshold notifies
    #[default]
    FinalDeclineOnly,
    /// Every accepted decline notifies
    EveryDecline,
}
