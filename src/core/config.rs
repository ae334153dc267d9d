//! Notifier configuration, read from the environment
//!
//! | Variable                    | Meaning                        |
//! |-----------------------------|--------------------------------|
//! | `RESEND_API_KEY`            | provider API key               |
//! | `PROPOSAL_RECIPIENT_EMAIL`  | who gets told about the answer |
//! | `PROPOSAL_FROM_EMAIL`       | sender, has a default          |
//! | `PROPOSAL_EMAIL_ENDPOINT`   | provider URL, has a default    |

use crate::{DEFAULT_EMAIL_ENDPOINT, DEFAULT_FROM_ADDRESS};

pub const ENV_API_KEY: &str = "RESEND_API_KEY";
pub const ENV_RECIPIENT: &str = "PROPOSAL_RECIPIENT_EMAIL";
pub const ENV_FROM: &str = "PROPOSAL_FROM_EMAIL";
pub const ENV_ENDPOINT: &str = "PROPOSAL_EMAIL_ENDPOINT";

/// Settings for the email sink. Missing key or recipient leaves it a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifierConfig {
    pub api_key: Option<String>,
    pub recipient: Option<String>,
    pub from: String,
    pub endpoint: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            recipient: None,
            from: DEFAULT_FROM_ADDRESS.to_string(),
            endpoint: DEFAULT_EMAIL_ENDPOINT.to_string(),
        }
    }
}

impl NotifierConfig {
    /// Load from process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            api_key: get(ENV_API_KEY),
            recipient: get(ENV_RECIPIENT),
            from: get(ENV_FROM).unwrap_or(defaults.from),
            endpoint: get(ENV_ENDPOINT).unwrap_or(defaults.endpoint),
        }
    }

    /// Both key and recipient present?
    pub fn is_complete(&self) -> bool {
        self.api_key.is_some() && self.recipient.is_some()
    }
}
