//! Core types for the proposal card

mod state;
mod response;
mod feedback;
mod output;
mod reason;
mod error;

pub use state::{ControllerState, ResponseOutcome};
pub use response::{Input, Response, NotifyPolicy};
pub use feedback::{DodgeVector, EscalationFeedback, Tier, Theme};
pub use output::ControllerOutput;
pub use reason::ReasonCode;
pub use error::{ProposalError, ProposalResult, NotifyError};
