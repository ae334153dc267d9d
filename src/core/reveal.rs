//! Staged reveal: shows an ordered list of messages one at a time
//!
//! The stage only moves forward and stops at the last message (the question).

use crate::types::{ProposalError, ProposalResult};

/// Sequencer over the card's messages
#[derive(Debug, Clone)]
pub struct StagedReveal {
    messages: Vec<String>,
    stage: usize,
}

impl StagedReveal {
    /// Create a reveal positioned on the first message
    pub fn new<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            messages: messages.into_iter().map(Into::into).collect(),
            stage: 0,
        }
    }

    /// Text shown at the current stage
    pub fn current(&self) -> ProposalResult<&str> {
        self.messages
            .get(self.stage)
            .map(String::as_str)
            .ok_or(ProposalError::OutOfRange)
    }

    /// Move to the next message; a no-op on the last one
    pub fn advance(&mut self) -> ProposalResult<&str> {
        if self.messages.is_empty() {
            return Err(ProposalError::OutOfRange);
        }
        if !self.is_final() {
            self.stage += 1;
        }
        self.current()
    }

    /// On the question stage?
    pub fn is_final(&self) -> bool {
        !self.messages.is_empty() && self.stage == self.messages.len() - 1
    }

    /// Current stage index
    pub fn stage(&self) -> usize {
        self.stage
    }

    /// Index of the question stage
    pub fn final_stage(&self) -> Option<usize> {
        self.messages.len().checked_sub(1)
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_on_first_message() {
        let reveal = StagedReveal::new(["a", "b", "c"]);
        assert_eq!(reveal.stage(), 0);
        assert_eq!(reveal.current().unwrap(), "a");
        assert!(!reveal.is_final());
    }

    #[test]
    fn test_advance_moves_forward() {
        let mut reveal = StagedReveal::new(["a", "b", "c"]);
        assert_eq!(reveal.advance().unwrap(), "b");
        assert_eq!(reveal.advance().unwrap(), "c");
        assert!(reveal.is_final());
    }

    #[test]
    fn test_advance_idempotent_at_final() {
        let mut reveal = StagedReveal::new(["a", "b"]);
        reveal.advance().unwrap();
        for _ in 0..5 {
            assert_eq!(reveal.advance().unwrap(), "b");
        }
        assert_eq!(reveal.stage(), 1);
    }

    #[test]
    fn test_empty_is_out_of_range() {
        let mut reveal = StagedReveal::new(Vec::<String>::new());
        assert_eq!(reveal.current(), Err(ProposalError::OutOfRange));
        assert_eq!(reveal.advance(), Err(ProposalError::OutOfRange));
        assert!(!reveal.is_final());
        assert_eq!(reveal.final_stage(), None);
    }

    #[test]
    fn test_single_message_is_final_immediately() {
        let reveal = StagedReveal::new(["only"]);
        assert!(reveal.is_final());
    }
}
