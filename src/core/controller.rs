//! Response controller: staged reveal, then affirm/decline
//!
//! State transitions:
//! - STAGING(s) → STAGING(s+1): advance, while s+1 < final
//! - STAGING(final-1) → AWAITING_RESPONSE: advance
//! - AWAITING_RESPONSE → AFFIRMED: affirm, notifies "yes"
//! - AWAITING_RESPONSE → AWAITING_RESPONSE: decline, count += 1
//! - AWAITING_RESPONSE → DECLINED_FINAL: decline reaching the threshold, notifies "no"
//! - AFFIRMED, DECLINED_FINAL: absorbing

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::DECLINE_THRESHOLD;
use crate::core::{DeclineEscalation, Notifier, StagedReveal};
use crate::types::{
    ControllerOutput, ControllerState, EscalationFeedback, Input, NotifyPolicy, ProposalError,
    ProposalResult, ReasonCode, Response, ResponseOutcome, Theme,
};

/// Fixed parameters of a session's state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    /// Declines before the button is withdrawn
    pub threshold: u32,
    pub policy: NotifyPolicy,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            threshold: DECLINE_THRESHOLD,
            policy: NotifyPolicy::default(),
        }
    }
}

/// Everything the state machine tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub state: ControllerState,
    pub decline_count: u32,
}

impl Session {
    /// Starting point for a card whose question sits at `final_stage`
    pub fn initial(final_stage: usize) -> Self {
        let state = if final_stage == 0 {
            ControllerState::AwaitingResponse
        } else {
            ControllerState::Staging { stage: 0 }
        };
        Self { state, decline_count: 0 }
    }
}

/// Result of one input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: Session,
    /// Notification to dispatch, if any
    pub effect: Option<Response>,
    pub reason: ReasonCode,
}

impl Transition {
    fn stay(session: Session, reason: ReasonCode) -> Self {
        Self { next: session, effect: None, reason }
    }
}

/// Pure transition function
pub fn transition(session: Session, input: Input, final_stage: usize, rules: &Rules) -> Transition {
    match (session.state, input) {
        (ControllerState::Affirmed | ControllerState::DeclinedFinal, _) => {
            Transition::stay(session, ReasonCode::R005_ALREADY_RESOLVED)
        }

        (ControllerState::Staging { stage }, Input::Advance) => {
            let next_stage = stage + 1;
            if next_stage >= final_stage {
                Transition {
                    next: Session { state: ControllerState::AwaitingResponse, ..session },
                    effect: None,
                    reason: ReasonCode::R002_AWAITING_RESPONSE,
                }
            } else {
                Transition {
                    next: Session { state: ControllerState::Staging { stage: next_stage }, ..session },
                    effect: None,
                    reason: ReasonCode::R001_STAGE_ADVANCED,
                }
            }
        }

        (ControllerState::Staging { .. }, Input::Affirm | Input::Decline) => {
            Transition::stay(session, ReasonCode::R005_BUTTONS_HIDDEN)
        }

        (ControllerState::AwaitingResponse, Input::Advance) => {
            Transition::stay(session, ReasonCode::R001_STAGE_HELD)
        }

        (ControllerState::AwaitingResponse, Input::Affirm) => Transition {
            next: Session { state: ControllerState::Affirmed, ..session },
            effect: Some(Response::Yes),
            reason: ReasonCode::R003_AFFIRMED,
        },

        (ControllerState::AwaitingResponse, Input::Decline) => {
            let decline_count = session.decline_count.saturating_add(1);
            if decline_count >= rules.threshold {
                Transition {
                    next: Session { state: ControllerState::DeclinedFinal, decline_count },
                    effect: Some(Response::No),
                    reason: ReasonCode::R004_DECLINE_WITHDRAWN,
                }
            } else {
                let effect = match rules.policy {
                    NotifyPolicy::EveryDecline => Some(Response::No),
                    NotifyPolicy::FinalDeclineOnly => None,
                };
                Transition {
                    next: Session { decline_count, ..session },
                    effect,
                    reason: ReasonCode::R004_DECLINE_COUNTED,
                }
            }
        }
    }
}

/// How to build a controller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub theme: Theme,
    /// Defaults to `DECLINE_THRESHOLD`
    pub threshold: Option<u32>,
    pub notify_every_decline: bool,
    /// Defaults to the theme's messages
    pub messages: Option<Vec<String>>,
}

impl ControllerConfig {
    pub fn rules(&self) -> Rules {
        Rules {
            threshold: self.threshold.unwrap_or(DECLINE_THRESHOLD),
            policy: if self.notify_every_decline {
                NotifyPolicy::EveryDecline
            } else {
                NotifyPolicy::FinalDeclineOnly
            },
        }
    }
}

/// Owns one card session; all inputs go through `&mut self`
#[derive(Debug)]
pub struct ResponseController {
    reveal: StagedReveal,
    escalation: DeclineEscalation,
    rules: Rules,
    session: Session,
    notifier: Notifier,
    /// Every notification dispatched, in order
    notifications: Vec<Response>,
    last_reason: ReasonCode,
    input_count: u64,
}

impl ResponseController {
    /// Controller with default theme and rules
    pub fn new<I, S>(messages: I, notifier: Notifier) -> ProposalResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::build(StagedReveal::new(messages), DeclineEscalation::default(), Rules::default(), notifier)
    }

    /// Controller from a config; empty message lists are refused
    pub fn from_config(config: &ControllerConfig, notifier: Notifier) -> ProposalResult<Self> {
        let rules = config.rules();
        let escalation = DeclineEscalation::new(config.theme, rules.threshold)?;
        let messages = config
            .messages
            .clone()
            .unwrap_or_else(|| config.theme.default_messages());
        Self::build(StagedReveal::new(messages), escalation, rules, notifier)
    }

    fn build(
        reveal: StagedReveal,
        escalation: DeclineEscalation,
        rules: Rules,
        notifier: Notifier,
    ) -> ProposalResult<Self> {
        if rules.threshold == 0 {
            return Err(ProposalError::InvalidThreshold(rules.threshold));
        }
        let final_stage = reveal.final_stage().ok_or(ProposalError::OutOfRange)?;
        let session = Session::initial(final_stage);
        let last_reason = if session.state == ControllerState::AwaitingResponse {
            ReasonCode::R002_AWAITING_RESPONSE
        } else {
            ReasonCode::R001_FIRST_STAGE
        };

        Ok(Self {
            reveal,
            escalation,
            rules,
            session,
            notifier,
            notifications: Vec::new(),
            last_reason,
            input_count: 0,
        })
    }

    /// Apply one input and dispatch its notification, if any
    pub fn apply(&mut self, input: Input) -> ControllerOutput {
        self.input_count += 1;

        let before = self.session;
        let step = transition(before, input, self.final_stage(), &self.rules);

        if input == Input::Advance && step.next.state != before.state {
            // Session only leaves Staging forward, so the reveal can follow
            let advanced = self.reveal.advance();
            debug_assert!(advanced.is_ok(), "controller holds a non-empty card");
        }
        self.session = step.next;
        self.last_reason = step.reason;

        debug!(
            input = %input,
            from = %before.state,
            to = %step.next.state,
            declines = step.next.decline_count,
            reason = step.reason.code(),
            "controller transition"
        );

        if let Some(response) = step.effect {
            self.notifications.push(response);
            self.notifier.dispatch(response);
        }

        self.output(step.effect)
    }

    pub fn advance(&mut self) -> ControllerOutput {
        self.apply(Input::Advance)
    }

    pub fn affirm(&mut self) -> ControllerOutput {
        self.apply(Input::Affirm)
    }

    pub fn decline(&mut self) -> ControllerOutput {
        self.apply(Input::Decline)
    }

    /// Snapshot without applying any input
    pub fn current_output(&self) -> ControllerOutput {
        self.output(None)
    }

    fn output(&self, notified: Option<Response>) -> ControllerOutput {
        let buttons_visible = self.session.state.buttons_visible();
        ControllerOutput {
            timestamp: Utc::now(),
            state: self.session.state,
            outcome: self.outcome(),
            stage: self.reveal.stage(),
            stage_count: self.reveal.len(),
            text: self.current_text().to_string(),
            decline_count: self.session.decline_count,
            decline_threshold: self.rules.threshold,
            buttons_visible,
            decline_available: self.decline_available(),
            feedback: self.feedback(),
            notified,
            reason: self.last_reason,
        }
    }

    /// Text at the current stage
    pub fn current_text(&self) -> &str {
        // Constructor guarantees at least one message
        self.reveal.current().unwrap_or_default()
    }

    pub fn state(&self) -> ControllerState {
        self.session.state
    }

    pub fn outcome(&self) -> ResponseOutcome {
        self.session.state.outcome()
    }

    pub fn session(&self) -> Session {
        self.session
    }

    pub fn decline_count(&self) -> u32 {
        self.session.decline_count
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }

    /// On the question stage?
    pub fn is_final(&self) -> bool {
        self.reveal.is_final()
    }

    /// Decline button still offered (hidden during staging, gone once resolved)
    pub fn decline_available(&self) -> bool {
        self.session.state.buttons_visible() && self.session.decline_count < self.rules.threshold
    }

    /// Decline button appearance while it is shown
    pub fn feedback(&self) -> Option<EscalationFeedback> {
        self.decline_available()
            .then(|| self.escalation.feedback_for(self.session.decline_count))
    }

    /// Notifications dispatched so far
    pub fn notifications(&self) -> &[Response] {
        &self.notifications
    }

    /// Inputs applied so far
    pub fn input_count(&self) -> u64 {
        self.input_count
    }

    fn final_stage(&self) -> usize {
        self.reveal.final_stage().unwrap_or_default()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(messages: &[&str]) -> ResponseController {
        ResponseController::new(messages.iter().copied(), Notifier::default()).unwrap()
    }

    #[test]
    fn test_initial_state_is_staging_zero() {
        let c = controller(&["a", "b", "c"]);
        assert_eq!(c.state(), ControllerState::Staging { stage: 0 });
        assert_eq!(c.outcome(), ResponseOutcome::Pending);
        assert_eq!(c.current_text(), "a");
    }

    #[test]
    fn test_advance_reaches_awaiting_response() {
        let mut c = controller(&["a", "b", "c"]);
        let out = c.advance();
        assert_eq!(out.state, ControllerState::Staging { stage: 1 });
        assert_eq!(out.text, "b");
        assert!(!out.buttons_visible);

        let out = c.advance();
        assert_eq!(out.state, ControllerState::AwaitingResponse);
        assert_eq!(out.text, "c");
        assert!(out.buttons_visible);
        assert_eq!(out.reason, ReasonCode::R002_AWAITING_RESPONSE);
    }

    #[test]
    fn test_advance_idempotent_at_ceiling() {
        let mut c = controller(&["a", "b", "c"]);
        for _ in 0..3 {
            c.advance();
        }
        assert_eq!(c.state(), ControllerState::AwaitingResponse);
        assert_eq!(c.current_text(), "c");
        assert_eq!(c.current_output().stage, 2);
    }

    #[test]
    fn test_reveal_stage_tracks_session_stage() {
        let mut c = controller(&["a", "b", "c", "d"]);
        for expected in ["b", "c", "d", "d", "d"] {
            let out = c.advance();
            assert_eq!(out.text, expected);
            assert_eq!(c.current_text(), expected);
        }
        assert_eq!(c.current_output().stage, 3);
        assert_eq!(c.state(), ControllerState::AwaitingResponse);
    }

    #[test]
    fn test_affirm_ignored_while_staging() {
        let mut c = controller(&["a", "b"]);
        let out = c.affirm();
        assert_eq!(out.state, ControllerState::Staging { stage: 0 });
        assert_eq!(out.reason, ReasonCode::R005_BUTTONS_HIDDEN);
        assert!(c.notifications().is_empty());
    }

    #[test]
    fn test_affirm_notifies_once() {
        let mut c = controller(&["a", "b"]);
        c.advance();
        let out = c.affirm();
        assert_eq!(out.outcome, ResponseOutcome::Affirmed);
        assert_eq!(out.notified, Some(Response::Yes));

        c.affirm();
        c.decline();
        assert_eq!(c.notifications(), &[Response::Yes]);
        assert_eq!(c.state(), ControllerState::Affirmed);
    }

    #[test]
    fn test_decline_threshold_notifies_once() {
        let mut c = controller(&["q"]);
        assert_eq!(c.decline().notified, None);
        assert_eq!(c.decline().notified, None);
        let out = c.decline();
        assert_eq!(out.state, ControllerState::DeclinedFinal);
        assert_eq!(out.notified, Some(Response::No));
        assert!(!out.decline_available);
        assert_eq!(out.feedback, None);

        c.decline();
        c.affirm();
        assert_eq!(c.notifications(), &[Response::No]);
        assert_eq!(c.decline_count(), DECLINE_THRESHOLD);
    }

    #[test]
    fn test_feedback_escalates_with_declines() {
        let mut c = controller(&["q"]);
        assert_eq!(c.feedback().unwrap().label, "Not sure yet");
        c.decline();
        assert_eq!(c.feedback().unwrap().label, "I need time");
        c.decline();
        assert_eq!(c.feedback().unwrap().label, "Still thinking...");
    }

    #[test]
    fn test_every_decline_policy() {
        let config = ControllerConfig {
            notify_every_decline: true,
            messages: Some(vec!["q".to_string()]),
            ..ControllerConfig::default()
        };
        let mut c = ResponseController::from_config(&config, Notifier::default()).unwrap();
        c.decline();
        c.decline();
        c.decline();
        c.decline();
        assert_eq!(c.notifications(), &[Response::No, Response::No, Response::No]);
        assert_eq!(c.state(), ControllerState::DeclinedFinal);
    }

    #[test]
    fn test_empty_messages_refused() {
        let err = ResponseController::new(Vec::<String>::new(), Notifier::default()).unwrap_err();
        assert_eq!(err, ProposalError::OutOfRange);
    }

    #[test]
    fn test_zero_threshold_refused() {
        let config = ControllerConfig { threshold: Some(0), ..ControllerConfig::default() };
        let err = ResponseController::from_config(&config, Notifier::default()).unwrap_err();
        assert_eq!(err, ProposalError::InvalidThreshold(0));
    }

    #[test]
    fn test_pure_transition_does_not_regress() {
        let rules = Rules::default();
        let mut session = Session::initial(3);
        let mut last_stage = 0;
        for _ in 0..10 {
            session = transition(session, Input::Advance, 3, &rules).next;
            if let ControllerState::Staging { stage } = session.state {
                assert!(stage >= last_stage);
                last_stage = stage;
            }
        }
        assert_eq!(session.state, ControllerState::AwaitingResponse);
    }

    #[test]
    fn test_terminal_states_absorb_everything() {
        let rules = Rules::default();
        for state in [ControllerState::Affirmed, ControllerState::DeclinedFinal] {
            let session = Session { state, decline_count: 1 };
            for input in [Input::Advance, Input::Affirm, Input::Decline] {
                let step = transition(session, input, 2, &rules);
                assert_eq!(step.next, session);
                assert_eq!(step.effect, None);
                assert_eq!(step.reason, ReasonCode::R005_ALREADY_RESOLVED);
            }
        }
    }
}
