//! Escalation ladder as a finite state machine
//!
//! ```text
//! Initial ──no contradictions──▶ Resolved
//!    │
//!    └─contradictions─▶ ContradictionFound ──retry ok──▶ Resolved
//!                             │
//!                             └─retry failed─▶ RetryAttempted ──verified──▶ Resolved
//!                                                   │
//!                                                   └─insufficient─▶ EvidenceGathered ──▶ Arbitrated
//! ```
//!
//! Transitions are pure. Each state can be left at most once, so the
//! narrowed retry and arbitration happen at most once per run.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tribunal_domain::TierStage;

/// Position on the escalation ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EscalationState {
    /// Tier-1 finished; Tier-2 not yet decided
    #[default]
    Initial,
    /// Tier-2 found contradictions
    ContradictionFound,
    /// The narrowed retry ran and did not resolve them
    RetryAttempted,
    /// Evidence did not verify the claims
    EvidenceGathered,
    /// Arbitration answered the query
    Arbitrated,
    /// No further escalation is needed
    Resolved,
}

impl EscalationState {
    /// Get the state name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            EscalationState::Initial => "INITIAL",
            EscalationState::ContradictionFound => "CONTRADICTION_FOUND",
            EscalationState::RetryAttempted => "RETRY_ATTEMPTED",
            EscalationState::EvidenceGathered => "EVIDENCE_GATHERED",
            EscalationState::Arbitrated => "ARBITRATED",
            EscalationState::Resolved => "RESOLVED",
        }
    }

    /// Whether the ladder ends here
    pub fn is_terminal(&self) -> bool {
        matches!(self, EscalationState::Arbitrated | EscalationState::Resolved)
    }

    /// Stage to run next, if any
    pub fn next_stage(&self) -> Option<TierStage> {
        match self {
            EscalationState::Initial => Some(TierStage::Contradiction),
            EscalationState::ContradictionFound => Some(TierStage::NarrowedRetry),
            EscalationState::RetryAttempted => Some(TierStage::Evidence),
            EscalationState::EvidenceGathered => Some(TierStage::Arbitration),
            EscalationState::Arbitrated | EscalationState::Resolved => None,
        }
    }
}

impl fmt::Display for EscalationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a stage, fed back into the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationEvent {
    /// Tier-2 skipped or found nothing
    NoContradictions,
    /// Tier-2 found contradictions
    ContradictionsDetected,
    /// The narrowed retry resolved every contradiction
    RetrySucceeded,
    /// The narrowed retry left contradictions
    RetryFailed,
    /// Evidence verified the claims
    EvidenceVerified,
    /// Evidence was too thin or conflicted
    EvidenceInsufficient,
    /// Arbitration ran
    Arbitrated,
}

impl fmt::Display for EscalationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EscalationEvent::NoContradictions => "no_contradictions",
            EscalationEvent::ContradictionsDetected => "contradictions_detected",
            EscalationEvent::RetrySucceeded => "retry_succeeded",
            EscalationEvent::RetryFailed => "retry_failed",
            EscalationEvent::EvidenceVerified => "evidence_verified",
            EscalationEvent::EvidenceInsufficient => "evidence_insufficient",
            EscalationEvent::Arbitrated => "arbitrated",
        };
        f.write_str(name)
    }
}

/// An event that is not valid in the current state
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Illegal escalation: {event} in state {from}")]
pub struct TransitionError {
    /// State the machine was in
    pub from: EscalationState,
    /// Event that was rejected
    pub event: EscalationEvent,
}

/// Apply one event
pub fn transition(
    state: EscalationState,
    event: EscalationEvent,
) -> Result<EscalationState, TransitionError> {
    use EscalationEvent as E;
    use EscalationState as S;

    match (state, event) {
        (S::Initial, E::NoContradictions) => Ok(S::Resolved),
        (S::Initial, E::ContradictionsDetected) => Ok(S::ContradictionFound),
        (S::ContradictionFound, E::RetrySucceeded) => Ok(S::Resolved),
        (S::ContradictionFound, E::RetryFailed) => Ok(S::RetryAttempted),
        (S::RetryAttempted, E::EvidenceVerified) => Ok(S::Resolved),
        (S::RetryAttempted, E::EvidenceInsufficient) => Ok(S::EvidenceGathered),
        (S::EvidenceGathered, E::Arbitrated) => Ok(S::Arbitrated),
        (from, event) => Err(TransitionError { from, event }),
    }
}

/// Tracks the current state and every state visited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Escalation {
    state: EscalationState,
    path: Vec<EscalationState>,
}

impl Default for Escalation {
    fn default() -> Self {
        Self::new()
    }
}

impl Escalation {
    /// Start at [`EscalationState::Initial`]
    pub fn new() -> Self {
        Self {
            state: EscalationState::Initial,
            path: vec![EscalationState::Initial],
        }
    }

    /// Current state
    pub fn state(&self) -> EscalationState {
        self.state
    }

    /// States visited so far, starting with `Initial`
    pub fn path(&self) -> &[EscalationState] {
        &self.path
    }

    /// Apply an event, leaving the machine unchanged on error
    pub fn apply(&mut self, event: EscalationEvent) -> Result<EscalationState, TransitionError> {
        let next = transition(self.state, event)?;
        self.state = next;
        self.path.push(next);
        Ok(next)
    }
}
