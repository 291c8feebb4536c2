//! Accord phase machine
//!
//! Phases advance `Draft -> Active -> Analyzing -> Resolving -> Complete`,
//! with `Resolving -> Analyzing` as the cyclical edge taken when a new
//! round begins. All transitions are checked against the adjacency table
//! in [`AccordPhase::can_transition_to`]; writers must never apply a
//! transition the table rejects.

use serde::{Deserialize, Serialize};

/// Phase of an accord
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccordPhase {
    /// Created by its owner, no partner has joined yet
    Draft,
    /// Multi-party; participants submit their initial answers
    Active,
    /// A round is satisfied and synthesis is running (or retryable)
    Analyzing,
    /// Analysis is available; participants resolve conflicts or sign
    Resolving,
    /// Every participant signed the current round
    Complete,
}

impl AccordPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccordPhase::Draft => "draft",
            AccordPhase::Active => "active",
            AccordPhase::Analyzing => "analyzing",
            AccordPhase::Resolving => "resolving",
            AccordPhase::Complete => "complete",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AccordPhase::Draft => "Draft",
            AccordPhase::Active => "Collecting Answers",
            AccordPhase::Analyzing => "Analyzing",
            AccordPhase::Resolving => "Resolving",
            AccordPhase::Complete => "Complete",
        }
    }

    /// Whether a transition from `self` to `target` is legal.
    pub fn can_transition_to(self, target: AccordPhase) -> bool {
        use AccordPhase::*;
        matches!(
            (self, target),
            (Draft, Active)
                | (Active, Analyzing)
                | (Analyzing, Resolving)
                | (Resolving, Analyzing)
                | (Resolving, Complete)
        )
    }

    /// Terminal for forward round progress. `Complete` still admits
    /// additional signature activity (re-affirmation), never new rounds.
    pub fn is_terminal(self) -> bool {
        matches!(self, AccordPhase::Complete)
    }

    /// Phases in which a participant may submit answers.
    pub fn accepts_submissions(self) -> bool {
        matches!(self, AccordPhase::Active | AccordPhase::Resolving)
    }

    /// Phases in which a participant may sign the agreement.
    pub fn accepts_signatures(self) -> bool {
        matches!(self, AccordPhase::Resolving | AccordPhase::Complete)
    }
}

impl std::fmt::Display for AccordPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
