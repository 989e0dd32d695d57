use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// The six ordered steps of a deposit flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    ApproveTokenA,
    ApproveTokenB,
    Deposit,
    AssignAgent,
    Analyze,
    Finalize,
}

impl StepKind {
    pub const ALL: [StepKind; 6] = [
        StepKind::ApproveTokenA,
        StepKind::ApproveTokenB,
        StepKind::Deposit,
        StepKind::AssignAgent,
        StepKind::Analyze,
        StepKind::Finalize,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<StepKind> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn title(self) -> &'static str {
        match self {
            StepKind::ApproveTokenA => "Approve token A",
            StepKind::ApproveTokenB => "Approve token B",
            StepKind::Deposit => "Deposit tokens",
            StepKind::AssignAgent => "Assign agent",
            StepKind::Analyze => "AI analyze",
            StepKind::Finalize => "Create position",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Active,
    Completed,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("step `{requested}` cannot run now (current step: {})", current.map(|s| s.title()).unwrap_or("none"))]
    NotCurrent {
        requested: StepKind,
        current: Option<StepKind>,
    },

    #[error("step `{step}` cannot move out of {from:?}")]
    InvalidTransition { step: StepKind, from: StepStatus },
}

/// Per-step status bookkeeping.
///
/// The current step is the first one not yet completed; it is either
/// `Active` or `Error`. Every step after it is `Pending`, every step before it
/// `Completed`. Completed steps never change again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepMachine {
    statuses: [StepStatus; 6],
}

impl Default for StepMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StepMachine {
    pub fn new() -> Self {
        let mut statuses = [StepStatus::Pending; 6];
        statuses[0] = StepStatus::Active;
        StepMachine { statuses }
    }

    pub fn status(&self, step: StepKind) -> StepStatus {
        self.statuses[step.index()]
    }

    pub fn statuses(&self) -> [StepStatus; 6] {
        self.statuses
    }

    /// The step that accepts the next "advance", or `None` once finished.
    pub fn current(&self) -> Option<StepKind> {
        StepKind::ALL
            .into_iter()
            .find(|s| self.status(*s) != StepStatus::Completed)
    }

    pub fn is_complete(&self) -> bool {
        self.current().is_none()
    }

    /// Reject any step other than the current one.
    pub fn ensure_current(&self, step: StepKind) -> Result<(), StepError> {
        let current = self.current();
        if current == Some(step) {
            Ok(())
        } else {
            Err(StepError::NotCurrent {
                requested: step,
                current,
            })
        }
    }

    /// Put a failed step back into `Active` for a retry.
    pub fn rearm(&mut self, step: StepKind) -> Result<(), StepError> {
        self.ensure_current(step)?;
        match self.status(step) {
            StepStatus::Error => {
                self.statuses[step.index()] = StepStatus::Active;
                Ok(())
            }
            StepStatus::Active => Ok(()),
            from => Err(StepError::InvalidTransition { step, from }),
        }
    }

    /// `Active -> Completed`, activating the following step. Returns the newly
    /// active step, if any.
    pub fn complete(&mut self, step: StepKind) -> Result<Option<StepKind>, StepError> {
        self.ensure_current(step)?;
        let from = self.status(step);
        if from != StepStatus::Active {
            return Err(StepError::InvalidTransition { step, from });
        }

        self.statuses[step.index()] = StepStatus::Completed;
        let next = step.next();
        if let Some(next) = next {
            self.statuses[next.index()] = StepStatus::Active;
        }
        Ok(next)
    }

    /// `Active -> Error`. Earlier completed steps are untouched.
    pub fn fail(&mut self, step: StepKind) -> Result<(), StepError> {
        self.ensure_current(step)?;
        let from = self.status(step);
        if from != StepStatus::Active {
            return Err(StepError::InvalidTransition { step, from });
        }
        self.statuses[step.index()] = StepStatus::Error;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_count(m: &StepMachine) -> usize {
        m.statuses()
            .iter()
            .filter(|s| **s == StepStatus::Active)
            .count()
    }

    #[test]
    fn test_initial_state() {
        let m = StepMachine::new();
        assert_eq!(m.current(), Some(StepKind::ApproveTokenA));
        assert_eq!(m.status(StepKind::ApproveTokenA), StepStatus::Active);
        for step in &StepKind::ALL[1..] {
            assert_eq!(m.status(*step), StepStatus::Pending);
        }
    }

    #[test]
    fn test_full_sequence_completes() {
        let mut m = StepMachine::new();
        for (i, step) in StepKind::ALL.iter().enumerate() {
            let next = m.complete(*step).unwrap();
            assert_eq!(next, StepKind::ALL.get(i + 1).copied());
            assert!(active_count(&m) <= 1);
        }
        assert!(m.is_complete());
        assert_eq!(active_count(&m), 0);
    }

    #[test]
    fn test_out_of_order_steps_rejected_at_every_stage() {
        let mut m = StepMachine::new();
        for step in StepKind::ALL {
            for other in StepKind::ALL.into_iter().filter(|o| *o != step) {
                let before = m.clone();
                assert!(m.complete(other).is_err(), "{other} accepted while {step} current");
                assert!(m.fail(other).is_err());
                assert_eq!(m, before);
            }
            m.complete(step).unwrap();
        }
        for step in StepKind::ALL {
            assert!(m.complete(step).is_err());
        }
    }

    #[test]
    fn test_failure_then_retry_keeps_completed_steps() {
        let mut m = StepMachine::new();
        m.complete(StepKind::ApproveTokenA).unwrap();
        m.complete(StepKind::ApproveTokenB).unwrap();

        m.fail(StepKind::Deposit).unwrap();
        assert_eq!(m.status(StepKind::Deposit), StepStatus::Error);
        assert_eq!(m.current(), Some(StepKind::Deposit));
        assert_eq!(m.status(StepKind::ApproveTokenA), StepStatus::Completed);
        assert_eq!(m.status(StepKind::AssignAgent), StepStatus::Pending);

        // A failed step must be re-armed before it can complete.
        assert!(m.complete(StepKind::Deposit).is_err());
        m.rearm(StepKind::Deposit).unwrap();
        m.complete(StepKind::Deposit).unwrap();
        assert_eq!(m.current(), Some(StepKind::AssignAgent));
    }

    #[test]
    fn test_completed_step_never_changes() {
        let mut m = StepMachine::new();
        m.complete(StepKind::ApproveTokenA).unwrap();
        assert!(m.fail(StepKind::ApproveTokenA).is_err());
        assert!(m.rearm(StepKind::ApproveTokenA).is_err());
        assert_eq!(m.status(StepKind::ApproveTokenA), StepStatus::Completed);
    }
}
