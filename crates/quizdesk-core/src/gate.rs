//! Retake gate: may the user start (another) attempt at a test?
//!
//! The gate is a read-then-decide check made once per session load. It is
//! not atomic with submission; two concurrent sessions can both see
//! `Eligible`. Single-attempt enforcement belongs to the server.

use crate::model::{Attempt, Test, TestId, UserId};

/// Where the user stands with respect to one test.
#[derive(Debug, Clone)]
pub enum GateState {
    /// No prior attempt, or retakes are allowed.
    Eligible { previous: Option<Attempt> },
    /// A prior attempt exists and retakes are not allowed.
    Locked { previous: Attempt },
    /// Submitted during this session; holds the fresh result.
    Completed { attempt: Attempt },
}

impl GateState {
    pub fn label(&self) -> &'static str {
        match self {
            GateState::Eligible { .. } => "eligible",
            GateState::Locked { .. } => "locked",
            GateState::Completed { .. } => "completed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetakeGate {
    test_id: TestId,
    allow_retake: bool,
    state: GateState,
}

impl RetakeGate {
    /// Decide from the user's known attempts.
    ///
    /// Attempts for other tests or other users are ignored. The last
    /// matching attempt in server order counts as the previous one.
    pub fn evaluate(test: &Test, user_id: UserId, attempts: &[Attempt]) -> Self {
        let previous = attempts
            .iter()
            .filter(|a| a.test_id == test.id && a.user_id == user_id)
            .next_back()
            .cloned();

        let state = match previous {
            Some(previous) if !test.allow_retake => GateState::Locked { previous },
            previous => GateState::Eligible { previous },
        };

        tracing::debug!(
            test_id = test.id,
            user_id,
            state = state.label(),
            "retake gate evaluated"
        );

        Self {
            test_id: test.id,
            allow_retake: test.allow_retake,
            state,
        }
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn test_id(&self) -> TestId {
        self.test_id
    }

    /// Only an eligible user may open the answer form and submit.
    pub fn may_take(&self) -> bool {
        matches!(self.state, GateState::Eligible { .. })
    }

    /// The most recent attempt known to the gate, if any.
    pub fn latest_attempt(&self) -> Option<&Attempt> {
        match &self.state {
            GateState::Eligible { previous } => previous.as_ref(),
            GateState::Locked { previous } => Some(previous),
            GateState::Completed { attempt } => Some(attempt),
        }
    }

    /// A submission succeeded; show its result without refetching.
    pub fn record_submission(&mut self, attempt: Attempt) {
        self.state = GateState::Completed { attempt };
    }

    /// Leave the result view, landing where a fresh evaluation would.
    pub fn restart(&mut self) {
        if let GateState::Completed { attempt } = &self.state {
            let previous = attempt.clone();
            self.state = if self.allow_retake {
                GateState::Eligible {
                    previous: Some(previous),
                }
            } else {
                GateState::Locked { previous }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnswerSheet;
    use chrono::Utc;

    fn make_test(allow_retake: bool) -> Test {
        Test {
            id: 4,
            lesson_id: 1,
            title: "Gate".into(),
            description: None,
            kind: Default::default(),
            allow_retake,
            created_at: None,
            updated_at: None,
            lesson: None,
            questions: vec![],
        }
    }

    fn attempt(id: u64, user_id: u64, test_id: u64, score: f64) -> Attempt {
        Attempt {
            id,
            user_id,
            test_id,
            answers: AnswerSheet::default(),
            score,
            created_at: Utc::now(),
            test: None,
        }
    }

    #[test]
    fn locked_when_attempted_and_no_retake() {
        let gate = RetakeGate::evaluate(&make_test(false), 1, &[attempt(1, 1, 4, 60.0)]);
        assert!(matches!(gate.state(), GateState::Locked { previous } if previous.id == 1));
        assert!(!gate.may_take());
    }

    #[test]
    fn eligible_when_retake_allowed() {
        let gate = RetakeGate::evaluate(&make_test(true), 1, &[attempt(1, 1, 4, 60.0)]);
        assert!(gate.may_take());
        assert_eq!(gate.latest_attempt().map(|a| a.id), Some(1));
    }

    #[test]
    fn eligible_without_attempts_regardless_of_flag() {
        for allow in [false, true] {
            let gate = RetakeGate::evaluate(&make_test(allow), 1, &[]);
            assert!(matches!(gate.state(), GateState::Eligible { previous: None }));
        }
    }

    #[test]
    fn ignores_other_tests_and_users() {
        let attempts = [attempt(1, 1, 99, 10.0), attempt(2, 2, 4, 10.0)];
        let gate = RetakeGate::evaluate(&make_test(false), 1, &attempts);
        assert!(gate.may_take());
    }

    #[test]
    fn latest_matching_attempt_wins() {
        let attempts = [attempt(1, 1, 4, 40.0), attempt(2, 1, 4, 80.0)];
        let gate = RetakeGate::evaluate(&make_test(false), 1, &attempts);
        assert_eq!(gate.latest_attempt().map(|a| a.score), Some(80.0));
    }

    #[test]
    fn completed_then_restart() {
        let mut gate = RetakeGate::evaluate(&make_test(false), 1, &[]);
        gate.record_submission(attempt(5, 1, 4, 95.0));
        assert_eq!(gate.state().label(), "completed");
        assert!(!gate.may_take());
        gate.restart();
        assert_eq!(gate.state().label(), "locked");

        let mut gate = RetakeGate::evaluate(&make_test(true), 1, &[]);
        gate.record_submission(attempt(6, 1, 4, 95.0));
        gate.restart();
        assert!(gate.may_take());
    }
}
