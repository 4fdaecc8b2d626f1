//! In-memory answer draft for one test-taking session.
//!
//! The draft only accepts answers for questions that belong to the test it
//! was built from, so "every question answered" and "as many distinct
//! answers as questions" are the same thing. A definition that repeats a
//! question id can never be completed or submitted.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::ValidationError;
use crate::model::{Answer, AnswerSheet, AttemptSubmission, QuestionId, Test, TestId, TestKind};

/// Answers collected so far for a single test.
#[derive(Debug, Clone)]
pub struct AttemptDraft {
    test_id: TestId,
    kind: TestKind,
    /// Question id -> number of options.
    questions: BTreeMap<QuestionId, usize>,
    /// Number of questions in the definition, repeated ids included.
    question_total: usize,
    /// First question id that appears more than once in the definition.
    duplicate: Option<QuestionId>,
    answers: AnswerSheet,
}

impl AttemptDraft {
    /// Start an empty draft for `test`.
    pub fn new(test: &Test) -> Self {
        let mut questions = BTreeMap::new();
        let mut duplicate = None;
        for q in &test.questions {
            if questions.insert(q.id, q.options.len()).is_some() && duplicate.is_none() {
                duplicate = Some(q.id);
            }
        }

        Self {
            test_id: test.id,
            kind: test.kind,
            questions,
            question_total: test.questions.len(),
            duplicate,
            answers: AnswerSheet::default(),
        }
    }

    pub fn test_id(&self) -> TestId {
        self.test_id
    }

    /// Record `answer` for `question_id`, replacing any earlier answer.
    ///
    /// Correctness is never checked here. The call is rejected, leaving the
    /// draft unchanged, when the question is not part of the test, an option
    /// index is out of range, or the answer shape does not match the test
    /// kind.
    pub fn set_answer(
        &mut self,
        question_id: QuestionId,
        answer: Answer,
    ) -> Result<(), ValidationError> {
        let options = *self
            .questions
            .get(&question_id)
            .ok_or(ValidationError::UnknownQuestion(question_id))?;

        if answer.kind() != self.kind {
            return Err(ValidationError::AnswerKindMismatch {
                question_id,
                expected: match self.kind {
                    TestKind::Single => "single",
                    TestKind::Multiple => "multiple",
                },
            });
        }

        if let Some(index) = answer.indices().into_iter().find(|i| *i >= options) {
            return Err(ValidationError::OptionOutOfRange {
                question_id,
                index,
                options,
            });
        }

        match answer {
            Answer::Multiple(set) if set.is_empty() => {
                self.answers.0.remove(&question_id);
            }
            answer => {
                self.answers.0.insert(question_id, answer);
            }
        }
        Ok(())
    }

    /// Pick option `index` of a single-choice question.
    pub fn select(&mut self, question_id: QuestionId, index: usize) -> Result<(), ValidationError> {
        self.set_answer(question_id, Answer::Single(index))
    }

    /// Flip option `index` of a multiple-choice question on or off.
    pub fn toggle(&mut self, question_id: QuestionId, index: usize) -> Result<(), ValidationError> {
        let mut selected = match self.answers.get(question_id) {
            Some(Answer::Multiple(set)) => set.clone(),
            _ => BTreeSet::new(),
        };
        if !selected.remove(&index) {
            selected.insert(index);
        }
        self.set_answer(question_id, Answer::Multiple(selected))
    }

    pub fn answer(&self, question_id: QuestionId) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn question_count(&self) -> usize {
        self.question_total
    }

    /// True when every question of the test has an answer.
    pub fn is_complete(&self) -> bool {
        self.answered_count() == self.question_count()
    }

    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    /// Build the request body for submission.
    pub fn to_submission(&self) -> Result<AttemptSubmission, ValidationError> {
        if self.questions.is_empty() {
            return Err(ValidationError::NoQuestions(self.test_id));
        }
        if let Some(question_id) = self.duplicate {
            return Err(ValidationError::DuplicateQuestion(question_id));
        }
        if !self.is_complete() {
            return Err(ValidationError::IncompleteDraft {
                answered: self.answered_count(),
                required: self.question_count(),
            });
        }
        Ok(AttemptSubmission {
            answers: self.answers.to_json_string(),
        })
    }
}
