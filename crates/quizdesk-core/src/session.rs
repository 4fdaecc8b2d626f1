//! Test-taking and administration flows.
//!
//! Every flow receives the backend and the authenticated [`Session`]
//! explicitly; nothing reads global state.

use serde::Serialize;
use tracing::instrument;

use crate::authoring::{LessonDraft, PracticeDraft, TestDraft};
use crate::catalog::TestOverview;
use crate::draft::AttemptDraft;
use crate::error::{QuizError, ValidationError};
use crate::gate::{GateState, RetakeGate};
use crate::model::{
    Attempt, AttemptId, Grade, GradeId, GradeInput, Lesson, LessonId, Practice, PracticeGrade,
    PracticeGradeId, PracticeGradeInput, PracticeId, PracticeSubmit, Role, Test, TestId, User,
};
use crate::tier::ResultTier;
use crate::traits::{AdminBackend, PortalBackend};

/// The authenticated user a flow runs on behalf of.
#[derive(Debug, Clone)]
pub struct Session {
    user: User,
}

impl Session {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn is_admin(&self) -> bool {
        self.user.role == Role::Admin
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptOutcome {
    pub attempt: Attempt,
    pub tier: ResultTier,
}

/// One user working through one test.
pub struct TestSession<'a> {
    backend: &'a dyn PortalBackend,
    session: &'a Session,
    test: Test,
    gate: RetakeGate,
    draft: AttemptDraft,
}

impl<'a> TestSession<'a> {
    /// Fetch the definition and the user's attempts, then evaluate the gate.
    ///
    /// Both fetches run concurrently and fill separate pieces of state.
    /// Answer keys are dropped from the definition before it is kept.
    #[instrument(skip(backend, session), fields(user_id = session.user().id))]
    pub async fn load(
        backend: &'a dyn PortalBackend,
        session: &'a Session,
        test_id: TestId,
    ) -> Result<Self, QuizError> {
        let (test, attempts) = futures::try_join!(
            async {
                backend
                    .get_test(test_id)
                    .await
                    .map_err(QuizError::fetch("test definition"))
            },
            async {
                backend
                    .my_attempts()
                    .await
                    .map_err(QuizError::fetch("previous attempts"))
            },
        )?;

        let mut test = test.without_answer_keys();
        test.sort_questions();

        let gate = RetakeGate::evaluate(&test, session.user().id, &attempts);
        let draft = AttemptDraft::new(&test);

        Ok(Self {
            backend,
            session,
            test,
            gate,
            draft,
        })
    }

    pub fn test(&self) -> &Test {
        &self.test
    }

    pub fn gate(&self) -> &RetakeGate {
        &self.gate
    }

    pub fn draft(&self) -> &AttemptDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut AttemptDraft {
        &mut self.draft
    }

    /// Submit the draft for server-side scoring.
    ///
    /// Local failures return before any backend call. On a backend failure
    /// the draft is left as it was so the caller can retry.
    #[instrument(skip(self), fields(test_id = self.test.id, user_id = self.session.user().id))]
    pub async fn submit(&mut self) -> Result<AttemptOutcome, QuizError> {
        match self.gate.state() {
            GateState::Eligible { .. } => {}
            GateState::Locked { .. } => {
                tracing::warn!("submission refused: retakes are not allowed");
                return Err(ValidationError::RetakeLocked(self.test.id).into());
            }
            GateState::Completed { .. } => {
                return Err(ValidationError::AlreadySubmitted(self.test.id).into());
            }
        }

        let submission = self.draft.to_submission()?;

        let attempt = self
            .backend
            .create_attempt(self.test.id, &submission)
            .await
            .map_err(|e| {
                tracing::error!("attempt submission failed: {e}");
                QuizError::Submission(e)
            })?;

        let tier = ResultTier::from_score(attempt.score);
        tracing::info!(attempt_id = attempt.id, score = attempt.score, %tier, "attempt scored");

        self.gate.record_submission(attempt.clone());
        Ok(AttemptOutcome { attempt, tier })
    }

    /// Leave the result view. Returns `true` when a fresh attempt may start,
    /// in which case the draft is emptied.
    pub fn retake(&mut self) -> bool {
        self.gate.restart();
        if self.gate.may_take() {
            self.draft = AttemptDraft::new(&self.test);
            true
        } else {
            false
        }
    }
}

/// Fetch tests, attempts and grades concurrently and join them per test.
pub async fn load_overview(backend: &dyn PortalBackend) -> Result<Vec<TestOverview>, QuizError> {
    let (tests, attempts, grades) = futures::try_join!(
        async { backend.list_tests().await.map_err(QuizError::fetch("tests")) },
        async {
            backend
                .my_attempts()
                .await
                .map_err(QuizError::fetch("attempts"))
        },
        async { backend.my_grades().await.map_err(QuizError::fetch("grades")) },
    )?;
    Ok(TestOverview::build(tests, &attempts, &grades))
}

/// Back-office operations, available to administrators only.
pub struct AdminConsole<'a> {
    backend: &'a dyn AdminBackend,
}

impl<'a> AdminConsole<'a> {
    /// Refuses non-admin sessions before any call is made.
    pub fn new(backend: &'a dyn AdminBackend, session: &Session) -> Result<Self, QuizError> {
        if !session.is_admin() {
            return Err(QuizError::Forbidden(format!(
                "{} is not an administrator",
                session.user().email
            )));
        }
        Ok(Self { backend })
    }

    /// Validate locally, then create.
    pub async fn create_test(&self, draft: &TestDraft) -> Result<Test, QuizError> {
        draft.validate()?;
        let test = self.backend.create_test(draft).await?;
        tracing::info!(test_id = test.id, title = %test.title, "test created");
        Ok(test)
    }

    pub async fn update_test(&self, id: TestId, draft: &TestDraft) -> Result<Test, QuizError> {
        draft.validate()?;
        Ok(self.backend.update_test(id, draft).await?)
    }

    pub async fn delete_test(&self, id: TestId) -> Result<(), QuizError> {
        self.backend.delete_test(id).await?;
        tracing::info!(test_id = id, "test deleted");
        Ok(())
    }

    pub async fn attempts(&self) -> Result<Vec<Attempt>, QuizError> {
        self.backend
            .all_attempts()
            .await
            .map_err(QuizError::fetch("attempts"))
    }

    /// Delete an attempt so its owner can take the test again.
    pub async fn allow_retake(&self, attempt_id: AttemptId) -> Result<(), QuizError> {
        self.backend.delete_attempt(attempt_id).await?;
        tracing::info!(attempt_id, "attempt removed, retake allowed");
        Ok(())
    }

    /// Grade an attempt, copying its user and test references.
    pub async fn grade_attempt(
        &self,
        attempt: &Attempt,
        grade: f64,
        comment: Option<String>,
    ) -> Result<Grade, QuizError> {
        let input = GradeInput {
            user_id: attempt.user_id,
            test_id: attempt.test_id,
            attempt_id: Some(attempt.id),
            grade,
            comment,
        };
        Ok(self.backend.create_grade(&input).await?)
    }

    pub async fn update_grade(&self, id: GradeId, input: &GradeInput) -> Result<Grade, QuizError> {
        Ok(self.backend.update_grade(id, input).await?)
    }

    pub async fn delete_grade(&self, id: GradeId) -> Result<(), QuizError> {
        Ok(self.backend.delete_grade(id).await?)
    }

    pub async fn create_lesson(&self, draft: &LessonDraft) -> Result<Lesson, QuizError> {
        draft.validate()?;
        let lesson = self.backend.create_lesson(draft).await?;
        tracing::info!(lesson_id = lesson.id, number = lesson.number, "lesson created");
        Ok(lesson)
    }

    pub async fn update_lesson(&self, id: LessonId, draft: &LessonDraft) -> Result<Lesson, QuizError> {
        draft.validate()?;
        Ok(self.backend.update_lesson(id, draft).await?)
    }

    pub async fn delete_lesson(&self, id: LessonId) -> Result<(), QuizError> {
        self.backend.delete_lesson(id).await?;
        tracing::info!(lesson_id = id, "lesson deleted");
        Ok(())
    }

    pub async fn create_practice(&self, draft: &PracticeDraft) -> Result<Practice, QuizError> {
        draft.validate()?;
        let practice = self.backend.create_practice(draft).await?;
        tracing::info!(practice_id = practice.id, title = %practice.title, "practice created");
        Ok(practice)
    }

    pub async fn update_practice(
        &self,
        id: PracticeId,
        draft: &PracticeDraft,
    ) -> Result<Practice, QuizError> {
        draft.validate()?;
        Ok(self.backend.update_practice(id, draft).await?)
    }

    pub async fn delete_practice(&self, id: PracticeId) -> Result<(), QuizError> {
        self.backend.delete_practice(id).await?;
        tracing::info!(practice_id = id, "practice deleted");
        Ok(())
    }

    pub async fn practice_submits(&self) -> Result<Vec<PracticeSubmit>, QuizError> {
        self.backend
            .all_practice_submits()
            .await
            .map_err(QuizError::fetch("practice submissions"))
    }

    /// Grade a practice submission, copying its user and practice references.
    pub async fn grade_submit(
        &self,
        submit: &PracticeSubmit,
        grade: f64,
        comment: Option<String>,
    ) -> Result<PracticeGrade, QuizError> {
        let input = PracticeGradeInput {
            user_id: submit.user_id,
            practice_id: submit.practice_id,
            submit_id: Some(submit.id),
            grade,
            comment,
        };
        Ok(self.backend.create_practice_grade(&input).await?)
    }

    pub async fn update_practice_grade(
        &self,
        id: PracticeGradeId,
        input: &PracticeGradeInput,
    ) -> Result<PracticeGrade, QuizError> {
        Ok(self.backend.update_practice_grade(id, input).await?)
    }

    pub async fn delete_practice_grade(&self, id: PracticeGradeId) -> Result<(), QuizError> {
        Ok(self.backend.delete_practice_grade(id).await?)
    }
}
