//! Backend trait definitions.
//!
//! These async traits are implemented by `quizdesk-client` over HTTP, and by
//! its in-memory mock for tests.

use async_trait::async_trait;

use crate::authoring::{LessonDraft, PracticeDraft, TestDraft};
use crate::error::BackendError;
use crate::model::{
    Attempt, AttemptId, AttemptSubmission, Grade, GradeId, GradeInput, Lesson, LessonId,
    Practice, PracticeGrade, PracticeGradeId, PracticeGradeInput, PracticeId, PracticeSubmission,
    PracticeSubmit, PracticeSubmitId, Test, TestId,
};

// ---------------------------------------------------------------------------
// Student-facing calls
// ---------------------------------------------------------------------------

/// Calls available to any authenticated user.
#[async_trait]
pub trait PortalBackend: Send + Sync {
    /// All tests, without questions.
    async fn list_tests(&self) -> Result<Vec<Test>, BackendError>;

    /// One test with its questions.
    async fn get_test(&self, id: TestId) -> Result<Test, BackendError>;

    /// Submit answers; the response carries the server-computed score.
    async fn create_attempt(
        &self,
        test_id: TestId,
        submission: &AttemptSubmission,
    ) -> Result<Attempt, BackendError>;

    /// The current user's attempts across all tests.
    async fn my_attempts(&self) -> Result<Vec<Attempt>, BackendError>;

    async fn get_attempt(&self, id: AttemptId) -> Result<Attempt, BackendError>;

    /// The current user's instructor grades.
    async fn my_grades(&self) -> Result<Vec<Grade>, BackendError>;

    async fn list_lessons(&self) -> Result<Vec<Lesson>, BackendError>;

    async fn get_lesson(&self, id: LessonId) -> Result<Lesson, BackendError>;

    async fn list_practices(&self) -> Result<Vec<Practice>, BackendError>;

    async fn get_practice(&self, id: PracticeId) -> Result<Practice, BackendError>;

    /// Hand in a solution link for a practice.
    async fn submit_practice(
        &self,
        practice_id: PracticeId,
        submission: &PracticeSubmission,
    ) -> Result<PracticeSubmit, BackendError>;

    /// The current user's practice submissions.
    async fn my_practice_submits(&self) -> Result<Vec<PracticeSubmit>, BackendError>;

    async fn get_practice_submit(
        &self,
        id: PracticeSubmitId,
    ) -> Result<PracticeSubmit, BackendError>;

    /// The current user's practice grades.
    async fn my_practice_grades(&self) -> Result<Vec<PracticeGrade>, BackendError>;
}

// ---------------------------------------------------------------------------
// Administrator calls
// ---------------------------------------------------------------------------

/// Back-office calls. The server rejects them for non-admin tokens.
#[async_trait]
pub trait AdminBackend: PortalBackend {
    async fn create_test(&self, draft: &TestDraft) -> Result<Test, BackendError>;

    async fn update_test(&self, id: TestId, draft: &TestDraft) -> Result<Test, BackendError>;

    async fn delete_test(&self, id: TestId) -> Result<(), BackendError>;

    /// Attempts of every user.
    async fn all_attempts(&self) -> Result<Vec<Attempt>, BackendError>;

    /// Remove an attempt so its owner may take the test again.
    async fn delete_attempt(&self, id: AttemptId) -> Result<(), BackendError>;

    async fn create_grade(&self, grade: &GradeInput) -> Result<Grade, BackendError>;

    async fn update_grade(&self, id: GradeId, grade: &GradeInput) -> Result<Grade, BackendError>;

    async fn delete_grade(&self, id: GradeId) -> Result<(), BackendError>;

    async fn create_lesson(&self, draft: &LessonDraft) -> Result<Lesson, BackendError>;

    async fn update_lesson(&self, id: LessonId, draft: &LessonDraft)
        -> Result<Lesson, BackendError>;

    async fn delete_lesson(&self, id: LessonId) -> Result<(), BackendError>;

    async fn create_practice(&self, draft: &PracticeDraft) -> Result<Practice, BackendError>;

    async fn update_practice(
        &self,
        id: PracticeId,
        draft: &PracticeDraft,
    ) -> Result<Practice, BackendError>;

    async fn delete_practice(&self, id: PracticeId) -> Result<(), BackendError>;

    /// Practice submissions of every user.
    async fn all_practice_submits(&self) -> Result<Vec<PracticeSubmit>, BackendError>;

    async fn create_practice_grade(
        &self,
        grade: &PracticeGradeInput,
    ) -> Result<PracticeGrade, BackendError>;

    async fn update_practice_grade(
        &self,
        id: PracticeGradeId,
        grade: &PracticeGradeInput,
    ) -> Result<PracticeGrade, BackendError>;

    async fn delete_practice_grade(&self, id: PracticeGradeId) -> Result<(), BackendError>;
}
