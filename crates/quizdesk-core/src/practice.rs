//! Practice assignments and lesson pages.
//!
//! A practice is handed in once as a link to the solution file. Grading
//! happens later in the back-office.

use serde::Serialize;
use tracing::instrument;

use crate::error::{QuizError, ValidationError};
use crate::model::{
    Lesson, LessonId, Practice, PracticeGrade, PracticeId, PracticeSubmission, PracticeSubmit,
    Test,
};
use crate::session::Session;
use crate::traits::PortalBackend;

/// One user working on one practice.
pub struct PracticeSession<'a> {
    backend: &'a dyn PortalBackend,
    session: &'a Session,
    practice: Practice,
    submit: Option<PracticeSubmit>,
}

impl<'a> PracticeSession<'a> {
    /// Fetch the practice and the user's submissions concurrently.
    #[instrument(skip(backend, session), fields(user_id = session.user().id))]
    pub async fn load(
        backend: &'a dyn PortalBackend,
        session: &'a Session,
        practice_id: PracticeId,
    ) -> Result<Self, QuizError> {
        let (practice, submits) = futures::try_join!(
            async {
                backend
                    .get_practice(practice_id)
                    .await
                    .map_err(QuizError::fetch("practice"))
            },
            async {
                backend
                    .my_practice_submits()
                    .await
                    .map_err(QuizError::fetch("practice submissions"))
            },
        )?;

        let user_id = session.user().id;
        let submit = submits
            .into_iter()
            .find(|s| s.practice_id == practice.id && s.user_id == user_id);

        Ok(Self {
            backend,
            session,
            practice,
            submit,
        })
    }

    pub fn practice(&self) -> &Practice {
        &self.practice
    }

    /// The user's earlier submission, if any.
    pub fn existing_submit(&self) -> Option<&PracticeSubmit> {
        self.submit.as_ref()
    }

    /// Hand in a solution link. A practice accepts one submission per user.
    #[instrument(skip(self), fields(practice_id = self.practice.id, user_id = self.session.user().id))]
    pub async fn submit(&mut self, file_url: &str) -> Result<PracticeSubmit, QuizError> {
        if self.submit.is_some() {
            return Err(ValidationError::PracticeAlreadySubmitted(self.practice.id).into());
        }
        let file_url = file_url.trim();
        if file_url.is_empty() {
            return Err(ValidationError::MissingFileUrl.into());
        }

        let submission = PracticeSubmission {
            file_url: file_url.to_string(),
        };
        let submit = self
            .backend
            .submit_practice(self.practice.id, &submission)
            .await
            .map_err(|e| {
                tracing::error!("practice submission failed: {e}");
                QuizError::Submission(e)
            })?;

        tracing::info!(submit_id = submit.id, "practice submitted");
        self.submit = Some(submit.clone());
        Ok(submit)
    }
}

/// One row of the practices page.
#[derive(Debug, Clone, Serialize)]
pub struct PracticeOverview {
    pub practice: Practice,
    pub submit: Option<PracticeSubmit>,
    pub grade: Option<PracticeGrade>,
}

impl PracticeOverview {
    pub fn build(
        practices: Vec<Practice>,
        submits: &[PracticeSubmit],
        grades: &[PracticeGrade],
    ) -> Vec<Self> {
        practices
            .into_iter()
            .map(|practice| {
                let submit = submits
                    .iter()
                    .find(|s| s.practice_id == practice.id)
                    .cloned();
                let grade = grades
                    .iter()
                    .find(|g| g.practice_id == practice.id)
                    .cloned();
                Self {
                    practice,
                    submit,
                    grade,
                }
            })
            .collect()
    }

    pub fn status(&self) -> &'static str {
        match (&self.submit, &self.grade) {
            (_, Some(_)) => "graded",
            (Some(_), None) => "submitted",
            (None, None) => "not submitted",
        }
    }
}

/// Fetch practices, submissions and practice grades and join them.
pub async fn load_practice_overview(
    backend: &dyn PortalBackend,
) -> Result<Vec<PracticeOverview>, QuizError> {
    let (practices, submits, grades) = futures::try_join!(
        async {
            backend
                .list_practices()
                .await
                .map_err(QuizError::fetch("practices"))
        },
        async {
            backend
                .my_practice_submits()
                .await
                .map_err(QuizError::fetch("practice submissions"))
        },
        async {
            backend
                .my_practice_grades()
                .await
                .map_err(QuizError::fetch("practice grades"))
        },
    )?;
    Ok(PracticeOverview::build(practices, &submits, &grades))
}

/// A lesson page: the lesson with the tests and practices attached to it.
#[derive(Debug, Clone, Serialize)]
pub struct LessonDetail {
    pub lesson: Lesson,
    pub tests: Vec<Test>,
    pub practices: Vec<Practice>,
}

/// Fetch a lesson and filter the catalog down to its tests and practices.
pub async fn load_lesson(
    backend: &dyn PortalBackend,
    lesson_id: LessonId,
) -> Result<LessonDetail, QuizError> {
    let (lesson, tests, practices) = futures::try_join!(
        async {
            backend
                .get_lesson(lesson_id)
                .await
                .map_err(QuizError::fetch("lesson"))
        },
        async { backend.list_tests().await.map_err(QuizError::fetch("tests")) },
        async {
            backend
                .list_practices()
                .await
                .map_err(QuizError::fetch("practices"))
        },
    )?;
    Ok(LessonDetail {
        lesson,
        tests: tests.into_iter().filter(|t| t.lesson_id == lesson_id).collect(),
        practices: practices
            .into_iter()
            .filter(|p| p.lesson_id == lesson_id)
            .collect(),
    })
}
