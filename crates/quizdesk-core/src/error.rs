//! Error taxonomy for the test-taking flows.
//!
//! `BackendError` classifies transport and HTTP failures. It is defined here
//! rather than in `quizdesk-client` so the session flow can wrap it without
//! knowing which backend produced it. `ValidationError` covers every local
//! precondition that is checked before anything reaches the server, and
//! `QuizError` is what the flows hand back to callers.

use thiserror::Error;

use crate::model::{PracticeId, QuestionId, TestId};

/// Errors that can occur when talking to the portal backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The token is missing, invalid or expired (HTTP 401).
    #[error("not authenticated: {0}")]
    Unauthorized(String),

    /// The authenticated user may not perform this call (HTTP 403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The requested resource does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The API returned any other error response.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Returns `true` if repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            BackendError::Timeout(_) | BackendError::Network(_) => true,
            BackendError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// A local precondition failed. Nothing was sent to the server.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("please answer all questions ({answered} of {required} answered)")]
    IncompleteDraft { answered: usize, required: usize },

    #[error("test {0} has no questions")]
    NoQuestions(TestId),

    #[error("question {0} appears more than once in this test")]
    DuplicateQuestion(QuestionId),

    #[error("question {0} is not part of this test")]
    UnknownQuestion(QuestionId),

    #[error("question {question_id}: option {index} is out of range ({options} options)")]
    OptionOutOfRange {
        question_id: QuestionId,
        index: usize,
        options: usize,
    },

    #[error("question {question_id}: expected a {expected}-choice answer")]
    AnswerKindMismatch {
        question_id: QuestionId,
        expected: &'static str,
    },

    #[error("test {0} has already been taken and retakes are not allowed")]
    RetakeLocked(TestId),

    #[error("an attempt at test {0} was just submitted; start a retake first")]
    AlreadySubmitted(TestId),

    #[error("select a lesson")]
    MissingLesson,

    #[error("enter a title")]
    MissingTitle,

    #[error("add at least one question")]
    EmptyTest,

    #[error("question {position}: enter the question text")]
    MissingQuestionText { position: usize },

    #[error("question {position}: add at least 2 answer options")]
    TooFewOptions { position: usize },

    #[error("question {position}: every answer option must be filled in")]
    BlankOption { position: usize },

    #[error("question {position}: choose the correct answer")]
    InvalidCorrectAnswer { position: usize },

    #[error("lesson number must be a positive integer")]
    InvalidLessonNumber,

    #[error("enter the lesson topic")]
    MissingTopic,

    #[error("enter the file URL")]
    MissingFileUrl,

    #[error("practice {0} has already been submitted")]
    PracticeAlreadySubmitted(PracticeId),
}

/// Errors surfaced by the test-taking and administration flows.
#[derive(Debug, Error)]
pub enum QuizError {
    /// Local precondition failure; the draft is untouched.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backend rejected or never received a submission; the local
    /// state is kept so the call can be retried.
    #[error("failed to submit: {0}")]
    Submission(#[source] BackendError),

    /// A page-level load failed.
    #[error("failed to load {what}: {source}")]
    Fetch {
        what: &'static str,
        #[source]
        source: BackendError,
    },

    /// A plain backend call outside the submission flow failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The session lacks the role required for this flow.
    #[error("access denied: {0}")]
    Forbidden(String),
}

impl QuizError {
    pub(crate) fn fetch(what: &'static str) -> impl FnOnce(BackendError) -> QuizError {
        move |source| QuizError::Fetch { what, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(BackendError::Timeout(30).is_retryable());
        assert!(BackendError::Network("reset".into()).is_retryable());
        assert!(BackendError::Api {
            status: 503,
            message: String::new()
        }
        .is_retryable());
        assert!(!BackendError::Api {
            status: 422,
            message: String::new()
        }
        .is_retryable());
        assert!(!BackendError::Unauthorized(String::new()).is_retryable());
    }

    #[test]
    fn incomplete_draft_message() {
        let err = QuizError::from(ValidationError::IncompleteDraft {
            answered: 1,
            required: 3,
        });
        assert_eq!(
            err.to_string(),
            "please answer all questions (1 of 3 answered)"
        );
    }

    #[test]
    fn fetch_error_names_what_failed() {
        let err = QuizError::fetch("test definition")(BackendError::NotFound("/tests/9".into()));
        assert!(err.to_string().starts_with("failed to load test definition"));
    }
}
