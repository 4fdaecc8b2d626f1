//! Core data model types for quizdesk.
//!
//! These mirror the portal backend's JSON resources. Loosely typed fields on
//! the wire (options and answers stored as JSON inside a string) are decoded
//! once here into typed values.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::{Deserialize, Serialize};

pub type TestId = u64;
pub type QuestionId = u64;
pub type AttemptId = u64;
pub type GradeId = u64;
pub type UserId = u64;
pub type LessonId = u64;
pub type PracticeId = u64;
pub type PracticeSubmitId = u64;
pub type PracticeGradeId = u64;

/// Whether each question takes one option or a set of options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    #[default]
    Single,
    Multiple,
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestKind::Single => write!(f, "single"),
            TestKind::Multiple => write!(f, "multiple"),
        }
    }
}

impl FromStr for TestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(TestKind::Single),
            "multiple" | "multi" => Ok(TestKind::Multiple),
            other => Err(format!("unknown test type: {other}")),
        }
    }
}

/// A selected answer for one question.
///
/// Serialized as a bare index (`1`) or a list of indices (`[0, 2]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Single(usize),
    Multiple(BTreeSet<usize>),
}

impl Answer {
    /// The test kind this answer belongs to.
    pub fn kind(&self) -> TestKind {
        match self {
            Answer::Single(_) => TestKind::Single,
            Answer::Multiple(_) => TestKind::Multiple,
        }
    }

    /// Every option index referenced by this answer.
    pub fn indices(&self) -> Vec<usize> {
        match self {
            Answer::Single(i) => vec![*i],
            Answer::Multiple(set) => set.iter().copied().collect(),
        }
    }
}

/// Short lesson reference embedded in tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonSummary {
    pub id: LessonId,
    #[serde(default)]
    pub number: u32,
    pub topic: String,
}

/// One question of a test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(default)]
    pub test_id: TestId,
    /// Question text.
    #[serde(rename = "question")]
    pub text: String,
    /// Answer options in display order.
    #[serde(deserialize_with = "embedded_json", default)]
    pub options: Vec<String>,
    /// Only present for administrators; stripped before test-taking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<Answer>,
    #[serde(default)]
    pub order: u32,
}

/// A test definition as served by `GET /tests/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Test {
    pub id: TestId,
    pub lesson_id: LessonId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: TestKind,
    #[serde(default)]
    pub allow_retake: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub lesson: Option<LessonSummary>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub questions: Vec<Question>,
}

impl Test {
    /// Sort questions by their `order` field. Ties keep server order.
    pub fn sort_questions(&mut self) {
        self.questions.sort_by_key(|q| q.order);
    }

    /// Drop every answer key so grading data never reaches a test taker.
    pub fn without_answer_keys(mut self) -> Self {
        for q in &mut self.questions {
            q.correct_answer = None;
        }
        self
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// Answers of one attempt, keyed by question id.
///
/// On the wire the keys are strings and the whole map is usually embedded
/// in a JSON string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet(pub BTreeMap<QuestionId, Answer>);

impl AnswerSheet {
    pub fn get(&self, question_id: QuestionId) -> Option<&Answer> {
        self.0.get(&question_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encode as the JSON string the backend stores.
    pub fn to_json_string(&self) -> String {
        // Integer keys and plain enums cannot fail to serialize.
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

/// A server-confirmed, server-scored attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    pub id: AttemptId,
    pub user_id: UserId,
    pub test_id: TestId,
    /// Decoded per record; a sheet that does not decode is left empty.
    #[serde(deserialize_with = "lenient_embedded_json", default)]
    pub answers: AnswerSheet,
    /// Percentage in `[0, 100]`, computed by the server.
    pub score: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<Box<Test>>,
}

/// An instructor-assigned grade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grade {
    pub id: GradeId,
    pub user_id: UserId,
    pub test_id: TestId,
    #[serde(default)]
    pub attempt_id: Option<AttemptId>,
    pub grade: f64,
    #[serde(default)]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<Box<Test>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt: Option<Box<Attempt>>,
}

/// Payload for creating or updating a grade.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GradeInput {
    pub user_id: UserId,
    pub test_id: TestId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt_id: Option<AttemptId>,
    pub grade: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /tests/{id}/attempt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptSubmission {
    /// The answer sheet encoded as a JSON string.
    pub answers: String,
}

/// A lesson with its study materials.
///
/// Image, document and video URL lists are stored as JSON arrays inside
/// strings on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,
    pub number: u32,
    pub topic: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(deserialize_with = "embedded_json", default)]
    pub images: Vec<String>,
    #[serde(deserialize_with = "embedded_json", default)]
    pub documents: Vec<String>,
    #[serde(deserialize_with = "embedded_json", default)]
    pub video_files: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A practice assignment: a task file to download and a link to hand in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Practice {
    pub id: PracticeId,
    pub lesson_id: LessonId,
    pub title: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub lesson: Option<LessonSummary>,
}

/// A handed-in practice solution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeSubmit {
    pub id: PracticeSubmitId,
    pub user_id: UserId,
    pub practice_id: PracticeId,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub practice: Option<Box<Practice>>,
}

/// An instructor grade for a practice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeGrade {
    pub id: PracticeGradeId,
    pub user_id: UserId,
    pub practice_id: PracticeId,
    #[serde(default)]
    pub submit_id: Option<PracticeSubmitId>,
    pub grade: f64,
    #[serde(default)]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub practice: Option<Box<Practice>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit: Option<Box<PracticeSubmit>>,
}

/// Payload for creating or updating a practice grade.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PracticeGradeInput {
    pub user_id: UserId,
    pub practice_id: PracticeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_id: Option<PracticeSubmitId>,
    pub grade: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Body of `POST /practices/{id}/submit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeSubmission {
    pub file_url: String,
}

/// Accept either a JSON document embedded in a string or the inline value.
///
/// Empty strings and `null` decode to the default value.
fn embedded_json<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(T::default()),
        serde_json::Value::String(s) if s.trim().is_empty() => Ok(T::default()),
        serde_json::Value::String(s) => serde_json::from_str(&s).map_err(D::Error::custom),
        inline => serde_json::from_value(inline).map_err(D::Error::custom),
    }
}

/// Like [`embedded_json`], but a value that does not decode yields the
/// default instead of failing the enclosing document.
fn lenient_embedded_json<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let decoded: Result<T, serde_json::Error> = embedded_json(value);
    Ok(decoded.unwrap_or_else(|e| {
        tracing::warn!("ignoring undecodable answers: {e}");
        T::default()
    }))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display_and_parse() {
        assert_eq!(TestKind::Single.to_string(), "single");
        assert_eq!("Multiple".parse::<TestKind>().unwrap(), TestKind::Multiple);
        assert!("essay".parse::<TestKind>().is_err());
    }

    #[test]
    fn decodes_options_embedded_in_string() {
        let json = r#"{
            "id": 3, "test_id": 1, "question": "Capital of France?",
            "options": "[\"Paris\",\"Lyon\"]", "correct_answer": 0, "order": 2
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.options, vec!["Paris", "Lyon"]);
        assert_eq!(q.correct_answer, Some(Answer::Single(0)));
    }

    #[test]
    fn decodes_inline_options() {
        let json = r#"{"id": 3, "question": "Q", "options": ["a", "b", "c"]}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.options.len(), 3);
        assert!(q.correct_answer.is_none());
    }

    #[test]
    fn malformed_embedded_options_is_an_error() {
        let json = r#"{"id": 3, "question": "Q", "options": "[not json"}"#;
        assert!(serde_json::from_str::<Question>(json).is_err());
    }

    #[test]
    fn test_defaults_and_sorting() {
        let json = r#"{
            "id": 7, "lesson_id": 2, "title": "Basics", "type": "single",
            "questions": [
                {"id": 2, "question": "second", "options": "[\"a\",\"b\"]", "order": 2},
                {"id": 1, "question": "first", "options": "[\"a\",\"b\"]", "order": 1}
            ]
        }"#;
        let mut test: Test = serde_json::from_str(json).unwrap();
        assert!(!test.allow_retake);
        test.sort_questions();
        assert_eq!(test.questions[0].text, "first");
    }

    #[test]
    fn null_questions_decode_as_empty() {
        let json = r#"{"id": 7, "lesson_id": 2, "title": "Empty", "questions": null}"#;
        let test: Test = serde_json::from_str(json).unwrap();
        assert!(test.questions.is_empty());
        assert_eq!(test.kind, TestKind::Single);
    }

    #[test]
    fn answer_keys_are_stripped() {
        let json = r#"{
            "id": 7, "lesson_id": 2, "title": "Keys",
            "questions": [{"id": 1, "question": "q", "options": "[\"a\",\"b\"]", "correct_answer": 1}]
        }"#;
        let test: Test = serde_json::from_str(json).unwrap();
        let test = test.without_answer_keys();
        assert!(test.questions[0].correct_answer.is_none());
    }

    #[test]
    fn attempt_answers_decode_from_string() {
        let json = r#"{
            "id": 11, "user_id": 5, "test_id": 7,
            "answers": "{\"1\":0,\"2\":[0,2]}",
            "score": 50.0, "created_at": "2025-03-01T10:00:00Z"
        }"#;
        let attempt: Attempt = serde_json::from_str(json).unwrap();
        assert_eq!(attempt.answers.get(1), Some(&Answer::Single(0)));
        assert_eq!(
            attempt.answers.get(2),
            Some(&Answer::Multiple(BTreeSet::from([0, 2])))
        );
    }

    #[test]
    fn undecodable_attempt_answers_keep_the_record() {
        let json = r#"[
            {"id": 1, "user_id": 5, "test_id": 2, "answers": "{\"q1\":0}",
             "score": 40.0, "created_at": "2025-03-01T10:00:00Z"},
            {"id": 2, "user_id": 5, "test_id": 7, "answers": "{\"1\":1}",
             "score": 100.0, "created_at": "2025-03-02T10:00:00Z"}
        ]"#;
        let attempts: Vec<Attempt> = serde_json::from_str(json).unwrap();
        assert_eq!(attempts.len(), 2);
        assert!(attempts[0].answers.is_empty());
        assert_eq!(attempts[0].score, 40.0);
        assert_eq!(attempts[1].answers.get(1), Some(&Answer::Single(1)));
    }

    #[test]
    fn lesson_materials_decode_from_strings() {
        let json = r#"{
            "id": 3, "number": 2, "topic": "Ownership", "content": "Text",
            "images": "[\"https://cdn.example.org/a.png\"]",
            "documents": "", "video_files": null
        }"#;
        let lesson: Lesson = serde_json::from_str(json).unwrap();
        assert_eq!(lesson.images, vec!["https://cdn.example.org/a.png"]);
        assert!(lesson.documents.is_empty());
        assert!(lesson.video_files.is_empty());
    }

    #[test]
    fn practice_grade_with_nested_submit() {
        let json = r#"{
            "id": 4, "user_id": 5, "practice_id": 2, "submit_id": 8, "grade": 4.5,
            "created_at": "2025-03-04T12:00:00Z",
            "submit": {"id": 8, "user_id": 5, "practice_id": 2,
                       "file_url": "https://files.example.org/hw.zip",
                       "created_at": "2025-03-03T12:00:00Z"}
        }"#;
        let grade: PracticeGrade = serde_json::from_str(json).unwrap();
        assert_eq!(grade.submit_id, Some(8));
        assert!(grade.comment.is_none());
        assert_eq!(grade.submit.unwrap().file_url, "https://files.example.org/hw.zip");
    }

    #[test]
    fn answer_sheet_encodes_string_keys() {
        let mut sheet = AnswerSheet::default();
        sheet.0.insert(1, Answer::Single(0));
        sheet.0.insert(2, Answer::Multiple(BTreeSet::from([1, 3])));
        assert_eq!(sheet.to_json_string(), r#"{"1":0,"2":[1,3]}"#);
    }
}
