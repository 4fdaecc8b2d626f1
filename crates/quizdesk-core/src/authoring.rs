//! Back-office authoring: drafts of tests, lessons and practices, with the
//! same validation the admin forms apply, and TOML loading for tests.
//!
//! A TOML test file looks like:
//!
//! ```toml
//! [test]
//! lesson_id = 3
//! title = "Ownership"
//! type = "single"
//! allow_retake = false
//!
//! [[questions]]
//! question = "Who frees a Box?"
//! options = ["the owner", "the GC"]
//! correct = 0
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ValidationError;
use crate::model::{Answer, LessonId, TestKind};

/// Body of `POST /admin/tests` and `PUT /admin/tests/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestDraft {
    pub lesson_id: Option<LessonId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: TestKind,
    #[serde(default)]
    pub allow_retake: bool,
    pub questions: Vec<QuestionDraft>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDraft {
    #[serde(rename = "question")]
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: Answer,
    pub order: u32,
}

impl TestDraft {
    /// Check the draft the way the back-office form does, reporting the
    /// first problem found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.lesson_id.map_or(true, |id| id == 0) {
            return Err(ValidationError::MissingLesson);
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        if self.questions.is_empty() {
            return Err(ValidationError::EmptyTest);
        }

        for (i, q) in self.questions.iter().enumerate() {
            let position = i + 1;
            if q.text.trim().is_empty() {
                return Err(ValidationError::MissingQuestionText { position });
            }
            if q.options.len() < 2 {
                return Err(ValidationError::TooFewOptions { position });
            }
            if q.options.iter().any(|o| o.trim().is_empty()) {
                return Err(ValidationError::BlankOption { position });
            }
            let in_range = q.correct_answer.indices().iter().all(|&i| i < q.options.len());
            let well_formed = match &q.correct_answer {
                Answer::Single(_) => self.kind == TestKind::Single,
                Answer::Multiple(set) => self.kind == TestKind::Multiple && !set.is_empty(),
            };
            if !in_range || !well_formed {
                return Err(ValidationError::InvalidCorrectAnswer { position });
            }
        }
        Ok(())
    }
}

/// Body of `POST /admin/lessons` and `PUT /admin/lessons/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LessonDraft {
    pub number: u32,
    pub topic: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(default, serialize_with = "json_array_string", skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, serialize_with = "json_array_string", skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<String>,
    #[serde(default, serialize_with = "json_array_string", skip_serializing_if = "Vec::is_empty")]
    pub video_files: Vec<String>,
}

impl LessonDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.number == 0 {
            return Err(ValidationError::InvalidLessonNumber);
        }
        if self.topic.trim().is_empty() {
            return Err(ValidationError::MissingTopic);
        }
        Ok(())
    }
}

/// Body of `POST /admin/practices` and `PUT /admin/practices/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PracticeDraft {
    pub lesson_id: Option<LessonId>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

impl PracticeDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.lesson_id.map_or(true, |id| id == 0) {
            return Err(ValidationError::MissingLesson);
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        Ok(())
    }
}

/// Material lists are stored as a JSON array inside a string.
fn json_array_string<S: Serializer>(items: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    let encoded = serde_json::to_string(items).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&encoded)
}

/// Intermediate TOML structure for test files.
#[derive(Debug, Deserialize)]
struct TomlTestFile {
    test: TomlTestHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlTestHeader {
    #[serde(default)]
    lesson_id: Option<LessonId>,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "type", default = "default_kind_str")]
    kind: String,
    #[serde(default)]
    allow_retake: bool,
}

fn default_kind_str() -> String {
    "single".to_string()
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    question: String,
    options: Vec<String>,
    correct: Answer,
    #[serde(default)]
    order: Option<u32>,
}

/// Parse a TOML test file into a `TestDraft`.
pub fn parse_test_draft(path: &Path) -> Result<TestDraft> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read test file: {}", path.display()))?;

    parse_test_draft_str(&content, path)
}

/// Parse a TOML string into a `TestDraft` (useful for testing).
pub fn parse_test_draft_str(content: &str, source_path: &Path) -> Result<TestDraft> {
    let parsed: TomlTestFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let kind: TestKind = parsed
        .test
        .kind
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}", e))?;

    let questions = parsed
        .questions
        .into_iter()
        .enumerate()
        .map(|(i, q)| QuestionDraft {
            text: q.question,
            options: q.options,
            correct_answer: q.correct,
            order: q.order.unwrap_or(i as u32 + 1),
        })
        .collect();

    Ok(TestDraft {
        lesson_id: parsed.test.lesson_id,
        title: parsed.test.title,
        description: parsed.test.description,
        kind,
        allow_retake: parsed.test.allow_retake,
        questions,
    })
}
