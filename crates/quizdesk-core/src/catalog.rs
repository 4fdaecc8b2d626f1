//! Test catalog helpers: search and the per-user overview.

use serde::Serialize;

use crate::model::{Attempt, Grade, Test};
use crate::tier::ResultTier;

/// Case-insensitive substring search over title, description and lesson
/// topic. A blank query matches every test.
pub fn search_tests<'a>(tests: &'a [Test], query: &str) -> Vec<&'a Test> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return tests.iter().collect();
    }

    tests
        .iter()
        .filter(|t| {
            t.title.to_lowercase().contains(&needle)
                || t.description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
                || t.lesson
                    .as_ref()
                    .is_some_and(|l| l.topic.to_lowercase().contains(&needle))
        })
        .collect()
}

/// One row of the tests page: the test with the user's attempt and grade.
#[derive(Debug, Clone, Serialize)]
pub struct TestOverview {
    pub test: Test,
    pub attempt: Option<Attempt>,
    pub grade: Option<Grade>,
}

impl TestOverview {
    /// Pair every test with the first attempt and first grade found for it.
    pub fn build(tests: Vec<Test>, attempts: &[Attempt], grades: &[Grade]) -> Vec<Self> {
        tests
            .into_iter()
            .map(|test| {
                let attempt = attempts.iter().find(|a| a.test_id == test.id).cloned();
                let grade = grades.iter().find(|g| g.test_id == test.id).cloned();
                Self {
                    test,
                    attempt,
                    grade,
                }
            })
            .collect()
    }

    pub fn status(&self) -> &'static str {
        match (&self.attempt, self.test.allow_retake) {
            (None, _) => "not started",
            (Some(_), true) => "retake available",
            (Some(_), false) => "completed",
        }
    }

    pub fn tier(&self) -> Option<ResultTier> {
        self.attempt.as_ref().map(|a| ResultTier::from_score(a.score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerSheet, LessonSummary};
    use chrono::Utc;

    fn make_test(id: u64, title: &str, description: Option<&str>, topic: &str) -> Test {
        Test {
            id,
            lesson_id: 1,
            title: title.into(),
            description: description.map(Into::into),
            kind: Default::default(),
            allow_retake: false,
            created_at: None,
            updated_at: None,
            lesson: Some(LessonSummary {
                id: 1,
                number: 1,
                topic: topic.into(),
            }),
            questions: vec![],
        }
    }

    fn catalog() -> Vec<Test> {
        vec![
            make_test(1, "Borrowing", Some("References and lifetimes"), "Ownership"),
            make_test(2, "Iterators", None, "Closures"),
            make_test(3, "Async basics", Some("Futures"), "Concurrency"),
        ]
    }

    #[test]
    fn blank_query_matches_all() {
        assert_eq!(search_tests(&catalog(), "  ").len(), 3);
    }

    #[test]
    fn matches_title_description_and_topic() {
        let tests = catalog();
        let ids = |q: &str| search_tests(&tests, q).iter().map(|t| t.id).collect::<Vec<_>>();
        assert_eq!(ids("iter"), vec![2]);
        assert_eq!(ids("LIFETIMES"), vec![1]);
        assert_eq!(ids("concurrency"), vec![3]);
        assert!(ids("macros").is_empty());
    }

    #[test]
    fn overview_pairs_attempts_and_grades() {
        let attempts = vec![Attempt {
            id: 9,
            user_id: 1,
            test_id: 2,
            answers: AnswerSheet::default(),
            score: 75.0,
            created_at: Utc::now(),
            test: None,
        }];
        let rows = TestOverview::build(catalog(), &attempts, &[]);
        assert_eq!(rows[0].status(), "not started");
        assert_eq!(rows[1].status(), "completed");
        assert_eq!(rows[1].tier(), Some(ResultTier::Good));
        assert!(rows[1].grade.is_none());
    }
}
