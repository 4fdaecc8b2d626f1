//! In-memory backend for testing flows without a server.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use quizdesk_core::authoring::{LessonDraft, PracticeDraft, TestDraft};
use quizdesk_core::error::BackendError;
use quizdesk_core::model::{
    AnswerSheet, Attempt, AttemptId, AttemptSubmission, Grade, GradeId, GradeInput, Lesson,
    LessonId, Practice, PracticeGrade, PracticeGradeId, PracticeGradeInput, PracticeId,
    PracticeSubmission, PracticeSubmit, PracticeSubmitId, Question, Test, TestId, UserId,
};
use quizdesk_core::traits::{AdminBackend, PortalBackend};

#[derive(Default)]
struct State {
    tests: BTreeMap<TestId, Test>,
    attempts: Vec<Attempt>,
    grades: Vec<Grade>,
    lessons: BTreeMap<LessonId, Lesson>,
    practices: BTreeMap<PracticeId, Practice>,
    practice_submits: Vec<PracticeSubmit>,
    practice_grades: Vec<PracticeGrade>,
    next_id: u64,
    failing_submissions: u32,
    fail_attempt_listing: bool,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// A mock portal backend acting for a single user.
///
/// Scores attempts the way the server does: the share of questions whose
/// answer equals the stored answer key, as a percentage.
pub struct MockBackend {
    user_id: UserId,
    state: Mutex<State>,
    /// Number of backend calls made.
    call_count: AtomicU32,
    /// Number of `create_attempt` calls made.
    submit_count: AtomicU32,
}

impl MockBackend {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            state: Mutex::new(State {
                next_id: 100,
                ..Default::default()
            }),
            call_count: AtomicU32::new(0),
            submit_count: AtomicU32::new(0),
        }
    }

    /// Add a test (with answer keys) to the catalog.
    pub fn with_test(self, test: Test) -> Self {
        self.lock().tests.insert(test.id, test);
        self
    }

    /// Add an attempt as if it had been submitted earlier.
    pub fn with_attempt(self, attempt: Attempt) -> Self {
        self.lock().attempts.push(attempt);
        self
    }

    pub fn with_grade(self, grade: Grade) -> Self {
        self.lock().grades.push(grade);
        self
    }

    pub fn with_lesson(self, lesson: Lesson) -> Self {
        self.lock().lessons.insert(lesson.id, lesson);
        self
    }

    pub fn with_practice(self, practice: Practice) -> Self {
        self.lock().practices.insert(practice.id, practice);
        self
    }

    /// Add a practice submission as if it had been handed in earlier.
    pub fn with_practice_submit(self, submit: PracticeSubmit) -> Self {
        self.lock().practice_submits.push(submit);
        self
    }

    pub fn with_practice_grade(self, grade: PracticeGrade) -> Self {
        self.lock().practice_grades.push(grade);
        self
    }

    /// Make the next `n` submissions fail with a network error.
    pub fn fail_next_submissions(&self, n: u32) {
        self.lock().failing_submissions = n;
    }

    /// Make attempt listing fail until reset.
    pub fn fail_attempt_listing(&self, fail: bool) {
        self.lock().fail_attempt_listing = fail;
    }

    /// Get the number of calls made to this backend.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the number of submissions received.
    pub fn submit_count(&self) -> u32 {
        self.submit_count.load(Ordering::Relaxed)
    }

    pub fn attempts(&self) -> Vec<Attempt> {
        self.lock().attempts.clone()
    }

    pub fn practice_submits(&self) -> Vec<PracticeSubmit> {
        self.lock().practice_submits.clone()
    }

    pub fn practice_grades(&self) -> Vec<PracticeGrade> {
        self.lock().practice_grades.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record_call(&self) {
        self.call_count.fetch_add(1, Ordering::Relaxed);
    }
}

fn score(test: &Test, answers: &AnswerSheet) -> f64 {
    if test.questions.is_empty() {
        return 0.0;
    }
    let correct = test
        .questions
        .iter()
        .filter(|q| q.correct_answer.is_some() && q.correct_answer.as_ref() == answers.get(q.id))
        .count();
    correct as f64 * 100.0 / test.questions.len() as f64
}

fn test_from_draft(id: TestId, draft: &TestDraft) -> Test {
    let now = Utc::now();
    Test {
        id,
        lesson_id: draft.lesson_id.unwrap_or_default(),
        title: draft.title.clone(),
        description: Some(draft.description.clone()).filter(|d| !d.is_empty()),
        kind: draft.kind,
        allow_retake: draft.allow_retake,
        created_at: Some(now),
        updated_at: Some(now),
        lesson: None,
        questions: draft
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| Question {
                id: id * 1000 + i as u64 + 1,
                test_id: id,
                text: q.text.clone(),
                options: q.options.clone(),
                correct_answer: Some(q.correct_answer.clone()),
                order: q.order,
            })
            .collect(),
    }
}

fn lesson_from_draft(id: LessonId, draft: &LessonDraft) -> Lesson {
    let now = Utc::now();
    Lesson {
        id,
        number: draft.number,
        topic: draft.topic.clone(),
        content: Some(draft.content.clone()).filter(|c| !c.is_empty()),
        images: draft.images.clone(),
        documents: draft.documents.clone(),
        video_files: draft.video_files.clone(),
        created_at: Some(now),
        updated_at: Some(now),
    }
}

fn practice_from_draft(id: PracticeId, draft: &PracticeDraft) -> Practice {
    let now = Utc::now();
    Practice {
        id,
        lesson_id: draft.lesson_id.unwrap_or_default(),
        title: draft.title.clone(),
        file_url: draft.file_url.clone(),
        created_at: Some(now),
        updated_at: Some(now),
        lesson: None,
    }
}

/// Remove the first item matching `id`, or report it missing.
fn remove_by<T>(
    items: &mut Vec<T>,
    id: u64,
    key: impl Fn(&T) -> u64,
    what: &str,
) -> Result<(), BackendError> {
    let before = items.len();
    items.retain(|item| key(item) != id);
    if items.len() == before {
        return Err(not_found(what, id));
    }
    Ok(())
}

fn not_found(what: &str, id: u64) -> BackendError {
    BackendError::NotFound(format!("{what} {id}"))
}

#[async_trait]
impl PortalBackend for MockBackend {
    async fn list_tests(&self) -> Result<Vec<Test>, BackendError> {
        self.record_call();
        Ok(self
            .lock()
            .tests
            .values()
            .map(|t| Test {
                questions: Vec::new(),
                ..t.clone()
            })
            .collect())
    }

    async fn get_test(&self, id: TestId) -> Result<Test, BackendError> {
        self.record_call();
        self.lock()
            .tests
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("test", id))
    }

    async fn create_attempt(
        &self,
        test_id: TestId,
        submission: &AttemptSubmission,
    ) -> Result<Attempt, BackendError> {
        self.record_call();
        self.submit_count.fetch_add(1, Ordering::Relaxed);

        let mut state = self.lock();
        if state.failing_submissions > 0 {
            state.failing_submissions -= 1;
            return Err(BackendError::Network("connection reset".into()));
        }

        let test = state
            .tests
            .get(&test_id)
            .cloned()
            .ok_or_else(|| not_found("test", test_id))?;
        let answers: AnswerSheet = serde_json::from_str(&submission.answers).map_err(|e| {
            BackendError::Api {
                status: 400,
                message: format!("invalid answers: {e}"),
            }
        })?;

        let attempt = Attempt {
            id: state.next_id(),
            user_id: self.user_id,
            test_id,
            score: score(&test, &answers),
            answers,
            created_at: Utc::now(),
            test: None,
        };
        state.attempts.push(attempt.clone());
        Ok(attempt)
    }

    async fn my_attempts(&self) -> Result<Vec<Attempt>, BackendError> {
        self.record_call();
        let state = self.lock();
        if state.fail_attempt_listing {
            return Err(BackendError::Api {
                status: 503,
                message: "attempts unavailable".into(),
            });
        }
        Ok(state
            .attempts
            .iter()
            .filter(|a| a.user_id == self.user_id)
            .cloned()
            .collect())
    }

    async fn get_attempt(&self, id: AttemptId) -> Result<Attempt, BackendError> {
        self.record_call();
        self.lock()
            .attempts
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| not_found("attempt", id))
    }

    async fn my_grades(&self) -> Result<Vec<Grade>, BackendError> {
        self.record_call();
        Ok(self
            .lock()
            .grades
            .iter()
            .filter(|g| g.user_id == self.user_id)
            .cloned()
            .collect())
    }

    async fn list_lessons(&self) -> Result<Vec<Lesson>, BackendError> {
        self.record_call();
        Ok(self.lock().lessons.values().cloned().collect())
    }

    async fn get_lesson(&self, id: LessonId) -> Result<Lesson, BackendError> {
        self.record_call();
        self.lock()
            .lessons
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("lesson", id))
    }

    async fn list_practices(&self) -> Result<Vec<Practice>, BackendError> {
        self.record_call();
        Ok(self.lock().practices.values().cloned().collect())
    }

    async fn get_practice(&self, id: PracticeId) -> Result<Practice, BackendError> {
        self.record_call();
        self.lock()
            .practices
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("practice", id))
    }

    async fn submit_practice(
        &self,
        practice_id: PracticeId,
        submission: &PracticeSubmission,
    ) -> Result<PracticeSubmit, BackendError> {
        self.record_call();
        self.submit_count.fetch_add(1, Ordering::Relaxed);

        let mut state = self.lock();
        if state.failing_submissions > 0 {
            state.failing_submissions -= 1;
            return Err(BackendError::Network("connection reset".into()));
        }
        if !state.practices.contains_key(&practice_id) {
            return Err(not_found("practice", practice_id));
        }

        let submit = PracticeSubmit {
            id: state.next_id(),
            user_id: self.user_id,
            practice_id,
            file_url: submission.file_url.clone(),
            created_at: Utc::now(),
            practice: None,
        };
        state.practice_submits.push(submit.clone());
        Ok(submit)
    }

    async fn my_practice_submits(&self) -> Result<Vec<PracticeSubmit>, BackendError> {
        self.record_call();
        Ok(self
            .lock()
            .practice_submits
            .iter()
            .filter(|s| s.user_id == self.user_id)
            .cloned()
            .collect())
    }

    async fn get_practice_submit(
        &self,
        id: PracticeSubmitId,
    ) -> Result<PracticeSubmit, BackendError> {
        self.record_call();
        self.lock()
            .practice_submits
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| not_found("practice submission", id))
    }

    async fn my_practice_grades(&self) -> Result<Vec<PracticeGrade>, BackendError> {
        self.record_call();
        Ok(self
            .lock()
            .practice_grades
            .iter()
            .filter(|g| g.user_id == self.user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AdminBackend for MockBackend {
    async fn create_test(&self, draft: &TestDraft) -> Result<Test, BackendError> {
        self.record_call();
        let mut state = self.lock();
        let id = state.next_id();
        let test = test_from_draft(id, draft);
        state.tests.insert(id, test.clone());
        Ok(test)
    }

    async fn update_test(&self, id: TestId, draft: &TestDraft) -> Result<Test, BackendError> {
        self.record_call();
        let mut state = self.lock();
        if !state.tests.contains_key(&id) {
            return Err(not_found("test", id));
        }
        let test = test_from_draft(id, draft);
        state.tests.insert(id, test.clone());
        Ok(test)
    }

    async fn delete_test(&self, id: TestId) -> Result<(), BackendError> {
        self.record_call();
        self.lock()
            .tests
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("test", id))
    }

    async fn all_attempts(&self) -> Result<Vec<Attempt>, BackendError> {
        self.record_call();
        Ok(self.lock().attempts.clone())
    }

    async fn delete_attempt(&self, id: AttemptId) -> Result<(), BackendError> {
        self.record_call();
        remove_by(&mut self.lock().attempts, id, |a| a.id, "attempt")
    }

    async fn create_grade(&self, input: &GradeInput) -> Result<Grade, BackendError> {
        self.record_call();
        let mut state = self.lock();
        let grade = Grade {
            id: state.next_id(),
            user_id: input.user_id,
            test_id: input.test_id,
            attempt_id: input.attempt_id,
            grade: input.grade,
            comment: input.comment.clone(),
            created_at: Utc::now(),
            test: None,
            attempt: None,
        };
        state.grades.push(grade.clone());
        Ok(grade)
    }

    async fn update_grade(&self, id: GradeId, input: &GradeInput) -> Result<Grade, BackendError> {
        self.record_call();
        let mut state = self.lock();
        let grade = state
            .grades
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| not_found("grade", id))?;
        grade.grade = input.grade;
        grade.comment = input.comment.clone();
        Ok(grade.clone())
    }

    async fn delete_grade(&self, id: GradeId) -> Result<(), BackendError> {
        self.record_call();
        remove_by(&mut self.lock().grades, id, |g| g.id, "grade")
    }

    async fn create_lesson(&self, draft: &LessonDraft) -> Result<Lesson, BackendError> {
        self.record_call();
        let mut state = self.lock();
        let id = state.next_id();
        let lesson = lesson_from_draft(id, draft);
        state.lessons.insert(id, lesson.clone());
        Ok(lesson)
    }

    async fn update_lesson(
        &self,
        id: LessonId,
        draft: &LessonDraft,
    ) -> Result<Lesson, BackendError> {
        self.record_call();
        let mut state = self.lock();
        if !state.lessons.contains_key(&id) {
            return Err(not_found("lesson", id));
        }
        let lesson = lesson_from_draft(id, draft);
        state.lessons.insert(id, lesson.clone());
        Ok(lesson)
    }

    async fn delete_lesson(&self, id: LessonId) -> Result<(), BackendError> {
        self.record_call();
        self.lock()
            .lessons
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("lesson", id))
    }

    async fn create_practice(&self, draft: &PracticeDraft) -> Result<Practice, BackendError> {
        self.record_call();
        let mut state = self.lock();
        let id = state.next_id();
        let practice = practice_from_draft(id, draft);
        state.practices.insert(id, practice.clone());
        Ok(practice)
    }

    async fn update_practice(
        &self,
        id: PracticeId,
        draft: &PracticeDraft,
    ) -> Result<Practice, BackendError> {
        self.record_call();
        let mut state = self.lock();
        if !state.practices.contains_key(&id) {
            return Err(not_found("practice", id));
        }
        let practice = practice_from_draft(id, draft);
        state.practices.insert(id, practice.clone());
        Ok(practice)
    }

    async fn delete_practice(&self, id: PracticeId) -> Result<(), BackendError> {
        self.record_call();
        self.lock()
            .practices
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("practice", id))
    }

    async fn all_practice_submits(&self) -> Result<Vec<PracticeSubmit>, BackendError> {
        self.record_call();
        Ok(self.lock().practice_submits.clone())
    }

    async fn create_practice_grade(
        &self,
        input: &PracticeGradeInput,
    ) -> Result<PracticeGrade, BackendError> {
        self.record_call();
        let mut state = self.lock();
        let grade = PracticeGrade {
            id: state.next_id(),
            user_id: input.user_id,
            practice_id: input.practice_id,
            submit_id: input.submit_id,
            grade: input.grade,
            comment: input.comment.clone(),
            created_at: Utc::now(),
            practice: None,
            submit: None,
        };
        state.practice_grades.push(grade.clone());
        Ok(grade)
    }

    async fn update_practice_grade(
        &self,
        id: PracticeGradeId,
        input: &PracticeGradeInput,
    ) -> Result<PracticeGrade, BackendError> {
        self.record_call();
        let mut state = self.lock();
        let grade = state
            .practice_grades
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| not_found("practice grade", id))?;
        grade.grade = input.grade;
        grade.comment = input.comment.clone();
        Ok(grade.clone())
    }

    async fn delete_practice_grade(&self, id: PracticeGradeId) -> Result<(), BackendError> {
        self.record_call();
        remove_by(
            &mut self.lock().practice_grades,
            id,
            |g| g.id,
            "practice grade",
        )
    }
}
