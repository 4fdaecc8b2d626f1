//! REST implementation of the backend traits.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use quizdesk_core::authoring::{LessonDraft, PracticeDraft, TestDraft};
use quizdesk_core::error::BackendError;
use quizdesk_core::model::{
    Attempt, AttemptId, AttemptSubmission, Grade, GradeId, GradeInput, Lesson, LessonId,
    Practice, PracticeGrade, PracticeGradeId, PracticeGradeInput, PracticeId, PracticeSubmission,
    PracticeSubmit, PracticeSubmitId, Test, TestId, User,
};
use quizdesk_core::session::Session;
use quizdesk_core::traits::{AdminBackend, PortalBackend};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Portal backend reached over HTTP with an optional bearer token.
pub struct HttpBackend {
    base_url: String,
    token: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

/// Response of the login and register endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: String,
}

impl HttpBackend {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            timeout_secs,
            client,
        })
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// `POST /auth/login`; keeps the returned token for later calls.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, email: &str, password: &str) -> Result<AuthResponse, BackendError> {
        let req = self
            .request(Method::POST, "/auth/login")
            .json(&LoginRequest { email, password });
        let auth: AuthResponse = self.send(req).await?;
        self.token = Some(auth.token.clone());
        Ok(auth)
    }

    /// `POST /auth/register`; keeps the returned token for later calls.
    #[instrument(skip(self, password))]
    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, BackendError> {
        let req = self
            .request(Method::POST, "/auth/register")
            .json(&RegisterRequest {
                name,
                email,
                password,
            });
        let auth: AuthResponse = self.send(req).await?;
        self.token = Some(auth.token.clone());
        Ok(auth)
    }

    /// `GET /users/me`.
    pub async fn current_user(&self) -> Result<User, BackendError> {
        self.send(self.request(Method::GET, "/users/me")).await
    }

    /// Resolve the token into a session for the flows.
    pub async fn session(&self) -> Result<Session, BackendError> {
        Ok(Session::new(self.current_user().await?))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .header("content-type", "application/json");
        if let Some(token) = &self.token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        req
    }

    async fn execute(&self, req: RequestBuilder) -> Result<String, BackendError> {
        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout(self.timeout_secs)
            } else {
                BackendError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        let url = response.url().path().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Network(format!("failed to read response body: {e}")))?;
        tracing::debug!(%status, %url, "backend responded");

        if status.is_success() {
            return Ok(body);
        }

        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body);
        Err(match status {
            StatusCode::UNAUTHORIZED => BackendError::Unauthorized(message),
            StatusCode::FORBIDDEN => BackendError::Forbidden(message),
            StatusCode::NOT_FOUND => BackendError::NotFound(if message.is_empty() {
                url
            } else {
                message
            }),
            _ => BackendError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, BackendError> {
        let body = self.execute(req).await?;
        serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn send_empty(&self, req: RequestBuilder) -> Result<(), BackendError> {
        self.execute(req).await.map(|_| ())
    }
}

#[async_trait]
impl PortalBackend for HttpBackend {
    #[instrument(skip(self))]
    async fn list_tests(&self) -> Result<Vec<Test>, BackendError> {
        self.send(self.request(Method::GET, "/tests")).await
    }

    #[instrument(skip(self))]
    async fn get_test(&self, id: TestId) -> Result<Test, BackendError> {
        self.send(self.request(Method::GET, &format!("/tests/{id}")))
            .await
    }

    #[instrument(skip(self, submission))]
    async fn create_attempt(
        &self,
        test_id: TestId,
        submission: &AttemptSubmission,
    ) -> Result<Attempt, BackendError> {
        let req = self
            .request(Method::POST, &format!("/tests/{test_id}/attempt"))
            .json(submission);
        self.send(req).await
    }

    #[instrument(skip(self))]
    async fn my_attempts(&self) -> Result<Vec<Attempt>, BackendError> {
        self.send(self.request(Method::GET, "/tests/attempts")).await
    }

    #[instrument(skip(self))]
    async fn get_attempt(&self, id: AttemptId) -> Result<Attempt, BackendError> {
        self.send(self.request(Method::GET, &format!("/tests/attempts/{id}")))
            .await
    }

    #[instrument(skip(self))]
    async fn my_grades(&self) -> Result<Vec<Grade>, BackendError> {
        self.send(self.request(Method::GET, "/grades/tests")).await
    }

    #[instrument(skip(self))]
    async fn list_lessons(&self) -> Result<Vec<Lesson>, BackendError> {
        self.send(self.request(Method::GET, "/lessons")).await
    }

    #[instrument(skip(self))]
    async fn get_lesson(&self, id: LessonId) -> Result<Lesson, BackendError> {
        self.send(self.request(Method::GET, &format!("/lessons/{id}")))
            .await
    }

    #[instrument(skip(self))]
    async fn list_practices(&self) -> Result<Vec<Practice>, BackendError> {
        self.send(self.request(Method::GET, "/practices")).await
    }

    #[instrument(skip(self))]
    async fn get_practice(&self, id: PracticeId) -> Result<Practice, BackendError> {
        self.send(self.request(Method::GET, &format!("/practices/{id}")))
            .await
    }

    #[instrument(skip(self, submission))]
    async fn submit_practice(
        &self,
        practice_id: PracticeId,
        submission: &PracticeSubmission,
    ) -> Result<PracticeSubmit, BackendError> {
        let req = self
            .request(Method::POST, &format!("/practices/{practice_id}/submit"))
            .json(submission);
        self.send(req).await
    }

    #[instrument(skip(self))]
    async fn my_practice_submits(&self) -> Result<Vec<PracticeSubmit>, BackendError> {
        self.send(self.request(Method::GET, "/practices/submits"))
            .await
    }

    #[instrument(skip(self))]
    async fn get_practice_submit(
        &self,
        id: PracticeSubmitId,
    ) -> Result<PracticeSubmit, BackendError> {
        self.send(self.request(Method::GET, &format!("/practices/submits/{id}")))
            .await
    }

    #[instrument(skip(self))]
    async fn my_practice_grades(&self) -> Result<Vec<PracticeGrade>, BackendError> {
        self.send(self.request(Method::GET, "/grades/practices"))
            .await
    }
}

#[async_trait]
impl AdminBackend for HttpBackend {
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    async fn create_test(&self, draft: &TestDraft) -> Result<Test, BackendError> {
        self.send(self.request(Method::POST, "/admin/tests").json(draft))
            .await
    }

    #[instrument(skip(self, draft))]
    async fn update_test(&self, id: TestId, draft: &TestDraft) -> Result<Test, BackendError> {
        let req = self
            .request(Method::PUT, &format!("/admin/tests/{id}"))
            .json(draft);
        self.send(req).await
    }

    #[instrument(skip(self))]
    async fn delete_test(&self, id: TestId) -> Result<(), BackendError> {
        self.send_empty(self.request(Method::DELETE, &format!("/admin/tests/{id}")))
            .await
    }

    #[instrument(skip(self))]
    async fn all_attempts(&self) -> Result<Vec<Attempt>, BackendError> {
        self.send(self.request(Method::GET, "/admin/tests/attempts"))
            .await
    }

    #[instrument(skip(self))]
    async fn delete_attempt(&self, id: AttemptId) -> Result<(), BackendError> {
        self.send_empty(self.request(Method::DELETE, &format!("/admin/tests/attempts/{id}")))
            .await
    }

    #[instrument(skip(self, grade))]
    async fn create_grade(&self, grade: &GradeInput) -> Result<Grade, BackendError> {
        self.send(self.request(Method::POST, "/admin/tests/grades").json(grade))
            .await
    }

    #[instrument(skip(self, grade))]
    async fn update_grade(&self, id: GradeId, grade: &GradeInput) -> Result<Grade, BackendError> {
        let req = self
            .request(Method::PUT, &format!("/admin/tests/grades/{id}"))
            .json(grade);
        self.send(req).await
    }

    #[instrument(skip(self))]
    async fn delete_grade(&self, id: GradeId) -> Result<(), BackendError> {
        self.send_empty(self.request(Method::DELETE, &format!("/admin/tests/grades/{id}")))
            .await
    }

    #[instrument(skip(self, draft), fields(number = draft.number))]
    async fn create_lesson(&self, draft: &LessonDraft) -> Result<Lesson, BackendError> {
        self.send(self.request(Method::POST, "/admin/lessons").json(draft))
            .await
    }

    #[instrument(skip(self, draft))]
    async fn update_lesson(
        &self,
        id: LessonId,
        draft: &LessonDraft,
    ) -> Result<Lesson, BackendError> {
        let req = self
            .request(Method::PUT, &format!("/admin/lessons/{id}"))
            .json(draft);
        self.send(req).await
    }

    #[instrument(skip(self))]
    async fn delete_lesson(&self, id: LessonId) -> Result<(), BackendError> {
        self.send_empty(self.request(Method::DELETE, &format!("/admin/lessons/{id}")))
            .await
    }

    #[instrument(skip(self, draft), fields(title = %draft.title))]
    async fn create_practice(&self, draft: &PracticeDraft) -> Result<Practice, BackendError> {
        self.send(self.request(Method::POST, "/admin/practices").json(draft))
            .await
    }

    #[instrument(skip(self, draft))]
    async fn update_practice(
        &self,
        id: PracticeId,
        draft: &PracticeDraft,
    ) -> Result<Practice, BackendError> {
        let req = self
            .request(Method::PUT, &format!("/admin/practices/{id}"))
            .json(draft);
        self.send(req).await
    }

    #[instrument(skip(self))]
    async fn delete_practice(&self, id: PracticeId) -> Result<(), BackendError> {
        self.send_empty(self.request(Method::DELETE, &format!("/admin/practices/{id}")))
            .await
    }

    #[instrument(skip(self))]
    async fn all_practice_submits(&self) -> Result<Vec<PracticeSubmit>, BackendError> {
        self.send(self.request(Method::GET, "/admin/practices/submits"))
            .await
    }

    #[instrument(skip(self, grade))]
    async fn create_practice_grade(
        &self,
        grade: &PracticeGradeInput,
    ) -> Result<PracticeGrade, BackendError> {
        self.send(self.request(Method::POST, "/admin/practices/grades").json(grade))
            .await
    }

    #[instrument(skip(self, grade))]
    async fn update_practice_grade(
        &self,
        id: PracticeGradeId,
        grade: &PracticeGradeInput,
    ) -> Result<PracticeGrade, BackendError> {
        let req = self
            .request(Method::PUT, &format!("/admin/practices/grades/{id}"))
            .json(grade);
        self.send(req).await
    }

    #[instrument(skip(self))]
    async fn delete_practice_grade(&self, id: PracticeGradeId) -> Result<(), BackendError> {
        self.send_empty(self.request(Method::DELETE, &format!("/admin/practices/grades/{id}")))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizdesk_core::model::{Answer, TestKind};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_body() -> serde_json::Value {
        serde_json::json!({
            "id": 7,
            "lesson_id": 2,
            "title": "Ownership",
            "type": "single",
            "allow_retake": false,
            "created_at": "2025-03-01T10:00:00Z",
            "updated_at": "2025-03-01T10:00:00Z",
            "questions": [
                {"id": 1, "test_id": 7, "question": "Q1", "options": "[\"A\",\"B\"]", "correct_answer": 0, "order": 1}
            ]
        })
    }

    fn backend(server: &MockServer, token: Option<&str>) -> HttpBackend {
        HttpBackend::new(&server.uri(), token.map(Into::into), DEFAULT_TIMEOUT_SECS).unwrap()
    }

    #[tokio::test]
    async fn get_test_sends_bearer_and_decodes() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tests/7"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(test_body()))
            .mount(&server)
            .await;

        let test = backend(&server, Some("tok")).get_test(7).await.unwrap();
        assert_eq!(test.kind, TestKind::Single);
        assert_eq!(test.questions[0].options, vec!["A", "B"]);
        assert_eq!(test.questions[0].correct_answer, Some(Answer::Single(0)));
    }

    #[tokio::test]
    async fn create_attempt_posts_answer_string() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/tests/7/attempt"))
            .and(body_json(serde_json::json!({"answers": "{\"1\":0}"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": 40, "user_id": 3, "test_id": 7,
                "answers": "{\"1\":0}", "score": 100.0,
                "created_at": "2025-03-01T10:05:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let submission = AttemptSubmission {
            answers: r#"{"1":0}"#.into(),
        };
        let attempt = backend(&server, None)
            .create_attempt(7, &submission)
            .await
            .unwrap();
        assert_eq!(attempt.id, 40);
        assert_eq!(attempt.score, 100.0);
    }

    #[tokio::test]
    async fn login_stores_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": "fresh",
                "user": {"id": 3, "name": "Ann", "email": "ann@example.org", "role": "student"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/me"))
            .and(header("Authorization", "Bearer fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 3, "name": "Ann", "email": "ann@example.org", "role": "student"
            })))
            .mount(&server)
            .await;

        let mut client = backend(&server, None);
        let auth = client.login("ann@example.org", "pw").await.unwrap();
        assert_eq!(auth.user.id, 3);
        assert_eq!(client.token(), Some("fresh"));

        let session = client.session().await.unwrap();
        assert!(!session.is_admin());
    }

    #[tokio::test]
    async fn unauthorized_maps_to_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tests/attempts"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(serde_json::json!({"error": "token expired"})),
            )
            .mount(&server)
            .await;

        let err = backend(&server, Some("old")).my_attempts().await.unwrap_err();
        assert!(matches!(err, BackendError::Unauthorized(ref m) if m == "token expired"));
    }

    #[tokio::test]
    async fn error_body_message_is_extracted() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/tests/7/attempt"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(serde_json::json!({"error": "test already passed"})),
            )
            .mount(&server)
            .await;

        let submission = AttemptSubmission {
            answers: "{}".into(),
        };
        let err = backend(&server, None)
            .create_attempt(7, &submission)
            .await
            .unwrap_err();
        match err {
            BackendError::Api { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "test already passed");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn not_found_and_plain_text_errors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tests/99"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tests"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let client = backend(&server, None);
        let err = client.get_test(99).await.unwrap_err();
        assert!(matches!(err, BackendError::NotFound(ref p) if p == "/tests/99"));

        let err = client.list_tests().await.unwrap_err();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("internal error"));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/grades/tests"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = backend(&server, None).my_grades().await.unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
    }

    #[tokio::test]
    async fn admin_delete_attempt_route() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/admin/tests/attempts/12"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        backend(&server, Some("admin")).delete_attempt(12).await.unwrap();
    }

    #[tokio::test]
    async fn submit_practice_posts_file_url() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/practices/4/submit"))
            .and(header("Authorization", "Bearer tok"))
            .and(body_json(serde_json::json!({"file_url": "https://files.example.org/s.zip"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": 21, "user_id": 3, "practice_id": 4,
                "file_url": "https://files.example.org/s.zip",
                "created_at": "2025-03-02T09:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let submission = PracticeSubmission {
            file_url: "https://files.example.org/s.zip".into(),
        };
        let submit = backend(&server, Some("tok"))
            .submit_practice(4, &submission)
            .await
            .unwrap();
        assert_eq!(submit.id, 21);
        assert_eq!(submit.practice_id, 4);
    }

    #[tokio::test]
    async fn lesson_materials_and_practice_grades_decode() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/lessons/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 2, "number": 2, "topic": "Traits",
                "content": "Generics and trait objects",
                "images": "[\"https://cdn.example.org/t.png\"]",
                "documents": "", "video_files": null
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/grades/practices"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "id": 1, "user_id": 3, "practice_id": 4, "submit_id": 21,
                "grade": 4.5, "comment": "tidy",
                "created_at": "2025-03-03T09:00:00Z"
            }])))
            .mount(&server)
            .await;

        let client = backend(&server, Some("tok"));
        let lesson = client.get_lesson(2).await.unwrap();
        assert_eq!(lesson.images, vec!["https://cdn.example.org/t.png"]);
        assert!(lesson.documents.is_empty());
        assert!(lesson.video_files.is_empty());

        let grades = client.my_practice_grades().await.unwrap();
        assert_eq!(grades[0].submit_id, Some(21));
        assert_eq!(grades[0].grade, 4.5);
    }

    #[tokio::test]
    async fn admin_lesson_and_practice_routes() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/admin/lessons"))
            .and(body_json(serde_json::json!({
                "number": 3, "topic": "Macros",
                "video_files": "[\"https://cdn.example.org/m.mp4\"]"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": 30, "number": 3, "topic": "Macros",
                "video_files": "[\"https://cdn.example.org/m.mp4\"]"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/admin/practices/8"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/admin/practices/grades/5"))
            .and(body_json(serde_json::json!({
                "user_id": 3, "practice_id": 4, "grade": 3.0
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 5, "user_id": 3, "practice_id": 4, "grade": 3.0,
                "created_at": "2025-03-03T09:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = backend(&server, Some("admin"));
        let draft = LessonDraft {
            number: 3,
            topic: "Macros".into(),
            video_files: vec!["https://cdn.example.org/m.mp4".into()],
            ..Default::default()
        };
        let lesson = client.create_lesson(&draft).await.unwrap();
        assert_eq!(lesson.video_files.len(), 1);

        client.delete_practice(8).await.unwrap();

        let input = PracticeGradeInput {
            user_id: 3,
            practice_id: 4,
            grade: 3.0,
            ..Default::default()
        };
        let grade = client.update_practice_grade(5, &input).await.unwrap();
        assert_eq!(grade.id, 5);
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_error() {
        let client = HttpBackend::new("http://127.0.0.1:1", None, 2).unwrap();
        let err = client.list_tests().await.unwrap_err();
        assert!(matches!(err, BackendError::Network(_) | BackendError::Timeout(_)));
    }

    #[tokio::test]
    async fn truncated_body_is_a_network_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 100\r\n\r\n[{\"id\"")
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let client = HttpBackend::new(&format!("http://{addr}"), None, 5).unwrap();
        let err = client.list_tests().await.unwrap_err();
        assert!(matches!(err, BackendError::Network(ref m) if m.contains("response body")));
    }
}
