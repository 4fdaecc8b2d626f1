//! Take test example: drive a full attempt against the in-memory backend.
//!
//! This example shows the library flow the CLI uses: load a test session,
//! fill the draft, submit, and present the tier.
//!
//! ```bash
//! cargo run -p quizdesk-client --example take_test
//! ```

use quizdesk_client::MockBackend;
use quizdesk_core::gate::GateState;
use quizdesk_core::model::{Answer, Question, Role, Test, TestKind, User};
use quizdesk_core::tier::format_score;
use quizdesk_core::{Session, TestSession};

fn sample_test() -> Test {
    let question = |id: u64, text: &str, options: &[&str], correct: usize| Question {
        id,
        test_id: 1,
        text: text.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_answer: Some(Answer::Single(correct)),
        order: id as u32,
    };

    Test {
        id: 1,
        lesson_id: 3,
        title: "Ownership".into(),
        description: Some("Moves and borrows".into()),
        kind: TestKind::Single,
        allow_retake: true,
        created_at: None,
        updated_at: None,
        lesson: None,
        questions: vec![
            question(1, "Who frees a Box?", &["the owner", "the GC"], 0),
            question(2, "Is String Copy?", &["yes", "no"], 1),
            question(3, "How many &mut at once?", &["one", "many"], 0),
        ],
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let backend = MockBackend::new(5).with_test(sample_test());
    let session = Session::new(User {
        id: 5,
        name: "Ann".into(),
        email: "ann@example.org".into(),
        role: Role::Student,
        created_at: None,
    });

    let mut flow = TestSession::load(&backend, &session, 1).await?;
    println!(
        "Loaded \"{}\" ({} questions), gate: {}",
        flow.test().title,
        flow.test().questions.len(),
        flow.gate().state().label()
    );

    // Answer two of three correctly
    flow.draft_mut().select(1, 0)?;
    flow.draft_mut().select(2, 0)?;
    flow.draft_mut().select(3, 0)?;

    let outcome = flow.submit().await?;
    println!(
        "Attempt {}: {} -> {} ({})",
        outcome.attempt.id,
        format_score(outcome.attempt.score),
        outcome.tier,
        outcome.tier.message()
    );

    if flow.retake() {
        println!("Retakes are allowed; the draft has been cleared.");
    }
    if let GateState::Eligible { previous: Some(previous) } = flow.gate().state() {
        println!("Previous score on record: {}", format_score(previous.score));
    }

    Ok(())
}
