//! `quizdesk validate-test` and the `quizdesk admin` commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use quizdesk_core::authoring::{parse_test_draft, LessonDraft, PracticeDraft, TestDraft};
use quizdesk_core::session::AdminConsole;
use quizdesk_core::tier::format_score;

/// Parse and check a test file locally.
pub fn validate(file: PathBuf) -> Result<()> {
    let draft = load_draft(&file)?;
    println!(
        "Test file valid: \"{}\" ({} question(s), {} choice)",
        draft.title,
        draft.questions.len(),
        draft.kind
    );
    Ok(())
}

fn load_draft(file: &Path) -> Result<TestDraft> {
    let draft = parse_test_draft(file)?;
    draft
        .validate()
        .with_context(|| format!("invalid test file: {}", file.display()))?;
    Ok(draft)
}

pub async fn create_test(config_path: Option<PathBuf>, file: PathBuf) -> Result<()> {
    let draft = load_draft(&file)?;
    let backend = super::connect(config_path)?;
    let session = super::session(&backend).await?;
    let admin = AdminConsole::new(&backend, &session)?;

    let test = admin.create_test(&draft).await?;
    println!("Created test {}: {}", test.id, test.title);
    Ok(())
}

pub async fn update_test(config_path: Option<PathBuf>, id: u64, file: PathBuf) -> Result<()> {
    let draft = load_draft(&file)?;
    let backend = super::connect(config_path)?;
    let session = super::session(&backend).await?;
    let admin = AdminConsole::new(&backend, &session)?;

    let test = admin.update_test(id, &draft).await?;
    println!("Updated test {}: {}", test.id, test.title);
    Ok(())
}

pub async fn delete_test(config_path: Option<PathBuf>, id: u64) -> Result<()> {
    let backend = super::connect(config_path)?;
    let session = super::session(&backend).await?;
    AdminConsole::new(&backend, &session)?.delete_test(id).await?;
    println!("Deleted test {id}");
    Ok(())
}

pub async fn attempts(config_path: Option<PathBuf>) -> Result<()> {
    let backend = super::connect(config_path)?;
    let session = super::session(&backend).await?;
    let attempts = AdminConsole::new(&backend, &session)?.attempts().await?;

    if attempts.is_empty() {
        println!("No attempts.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "User", "Test", "Score", "Submitted"]);
    for attempt in &attempts {
        let title = attempt
            .test
            .as_ref()
            .map(|t| t.title.clone())
            .unwrap_or_else(|| attempt.test_id.to_string());
        table.add_row(vec![
            Cell::new(attempt.id),
            Cell::new(attempt.user_id),
            Cell::new(title),
            Cell::new(format_score(attempt.score)),
            Cell::new(attempt.created_at.format("%Y-%m-%d %H:%M")),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn allow_retake(config_path: Option<PathBuf>, attempt: u64) -> Result<()> {
    let backend = super::connect(config_path)?;
    let session = super::session(&backend).await?;
    AdminConsole::new(&backend, &session)?
        .allow_retake(attempt)
        .await?;
    println!("Deleted attempt {attempt}; its owner may take the test again.");
    Ok(())
}

pub async fn grade(
    config_path: Option<PathBuf>,
    attempt: u64,
    grade: f64,
    comment: Option<String>,
) -> Result<()> {
    let backend = super::connect(config_path)?;
    let session = super::session(&backend).await?;
    let admin = AdminConsole::new(&backend, &session)?;

    let target = admin
        .attempts()
        .await?
        .into_iter()
        .find(|a| a.id == attempt)
        .with_context(|| format!("attempt {attempt} not found"))?;

    let created = admin.grade_attempt(&target, grade, comment).await?;
    println!(
        "Graded attempt {attempt} (user {}, test {}): {}",
        created.user_id, created.test_id, created.grade
    );
    Ok(())
}

pub async fn delete_grade(config_path: Option<PathBuf>, id: u64) -> Result<()> {
    let backend = super::connect(config_path)?;
    let session = super::session(&backend).await?;
    AdminConsole::new(&backend, &session)?
        .delete_grade(id)
        .await?;
    println!("Deleted grade {id}");
    Ok(())
}

pub async fn create_lesson(config_path: Option<PathBuf>, draft: LessonDraft) -> Result<()> {
    let backend = super::connect(config_path)?;
    let session = super::session(&backend).await?;
    let lesson = AdminConsole::new(&backend, &session)?
        .create_lesson(&draft)
        .await?;
    println!("Created lesson {}: {}. {}", lesson.id, lesson.number, lesson.topic);
    Ok(())
}

pub async fn update_lesson(config_path: Option<PathBuf>, id: u64, draft: LessonDraft) -> Result<()> {
    let backend = super::connect(config_path)?;
    let session = super::session(&backend).await?;
    let lesson = AdminConsole::new(&backend, &session)?
        .update_lesson(id, &draft)
        .await?;
    println!("Updated lesson {}: {}. {}", lesson.id, lesson.number, lesson.topic);
    Ok(())
}

pub async fn delete_lesson(config_path: Option<PathBuf>, id: u64) -> Result<()> {
    let backend = super::connect(config_path)?;
    let session = super::session(&backend).await?;
    AdminConsole::new(&backend, &session)?
        .delete_lesson(id)
        .await?;
    println!("Deleted lesson {id}");
    Ok(())
}

pub async fn create_practice(config_path: Option<PathBuf>, draft: PracticeDraft) -> Result<()> {
    let backend = super::connect(config_path)?;
    let session = super::session(&backend).await?;
    let practice = AdminConsole::new(&backend, &session)?
        .create_practice(&draft)
        .await?;
    println!("Created practice {}: {}", practice.id, practice.title);
    Ok(())
}

pub async fn update_practice(
    config_path: Option<PathBuf>,
    id: u64,
    draft: PracticeDraft,
) -> Result<()> {
    let backend = super::connect(config_path)?;
    let session = super::session(&backend).await?;
    let practice = AdminConsole::new(&backend, &session)?
        .update_practice(id, &draft)
        .await?;
    println!("Updated practice {}: {}", practice.id, practice.title);
    Ok(())
}

pub async fn delete_practice(config_path: Option<PathBuf>, id: u64) -> Result<()> {
    let backend = super::connect(config_path)?;
    let session = super::session(&backend).await?;
    AdminConsole::new(&backend, &session)?
        .delete_practice(id)
        .await?;
    println!("Deleted practice {id}");
    Ok(())
}

pub async fn practice_submits(config_path: Option<PathBuf>) -> Result<()> {
    let backend = super::connect(config_path)?;
    let session = super::session(&backend).await?;
    let submits = AdminConsole::new(&backend, &session)?
        .practice_submits()
        .await?;

    if submits.is_empty() {
        println!("No practice submissions.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "User", "Practice", "File", "Submitted"]);
    for submit in &submits {
        let title = submit
            .practice
            .as_ref()
            .map(|p| p.title.clone())
            .unwrap_or_else(|| submit.practice_id.to_string());
        table.add_row(vec![
            Cell::new(submit.id),
            Cell::new(submit.user_id),
            Cell::new(title),
            Cell::new(&submit.file_url),
            Cell::new(submit.created_at.format("%Y-%m-%d %H:%M")),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn grade_practice(
    config_path: Option<PathBuf>,
    submit: u64,
    grade: f64,
    comment: Option<String>,
) -> Result<()> {
    let backend = super::connect(config_path)?;
    let session = super::session(&backend).await?;
    let admin = AdminConsole::new(&backend, &session)?;

    let target = admin
        .practice_submits()
        .await?
        .into_iter()
        .find(|s| s.id == submit)
        .with_context(|| format!("practice submission {submit} not found"))?;

    let created = admin.grade_submit(&target, grade, comment).await?;
    println!(
        "Graded submission {submit} (user {}, practice {}): {}",
        created.user_id, created.practice_id, created.grade
    );
    Ok(())
}

pub async fn delete_practice_grade(config_path: Option<PathBuf>, id: u64) -> Result<()> {
    let backend = super::connect(config_path)?;
    let session = super::session(&backend).await?;
    AdminConsole::new(&backend, &session)?
        .delete_practice_grade(id)
        .await?;
    println!("Deleted practice grade {id}");
    Ok(())
}
