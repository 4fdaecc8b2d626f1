//! `quizdesk practices`, `quizdesk practice` and `quizdesk submit-practice`.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizdesk_core::practice::{load_practice_overview, PracticeSession};

pub async fn list(config_path: Option<PathBuf>) -> Result<()> {
    let backend = super::connect(config_path)?;
    let rows = load_practice_overview(&backend).await?;

    if rows.is_empty() {
        println!("No practices yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Lesson", "Status", "Grade"]);
    for row in &rows {
        let lesson = row
            .practice
            .lesson
            .as_ref()
            .map(|l| format!("{}. {}", l.number, l.topic))
            .unwrap_or_else(|| row.practice.lesson_id.to_string());
        let grade = row
            .grade
            .as_ref()
            .map(|g| g.grade.to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(row.practice.id),
            Cell::new(&row.practice.title),
            Cell::new(lesson),
            Cell::new(row.status()),
            Cell::new(grade),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn show(config_path: Option<PathBuf>, id: u64) -> Result<()> {
    let backend = super::connect(config_path)?;
    let session = super::session(&backend).await?;
    let flow = PracticeSession::load(&backend, &session, id).await?;
    let practice = flow.practice();

    println!("Practice {}: {}", practice.id, practice.title);
    if let Some(url) = practice.file_url.as_deref().filter(|u| !u.is_empty()) {
        println!("Task file: {url}");
    }

    match flow.existing_submit() {
        Some(submit) => println!(
            "Submitted {}: {}",
            submit.created_at.format("%Y-%m-%d %H:%M"),
            submit.file_url
        ),
        None => println!(
            "Not submitted. Hand in with: quizdesk submit-practice {} --file-url URL",
            practice.id
        ),
    }
    Ok(())
}

pub async fn submit(config_path: Option<PathBuf>, id: u64, file_url: String) -> Result<()> {
    let backend = super::connect(config_path)?;
    let session = super::session(&backend).await?;
    let mut flow = PracticeSession::load(&backend, &session, id).await?;

    let submit = flow.submit(&file_url).await?;
    println!(
        "Submitted practice {} (submission {}).",
        submit.practice_id, submit.id
    );
    Ok(())
}
