//! Read-only test commands: `tests`, `show`, `attempts` and `grades`.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizdesk_core::catalog::search_tests;
use quizdesk_core::gate::GateState;
use quizdesk_core::model::TestKind;
use quizdesk_core::session::{load_overview, TestSession};
use quizdesk_core::tier::{format_score, ResultTier};
use quizdesk_core::traits::PortalBackend;

pub async fn list(config_path: Option<PathBuf>, search: Option<String>) -> Result<()> {
    let backend = super::connect(config_path)?;
    let rows = load_overview(&backend).await?;

    let tests: Vec<_> = rows.iter().map(|r| r.test.clone()).collect();
    let matching: Vec<u64> = search_tests(&tests, search.as_deref().unwrap_or_default())
        .into_iter()
        .map(|t| t.id)
        .collect();

    if matching.is_empty() {
        println!("No tests found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Lesson", "Type", "Status", "Score", "Grade"]);

    for row in rows.iter().filter(|r| matching.contains(&r.test.id)) {
        let lesson = row
            .test
            .lesson
            .as_ref()
            .map(|l| format!("{}. {}", l.number, l.topic))
            .unwrap_or_else(|| row.test.lesson_id.to_string());
        let score = row
            .attempt
            .as_ref()
            .map(|a| format!("{} ({})", format_score(a.score), ResultTier::from_score(a.score)))
            .unwrap_or_else(|| "-".to_string());
        let grade = row
            .grade
            .as_ref()
            .map(|g| g.grade.to_string())
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            Cell::new(row.test.id),
            Cell::new(&row.test.title),
            Cell::new(lesson),
            Cell::new(row.test.kind),
            Cell::new(row.status()),
            Cell::new(score),
            Cell::new(grade),
        ]);
    }

    println!("{table}");
    Ok(())
}

pub async fn show(config_path: Option<PathBuf>, id: u64) -> Result<()> {
    let backend = super::connect(config_path)?;
    let session = super::session(&backend).await?;
    let flow = TestSession::load(&backend, &session, id).await?;
    let test = flow.test();

    println!("Test {}: {} ({} choice)", test.id, test.title, test.kind);
    if let Some(description) = test.description.as_deref().filter(|d| !d.is_empty()) {
        println!("{description}");
    }
    println!();

    for question in &test.questions {
        println!("[{}] {}", question.id, question.text);
        for (i, option) in question.options.iter().enumerate() {
            println!("    {i}) {option}");
        }
    }
    println!();

    match flow.gate().state() {
        GateState::Eligible { previous: None } => {
            println!("You have not taken this test yet.");
        }
        GateState::Eligible {
            previous: Some(previous),
        } => {
            println!(
                "Previous result: {}. Retakes are allowed.",
                format_score(previous.score)
            );
        }
        GateState::Locked { previous } => {
            let tier = ResultTier::from_score(previous.score);
            println!(
                "Completed with {}: {tier}. Retakes are not allowed.",
                format_score(previous.score)
            );
        }
        GateState::Completed { attempt } => {
            println!("Completed with {}.", format_score(attempt.score));
        }
    }

    if flow.gate().may_take() {
        let example = match test.kind {
            TestKind::Single => "QUESTION=OPTION",
            TestKind::Multiple => "QUESTION=OPTION,OPTION",
        };
        println!("Submit with: quizdesk take {} -a {example} ...", test.id);
    }

    Ok(())
}

pub async fn attempts(config_path: Option<PathBuf>, format: String) -> Result<()> {
    let backend = super::connect(config_path)?;
    let attempts = backend.my_attempts().await?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&attempts)?),
        "text" => {
            if attempts.is_empty() {
                println!("No attempts yet.");
                return Ok(());
            }
            let mut table = Table::new();
            table.set_header(vec!["ID", "Test", "Score", "Result", "Submitted"]);
            for attempt in &attempts {
                let title = attempt
                    .test
                    .as_ref()
                    .map(|t| t.title.clone())
                    .unwrap_or_else(|| attempt.test_id.to_string());
                table.add_row(vec![
                    Cell::new(attempt.id),
                    Cell::new(title),
                    Cell::new(format_score(attempt.score)),
                    Cell::new(ResultTier::from_score(attempt.score)),
                    Cell::new(attempt.created_at.format("%Y-%m-%d %H:%M")),
                ]);
            }
            println!("{table}");
        }
        other => anyhow::bail!("unknown format: {other} (expected text or json)"),
    }

    Ok(())
}

pub async fn grades(config_path: Option<PathBuf>) -> Result<()> {
    let backend = super::connect(config_path)?;
    let (grades, practice_grades) =
        futures::try_join!(backend.my_grades(), backend.my_practice_grades())?;

    if grades.is_empty() && practice_grades.is_empty() {
        println!("No grades yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Kind", "Title", "Grade", "Comment", "Graded"]);
    for grade in &grades {
        let title = grade
            .test
            .as_ref()
            .map(|t| t.title.clone())
            .unwrap_or_else(|| grade.test_id.to_string());
        table.add_row(vec![
            Cell::new("test"),
            Cell::new(title),
            Cell::new(grade.grade),
            Cell::new(grade.comment.as_deref().unwrap_or("")),
            Cell::new(grade.created_at.format("%Y-%m-%d")),
        ]);
    }
    for grade in &practice_grades {
        let title = grade
            .practice
            .as_ref()
            .map(|p| p.title.clone())
            .unwrap_or_else(|| grade.practice_id.to_string());
        table.add_row(vec![
            Cell::new("practice"),
            Cell::new(title),
            Cell::new(grade.grade),
            Cell::new(grade.comment.as_deref().unwrap_or("")),
            Cell::new(grade.created_at.format("%Y-%m-%d")),
        ]);
    }
    println!("{table}");
    Ok(())
}
