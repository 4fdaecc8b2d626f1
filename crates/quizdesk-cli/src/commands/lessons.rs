//! `quizdesk lessons` and `quizdesk lesson`.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizdesk_core::practice::load_lesson;
use quizdesk_core::traits::PortalBackend;

pub async fn list(config_path: Option<PathBuf>) -> Result<()> {
    let backend = super::connect(config_path)?;
    let mut lessons = backend.list_lessons().await?;
    lessons.sort_by_key(|l| l.number);

    if lessons.is_empty() {
        println!("No lessons yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "No.", "Topic", "Materials"]);
    for lesson in &lessons {
        let materials = lesson.images.len() + lesson.documents.len() + lesson.video_files.len();
        table.add_row(vec![
            Cell::new(lesson.id),
            Cell::new(lesson.number),
            Cell::new(&lesson.topic),
            Cell::new(materials),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn show(config_path: Option<PathBuf>, id: u64) -> Result<()> {
    let backend = super::connect(config_path)?;
    let detail = load_lesson(&backend, id).await?;
    let lesson = &detail.lesson;

    println!("Lesson {}: {}", lesson.number, lesson.topic);
    if let Some(content) = lesson.content.as_deref().filter(|c| !c.is_empty()) {
        println!();
        println!("{content}");
    }

    for (heading, urls) in [
        ("Images", &lesson.images),
        ("Documents", &lesson.documents),
        ("Videos", &lesson.video_files),
    ] {
        if urls.is_empty() {
            continue;
        }
        println!();
        println!("{heading}:");
        for url in urls {
            println!("  {url}");
        }
    }

    if !detail.tests.is_empty() {
        println!();
        println!("Tests:");
        for test in &detail.tests {
            println!("  [{}] {}", test.id, test.title);
        }
    }
    if !detail.practices.is_empty() {
        println!();
        println!("Practices:");
        for practice in &detail.practices {
            println!("  [{}] {}", practice.id, practice.title);
        }
    }

    Ok(())
}
