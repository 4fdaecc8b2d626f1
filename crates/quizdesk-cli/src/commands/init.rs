//! The `quizdesk init` command.

use std::path::Path;

use anyhow::Result;

use quizdesk_client::config::CONFIG_FILE_NAME;

pub fn execute() -> Result<()> {
    if Path::new(CONFIG_FILE_NAME).exists() {
        println!("{CONFIG_FILE_NAME} already exists, skipping.");
    } else {
        std::fs::write(CONFIG_FILE_NAME, SAMPLE_CONFIG)?;
        println!("Created {CONFIG_FILE_NAME}");
    }

    std::fs::create_dir_all("test-files")?;
    let example_path = Path::new("test-files/example.toml");
    if example_path.exists() {
        println!("test-files/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_TEST)?;
        println!("Created test-files/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE_NAME} with your portal's API URL");
    println!("  2. Run: quizdesk login --email you@example.org --password ...");
    println!("  3. Run: quizdesk tests");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizdesk configuration

api_url = "http://localhost:8080/api/v1"
timeout_secs = 30
# token = "${QUIZDESK_TOKEN}"
"#;

const EXAMPLE_TEST: &str = r#"[test]
lesson_id = 1
title = "Example test"
description = "A two-question example to get started"
type = "single"
allow_retake = true

[[questions]]
question = "Which keyword declares an immutable binding?"
options = ["let", "mut", "static"]
correct = 0

[[questions]]
question = "Which type owns a heap-allocated string?"
options = ["&str", "String"]
correct = 1
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use quizdesk_core::authoring::parse_test_draft_str;

    #[test]
    fn example_test_is_valid() {
        let draft = parse_test_draft_str(EXAMPLE_TEST, Path::new("example.toml")).unwrap();
        assert!(draft.validate().is_ok());
    }
}
