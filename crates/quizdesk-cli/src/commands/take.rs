//! The `quizdesk take` command.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};

use quizdesk_core::model::{Answer, QuestionId, TestKind};
use quizdesk_core::session::TestSession;
use quizdesk_core::tier::format_score;

pub async fn execute(
    config_path: Option<PathBuf>,
    id: u64,
    answers: Vec<String>,
    format: String,
) -> Result<()> {
    if format != "text" && format != "json" {
        anyhow::bail!("unknown format: {format} (expected text or json)");
    }

    let backend = super::connect(config_path)?;
    let session = super::session(&backend).await?;
    let mut flow = TestSession::load(&backend, &session, id).await?;
    let kind = flow.test().kind;

    for arg in &answers {
        let (question_id, answer) = parse_answer(arg, kind)?;
        tracing::debug!(question_id, ?answer, "answer");
        flow.draft_mut()
            .set_answer(question_id, answer)
            .with_context(|| format!("invalid answer `{arg}`"))?;
    }

    let outcome = flow.submit().await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!(
            "Submitted attempt {} for \"{}\"",
            outcome.attempt.id,
            flow.test().title
        );
        println!("Score: {}", format_score(outcome.attempt.score));
        println!("{}: {}", outcome.tier, outcome.tier.message());
    }

    Ok(())
}

/// Parse `QUESTION=OPTION` or, for multiple-choice tests,
/// `QUESTION=OPTION,OPTION`.
fn parse_answer(arg: &str, kind: TestKind) -> Result<(QuestionId, Answer)> {
    let (question, options) = arg
        .split_once('=')
        .with_context(|| format!("expected QUESTION=OPTION, got `{arg}`"))?;

    let question_id: QuestionId = question
        .trim()
        .parse()
        .with_context(|| format!("invalid question id in `{arg}`"))?;

    let indices = options
        .split(',')
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .map(|o| {
            o.parse::<usize>()
                .with_context(|| format!("invalid option index `{o}` in `{arg}`"))
        })
        .collect::<Result<BTreeSet<usize>>>()?;

    let answer = match kind {
        TestKind::Single => {
            let mut iter = indices.into_iter();
            match (iter.next(), iter.next()) {
                (Some(index), None) => Answer::Single(index),
                _ => anyhow::bail!("question {question_id} takes exactly one option"),
            }
        }
        TestKind::Multiple => Answer::Multiple(indices),
    };

    Ok((question_id, answer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_choice() {
        let (q, a) = parse_answer("12=3", TestKind::Single).unwrap();
        assert_eq!(q, 12);
        assert_eq!(a, Answer::Single(3));
    }

    #[test]
    fn parse_multiple_choice() {
        let (q, a) = parse_answer("4 = 2, 0,2", TestKind::Multiple).unwrap();
        assert_eq!(q, 4);
        assert_eq!(a, Answer::Multiple(BTreeSet::from([0, 2])));
    }

    #[test]
    fn single_choice_rejects_several_options() {
        assert!(parse_answer("1=0,1", TestKind::Single).is_err());
        assert!(parse_answer("1=", TestKind::Single).is_err());
    }

    #[test]
    fn malformed_arguments() {
        assert!(parse_answer("1", TestKind::Single).is_err());
        assert!(parse_answer("x=1", TestKind::Single).is_err());
        assert!(parse_answer("1=a", TestKind::Multiple).is_err());
    }
}
