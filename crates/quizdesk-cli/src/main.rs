//! quizdesk CLI: take portal tests and run the back-office from a terminal.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use quizdesk_core::authoring::{LessonDraft, PracticeDraft};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "quizdesk", version, about = "Educational portal test client")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config and an example test file
    Init,

    /// Log in and store the token in the config file
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Show the logged-in user
    Whoami,

    /// List tests with your attempt and grade for each
    Tests {
        /// Filter by title, description or lesson topic
        #[arg(long)]
        search: Option<String>,
    },

    /// Show a test's questions and whether you may take it
    Show {
        /// Test id
        id: u64,
    },

    /// Answer and submit a test
    Take {
        /// Test id
        id: u64,

        /// Answer as QUESTION=OPTION, or QUESTION=OPT,OPT for multiple choice
        #[arg(long = "answer", short = 'a')]
        answers: Vec<String>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List your attempts
    Attempts {
        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List your instructor grades for tests and practices
    Grades,

    /// List lessons
    Lessons,

    /// Show a lesson's materials, tests and practices
    Lesson {
        /// Lesson id
        id: u64,
    },

    /// List practices with your submission and grade for each
    Practices,

    /// Show a practice and your submission
    Practice {
        /// Practice id
        id: u64,
    },

    /// Hand in a practice solution link
    SubmitPractice {
        /// Practice id
        id: u64,

        /// Link to the solution file
        #[arg(long)]
        file_url: String,
    },

    /// Print the feedback tier for a score
    Tier {
        /// Percentage in [0, 100]
        score: f64,
    },

    /// Check a TOML test file without sending it
    ValidateTest {
        /// Path to the test file
        file: PathBuf,
    },

    /// Administrator commands
    #[command(subcommand)]
    Admin(AdminCommands),
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Create a test from a TOML file
    CreateTest { file: PathBuf },

    /// Replace a test from a TOML file
    UpdateTest { id: u64, file: PathBuf },

    /// Delete a test
    DeleteTest { id: u64 },

    /// List attempts of all users
    Attempts,

    /// Delete an attempt so its owner can take the test again
    AllowRetake { attempt: u64 },

    /// Grade an attempt
    Grade {
        #[arg(long)]
        attempt: u64,

        #[arg(long)]
        grade: f64,

        #[arg(long)]
        comment: Option<String>,
    },

    /// Delete a grade
    DeleteGrade { id: u64 },

    /// Create a lesson
    CreateLesson(LessonArgs),

    /// Replace a lesson
    UpdateLesson {
        id: u64,

        #[command(flatten)]
        lesson: LessonArgs,
    },

    /// Delete a lesson
    DeleteLesson { id: u64 },

    /// Create a practice
    CreatePractice(PracticeArgs),

    /// Replace a practice
    UpdatePractice {
        id: u64,

        #[command(flatten)]
        practice: PracticeArgs,
    },

    /// Delete a practice
    DeletePractice { id: u64 },

    /// List practice submissions of all users
    PracticeSubmits,

    /// Grade a practice submission
    GradePractice {
        #[arg(long)]
        submit: u64,

        #[arg(long)]
        grade: f64,

        #[arg(long)]
        comment: Option<String>,
    },

    /// Delete a practice grade
    DeletePracticeGrade { id: u64 },
}

#[derive(Args)]
struct LessonArgs {
    /// Lesson number, starting at 1
    #[arg(long)]
    number: u32,

    #[arg(long)]
    topic: String,

    /// Lesson text
    #[arg(long, default_value = "")]
    content: String,

    /// Image URL (repeatable)
    #[arg(long = "image")]
    images: Vec<String>,

    /// Document URL (repeatable)
    #[arg(long = "document")]
    documents: Vec<String>,

    /// Video URL (repeatable)
    #[arg(long = "video")]
    video_files: Vec<String>,
}

impl From<LessonArgs> for LessonDraft {
    fn from(args: LessonArgs) -> Self {
        Self {
            number: args.number,
            topic: args.topic,
            content: args.content,
            images: args.images,
            documents: args.documents,
            video_files: args.video_files,
        }
    }
}

#[derive(Args)]
struct PracticeArgs {
    /// Lesson the practice belongs to
    #[arg(long)]
    lesson: Option<u64>,

    #[arg(long)]
    title: String,

    /// Task file URL
    #[arg(long)]
    file_url: Option<String>,
}

impl From<PracticeArgs> for PracticeDraft {
    fn from(args: PracticeArgs) -> Self {
        Self {
            lesson_id: args.lesson,
            title: args.title,
            file_url: args.file_url,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("quizdesk_core=info,quizdesk_client=info,quizdesk_cli=info")
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Login { email, password } => {
            commands::auth::login(config, email, password).await
        }
        Commands::Whoami => commands::auth::whoami(config).await,
        Commands::Tests { search } => commands::catalog::list(config, search).await,
        Commands::Show { id } => commands::catalog::show(config, id).await,
        Commands::Take {
            id,
            answers,
            format,
        } => commands::take::execute(config, id, answers, format).await,
        Commands::Attempts { format } => commands::catalog::attempts(config, format).await,
        Commands::Grades => commands::catalog::grades(config).await,
        Commands::Lessons => commands::lessons::list(config).await,
        Commands::Lesson { id } => commands::lessons::show(config, id).await,
        Commands::Practices => commands::practice::list(config).await,
        Commands::Practice { id } => commands::practice::show(config, id).await,
        Commands::SubmitPractice { id, file_url } => {
            commands::practice::submit(config, id, file_url).await
        }
        Commands::Tier { score } => commands::tier::execute(score),
        Commands::ValidateTest { file } => commands::admin::validate(file),
        Commands::Admin(cmd) => match cmd {
            AdminCommands::CreateTest { file } => commands::admin::create_test(config, file).await,
            AdminCommands::UpdateTest { id, file } => {
                commands::admin::update_test(config, id, file).await
            }
            AdminCommands::DeleteTest { id } => commands::admin::delete_test(config, id).await,
            AdminCommands::Attempts => commands::admin::attempts(config).await,
            AdminCommands::AllowRetake { attempt } => {
                commands::admin::allow_retake(config, attempt).await
            }
            AdminCommands::Grade {
                attempt,
                grade,
                comment,
            } => commands::admin::grade(config, attempt, grade, comment).await,
            AdminCommands::DeleteGrade { id } => commands::admin::delete_grade(config, id).await,
            AdminCommands::CreateLesson(lesson) => {
                commands::admin::create_lesson(config, lesson.into()).await
            }
            AdminCommands::UpdateLesson { id, lesson } => {
                commands::admin::update_lesson(config, id, lesson.into()).await
            }
            AdminCommands::DeleteLesson { id } => commands::admin::delete_lesson(config, id).await,
            AdminCommands::CreatePractice(practice) => {
                commands::admin::create_practice(config, practice.into()).await
            }
            AdminCommands::UpdatePractice { id, practice } => {
                commands::admin::update_practice(config, id, practice.into()).await
            }
            AdminCommands::DeletePractice { id } => {
                commands::admin::delete_practice(config, id).await
            }
            AdminCommands::PracticeSubmits => commands::admin::practice_submits(config).await,
            AdminCommands::GradePractice {
                submit,
                grade,
                comment,
            } => commands::admin::grade_practice(config, submit, grade, comment).await,
            AdminCommands::DeletePracticeGrade { id } => {
                commands::admin::delete_practice_grade(config, id).await
            }
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
