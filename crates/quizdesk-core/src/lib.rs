//! quizdesk-core: test-taking model and flows.
//!
//! This crate defines the data model, the answer draft, the retake gate,
//! result tiers, practice hand-ins and the backend traits that the rest of
//! quizdesk builds on.

pub mod authoring;
pub mod catalog;
pub mod draft;
pub mod error;
pub mod gate;
pub mod model;
pub mod practice;
pub mod session;
pub mod tier;
pub mod traits;

pub use error::{BackendError, QuizError, ValidationError};
pub use practice::PracticeSession;
pub use session::{AdminConsole, AttemptOutcome, Session, TestSession};
