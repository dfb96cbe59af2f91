//! Domain layer - core data structures and types.
//!
//! - Configuration (`AppConfig`, theme and script choices)
//! - Vocabulary cards and annotated text
//! - Per-user progress and its XP/streak rules
//! - Message types for the event loop

pub mod messages;
pub mod progress;
pub mod settings;
pub mod vocab;

pub use messages::Message;
pub use progress::UserProgress;
pub use settings::{AppConfig, Script, ThemeMode};
pub use vocab::{AnnotatedText, VocabCard};
