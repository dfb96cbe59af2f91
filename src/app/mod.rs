//! Application layer - organized by Clean Architecture principles.
//!
//! # Structure
//!
//! - `domain/` - Core data structures (config, vocabulary, progress, messages)
//! - `controllers/` - Preference stores, hotkey dispatch, deck session
//! - `services/` - Remote store access, vocabulary and progress operations
//! - `infrastructure/` - Errors, environment config, platform probes, listeners
//! - `state.rs` - Composition root and event-loop state

pub mod controllers;
pub mod domain;
pub mod infrastructure;
pub mod services;
pub mod state;

// Re-exports for convenient external access
pub use controllers::deck::{DeckSession, PickResult};
pub use controllers::hotkeys::{HotkeyAction, HotkeyBinding, HotkeyHandlers, HotkeyHub, KeyInput, KeyOutcome};
pub use controllers::settings_store::SettingsStore;
pub use controllers::theme_store::ThemeStore;
pub use domain::{AppConfig, Message, Script, ThemeMode, UserProgress, VocabCard};
pub use infrastructure::error::{AppError, Result};
pub use infrastructure::platform::detect_system_dark_mode;
pub use state::{AppContext, AppState, Outbox};
