//! Controllers layer - interaction state and coordination.
//!
//! - Settings and theme stores with change notification
//! - Hotkey dispatch and scoped key bindings
//! - Flashcard deck session

pub mod deck;
pub mod hotkeys;
pub mod settings_store;
pub mod theme_store;
