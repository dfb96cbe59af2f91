pub mod flashcard;
pub mod keys;
pub mod main_window;
pub mod theme;
