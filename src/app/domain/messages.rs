use super::progress::UserProgress;
use super::vocab::VocabCard;

/// Everything the event loop reacts to. Hotkey callbacks, buttons and
/// background workers all send one of these; `AppState::handle` applies it.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // Deck navigation
    PrevCard,
    NextCard,
    FlipCard,
    Pick(usize),

    // Background results
    DeckLoaded(Vec<VocabCard>),
    ProgressUpdated(UserProgress),

    WindowClose,
}
