use tracing::debug;

use crate::app::domain::vocab::VocabCard;

/// Number of answer buttons (and pick hotkeys).
pub const CHOICE_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickResult {
    Correct,
    Incorrect,
    /// Empty deck, out-of-range choice, or the card was already answered.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answer {
    pub choice: usize,
    pub correct: bool,
}

/// Walks a deck of cards: navigation wraps around, moving to another card
/// turns it face up again and clears its answer.
#[derive(Debug, Default)]
pub struct DeckSession {
    cards: Vec<VocabCard>,
    index: usize,
    flipped: bool,
    answer: Option<Answer>,
    correct: u32,
    attempted: u32,
}

impl DeckSession {
    pub fn new(cards: Vec<VocabCard>) -> Self {
        Self {
            cards,
            ..Default::default()
        }
    }

    /// Swap in a freshly loaded deck. The score is kept.
    pub fn replace_cards(&mut self, cards: Vec<VocabCard>) {
        debug!(count = cards.len(), "deck replaced");
        self.cards = cards;
        self.reset_card();
        self.index = 0;
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&VocabCard> {
        self.cards.get(self.index)
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn answer(&self) -> Option<Answer> {
        self.answer
    }

    /// (correct, attempted)
    pub fn score(&self) -> (u32, u32) {
        (self.correct, self.attempted)
    }

    pub fn next(&mut self) {
        if self.cards.is_empty() {
            return;
        }
        self.index = (self.index + 1) % self.cards.len();
        self.reset_card();
    }

    pub fn prev(&mut self) {
        if self.cards.is_empty() {
            return;
        }
        self.index = (self.index + self.cards.len() - 1) % self.cards.len();
        self.reset_card();
    }

    pub fn flip(&mut self) {
        if !self.cards.is_empty() {
            self.flipped = !self.flipped;
        }
    }

    /// Candidate meanings for the current card: the right one plus the
    /// cards that follow it in the deck, with the right one placed at
    /// `correct_slot()`.
    pub fn choices(&self) -> Vec<&VocabCard> {
        let Some(current) = self.current() else {
            return Vec::new();
        };
        let count = self.cards.len().min(CHOICE_COUNT);

        let mut options: Vec<&VocabCard> = (1..count)
            .map(|offset| &self.cards[(self.index + offset) % self.cards.len()])
            .collect();
        options.insert(self.correct_slot(), current);
        options
    }

    /// Deterministic per position so the layout does not move on redraw.
    pub fn correct_slot(&self) -> usize {
        let count = self.cards.len().min(CHOICE_COUNT);
        if count == 0 {
            return 0;
        }
        (self.index * 3 + 1) % count
    }

    pub fn pick(&mut self, choice: usize) -> PickResult {
        if self.answer.is_some() || choice >= self.cards.len().min(CHOICE_COUNT) {
            return PickResult::Ignored;
        }

        let correct = choice == self.correct_slot();
        self.answer = Some(Answer { choice, correct });
        self.attempted += 1;
        if correct {
            self.correct += 1;
        }
        // Reveal the meaning once answered.
        self.flipped = true;

        debug!(index = self.index, choice, correct, "card answered");
        if correct {
            PickResult::Correct
        } else {
            PickResult::Incorrect
        }
    }

    fn reset_card(&mut self) {
        self.flipped = false;
        self.answer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::domain::settings::Script;
    use crate::app::domain::vocab::sample_deck;

    fn deck(n: usize) -> DeckSession {
        DeckSession::new(sample_deck(Script::Cantonese).into_iter().take(n).collect())
    }

    #[test]
    fn test_navigation_wraps() {
        let mut d = deck(3);
        d.prev();
        assert_eq!(d.index(), 2);
        d.next();
        assert_eq!(d.index(), 0);
        d.next();
        d.next();
        d.next();
        assert_eq!(d.index(), 0);
    }

    #[test]
    fn test_navigation_resets_card() {
        let mut d = deck(5);
        d.flip();
        assert!(d.is_flipped());
        d.next();
        assert!(!d.is_flipped());

        d.pick(0);
        assert!(d.answer().is_some());
        d.prev();
        assert!(d.answer().is_none());
    }

    #[test]
    fn test_empty_deck_is_inert() {
        let mut d = DeckSession::new(Vec::new());
        d.next();
        d.prev();
        d.flip();
        assert!(d.current().is_none());
        assert!(!d.is_flipped());
        assert!(d.choices().is_empty());
        assert_eq!(d.pick(0), PickResult::Ignored);
    }

    #[test]
    fn test_choices_contain_current_once() {
        let mut d = deck(6);
        for _ in 0..6 {
            let choices = d.choices();
            assert_eq!(choices.len(), CHOICE_COUNT);
            let current = d.current().unwrap();
            assert_eq!(choices[d.correct_slot()], current);
            assert_eq!(choices.iter().filter(|c| c.id == current.id).count(), 1);
            d.next();
        }
    }

    #[test]
    fn test_small_deck_has_fewer_choices() {
        let d = deck(2);
        assert_eq!(d.choices().len(), 2);
        assert!(d.correct_slot() < 2);
    }

    #[test]
    fn test_pick_scores_once_per_card() {
        let mut d = deck(5);
        let right = d.correct_slot();
        let wrong = (right + 1) % CHOICE_COUNT;

        assert_eq!(d.pick(right), PickResult::Correct);
        assert!(d.is_flipped());
        assert_eq!(d.pick(wrong), PickResult::Ignored);
        assert_eq!(d.score(), (1, 1));

        d.next();
        let wrong = (d.correct_slot() + 1) % CHOICE_COUNT;
        assert_eq!(d.pick(wrong), PickResult::Incorrect);
        assert_eq!(d.score(), (1, 2));
    }

    #[test]
    fn test_out_of_range_pick_ignored() {
        let mut d = deck(2);
        assert_eq!(d.pick(3), PickResult::Ignored);
        assert_eq!(d.score(), (0, 0));
    }

    #[test]
    fn test_replace_cards_keeps_score() {
        let mut d = deck(4);
        let right = d.correct_slot();
        d.pick(right);
        d.next();

        d.replace_cards(sample_deck(Script::Mandarin));
        assert_eq!(d.index(), 0);
        assert_eq!(d.score(), (1, 1));
        assert!(d.answer().is_none());
    }
}
