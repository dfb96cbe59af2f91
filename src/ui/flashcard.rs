//! Practice view: card, annotation, choices and the two toggle buttons.
//!
//! Widgets only read state. The annotation label and the toggle captions
//! follow the stores through subscriptions; the rest is redrawn from
//! `AppState` after each handled message.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use fltk::{button::Button, enums::Color, frame::Frame, prelude::*};

use super::main_window::MainWidgets;
use super::theme::{apply_theme, palette, Palette, Themed};
use crate::app::controllers::deck::{Answer, DeckSession};
use crate::app::domain::settings::Script;
use crate::app::domain::vocab::{AnnotatedText, VocabCard};
use crate::app::infrastructure::observable::Subscription;
use crate::app::state::{AppContext, AppState};

/// Everything the view shows, computed without touching widgets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFace {
    pub meaning: String,
    pub choices: Vec<String>,
    pub status: String,
}

pub fn card_face(state: &AppState) -> CardFace {
    if state.loading {
        return CardFace {
            meaning: String::new(),
            choices: Vec::new(),
            status: "Loading deck...".to_string(),
        };
    }

    let deck = &state.deck;
    let Some(card) = deck.current() else {
        return CardFace {
            meaning: "No cards to practice".to_string(),
            choices: Vec::new(),
            status: String::new(),
        };
    };

    let meaning = if deck.is_flipped() {
        card.english.clone()
    } else {
        "Space to reveal, 1-4 to answer".to_string()
    };

    let (correct, attempted) = deck.score();
    let mut status = format!(
        "Card {}/{}   Score {}/{}",
        deck.index() + 1,
        deck.len(),
        correct,
        attempted
    );
    if let Some(p) = &state.progress {
        status.push_str(&format!(
            "   Level {}   {} XP   Streak {}",
            p.current_level, p.total_xp, p.current_streak
        ));
    }

    CardFace {
        meaning,
        choices: deck
            .choices()
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}. {}", i + 1, c.english))
            .collect(),
        status,
    }
}

pub fn annotation_toggle_label(visible: bool, script: Script) -> String {
    let verb = if visible { "Hide" } else { "Show" };
    format!("{} {} (H)", verb, script.romanization_name())
}

pub fn theme_toggle_label(dark: bool) -> &'static str {
    if dark { "Light mode (D)" } else { "Dark mode (D)" }
}

fn headline_text(card: Option<&VocabCard>, visible: bool) -> String {
    card.map(|c| AnnotatedText::of(c).render(visible))
        .unwrap_or_default()
}

/// Colors left on the choice buttons once the current card is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerHighlight {
    pub correct_slot: usize,
    pub choice: usize,
}

impl AnswerHighlight {
    pub fn of(deck: &DeckSession) -> Option<Self> {
        deck.answer().map(|Answer { choice, .. }| Self {
            correct_slot: deck.correct_slot(),
            choice,
        })
    }

    pub fn color_for(&self, slot: usize, p: &Palette) -> Option<Color> {
        if slot == self.correct_slot {
            Some(p.correct)
        } else if slot == self.choice {
            Some(p.incorrect)
        } else {
            None
        }
    }
}

/// Theme colors first, then the answer highlight on top.
fn paint_choices(themed: &mut Themed, choices: &mut [Button], highlight: Option<AnswerHighlight>, is_dark: bool) {
    apply_theme(themed, is_dark);
    let Some(highlight) = highlight else {
        return;
    };
    let p = palette(is_dark);
    for (slot, btn) in choices.iter_mut().enumerate() {
        if let Some(color) = highlight.color_for(slot, &p) {
            btn.set_color(color);
            btn.redraw();
        }
    }
}

/// Hanzi with optional romanization, re-rendered whenever the annotation
/// flag changes.
struct AnnotatedLabel {
    frame: Frame,
    card: Rc<RefCell<Option<VocabCard>>>,
    _subscription: Subscription,
}

impl AnnotatedLabel {
    fn new(frame: Frame, ctx: &AppContext) -> Self {
        let card: Rc<RefCell<Option<VocabCard>>> = Rc::new(RefCell::new(None));

        let target = frame.clone();
        let shown = card.clone();
        let subscription = ctx.settings.subscribe(move |visible| {
            let mut target = target.clone();
            target.set_label(&headline_text(shown.borrow().as_ref(), visible));
            target.redraw();
        });

        Self {
            frame,
            card,
            _subscription: subscription,
        }
    }

    fn show(&mut self, card: Option<&VocabCard>, visible: bool) {
        *self.card.borrow_mut() = card.cloned();
        self.frame.set_label(&headline_text(card, visible));
        self.frame.redraw();
    }
}

pub struct PracticeView {
    widgets: MainWidgets,
    headline: AnnotatedLabel,
    themed: Themed,
    highlight: Rc<Cell<Option<AnswerHighlight>>>,
    _subscriptions: Vec<Subscription>,
}

impl PracticeView {
    pub fn new(widgets: MainWidgets, ctx: &AppContext) -> Self {
        let headline = AnnotatedLabel::new(widgets.headline.clone(), ctx);

        let mut buttons: Vec<Button> = widgets.choices.clone();
        buttons.extend([
            widgets.prev.clone(),
            widgets.flip.clone(),
            widgets.next.clone(),
            widgets.annotation_toggle.clone(),
            widgets.theme_toggle.clone(),
        ]);
        let themed = Themed {
            window: widgets.wind.clone(),
            frames: vec![
                widgets.status.clone(),
                widgets.headline.clone(),
                widgets.meaning.clone(),
            ],
            buttons,
        };

        let mut subscriptions = Vec::new();

        // Annotation toggle button
        let script = ctx.config.script;
        let mut annotation_btn = widgets.annotation_toggle.clone();
        annotation_btn.set_label(&annotation_toggle_label(ctx.settings.annotation_visible(), script));
        let settings = ctx.settings.clone();
        annotation_btn.set_callback(move |_| settings.toggle_annotation_visible());
        subscriptions.push(ctx.settings.subscribe(move |visible| {
            let mut annotation_btn = annotation_btn.clone();
            annotation_btn.set_label(&annotation_toggle_label(visible, script));
            annotation_btn.redraw();
        }));

        // Theme toggle button and palette
        let mut theme_btn = widgets.theme_toggle.clone();
        theme_btn.set_label(theme_toggle_label(ctx.theme.is_dark()));
        let theme = ctx.theme.clone();
        theme_btn.set_callback(move |_| theme.toggle());
        let highlight: Rc<Cell<Option<AnswerHighlight>>> = Rc::new(Cell::new(None));
        let palette_target = themed.clone();
        let choice_buttons = widgets.choices.clone();
        let shown = highlight.clone();
        subscriptions.push(ctx.theme.subscribe(move |dark| {
            let mut theme_btn = theme_btn.clone();
            theme_btn.set_label(theme_toggle_label(dark));
            let mut palette_target = palette_target.clone();
            let mut choice_buttons = choice_buttons.clone();
            paint_choices(&mut palette_target, &mut choice_buttons, shown.get(), dark);
        }));

        let mut view = Self {
            widgets,
            headline,
            themed,
            highlight,
            _subscriptions: subscriptions,
        };
        apply_theme(&mut view.themed, ctx.theme.is_dark());
        view
    }

    pub fn show(&mut self) {
        self.widgets.wind.show();
    }

    pub fn render(&mut self, state: &AppState) {
        let face = card_face(state);
        let visible = state.ctx.settings.annotation_visible();
        let is_dark = state.ctx.theme.is_dark();

        self.headline.show(state.deck.current(), visible);
        self.widgets.meaning.set_label(&face.meaning);
        self.widgets.status.set_label(&face.status);

        for (i, btn) in self.widgets.choices.iter_mut().enumerate() {
            match face.choices.get(i) {
                Some(label) => {
                    btn.set_label(label);
                    btn.show();
                }
                None => btn.hide(),
            }
        }

        let highlight = AnswerHighlight::of(&state.deck);
        self.highlight.set(highlight);
        paint_choices(&mut self.themed, &mut self.widgets.choices, highlight, is_dark);

        self.widgets.meaning.redraw();
        self.widgets.status.redraw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::domain::messages::Message;
    use crate::app::domain::progress::UserProgress;
    use crate::app::domain::settings::AppConfig;
    use crate::app::domain::vocab::sample_deck;
    use crate::app::services::remote::MemoryStore;
    use crate::app::state::Outbox;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn state() -> AppState {
        let outbox: Outbox = Arc::new(|_: Message| {});
        let ctx = AppContext::new(AppConfig::default(), Arc::new(MemoryStore::new()), outbox, || false);
        AppState::new(ctx)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    #[test]
    fn test_loading_face() {
        let face = card_face(&state());
        assert_eq!(face.status, "Loading deck...");
        assert!(face.choices.is_empty());
    }

    #[test]
    fn test_empty_deck_face() {
        let mut s = state();
        s.handle(Message::DeckLoaded(Vec::new()), today());
        assert_eq!(card_face(&s).meaning, "No cards to practice");
    }

    #[test]
    fn test_face_reveals_meaning_when_flipped() {
        let mut s = state();
        s.handle(Message::DeckLoaded(sample_deck(Script::Cantonese)), today());
        let hidden = card_face(&s);
        assert_eq!(hidden.choices.len(), 4);
        assert!(hidden.choices[0].starts_with("1. "));
        assert!(hidden.status.starts_with("Card 1/8"));

        s.handle(Message::FlipCard, today());
        assert_eq!(card_face(&s).meaning, "hello");
    }

    #[test]
    fn test_status_includes_progress() {
        let mut s = state();
        s.handle(Message::DeckLoaded(sample_deck(Script::Cantonese)), today());
        let mut p = UserProgress::new(1, today());
        p.award_xp(120);
        p.record_activity(today());
        s.handle(Message::ProgressUpdated(p), today());

        let status = card_face(&s).status;
        assert!(status.contains("Level 2"));
        assert!(status.contains("120 XP"));
        assert!(status.contains("Streak 1"));
    }

    #[test]
    fn test_toggle_labels() {
        assert_eq!(annotation_toggle_label(true, Script::Cantonese), "Hide Jyutping (H)");
        assert_eq!(annotation_toggle_label(false, Script::Mandarin), "Show Pinyin (H)");
        assert_eq!(theme_toggle_label(false), "Dark mode (D)");
        assert_eq!(theme_toggle_label(true), "Light mode (D)");
    }

    #[test]
    fn test_highlight_follows_answer() {
        let mut s = state();
        s.handle(Message::DeckLoaded(sample_deck(Script::Cantonese)), today());
        assert_eq!(AnswerHighlight::of(&s.deck), None);

        let right = s.deck.correct_slot();
        let wrong = (right + 1) % 4;
        s.handle(Message::Pick(wrong), today());
        let highlight = AnswerHighlight::of(&s.deck).unwrap();
        assert_eq!(highlight, AnswerHighlight { correct_slot: right, choice: wrong });

        s.handle(Message::NextCard, today());
        assert_eq!(AnswerHighlight::of(&s.deck), None);
    }

    #[test]
    fn test_highlight_colors_in_both_palettes() {
        let highlight = AnswerHighlight { correct_slot: 2, choice: 0 };
        for dark in [false, true] {
            let p = palette(dark);
            assert_eq!(highlight.color_for(2, &p), Some(p.correct));
            assert_eq!(highlight.color_for(0, &p), Some(p.incorrect));
            assert_eq!(highlight.color_for(1, &p), None);
        }

        let hit = AnswerHighlight { correct_slot: 1, choice: 1 };
        assert_eq!(hit.color_for(1, &palette(true)), Some(palette(true).correct));
    }

    #[test]
    fn test_headline_text() {
        let deck = sample_deck(Script::Cantonese);
        assert_eq!(headline_text(deck.first(), true), "你好\nnei5 hou2");
        assert_eq!(headline_text(deck.first(), false), "你好");
        assert_eq!(headline_text(None, true), "");
    }
}
