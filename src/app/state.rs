use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chrono::NaiveDate;
use tracing::{debug, info};

use super::controllers::deck::{DeckSession, PickResult};
use super::controllers::hotkeys::{HotkeyBinding, HotkeyHandlers, HotkeyHub};
use super::controllers::settings_store::SettingsStore;
use super::controllers::theme_store::ThemeStore;
use super::domain::messages::Message;
use super::domain::progress::UserProgress;
use super::domain::settings::AppConfig;
use super::services::progress::{ProgressRecorder, RetryPolicy};
use super::services::remote::RemoteStore;
use super::services::vocabulary::load_deck;

/// Where background workers and hotkey callbacks post their messages.
/// In the desktop shell this wraps the toolkit's channel sender.
pub type Outbox = Arc<dyn Fn(Message) + Send + Sync>;

/// Composition root: owns the preference stores, the key hub and the
/// remote store handle, and hands them to whatever needs them.
pub struct AppContext {
    pub config: AppConfig,
    pub settings: SettingsStore,
    pub theme: ThemeStore,
    pub hotkeys: HotkeyHub,
    pub remote: Arc<dyn RemoteStore>,
    pub retry: RetryPolicy,
    progress: Option<ProgressRecorder>,
    outbox: Outbox,
}

impl AppContext {
    pub fn new<F>(config: AppConfig, remote: Arc<dyn RemoteStore>, outbox: Outbox, detect_dark: F) -> Self
    where
        F: FnOnce() -> bool,
    {
        let settings = SettingsStore::new(config.annotation_visible);
        let theme = ThemeStore::new(config.theme_mode.resolve(detect_dark));
        let hotkeys = HotkeyHub::new(settings.clone(), theme.clone());
        let progress = config.user_id.map(|user_id| {
            let outbox = outbox.clone();
            ProgressRecorder::spawn(remote.clone(), user_id, move |p| {
                outbox(Message::ProgressUpdated(p))
            })
        });

        Self {
            config,
            settings,
            theme,
            hotkeys,
            remote,
            retry: RetryPolicy::default(),
            progress,
            outbox,
        }
    }

    pub fn post(&self, message: Message) {
        (self.outbox)(message);
    }

    /// Fetch the deck on a worker thread and queue the progress-record
    /// check. Both report back through the outbox.
    pub fn start_background_loads(&self, today: NaiveDate) -> Vec<JoinHandle<()>> {
        let mut workers = Vec::new();

        let remote = self.remote.clone();
        let outbox = self.outbox.clone();
        let script = self.config.script;
        let limit = self.config.deck_limit;
        workers.push(thread::spawn(move || {
            let cards = load_deck(remote.as_ref(), script, limit);
            outbox(Message::DeckLoaded(cards));
        }));

        match &self.progress {
            Some(recorder) => {
                recorder.ensure(today, self.retry);
            }
            None => info!("No user_id configured, progress tracking disabled"),
        }

        workers
    }

    /// Queue one answer for the progress writer. False when progress
    /// tracking is off.
    pub fn submit_answer(&self, correct: bool, today: NaiveDate) -> bool {
        match &self.progress {
            Some(recorder) => recorder.submit(correct, today),
            None => false,
        }
    }

    /// Stop accepting progress updates and wait for the queued ones.
    pub fn close_progress(&mut self) {
        if let Some(recorder) = self.progress.take() {
            recorder.finish();
        }
    }

    /// Shortcuts for the practice view. Navigation and picks become
    /// messages; the preference toggles are handled by the hub itself.
    pub fn bind_practice_hotkeys(&self) -> HotkeyBinding {
        let prev = self.outbox.clone();
        let next = self.outbox.clone();
        let flip = self.outbox.clone();
        let pick = self.outbox.clone();

        self.hotkeys.attach(
            HotkeyHandlers::new()
                .on_prev(move || prev(Message::PrevCard))
                .on_next(move || next(Message::NextCard))
                .on_flip(move || flip(Message::FlipCard))
                .on_pick(move |index| pick(Message::Pick(index))),
        )
    }
}

/// Practice session state driven by the event loop.
pub struct AppState {
    pub ctx: AppContext,
    pub deck: DeckSession,
    pub progress: Option<UserProgress>,
    pub loading: bool,
}

impl AppState {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            deck: DeckSession::default(),
            progress: None,
            loading: true,
        }
    }

    /// Apply one message. Returns true when the view needs a refresh.
    pub fn handle(&mut self, message: Message, today: NaiveDate) -> bool {
        match message {
            Message::PrevCard => self.deck.prev(),
            Message::NextCard => self.deck.next(),
            Message::FlipCard => self.deck.flip(),
            Message::Pick(index) => match self.deck.pick(index) {
                PickResult::Ignored => return false,
                result => {
                    let correct = result == PickResult::Correct;
                    if !self.ctx.submit_answer(correct, today) {
                        debug!(correct, "answer scored locally only");
                    }
                }
            },
            Message::DeckLoaded(cards) => {
                self.loading = false;
                self.deck.replace_cards(cards);
            }
            Message::ProgressUpdated(progress) => self.progress = Some(progress),
            Message::WindowClose => return false,
        }
        true
    }
}
