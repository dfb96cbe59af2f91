use std::process;
use std::sync::Arc;

use fltk::{app, enums::Event, prelude::*};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use canto_cards::app::infrastructure::config::RemoteConfig;
use canto_cards::app::services::remote::HttpStore;
use canto_cards::app::{detect_system_dark_mode, AppConfig, AppContext, AppState, Message, Outbox};
use canto_cards::ui::flashcard::PracticeView;
use canto_cards::ui::keys;
use canto_cards::ui::main_window::build_main_window;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn main() {
    init_tracing();

    let config = AppConfig::load();
    let remote = match RemoteConfig::from_env() {
        Ok(remote) => remote,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };
    info!(url = %remote.base_url, "Using remote store");

    let app = app::App::default();
    let (sender, receiver) = app::channel::<Message>();
    let outbox: Outbox = Arc::new(move |message| {
        sender.send(message);
        app::awake();
    });

    let ctx = AppContext::new(config, Arc::new(HttpStore::new(remote)), outbox, detect_system_dark_mode);
    let widgets = build_main_window(&sender);
    let mut wind = widgets.wind.clone();

    let hotkeys = ctx.hotkeys.clone();
    wind.handle(move |_, event| match event {
        Event::KeyDown => hotkeys.handle_key(keys::current_key()).consumed(),
        _ => false,
    });

    let mut view = PracticeView::new(widgets, &ctx);
    let _binding = ctx.bind_practice_hotkeys();
    // Workers finish on their own and report through the channel.
    let _workers = ctx.start_background_loads(today());

    let mut state = AppState::new(ctx);
    view.render(&state);
    view.show();

    while app.wait() {
        if let Some(msg) = receiver.recv() {
            match msg {
                Message::WindowClose => app.quit(),
                msg => {
                    if state.handle(msg, today()) {
                        view.render(&state);
                    }
                }
            }
        }
    }

    // Let the last answers reach the remote store before exiting.
    state.ctx.close_progress();
}
