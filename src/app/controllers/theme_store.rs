use std::rc::Rc;

use tracing::debug;

use crate::app::infrastructure::observable::{ObservableFlag, Subscription};

/// Light/dark flag. Applying the palette is left to subscribers.
#[derive(Clone)]
pub struct ThemeStore {
    dark: Rc<ObservableFlag>,
}

impl ThemeStore {
    pub fn new(dark: bool) -> Self {
        Self {
            dark: Rc::new(ObservableFlag::new(dark)),
        }
    }

    pub fn is_dark(&self) -> bool {
        self.dark.get()
    }

    pub fn toggle(&self) {
        let dark = self.dark.flip();
        debug!(dark, "theme toggled");
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(bool) + 'static,
    {
        self.dark.subscribe(listener)
    }
}

impl std::fmt::Debug for ThemeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeStore")
            .field("dark", &self.is_dark())
            .finish()
    }
}
