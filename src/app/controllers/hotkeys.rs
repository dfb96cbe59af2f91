//! Keyboard shortcuts for the practice views.
//!
//! The host installs one global key listener that forwards every key-down to
//! [`HotkeyHub::handle_key`]. A view that wants shortcuts calls
//! [`HotkeyHub::attach`] when it becomes active and keeps the returned
//! [`HotkeyBinding`] for as long as it is shown; dropping the binding
//! detaches it.
//!
//! Only the most recently attached live binding receives a key-press. A view
//! mounted twice (or a second view stacked over the first) therefore never
//! makes one key-press fire twice, and when the newer binding goes away the
//! older one takes over again.
//!
//! | Key         | Action                                        |
//! |-------------|-----------------------------------------------|
//! | Left        | `on_prev`                                     |
//! | Right       | `on_next`                                     |
//! | Space       | prevent default scrolling, then `on_flip`     |
//! | `1`..`4`    | `on_pick(0..3)`                               |
//! | `h` / `H`   | toggle annotation visibility                  |
//! | `d` / `D`   | toggle dark theme                             |

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use super::settings_store::SettingsStore;
use super::theme_store::ThemeStore;

/// Key identity as reported by the host toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyInput {
    Left,
    Right,
    Space,
    Char(char),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotkeyAction {
    Prev,
    Next,
    Flip,
    /// Zero-based choice index.
    Pick(usize),
    ToggleAnnotation,
    ToggleTheme,
}

impl HotkeyAction {
    pub fn for_key(key: KeyInput) -> Option<Self> {
        match key {
            KeyInput::Left => Some(Self::Prev),
            KeyInput::Right => Some(Self::Next),
            KeyInput::Space => Some(Self::Flip),
            KeyInput::Char(c) => match c.to_ascii_lowercase() {
                digit @ '1'..='4' => Some(Self::Pick(digit as usize - '1' as usize)),
                'h' => Some(Self::ToggleAnnotation),
                'd' => Some(Self::ToggleTheme),
                _ => None,
            },
            KeyInput::Other => None,
        }
    }
}

type Callback = Box<dyn Fn()>;
type PickCallback = Box<dyn Fn(usize)>;

/// Caller-supplied actions. Any of them may be left out; a key whose
/// callback is missing does nothing.
#[derive(Default)]
pub struct HotkeyHandlers {
    on_prev: Option<Callback>,
    on_next: Option<Callback>,
    on_flip: Option<Callback>,
    on_pick: Option<PickCallback>,
}

impl HotkeyHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_prev(mut self, f: impl Fn() + 'static) -> Self {
        self.on_prev = Some(Box::new(f));
        self
    }

    pub fn on_next(mut self, f: impl Fn() + 'static) -> Self {
        self.on_next = Some(Box::new(f));
        self
    }

    pub fn on_flip(mut self, f: impl Fn() + 'static) -> Self {
        self.on_flip = Some(Box::new(f));
        self
    }

    pub fn on_pick(mut self, f: impl Fn(usize) + 'static) -> Self {
        self.on_pick = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for HotkeyHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HotkeyHandlers")
            .field("on_prev", &self.on_prev.is_some())
            .field("on_next", &self.on_next.is_some())
            .field("on_flip", &self.on_flip.is_some())
            .field("on_pick", &self.on_pick.is_some())
            .finish()
    }
}

/// What happened to one key-press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyOutcome {
    /// The action that ran, if any.
    pub fired: Option<HotkeyAction>,
    /// The host should suppress the key's default effect (page scroll).
    pub prevent_default: bool,
}

impl KeyOutcome {
    /// The host should stop propagating the event.
    pub fn consumed(&self) -> bool {
        self.fired.is_some() || self.prevent_default
    }
}

/// Run one key-press against a handler set.
pub fn dispatch(
    key: KeyInput,
    handlers: &HotkeyHandlers,
    settings: &SettingsStore,
    theme: &ThemeStore,
) -> KeyOutcome {
    let Some(action) = HotkeyAction::for_key(key) else {
        return KeyOutcome::default();
    };

    let ran = match action {
        HotkeyAction::Prev => call(&handlers.on_prev),
        HotkeyAction::Next => call(&handlers.on_next),
        HotkeyAction::Flip => call(&handlers.on_flip),
        HotkeyAction::Pick(index) => match &handlers.on_pick {
            Some(f) => {
                f(index);
                true
            }
            None => false,
        },
        HotkeyAction::ToggleAnnotation => {
            settings.toggle_annotation_visible();
            true
        }
        HotkeyAction::ToggleTheme => {
            theme.toggle();
            true
        }
    };

    KeyOutcome {
        fired: ran.then_some(action),
        prevent_default: action == HotkeyAction::Flip,
    }
}

fn call(callback: &Option<Callback>) -> bool {
    match callback {
        Some(f) => {
            f();
            true
        }
        None => false,
    }
}

struct HubInner {
    settings: SettingsStore,
    theme: ThemeStore,
    next_id: Cell<u64>,
    bindings: RefCell<Vec<(u64, Rc<HotkeyHandlers>)>>,
}

/// The single global key listener. Cheap to clone.
#[derive(Clone)]
pub struct HotkeyHub {
    inner: Rc<HubInner>,
}

impl HotkeyHub {
    pub fn new(settings: SettingsStore, theme: ThemeStore) -> Self {
        Self {
            inner: Rc::new(HubInner {
                settings,
                theme,
                next_id: Cell::new(1),
                bindings: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Bind `handlers` for the lifetime of the returned guard.
    pub fn attach(&self, handlers: HotkeyHandlers) -> HotkeyBinding {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .bindings
            .borrow_mut()
            .push((id, Rc::new(handlers)));
        debug!(id, active = self.active_bindings(), "hotkey binding attached");

        HotkeyBinding {
            id,
            hub: Some(Rc::downgrade(&self.inner)),
        }
    }

    /// Feed one key-down from the host. Keys arriving while nothing is
    /// attached are ignored.
    pub fn handle_key(&self, key: KeyInput) -> KeyOutcome {
        // Handlers may attach or detach bindings; do not hold the borrow.
        let top = self
            .inner
            .bindings
            .borrow()
            .last()
            .map(|(_, handlers)| handlers.clone());

        let Some(handlers) = top else {
            trace!(?key, "key ignored, no binding");
            return KeyOutcome::default();
        };

        let outcome = dispatch(key, &handlers, &self.inner.settings, &self.inner.theme);
        if let Some(action) = outcome.fired {
            debug!(?key, ?action, "hotkey");
        }
        outcome
    }

    pub fn active_bindings(&self) -> usize {
        self.inner.bindings.borrow().len()
    }
}

/// Scoped attachment returned by [`HotkeyHub::attach`].
#[must_use = "dropping a HotkeyBinding detaches it immediately"]
pub struct HotkeyBinding {
    id: u64,
    hub: Option<Weak<HubInner>>,
}

impl HotkeyBinding {
    pub fn detach(mut self) {
        self.release();
    }

    fn release(&mut self) {
        let Some(hub) = self.hub.take().and_then(|weak| weak.upgrade()) else {
            return;
        };
        let removed = {
            let mut bindings = hub.bindings.borrow_mut();
            bindings
                .iter()
                .position(|(id, _)| *id == self.id)
                .map(|idx| bindings.remove(idx))
        };
        if removed.is_some() {
            debug!(id = self.id, "hotkey binding detached");
        }
        drop(removed);
    }
}

impl Drop for HotkeyBinding {
    fn drop(&mut self) {
        self.release();
    }
}
