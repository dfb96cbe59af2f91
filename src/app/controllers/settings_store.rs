use std::rc::Rc;

use tracing::debug;

use crate::app::infrastructure::observable::{ObservableFlag, Subscription};

/// Display preferences shared by the card views.
///
/// Cloning yields another handle to the same state. The flag only changes
/// through `toggle_annotation_visible`.
#[derive(Clone)]
pub struct SettingsStore {
    annotation: Rc<ObservableFlag>,
}

impl SettingsStore {
    pub fn new(annotation_visible: bool) -> Self {
        Self {
            annotation: Rc::new(ObservableFlag::new(annotation_visible)),
        }
    }

    pub fn annotation_visible(&self) -> bool {
        self.annotation.get()
    }

    /// Flip the flag and notify every subscriber, in registration order,
    /// before returning.
    pub fn toggle_annotation_visible(&self) {
        let visible = self.annotation.flip();
        debug!(visible, "annotation visibility toggled");
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(bool) + 'static,
    {
        self.annotation.subscribe(listener)
    }

    pub fn subscriber_count(&self) -> usize {
        self.annotation.subscriber_count()
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("annotation_visible", &self.annotation_visible())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_toggle_parity() {
        for initial in [false, true] {
            for n in 0..7 {
                let store = SettingsStore::new(initial);
                for _ in 0..n {
                    store.toggle_annotation_visible();
                }
                assert_eq!(store.annotation_visible(), initial ^ (n % 2 == 1));
            }
        }
    }

    #[test]
    fn test_each_subscriber_notified_once_in_order() {
        let store = SettingsStore::new(false);
        let log = Rc::new(RefCell::new(Vec::new()));

        let subs: Vec<_> = ["first", "second", "third"]
            .into_iter()
            .map(|name| {
                let log = log.clone();
                store.subscribe(move |visible| log.borrow_mut().push((name, visible)))
            })
            .collect();

        store.toggle_annotation_visible();
        assert_eq!(
            *log.borrow(),
            vec![("first", true), ("second", true), ("third", true)]
        );
        drop(subs);
    }

    #[test]
    fn test_clones_share_state() {
        let store = SettingsStore::new(false);
        let other = store.clone();
        other.toggle_annotation_visible();
        assert!(store.annotation_visible());
    }

    #[test]
    fn test_unsubscribed_listener_is_not_called() {
        let store = SettingsStore::new(true);
        let hits = Rc::new(RefCell::new(0));

        let h = hits.clone();
        let sub = store.subscribe(move |_| *h.borrow_mut() += 1);
        store.toggle_annotation_visible();
        sub.unsubscribe();
        store.toggle_annotation_visible();

        assert_eq!(*hits.borrow(), 1);
        assert_eq!(store.subscriber_count(), 0);
    }
}
