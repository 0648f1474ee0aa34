//! Observable state container shared by the controllers.

use tokio::sync::watch;

/// Holds a piece of UI state and notifies subscribers on every change.
///
/// Updates run synchronously under the channel's internal lock, so a
/// check-and-set inside [`StateStore::update_if`] is atomic with respect to
/// other updaters.
pub struct StateStore<S> {
    tx: watch::Sender<S>,
}

impl<S: Clone> StateStore<S> {
    pub fn new(initial: S) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn snapshot(&self) -> S {
        self.tx.borrow().clone()
    }

    /// Reads part of the state without cloning all of it.
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.tx.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.tx.subscribe()
    }

    pub fn update(&self, f: impl FnOnce(&mut S)) {
        self.tx.send_modify(f);
    }

    /// Applies `f` and notifies subscribers only when it returns `true`.
    pub fn update_if(&self, f: impl FnOnce(&mut S) -> bool) -> bool {
        self.tx.send_if_modified(f)
    }

    /// Returns a guard that applies `f` when dropped, on every exit path of
    /// the enclosing scope.
    pub fn finally<F>(&self, f: F) -> Finally<'_, S, F>
    where
        F: FnOnce(&mut S),
    {
        Finally {
            store: self,
            release: Some(f),
        }
    }
}

pub struct Finally<'a, S: Clone, F: FnOnce(&mut S)> {
    store: &'a StateStore<S>,
    release: Option<F>,
}

impl<S: Clone, F: FnOnce(&mut S)> Drop for Finally<'_, S, F> {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            self.store.update(release);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_is_visible_to_snapshot_and_subscribers() {
        let store = StateStore::new(0u32);
        let mut rx = store.subscribe();
        store.update(|n| *n += 2);
        assert_eq!(store.snapshot(), 2);
        assert!(rx.has_changed().expect("sender alive"));
        assert_eq!(*rx.borrow_and_update(), 2);
    }

    #[test]
    fn update_if_skips_notification_when_unchanged() {
        let store = StateStore::new(false);
        let rx = store.subscribe();
        assert!(!store.update_if(|_| false));
        assert!(!rx.has_changed().expect("sender alive"));
    }

    #[test]
    fn finally_runs_when_scope_exits_early() {
        fn early_return(store: &StateStore<bool>) -> Option<()> {
            store.update(|busy| *busy = true);
            let _guard = store.finally(|busy| *busy = false);
            let missing: Option<()> = None;
            missing?;
            Some(())
        }

        let store = StateStore::new(false);
        assert!(early_return(&store).is_none());
        assert!(!store.snapshot());
    }
}
