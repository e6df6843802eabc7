use crate::engagement::EngagementState;
use std::sync::Arc;
use tokio::sync::watch;

/// Bookmark ids shared between sibling views.
///
/// Owned by the closest common parent and cloned into every view that reads
/// or changes the list. Views that need to react to changes hold a
/// [`watch::Receiver`] from [`BookmarkStore::subscribe`].
#[derive(Clone, Debug)]
pub struct BookmarkStore {
    tx: Arc<watch::Sender<Vec<String>>>,
}

impl BookmarkStore {
    pub fn new(ids: Vec<String>) -> Self {
        let (tx, _rx) = watch::channel(ids);
        Self { tx: Arc::new(tx) }
    }

    pub fn get(&self) -> Vec<String> {
        self.tx.borrow().clone()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tx.borrow().iter().any(|b| b == id)
    }

    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<String>> {
        self.tx.subscribe()
    }

    /// Runs `f` on the list; subscribers are notified only if it returns `true`.
    pub fn mutate<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut Vec<String>) -> bool,
    {
        self.tx.send_if_modified(f)
    }

    pub fn replace(&self, ids: Vec<String>) {
        self.tx.send_replace(ids);
    }

    /// Adds or removes `id` to match a settled engagement state. `Pending` is a no-op.
    pub fn apply(&self, id: &str, state: EngagementState) -> bool {
        self.mutate(|ids| match state {
            EngagementState::Active if !ids.iter().any(|b| b == id) => {
                ids.push(id.to_string());
                true
            }
            EngagementState::Inactive => {
                let before = ids.len();
                ids.retain(|b| b != id);
                ids.len() != before
            }
            _ => false,
        })
    }
}

impl Default for BookmarkStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_adds_and_removes() {
        let store = BookmarkStore::new(vec!["p1".into()]);
        assert!(store.apply("p2", EngagementState::Active));
        assert!(!store.apply("p2", EngagementState::Active));
        assert_eq!(store.get(), vec!["p1".to_string(), "p2".to_string()]);

        assert!(store.apply("p1", EngagementState::Inactive));
        assert!(!store.contains("p1"));
        assert!(!store.apply("p1", EngagementState::Pending));
    }

    #[test]
    fn test_clones_share_the_list() {
        let store = BookmarkStore::default();
        let view = store.clone();
        store.replace(vec!["c1".into()]);
        assert!(view.contains("c1"));
        assert_eq!(view.len(), 1);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let store = BookmarkStore::default();
        let mut rx = store.subscribe();

        store.apply("p9", EngagementState::Active);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), vec!["p9".to_string()]);

        // no-op mutations do not wake subscribers
        store.apply("p9", EngagementState::Active);
        assert!(!rx.has_changed().unwrap());
    }
}
