//! Optimistic like/bookmark toggles.
//!
//! An [`EngagementAction`] holds the believed membership of one (user, item)
//! pair. A toggle moves it to `Pending`, fires a single request through the
//! [`EngagementBackend`] without waiting for it, and settles on the requested
//! state after a fixed delay whether or not the request went through. The
//! request outcome is only reported through the optional sync callback.
//!
//! Toggling spawns tokio tasks and must happen inside a runtime.

use crate::types::{Bookmark, Like, PcKind};
use crate::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngagementState {
    Inactive,
    Pending,
    Active,
}

impl EngagementState {
    pub fn from_membership(is_member: bool) -> Self {
        if is_member {
            EngagementState::Active
        } else {
            EngagementState::Inactive
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngagementKind {
    Like,
    Bookmark,
}

impl fmt::Display for EngagementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngagementKind::Like => f.write_str("like"),
            EngagementKind::Bookmark => f.write_str("bookmark"),
        }
    }
}

/// Who engages with what. `subject` is the username for likes and the email for bookmarks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EngagementTarget {
    pub subject: String,
    pub item_id: String,
    pub item_kind: PcKind,
}

impl EngagementTarget {
    pub fn new(subject: impl Into<String>, item_id: impl Into<String>, item_kind: PcKind) -> Self {
        Self {
            subject: subject.into(),
            item_id: item_id.into(),
            item_kind,
        }
    }
}

/// Remote side of an engagement: adds or removes the membership server-side.
#[async_trait]
pub trait EngagementBackend: Send + Sync {
    async fn set_membership(
        &self,
        kind: EngagementKind,
        target: &EngagementTarget,
        add: bool,
    ) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Confirmed,
    Failed(String),
}

/// Result of the background request behind one toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub kind: EngagementKind,
    pub target: EngagementTarget,
    pub requested: EngagementState,
    pub outcome: SyncOutcome,
}

pub type SyncCallback = Arc<dyn Fn(SyncReport) + Send + Sync>;

/// How a membership snapshot interacts with state the user already changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotPolicy {
    /// Every snapshot replaces the current state, even after a manual toggle.
    #[default]
    Overwrite,
    /// Snapshots only seed the state until the first toggle.
    SeedOnly,
}

#[derive(Debug)]
struct ActionState {
    state: EngagementState,
    toggled: bool,
    /// Bumped by every toggle and applied snapshot; a settle timer only
    /// writes while its generation is current.
    generation: u64,
}

pub struct EngagementAction {
    kind: EngagementKind,
    shared: Arc<Mutex<ActionState>>,
    backend: Arc<dyn EngagementBackend>,
    settle_delay: Duration,
    policy: SnapshotPolicy,
    on_sync: Option<SyncCallback>,
}

impl EngagementAction {
    /// Starts `Pending` until the first snapshot arrives, so early clicks are ignored.
    pub fn new(kind: EngagementKind, backend: Arc<dyn EngagementBackend>) -> Self {
        Self {
            kind,
            shared: Arc::new(Mutex::new(ActionState {
                state: EngagementState::Pending,
                toggled: false,
                generation: 0,
            })),
            backend,
            settle_delay: DEFAULT_SETTLE_DELAY,
            policy: SnapshotPolicy::default(),
            on_sync: None,
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_snapshot_policy(mut self, policy: SnapshotPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn on_sync<F>(mut self, callback: F) -> Self
    where
        F: Fn(SyncReport) + Send + Sync + 'static,
    {
        self.on_sync = Some(Arc::new(callback));
        self
    }

    pub fn kind(&self) -> EngagementKind {
        self.kind
    }

    pub fn state(&self) -> EngagementState {
        self.shared.lock().state
    }

    /// Applies a server membership snapshot and returns the resulting state.
    pub fn initialize(&self, is_member: bool) -> EngagementState {
        let mut shared = self.shared.lock();
        if shared.toggled {
            match self.policy {
                SnapshotPolicy::SeedOnly => {
                    debug!(kind = %self.kind, "snapshot ignored after manual toggle");
                    return shared.state;
                }
                SnapshotPolicy::Overwrite => {
                    warn!(kind = %self.kind, is_member, "late snapshot overwrites a manual toggle");
                }
            }
        }
        shared.generation += 1;
        shared.state = EngagementState::from_membership(is_member);
        shared.state
    }

    /// Flips the membership optimistically. Returns `false` when the call was
    /// dropped because a previous toggle is still pending.
    pub fn toggle(&self, target: EngagementTarget) -> bool {
        let (requested, generation) = {
            let mut shared = self.shared.lock();
            let requested = match shared.state {
                EngagementState::Pending => return false,
                EngagementState::Inactive => EngagementState::Active,
                EngagementState::Active => EngagementState::Inactive,
            };
            shared.state = EngagementState::Pending;
            shared.toggled = true;
            shared.generation += 1;
            (requested, shared.generation)
        };

        self.send(target, requested);

        let shared = Arc::downgrade(&self.shared);
        let delay = self.settle_delay;
        let kind = self.kind;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(shared) = shared.upgrade() else {
                debug!(%kind, "action dropped before settling");
                return;
            };
            let mut shared = shared.lock();
            if shared.generation == generation {
                shared.state = requested;
            } else {
                debug!(%kind, "settle superseded by a newer toggle or snapshot");
            }
        });

        true
    }

    fn send(&self, target: EngagementTarget, requested: EngagementState) {
        let backend = self.backend.clone();
        let on_sync = self.on_sync.clone();
        let kind = self.kind;
        let add = requested == EngagementState::Active;

        tokio::spawn(async move {
            let outcome = match backend.set_membership(kind, &target, add).await {
                Ok(()) => SyncOutcome::Confirmed,
                Err(e) => {
                    warn!(%kind, item = %target.item_id, error = %e, "engagement request failed");
                    SyncOutcome::Failed(e.to_string())
                }
            };
            if let Some(callback) = on_sync {
                callback(SyncReport {
                    kind,
                    target,
                    requested,
                    outcome,
                });
            }
        });
    }
}

impl fmt::Debug for EngagementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngagementAction")
            .field("kind", &self.kind)
            .field("state", &self.state())
            .field("settle_delay", &self.settle_delay)
            .field("policy", &self.policy)
            .finish()
    }
}

/// Membership of `item_id` in a bookmark record, `false` when the user has none yet.
pub fn bookmark_membership(bookmark: Option<&Bookmark>, kind: PcKind, item_id: &str) -> bool {
    bookmark.map_or(false, |b| b.contains(kind, item_id))
}

pub fn like_membership(likes: &[Like], item_id: &str) -> bool {
    likes.iter().any(|like| like.type_id == item_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopBackend;

    #[async_trait]
    impl EngagementBackend for NoopBackend {
        async fn set_membership(&self, _: EngagementKind, _: &EngagementTarget, _: bool) -> Result<()> {
            Ok(())
        }
    }

    fn action() -> EngagementAction {
        EngagementAction::new(EngagementKind::Like, Arc::new(NoopBackend))
    }

    #[test]
    fn test_starts_pending() {
        assert_eq!(action().state(), EngagementState::Pending);
    }

    #[test]
    fn test_initialize_sets_membership() {
        let a = action();
        assert_eq!(a.initialize(true), EngagementState::Active);
        assert_eq!(a.initialize(false), EngagementState::Inactive);
    }

    #[test]
    fn test_toggle_ignored_before_snapshot() {
        let a = action();
        assert!(!a.toggle(EngagementTarget::new("mina", "p1", PcKind::Proposal)));
        assert_eq!(a.state(), EngagementState::Pending);
    }

    #[test]
    fn test_membership_helpers() {
        let likes = vec![Like {
            kind: PcKind::Proposal,
            type_id: "p1".into(),
            username: "mina".into(),
            timestamp: 0,
        }];
        assert!(like_membership(&likes, "p1"));
        assert!(!like_membership(&likes, "p2"));
        assert!(!bookmark_membership(None, PcKind::Proposal, "p1"));
    }
}
