use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use updoot_core::engagement::{bookmark_membership, like_membership};
use updoot_core::{
    BookmarkStore, EngagementAction, EngagementBackend, EngagementKind, EngagementState,
    EngagementTarget, PcKind, SyncOutcome, SyncReport, User,
};

use crate::api::ApiClient;
use crate::config::EngagementConfig;
use crate::error::Result;
use crate::metrics;

/// Sends like and bookmark changes to the backend.
#[derive(Clone, Debug)]
pub struct RemoteEngagement {
    api: ApiClient,
}

#[async_trait]
impl EngagementBackend for RemoteEngagement {
    async fn set_membership(
        &self,
        kind: EngagementKind,
        target: &EngagementTarget,
        add: bool,
    ) -> updoot_core::Result<()> {
        let result = match (kind, add) {
            (EngagementKind::Like, _) => {
                self.api
                    .like(target.item_kind, &target.subject, &target.item_id, add)
                    .await
            }
            (EngagementKind::Bookmark, true) => {
                self.api
                    .add_bookmark(&target.subject, target.item_kind, &target.item_id)
                    .await
            }
            (EngagementKind::Bookmark, false) => {
                self.api
                    .delete_bookmark(&target.subject, target.item_kind, &target.item_id)
                    .await
            }
        };
        result.map_err(Into::into)
    }
}

impl RemoteEngagement {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// A fresh action wired to this backend, counting request outcomes.
    pub fn action(&self, kind: EngagementKind, config: &EngagementConfig) -> EngagementAction {
        self.action_with(kind, config, |_| {})
    }

    pub fn action_with<F>(&self, kind: EngagementKind, config: &EngagementConfig, on_sync: F) -> EngagementAction
    where
        F: Fn(&SyncReport) + Send + Sync + 'static,
    {
        EngagementAction::new(kind, Arc::new(self.clone()))
            .with_settle_delay(config.settle_delay())
            .with_snapshot_policy(config.snapshot_policy)
            .on_sync(move |report| {
                let outcome = match report.outcome {
                    SyncOutcome::Confirmed => "confirmed",
                    SyncOutcome::Failed(_) => "failed",
                };
                let kind = report.kind.to_string();
                metrics::ENGAGEMENT_SYNC_TOTAL
                    .with_label_values(&[kind.as_str(), outcome])
                    .inc();
                on_sync(&report);
            })
    }

    pub async fn is_bookmarked(&self, email: &str, kind: PcKind, item_id: &str) -> Result<bool> {
        let bookmark = self.api.bookmarks(email).await?;
        Ok(bookmark_membership(bookmark.as_ref(), kind, item_id))
    }

    pub async fn is_liked(&self, username: &str, item_id: &str) -> Result<bool> {
        let likes = self.api.likes(username).await?;
        Ok(like_membership(&likes, item_id))
    }

    /// Builds the like and bookmark actions of one item and seeds them from the backend.
    ///
    /// When a bookmark store is given, confirmed bookmark changes are applied to it.
    pub async fn load_item(
        &self,
        user: &User,
        item_id: &str,
        item_kind: PcKind,
        config: &EngagementConfig,
        store: Option<BookmarkStore>,
    ) -> Result<ItemEngagement> {
        let like = self.action(EngagementKind::Like, config);
        let bookmark = self.action_with(EngagementKind::Bookmark, config, move |report| {
            if let (Some(store), SyncOutcome::Confirmed) = (&store, &report.outcome) {
                store.apply(&report.target.item_id, report.requested);
            }
        });

        let (liked, bookmarked) = tokio::try_join!(
            self.is_liked(&user.username, item_id),
            self.is_bookmarked(&user.email, item_kind, item_id),
        )?;
        debug!(item_id, liked, bookmarked, "engagement snapshot loaded");
        like.initialize(liked);
        bookmark.initialize(bookmarked);

        Ok(ItemEngagement {
            like,
            bookmark,
            like_target: EngagementTarget::new(user.username.clone(), item_id, item_kind),
            bookmark_target: EngagementTarget::new(user.email.clone(), item_id, item_kind),
        })
    }
}

/// The like and bookmark controls of a single proposal or campaign.
#[derive(Debug)]
pub struct ItemEngagement {
    pub like: EngagementAction,
    pub bookmark: EngagementAction,
    like_target: EngagementTarget,
    bookmark_target: EngagementTarget,
}

impl ItemEngagement {
    pub fn toggle_like(&self) -> bool {
        self.like.toggle(self.like_target.clone())
    }

    pub fn toggle_bookmark(&self) -> bool {
        self.bookmark.toggle(self.bookmark_target.clone())
    }

    pub fn states(&self) -> (EngagementState, EngagementState) {
        (self.like.state(), self.bookmark.state())
    }
}
