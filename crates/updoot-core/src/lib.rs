pub mod types;
pub mod access;
pub mod engagement;
pub mod bookmarks;
pub mod validation;
pub mod funding;
pub mod dates;

pub use types::{PcKind, Role, User, Currency};
pub use access::{resolve, resolve_for, guard, role_context, PageDecision, RoleContext, Scope, SessionState};
pub use engagement::{
    EngagementAction, EngagementBackend, EngagementKind, EngagementState, EngagementTarget,
    SnapshotPolicy, SyncOutcome, SyncReport,
};
pub use bookmarks::BookmarkStore;
pub use validation::Language;

use thiserror::Error;

/// Core error type for client-side state operations
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Request Failed: {0}")]
    Request(String),
    #[error("Invalid Input: {0}")]
    InvalidInput(String),
    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Internal Error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
