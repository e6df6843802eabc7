pub mod config;
pub mod error;
pub mod api;
pub mod engagement;
pub mod session;
pub mod storage;
pub mod metrics;

pub use api::{ApiClient, Envelope, Namespace, ProposalDraft, ProposalSave};
pub use config::Config;
pub use engagement::RemoteEngagement;
pub use error::{ClientError, Result};
pub use session::{AuthProvider, AuthSession, SessionLoader};
pub use storage::{LocalObjectStore, ObjectMetadata, ObjectStore};
