//! Authentication provider seam and session loading.
//!
//! The managed auth service is only reached through [`AuthProvider`]. Once it
//! reports a signed-in identity, [`SessionLoader`] fetches the matching
//! backend user so the page guard can make its decision.

use async_trait::async_trait;
use tracing::{info, warn};
use updoot_core::validation::{is_strong_password, validate_login, LoginCredentials, SignUpDetails};
use updoot_core::{Language, Role, SessionState};

use crate::api::ApiClient;
use crate::error::{ClientError, Result};

/// Identity as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub sub: String,
    pub email: String,
    /// Display name; matches the backend username.
    pub name: String,
    pub email_verified: bool,
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// Waiting for the emailed verification code.
    CodeSent { destination: String },
    Confirmed,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn current_session(&self) -> Result<Option<AuthSession>>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession>;
    async fn sign_up(&self, details: &SignUpDetails, password: &str) -> Result<SignUpOutcome>;
    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<()>;
    async fn resend_code(&self, email: &str) -> Result<()>;
    async fn forgot_password(&self, email: &str) -> Result<()>;
    async fn submit_new_password(&self, email: &str, code: &str, password: &str) -> Result<()>;
    async fn change_password(&self, old_password: &str, new_password: &str) -> Result<()>;
    async fn sign_out(&self) -> Result<()>;
}

/// Joins the auth provider with the backend user record.
pub struct SessionLoader<A> {
    auth: A,
    api: ApiClient,
}

impl<A: AuthProvider> SessionLoader<A> {
    pub fn new(auth: A, api: ApiClient) -> Self {
        Self { auth, api }
    }

    pub fn auth(&self) -> &A {
        &self.auth
    }

    /// Anonymous when there is no session or the backend has no matching user.
    pub async fn load(&self) -> Result<SessionState> {
        let Some(session) = self.auth.current_session().await? else {
            return Ok(SessionState::Anonymous);
        };
        match self.api.user_by_username(&session.name).await {
            Ok(user) => Ok(SessionState::Authenticated(user)),
            Err(ClientError::Backend { message, .. }) => {
                warn!(name = %session.name, %message, "no backend user for session");
                Ok(SessionState::Anonymous)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn sign_in(&self, credentials: &LoginCredentials, lang: Language) -> Result<SessionState> {
        let errors = validate_login(credentials, lang);
        if let Some((field, message)) = errors.into_iter().next() {
            return Err(ClientError::Auth(format!("{}: {}", field, message)));
        }
        let session = self.auth.sign_in(&credentials.email, &credentials.password).await?;
        info!(name = %session.name, "signed in");
        let user = self.api.user_by_username(&session.name).await?;
        Ok(SessionState::Authenticated(user))
    }

    /// Second half of sign-up: confirms the code, then creates the backend account as a fan.
    pub async fn confirm_and_register(&self, details: &SignUpDetails, code: &str) -> Result<()> {
        self.auth.confirm_sign_up(&details.email, code).await?;
        self.api.register(&details.username, &details.email, Role::Fan).await
    }

    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<()> {
        if !is_strong_password(new_password) {
            return Err(ClientError::Auth("new password does not meet the requirements".to_string()));
        }
        self.auth.change_password(old_password, new_password).await
    }

    pub async fn sign_out(&self) -> Result<SessionState> {
        self.auth.sign_out().await?;
        Ok(SessionState::Anonymous)
    }
}
