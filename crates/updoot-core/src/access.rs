//! Role-based page access.
//!
//! Every top-level path segment belongs to a [`Scope`]. `admin` and `user`
//! pages are protected, anything else is public. A denied request resolves to
//! the role's own dashboard so the caller can redirect there.

use crate::types::{Role, User};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Admin,
    User,
    Public,
}

impl Scope {
    pub fn from_segment(segment: Option<&str>) -> Self {
        match segment {
            Some("admin") => Scope::Admin,
            Some("user") => Scope::User,
            _ => Scope::Public,
        }
    }
}

/// A sub-path inside an otherwise allowed scope that a role may not open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionDenial {
    pub scope: Scope,
    pub section: &'static str,
}

impl Role {
    /// Landing page used when a role is sent away from a page it cannot open.
    pub fn dashboard(&self) -> &'static str {
        match self {
            Role::Fan => "/user/proposals",
            Role::Staff => "/admin",
            Role::Manager => "/admin",
        }
    }

    pub fn allowed_scopes(&self) -> &'static [Scope] {
        match self {
            Role::Fan => &[Scope::User],
            Role::Staff | Role::Manager => &[Scope::Admin],
        }
    }

    pub fn denied_sections(&self) -> &'static [SectionDenial] {
        match self {
            Role::Staff => &[SectionDenial { scope: Scope::Admin, section: "financial" }],
            Role::Fan | Role::Manager => &[],
        }
    }

    pub fn can_access(&self, scope: Scope, section: Option<&str>) -> bool {
        if scope == Scope::Public {
            return true;
        }
        if !self.allowed_scopes().contains(&scope) {
            return false;
        }
        !self
            .denied_sections()
            .iter()
            .any(|d| d.scope == scope && Some(d.section) == section)
    }
}

/// Returns the redirect target when `role` may not open `path`, `None` when it may.
pub fn resolve(path: &str, role: Role) -> Option<&'static str> {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let scope = Scope::from_segment(segments.next());
    let section = segments.next();

    if role.can_access(scope, section) {
        None
    } else {
        debug!(%role, path, redirect = role.dashboard(), "page access denied");
        Some(role.dashboard())
    }
}

pub fn resolve_for(path: &str, user: &User) -> Option<&'static str> {
    resolve(path, user.role)
}

/// Role and dashboard link of the signed-in user, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoleContext {
    pub role: Option<Role>,
    pub dashboard_link: Option<&'static str>,
}

pub fn role_context(user: Option<&User>) -> RoleContext {
    match user {
        Some(u) => RoleContext {
            role: Some(u.role),
            dashboard_link: Some(u.role.dashboard()),
        },
        None => RoleContext::default(),
    }
}

/// What the session provider currently knows about the visitor.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Loading,
    Anonymous,
    Authenticated(User),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageDecision {
    Render,
    Redirect(String),
    /// Nothing to render yet; show a loader.
    Wait,
}

/// Decision for a protected page.
pub fn guard(path: &str, session: &SessionState) -> PageDecision {
    match session {
        SessionState::Loading => PageDecision::Wait,
        SessionState::Anonymous => PageDecision::Redirect("/".to_string()),
        SessionState::Authenticated(user) => match resolve_for(path, user) {
            Some(target) => PageDecision::Redirect(target.to_string()),
            None => PageDecision::Render,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: "u1".into(),
            username: "mina".into(),
            email: "mina@example.com".into(),
            role,
            company_id: None,
            brand: None,
            manager_role: None,
            profile_picture: String::new(),
            wallet_address: String::new(),
            encrypted_seed: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_public_paths_always_allowed() {
        for role in Role::ALL {
            for path in ["", "/", "/help", "legal", "/campaigns/abc", "/proposals/x/y", "//settings"] {
                assert_eq!(resolve(path, role), None, "{} on {:?}", role, path);
            }
        }
    }

    #[test]
    fn test_financial_access_per_role() {
        assert_eq!(resolve("admin/financial", Role::Fan), Some("/user/proposals"));
        assert_eq!(resolve("admin/financial", Role::Staff), Some("/admin"));
        assert_eq!(resolve("admin/financial", Role::Manager), None);
    }

    #[test]
    fn test_staff_keeps_other_admin_pages() {
        assert_eq!(resolve("/admin/campaigns", Role::Staff), None);
        assert_eq!(resolve("/admin", Role::Staff), None);
        assert_eq!(resolve("/admin/campaigns/statistics/42", Role::Staff), None);
    }

    #[test]
    fn test_cross_scope_denial() {
        assert_eq!(resolve("/user/wallet", Role::Manager), Some("/admin"));
        assert_eq!(resolve("/user/wallet", Role::Staff), Some("/admin"));
        assert_eq!(resolve("/user/wallet", Role::Fan), None);
        assert_eq!(resolve("/admin", Role::Fan), Some("/user/proposals"));
    }

    #[test]
    fn test_resolve_is_deterministic() {
        for role in Role::ALL {
            for path in ["/admin/financial", "/user", "x"] {
                assert_eq!(resolve(path, role), resolve(path, role));
            }
        }
    }

    #[test]
    fn test_guard_staff_financial_redirects() {
        let session = SessionState::Authenticated(user(Role::Staff));
        assert_eq!(
            guard("/admin/financial", &session),
            PageDecision::Redirect("/admin".to_string())
        );
        assert_eq!(guard("/admin/approval", &session), PageDecision::Render);
    }

    #[test]
    fn test_guard_without_user() {
        assert_eq!(guard("/admin", &SessionState::Loading), PageDecision::Wait);
        assert_eq!(
            guard("/admin", &SessionState::Anonymous),
            PageDecision::Redirect("/".to_string())
        );
    }

    #[test]
    fn test_role_context() {
        let fan = user(Role::Fan);
        let ctx = role_context(Some(&fan));
        assert_eq!(ctx.role, Some(Role::Fan));
        assert_eq!(ctx.dashboard_link, Some("/user/proposals"));
        assert_eq!(role_context(None), RoleContext::default());
    }
}
