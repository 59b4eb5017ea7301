use crate::{Principal, Role};

/// What a route demands of the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthRequirement {
    /// Open to everyone.
    #[default]
    None,
    /// Any authenticated user.
    AnyUser,
    /// An authenticated user holding this role.
    Role(Role),
}

/// Outcome of checking a principal against a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    /// Nobody is logged in; the visitor must authenticate first.
    NeedsLogin,
    /// Logged in, but without the required role.
    Forbidden,
}

/// Check `principal` (None when logged out) against `requirement`.
///
/// - No IO
/// - No panics
pub fn authorize(principal: Option<&Principal>, requirement: &AuthRequirement) -> AccessDecision {
    match (requirement, principal) {
        (AuthRequirement::None, _) => AccessDecision::Granted,
        (_, None) => AccessDecision::NeedsLogin,
        (AuthRequirement::AnyUser, Some(_)) => AccessDecision::Granted,
        (AuthRequirement::Role(role), Some(p)) if p.has_role(role) => AccessDecision::Granted,
        (AuthRequirement::Role(_), Some(_)) => AccessDecision::Forbidden,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use appealwall_core::UserId;

    use super::*;
    use crate::User;

    fn principal(roles: &[&'static str]) -> Principal {
        let now = Utc::now();
        let user = User {
            id: UserId::new(1),
            uid: "u1".into(),
            name: Some("Test".into()),
            created_at: now,
            updated_at: now,
        };
        Principal::new(user, roles.iter().map(|r| Role::from(*r)))
    }

    #[test]
    fn open_routes_admit_everyone() {
        assert_eq!(authorize(None, &AuthRequirement::None), AccessDecision::Granted);
        assert_eq!(
            authorize(Some(&principal(&[])), &AuthRequirement::None),
            AccessDecision::Granted
        );
    }

    #[test]
    fn anonymous_visitors_must_log_in() {
        assert_eq!(authorize(None, &AuthRequirement::AnyUser), AccessDecision::NeedsLogin);
        assert_eq!(
            authorize(None, &AuthRequirement::Role(Role::ADMIN)),
            AccessDecision::NeedsLogin
        );
    }

    #[test]
    fn missing_role_is_forbidden_not_login() {
        let p = principal(&["USER"]);
        assert_eq!(
            authorize(Some(&p), &AuthRequirement::Role(Role::ADMIN)),
            AccessDecision::Forbidden
        );
        assert_eq!(authorize(Some(&p), &AuthRequirement::AnyUser), AccessDecision::Granted);
    }

    #[test]
    fn holder_of_role_is_granted() {
        let p = principal(&["ADMIN"]);
        assert_eq!(
            authorize(Some(&p), &AuthRequirement::Role(Role::ADMIN)),
            AccessDecision::Granted
        );
    }
}
