//! Authorization gate: role-based allow/deny.

use std::collections::BTreeSet;

use common::{AppError, AppResult};
use domain::{DomainError, DomainResult, UserRole};

use super::authentication::AuthenticatedUser;

/// Non-empty set of roles allowed on a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSet(BTreeSet<UserRole>);

impl RoleSet {
    pub fn new(roles: impl IntoIterator<Item = UserRole>) -> DomainResult<Self> {
        let roles: BTreeSet<UserRole> = roles.into_iter().collect();
        if roles.is_empty() {
            return Err(DomainError::validation("Role set must not be empty"));
        }
        Ok(Self(roles))
    }

    pub fn contains(&self, role: UserRole) -> bool {
        self.0.contains(&role)
    }

    pub fn iter(&self) -> impl Iterator<Item = UserRole> + '_ {
        self.0.iter().copied()
    }
}

/// What a route demands of its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessPolicy {
    /// No token needed; the gate is skipped
    Public,
    /// Any valid token
    AnyAuthenticated,
    /// Valid token whose role is in the set
    RequireRoles(RoleSet),
}

impl AccessPolicy {
    pub fn roles(roles: impl IntoIterator<Item = UserRole>) -> DomainResult<Self> {
        RoleSet::new(roles).map(AccessPolicy::RequireRoles)
    }

    pub fn is_public(&self) -> bool {
        matches!(self, AccessPolicy::Public)
    }

    pub fn required_roles(&self) -> Option<&RoleSet> {
        match self {
            AccessPolicy::RequireRoles(roles) => Some(roles),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn into_result(self) -> AppResult<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny => Err(AppError::Forbidden),
        }
    }
}

/// Allow when no roles are required or the caller's role is among them.
pub fn authorize(identity: &AuthenticatedUser, required: Option<&RoleSet>) -> Decision {
    match required {
        Some(roles) if !roles.contains(identity.role) => Decision::Deny,
        _ => Decision::Allow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: UserRole) -> AuthenticatedUser {
        AuthenticatedUser {
            id: 1,
            email: "someone@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn test_empty_role_set_rejected() {
        assert!(RoleSet::new(Vec::<UserRole>::new()).is_err());
        assert!(AccessPolicy::roles(Vec::<UserRole>::new()).is_err());
    }

    #[test]
    fn test_no_required_roles_allows_everyone() {
        for role in [UserRole::Admin, UserRole::User, UserRole::Driver] {
            assert_eq!(authorize(&identity(role), None), Decision::Allow);
        }
    }

    #[test]
    fn test_admin_only() {
        let admins = RoleSet::new([UserRole::Admin]).unwrap();

        assert_eq!(authorize(&identity(UserRole::Admin), Some(&admins)), Decision::Allow);
        assert_eq!(authorize(&identity(UserRole::User), Some(&admins)), Decision::Deny);
        assert_eq!(authorize(&identity(UserRole::Driver), Some(&admins)), Decision::Deny);
    }

    #[test]
    fn test_multi_role_set() {
        let staff = RoleSet::new([UserRole::Admin, UserRole::Driver, UserRole::Admin]).unwrap();

        assert_eq!(staff.iter().count(), 2);
        assert_eq!(authorize(&identity(UserRole::Driver), Some(&staff)), Decision::Allow);
        assert_eq!(authorize(&identity(UserRole::User), Some(&staff)), Decision::Deny);
    }

    #[test]
    fn test_deny_maps_to_forbidden() {
        assert!(matches!(Decision::Deny.into_result(), Err(AppError::Forbidden)));
        assert!(Decision::Allow.into_result().is_ok());
    }

    #[test]
    fn test_policy_helpers() {
        assert!(AccessPolicy::Public.is_public());
        assert!(AccessPolicy::AnyAuthenticated.required_roles().is_none());
        let policy = AccessPolicy::roles([UserRole::Admin]).unwrap();
        assert!(policy.required_roles().unwrap().contains(UserRole::Admin));
    }
}
