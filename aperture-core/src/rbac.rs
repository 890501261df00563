//! Role-based access control.
//!
//! Every protected operation declares its own explicit allow-list of roles;
//! roles are NOT hierarchical, so an admin only passes lists that name
//! `Admin`. Operations on owned resources layer a second check on top: a
//! plain user must own the resource, while the operation's elevated roles
//! bypass ownership entirely.
//!
//! ## Example
//!
//! ```
//! use uuid::Uuid;
//! use aperture_core::rbac::{authorize, authorize_owned, policies, Principal};
//! use aperture_core::account::Role;
//!
//! let caller = Principal { id: Uuid::new_v4(), role: Role::User };
//! assert!(authorize(caller.role, policies::RATINGS_CREATE).is_ok());
//! assert!(authorize(caller.role, policies::RATINGS_MODERATE).is_err());
//!
//! // Owners edit their own images; moderators and admins edit anyone's.
//! let own_image = caller.id;
//! assert!(authorize_owned(&caller, policies::IMAGES_EDIT, own_image, policies::IMAGE_ELEVATED).is_ok());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::account::Role;

/// The authenticated caller, reduced to what authorization needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    #[error("forbidden")]
    Forbidden,
}

/// Pure allow-list predicate.
///
/// No IO, no hierarchy: the role must literally appear in `allowed`.
pub fn authorize(role: Role, allowed: &[Role]) -> Result<(), AuthorizationError> {
    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(AuthorizationError::Forbidden)
    }
}

/// Allow-list plus ownership layering, as one reusable construct.
///
/// The principal must pass `allowed`, and then either hold one of the
/// `elevated` roles or own the resource. This replaces the per-resource
/// "admin sees everything, users see their own" branches.
pub fn authorize_owned(
    principal: &Principal,
    allowed: &[Role],
    resource_owner: Uuid,
    elevated: &[Role],
) -> Result<(), AuthorizationError> {
    authorize(principal.role, allowed)?;
    if elevated.contains(&principal.role) || principal.id == resource_owner {
        Ok(())
    } else {
        Err(AuthorizationError::Forbidden)
    }
}

/// Per-operation allow-lists.
///
/// These mirror the route surface: viewing and creating are open to every
/// authenticated role, moderation verbs are reserved for staff, and image
/// mutation elevates staff past the ownership check.
pub mod policies {
    use crate::account::Role;

    pub const EVERYONE: &[Role] = &[Role::Admin, Role::Moderator, Role::User];
    pub const STAFF: &[Role] = &[Role::Admin, Role::Moderator];

    pub const PROFILES_VIEW: &[Role] = EVERYONE;
    pub const PROFILES_EDIT: &[Role] = EVERYONE;

    pub const RATINGS_VIEW: &[Role] = EVERYONE;
    pub const RATINGS_CREATE: &[Role] = EVERYONE;
    pub const RATINGS_MODERATE: &[Role] = STAFF;

    pub const TAGS_VIEW: &[Role] = EVERYONE;
    pub const TAGS_CREATE: &[Role] = EVERYONE;
    pub const TAGS_MODERATE: &[Role] = STAFF;

    pub const IMAGES_EDIT: &[Role] = EVERYONE;
    /// Roles that bypass the ownership check on image mutation.
    pub const IMAGE_ELEVATED: &[Role] = STAFF;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_is_exact() {
        assert!(authorize(Role::Admin, &[Role::Admin]).is_ok());
        assert_eq!(
            authorize(Role::User, &[Role::Admin, Role::Moderator]),
            Err(AuthorizationError::Forbidden)
        );
    }

    #[test]
    fn roles_are_not_hierarchical() {
        // Admin is not implicitly included in a moderator-only list.
        assert_eq!(
            authorize(Role::Admin, &[Role::Moderator]),
            Err(AuthorizationError::Forbidden)
        );
    }

    #[test]
    fn owner_passes_ownership_check() {
        let caller = Principal {
            id: Uuid::new_v4(),
            role: Role::User,
        };
        assert!(
            authorize_owned(&caller, policies::IMAGES_EDIT, caller.id, policies::IMAGE_ELEVATED)
                .is_ok()
        );
    }

    #[test]
    fn non_owner_user_is_forbidden() {
        let caller = Principal {
            id: Uuid::new_v4(),
            role: Role::User,
        };
        assert_eq!(
            authorize_owned(
                &caller,
                policies::IMAGES_EDIT,
                Uuid::new_v4(),
                policies::IMAGE_ELEVATED
            ),
            Err(AuthorizationError::Forbidden)
        );
    }

    #[test]
    fn elevated_roles_bypass_ownership() {
        for role in [Role::Admin, Role::Moderator] {
            let caller = Principal {
                id: Uuid::new_v4(),
                role,
            };
            assert!(
                authorize_owned(
                    &caller,
                    policies::IMAGES_EDIT,
                    Uuid::new_v4(),
                    policies::IMAGE_ELEVATED
                )
                .is_ok()
            );
        }
    }

    #[test]
    fn ownership_never_rescues_a_failed_allow_list() {
        let caller = Principal {
            id: Uuid::new_v4(),
            role: Role::User,
        };
        assert_eq!(
            authorize_owned(&caller, policies::STAFF, caller.id, policies::IMAGE_ELEVATED),
            Err(AuthorizationError::Forbidden)
        );
    }
}
