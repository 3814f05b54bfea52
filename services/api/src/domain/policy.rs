//! Role-scoped authorization.
//!
//! Every mutating operation names an [`Action`]. An action requires exactly
//! one role, except that ADMIN may perform any action. When the action
//! targets a row owned by a user (a profile, or the left endpoint of a
//! relationship), the caller must also be that owner.

use cisne_auth_types::principal::Principal;
use cisne_domain::id::EntityId;
use cisne_domain::link::LinkKind;
use cisne_domain::role::Role;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // centre
    ManageCentre,
    ManageEmployment,
    ManagePosting,
    ManageCourse,
    // therapist
    ManageTherapist,
    ManageTreatment,
    AcquireCourse,
    ManagePublication,
    ManageResource,
    // patient
    ManagePatient,
    PayService,
    ConsumeResource,
    // admin only
    ManageCatalog,
    ManageUsers,
}

impl Action {
    pub fn required_role(self) -> Role {
        match self {
            Self::ManageCentre
            | Self::ManageEmployment
            | Self::ManagePosting
            | Self::ManageCourse => Role::Centre,
            Self::ManageTherapist
            | Self::ManageTreatment
            | Self::AcquireCourse
            | Self::ManagePublication
            | Self::ManageResource => Role::Therapist,
            Self::ManagePatient | Self::PayService | Self::ConsumeResource => Role::Patient,
            Self::ManageCatalog | Self::ManageUsers => Role::Admin,
        }
    }
}

/// Relationship writes are authorized against the left endpoint's role.
impl From<LinkKind> for Action {
    fn from(kind: LinkKind) -> Self {
        match kind {
            LinkKind::Employs => Self::ManageEmployment,
            LinkKind::Treats => Self::ManageTreatment,
            LinkKind::Pays => Self::PayService,
            LinkKind::Posts => Self::ManagePosting,
            LinkKind::Buys => Self::AcquireCourse,
            LinkKind::Publish => Self::ManagePublication,
            LinkKind::Consume => Self::ConsumeResource,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Role,
    NotOwner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn into_result(self) -> Result<(), ApiError> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(DenyReason::Role) => Err(ApiError::ForbiddenRole),
            Self::Deny(DenyReason::NotOwner) => Err(ApiError::ForbiddenNotOwner),
        }
    }
}

/// Decide whether `principal` may perform `action` on a row owned by `owner`.
///
/// `owner` is `None` when the target has no resolvable owner (for example a
/// course no centre posts); only ADMIN passes in that case.
pub fn authorize(principal: &Principal, action: Action, owner: Option<EntityId>) -> Decision {
    if principal.is_admin() {
        return Decision::Allow;
    }
    if principal.role != action.required_role() {
        return Decision::Deny(DenyReason::Role);
    }
    match owner {
        Some(owner) if owner == principal.id => Decision::Allow,
        _ => Decision::Deny(DenyReason::NotOwner),
    }
}

/// Role-only check for actions on rows the caller is about to create.
pub fn authorize_role(principal: &Principal, action: Action) -> Decision {
    authorize(principal, action, Some(principal.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(id: i32, role: Role) -> Principal {
        Principal {
            id: EntityId::new(id),
            email: format!("{}@cisne.test", role.as_str().to_lowercase()),
            role,
        }
    }

    const ALL_ACTIONS: [Action; 14] = [
        Action::ManageCentre,
        Action::ManageEmployment,
        Action::ManagePosting,
        Action::ManageCourse,
        Action::ManageTherapist,
        Action::ManageTreatment,
        Action::AcquireCourse,
        Action::ManagePublication,
        Action::ManageResource,
        Action::ManagePatient,
        Action::PayService,
        Action::ConsumeResource,
        Action::ManageCatalog,
        Action::ManageUsers,
    ];

    #[test]
    fn admin_is_allowed_everything() {
        let admin = principal(1, Role::Admin);
        for action in ALL_ACTIONS {
            assert_eq!(authorize(&admin, action, None), Decision::Allow);
            assert_eq!(
                authorize(&admin, action, Some(EntityId::new(99))),
                Decision::Allow
            );
        }
    }

    #[test]
    fn owner_with_matching_role_is_allowed() {
        for action in ALL_ACTIONS {
            let role = action.required_role();
            if role == Role::Admin {
                continue;
            }
            let caller = principal(7, role);
            assert_eq!(
                authorize(&caller, action, Some(EntityId::new(7))),
                Decision::Allow,
                "{action:?}"
            );
        }
    }

    #[test]
    fn wrong_role_is_denied_before_ownership() {
        let therapist = principal(7, Role::Therapist);
        assert_eq!(
            authorize(&therapist, Action::ManageEmployment, Some(EntityId::new(7))),
            Decision::Deny(DenyReason::Role)
        );
        assert_eq!(
            authorize(&therapist, Action::ManageCatalog, None),
            Decision::Deny(DenyReason::Role)
        );
    }

    #[test]
    fn other_owner_is_denied() {
        let centre = principal(4, Role::Centre);
        assert_eq!(
            authorize(&centre, Action::ManageEmployment, Some(EntityId::new(5))),
            Decision::Deny(DenyReason::NotOwner)
        );
    }

    #[test]
    fn unresolved_owner_is_denied_for_non_admin() {
        let centre = principal(4, Role::Centre);
        assert_eq!(
            authorize(&centre, Action::ManageCourse, None),
            Decision::Deny(DenyReason::NotOwner)
        );
    }

    #[test]
    fn string_and_numeric_ids_compare_equal() {
        let from_path: EntityId = "4".parse().unwrap();
        let centre = principal(4, Role::Centre);
        assert_eq!(
            authorize(&centre, Action::ManageCentre, Some(from_path)),
            Decision::Allow
        );
    }

    #[test]
    fn role_only_check_ignores_ownership() {
        assert_eq!(
            authorize_role(&principal(3, Role::Therapist), Action::ManageResource),
            Decision::Allow
        );
        assert_eq!(
            authorize_role(&principal(3, Role::Patient), Action::ManageResource),
            Decision::Deny(DenyReason::Role)
        );
    }

    #[test]
    fn link_kinds_map_to_left_endpoint_role() {
        for kind in LinkKind::ALL {
            let expected = match kind.left() {
                cisne_domain::entity::EntityKind::Centre => Role::Centre,
                cisne_domain::entity::EntityKind::Therapist => Role::Therapist,
                cisne_domain::entity::EntityKind::Patient => Role::Patient,
                other => panic!("unexpected left endpoint {other}"),
            };
            assert_eq!(Action::from(kind).required_role(), expected, "{kind}");
        }
    }

    #[test]
    fn decisions_map_to_forbidden_errors() {
        assert!(Decision::Allow.into_result().is_ok());
        assert!(matches!(
            Decision::Deny(DenyReason::Role).into_result(),
            Err(ApiError::ForbiddenRole)
        ));
        assert!(matches!(
            Decision::Deny(DenyReason::NotOwner).into_result(),
            Err(ApiError::ForbiddenNotOwner)
        ));
    }
}
