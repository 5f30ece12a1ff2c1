//! Authorization policy.
//!
//! Every state-mutating [`Command`] and every restricted [`Query`] asks
//! [`authorize()`] for a [`Decision`] before touching the storage.
//!
//! [`Command`]: crate::Command
//! [`Query`]: crate::Query

use derive_more::{Display, Error};

use crate::domain::{
    user::{self, Role, Session},
    Business,
};

/// Party performing an [`Action`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Actor {
    /// Unauthenticated visitor.
    #[default]
    Anonymous,

    /// Service itself, like a start-up routine or a background task.
    System,

    /// Authenticated [`User`].
    ///
    /// [`User`]: crate::domain::User
    User {
        /// ID of the authenticated [`User`].
        ///
        /// [`User`]: crate::domain::User
        id: user::Id,

        /// [`Role`] of the authenticated [`User`].
        role: Role,
    },
}

impl From<Session> for Actor {
    fn from(session: Session) -> Self {
        Self::User {
            id: session.user_id,
            role: session.role,
        }
    }
}

impl Actor {
    /// Returns the ID of the [`User`] behind this [`Actor`], if any.
    ///
    /// [`User`]: crate::domain::User
    #[must_use]
    pub fn user_id(self) -> Option<user::Id> {
        match self {
            Self::User { id, .. } => Some(id),
            Self::Anonymous | Self::System => None,
        }
    }

    /// Indicates whether this [`Actor`] acts on behalf of the provided
    /// [`User`].
    ///
    /// [`User`]: crate::domain::User
    fn is(self, user_id: user::Id) -> bool {
        self.user_id() == Some(user_id)
    }

    /// Indicates whether this [`Actor`] has administrative privileges.
    fn is_privileged(self) -> bool {
        matches!(self, Self::System | Self::User { role: Role::Admin, .. })
    }
}

/// Action an [`Actor`] wants to perform.
#[derive(Clone, Copy, Debug)]
pub enum Action<'a> {
    /// Registering a new [`User`] with the provided [`Role`].
    ///
    /// [`User`]: crate::domain::User
    CreateUser(Role),

    /// Changing profile, password or subscription of the [`User`].
    ///
    /// [`User`]: crate::domain::User
    ManageAccount(user::Id),

    /// Creating a new [`Business`] listing.
    CreateBusiness,

    /// Editing or deleting the [`Business`].
    ManageBusiness(&'a Business),

    /// Marking the [`Business`] as featured.
    FeatureBusiness(&'a Business),

    /// Reviewing the [`Business`].
    ReviewBusiness(&'a Business),

    /// Tracking a view of or a click on the [`Business`].
    TrackBusiness(&'a Business),

    /// Viewing analytics of [`Business`]es owned by the [`User`].
    ///
    /// [`User`]: crate::domain::User
    ViewAnalytics(user::Id),

    /// Viewing platform-wide statistics.
    ViewPlatformStatistics,
}

/// Result of [`authorize()`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    /// [`Action`] is allowed.
    Allow,

    /// [`Action`] is denied.
    Deny,
}

impl Decision {
    /// Converts this [`Decision`] into a [`Result`].
    ///
    /// # Errors
    ///
    /// With [`Forbidden`] if this [`Decision`] is [`Decision::Deny`].
    pub fn ensure(self) -> Result<(), Forbidden> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny => Err(Forbidden),
        }
    }
}

impl From<bool> for Decision {
    fn from(allowed: bool) -> Self {
        if allowed {
            Self::Allow
        } else {
            Self::Deny
        }
    }
}

/// Error of a denied [`Action`].
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("Action is forbidden")]
pub struct Forbidden;

/// Decides whether the [`Actor`] may perform the [`Action`].
///
/// Privileged [`Actor`]s may do anything. Others are limited to their own
/// accounts, listings and analytics.
#[must_use]
pub fn authorize(actor: Actor, action: Action<'_>) -> Decision {
    if actor.is_privileged() {
        return Decision::Allow;
    }

    let authenticated = actor.user_id().is_some();
    Decision::from(match action {
        Action::CreateUser(role) => role == Role::User,
        Action::TrackBusiness(_) => true,
        Action::CreateBusiness | Action::ReviewBusiness(_) => authenticated,
        Action::ManageAccount(id) | Action::ViewAnalytics(id) => actor.is(id),
        Action::ManageBusiness(b) => actor.is(b.owner_id),
        Action::FeatureBusiness(_) | Action::ViewPlatformStatistics => false,
    })
}

#[cfg(test)]
mod spec {
    use crate::domain::user::{self, Role};

    use super::{authorize, Action, Actor, Decision};

    fn user(id: user::Id) -> Actor {
        Actor::User {
            id,
            role: Role::User,
        }
    }

    fn admin() -> Actor {
        Actor::User {
            id: user::Id::new(),
            role: Role::Admin,
        }
    }

    #[test]
    fn owner_manages_own_business_only() {
        let owner = user::Id::new();
        let mut b = crate::fixture::business("Cafe", "Coffee", "Main St");
        b.owner_id = owner;

        let a = Action::ManageBusiness(&b);
        assert_eq!(authorize(user(owner), a), Decision::Allow);
        assert_eq!(authorize(user(user::Id::new()), a), Decision::Deny);
        assert_eq!(authorize(Actor::Anonymous, a), Decision::Deny);
        assert_eq!(authorize(admin(), a), Decision::Allow);
    }

    #[test]
    fn featuring_and_platform_stats_are_admin_only() {
        let owner = user::Id::new();
        let mut b = crate::fixture::business("Cafe", "Coffee", "Main St");
        b.owner_id = owner;

        for a in [Action::FeatureBusiness(&b), Action::ViewPlatformStatistics] {
            assert_eq!(authorize(user(owner), a), Decision::Deny);
            assert_eq!(authorize(admin(), a), Decision::Allow);
            assert_eq!(authorize(Actor::System, a), Decision::Allow);
        }
    }

    #[test]
    fn anonymous_may_register_and_track_only() {
        let b = crate::fixture::business("Cafe", "Coffee", "Main St");

        assert!(authorize(Actor::Anonymous, Action::CreateUser(Role::User))
            .ensure()
            .is_ok());
        assert!(authorize(Actor::Anonymous, Action::TrackBusiness(&b))
            .ensure()
            .is_ok());

        assert!(authorize(Actor::Anonymous, Action::CreateUser(Role::Admin))
            .ensure()
            .is_err());
        assert!(authorize(Actor::Anonymous, Action::CreateBusiness)
            .ensure()
            .is_err());
        assert!(authorize(Actor::Anonymous, Action::ReviewBusiness(&b))
            .ensure()
            .is_err());
    }

    #[test]
    fn users_manage_own_accounts_and_analytics() {
        let me = user::Id::new();
        let other = user::Id::new();

        for a in [Action::ManageAccount(me), Action::ViewAnalytics(me)] {
            assert_eq!(authorize(user(me), a), Decision::Allow);
            assert_eq!(authorize(user(other), a), Decision::Deny);
            assert_eq!(authorize(admin(), a), Decision::Allow);
        }
        assert_eq!(
            authorize(user(me), Action::CreateUser(Role::Admin)),
            Decision::Deny,
        );
    }
}
