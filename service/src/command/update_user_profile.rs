//! [`Command`] for updating a [`User`] profile.

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{database, Database},
    policy::{self, Action, Actor},
    Service,
};

use super::Command;

/// [`Command`] for updating a [`User`] profile.
///
/// [`None`] fields are left untouched.
#[derive(Clone, Debug)]
pub struct UpdateUserProfile {
    /// [`Actor`] performing this [`Command`].
    pub actor: Actor,

    /// ID of the [`User`] to update.
    pub user_id: user::Id,

    /// New [`user::Name`] of the [`User`].
    pub name: Option<user::Name>,

    /// New [`user::Email`] of the [`User`].
    pub email: Option<user::Email>,

    /// New [`user::BusinessName`] of the [`User`].
    pub business_name: Option<user::BusinessName>,

    /// New [`user::BusinessAddress`] of the [`User`].
    pub business_address: Option<user::BusinessAddress>,
}

impl<Db> Command<UpdateUserProfile> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Update<User>,
            Ok = bool,
            Err = Traced<database::Error>,
        >,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateUserProfile,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateUserProfile {
            actor,
            user_id,
            name,
            email,
            business_name,
            business_address,
        } = cmd;

        policy::authorize(actor, Action::ManageAccount(user_id))
            .ensure()
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let mut user = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        if let Some(email) = email.filter(|e| *e != user.email) {
            let occupied = self
                .database()
                .execute(Select(By::<Option<User>, _>::new(email.clone())))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .is_some();
            if occupied {
                return Err(tracerr::new!(E::EmailOccupied(email)));
            }
            user.email = email;
        }
        if let Some(name) = name {
            user.name = name;
        }
        if let Some(business_name) = business_name {
            user.business_name = Some(business_name);
        }
        if let Some(business_address) = business_address {
            user.business_address = Some(business_address);
        }

        let updated = self
            .database()
            .execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !updated {
            return Err(tracerr::new!(E::UserNotExists(user_id)));
        }

        Ok(user)
    }
}

/// Error of [`UpdateUserProfile`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`user::Email`] is already occupied by another [`User`].
    #[display("`{_0}` email is occupied")]
    EmailOccupied(#[error(not(source))] user::Email),

    /// [`Actor`] is not allowed to update the [`User`].
    #[display("Updating `User` profile is forbidden")]
    #[from]
    Forbidden(policy::Forbidden),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use crate::{domain::user, fixture, policy::Actor, Command as _};

    use super::{ExecutionError, UpdateUserProfile};

    fn update(actor: Actor, user_id: user::Id) -> UpdateUserProfile {
        UpdateUserProfile {
            actor,
            user_id,
            name: None,
            email: None,
            business_name: None,
            business_address: None,
        }
    }

    #[tokio::test]
    async fn updates_provided_fields_only() {
        let svc = fixture::service();
        let joe = fixture::register(&svc, "joe@example.com").await;

        let updated = svc
            .execute(UpdateUserProfile {
                name: Some(user::Name::new("Joseph").unwrap()),
                business_name: Some(
                    user::BusinessName::new("Joe's Cafe").unwrap(),
                ),
                ..update(fixture::actor(&joe), joe.id)
            })
            .await
            .unwrap();

        assert_eq!(updated.name.as_str(), "Joseph");
        assert_eq!(
            updated.business_name.as_ref().map(user::BusinessName::as_str),
            Some("Joe's Cafe"),
        );
        assert_eq!(updated.email, joe.email);
        assert_eq!(updated.business_address, None);
    }

    #[tokio::test]
    async fn rejects_occupied_email() {
        let svc = fixture::service();
        let joe = fixture::register(&svc, "joe@example.com").await;
        let ann = fixture::register(&svc, "ann@example.com").await;

        let err = svc
            .execute(UpdateUserProfile {
                email: Some(ann.email.clone()),
                ..update(fixture::actor(&joe), joe.id)
            })
            .await
            .unwrap_err();
        let same = svc
            .execute(UpdateUserProfile {
                email: Some(joe.email.clone()),
                ..update(fixture::actor(&joe), joe.id)
            })
            .await;

        assert!(
            matches!(err.as_ref(), ExecutionError::EmailOccupied(_)),
            "{err}",
        );
        assert!(same.is_ok(), "keeping own email is allowed");
    }

    #[tokio::test]
    async fn forbids_foreign_profiles() {
        let svc = fixture::service();
        let joe = fixture::register(&svc, "joe@example.com").await;
        let ann = fixture::register(&svc, "ann@example.com").await;

        let err = svc
            .execute(update(fixture::actor(&ann), joe.id))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Forbidden(_)), "{err}");
    }
}
