//! [`Command`] for updating an [`user::Password`].

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret as _, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::Password;
use crate::{
    domain::{user, User},
    infra::{database, Database},
    policy::{self, Action, Actor},
    Service,
};

use super::Command;

/// [`Command`] for updating an [`user::Password`].
#[derive(Debug)]
pub struct UpdateUserPassword {
    /// [`Actor`] performing this [`Command`].
    pub actor: Actor,

    /// ID of the [`User`] which [`Password`] should be updated.
    pub user_id: user::Id,

    /// New [`Password`] of the [`User`].
    pub new_password: SecretBox<user::Password>,

    /// Old [`Password`] of the [`User`].
    pub old_password: SecretBox<user::Password>,
}

impl<Db> Command<UpdateUserPassword> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
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
        cmd: UpdateUserPassword,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateUserPassword {
            actor,
            user_id,
            new_password,
            old_password,
        } = cmd;

        policy::authorize(actor, Action::ManageAccount(user_id))
            .ensure()
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let new_password_hash =
            user::PasswordHash::new(new_password.expose_secret());
        let old_password_hash =
            user::PasswordHash::new(old_password.expose_secret());

        let mut user = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;
        if user.password_hash != old_password_hash {
            return Err(tracerr::new!(E::WrongPassword));
        }

        if user.password_hash == new_password_hash {
            return Ok(user);
        }

        user.password_hash = new_password_hash;
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

/// Error of [`UpdateUserPassword`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Actor`] is not allowed to update the [`Password`].
    #[display("Updating `User` password is forbidden")]
    #[from]
    Forbidden(policy::Forbidden),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),

    /// Wrong old [`Password`] provided.
    #[display("Wrong old password")]
    WrongPassword,
}

#[cfg(test)]
mod spec {
    use crate::{fixture, Command as _};

    use super::{ExecutionError, UpdateUserPassword};

    #[tokio::test]
    async fn requires_old_password() {
        let svc = fixture::service();
        let joe = fixture::register(&svc, "joe@example.com").await;

        let err = svc
            .execute(UpdateUserPassword {
                actor: fixture::actor(&joe),
                user_id: joe.id,
                new_password: fixture::password("new-secret"),
                old_password: fixture::password("not-the-password"),
            })
            .await
            .unwrap_err();
        let updated = svc
            .execute(UpdateUserPassword {
                actor: fixture::actor(&joe),
                user_id: joe.id,
                new_password: fixture::password("new-secret"),
                old_password: fixture::password(fixture::PASSWORD),
            })
            .await
            .unwrap();

        assert!(matches!(err.as_ref(), ExecutionError::WrongPassword), "{err}");
        assert_ne!(updated.password_hash, joe.password_hash);
    }
}
