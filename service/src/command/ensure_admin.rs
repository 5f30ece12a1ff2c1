//! [`Command`] for seeding an admin [`User`].

use common::{
    operations::{By, Insert, Select, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{user, User},
    infra::{database, Database},
    policy::{self, Action, Actor},
    Service,
};

use super::Command;

/// [`Command`] for ensuring an admin [`User`] with the provided credentials
/// exists.
///
/// Idempotent: an existing [`User`] with the same [`user::Email`] is promoted
/// to a [`user::Role::Admin`] and gets the provided [`user::Password`].
#[derive(Debug)]
pub struct EnsureAdmin {
    /// [`user::Name`] of the admin [`User`].
    pub name: user::Name,

    /// [`user::Email`] of the admin [`User`].
    pub email: user::Email,

    /// [`user::Password`] of the admin [`User`].
    pub password: SecretBox<user::Password>,
}

impl<Db> Command<EnsureAdmin> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<User>, Ok = (), Err = Traced<database::Error>>
        + Database<
            Update<User>,
            Ok = bool,
            Err = Traced<database::Error>,
        >,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: EnsureAdmin) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let EnsureAdmin {
            name,
            email,
            password,
        } = cmd;

        policy::authorize(Actor::System, Action::CreateUser(user::Role::Admin))
            .ensure()
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let password_hash = user::PasswordHash::new(password.expose_secret());
        let existing = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(email.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        if let Some(mut user) = existing {
            if user.is_admin() && user.password_hash == password_hash {
                return Ok(user);
            }
            log::info!("promoting `User(id: {})` to admin", user.id);
            user.role = user::Role::Admin;
            user.password_hash = password_hash;
            // `User`s are never deleted, so the admin is always replaced.
            _ = self
                .database()
                .execute(Update(user.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            return Ok(user);
        }

        let user = User {
            id: user::Id::new(),
            email,
            name,
            password_hash,
            role: user::Role::Admin,
            subscription: None,
            business_name: None,
            business_address: None,
            created_at: DateTime::now().coerce(),
        };
        log::info!("seeding admin `User(id: {})`", user.id);
        self.database()
            .execute(Insert(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(user)
    }
}

/// Error of [`EnsureAdmin`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Seeding an admin is forbidden.
    #[display("Seeding admin `User` is forbidden")]
    Forbidden(policy::Forbidden),
}
