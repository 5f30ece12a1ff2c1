//! [`Command`] for creating a new [`User`].

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, Name, Password};
use crate::{
    domain::{user, User},
    infra::{database, Database},
    policy::{self, Action, Actor},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`] with a [`user::Role::User`].
#[derive(Debug)]
pub struct CreateUser {
    /// [`Actor`] performing this [`Command`].
    pub actor: Actor,

    /// [`Name`] of a new [`User`].
    pub name: user::Name,

    /// [`Email`] of a new [`User`].
    pub email: user::Email,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<User>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            actor,
            name,
            email,
            password,
        } = cmd;

        policy::authorize(actor, Action::CreateUser(user::Role::User))
            .ensure()
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let u = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(email.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if u.is_some() {
            return Err(tracerr::new!(E::EmailOccupied(email)));
        }

        let user = User {
            id: user::Id::new(),
            email,
            name,
            password_hash: user::PasswordHash::new(password.expose_secret()),
            role: user::Role::User,
            subscription: None,
            business_name: None,
            business_address: None,
            created_at: DateTime::now().coerce(),
        };
        self.database()
            .execute(Insert(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`user::Email`] is already occupied.
    #[display("`{_0}` email is occupied")]
    EmailOccupied(#[error(not(source))] user::Email),

    /// [`Actor`] is not allowed to create a [`User`].
    #[display("Creating `User` is forbidden")]
    #[from]
    Forbidden(policy::Forbidden),
}
