//! [`Command`] for creating a [`Session`].

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{session::Token, Email, Password};
use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`].
#[derive(Debug, From)]
pub enum CreateUserSession {
    /// Create a new [`Session`] by [`User`] credentials.
    ByCredentials {
        /// [`Email`] of a [`User`].
        email: user::Email,

        /// [`Password`] of a [`User`].
        password: SecretBox<user::Password>,
    },

    /// Create a new [`Session`] by [`User`] ID.
    ByUserId(user::Id),
}

/// Output of [`CreateUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Token`] of the created [`Session`].
    pub token: session::Token,

    /// [`User`] whose [`Session`] has been created.
    pub user: User,

    /// [`DateTime`] when the [`Session`] expires.
    pub expires_at: session::ExpirationDateTime,
}

impl<Db> Command<CreateUserSession> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use CreateUserSession as Cmd;
        use ExecutionError as E;

        let user = match cmd {
            Cmd::ByCredentials { email, password } => {
                let user = self
                    .database()
                    .execute(Select(By::<Option<User>, _>::new(email)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::WrongCredentials)
                    .map_err(tracerr::wrap!())?;

                let hash = user::PasswordHash::new(password.expose_secret());
                if user.password_hash != hash {
                    return Err(tracerr::new!(E::WrongCredentials));
                }

                user
            }
            Cmd::ByUserId(user_id) => self
                .database()
                .execute(Select(By::<Option<User>, _>::new(user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::UserNotExists(user_id))
                .map_err(tracerr::wrap!())?,
        };

        let expires_at =
            (DateTime::now() + self.config().session_ttl).coerce();
        let token = session::Token::encode(&Session {
            user_id: user.id,
            role: user.role,
            expires_at,
        })
        .map_err(tracerr::from_and_wrap!(=> E))?;

        Ok(Output {
            token,
            user,
            expires_at,
        })
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Token`] encoding error.
    #[display("Failed to encode `Session` token: {_0}")]
    #[from]
    TokenEncodeError(serde_json::Error),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),

    /// [`CreateUserSession::ByCredentials`] contains wrong credentials.
    #[display("Wrong `User` credentials")]
    WrongCredentials,
}

#[cfg(test)]
mod spec {
    use crate::{domain::user, fixture, policy::Actor, Command as _};

    use super::{CreateUserSession, ExecutionError};

    #[tokio::test]
    async fn issues_decodable_token() {
        let svc = fixture::service();
        let joe = fixture::register(&svc, "joe@example.com").await;

        let out = svc
            .execute(CreateUserSession::ByCredentials {
                email: joe.email.clone(),
                password: fixture::password(fixture::PASSWORD),
            })
            .await
            .unwrap();

        let session = out.token.decode().unwrap();
        assert_eq!(out.user, joe);
        assert_eq!(session.user_id, joe.id);
        assert_eq!(session.role, user::Role::User);
        assert_eq!(
            session.expires_at.unix_timestamp(),
            out.expires_at.unix_timestamp(),
        );
        assert_eq!(fixture::actor(&joe), Actor::from(session));
    }

    #[tokio::test]
    async fn rejects_wrong_credentials() {
        let svc = fixture::service();
        drop(fixture::register(&svc, "joe@example.com").await);

        for (email, password) in [
            ("joe@example.com", "wrong"),
            ("ann@example.com", fixture::PASSWORD),
        ] {
            let err = svc
                .execute(CreateUserSession::ByCredentials {
                    email: user::Email::new(email).unwrap(),
                    password: fixture::password(password),
                })
                .await
                .unwrap_err();

            assert!(
                matches!(err.as_ref(), ExecutionError::WrongCredentials),
                "{err}",
            );
        }
    }

    #[tokio::test]
    async fn fails_for_unknown_user_id() {
        let svc = fixture::service();
        let id = user::Id::new();

        let err = svc
            .execute(CreateUserSession::ByUserId(id))
            .await
            .unwrap_err();

        assert!(
            matches!(
                err.as_ref(),
                ExecutionError::UserNotExists(i) if *i == id,
            ),
            "{err}",
        );
    }
}
