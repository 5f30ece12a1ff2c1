//! [`Command`] for authorizing a [`User`].

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`User`].
///
/// Returns the [`Session`] with the [`user::Role`] refreshed from the
/// [`Database`], so revoked privileges don't outlive a [`session::Token`].
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db> Command<AuthorizeUserSession> for Service<Db>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeUserSession { token } = cmd;

        let session = token
            .decode()
            .map_err(tracerr::from_and_wrap!(=> E))?;
        if session.is_expired_at(DateTime::now().coerce()) {
            return Err(tracerr::new!(E::Expired));
        }

        let user = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(session.user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(session.user_id))
            .map_err(tracerr::wrap!())?;

        Ok(Session {
            role: user.role,
            ..session
        })
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`session::Token`] decoding error.
    #[display("Failed to decode `Session` token: {_0}")]
    #[from]
    TokenDecodeError(session::DecodeError),

    /// [`Session`] has expired.
    #[display("`Session` has expired")]
    Expired,

    /// [`User`] the [`Session`] belongs to does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{operations::Update, DateTime};

    use crate::{
        domain::user::{self, session, Session},
        fixture,
        infra::Database as _,
        Command as _,
    };

    use super::{AuthorizeUserSession, ExecutionError};

    #[tokio::test]
    async fn refreshes_role() {
        let svc = fixture::service();
        let mut joe = fixture::register(&svc, "joe@example.com").await;
        let token = fixture::login(&svc, &joe).await;

        joe.role = user::Role::Admin;
        assert!(svc.database().execute(Update(joe.clone())).await.unwrap());
        let session = svc
            .execute(AuthorizeUserSession { token })
            .await
            .unwrap();

        assert_eq!(session.user_id, joe.id);
        assert_eq!(session.role, user::Role::Admin);
    }

    #[tokio::test]
    async fn rejects_expired() {
        let svc = fixture::service();
        let joe = fixture::register(&svc, "joe@example.com").await;
        let token = session::Token::encode(&Session {
            user_id: joe.id,
            role: joe.role,
            expires_at: (DateTime::now() - Duration::from_secs(1)).coerce(),
        })
        .unwrap();

        let err = svc
            .execute(AuthorizeUserSession { token })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Expired), "{err}");
    }

    #[tokio::test]
    async fn rejects_unknown_user() {
        let svc = fixture::service();
        let token = session::Token::encode(&Session {
            user_id: user::Id::new(),
            role: user::Role::Admin,
            expires_at: (DateTime::now() + Duration::from_secs(60)).coerce(),
        })
        .unwrap();

        let err = svc
            .execute(AuthorizeUserSession { token })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::UserNotExists(_)),
            "{err}",
        );
    }

    #[tokio::test]
    async fn rejects_garbage() {
        let svc = fixture::service();

        let err = svc
            .execute(AuthorizeUserSession {
                token: "garbage".parse().unwrap(),
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::TokenDecodeError(_)),
            "{err}",
        );
    }
}
