//! [`Platform`] report definition.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{Business, User},
    infra::{database, Database},
    policy::{self, Action, Actor},
    read::platform::Statistics,
    Query, Service,
};

/// [`Query`] of platform-wide [`Statistics`].
#[derive(Clone, Copy, Debug)]
pub struct Platform {
    /// [`Actor`] performing this [`Query`].
    pub actor: Actor,
}

impl<Db> Query<Platform> for Service<Db>
where
    Db: Database<
            Select<By<Vec<User>, ()>>,
            Ok = Vec<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Business>, ()>>,
            Ok = Vec<Business>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Statistics;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        Platform { actor }: Platform,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        policy::authorize(actor, Action::ViewPlatformStatistics)
            .ensure()
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let users = self
            .database()
            .execute(Select(By::<Vec<User>, _>::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let businesses = self
            .database()
            .execute(Select(By::<Vec<Business>, _>::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Statistics::collect(&users, &businesses))
    }
}

/// Error of [`Platform`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Actor`] is not allowed to view platform [`Statistics`].
    #[display("Viewing platform statistics is forbidden")]
    Forbidden(policy::Forbidden),
}

#[cfg(test)]
mod spec {
    use crate::{fixture, Query as _};

    use super::{ExecutionError, Platform};

    #[tokio::test]
    async fn admin_only() {
        let svc = fixture::service();
        let joe = fixture::register(&svc, "joe@example.com").await;
        let admin = fixture::admin(&svc).await;

        let err = svc
            .execute(Platform {
                actor: fixture::actor(&joe),
            })
            .await
            .unwrap_err();
        let stats = svc
            .execute(Platform {
                actor: fixture::actor(&admin),
            })
            .await
            .unwrap();

        assert!(matches!(err.as_ref(), ExecutionError::Forbidden(_)), "{err}");
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.total_businesses, 0);
    }
}
