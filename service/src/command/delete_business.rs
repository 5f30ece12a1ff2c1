//! [`Command`] for deleting a [`Business`].

use common::operations::{By, Delete, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{business, Business},
    infra::{database, Database},
    policy::{self, Action, Actor},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Business`] along with its tracked
/// [`Event`]s.
///
/// [`Event`]: crate::domain::Event
#[derive(Clone, Copy, Debug)]
pub struct DeleteBusiness {
    /// [`Actor`] performing this [`Command`].
    pub actor: Actor,

    /// ID of the [`Business`] to delete.
    pub business_id: business::Id,
}

impl<Db> Command<DeleteBusiness> for Service<Db>
where
    Db: Database<
            Select<By<Option<Business>, business::Id>>,
            Ok = Option<Business>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Business, business::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
{
    type Ok = Business;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteBusiness,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteBusiness { actor, business_id } = cmd;

        let business = self
            .database()
            .execute(Select(By::<Option<Business>, _>::new(business_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BusinessNotExists(business_id))
            .map_err(tracerr::wrap!())?;

        policy::authorize(actor, Action::ManageBusiness(&business))
            .ensure()
            .map_err(tracerr::from_and_wrap!(=> E))?;

        self.database()
            .execute(Delete(By::<Business, _>::new(business_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(business)
    }
}

/// Error of [`DeleteBusiness`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Business`] doesn't exist.
    #[display("`Business(id: {_0})` does not exist")]
    BusinessNotExists(#[error(not(source))] business::Id),

    /// [`Actor`] is not allowed to delete the [`Business`].
    #[display("Deleting `Business` is forbidden")]
    #[from]
    Forbidden(policy::Forbidden),
}

#[cfg(test)]
mod spec {
    use crate::{fixture, Command as _};

    use super::{DeleteBusiness, ExecutionError};

    #[tokio::test]
    async fn owner_or_admin_deletes() {
        let svc = fixture::service();
        let joe = fixture::register(&svc, "joe@example.com").await;
        let ann = fixture::register(&svc, "ann@example.com").await;
        let admin = fixture::admin(&svc).await;
        let b = svc
            .execute(fixture::create_business(fixture::actor(&joe), "Cafe"))
            .await
            .unwrap();

        let err = svc
            .execute(DeleteBusiness {
                actor: fixture::actor(&ann),
                business_id: b.id,
            })
            .await
            .unwrap_err();
        let deleted = svc
            .execute(DeleteBusiness {
                actor: fixture::actor(&admin),
                business_id: b.id,
            })
            .await
            .unwrap();
        let again = svc
            .execute(DeleteBusiness {
                actor: fixture::actor(&joe),
                business_id: b.id,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Forbidden(_)), "{err}");
        assert_eq!(deleted, b);
        assert!(
            matches!(again.as_ref(), ExecutionError::BusinessNotExists(_)),
            "{again}",
        );
    }
}
