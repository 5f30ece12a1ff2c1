//! [`Command`] for cancelling a [`Subscription`].

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, subscription::Status, Subscription},
        User,
    },
    infra::{database, Database},
    policy::{self, Action, Actor},
    Service,
};

use super::Command;

/// [`Command`] for cancelling a [`Subscription`] of a [`User`].
///
/// The [`Subscription`] is kept with a [`Status::Cancelled`].
#[derive(Clone, Copy, Debug)]
pub struct CancelSubscription {
    /// [`Actor`] performing this [`Command`].
    pub actor: Actor,

    /// ID of the [`User`] to cancel the [`Subscription`] of.
    pub user_id: user::Id,
}

impl<Db> Command<CancelSubscription> for Service<Db>
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
        cmd: CancelSubscription,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CancelSubscription { actor, user_id } = cmd;

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

        let subscription = user
            .subscription
            .as_mut()
            .ok_or(E::NoSubscription(user_id))
            .map_err(tracerr::wrap!())?;
        subscription.status = Status::Cancelled;

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

/// Error of [`CancelSubscription`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Actor`] is not allowed to manage the [`Subscription`].
    #[display("Managing `Subscription` is forbidden")]
    #[from]
    Forbidden(policy::Forbidden),

    /// [`User`] has no [`Subscription`] to cancel.
    #[display("`User(id: {_0})` has no `Subscription`")]
    NoSubscription(#[error(not(source))] user::Id),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::Subscribe,
        domain::user::subscription::{Plan, Status},
        fixture, Command as _,
    };

    use super::{CancelSubscription, ExecutionError};

    #[tokio::test]
    async fn cancels_existing_subscription() {
        let svc = fixture::service();
        let joe = fixture::register(&svc, "joe@example.com").await;
        let actor = fixture::actor(&joe);

        let err = svc
            .execute(CancelSubscription {
                actor,
                user_id: joe.id,
            })
            .await
            .unwrap_err();
        let subscribed = svc
            .execute(Subscribe {
                actor,
                user_id: joe.id,
                plan: Plan::Pro,
            })
            .await
            .unwrap();
        let cancelled = svc
            .execute(CancelSubscription {
                actor,
                user_id: joe.id,
            })
            .await
            .unwrap();

        assert!(
            matches!(err.as_ref(), ExecutionError::NoSubscription(_)),
            "{err}",
        );
        assert!(subscribed.subscription.is_some_and(|s| s.is_active()));
        assert_eq!(
            cancelled.subscription.map(|s| (s.plan, s.status)),
            Some((Plan::Pro, Status::Cancelled)),
        );
    }
}
