//! [`Command`] for subscribing a [`User`] to a [`Plan`].

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        user::{
            self,
            subscription::{Plan, Status},
            Subscription,
        },
        User,
    },
    infra::{database, Database},
    policy::{self, Action, Actor},
    Service,
};

use super::Command;

/// [`Command`] for subscribing a [`User`] to a [`Plan`].
///
/// Replaces any previous [`Subscription`] of the [`User`] with an active one.
#[derive(Clone, Copy, Debug)]
pub struct Subscribe {
    /// [`Actor`] performing this [`Command`].
    pub actor: Actor,

    /// ID of the [`User`] to subscribe.
    pub user_id: user::Id,

    /// [`Plan`] to subscribe to.
    pub plan: Plan,
}

impl<Db> Command<Subscribe> for Service<Db>
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

    async fn execute(&self, cmd: Subscribe) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let Subscribe {
            actor,
            user_id,
            plan,
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

        user.subscription = Some(Subscription {
            plan,
            status: Status::Active,
        });
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

/// Error of [`Subscribe`] [`Command`] execution.
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

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}
