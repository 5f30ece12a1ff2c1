//! [`Command`] for tracking an [`Event`] of a [`Business`].

use common::{
    operations::{By, Insert, Select, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{business, event, Business, Event},
    infra::{database, Database},
    policy::{self, Action, Actor},
    Service,
};

use super::Command;

/// [`Command`] for tracking an [`Event`] of a [`Business`].
///
/// Bumps the [`Business`] statistics counters and appends the [`Event`] to
/// the log.
#[derive(Clone, Copy, Debug)]
pub struct TrackBusinessEvent {
    /// [`Actor`] performing this [`Command`].
    pub actor: Actor,

    /// ID of the [`Business`] to track the [`Event`] of.
    pub business_id: business::Id,

    /// [`event::Kind`] of the tracked [`Event`].
    pub kind: event::Kind,
}

impl<Db> Command<TrackBusinessEvent> for Service<Db>
where
    Db: Database<
            Select<By<Option<Business>, business::Id>>,
            Ok = Option<Business>,
            Err = Traced<database::Error>,
        > + Database<
            Update<Business>,
            Ok = bool,
            Err = Traced<database::Error>,
        >
        + Database<Insert<Event>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Business;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: TrackBusinessEvent,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let TrackBusinessEvent {
            actor,
            business_id,
            kind,
        } = cmd;

        let mut business = self
            .database()
            .execute(Select(By::<Option<Business>, _>::new(business_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BusinessNotExists(business_id))
            .map_err(tracerr::wrap!())?;

        policy::authorize(actor, Action::TrackBusiness(&business))
            .ensure()
            .map_err(tracerr::from_and_wrap!(=> E))?;

        business.stats.get_or_insert_with(Default::default).record(kind);
        let updated = self
            .database()
            .execute(Update(business.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !updated {
            return Err(tracerr::new!(E::BusinessNotExists(business_id)));
        }
        self.database()
            .execute(Insert(Event {
                business_id,
                kind,
                occurred_at: DateTime::now().coerce(),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(business)
    }
}

/// Error of [`TrackBusinessEvent`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Business`] doesn't exist.
    #[display("`Business(id: {_0})` does not exist")]
    BusinessNotExists(#[error(not(source))] business::Id),

    /// [`Actor`] is not allowed to track the [`Business`].
    #[display("Tracking `Business` is forbidden")]
    #[from]
    Forbidden(policy::Forbidden),
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Select},
        DateTime,
    };

    use crate::{
        domain::{event, Event},
        fixture,
        infra::Database as _,
        policy::Actor,
        Command as _,
    };

    use super::TrackBusinessEvent;

    #[tokio::test]
    async fn counts_and_logs_events() {
        let svc = fixture::service();
        let joe = fixture::register(&svc, "joe@example.com").await;
        let b = svc
            .execute(fixture::create_business(fixture::actor(&joe), "Cafe"))
            .await
            .unwrap();

        let mut last = None;
        for kind in [
            event::Kind::View,
            event::Kind::View,
            event::Kind::View,
            event::Kind::View,
            event::Kind::WebsiteClick,
        ] {
            last = Some(
                svc.execute(TrackBusinessEvent {
                    actor: Actor::Anonymous,
                    business_id: b.id,
                    kind,
                })
                .await
                .unwrap(),
            );
        }
        let events = svc
            .database()
            .execute(Select(By::<Vec<Event>, _>::new(event::Selector {
                business_ids: vec![b.id],
                since: DateTime::UNIX_EPOCH.coerce(),
            })))
            .await
            .unwrap();

        let stats = last.and_then(|b| b.stats).unwrap();
        assert_eq!(stats.views, 4);
        assert_eq!(stats.website_clicks, 1);
        assert_eq!(stats.ctr, 25.0);
        assert_eq!(events.len(), 5);
    }
}
