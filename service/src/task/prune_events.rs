//! [`PruneEvents`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Delete, Perform, Start};
use smart_default::SmartDefault;
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{event, Event},
    infra::{database, Database},
    Service,
};

use super::Task;

/// Configuration for [`PruneEvents`] [`Task`].
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Config {
    /// Interval between [`Event`]s pruning.
    #[default(time::Duration::from_secs(60 * 60))]
    pub interval: time::Duration,

    /// Age after which an [`Event`] is pruned.
    ///
    /// Defaults to 90 days, the longest analytics range.
    #[default(time::Duration::from_secs(90 * 24 * 60 * 60))]
    pub retention: time::Duration,
}

/// [`Task`] for pruning [`Event`]s older than the retention window.
#[derive(Clone, Copy, Debug)]
pub struct PruneEvents<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db> Task<Start<By<PruneEvents<Self>, Config>>> for Service<Db>
where
    PruneEvents<Service<Db>>:
        Task<Perform<()>, Ok = usize, Err: Error> + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<PruneEvents<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = PruneEvents {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            match task.execute(Perform(())).await {
                Ok(0) => {}
                Ok(pruned) => log::info!("pruned {pruned} stale `Event`s"),
                Err(e) => log::error!("`task::PruneEvents` failed: {e}"),
            }
        }
    }
}

impl<Db> Task<Perform<()>> for PruneEvents<Service<Db>>
where
    Db: Database<
        Delete<By<Vec<Event>, event::OccurredBefore>>,
        Ok = usize,
        Err = Traced<database::Error>,
    >,
{
    type Ok = usize;
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let threshold =
            event::OccurrenceDateTime::now() - self.config.retention;
        self.service
            .database()
            .execute(Delete(By::new(event::OccurredBefore(threshold))))
            .await
            .map_err(tracerr::map_from_and_wrap!())
    }
}

/// Error of [`PruneEvents`] execution.
pub type ExecutionError = Traced<database::Error>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{
        operations::{Insert, Perform},
        DateTime,
    };

    use crate::{
        domain::{business, event, Event},
        fixture,
        infra::Database as _,
        Task as _,
    };

    use super::{Config, PruneEvents};

    #[tokio::test]
    async fn prunes_events_past_retention() {
        let svc = fixture::service();
        let id = business::Id::new();
        for days_ago in [0, 30, 89, 91, 365] {
            svc.database()
                .execute(Insert(Event {
                    business_id: id,
                    kind: event::Kind::View,
                    occurred_at: (DateTime::now()
                        - Duration::from_secs(days_ago * 24 * 60 * 60))
                    .coerce(),
                }))
                .await
                .unwrap();
        }
        let task = PruneEvents {
            config: Config::default(),
            service: svc.clone(),
        };

        let pruned = task.execute(Perform(())).await.unwrap();
        let again = task.execute(Perform(())).await.unwrap();

        assert_eq!(pruned, 2);
        assert_eq!(again, 0);
    }
}
