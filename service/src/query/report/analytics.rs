//! [`Analytics`] report definition.

use common::{
    operations::{By, Select},
    Date, DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{business, event, user, Business, Event},
    infra::{database, Database},
    policy::{self, Action, Actor},
    read::analytics::{self, Aggregate, Mode, Point, Range, Row, Source},
    Query, Service,
};

/// [`Query`] of analytics over [`Business`]es of a single owner.
#[derive(Clone, Copy, Debug)]
pub struct Analytics {
    /// [`Actor`] performing this [`Query`].
    pub actor: Actor,

    /// ID of the [`User`] owning the analyzed [`Business`]es.
    ///
    /// [`User`]: crate::domain::User
    pub owner_id: user::Id,

    /// ID of the single [`Business`] to build the series for.
    ///
    /// If [`None`], the series covers all the owned [`Business`]es.
    pub business_id: Option<business::Id>,

    /// [`Range`] of the series.
    pub range: Range,

    /// [`Mode`] of the [`Aggregate`].
    pub mode: Mode,

    /// [`Source`] of the series.
    pub source: Source,
}

/// Output of the [`Analytics`] [`Query`].
#[derive(Clone, Debug, PartialEq)]
pub struct Output {
    /// [`Aggregate`] over all the owned [`Business`]es.
    pub aggregate: Aggregate,

    /// Series of [`Point`]s from the oldest to the newest.
    pub series: Vec<Point>,

    /// Per-[`Business`] [`Row`]s in the [`Business`]es creation order.
    pub rows: Vec<Row>,

    /// [`Date`] the series ends at.
    pub today: Date,
}

impl Output {
    /// Exports the [`Row`]s of this [`Output`] as CSV.
    ///
    /// # Errors
    ///
    /// If the CSV writer fails.
    pub fn to_csv(&self) -> Result<String, csv::Error> {
        analytics::to_csv(&self.rows)
    }

    /// Returns the file name of the CSV export of this [`Output`].
    #[must_use]
    pub fn csv_file_name(&self) -> String {
        analytics::csv_file_name(self.today)
    }
}

impl<Db> Query<Analytics> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Business>, user::Id>>,
            Ok = Vec<Business>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Event>, event::Selector>>,
            Ok = Vec<Event>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: Analytics) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let Analytics {
            actor,
            owner_id,
            business_id,
            range,
            mode,
            source,
        } = query;

        policy::authorize(actor, Action::ViewAnalytics(owner_id))
            .ensure()
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let businesses = self
            .database()
            .execute(Select(By::<Vec<Business>, _>::new(owner_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let selected = match business_id {
            None => businesses.as_slice(),
            Some(id) => businesses
                .iter()
                .position(|b| b.id == id)
                .and_then(|i| businesses.get(i..=i))
                .ok_or(E::BusinessNotExists(id))
                .map_err(tracerr::wrap!())?,
        };

        let today = DateTime::now().date();
        let series = match source {
            Source::Synthetic => analytics::synthetic(selected, range, today),
            Source::Events => {
                let selector = event::Selector {
                    business_ids: selected.iter().map(|b| b.id).collect(),
                    since: DateTime::midnight_of(range.first_date(today))
                        .coerce(),
                };
                let events = self
                    .database()
                    .execute(Select(By::<Vec<Event>, _>::new(selector)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                analytics::bucketed(&events, range, today)
            }
        };

        Ok(Output {
            aggregate: analytics::aggregate(&businesses, mode),
            series,
            rows: businesses.iter().map(Row::from).collect(),
            today,
        })
    }
}

/// Error of [`Analytics`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Selected [`Business`] doesn't exist or isn't owned by the owner.
    #[display("`Business(id: {_0})` does not exist")]
    BusinessNotExists(#[error(not(source))] business::Id),

    /// [`Actor`] is not allowed to view the analytics.
    #[display("Viewing analytics is forbidden")]
    #[from]
    Forbidden(policy::Forbidden),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::TrackBusinessEvent,
        domain::{business, event, user},
        fixture,
        policy::Actor,
        read::analytics::{Mode, Range, Source},
        Command as _, Query as _,
    };

    use super::{Analytics, ExecutionError};

    fn analytics(actor: Actor, owner_id: user::Id) -> Analytics {
        Analytics {
            actor,
            owner_id,
            business_id: None,
            range: Range::Week,
            mode: Mode::Summed,
            source: Source::Synthetic,
        }
    }

    #[tokio::test]
    async fn aggregates_owned_businesses() {
        let svc = fixture::service();
        let joe = fixture::register(&svc, "joe@example.com").await;
        let ann = fixture::register(&svc, "ann@example.com").await;
        let mut ids = vec![];
        for (owner, name) in [(&joe, "A"), (&joe, "B"), (&ann, "C")] {
            let b = svc
                .execute(fixture::create_business(fixture::actor(owner), name))
                .await
                .unwrap();
            ids.push(b.id);
        }
        for (id, kind) in [
            (ids[0], event::Kind::View),
            (ids[0], event::Kind::View),
            (ids[0], event::Kind::PhoneClick),
            (ids[1], event::Kind::View),
            (ids[2], event::Kind::View),
        ] {
            drop(
                svc.execute(TrackBusinessEvent {
                    actor: Actor::Anonymous,
                    business_id: id,
                    kind,
                })
                .await
                .unwrap(),
            );
        }

        let out = svc
            .execute(analytics(fixture::actor(&joe), joe.id))
            .await
            .unwrap();
        let events = svc
            .execute(Analytics {
                source: Source::Events,
                business_id: Some(ids[0]),
                ..analytics(fixture::actor(&joe), joe.id)
            })
            .await
            .unwrap();

        assert_eq!(out.aggregate.businesses, 2);
        assert_eq!(out.aggregate.total_views, 3);
        assert_eq!(out.aggregate.total_clicks(), 1);
        assert_eq!(out.rows.len(), 2);
        assert_eq!(out.series.len(), 7);
        assert_eq!(out.series.last().map(|p| p.date), Some(out.today));
        assert!(out.to_csv().unwrap().starts_with("Business Name,"));
        assert_eq!(events.series.len(), 7);
        assert_eq!(
            events.series.last().map(|p| (p.views, p.clicks)),
            Some((2.0, 1.0)),
        );
    }

    #[tokio::test]
    async fn forbids_foreign_analytics() {
        let svc = fixture::service();
        let joe = fixture::register(&svc, "joe@example.com").await;
        let ann = fixture::register(&svc, "ann@example.com").await;
        let admin = fixture::admin(&svc).await;

        let err = svc
            .execute(analytics(fixture::actor(&ann), joe.id))
            .await
            .unwrap_err();
        let allowed = svc
            .execute(analytics(fixture::actor(&admin), joe.id))
            .await;

        assert!(matches!(err.as_ref(), ExecutionError::Forbidden(_)), "{err}");
        assert!(allowed.is_ok());
    }

    #[tokio::test]
    async fn rejects_foreign_business() {
        let svc = fixture::service();
        let joe = fixture::register(&svc, "joe@example.com").await;
        let id = business::Id::new();

        let err = svc
            .execute(Analytics {
                business_id: Some(id),
                ..analytics(fixture::actor(&joe), joe.id)
            })
            .await
            .unwrap_err();

        assert!(
            matches!(
                err.as_ref(),
                ExecutionError::BusinessNotExists(i) if *i == id,
            ),
            "{err}",
        );
    }
}
