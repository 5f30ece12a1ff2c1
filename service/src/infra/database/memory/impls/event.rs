//! [`Event`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{event, Event},
    infra::{database, Database, Memory},
};

impl Database<Insert<Event>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(event): Insert<Event>,
    ) -> Result<Self::Ok, Self::Err> {
        self.mutate(|s| s.events.push(event))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl Database<Select<By<Vec<Event>, event::Selector>>> for Memory {
    type Ok = Vec<Event>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Event>, event::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let event::Selector {
            business_ids,
            since,
        } = by.into_inner();
        Ok(self
            .read()
            .await
            .events
            .iter()
            .filter(|e| {
                e.occurred_at >= since && business_ids.contains(&e.business_id)
            })
            .copied()
            .collect())
    }
}

impl Database<Delete<By<Vec<Event>, event::OccurredBefore>>> for Memory {
    type Ok = usize;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vec<Event>, event::OccurredBefore>>,
    ) -> Result<Self::Ok, Self::Err> {
        let event::OccurredBefore(threshold) = by.into_inner();
        self.mutate(|s| {
            let before = s.events.len();
            s.events.retain(|e| e.occurred_at >= threshold);
            before - s.events.len()
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{
        operations::{By, Delete, Insert, Select},
        DateTime,
    };

    use crate::{
        domain::{business, event, Event},
        infra::{Database as _, Memory},
    };

    fn event(business_id: business::Id, days_ago: u64) -> Event {
        Event {
            business_id,
            kind: event::Kind::View,
            occurred_at: (DateTime::now()
                - Duration::from_secs(days_ago * 24 * 60 * 60))
            .coerce(),
        }
    }

    #[tokio::test]
    async fn selects_events_of_businesses_since() {
        let db = Memory::new();
        let (a, b) = (business::Id::new(), business::Id::new());
        let events = [event(a, 1), event(a, 10), event(b, 1)];
        for e in events {
            db.execute(Insert(e)).await.unwrap();
        }

        let selected = db
            .execute(Select(By::<Vec<Event>, _>::new(event::Selector {
                business_ids: vec![a],
                since: (DateTime::now()
                    - Duration::from_secs(5 * 24 * 60 * 60))
                .coerce(),
            })))
            .await
            .unwrap();

        assert_eq!(selected, [events[0]]);
    }

    #[tokio::test]
    async fn deletes_old_events() {
        let db = Memory::new();
        let id = business::Id::new();
        for days_ago in [1, 50, 100, 200] {
            db.execute(Insert(event(id, days_ago))).await.unwrap();
        }
        let threshold = (DateTime::now()
            - Duration::from_secs(90 * 24 * 60 * 60))
        .coerce();

        let deleted = db
            .execute(Delete(By::<Vec<Event>, _>::new(
                event::OccurredBefore(threshold),
            )))
            .await
            .unwrap();
        let left = db
            .execute(Select(By::<Vec<Event>, _>::new(event::Selector {
                business_ids: vec![id],
                since: DateTime::UNIX_EPOCH.coerce(),
            })))
            .await
            .unwrap();

        assert_eq!(deleted, 2);
        assert_eq!(left.len(), 2);
    }
}
