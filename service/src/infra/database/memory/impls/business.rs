//! [`Business`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select, Subscribe, Update};
use futures::{
    stream::{self, BoxStream},
    StreamExt as _,
};
use tokio::sync::broadcast::error::RecvError;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        business::{self, change, Change},
        user, Business,
    },
    infra::{database, Database, Memory},
};

use super::replace;

impl Database<Select<By<Option<Business>, business::Id>>> for Memory {
    type Ok = Option<Business>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Business>, business::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .read()
            .await
            .businesses
            .iter()
            .find(|b| b.id == id)
            .cloned())
    }
}

impl Database<Select<By<Vec<Business>, ()>>> for Memory {
    type Ok = Vec<Business>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Business>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.read().await.businesses.clone())
    }
}

impl Database<Select<By<Vec<Business>, user::Id>>> for Memory {
    type Ok = Vec<Business>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Business>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let owner_id = by.into_inner();
        Ok(self
            .read()
            .await
            .businesses
            .iter()
            .filter(|b| b.owner_id == owner_id)
            .cloned()
            .collect())
    }
}

impl Database<Insert<Business>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(business): Insert<Business>,
    ) -> Result<Self::Ok, Self::Err> {
        let business_id = business.id;
        self.mutate(|s| s.businesses.push(business))
            .await
            .map_err(tracerr::wrap!())?;

        self.publish(Change {
            kind: change::Kind::Created,
            business_id,
        });
        Ok(())
    }
}

/// Returns whether the [`Business`] existed and has been replaced.
impl Database<Update<Business>> for Memory {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(business): Update<Business>,
    ) -> Result<Self::Ok, Self::Err> {
        let business_id = business.id;
        let existed = self
            .mutate(|s| {
                replace(&mut s.businesses, business, |b| b.id == business_id)
            })
            .await
            .map_err(tracerr::wrap!())?;

        if existed {
            self.publish(Change {
                kind: change::Kind::Updated,
                business_id,
            });
        }
        Ok(existed)
    }
}

impl Database<Delete<By<Business, business::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Business, business::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let business_id = by.into_inner();
        let existed = self
            .mutate(|s| {
                let before = s.businesses.len();
                s.businesses.retain(|b| b.id != business_id);
                s.events.retain(|e| e.business_id != business_id);
                s.businesses.len() != before
            })
            .await
            .map_err(tracerr::wrap!())?;

        if existed {
            self.publish(Change {
                kind: change::Kind::Deleted,
                business_id,
            });
        }
        Ok(())
    }
}

impl Database<Subscribe<By<Change, ()>>> for Memory {
    type Ok = BoxStream<'static, Change>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Subscribe<By<Change, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let changes = self.0.changes.subscribe();
        Ok(stream::unfold(changes, |mut changes| async move {
            loop {
                match changes.recv().await {
                    Ok(change) => return Some((change, changes)),
                    Err(RecvError::Lagged(skipped)) => {
                        log::warn!(
                            "`Change`s subscriber lagged behind, \
                             {skipped} `Change`s skipped",
                        );
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        })
        .boxed())
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Delete, Insert, Select, Subscribe, Update};
    use futures::StreamExt as _;

    use crate::{
        domain::{
            business::{self, change, Change},
            user, Business,
        },
        fixture,
        infra::{Database as _, Memory},
    };

    #[tokio::test]
    async fn selects_in_insertion_order() {
        let db = Memory::new();
        let (a, b) = (
            fixture::business("A", "Cafe", "Main St"),
            fixture::business("B", "Cafe", "Main St"),
        );
        let mut c = fixture::business("C", "Cafe", "Main St");
        c.owner_id = a.owner_id;
        for x in [&a, &b, &c] {
            db.execute(Insert(x.clone())).await.unwrap();
        }

        let all = db
            .execute(Select(By::<Vec<Business>, _>::new(())))
            .await
            .unwrap();
        let owned = db
            .execute(Select(By::<Vec<Business>, _>::new(a.owner_id)))
            .await
            .unwrap();
        let one = db
            .execute(Select(By::<Option<Business>, _>::new(b.id)))
            .await
            .unwrap();
        let none = db
            .execute(Select(By::<Vec<Business>, _>::new(user::Id::new())))
            .await
            .unwrap();

        assert_eq!(all, [a.clone(), b.clone(), c.clone()]);
        assert_eq!(owned, [a, c]);
        assert_eq!(one, Some(b));
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn publishes_changes() {
        let db = Memory::new();
        let mut changes = db
            .execute(Subscribe(By::<Change, _>::new(())))
            .await
            .unwrap();
        let mut b = fixture::business("A", "Cafe", "Main St");

        db.execute(Insert(b.clone())).await.unwrap();
        b.featured = true;
        assert!(db.execute(Update(b.clone())).await.unwrap());
        db.execute(Delete(By::<Business, _>::new(b.id))).await.unwrap();
        db.execute(Delete(By::<Business, _>::new(business::Id::new())))
            .await
            .unwrap();

        let change = |kind| Change {
            kind,
            business_id: b.id,
        };
        assert_eq!(changes.next().await, Some(change(change::Kind::Created)));
        assert_eq!(changes.next().await, Some(change(change::Kind::Updated)));
        assert_eq!(changes.next().await, Some(change(change::Kind::Deleted)));

        let remaining = db
            .execute(Select(By::<Vec<Business>, _>::new(())))
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn does_not_restore_deleted() {
        let db = Memory::new();
        let mut changes = db
            .execute(Subscribe(By::<Change, _>::new(())))
            .await
            .unwrap();
        let mut b = fixture::business("A", "Cafe", "Main St");
        db.execute(Insert(b.clone())).await.unwrap();
        db.execute(Delete(By::<Business, _>::new(b.id))).await.unwrap();

        b.featured = true;
        let updated = db.execute(Update(b.clone())).await.unwrap();

        let all = db
            .execute(Select(By::<Vec<Business>, _>::new(())))
            .await
            .unwrap();
        assert!(!updated);
        assert!(all.is_empty());

        db.execute(Insert(fixture::business("B", "Cafe", "Main St")))
            .await
            .unwrap();
        let kinds = changes
            .by_ref()
            .take(3)
            .map(|c| c.kind)
            .collect::<Vec<_>>()
            .await;
        assert_eq!(
            kinds,
            [
                change::Kind::Created,
                change::Kind::Deleted,
                change::Kind::Created,
            ],
        );
    }
}
