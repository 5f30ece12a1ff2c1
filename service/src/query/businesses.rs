//! [`Query`] collection related to the multiple [`Business`]es.

use common::operations::{By, Select, Subscribe};
use futures::stream::BoxStream;
use tracerr::Traced;

use crate::{
    domain::{business::Change, user, Business},
    infra::{database, Database},
    read::business::{search, top},
    Query, Service,
};

use super::DatabaseQuery;

/// Queries all [`Business`]es in their creation order.
pub type All = DatabaseQuery<By<Vec<Business>, ()>>;

/// Queries [`Business`]es owned by the [`User`] with the provided
/// [`user::Id`].
///
/// [`User`]: crate::domain::User
pub type ByOwner = DatabaseQuery<By<Vec<Business>, user::Id>>;

/// [`Query`] searching [`Business`]es with a [`search::Filter`].
#[derive(Clone, Debug, Default)]
pub struct Search {
    /// [`search::Filter`] to apply.
    pub filter: search::Filter,
}

impl<Db> Query<Search> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Business>, ()>>,
        Ok = Vec<Business>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Business>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Search { filter }: Search,
    ) -> Result<Self::Ok, Self::Err> {
        let all = self
            .database()
            .execute(Select(By::<Vec<Business>, _>::new(())))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(search::filter(all, &filter))
    }
}

/// [`Query`] selecting featured [`Business`]es.
#[derive(Clone, Copy, Debug)]
pub struct Featured {
    /// Maximum number of [`Business`]es to select.
    pub limit: usize,
}

impl Default for Featured {
    fn default() -> Self {
        Self { limit: 3 }
    }
}

impl<Db> Query<Featured> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Business>, ()>>,
        Ok = Vec<Business>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Business>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Featured { limit }: Featured,
    ) -> Result<Self::Ok, Self::Err> {
        let all = self
            .database()
            .execute(Select(By::<Vec<Business>, _>::new(())))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(top::featured(all, limit))
    }
}

/// [`Query`] selecting top [`Business`]es.
#[derive(Clone, Debug)]
pub struct Top {
    /// [`top::Selector`] to apply.
    pub selector: top::Selector,
}

impl Top {
    /// Default number of [`Business`]es to select.
    pub const DEFAULT_LIMIT: usize = 5;
}

impl<Db> Query<Top> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Business>, ()>>,
        Ok = Vec<Business>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Business>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Top { selector }: Top,
    ) -> Result<Self::Ok, Self::Err> {
        let all = self
            .database()
            .execute(Select(By::<Vec<Business>, _>::new(())))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(top::select(all, &selector))
    }
}

/// [`Query`] subscribing to [`Change`]s of [`Business`]es.
#[derive(Clone, Copy, Debug, Default)]
pub struct Changes;

impl<Db> Query<Changes> for Service<Db>
where
    Db: Database<
        Subscribe<By<Change, ()>>,
        Ok = BoxStream<'static, Change>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = BoxStream<'static, Change>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Changes) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Subscribe(By::new(())))
            .await
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::FeatureBusiness,
        fixture,
        read::business::{search, top},
        Command as _, Query as _,
    };

    use super::{Featured, Search, Top};

    #[tokio::test]
    async fn searches_featured_and_top() {
        let svc = fixture::service();
        let joe = fixture::register(&svc, "joe@example.com").await;
        let admin = fixture::admin(&svc).await;
        let mut ids = vec![];
        for name in ["Blue Cafe", "Red Bistro", "Green Cafe", "Bakery"] {
            let b = svc
                .execute(fixture::create_business(fixture::actor(&joe), name))
                .await
                .unwrap();
            ids.push(b.id);
        }
        for id in [ids[3], ids[1]] {
            drop(
                svc.execute(FeatureBusiness {
                    actor: fixture::actor(&admin),
                    business_id: id,
                    featured: true,
                })
                .await
                .unwrap(),
            );
        }

        let found = svc
            .execute(Search {
                filter: search::Filter {
                    query: "cafe".into(),
                    ..search::Filter::default()
                },
            })
            .await
            .unwrap();
        let featured = svc.execute(Featured::default()).await.unwrap();
        let top = svc
            .execute(Top {
                selector: top::Selector {
                    category: None,
                    sort: top::Sort::Rating,
                    limit: 2,
                },
            })
            .await
            .unwrap();

        let names = |bs: &[crate::domain::Business]| {
            bs.iter().map(|b| b.name.to_string()).collect::<Vec<_>>()
        };
        assert_eq!(names(&found), ["Blue Cafe", "Green Cafe"]);
        assert_eq!(names(&featured), ["Red Bistro", "Bakery"]);
        assert_eq!(names(&top), ["Blue Cafe", "Red Bistro"]);
    }
}
