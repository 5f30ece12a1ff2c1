//! [`Command`] for reviewing a [`Business`].

use common::{
    operations::{By, Select, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        business::{self, review, Review},
        Business,
    },
    infra::{database, Database},
    policy::{self, Action, Actor},
    Service,
};

use super::Command;

/// [`Command`] for adding a [`Review`] to a [`Business`].
///
/// Recalculates the [`business::Rating`] as the mean of all [`Review`]s.
#[derive(Clone, Debug)]
pub struct AddBusinessReview {
    /// [`Actor`] performing this [`Command`].
    pub actor: Actor,

    /// ID of the [`Business`] to review.
    pub business_id: business::Id,

    /// [`review::Score`] of the [`Review`].
    pub score: review::Score,

    /// [`review::Content`] of the [`Review`].
    pub content: review::Content,
}

impl<Db> Command<AddBusinessReview> for Service<Db>
where
    Db: Database<
            Select<By<Option<Business>, business::Id>>,
            Ok = Option<Business>,
            Err = Traced<database::Error>,
        > + Database<
            Update<Business>,
            Ok = bool,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Business;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AddBusinessReview,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AddBusinessReview {
            actor,
            business_id,
            score,
            content,
        } = cmd;

        let mut business = self
            .database()
            .execute(Select(By::<Option<Business>, _>::new(business_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BusinessNotExists(business_id))
            .map_err(tracerr::wrap!())?;

        policy::authorize(actor, Action::ReviewBusiness(&business))
            .ensure()
            .map_err(tracerr::from_and_wrap!(=> E))?;
        let author_id = actor
            .user_id()
            .ok_or(E::NoAuthor)
            .map_err(tracerr::wrap!())?;

        business.add_review(Review {
            id: review::Id::new(),
            author_id,
            score,
            content,
            created_at: DateTime::now().coerce(),
        });
        let updated = self
            .database()
            .execute(Update(business.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !updated {
            return Err(tracerr::new!(E::BusinessNotExists(business_id)));
        }

        Ok(business)
    }
}

/// Error of [`AddBusinessReview`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Business`] doesn't exist.
    #[display("`Business(id: {_0})` does not exist")]
    BusinessNotExists(#[error(not(source))] business::Id),

    /// [`Actor`] is not allowed to review the [`Business`].
    #[display("Reviewing `Business` is forbidden")]
    #[from]
    Forbidden(policy::Forbidden),

    /// [`Actor`] is not a [`User`] able to author a [`Review`].
    ///
    /// [`User`]: crate::domain::User
    #[display("`Review` must be authored by a `User`")]
    NoAuthor,
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{business::review, Business},
        fixture,
        policy::Actor,
        Command as _,
    };

    use super::{AddBusinessReview, ExecutionError};

    fn review(actor: Actor, b: &Business, score: u8) -> AddBusinessReview {
        AddBusinessReview {
            actor,
            business_id: b.id,
            score: review::Score::new(score).unwrap(),
            content: review::Content::new("Nice place").unwrap(),
        }
    }

    #[tokio::test]
    async fn recalculates_rating() {
        let svc = fixture::service();
        let joe = fixture::register(&svc, "joe@example.com").await;
        let ann = fixture::register(&svc, "ann@example.com").await;
        let b = svc
            .execute(fixture::create_business(fixture::actor(&joe), "Cafe"))
            .await
            .unwrap();

        drop(svc.execute(review(fixture::actor(&ann), &b, 5)).await.unwrap());
        let reviewed =
            svc.execute(review(fixture::actor(&joe), &b, 2)).await.unwrap();

        assert_eq!(reviewed.reviews.len(), 2);
        assert_eq!(reviewed.reviews[0].author_id, ann.id);
        assert_eq!(reviewed.rating.get(), 3.5);
    }

    #[tokio::test]
    async fn forbids_anonymous() {
        let svc = fixture::service();
        let joe = fixture::register(&svc, "joe@example.com").await;
        let b = svc
            .execute(fixture::create_business(fixture::actor(&joe), "Cafe"))
            .await
            .unwrap();

        let err = svc
            .execute(review(Actor::Anonymous, &b, 5))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Forbidden(_)), "{err}");
    }
}
