//! [`Review`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user;
#[cfg(doc)]
use crate::domain::{Business, User};

/// Review of a [`Business`] left by a [`User`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Review {
    /// ID of this [`Review`].
    pub id: Id,

    /// ID of the [`User`] who wrote this [`Review`].
    pub author_id: user::Id,

    /// [`Score`] given by this [`Review`].
    pub score: Score,

    /// [`Content`] of this [`Review`].
    pub content: Content,

    /// [`DateTime`] when this [`Review`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Review`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Score of a [`Review`] from `1` to `5` stars.
#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
pub struct Score(u8);

impl Score {
    /// Creates a new [`Score`] if the given number of `stars` is in `1..=5`.
    #[must_use]
    pub fn new(stars: u8) -> Option<Self> {
        (1..=5).contains(&stars).then_some(Self(stars))
    }

    /// Returns the number of stars of this [`Score`].
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

define_text! {
    #[doc = "Text content of a [`Review`]."]
    Content(max = 2048),
}

/// [`DateTime`] when a [`Review`] was created.
pub type CreationDateTime = DateTimeOf<(Review, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::domain::{
        business::{self, Rating},
        user,
    };

    use super::{Content, Id, Review, Score};

    fn review(stars: u8) -> Review {
        Review {
            id: Id::new(),
            author_id: user::Id::new(),
            score: Score::new(stars).unwrap(),
            content: Content::new("Nice place").unwrap(),
            created_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn score_range() {
        assert!(Score::new(0).is_none());
        assert!(Score::new(1).is_some());
        assert!(Score::new(5).is_some());
        assert!(Score::new(6).is_none());
    }

    #[test]
    fn rating_is_mean_of_scores() {
        assert_eq!(Rating::mean(&[]), Rating::default());
        assert_eq!(Rating::mean(&[review(4), review(5)]).get(), 4.5);
        assert_eq!(
            Rating::mean(&[review(1), review(2), review(3)]).get(),
            2.0,
        );
    }

    #[test]
    fn adding_review_updates_rating() {
        let mut b = crate::fixture::business("Cafe", "Coffee", "Main St");
        assert_eq!(b.rating.get(), 0.0);

        b.add_review(review(3));
        b.add_review(review(5));

        assert_eq!(b.reviews.len(), 2);
        assert_eq!(b.rating.get(), 4.0);
        assert_eq!(b.rating, business::Rating::new(4.0).unwrap());
    }
}
