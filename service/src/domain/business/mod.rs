//! [`Business`] definitions.

pub mod change;
pub mod review;
pub mod statistics;

use std::{collections::BTreeSet, sync::LazyLock};

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, Error as StdError, From, FromStr, Into};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user;

pub use self::{change::Change, review::Review, statistics::Statistics};

/// Business listing.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Business {
    /// ID of this [`Business`].
    pub id: Id,

    /// ID of the [`User`] owning this [`Business`].
    ///
    /// [`User`]: crate::domain::User
    pub owner_id: user::Id,

    /// [`Name`] of this [`Business`].
    pub name: Name,

    /// [`Category`] of this [`Business`].
    pub category: Category,

    /// [`Description`] of this [`Business`].
    pub description: Description,

    /// [`Location`] of this [`Business`].
    pub location: Location,

    /// [`Phone`] of this [`Business`].
    pub phone: Phone,

    /// Opening [`Hours`] of this [`Business`].
    pub hours: Hours,

    /// [`Image`] of this [`Business`].
    pub image: Image,

    /// [`Website`] of this [`Business`], if any.
    pub website: Option<Website>,

    /// [`Rating`] of this [`Business`].
    pub rating: Rating,

    /// Indicator whether this [`Business`] is featured on the front page.
    pub featured: bool,

    /// [`Tags`] of this [`Business`].
    pub tags: Tags,

    /// [`Statistics`] of this [`Business`], if tracked.
    pub stats: Option<Statistics>,

    /// [`Review`]s of this [`Business`].
    pub reviews: Vec<Review>,

    /// [`DateTime`] when this [`Business`] was created.
    pub created_at: CreationDateTime,
}

impl Business {
    /// Returns [`Statistics`] of this [`Business`], treating absent ones as
    /// zeroed.
    #[must_use]
    pub fn stats_or_default(&self) -> Statistics {
        self.stats.unwrap_or_default()
    }

    /// Appends the provided [`Review`] and recalculates the [`Rating`].
    pub fn add_review(&mut self, review: Review) {
        self.reviews.push(review);
        self.rating = Rating::mean(&self.reviews);
    }
}

/// ID of a [`Business`].
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
    Ord,
    PartialEq,
    PartialOrd,
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

define_text! {
    #[doc = "Name of a [`Business`]."]
    Name(max = 512),

    #[doc = "Category of a [`Business`], like `Restaurant`."]
    Category(max = 128),

    #[doc = "Free-form description of a [`Business`]."]
    Description(max = 4096),

    #[doc = "Location (address) of a [`Business`]."]
    Location(max = 512),

    #[doc = "Opening hours of a [`Business`], like `Mon-Fri 9am-5pm`."]
    Hours(max = 512),

    #[doc = "URL of a [`Business`] image."]
    Image(max = 2048),

    #[doc = "Website URL of a [`Business`]."]
    Website(max = 2048),

    #[doc = "Short label of a [`Business`] used for faceted search."]
    Tag(max = 64),
}

impl Tag {
    /// Vocabulary of [`Tag`]s offered when creating a [`Business`].
    pub const PREDEFINED: [&'static str; 30] = [
        "Coffee",
        "Restaurant",
        "Bakery",
        "Vegan",
        "Fast Food",
        "Fine Dining",
        "Bar",
        "Cafe",
        "Pizza",
        "Sushi",
        "Italian",
        "Mexican",
        "Asian",
        "Vegetarian",
        "Gluten-Free",
        "Breakfast",
        "Lunch",
        "Dinner",
        "Takeout",
        "Delivery",
        "Outdoor Seating",
        "Family-Friendly",
        "Pet-Friendly",
        "Live Music",
        "Sports Bar",
        "Wine Bar",
        "Craft Beer",
        "Happy Hour",
        "Open Late",
        "Brunch",
    ];

    /// Returns the [`PREDEFINED`] [`Tag`]s.
    ///
    /// [`PREDEFINED`]: Self::PREDEFINED
    pub fn predefined() -> impl Iterator<Item = Self> {
        Self::PREDEFINED.into_iter().map(|t| Self(t.to_owned()))
    }
}

/// Set of unique [`Tag`]s of a [`Business`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(into = "BTreeSet<Tag>", try_from = "BTreeSet<Tag>")]
pub struct Tags(BTreeSet<Tag>);

impl Tags {
    /// Maximum number of [`Tag`]s a [`Business`] may have.
    pub const MAX: usize = 10;

    /// Creates new [`Tags`] out of the provided [`Tag`]s, dropping duplicates.
    ///
    /// [`None`] is returned if there are more than [`Tags::MAX`] unique
    /// [`Tag`]s.
    #[must_use]
    pub fn new(tags: impl IntoIterator<Item = Tag>) -> Option<Self> {
        let tags = tags.into_iter().collect::<BTreeSet<_>>();
        (tags.len() <= Self::MAX).then_some(Self(tags))
    }

    /// Indicates whether every [`Tag`] of the `required` ones is present.
    #[must_use]
    pub fn contains_all<'t>(
        &self,
        required: impl IntoIterator<Item = &'t Tag>,
    ) -> bool {
        required.into_iter().all(|t| self.0.contains(t))
    }

    /// Indicates whether the provided [`Tag`] is present.
    #[must_use]
    pub fn contains(&self, tag: &Tag) -> bool {
        self.0.contains(tag)
    }

    /// Returns the number of [`Tag`]s.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Indicates whether there are no [`Tag`]s.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over [`Tag`]s in their lexicographical order.
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.0.iter()
    }
}

impl TryFrom<BTreeSet<Tag>> for Tags {
    type Error = TooManyTags;

    fn try_from(tags: BTreeSet<Tag>) -> Result<Self, Self::Error> {
        Self::new(tags).ok_or(TooManyTags)
    }
}

impl From<Tags> for BTreeSet<Tag> {
    fn from(tags: Tags) -> Self {
        tags.0
    }
}

/// Error of more than [`Tags::MAX`] unique [`Tag`]s being provided.
#[derive(Clone, Copy, Debug, Display, StdError)]
#[display("at most {} unique `Tag`s are allowed", Tags::MAX)]
pub struct TooManyTags;

/// Phone number of a [`Business`] in `(XXX) XXX-XXXX` format.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[as_ref(str, String)]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`Phone`].
    fn check(number: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Phone`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^\(\d{3}\) \d{3}-\d{4}$").expect("valid regex")
        });

        REGEX.is_match(number.as_ref())
    }
}

impl FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

/// Rating of a [`Business`] in `[0, 5]` range.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, PartialEq, PartialOrd,
    Serialize,
)]
pub struct Rating(f64);

impl Rating {
    /// Highest possible [`Rating`].
    pub const MAX: f64 = 5.0;

    /// Creates a new [`Rating`] if the given `value` is in `[0, 5]` range.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        (0.0..=Self::MAX).contains(&value).then_some(Self(value))
    }

    /// Calculates the mean [`Rating`] of the provided [`Review`]s.
    ///
    /// No [`Review`]s result in a zero [`Rating`].
    #[must_use]
    pub fn mean(reviews: &[Review]) -> Self {
        if reviews.is_empty() {
            return Self::default();
        }
        let sum = reviews.iter().map(|r| u32::from(r.score.get())).sum::<u32>();
        #[expect(
            clippy::cast_precision_loss,
            reason = "review counts are far below 2^52"
        )]
        let mean = f64::from(sum) / reviews.len() as f64;
        Self(mean)
    }

    /// Returns the numeric value of this [`Rating`].
    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }
}

/// [`DateTime`] when a [`Business`] was created.
pub type CreationDateTime = DateTimeOf<(Business, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{Phone, Rating, Tag, Tags};

    fn tag(s: &str) -> Tag {
        Tag::new(s).unwrap()
    }

    #[test]
    fn validates_phone_format() {
        assert!(Phone::new("(555) 123-4567").is_some());

        assert!(Phone::new("555 123-4567").is_none());
        assert!(Phone::new("(555)123-4567").is_none());
        assert!(Phone::new("(555) 123-45678").is_none());
        assert!(Phone::new(" (555) 123-4567").is_none());
    }

    #[test]
    fn validates_text() {
        assert!(Tag::new("Coffee").is_some());
        assert!(Tag::new("").is_none());
        assert!(Tag::new(" Coffee").is_none());
        assert!(Tag::new("x".repeat(Tag::MAX_LEN + 1)).is_none());
        assert_eq!("Coffee".parse::<Tag>().unwrap(), tag("Coffee"));
        assert_eq!(" ".parse::<Tag>().unwrap_err(), "invalid `Tag`");
    }

    #[test]
    fn predefined_tags_are_valid() {
        let all = Tag::predefined().collect::<Vec<_>>();

        assert_eq!(all.len(), Tag::PREDEFINED.len());
        for t in all {
            assert_eq!(Tag::new(t.to_string()), Some(t));
        }
    }

    #[test]
    fn tags_are_bounded_and_deduplicated() {
        let tags = Tags::new([tag("Bar"), tag("Cafe"), tag("Bar")]).unwrap();
        assert_eq!(tags.len(), 2);
        assert!(tags.contains(&tag("Cafe")));

        let many = (0..=Tags::MAX).map(|i| tag(&format!("t{i}")));
        assert!(Tags::new(many).is_none());

        let exact = (0..Tags::MAX).map(|i| tag(&format!("t{i}")));
        assert_eq!(Tags::new(exact).map(|t| t.len()), Some(Tags::MAX));
    }

    #[test]
    fn deserializes_bounded_tags() {
        let tags = serde_json::from_str::<Tags>(r#"["Cafe","Bar","Cafe"]"#)
            .unwrap();
        assert_eq!(tags.len(), 2);

        let many = (0..=Tags::MAX).map(|i| format!("t{i}")).collect::<Vec<_>>();
        let err = serde_json::from_value::<Tags>(serde_json::json!(many))
            .unwrap_err();
        assert!(err.to_string().contains("at most"), "{err}");
    }

    #[test]
    fn tags_superset_check() {
        let tags = Tags::new([tag("Bar"), tag("Cafe"), tag("Vegan")]).unwrap();

        assert!(tags.contains_all(&[tag("Vegan"), tag("Bar")]));
        assert!(tags.contains_all(&[]));
        assert!(!tags.contains_all(&[tag("Vegan"), tag("Pizza")]));
    }

    #[test]
    fn rating_range() {
        assert!(Rating::new(0.0).is_some());
        assert!(Rating::new(5.0).is_some());
        assert!(Rating::new(5.1).is_none());
        assert!(Rating::new(-0.1).is_none());
        assert!(Rating::new(f64::NAN).is_none());
    }
}
