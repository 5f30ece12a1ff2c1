//! [`Business`]-related read definitions.

#[cfg(doc)]
use crate::domain::Business;

pub mod search {
    //! [`Business`] search definitions.

    use std::collections::BTreeSet;

    use crate::domain::{business::Tag, Business};

    /// Filter of a [`Business`] search.
    #[derive(Clone, Debug, Default, Eq, PartialEq)]
    pub struct Filter {
        /// Free-text query matched against a [`Business`] name, category and
        /// description.
        ///
        /// Empty query matches everything.
        pub query: String,

        /// Free-text location matched against a [`Business`] location.
        ///
        /// Empty location matches everything.
        pub location: String,

        /// [`Tag`]s a [`Business`] must have all of.
        pub tags: BTreeSet<Tag>,
    }

    impl Filter {
        /// Indicates whether the provided [`Business`] matches this
        /// [`Filter`].
        #[must_use]
        pub fn matches(&self, business: &Business) -> bool {
            Matcher::new(self).matches(business)
        }

        /// Retains only the [`Business`]es matching this [`Filter`],
        /// preserving their relative order.
        #[must_use]
        pub fn apply(&self, mut businesses: Vec<Business>) -> Vec<Business> {
            let matcher = Matcher::new(self);
            businesses.retain(|b| matcher.matches(b));
            businesses
        }
    }

    /// Filters the provided [`Business`]es with the provided [`Filter`].
    ///
    /// The result preserves the relative order of the input.
    #[must_use]
    pub fn filter(businesses: Vec<Business>, filter: &Filter) -> Vec<Business> {
        filter.apply(businesses)
    }

    /// [`Filter`] with its free-text parts lowercased once.
    struct Matcher<'f> {
        /// Lowercased [`Filter::query`].
        query: String,

        /// Lowercased [`Filter::location`].
        location: String,

        /// [`Filter::tags`].
        tags: &'f BTreeSet<Tag>,
    }

    impl<'f> Matcher<'f> {
        /// Creates a new [`Matcher`] out of the provided [`Filter`].
        fn new(filter: &'f Filter) -> Self {
            Self {
                query: filter.query.to_lowercase(),
                location: filter.location.to_lowercase(),
                tags: &filter.tags,
            }
        }

        /// Indicates whether the provided [`Business`] matches.
        fn matches(&self, b: &Business) -> bool {
            let query = self.query.is_empty()
                || [
                    b.name.as_str(),
                    b.category.as_str(),
                    b.description.as_str(),
                ]
                .into_iter()
                .any(|field| field.to_lowercase().contains(&self.query));

            let location = self.location.is_empty()
                || b.location.as_str().to_lowercase().contains(&self.location);

            query && location && b.tags.contains_all(self.tags)
        }
    }
}

pub mod top {
    //! Top [`Business`]es definitions.

    use std::cmp::Reverse;

    use common::define_kind;

    use crate::domain::{business, Business};

    define_kind! {
        #[doc = "Order of top [`Business`]es."]
        enum Sort {
            #[doc = "Highest [`business::Rating`] first."]
            Rating = 1,

            #[doc = "Most reviewed first."]
            Reviews = 2,

            #[doc = "Most viewed first."]
            Trending = 3,
        }
    }

    /// Selector of top [`Business`]es.
    #[derive(Clone, Debug)]
    pub struct Selector {
        /// [`business::Category`] to limit [`Business`]es to, if any.
        pub category: Option<business::Category>,

        /// [`Sort`] order.
        pub sort: Sort,

        /// Maximum number of [`Business`]es to select.
        pub limit: usize,
    }

    /// Selects top [`Business`]es out of the provided ones.
    ///
    /// Sorting is stable, so equally ranked [`Business`]es keep their
    /// relative order.
    #[must_use]
    pub fn select(
        businesses: Vec<Business>,
        selector: &Selector,
    ) -> Vec<Business> {
        let mut top = businesses
            .into_iter()
            .filter(|b| {
                selector.category.as_ref().map_or(true, |c| &b.category == c)
            })
            .collect::<Vec<_>>();
        match selector.sort {
            Sort::Rating => {
                top.sort_by(|a, b| b.rating.get().total_cmp(&a.rating.get()));
            }
            Sort::Reviews => top.sort_by_key(|b| Reverse(b.reviews.len())),
            Sort::Trending => {
                top.sort_by_key(|b| Reverse(b.stats_or_default().views));
            }
        }
        top.truncate(selector.limit);
        top
    }

    /// Selects up to `limit` featured [`Business`]es in their original order.
    #[must_use]
    pub fn featured(businesses: Vec<Business>, limit: usize) -> Vec<Business> {
        businesses.into_iter().filter(|b| b.featured).take(limit).collect()
    }
}

#[cfg(test)]
mod spec {
    use std::collections::BTreeSet;

    use crate::{
        domain::{
            business::{self, Rating, Tag},
            Business,
        },
        fixture,
    };

    use super::{
        search::{filter, Filter},
        top::{self, Sort},
    };

    fn tag(s: &str) -> Tag {
        Tag::new(s).unwrap()
    }

    fn names(bs: &[Business]) -> Vec<&str> {
        bs.iter().map(|b| b.name.as_str()).collect()
    }

    fn directory() -> Vec<Business> {
        let mut cafe =
            fixture::business("Joe's Cafe", "Cafe", "123 Main St, Springfield");
        cafe.tags = fixture::tags(["Coffee", "Breakfast", "Vegan"]);

        let mut pizza =
            fixture::business("Luigi", "Restaurant", "5 Elm St, Shelbyville");
        pizza.tags = fixture::tags(["Pizza", "Italian", "Delivery"]);
        pizza.description =
            business::Description::new("Wood-fired pizza and espresso")
                .unwrap();

        let mut bakery =
            fixture::business("Sunrise", "Bakery", "9 Oak Ave, Springfield");
        bakery.tags = fixture::tags(["Bakery", "Coffee", "Breakfast"]);

        vec![cafe, pizza, bakery]
    }

    #[test]
    fn empty_filter_is_identity() {
        let all = directory();

        assert_eq!(filter(all.clone(), &Filter::default()), all);
        assert!(filter(vec![], &Filter::default()).is_empty());
    }

    #[test]
    fn query_is_case_insensitive() {
        let found = filter(
            directory(),
            &Filter {
                query: "CAFE".into(),
                ..Filter::default()
            },
        );

        assert_eq!(names(&found), ["Joe's Cafe"]);
    }

    #[test]
    fn query_matches_name_category_or_description() {
        let by = |q: &str| {
            names(&filter(
                directory(),
                &Filter {
                    query: q.into(),
                    ..Filter::default()
                },
            ))
            .into_iter()
            .map(ToOwned::to_owned)
            .collect::<Vec<_>>()
        };

        assert_eq!(by("luigi"), ["Luigi"]);
        assert_eq!(by("bakery"), ["Sunrise"]);
        assert_eq!(by("Espresso"), ["Luigi"]);
        assert_eq!(by("in town"), ["Joe's Cafe", "Sunrise"]);
        assert!(by("sushi").is_empty());
    }

    #[test]
    fn location_is_substring() {
        let found = filter(
            directory(),
            &Filter {
                location: "springfield".into(),
                ..Filter::default()
            },
        );

        assert_eq!(names(&found), ["Joe's Cafe", "Sunrise"]);
    }

    #[test]
    fn tags_are_superset_law() {
        let required = BTreeSet::from([tag("Coffee"), tag("Breakfast")]);
        let f = Filter {
            tags: required.clone(),
            ..Filter::default()
        };

        let all = directory();
        let found = filter(all.clone(), &f);

        assert_eq!(names(&found), ["Joe's Cafe", "Sunrise"]);
        for b in &found {
            assert!(required.iter().all(|t| b.tags.contains(t)));
        }
        for b in all.iter().filter(|b| !found.contains(b)) {
            assert!(!required.iter().all(|t| b.tags.contains(t)));
            assert!(!f.matches(b));
        }
    }

    #[test]
    fn predicates_are_conjunctive() {
        let found = filter(
            directory(),
            &Filter {
                query: "e".into(),
                location: "SPRINGFIELD".into(),
                tags: BTreeSet::from([tag("Vegan")]),
            },
        );

        assert_eq!(names(&found), ["Joe's Cafe"]);
    }

    #[test]
    fn top_sorts_stably_and_limits() {
        let mut all = directory();
        all[0].rating = Rating::new(4.0).unwrap();
        all[1].rating = Rating::new(4.5).unwrap();
        all[2].rating = Rating::new(4.0).unwrap();

        let sel = |sort, limit| top::Selector {
            category: None,
            sort,
            limit,
        };

        assert_eq!(
            names(&top::select(all.clone(), &sel(Sort::Rating, 5))),
            ["Luigi", "Joe's Cafe", "Sunrise"],
        );
        assert_eq!(
            names(&top::select(all.clone(), &sel(Sort::Rating, 1))),
            ["Luigi"],
        );

        all[2].stats = fixture::business_with_stats("x", 10, 0, 0).stats;
        assert_eq!(
            names(&top::select(all, &sel(Sort::Trending, 2))),
            ["Sunrise", "Joe's Cafe"],
        );
    }

    #[test]
    fn top_filters_category_exactly() {
        let found = top::select(
            directory(),
            &top::Selector {
                category: business::Category::new("Cafe"),
                sort: Sort::Reviews,
                limit: 5,
            },
        );

        assert_eq!(names(&found), ["Joe's Cafe"]);
    }

    #[test]
    fn featured_keeps_order() {
        let mut all = directory();
        all[1].featured = true;
        all[2].featured = true;

        assert_eq!(names(&top::featured(all.clone(), 3)), ["Luigi", "Sunrise"]);
        assert_eq!(names(&top::featured(all, 1)), ["Luigi"]);
    }
}
