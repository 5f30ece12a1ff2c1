//! [`Business`]-related definitions.

use std::future;

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{
    graphql_object, GraphQLEnum, GraphQLInputObject, GraphQLObject,
    GraphQLScalar, Nullable,
};
use service::{
    domain,
    policy::{self, Action},
    query, read, Query as _,
};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    define_error, AsError, Context, Error,
};

/// A business listing.
#[derive(Clone, Debug)]
pub struct Business {
    /// ID of this [`Business`].
    pub id: Id,

    /// Underlying [`domain::Business`].
    business: OnceCell<domain::Business>,
}

impl From<domain::Business> for Business {
    fn from(business: domain::Business) -> Self {
        Self {
            id: business.id.into(),
            business: OnceCell::new_with(Some(business)),
        }
    }
}

impl Business {
    /// Creates a new [`Business`] loaded lazily by the provided ID.
    ///
    /// Accessing a [`Business`] which doesn't exist results in an error.
    #[must_use]
    pub fn lazy(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            business: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Business`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Business`] doesn't exist.
    async fn business(
        &self,
        ctx: &Context,
    ) -> Result<&domain::Business, Error> {
        let id = self.id.into();
        self.business
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::business::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|b| {
                        future::ready(b.ok_or_else(|| {
                            api::query::BusinessError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A business listing.
#[graphql_object(context = Context)]
impl Business {
    /// Unique identifier of this `Business`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Business.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// `User` owning this `Business`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Business.owner",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn owner(&self, ctx: &Context) -> Result<api::User, Error> {
        Ok(api::User::lazy(self.business(ctx).await?.owner_id))
    }

    /// Name of this `Business`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Business.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn name(&self, ctx: &Context) -> Result<Name, Error> {
        Ok(self.business(ctx).await?.name.clone().into())
    }

    /// Category of this `Business`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Business.category",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn category(&self, ctx: &Context) -> Result<Category, Error> {
        Ok(self.business(ctx).await?.category.clone().into())
    }

    /// Description of this `Business`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Business.description",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn description(
        &self,
        ctx: &Context,
    ) -> Result<Description, Error> {
        Ok(self.business(ctx).await?.description.clone().into())
    }

    /// Location (address) of this `Business`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Business.location",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn location(&self, ctx: &Context) -> Result<Location, Error> {
        Ok(self.business(ctx).await?.location.clone().into())
    }

    /// Phone number of this `Business`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Business.phone",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn phone(&self, ctx: &Context) -> Result<Phone, Error> {
        Ok(self.business(ctx).await?.phone.clone().into())
    }

    /// Opening hours of this `Business`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Business.hours",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn hours(&self, ctx: &Context) -> Result<Hours, Error> {
        Ok(self.business(ctx).await?.hours.clone().into())
    }

    /// Image URL of this `Business`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Business.image",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn image(&self, ctx: &Context) -> Result<Image, Error> {
        Ok(self.business(ctx).await?.image.clone().into())
    }

    /// Website URL of this `Business`, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Business.website",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn website(
        &self,
        ctx: &Context,
    ) -> Result<Option<Website>, Error> {
        Ok(self.business(ctx).await?.website.clone().map(Into::into))
    }

    /// Rating of this `Business` from `0` to `5`, being the mean score of its
    /// `Review`s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Business.rating",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn rating(&self, ctx: &Context) -> Result<f64, Error> {
        Ok(self.business(ctx).await?.rating.get())
    }

    /// Indicator whether this `Business` is featured on the front page.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Business.featured",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn featured(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(self.business(ctx).await?.featured)
    }

    /// `BusinessTag`s of this `Business` in lexicographical order.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Business.tags",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn tags(&self, ctx: &Context) -> Result<Vec<Tag>, Error> {
        Ok(self
            .business(ctx)
            .await?
            .tags
            .iter()
            .cloned()
            .map(Into::into)
            .collect())
    }

    /// `Review`s of this `Business` from the oldest to the newest.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Business.reviews",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn reviews(&self, ctx: &Context) -> Result<Vec<Review>, Error> {
        Ok(self
            .business(ctx)
            .await?
            .reviews
            .iter()
            .cloned()
            .map(Review)
            .collect())
    }

    /// `BusinessStatistics` of this `Business`.
    ///
    /// Visible only to the owner of this `Business` and admins.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Business.statistics",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn statistics(
        &self,
        ctx: &Context,
    ) -> Result<Option<Statistics>, Error> {
        let actor = ctx.actor().await?;
        let business = self.business(ctx).await?;
        let visible =
            policy::authorize(actor, Action::ViewAnalytics(business.owner_id))
                .ensure()
                .is_ok();
        Ok(visible.then(|| business.stats_or_default().into()))
    }

    /// `DateTime` when this `Business` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Business.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.business(ctx).await?.created_at.coerce())
    }
}

/// Review of a [`Business`].
#[derive(Clone, Debug)]
pub struct Review(domain::business::Review);

/// Review of a `Business` left by a `User`.
#[graphql_object(context = Context)]
impl Review {
    /// Unique identifier of this `Review`.
    #[must_use]
    pub fn id(&self) -> ReviewId {
        self.0.id.into()
    }

    /// `User` who wrote this `Review`.
    #[must_use]
    pub fn author(&self) -> api::User {
        api::User::lazy(self.0.author_id)
    }

    /// Score from `1` to `5` stars.
    #[must_use]
    pub fn score(&self) -> i32 {
        self.0.score.get().into()
    }

    /// Text content of this `Review`.
    #[must_use]
    pub fn content(&self) -> ReviewContent {
        self.0.content.clone().into()
    }

    /// `DateTime` when this `Review` was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Tracked statistics of a `Business`.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(name = "BusinessStatistics")]
pub struct Statistics {
    /// Number of views.
    pub views: i32,

    /// Number of website clicks.
    pub website_clicks: i32,

    /// Number of phone clicks.
    pub phone_clicks: i32,

    /// Click-through rate in percents.
    pub ctr: f64,

    /// Change of views in percents.
    pub views_change: f64,

    /// Change of website clicks in percents.
    pub website_clicks_change: f64,

    /// Change of phone clicks in percents.
    pub phone_clicks_change: f64,

    /// Change of the click-through rate in percents.
    pub ctr_change: f64,
}

impl From<domain::business::Statistics> for Statistics {
    fn from(s: domain::business::Statistics) -> Self {
        Self {
            views: scalar::count(s.views),
            website_clicks: scalar::count(s.website_clicks),
            phone_clicks: scalar::count(s.phone_clicks),
            ctr: s.ctr,
            views_change: s.views_change,
            website_clicks_change: s.website_clicks_change,
            phone_clicks_change: s.phone_clicks_change,
            ctr_change: s.ctr_change,
        }
    }
}

/// Change of a [`Business`] listing.
#[derive(Clone, Copy, Debug, From)]
pub struct Change(domain::business::Change);

/// Change of a `Business` listing.
#[graphql_object(name = "BusinessChange", context = Context)]
impl Change {
    /// Kind of this `BusinessChange`.
    #[must_use]
    pub fn kind(&self) -> ChangeKind {
        self.0.kind.into()
    }

    /// ID of the changed `Business`.
    #[must_use]
    pub fn business_id(&self) -> Id {
        self.0.business_id.into()
    }

    /// Changed `Business`, unless it has been deleted.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "BusinessChange.business",
            otel.name = api::Subscription::SPAN_NAME,
        ),
    )]
    pub async fn business(
        &self,
        ctx: &Context,
    ) -> Result<Option<Business>, Error> {
        ctx.service()
            .execute(query::business::ById::by(self.0.business_id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|b| b.map(Into::into))
    }
}

/// Kind of a `BusinessChange`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "BusinessChangeKind")]
pub enum ChangeKind {
    /// `Business` has been created.
    Created,

    /// `Business` has been updated.
    Updated,

    /// `Business` has been deleted.
    Deleted,
}

impl From<domain::business::change::Kind> for ChangeKind {
    fn from(kind: domain::business::change::Kind) -> Self {
        use domain::business::change::Kind as K;
        match kind {
            K::Created => Self::Created,
            K::Updated => Self::Updated,
            K::Deleted => Self::Deleted,
        }
    }
}

/// Order of top `Business`es.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "BusinessSort")]
pub enum Sort {
    /// Highest rating first.
    Rating,

    /// Most reviewed first.
    Reviews,

    /// Most viewed first.
    Trending,
}

impl From<Sort> for read::business::top::Sort {
    fn from(sort: Sort) -> Self {
        match sort {
            Sort::Rating => Self::Rating,
            Sort::Reviews => Self::Reviews,
            Sort::Trending => Self::Trending,
        }
    }
}

/// Clickable contact of a `Business`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "BusinessClickTarget")]
pub enum ClickTarget {
    /// Website link.
    Website,

    /// Phone number.
    Phone,
}

impl From<ClickTarget> for domain::event::Kind {
    fn from(target: ClickTarget) -> Self {
        match target {
            ClickTarget::Website => Self::WebsiteClick,
            ClickTarget::Phone => Self::PhoneClick,
        }
    }
}

/// Details of a new `Business`.
#[derive(Debug, GraphQLInputObject)]
#[graphql(name = "BusinessInput")]
pub struct Input {
    /// Name of the `Business`.
    pub name: Name,

    /// Category of the `Business`.
    pub category: Category,

    /// Description of the `Business`.
    pub description: Description,

    /// Location (address) of the `Business`.
    pub location: Location,

    /// Phone number of the `Business`.
    pub phone: Phone,

    /// Opening hours of the `Business`.
    pub hours: Hours,

    /// Image URL of the `Business`.
    pub image: Image,

    /// Website URL of the `Business`, if any.
    pub website: Option<Website>,

    /// `BusinessTag`s of the `Business`, at least one.
    pub tags: Vec<Tag>,
}

/// Changes of an existing `Business`.
///
/// Omitted fields are left untouched.
#[derive(Debug, GraphQLInputObject)]
#[graphql(name = "BusinessPatch")]
pub struct Patch {
    /// New name.
    pub name: Option<Name>,

    /// New category.
    pub category: Option<Category>,

    /// New description.
    pub description: Option<Description>,

    /// New location (address).
    pub location: Option<Location>,

    /// New phone number.
    pub phone: Option<Phone>,

    /// New opening hours.
    pub hours: Option<Hours>,

    /// New image URL.
    pub image: Option<Image>,

    /// New website URL, where an explicit `null` removes it.
    pub website: Nullable<Website>,

    /// New `BusinessTag`s, at least one.
    pub tags: Option<Vec<Tag>>,
}

/// Converts the provided [`Tag`]s into [`domain::business::Tags`].
///
/// # Errors
///
/// With `TOO_MANY_TAGS` if there are more unique [`Tag`]s than allowed.
pub(crate) fn tags(
    tags: impl IntoIterator<Item = Tag>,
) -> Result<domain::business::Tags, Error> {
    domain::business::Tags::new(tags.into_iter().map(Into::into))
        .ok_or_else(|| TagsError::TooMany.into())
}

/// Converts the provided [`Nullable`] into a patch of an optional value.
pub(crate) fn nullable<T, U>(value: Nullable<T>) -> Option<Option<U>>
where
    U: From<T>,
{
    match value {
        Nullable::ImplicitNull => None,
        Nullable::ExplicitNull => Some(None),
        Nullable::Some(v) => Some(Some(v.into())),
    }
}

define_error! {
    enum TagsError {
        #[code = "TOO_MANY_TAGS"]
        #[status = BAD_REQUEST]
        #[message = "`Business` may have at most 10 unique `BusinessTag`s"]
        TooMany,
    }
}

/// Unique identifier of a `Business`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::business::Id)]
#[into(domain::business::Id)]
#[graphql(name = "BusinessId", transparent)]
pub struct Id(Uuid);

/// Name of a `Business`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "BusinessName",
    with = scalar::Via::<domain::business::Name>,
)]
pub struct Name(domain::business::Name);

/// Category of a `Business`, like `Restaurant`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "BusinessCategory",
    with = scalar::Via::<domain::business::Category>,
)]
pub struct Category(domain::business::Category);

/// Free-form description of a `Business`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "BusinessDescription",
    with = scalar::Via::<domain::business::Description>,
)]
pub struct Description(domain::business::Description);

/// Location (address) of a `Business`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "BusinessLocation",
    with = scalar::Via::<domain::business::Location>,
)]
pub struct Location(domain::business::Location);

/// Phone number of a `Business` in `(XXX) XXX-XXXX` format.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "BusinessPhone",
    with = scalar::Via::<domain::business::Phone>,
)]
pub struct Phone(domain::business::Phone);

/// Opening hours of a `Business`, like `Mon-Fri 9am-5pm`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "BusinessHours",
    with = scalar::Via::<domain::business::Hours>,
)]
pub struct Hours(domain::business::Hours);

/// Image URL of a `Business`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "BusinessImage",
    with = scalar::Via::<domain::business::Image>,
)]
pub struct Image(domain::business::Image);

/// Website URL of a `Business`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "BusinessWebsite",
    with = scalar::Via::<domain::business::Website>,
)]
pub struct Website(domain::business::Website);

/// Short label of a `Business` used for faceted search.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "BusinessTag",
    with = scalar::Via::<domain::business::Tag>,
)]
pub struct Tag(domain::business::Tag);

/// Unique identifier of a `Review`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::business::review::Id)]
#[into(domain::business::review::Id)]
#[graphql(name = "ReviewId", transparent)]
pub struct ReviewId(Uuid);

/// Text content of a `Review`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ReviewContent",
    with = scalar::Via::<domain::business::review::Content>,
)]
pub struct ReviewContent(domain::business::review::Content);

#[cfg(test)]
mod spec {
    use juniper::Nullable;
    use service::domain;

    use super::{nullable, tags, Tag};

    fn tag(s: &str) -> Tag {
        domain::business::Tag::new(s).unwrap().into()
    }

    #[test]
    fn converts_tags() {
        let converted = tags([tag("Bar"), tag("Cafe"), tag("Bar")]).unwrap();
        assert_eq!(converted.len(), 2);

        let many = (0..=domain::business::Tags::MAX)
            .map(|i| tag(&format!("t{i}")))
            .collect::<Vec<_>>();
        let err = tags(many).unwrap_err();
        assert_eq!(err.code, "TOO_MANY_TAGS");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn distinguishes_explicit_null() {
        assert_eq!(nullable::<i32, i64>(Nullable::ImplicitNull), None);
        assert_eq!(nullable::<i32, i64>(Nullable::ExplicitNull), Some(None));
        assert_eq!(nullable::<i32, i64>(Nullable::Some(3)), Some(Some(3)));
    }
}
