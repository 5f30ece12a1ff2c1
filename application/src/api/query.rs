//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{domain, query, read, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the currently authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `USER_NOT_EXISTS` - the authenticated `User` has been removed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "me",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn me(ctx: &Context) -> Result<api::User, Error> {
        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::user::ById::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| UserError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Business` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BUSINESS_NOT_EXISTS` - the `Business` with the specified ID does
    ///                           not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "business",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn business(
        id: api::business::Id,
        ctx: &Context,
    ) -> Result<api::Business, Error> {
        ctx.service()
            .execute(query::business::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| BusinessError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Searches `Business`es in their listing order.
    ///
    /// A `Business` matches when:
    /// - its name, category or description contains the `query`;
    /// - its location contains the `location`;
    /// - it has every one of the `tags`.
    ///
    /// Text matching is case-insensitive, and omitted criteria match
    /// everything.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "businesses",
            location = ?location,
            otel.name = Self::SPAN_NAME,
            query = ?query,
            tags = ?tags,
        ),
    )]
    pub async fn businesses(
        query: Option<String>,
        location: Option<String>,
        tags: Option<Vec<api::business::Tag>>,
        ctx: &Context,
    ) -> Result<Vec<api::Business>, Error> {
        ctx.service()
            .execute(query::businesses::Search {
                filter: read::business::search::Filter {
                    query: query.unwrap_or_default(),
                    location: location.unwrap_or_default(),
                    tags: tags
                        .into_iter()
                        .flatten()
                        .map(Into::into)
                        .collect(),
                },
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|bs| bs.into_iter().map(Into::into).collect())
    }

    /// Returns `Business`es owned by the currently authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myBusinesses",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_businesses(
        ctx: &Context,
    ) -> Result<Vec<api::Business>, Error> {
        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::businesses::ByOwner::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|bs| bs.into_iter().map(Into::into).collect())
    }

    /// Returns featured `Business`es in their listing order.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NEGATIVE_LIMIT` - the `limit` is negative.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "featuredBusinesses",
            limit = ?limit,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn featured_businesses(
        limit: Option<i32>,
        ctx: &Context,
    ) -> Result<Vec<api::Business>, Error> {
        let mut featured = query::businesses::Featured::default();
        if let Some(limit) = limit {
            featured.limit = api::scalar::limit(limit)
                .ok_or_else(|| api::LimitError::Negative.into())
                .map_err(ctx.error())?;
        }

        ctx.service()
            .execute(featured)
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|bs| bs.into_iter().map(Into::into).collect())
    }

    /// Returns top `Business`es, optionally of the specified `category`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NEGATIVE_LIMIT` - the `limit` is negative.
    #[tracing::instrument(
        skip_all,
        fields(
            category = ?category.as_ref().map(ToString::to_string),
            gql.name = "topBusinesses",
            limit = ?limit,
            otel.name = Self::SPAN_NAME,
            sort = ?sort,
        ),
    )]
    pub async fn top_businesses(
        category: Option<api::business::Category>,
        sort: Option<api::business::Sort>,
        limit: Option<i32>,
        ctx: &Context,
    ) -> Result<Vec<api::Business>, Error> {
        let limit = match limit {
            Some(l) => api::scalar::limit(l)
                .ok_or_else(|| api::LimitError::Negative.into())
                .map_err(ctx.error())?,
            None => query::businesses::Top::DEFAULT_LIMIT,
        };

        ctx.service()
            .execute(query::businesses::Top {
                selector: read::business::top::Selector {
                    category: category.map(Into::into),
                    sort: sort.unwrap_or(api::business::Sort::Rating).into(),
                    limit,
                },
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|bs| bs.into_iter().map(Into::into).collect())
    }

    /// Returns analytics of `Business`es owned by a `User`.
    ///
    /// The `owner` defaults to the currently authenticated `User`, while
    /// admins may specify any other one.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `BUSINESS_NOT_EXISTS` - the `owner` doesn't own the `Business` with
    ///                           the specified ID;
    /// - `FORBIDDEN` - the current `User` is not an admin and specified
    ///                 another `owner`.
    #[tracing::instrument(
        skip_all,
        fields(
            business = ?business,
            gql.name = "analytics",
            mode = ?mode,
            otel.name = Self::SPAN_NAME,
            owner = ?owner,
            range = ?range,
            source = ?source,
        ),
    )]
    pub async fn analytics(
        range: Option<api::report::analytics::Range>,
        mode: Option<api::report::analytics::Mode>,
        source: Option<api::report::analytics::Source>,
        business: Option<api::business::Id>,
        owner: Option<api::user::Id>,
        ctx: &Context,
    ) -> Result<api::report::Analytics, Error> {
        let session = ctx.current_session().await?;

        ctx.service()
            .execute(query::report::Analytics {
                actor: session.actor(),
                owner_id: owner.unwrap_or(session.user_id).into(),
                business_id: business.map(Into::into),
                range: range.unwrap_or_default().into(),
                mode: mode.unwrap_or_default().into(),
                source: source.unwrap_or_default().into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns platform-wide statistics.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `FORBIDDEN` - the current `User` is not an admin.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "platformStats",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn platform_stats(
        ctx: &Context,
    ) -> Result<api::report::Platform, Error> {
        let session = ctx.current_session().await?;

        ctx.service()
            .execute(query::report::Platform {
                actor: session.actor(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the vocabulary of `BusinessTag`s offered when creating a
    /// `Business`.
    #[must_use]
    pub fn tags() -> Vec<api::business::Tag> {
        domain::business::Tag::predefined().map(Into::into).collect()
    }

    /// Returns pricing of every `SubscriptionPlan`, from the cheapest one.
    #[must_use]
    pub fn pricing() -> Vec<api::pricing::Pricing> {
        api::pricing::Pricing::all()
    }
}

impl AsError for query::report::analytics::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::BusinessNotExists(_) => Some(BusinessError::NotExists.into()),
            Self::Forbidden(e) => e.try_as_error(),
        }
    }
}

impl AsError for query::report::platform::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Forbidden(e) => e.try_as_error(),
        }
    }
}

define_error! {
    enum BusinessError {
        #[code = "BUSINESS_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Business` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the specified ID does not exist"]
        NotExists,
    }
}
