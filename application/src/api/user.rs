//! [`User`]-related definitions.

use std::future;

use common::{DateTime, Money};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{domain, policy::Actor, query, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// A [`User`] of the directory.
#[derive(Clone, Debug)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`domain::User`] representing this [`User`].
    user: OnceCell<domain::User>,
}

impl From<domain::User> for User {
    fn from(user: domain::User) -> Self {
        Self {
            id: user.id.into(),
            user: OnceCell::new_with(Some(user)),
        }
    }
}

impl User {
    /// Creates a new [`User`] loaded lazily by the provided ID.
    ///
    /// Accessing a [`User`] which doesn't exist results in an error.
    #[must_use]
    pub fn lazy(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            user: OnceCell::new(),
        }
    }

    /// Returns the [`domain::User`] representing this [`User`].
    ///
    /// # Errors
    ///
    /// Error if the [`domain::User`] doesn't exist.
    async fn user(&self, ctx: &Context) -> Result<&domain::User, Error> {
        let id = self.id.into();
        self.user
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::user::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|u| {
                        future::ready(u.ok_or_else(|| {
                            api::query::UserError::NotExists.into()
                        }))
                    })
            })
            .await
    }

    /// Indicates whether private details of this [`User`] are visible to the
    /// current [`Actor`].
    ///
    /// # Errors
    ///
    /// Errors if the provided authentication token is invalid.
    async fn is_visible(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(match ctx.actor().await? {
            Actor::User { id, role } => {
                Id::from(id) == self.id || role == domain::user::Role::Admin
            }
            Actor::System => true,
            Actor::Anonymous => false,
        })
    }
}

/// A `User` of the directory.
#[graphql_object(context = Context)]
impl User {
    /// Unique identifier of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Display name of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn name(&self, ctx: &Context) -> Result<Name, Error> {
        Ok(self.user(ctx).await?.name.clone().into())
    }

    /// Email of this `User`.
    ///
    /// Visible only to this `User` and admins.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.email",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn email(&self, ctx: &Context) -> Result<Option<Email>, Error> {
        Ok(if self.is_visible(ctx).await? {
            Some(self.user(ctx).await?.email.clone().into())
        } else {
            None
        })
    }

    /// Role of this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.role",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn role(&self, ctx: &Context) -> Result<Role, Error> {
        Ok(self.user(ctx).await?.role.into())
    }

    /// `UserSubscription` of this `User`, if any.
    ///
    /// Visible only to this `User` and admins.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.subscription",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn subscription(
        &self,
        ctx: &Context,
    ) -> Result<Option<Subscription>, Error> {
        if !self.is_visible(ctx).await? {
            return Ok(None);
        }
        Ok(self.user(ctx).await?.subscription.map(Subscription))
    }

    /// Name of the business this `User` represents, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.businessName",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn business_name(
        &self,
        ctx: &Context,
    ) -> Result<Option<BusinessName>, Error> {
        Ok(self.user(ctx).await?.business_name.clone().map(Into::into))
    }

    /// Address of the business this `User` represents, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.businessAddress",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn business_address(
        &self,
        ctx: &Context,
    ) -> Result<Option<BusinessAddress>, Error> {
        Ok(self.user(ctx).await?.business_address.clone().map(Into::into))
    }

    /// `Business`es owned by this `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.businesses",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn businesses(
        &self,
        ctx: &Context,
    ) -> Result<Vec<api::Business>, Error> {
        ctx.service()
            .execute(query::businesses::ByOwner::by(self.id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|bs| bs.into_iter().map(Into::into).collect())
    }

    /// `DateTime` when this `User` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.user(ctx).await?.created_at.coerce())
    }
}

/// Paid plan subscription of a [`User`].
#[derive(Clone, Copy, Debug)]
pub struct Subscription(domain::user::Subscription);

/// Paid plan subscription of a `User`.
#[graphql_object(name = "UserSubscription", context = Context)]
impl Subscription {
    /// Subscribed `SubscriptionPlan`.
    #[must_use]
    pub fn plan(&self) -> Plan {
        self.0.plan.into()
    }

    /// Status of this `UserSubscription`.
    #[must_use]
    pub fn status(&self) -> SubscriptionStatus {
        self.0.status.into()
    }

    /// Monthly price of the subscribed `SubscriptionPlan`.
    #[must_use]
    pub fn monthly_price(&self) -> Money {
        self.0.plan.monthly_price()
    }
}

/// Unique identifier of a `User`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::user::Id)]
#[into(domain::user::Id)]
#[graphql(name = "UserId", transparent)]
pub struct Id(Uuid);

/// Display name of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserName",
    with = scalar::Via::<domain::user::Name>,
)]
pub struct Name(domain::user::Name);

/// Password of a `User`.
#[derive(AsRef, Clone, Debug, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserPassword",
    with = scalar::Via::<domain::user::Password>,
)]
pub struct Password(domain::user::Password);

/// Email of a `User`, used as a login.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserEmail",
    with = scalar::Via::<domain::user::Email>,
)]
pub struct Email(domain::user::Email);

/// Name of the business a `User` represents.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserBusinessName",
    with = scalar::Via::<domain::user::BusinessName>,
)]
pub struct BusinessName(domain::user::BusinessName);

/// Address of the business a `User` represents.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "UserBusinessAddress",
    with = scalar::Via::<domain::user::BusinessAddress>,
)]
pub struct BusinessAddress(domain::user::BusinessAddress);

/// Role of a `User`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "UserRole")]
pub enum Role {
    /// Regular `User` browsing and owning businesses.
    User,

    /// Administrator of the directory.
    Admin,
}

impl From<domain::user::Role> for Role {
    fn from(role: domain::user::Role) -> Self {
        use domain::user::Role as R;
        match role {
            R::User => Self::User,
            R::Admin => Self::Admin,
        }
    }
}

/// Subscription plan.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "SubscriptionPlan")]
pub enum Plan {
    /// Free plan.
    Free,

    /// Plan for growing businesses.
    Pro,

    /// Plan for large businesses.
    Enterprise,
}

impl From<domain::user::Plan> for Plan {
    fn from(plan: domain::user::Plan) -> Self {
        use domain::user::Plan as P;
        match plan {
            P::Free => Self::Free,
            P::Pro => Self::Pro,
            P::Enterprise => Self::Enterprise,
        }
    }
}

impl From<Plan> for domain::user::Plan {
    fn from(plan: Plan) -> Self {
        match plan {
            Plan::Free => Self::Free,
            Plan::Pro => Self::Pro,
            Plan::Enterprise => Self::Enterprise,
        }
    }
}

/// Status of a `UserSubscription`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
pub enum SubscriptionStatus {
    /// Subscription is paid and in effect.
    Active,

    /// Subscription has been cancelled by its `User`.
    Cancelled,

    /// Subscription has not been renewed in time.
    Expired,
}

impl From<domain::user::subscription::Status> for SubscriptionStatus {
    fn from(status: domain::user::subscription::Status) -> Self {
        use domain::user::subscription::Status as S;
        match status {
            S::Active => Self::Active,
            S::Cancelled => Self::Cancelled,
            S::Expired => Self::Expired,
        }
    }
}

pub mod session {
    //! [`Session`]-related definitions.
    //!
    //! [`Session`]: crate::Session

    use common::DateTime;
    use derive_more::{AsRef, From, Into};
    use juniper::{GraphQLObject, GraphQLScalar};
    use service::{command, domain};

    use crate::{
        api::{self, scalar},
        Context,
    };

    /// `Session` access token.
    #[derive(AsRef, Clone, Debug, From, GraphQLScalar, Into)]
    #[graphql(
        name = "UserAuthToken",
        with = scalar::Via::<domain::user::session::Token>,
    )]
    pub struct Token(domain::user::session::Token);

    /// Result of a `Session` creation.
    #[derive(Clone, Debug, From, GraphQLObject)]
    #[graphql(context = Context, name = "CreateSessionResult")]
    pub struct CreateResult {
        /// Access token of the created `Session`.
        pub token: Token,

        /// `User` associated with the created `Session`.
        pub user: api::User,

        /// `DateTime` when the created `Session` expires.
        pub expires_at: DateTime,
    }

    impl From<command::create_user_session::Output> for CreateResult {
        fn from(output: command::create_user_session::Output) -> Self {
            let command::create_user_session::Output {
                token,
                user,
                expires_at,
            } = output;
            Self {
                token: token.into(),
                user: user.into(),
                expires_at: expires_at.coerce(),
            }
        }
    }
}
