//! GraphQL [`Subscription`]s definitions.

use common::DateTime;
use futures::{
    stream::{self, BoxStream},
    FutureExt as _, StreamExt as _,
};
use juniper::graphql_subscription;
use service::{query, Query as _};

use crate::{api, context, AsError, Context, Error};

/// Root of all GraphQL subscription.
#[derive(Clone, Copy, Debug)]
pub struct Subscription;

impl Subscription {
    /// Name of the [`tracing::Span`] for the subscriptions.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL subscription";
}

#[graphql_subscription(context = Context)]
impl Subscription {
    /// Subscription waiting for the current authenticated session to expire.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - if the current session is not
    ///                              authenticated or session expired.
    pub async fn wait_session(
        &self,
        ctx: &Context,
    ) -> Result<BoxStream<'static, Result<bool, Error>>, Error> {
        let session = ctx.current_session().await?;
        let timeout = session.expires_at - DateTime::now();
        Ok(stream::once(
            tokio::time::sleep(timeout).map(|()| {
                Err(context::AuthError::AuthorizationRequired.into())
            }),
        )
        .boxed())
    }

    /// Subscription to changes of `Business` listings.
    ///
    /// Emits a `BusinessChange` whenever any `Business` is created, updated
    /// or deleted.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "businessChanges",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn business_changes(
        &self,
        ctx: &Context,
    ) -> Result<BoxStream<'static, Result<api::business::Change, Error>>, Error>
    {
        ctx.service()
            .execute(query::businesses::Changes)
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|changes| {
                changes
                    .map(|c| Ok(api::business::Change::from(c)))
                    .boxed()
            })
    }
}
