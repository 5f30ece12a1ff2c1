//! GraphQL [`Mutation`]s definitions.

use juniper::graphql_object;
use service::{command, domain, Command as _};

use crate::{api, define_error, AsError, Context, Error, Session};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new `User` with the provided credentials and signs it in.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `EMAIL_OCCUPIED` - provided `UserEmail` is occupied by another
    ///                      `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "createUser",
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user(
        name: api::user::Name,
        email: api::user::Email,
        password: api::user::Password,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let user = ctx
            .service()
            .execute(command::CreateUser {
                actor: ctx.actor().await?,
                name: name.into(),
                email: email.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        let output = ctx
            .service()
            .execute(command::CreateUserSession::ByUserId(user.id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.set_current_session(Session {
            user_id: output.user.id.into(),
            role: output.user.role,
            token: output.token.clone(),
            expires_at: output.expires_at.coerce(),
        })
        .await;

        Ok(output.into())
    }

    /// Creates a new `UserSession` with the provided credentials.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `WRONG_CREDENTIALS` - provided credentials does not match any `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "createUserSession",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user_session(
        email: api::user::Email,
        password: api::user::Password,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let output = ctx
            .service()
            .execute(command::CreateUserSession::ByCredentials {
                email: email.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.set_current_session(Session {
            user_id: output.user.id.into(),
            role: output.user.role,
            token: output.token.clone(),
            expires_at: output.expires_at.coerce(),
        })
        .await;

        Ok(output.into())
    }

    /// Updates profile of the currently authenticated `User`.
    ///
    /// Omitted arguments are left untouched.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `EMAIL_OCCUPIED` - provided `UserEmail` is occupied by another
    ///                      `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            business_address = ?business_address,
            business_name = ?business_name,
            email = ?email,
            gql.name = "updateUserProfile",
            name = ?name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_user_profile(
        name: Option<api::user::Name>,
        email: Option<api::user::Email>,
        business_name: Option<api::user::BusinessName>,
        business_address: Option<api::user::BusinessAddress>,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        let session = ctx.current_session().await?;

        ctx.service()
            .execute(command::UpdateUserProfile {
                actor: session.actor(),
                user_id: session.user_id.into(),
                name: name.map(Into::into),
                email: email.map(Into::into),
                business_name: business_name.map(Into::into),
                business_address: business_address.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the `User`'s password to the provided one.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `WRONG_PASSWORD` - provided `old_password` does not match the current
    ///                      `User` password.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateUserPassword",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_user_password(
        new_password: api::user::Password,
        old_password: api::user::Password,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        let session = ctx.current_session().await?;

        ctx.service()
            .execute(command::UpdateUserPassword {
                actor: session.actor(),
                user_id: session.user_id.into(),
                new_password: secrecy::SecretBox::init_with(move || {
                    new_password.into()
                }),
                old_password: secrecy::SecretBox::init_with(move || {
                    old_password.into()
                }),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Subscribes the currently authenticated `User` to the provided
    /// `SubscriptionPlan`, replacing the current `UserSubscription`, if any.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "subscribe",
            otel.name = Self::SPAN_NAME,
            plan = ?plan,
        ),
    )]
    pub async fn subscribe(
        plan: api::user::Plan,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        let session = ctx.current_session().await?;

        ctx.service()
            .execute(command::Subscribe {
                actor: session.actor(),
                user_id: session.user_id.into(),
                plan: plan.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Cancels the `UserSubscription` of the currently authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `NO_SUBSCRIPTION` - the `User` has no `UserSubscription`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "cancelSubscription",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn cancel_subscription(
        ctx: &Context,
    ) -> Result<api::User, Error> {
        let session = ctx.current_session().await?;

        ctx.service()
            .execute(command::CancelSubscription {
                actor: session.actor(),
                user_id: session.user_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Lists a new `Business` owned by the currently authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `NO_TAGS` - no `BusinessTag`s were provided;
    /// - `TOO_MANY_TAGS` - too many `BusinessTag`s were provided.
    #[tracing::instrument(
        skip_all,
        fields(
            category = %input.category,
            gql.name = "createBusiness",
            name = %input.name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_business(
        input: api::business::Input,
        ctx: &Context,
    ) -> Result<api::Business, Error> {
        let session = ctx.current_session().await?;
        let api::business::Input {
            name,
            category,
            description,
            location,
            phone,
            hours,
            image,
            website,
            tags,
        } = input;

        ctx.service()
            .execute(command::CreateBusiness {
                actor: session.actor(),
                name: name.into(),
                category: category.into(),
                description: description.into(),
                location: location.into(),
                phone: phone.into(),
                hours: hours.into(),
                image: image.into(),
                website: website.map(Into::into),
                tags: api::business::tags(tags).map_err(ctx.error())?,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the `Business` with the provided ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `BUSINESS_NOT_EXISTS` - the `Business` does not exist;
    /// - `FORBIDDEN` - the current `User` neither owns the `Business` nor is
    ///                 an admin;
    /// - `NO_TAGS` - an empty list of `BusinessTag`s was provided;
    /// - `TOO_MANY_TAGS` - too many `BusinessTag`s were provided.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateBusiness",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_business(
        id: api::business::Id,
        patch: api::business::Patch,
        ctx: &Context,
    ) -> Result<api::Business, Error> {
        let session = ctx.current_session().await?;
        let api::business::Patch {
            name,
            category,
            description,
            location,
            phone,
            hours,
            image,
            website,
            tags,
        } = patch;
        let tags = tags
            .map(api::business::tags)
            .transpose()
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::UpdateBusiness {
                actor: session.actor(),
                business_id: id.into(),
                name: name.map(Into::into),
                category: category.map(Into::into),
                description: description.map(Into::into),
                location: location.map(Into::into),
                phone: phone.map(Into::into),
                hours: hours.map(Into::into),
                image: image.map(Into::into),
                website: api::business::nullable(website),
                tags,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Removes the `Business` with the provided ID from the directory.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `BUSINESS_NOT_EXISTS` - the `Business` does not exist;
    /// - `FORBIDDEN` - the current `User` neither owns the `Business` nor is
    ///                 an admin.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteBusiness",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_business(
        id: api::business::Id,
        ctx: &Context,
    ) -> Result<api::Business, Error> {
        let session = ctx.current_session().await?;

        ctx.service()
            .execute(command::DeleteBusiness {
                actor: session.actor(),
                business_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Marks the `Business` with the provided ID as featured or not.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `BUSINESS_NOT_EXISTS` - the `Business` does not exist;
    /// - `FORBIDDEN` - the current `User` is not an admin.
    #[tracing::instrument(
        skip_all,
        fields(
            featured = featured,
            gql.name = "featureBusiness",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn feature_business(
        id: api::business::Id,
        featured: bool,
        ctx: &Context,
    ) -> Result<api::Business, Error> {
        let session = ctx.current_session().await?;

        ctx.service()
            .execute(command::FeatureBusiness {
                actor: session.actor(),
                business_id: id.into(),
                featured,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Tracks a view of the `Business` with the provided ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BUSINESS_NOT_EXISTS` - the `Business` does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "trackBusinessView",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn track_business_view(
        id: api::business::Id,
        ctx: &Context,
    ) -> Result<api::Business, Error> {
        ctx.service()
            .execute(command::TrackBusinessEvent {
                actor: ctx.actor().await?,
                business_id: id.into(),
                kind: domain::event::Kind::View,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Tracks a click on a contact of the `Business` with the provided ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BUSINESS_NOT_EXISTS` - the `Business` does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "trackBusinessClick",
            id = %id,
            otel.name = Self::SPAN_NAME,
            target = ?target,
        ),
    )]
    pub async fn track_business_click(
        id: api::business::Id,
        target: api::business::ClickTarget,
        ctx: &Context,
    ) -> Result<api::Business, Error> {
        ctx.service()
            .execute(command::TrackBusinessEvent {
                actor: ctx.actor().await?,
                business_id: id.into(),
                kind: target.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Adds a `Review` authored by the currently authenticated `User` to the
    /// `Business` with the provided ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
    /// - `BUSINESS_NOT_EXISTS` - the `Business` does not exist;
    /// - `INVALID_SCORE` - the `score` is not in `1..=5` range.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "addBusinessReview",
            id = %id,
            otel.name = Self::SPAN_NAME,
            score = score,
        ),
    )]
    pub async fn add_business_review(
        id: api::business::Id,
        score: i32,
        content: api::business::ReviewContent,
        ctx: &Context,
    ) -> Result<api::Business, Error> {
        let session = ctx.current_session().await?;
        let score = u8::try_from(score)
            .ok()
            .and_then(domain::business::review::Score::new)
            .ok_or_else(|| ReviewError::InvalidScore.into())
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::AddBusinessReview {
                actor: session.actor(),
                business_id: id.into(),
                score,
                content: content.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

define_error! {
    enum ReviewError {
        #[code = "INVALID_SCORE"]
        #[status = BAD_REQUEST]
        #[message = "`Review` score must be in `1..=5` range"]
        InvalidScore,
    }
}

define_error! {
    enum BusinessError {
        #[code = "BUSINESS_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Business` with the provided ID does not exist"]
        NotExists,

        #[code = "NO_TAGS"]
        #[status = BAD_REQUEST]
        #[message = "At least one `BusinessTag` must be provided"]
        NoTags,
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "EMAIL_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "`UserEmail` is occupied by another `User`"]
                EmailOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(Error::EmailOccupied.into()),
            Self::Forbidden(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "WRONG_CREDENTIALS"]
                #[status = FORBIDDEN]
                #[message = "Provided credentials does not match any `User`"]
                WrongCredentials,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::TokenEncodeError(_) => None,
            Self::UserNotExists(_) | Self::WrongCredentials => {
                Some(Error::WrongCredentials.into())
            }
        }
    }
}

impl AsError for command::update_user_profile::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "EMAIL_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "`UserEmail` is occupied by another `User`"]
                EmailOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(Error::EmailOccupied.into()),
            Self::Forbidden(e) => e.try_as_error(),
            Self::UserNotExists(_) => None,
        }
    }
}

impl AsError for command::update_user_password::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "WRONG_PASSWORD"]
                #[status = CONFLICT]
                #[message = "Provided `old_password` does not match the \
                             current `User` password"]
                WrongPassword,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Forbidden(e) => e.try_as_error(),
            Self::UserNotExists(_) => None,
            Self::WrongPassword => Some(Error::WrongPassword.into()),
        }
    }
}

impl AsError for command::subscribe::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Forbidden(e) => e.try_as_error(),
            Self::UserNotExists(_) => None,
        }
    }
}

impl AsError for command::cancel_subscription::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "NO_SUBSCRIPTION"]
                #[status = CONFLICT]
                #[message = "`User` has no `UserSubscription` to cancel"]
                NoSubscription,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Forbidden(e) => e.try_as_error(),
            Self::NoSubscription(_) => Some(Error::NoSubscription.into()),
            Self::UserNotExists(_) => None,
        }
    }
}

impl AsError for command::create_business::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Forbidden(e) => e.try_as_error(),
            Self::NoOwner => None,
            Self::NoTags => Some(BusinessError::NoTags.into()),
        }
    }
}

impl AsError for command::update_business::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::BusinessNotExists(_) => Some(BusinessError::NotExists.into()),
            Self::Forbidden(e) => e.try_as_error(),
            Self::NoTags => Some(BusinessError::NoTags.into()),
        }
    }
}

impl AsError for command::delete_business::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::BusinessNotExists(_) => Some(BusinessError::NotExists.into()),
            Self::Forbidden(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::feature_business::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::BusinessNotExists(_) => Some(BusinessError::NotExists.into()),
            Self::Forbidden(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::track_business_event::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::BusinessNotExists(_) => Some(BusinessError::NotExists.into()),
            Self::Forbidden(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::add_business_review::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::BusinessNotExists(_) => Some(BusinessError::NotExists.into()),
            Self::Forbidden(e) => e.try_as_error(),
            Self::NoAuthor => None,
        }
    }
}

#[cfg(test)]
mod spec {
    use http::StatusCode;
    use service::{command, domain, policy};

    use crate::AsError as _;

    #[test]
    fn maps_command_errors() {
        let err = command::update_business::ExecutionError::NoTags
            .try_as_error()
            .unwrap();
        assert_eq!(err.code, "NO_TAGS");
        assert_eq!(err.status_code, StatusCode::BAD_REQUEST);

        let err = command::delete_business::ExecutionError::BusinessNotExists(
            domain::business::Id::new(),
        )
        .try_as_error()
        .unwrap();
        assert_eq!(err.code, "BUSINESS_NOT_EXISTS");
        assert_eq!(err.status_code, StatusCode::NOT_FOUND);

        let err = command::feature_business::ExecutionError::Forbidden(
            policy::Forbidden,
        )
        .try_as_error()
        .unwrap();
        assert_eq!(err.code, "FORBIDDEN");
        assert_eq!(err.status_code, StatusCode::FORBIDDEN);

        let err = command::create_user_session::ExecutionError::WrongCredentials
            .try_as_error()
            .unwrap();
        assert_eq!(err.code, "WRONG_CREDENTIALS");

        assert!(command::create_business::ExecutionError::NoOwner
            .try_as_error()
            .is_none());
    }
}
