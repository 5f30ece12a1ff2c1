//! [`Command`] definition.

pub mod add_business_review;
pub mod authorize_user_session;
pub mod cancel_subscription;
pub mod create_business;
pub mod create_user;
pub mod create_user_session;
pub mod delete_business;
pub mod ensure_admin;
pub mod feature_business;
pub mod subscribe;
pub mod track_business_event;
pub mod update_business;
pub mod update_user_password;
pub mod update_user_profile;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    add_business_review::AddBusinessReview,
    authorize_user_session::AuthorizeUserSession,
    cancel_subscription::CancelSubscription, create_business::CreateBusiness,
    create_user::CreateUser, create_user_session::CreateUserSession,
    delete_business::DeleteBusiness, ensure_admin::EnsureAdmin,
    feature_business::FeatureBusiness, subscribe::Subscribe,
    track_business_event::TrackBusinessEvent, update_business::UpdateBusiness,
    update_user_password::UpdateUserPassword,
    update_user_profile::UpdateUserProfile,
};
