//! GraphQL API definitions.

pub mod business;
mod mutation;
pub mod pricing;
mod query;
pub mod report;
pub mod scalar;
mod subscription;
pub mod user;

use crate::define_error;

pub use self::{
    business::Business, mutation::Mutation, query::Query,
    subscription::Subscription, user::User,
};

/// GraphQL schema.
pub type Schema = juniper::RootNode<'static, Query, Mutation, Subscription>;

define_error! {
    enum PrivilegeError {
        #[code = "FORBIDDEN"]
        #[status = FORBIDDEN]
        #[message = "Authenticated `User` is not allowed to do this"]
        Forbidden,
    }
}

define_error! {
    enum LimitError {
        #[code = "NEGATIVE_LIMIT"]
        #[status = BAD_REQUEST]
        #[message = "`limit` must not be negative"]
        Negative,
    }
}
