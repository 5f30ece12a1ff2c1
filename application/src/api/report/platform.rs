//! [`Platform`] report definition.

use common::Money;
use derive_more::From;
use juniper::graphql_object;
use service::read;

use crate::{
    api::{self, scalar},
    Context,
};

/// Platform-wide statistics for admins.
#[derive(Clone, Debug, From)]
pub struct Platform(read::platform::Statistics);

/// Platform-wide statistics for admins.
#[graphql_object(name = "PlatformStatistics", context = Context)]
impl Platform {
    /// Total number of registered `User`s.
    #[must_use]
    pub fn total_users(&self) -> i32 {
        scalar::count(self.0.total_users)
    }

    /// Total number of listed `Business`es.
    #[must_use]
    pub fn total_businesses(&self) -> i32 {
        scalar::count(self.0.total_businesses)
    }

    /// Number of `User`s with an active `UserSubscription`.
    #[must_use]
    pub fn active_subscriptions(&self) -> i32 {
        scalar::count(self.0.active_subscriptions)
    }

    /// Sum of monthly prices of all active `UserSubscription`s.
    #[must_use]
    pub fn monthly_revenue(&self) -> Money {
        self.0.monthly_revenue
    }

    /// Most recently created `Business`es, from the oldest to the newest.
    #[must_use]
    pub fn recent_businesses(&self) -> Vec<api::Business> {
        self.0
            .recent_businesses
            .iter()
            .cloned()
            .map(Into::into)
            .collect()
    }
}
