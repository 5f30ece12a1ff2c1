//! Platform-wide [`Statistics`] for admins.

use common::{money::Currency, Money};

use crate::domain::{Business, User};

/// Platform-wide statistics.
#[derive(Clone, Debug, PartialEq)]
pub struct Statistics {
    /// Total number of [`User`]s.
    pub total_users: usize,

    /// Total number of [`Business`]es.
    pub total_businesses: usize,

    /// Number of [`User`]s with an active [`Subscription`].
    ///
    /// [`Subscription`]: crate::domain::user::Subscription
    pub active_subscriptions: usize,

    /// Sum of monthly prices of all active [`Subscription`]s.
    ///
    /// [`Subscription`]: crate::domain::user::Subscription
    pub monthly_revenue: Money,

    /// Most recently created [`Business`]es, from the oldest to the newest.
    pub recent_businesses: Vec<Business>,
}

impl Statistics {
    /// Number of [`Business`]es in [`Statistics::recent_businesses`].
    pub const RECENT: usize = 5;

    /// Collects [`Statistics`] out of the provided [`User`]s and
    /// [`Business`]es, both in their insertion order.
    #[must_use]
    pub fn collect(users: &[User], businesses: &[Business]) -> Self {
        let active = users
            .iter()
            .filter_map(|u| u.subscription)
            .filter(|s| s.is_active());

        let (active_subscriptions, monthly_revenue) = active.fold(
            (0, Money::zero(Currency::Usd)),
            |(count, revenue), s| {
                let revenue = revenue
                    .checked_add(s.plan.monthly_price())
                    .unwrap_or(revenue);
                (count + 1, revenue)
            },
        );

        Self {
            total_users: users.len(),
            total_businesses: businesses.len(),
            active_subscriptions,
            monthly_revenue,
            recent_businesses: businesses
                [businesses.len().saturating_sub(Self::RECENT)..]
                .to_vec(),
        }
    }
}
