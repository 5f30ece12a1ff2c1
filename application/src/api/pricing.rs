//! Pricing definitions.

use common::Money;
use juniper::{graphql_object, GraphQLEnum};
use service::domain;

use crate::{api::user, Context};

/// Pricing of a subscription plan.
#[derive(Clone, Copy, Debug)]
pub struct Pricing(domain::user::Plan);

impl Pricing {
    /// Returns [`Pricing`] of every plan, from the cheapest one.
    #[must_use]
    pub fn all() -> Vec<Self> {
        [user::Plan::Free, user::Plan::Pro, user::Plan::Enterprise]
            .into_iter()
            .map(|p| Self(p.into()))
            .collect()
    }
}

/// Pricing of a `SubscriptionPlan`.
#[graphql_object(name = "PlanPricing", context = Context)]
impl Pricing {
    /// Priced `SubscriptionPlan`.
    #[must_use]
    pub fn plan(&self) -> user::Plan {
        self.0.into()
    }

    /// Monthly price of the `SubscriptionPlan`.
    #[must_use]
    pub fn monthly_price(&self) -> Money {
        self.0.monthly_price()
    }

    /// `PlanFeature`s included into the `SubscriptionPlan`.
    #[must_use]
    pub fn features(&self) -> Vec<Feature> {
        self.0.features().map(Into::into).collect()
    }
}

/// Feature offered by subscription plans.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "PlanFeature")]
pub enum Feature {
    /// Basic business listing.
    BasicListing,

    /// Customer reviews.
    CustomerReviews,

    /// Business hours.
    BusinessHours,

    /// Contact information.
    ContactInformation,

    /// Single location.
    SingleLocation,

    /// Priority placement in search results.
    PriorityPlacement,

    /// Multiple photos.
    MultiplePhotos,

    /// Business analytics.
    BusinessAnalytics,

    /// Multiple locations.
    MultipleLocations,

    /// Special offers and promotions.
    SpecialOffers,

    /// Customer messaging.
    CustomerMessaging,

    /// API access.
    ApiAccess,

    /// Dedicated support.
    DedicatedSupport,

    /// Custom branding.
    CustomBranding,

    /// Integration support.
    IntegrationSupport,
}

impl From<domain::user::subscription::Feature> for Feature {
    fn from(feature: domain::user::subscription::Feature) -> Self {
        use domain::user::subscription::Feature as F;
        match feature {
            F::BasicListing => Self::BasicListing,
            F::CustomerReviews => Self::CustomerReviews,
            F::BusinessHours => Self::BusinessHours,
            F::ContactInformation => Self::ContactInformation,
            F::SingleLocation => Self::SingleLocation,
            F::PriorityPlacement => Self::PriorityPlacement,
            F::MultiplePhotos => Self::MultiplePhotos,
            F::BusinessAnalytics => Self::BusinessAnalytics,
            F::MultipleLocations => Self::MultipleLocations,
            F::SpecialOffers => Self::SpecialOffers,
            F::CustomerMessaging => Self::CustomerMessaging,
            F::ApiAccess => Self::ApiAccess,
            F::DedicatedSupport => Self::DedicatedSupport,
            F::CustomBranding => Self::CustomBranding,
            F::IntegrationSupport => Self::IntegrationSupport,
        }
    }
}

#[cfg(test)]
mod spec {
    use super::{Feature, Pricing};

    #[test]
    fn lists_every_plan() {
        let all = Pricing::all();

        assert_eq!(all.len(), 3);
        assert_eq!(
            all.iter().map(|p| p.0.features().count()).collect::<Vec<_>>(),
            [5, 11, 15],
        );
        assert_eq!(
            Feature::from(
                service::domain::user::subscription::Feature::ApiAccess,
            ),
            Feature::ApiAccess,
        );
    }
}
