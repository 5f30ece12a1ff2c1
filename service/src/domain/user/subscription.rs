//! [`Subscription`] definitions.

use common::{define_kind, money::Currency, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;

#[cfg(doc)]
use crate::domain::User;

/// Paid plan subscription of a [`User`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Subscription {
    /// Subscribed [`Plan`].
    pub plan: Plan,

    /// [`Status`] of this [`Subscription`].
    pub status: Status,
}

impl Subscription {
    /// Indicates whether this [`Subscription`] is [`Status::Active`].
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }
}

define_kind! {
    #[doc = "Subscription plan."]
    enum Plan {
        #[doc = "Free plan."]
        Free = 1,

        #[doc = "Plan for growing businesses."]
        Pro = 2,

        #[doc = "Plan for large businesses."]
        Enterprise = 3,
    }
}

impl Plan {
    /// Returns the monthly price of this [`Plan`].
    #[must_use]
    pub fn monthly_price(self) -> Money {
        let amount = match self {
            Self::Free => 0,
            Self::Pro => 29,
            Self::Enterprise => 99,
        };
        Money {
            amount: Decimal::from(amount),
            currency: Currency::Usd,
        }
    }

    /// Indicates whether this [`Plan`] includes the provided [`Feature`].
    #[must_use]
    pub fn includes(self, feature: Feature) -> bool {
        use Feature as F;

        match feature {
            F::BasicListing
            | F::CustomerReviews
            | F::BusinessHours
            | F::ContactInformation
            | F::SingleLocation => true,
            F::PriorityPlacement
            | F::MultiplePhotos
            | F::BusinessAnalytics
            | F::MultipleLocations
            | F::SpecialOffers
            | F::CustomerMessaging => self != Self::Free,
            F::ApiAccess
            | F::DedicatedSupport
            | F::CustomBranding
            | F::IntegrationSupport => self == Self::Enterprise,
        }
    }

    /// Returns all the [`Feature`]s included into this [`Plan`].
    pub fn features(self) -> impl Iterator<Item = Feature> {
        Feature::iter().filter(move |f| self.includes(*f))
    }
}

define_kind! {
    #[doc = "Status of a [`Subscription`]."]
    enum Status {
        #[doc = "[`Subscription`] is paid and in effect."]
        Active = 1,

        #[doc = "[`Subscription`] has been cancelled by its [`User`]."]
        Cancelled = 2,

        #[doc = "[`Subscription`] has not been renewed in time."]
        Expired = 3,
    }
}

define_kind! {
    #[doc = "Feature offered by [`Plan`]s."]
    enum Feature {
        #[doc = "Basic business listing."]
        BasicListing = 1,

        #[doc = "Customer reviews."]
        CustomerReviews = 2,

        #[doc = "Business hours."]
        BusinessHours = 3,

        #[doc = "Contact information."]
        ContactInformation = 4,

        #[doc = "Single location."]
        SingleLocation = 5,

        #[doc = "Priority placement in search results."]
        PriorityPlacement = 6,

        #[doc = "Multiple photos."]
        MultiplePhotos = 7,

        #[doc = "Business analytics."]
        BusinessAnalytics = 8,

        #[doc = "Multiple locations."]
        MultipleLocations = 9,

        #[doc = "Special offers and promotions."]
        SpecialOffers = 10,

        #[doc = "Customer messaging."]
        CustomerMessaging = 11,

        #[doc = "API access."]
        ApiAccess = 12,

        #[doc = "Dedicated support."]
        DedicatedSupport = 13,

        #[doc = "Custom branding."]
        CustomBranding = 14,

        #[doc = "Integration support."]
        IntegrationSupport = 15,
    }
}
