//! [`Event`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use serde::{Deserialize, Serialize};

use crate::domain::business;
#[cfg(doc)]
use crate::domain::Business;

/// Tracked engagement with a [`Business`].
///
/// [`Event`]s form an append-only log, which analytics bucket by day.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Event {
    /// ID of the [`Business`] this [`Event`] relates to.
    pub business_id: business::Id,

    /// [`Kind`] of this [`Event`].
    pub kind: Kind,

    /// [`DateTime`] when this [`Event`] occurred.
    pub occurred_at: OccurrenceDateTime,
}

define_kind! {
    #[doc = "Kind of an [`Event`]."]
    enum Kind {
        #[doc = "[`Business`] listing has been viewed."]
        View = 1,

        #[doc = "[`Business`] website link has been clicked."]
        WebsiteClick = 2,

        #[doc = "[`Business`] phone number has been clicked."]
        PhoneClick = 3,
    }
}

impl Kind {
    /// Indicates whether this [`Kind`] is a click.
    #[must_use]
    pub const fn is_click(self) -> bool {
        matches!(self, Self::WebsiteClick | Self::PhoneClick)
    }
}

/// Selector of [`Event`]s.
#[derive(Clone, Debug)]
pub struct Selector {
    /// IDs of [`Business`]es to select [`Event`]s of.
    pub business_ids: Vec<business::Id>,

    /// [`DateTime`] since which (inclusively) to select [`Event`]s.
    pub since: OccurrenceDateTime,
}

/// Selector of [`Event`]s occurred strictly before the inner [`DateTime`].
#[derive(Clone, Copy, Debug)]
pub struct OccurredBefore(pub OccurrenceDateTime);

/// [`DateTime`] when an [`Event`] occurred.
pub type OccurrenceDateTime = DateTimeOf<(Event, unit::Occurrence)>;
