//! [`Statistics`] definitions.

use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::Business;
use crate::domain::event;

/// Engagement statistics of a [`Business`].
///
/// Period-over-period `*_change` fields are percentages simulating
/// comparison to a prior time window, they aren't derived from any stored
/// history.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Statistics {
    /// Number of times the [`Business`] has been viewed.
    pub views: u64,

    /// Number of clicks on the [`Business`] website link.
    pub website_clicks: u64,

    /// Number of clicks on the [`Business`] phone number.
    pub phone_clicks: u64,

    /// Click-through rate in percents, see [`ctr()`].
    pub ctr: f64,

    /// Change of `views` in percents.
    pub views_change: f64,

    /// Change of `website_clicks` in percents.
    pub website_clicks_change: f64,

    /// Change of `phone_clicks` in percents.
    pub phone_clicks_change: f64,

    /// Change of `ctr` in percents.
    pub ctr_change: f64,
}

impl Statistics {
    /// Returns the total number of clicks (website and phone ones).
    #[must_use]
    pub fn clicks(&self) -> u64 {
        self.website_clicks.saturating_add(self.phone_clicks)
    }

    /// Records a tracked [`event::Kind`] and recalculates the `ctr`.
    pub fn record(&mut self, kind: event::Kind) {
        let counter = match kind {
            event::Kind::View => &mut self.views,
            event::Kind::WebsiteClick => &mut self.website_clicks,
            event::Kind::PhoneClick => &mut self.phone_clicks,
        };
        *counter = counter.saturating_add(1);
        self.ctr = ctr(self.clicks(), self.views);
    }
}

/// Calculates a click-through rate in percents.
///
/// Zero `views` result in a zero rate, so the result is always finite.
#[must_use]
pub fn ctr(clicks: u64, views: u64) -> f64 {
    if views == 0 {
        return 0.0;
    }
    #[expect(
        clippy::cast_precision_loss,
        reason = "counters are far below 2^52"
    )]
    let (clicks, views) = (clicks as f64, views as f64);
    clicks / views * 100.0
}

#[cfg(test)]
mod spec {
    use crate::domain::event;

    use super::{ctr, Statistics};

    #[test]
    fn ctr_of_zero_views_is_zero() {
        assert_eq!(ctr(0, 0), 0.0);
        assert_eq!(ctr(15, 0), 0.0);
        assert!(ctr(0, 0).is_finite());
    }

    #[test]
    fn ctr_is_percentage() {
        assert_eq!(ctr(15, 100), 15.0);
        assert_eq!(ctr(1, 4), 25.0);
        assert_eq!(ctr(0, 50), 0.0);
    }

    #[test]
    fn recording_updates_counters_and_ctr() {
        let mut stats = Statistics::default();

        stats.record(event::Kind::WebsiteClick);
        assert_eq!(stats.website_clicks, 1);
        assert_eq!(stats.ctr, 0.0);

        stats.record(event::Kind::View);
        stats.record(event::Kind::View);
        stats.record(event::Kind::PhoneClick);

        assert_eq!(stats.views, 2);
        assert_eq!(stats.phone_clicks, 1);
        assert_eq!(stats.clicks(), 2);
        assert_eq!(stats.ctr, 100.0);
    }
}
