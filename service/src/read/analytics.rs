//! Analytics over [`Business`]es owned by a single [`User`].
//!
//! [`User`]: crate::domain::User

use common::{define_kind, Date};
use itertools::Itertools as _;
use rust_decimal::{
    prelude::{FromPrimitive as _, ToPrimitive as _},
    Decimal,
};

use crate::domain::{
    business::{self, statistics::ctr, Statistics},
    Business, Event,
};

define_kind! {
    #[doc = "Mode of [`Aggregate`]ing [`Statistics`]."]
    enum Mode {
        #[doc = "Per-[`Business`] rates and changes are summed up, so the \
                 caller divides them by [`Aggregate::businesses`] if needed."]
        Summed = 1,

        #[doc = "Rates and changes are averaged with weights of the \
                 underlying counters."]
        Weighted = 2,
    }
}

define_kind! {
    #[doc = "Range of days an analytics [`Point`] series covers."]
    enum Range {
        #[doc = "Last 7 days."]
        Week = 7,

        #[doc = "Last 30 days."]
        Month = 30,

        #[doc = "Last 90 days."]
        Quarter = 90,
    }
}

impl Range {
    /// Returns the number of days in this [`Range`].
    #[must_use]
    pub const fn days(self) -> u8 {
        self.u8()
    }

    /// Returns the dates of this [`Range`] ending at `today`, from the oldest
    /// to the newest.
    pub fn dates(self, today: Date) -> impl Iterator<Item = Date> {
        (0..i64::from(self.days()))
            .rev()
            .map(move |ago| today.saturating_sub(time::Duration::days(ago)))
    }

    /// Returns the first date of this [`Range`] ending at `today`.
    #[must_use]
    pub fn first_date(self, today: Date) -> Date {
        today.saturating_sub(time::Duration::days(i64::from(self.days()) - 1))
    }
}

define_kind! {
    #[doc = "Source of an analytics [`Point`] series."]
    enum Source {
        #[doc = "Aggregate counters spread evenly across the [`Range`]."]
        Synthetic = 1,

        #[doc = "Tracked [`Event`]s bucketed by day."]
        Events = 2,
    }
}

/// Aggregated [`Statistics`] of multiple [`Business`]es.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aggregate {
    /// [`Mode`] this [`Aggregate`] was computed in.
    pub mode: Mode,

    /// Number of aggregated [`Business`]es.
    pub businesses: usize,

    /// Sum of views.
    pub total_views: u64,

    /// Sum of website clicks.
    pub total_website_clicks: u64,

    /// Sum of phone clicks.
    pub total_phone_clicks: u64,

    /// Click-through rate in percents.
    ///
    /// In [`Mode::Summed`] it's the sum of per-[`Business`] rates.
    pub average_ctr: f64,

    /// Change of views in percents.
    ///
    /// In [`Mode::Summed`] it's the sum of per-[`Business`] changes.
    pub views_change: f64,

    /// Change of clicks in percents.
    ///
    /// In [`Mode::Summed`] it's the sum of per-[`Business`] means of website
    /// and phone clicks changes.
    pub clicks_change: f64,
}

impl Aggregate {
    /// Returns the sum of website and phone clicks.
    #[must_use]
    pub fn total_clicks(&self) -> u64 {
        self.total_website_clicks
            .saturating_add(self.total_phone_clicks)
    }

    /// Returns the click-through rate averaged per [`Business`].
    ///
    /// No [`Business`]es result in a zero rate.
    #[must_use]
    pub fn mean_ctr(&self) -> f64 {
        match self.mode {
            Mode::Weighted => self.average_ctr,
            Mode::Summed => {
                if self.businesses == 0 {
                    return 0.0;
                }
                #[expect(
                    clippy::cast_precision_loss,
                    reason = "counts are far below 2^52"
                )]
                let count = self.businesses as f64;
                self.average_ctr / count
            }
        }
    }

    /// Returns the change of the click-through rate in percents, estimated as
    /// the difference between clicks and views changes.
    #[must_use]
    pub fn ctr_change(&self) -> f64 {
        self.clicks_change - self.views_change
    }
}

/// Aggregates [`Statistics`] of the provided [`Business`]es in a single pass.
///
/// [`Business`]es without [`Statistics`] contribute zeros. Non-finite rates
/// and changes are treated as zeros too. The result doesn't depend on the
/// order of [`Business`]es.
pub fn aggregate<'b>(
    businesses: impl IntoIterator<Item = &'b Business>,
    mode: Mode,
) -> Aggregate {
    businesses
        .into_iter()
        .map(Business::stats_or_default)
        .fold(Accumulator::default(), Accumulator::add)
        .finish(mode)
}

/// Running sums of [`aggregate()`].
///
/// Fractional sums are kept in [`Decimal`]s, whose addition is associative,
/// unlike the floating-point one.
#[derive(Clone, Copy, Debug, Default)]
struct Accumulator {
    /// Number of accumulated [`Statistics`].
    count: usize,

    /// Sum of views.
    views: u64,

    /// Sum of website clicks.
    website_clicks: u64,

    /// Sum of phone clicks.
    phone_clicks: u64,

    /// Sum of click-through rates.
    ctr: Decimal,

    /// Sum of views changes.
    views_change: Decimal,

    /// Sum of means of website and phone clicks changes.
    clicks_change: Decimal,

    /// Sum of views changes weighted by views.
    weighted_views_change: Decimal,

    /// Sum of clicks changes weighted by the corresponding clicks.
    weighted_clicks_change: Decimal,
}

impl Accumulator {
    /// Adds the provided [`Statistics`] to this [`Accumulator`].
    fn add(self, s: Statistics) -> Self {
        let website_change = decimal(s.website_clicks_change);
        let phone_change = decimal(s.phone_clicks_change);
        let clicks_change = website_change
            .saturating_add(phone_change)
            .checked_div(Decimal::TWO)
            .unwrap_or_default();
        let weighted_clicks_change = website_change
            .saturating_mul(Decimal::from(s.website_clicks))
            .saturating_add(
                phone_change.saturating_mul(Decimal::from(s.phone_clicks)),
            );

        Self {
            count: self.count.saturating_add(1),
            views: self.views.saturating_add(s.views),
            website_clicks: self
                .website_clicks
                .saturating_add(s.website_clicks),
            phone_clicks: self.phone_clicks.saturating_add(s.phone_clicks),
            ctr: self.ctr.saturating_add(decimal(s.ctr)),
            views_change: self
                .views_change
                .saturating_add(decimal(s.views_change)),
            clicks_change: self.clicks_change.saturating_add(clicks_change),
            weighted_views_change: self.weighted_views_change.saturating_add(
                decimal(s.views_change).saturating_mul(Decimal::from(s.views)),
            ),
            weighted_clicks_change: self
                .weighted_clicks_change
                .saturating_add(weighted_clicks_change),
        }
    }

    /// Finishes the aggregation in the provided [`Mode`].
    fn finish(self, mode: Mode) -> Aggregate {
        let clicks = self.website_clicks.saturating_add(self.phone_clicks);
        let (average_ctr, views_change, clicks_change) = match mode {
            Mode::Summed => (
                float(self.ctr),
                float(self.views_change),
                float(self.clicks_change),
            ),
            Mode::Weighted => (
                ctr(clicks, self.views),
                weighted_mean(self.weighted_views_change, self.views),
                weighted_mean(self.weighted_clicks_change, clicks),
            ),
        };

        Aggregate {
            mode,
            businesses: self.count,
            total_views: self.views,
            total_website_clicks: self.website_clicks,
            total_phone_clicks: self.phone_clicks,
            average_ctr,
            views_change,
            clicks_change,
        }
    }
}

/// Converts the provided [`f64`] into a [`Decimal`], mapping non-finite and
/// out-of-range values to zero.
fn decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Converts the provided [`Decimal`] into a [`f64`].
fn float(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Divides the weighted `sum` by the total `weight`, yielding zero for a zero
/// weight.
fn weighted_mean(sum: Decimal, weight: u64) -> f64 {
    if weight == 0 {
        return 0.0;
    }
    float(sum.checked_div(Decimal::from(weight)).unwrap_or_default())
}

/// Point of an analytics series.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    /// [`Date`] of this [`Point`].
    pub date: Date,

    /// Number of views on the [`Date`].
    pub views: f64,

    /// Number of clicks on the [`Date`].
    pub clicks: f64,
}

/// Builds a [`Point`] series by spreading total counters of the provided
/// [`Business`]es evenly across the [`Range`] ending at `today`.
///
/// There is no per-day history behind it, so every [`Point`] has the same
/// values.
pub fn synthetic<'b>(
    businesses: impl IntoIterator<Item = &'b Business>,
    range: Range,
    today: Date,
) -> Vec<Point> {
    let (views, clicks) = businesses
        .into_iter()
        .map(Business::stats_or_default)
        .fold((0_u64, 0_u64), |(views, clicks), s| {
            (views.saturating_add(s.views), clicks.saturating_add(s.clicks()))
        });
    let days = f64::from(range.days());
    #[expect(
        clippy::cast_precision_loss,
        reason = "counters are far below 2^52"
    )]
    let (views, clicks) = (views as f64 / days, clicks as f64 / days);

    range
        .dates(today)
        .map(|date| Point {
            date,
            views,
            clicks,
        })
        .collect()
}

/// Builds a [`Point`] series by bucketing the provided [`Event`]s by their
/// UTC date within the [`Range`] ending at `today`.
///
/// [`Event`]s outside the [`Range`] are ignored.
pub fn bucketed<'e>(
    events: impl IntoIterator<Item = &'e Event>,
    range: Range,
    today: Date,
) -> Vec<Point> {
    let counts = events
        .into_iter()
        .map(|e| (e.occurred_at.date(), e.kind.is_click()))
        .counts();
    #[expect(
        clippy::cast_precision_loss,
        reason = "counters are far below 2^52"
    )]
    let count = |date: Date, is_click: bool| {
        counts.get(&(date, is_click)).copied().unwrap_or_default() as f64
    };

    range
        .dates(today)
        .map(|date| Point {
            date,
            views: count(date, false),
            clicks: count(date, true),
        })
        .collect()
}

/// Per-[`Business`] row of an analytics report.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    /// ID of the [`Business`].
    pub business_id: business::Id,

    /// [`business::Name`] of the [`Business`].
    pub name: business::Name,

    /// Number of views.
    pub views: u64,

    /// Number of website clicks.
    pub website_clicks: u64,

    /// Number of phone clicks.
    pub phone_clicks: u64,

    /// Click-through rate in percents.
    pub ctr: f64,
}

impl From<&Business> for Row {
    fn from(b: &Business) -> Self {
        let s = b.stats_or_default();
        Self {
            business_id: b.id,
            name: b.name.clone(),
            views: s.views,
            website_clicks: s.website_clicks,
            phone_clicks: s.phone_clicks,
            ctr: s.ctr,
        }
    }
}

/// Exports the provided [`Row`]s as CSV with a header.
///
/// # Errors
///
/// If the CSV writer fails, which never happens for an in-memory buffer in
/// practice.
pub fn to_csv(rows: &[Row]) -> Result<String, csv::Error> {
    let mut w = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![]);
    w.write_record([
        "Business Name",
        "Views",
        "Website Clicks",
        "Phone Clicks",
        "CTR",
    ])?;
    for r in rows {
        w.write_record([
            r.name.to_string(),
            r.views.to_string(),
            r.website_clicks.to_string(),
            r.phone_clicks.to_string(),
            format!("{:.2}%", r.ctr),
        ])?;
    }
    let bytes = w.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Returns the file name of a CSV export made on the provided [`Date`].
#[must_use]
pub fn csv_file_name(date: Date) -> String {
    format!("analytics-{date}.csv")
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use time::macros::date;

    use crate::{
        domain::{business::Statistics, event, Business, Event},
        fixture,
    };

    use super::{
        aggregate, bucketed, csv_file_name, synthetic, to_csv, Mode, Range,
        Row,
    };

    fn with_changes(
        mut b: Business,
        views: f64,
        website: f64,
        phone: f64,
    ) -> Business {
        let stats = b.stats.get_or_insert_with(Statistics::default);
        stats.views_change = views;
        stats.website_clicks_change = website;
        stats.phone_clicks_change = phone;
        b
    }

    #[test]
    fn empty_list_is_all_zero() {
        for mode in [Mode::Summed, Mode::Weighted] {
            let a = aggregate(&Vec::<Business>::new(), mode);

            assert_eq!(a.businesses, 0);
            assert_eq!(a.total_views, 0);
            assert_eq!(a.total_website_clicks, 0);
            assert_eq!(a.total_phone_clicks, 0);
            assert_eq!(a.average_ctr, 0.0);
            assert_eq!(a.views_change, 0.0);
            assert_eq!(a.clicks_change, 0.0);
            assert_eq!(a.mean_ctr(), 0.0);
        }
    }

    #[test]
    fn sums_counters() {
        let all = [
            fixture::business_with_stats("A", 100, 10, 5),
            fixture::business_with_stats("B", 50, 0, 0),
        ];

        let a = aggregate(&all, Mode::Summed);

        assert_eq!(a.total_views, 150);
        assert_eq!(a.total_website_clicks, 10);
        assert_eq!(a.total_phone_clicks, 5);
        assert_eq!(a.total_clicks(), 15);
    }

    #[test]
    fn absent_stats_contribute_zero() {
        let all = [
            fixture::business("No stats", "Cafe", "Main St"),
            fixture::business_with_stats("A", 100, 10, 5),
        ];

        let a = aggregate(&all, Mode::Summed);

        assert_eq!(a.businesses, 2);
        assert_eq!(a.total_views, 100);
        assert_eq!(a.average_ctr, 15.0);
        assert_eq!(a.mean_ctr(), 7.5);
    }

    #[test]
    fn summed_mode_sums_rates_and_changes() {
        let all = [
            with_changes(
                fixture::business_with_stats("A", 100, 10, 10),
                10.0,
                4.0,
                2.0,
            ),
            with_changes(
                fixture::business_with_stats("B", 10, 1, 0),
                -5.0,
                1.0,
                -3.0,
            ),
        ];

        let a = aggregate(&all, Mode::Summed);

        assert_eq!(a.average_ctr, 30.0);
        assert_eq!(a.views_change, 5.0);
        assert_eq!(a.clicks_change, 2.0);
        assert_eq!(a.mean_ctr(), 15.0);
        assert_eq!(a.ctr_change(), -3.0);
    }

    #[test]
    fn weighted_mode_averages_by_counters() {
        let all = [
            with_changes(
                fixture::business_with_stats("A", 90, 9, 0),
                10.0,
                20.0,
                0.0,
            ),
            with_changes(
                fixture::business_with_stats("B", 10, 0, 1),
                -10.0,
                0.0,
                -20.0,
            ),
        ];

        let a = aggregate(&all, Mode::Weighted);

        assert_eq!(a.average_ctr, 10.0);
        assert_eq!(a.mean_ctr(), 10.0);
        assert_eq!(a.views_change, 8.0);
        assert_eq!(a.clicks_change, 16.0);
    }

    #[test]
    fn weighted_mode_guards_zero_weights() {
        let all = [with_changes(
            fixture::business_with_stats("A", 0, 0, 0),
            50.0,
            50.0,
            50.0,
        )];

        let a = aggregate(&all, Mode::Weighted);

        assert_eq!(a.average_ctr, 0.0);
        assert_eq!(a.views_change, 0.0);
        assert_eq!(a.clicks_change, 0.0);
    }

    #[test]
    fn non_finite_values_count_as_zero() {
        let mut b = fixture::business_with_stats("A", 10, 1, 0);
        if let Some(s) = b.stats.as_mut() {
            s.ctr = f64::NAN;
            s.views_change = f64::INFINITY;
        }

        let a = aggregate(&[b], Mode::Summed);

        assert_eq!(a.average_ctr, 0.0);
        assert_eq!(a.views_change, 0.0);
    }

    #[test]
    fn order_independent() {
        let mut all = (1..=20_u32)
            .map(|i| {
                with_changes(
                    fixture::business_with_stats(
                        &format!("B{i}"),
                        u64::from(i * 7),
                        u64::from(i % 3),
                        u64::from(i % 5),
                    ),
                    0.1 * f64::from(i),
                    0.3 / f64::from(i),
                    -0.7 * f64::from(i),
                )
            })
            .collect::<Vec<_>>();

        for mode in [Mode::Summed, Mode::Weighted] {
            let forward = aggregate(&all, mode);
            all.reverse();
            let backward = aggregate(&all, mode);
            all.swap(3, 11);
            let shuffled = aggregate(&all, mode);

            assert_eq!(forward, backward, "{mode}");
            assert_eq!(forward, shuffled, "{mode}");
        }
    }

    #[test]
    fn synthetic_series_spreads_totals() {
        let all = [
            fixture::business_with_stats("A", 100, 10, 4),
            fixture::business_with_stats("B", 40, 0, 0),
            fixture::business("C", "Cafe", "Main St"),
        ];
        let today = date!(2024 - 03 - 01);

        let points = synthetic(&all, Range::Week, today);

        assert_eq!(points.len(), 7);
        assert_eq!(points[6].date, today);
        assert_eq!(points[0].date, date!(2024 - 02 - 24));
        for p in &points {
            assert_eq!(p.views, 20.0);
            assert_eq!(p.clicks, 2.0);
        }
        assert!(points.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn synthetic_series_lengths() {
        let today = date!(2024 - 01 - 15);

        for (range, days) in
            [(Range::Week, 7), (Range::Month, 30), (Range::Quarter, 90)]
        {
            let points = synthetic(&Vec::<Business>::new(), range, today);

            assert_eq!(points.len(), days);
            assert_eq!(points.last().map(|p| p.date), Some(today));
            assert_eq!(
                points.first().map(|p| p.date),
                Some(range.first_date(today)),
            );
            assert!(points.iter().all(|p| p.views == 0.0 && p.clicks == 0.0));
        }
    }

    #[test]
    fn bucketed_series_counts_events_per_day() {
        let b = fixture::business("A", "Cafe", "Main St");
        let at = |s: &str, kind| Event {
            business_id: b.id,
            kind,
            occurred_at: DateTime::from_rfc3339(s).unwrap().coerce(),
        };
        let events = [
            at("2024-03-01T10:00:00Z", event::Kind::View),
            at("2024-03-01T23:59:59Z", event::Kind::View),
            at("2024-03-01T12:00:00Z", event::Kind::PhoneClick),
            at("2024-02-28T08:00:00Z", event::Kind::WebsiteClick),
            at("2024-02-20T08:00:00Z", event::Kind::View),
        ];

        let points = bucketed(&events, Range::Week, date!(2024 - 03 - 01));

        assert_eq!(points.len(), 7);
        assert_eq!(points[6].date, date!(2024 - 03 - 01));
        assert_eq!((points[6].views, points[6].clicks), (2.0, 1.0));
        assert_eq!(points[4].date, date!(2024 - 02 - 28));
        assert_eq!((points[4].views, points[4].clicks), (0.0, 1.0));
        let total = points.iter().map(|p| p.views + p.clicks).sum::<f64>();
        assert_eq!(total, 4.0);
    }

    #[test]
    fn csv_export() {
        let a = fixture::business_with_stats("Bar, Grill", 3, 1, 0);
        let b = fixture::business("Empty", "Cafe", "Main St");

        let csv = to_csv(&[Row::from(&a), Row::from(&b)]).unwrap();

        assert_eq!(
            csv,
            "Business Name,Views,Website Clicks,Phone Clicks,CTR\n\
             \"Bar, Grill\",3,1,0,33.33%\n\
             Empty,0,0,0,0.00%\n",
        );
        assert_eq!(
            csv_file_name(date!(2024 - 03 - 01)),
            "analytics-2024-03-01.csv",
        );
    }
}
