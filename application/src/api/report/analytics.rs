//! [`Analytics`] report definition.

use derive_more::From;
use juniper::{graphql_object, GraphQLEnum, GraphQLObject};
use serde::Deserialize;
use service::{query, read, Query as _};
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// Analytics of `Business`es owned by a single `User`.
#[derive(Clone, Debug, From)]
pub struct Analytics(query::report::analytics::Output);

/// Analytics of `Business`es owned by a single `User`.
#[graphql_object(name = "AnalyticsReport", context = Context)]
impl Analytics {
    /// Mode the totals of this report were aggregated in.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.0.aggregate.mode.into()
    }

    /// Number of `Business`es covered by this report.
    #[must_use]
    pub fn businesses_count(&self) -> i32 {
        scalar::count(self.0.aggregate.businesses)
    }

    /// Total number of views.
    #[must_use]
    pub fn total_views(&self) -> i32 {
        scalar::count(self.0.aggregate.total_views)
    }

    /// Total number of website clicks.
    #[must_use]
    pub fn total_website_clicks(&self) -> i32 {
        scalar::count(self.0.aggregate.total_website_clicks)
    }

    /// Total number of phone clicks.
    #[must_use]
    pub fn total_phone_clicks(&self) -> i32 {
        scalar::count(self.0.aggregate.total_phone_clicks)
    }

    /// Total number of website and phone clicks.
    #[must_use]
    pub fn total_clicks(&self) -> i32 {
        scalar::count(self.0.aggregate.total_clicks())
    }

    /// Click-through rate in percents, as aggregated in the `mode`.
    ///
    /// In `SUMMED` mode it's the sum of per-`Business` rates.
    #[must_use]
    pub fn average_ctr(&self) -> f64 {
        self.0.aggregate.average_ctr
    }

    /// Click-through rate in percents, averaged per `Business`.
    #[must_use]
    pub fn mean_ctr(&self) -> f64 {
        self.0.aggregate.mean_ctr()
    }

    /// Change of views in percents.
    #[must_use]
    pub fn views_change(&self) -> f64 {
        self.0.aggregate.views_change
    }

    /// Change of clicks in percents.
    #[must_use]
    pub fn clicks_change(&self) -> f64 {
        self.0.aggregate.clicks_change
    }

    /// Change of the click-through rate in percents.
    #[must_use]
    pub fn ctr_change(&self) -> f64 {
        self.0.aggregate.ctr_change()
    }

    /// Daily `AnalyticsPoint`s from the oldest to the newest.
    #[must_use]
    pub fn series(&self) -> Vec<Point> {
        self.0.series.iter().copied().map(Point::from).collect()
    }

    /// Per-`Business` rows of this report.
    #[must_use]
    pub fn rows(&self) -> Vec<Row> {
        self.0.rows.iter().cloned().map(Row).collect()
    }

    /// Rows of this report exported as CSV.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "AnalyticsReport.csv",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn csv(&self, ctx: &Context) -> Result<String, Error> {
        self.0
            .to_csv()
            .map_err(|e| Error::internal(&e))
            .map_err(ctx.error())
    }

    /// Suggested file name of the CSV export.
    #[must_use]
    pub fn csv_file_name(&self) -> String {
        self.0.csv_file_name()
    }
}

/// Point of an analytics series.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "AnalyticsPoint")]
pub struct Point {
    /// Date of this point in `YYYY-MM-DD` format.
    pub date: String,

    /// Number of views on the date.
    pub views: f64,

    /// Number of clicks on the date.
    pub clicks: f64,
}

impl From<read::analytics::Point> for Point {
    fn from(p: read::analytics::Point) -> Self {
        Self {
            date: p.date.to_string(),
            views: p.views,
            clicks: p.clicks,
        }
    }
}

/// Per-`Business` row of an [`Analytics`] report.
#[derive(Clone, Debug)]
pub struct Row(read::analytics::Row);

/// Per-`Business` row of an `AnalyticsReport`.
#[graphql_object(name = "AnalyticsRow", context = Context)]
impl Row {
    /// `Business` this row is about.
    #[must_use]
    pub fn business(&self) -> api::Business {
        api::Business::lazy(self.0.business_id)
    }

    /// Name of the `Business`.
    #[must_use]
    pub fn name(&self) -> api::business::Name {
        self.0.name.clone().into()
    }

    /// Number of views.
    #[must_use]
    pub fn views(&self) -> i32 {
        scalar::count(self.0.views)
    }

    /// Number of website clicks.
    #[must_use]
    pub fn website_clicks(&self) -> i32 {
        scalar::count(self.0.website_clicks)
    }

    /// Number of phone clicks.
    #[must_use]
    pub fn phone_clicks(&self) -> i32 {
        scalar::count(self.0.phone_clicks)
    }

    /// Click-through rate in percents.
    #[must_use]
    pub fn ctr(&self) -> f64 {
        self.0.ctr
    }
}

/// Range of days an analytics series covers.
#[derive(Clone, Copy, Debug, Default, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "AnalyticsRange")]
pub enum Range {
    /// Last 7 days.
    Week,

    /// Last 30 days.
    #[default]
    Month,

    /// Last 90 days.
    Quarter,
}

impl From<Range> for read::analytics::Range {
    fn from(range: Range) -> Self {
        match range {
            Range::Week => Self::Week,
            Range::Month => Self::Month,
            Range::Quarter => Self::Quarter,
        }
    }
}

/// Mode of aggregating `BusinessStatistics`.
#[derive(Clone, Copy, Debug, Default, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "AnalyticsMode")]
pub enum Mode {
    /// Per-`Business` rates and changes are summed up.
    #[default]
    Summed,

    /// Rates and changes are averaged with weights of the underlying
    /// counters.
    Weighted,
}

impl From<Mode> for read::analytics::Mode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Summed => Self::Summed,
            Mode::Weighted => Self::Weighted,
        }
    }
}

impl From<read::analytics::Mode> for Mode {
    fn from(mode: read::analytics::Mode) -> Self {
        use read::analytics::Mode as M;
        match mode {
            M::Summed => Self::Summed,
            M::Weighted => Self::Weighted,
        }
    }
}

/// Source of an analytics series.
#[derive(Clone, Copy, Debug, Default, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "AnalyticsSource")]
pub enum Source {
    /// Totals spread evenly across the range.
    #[default]
    Synthetic,

    /// Tracked events bucketed by day.
    Events,
}

impl From<Source> for read::analytics::Source {
    fn from(source: Source) -> Self {
        match source {
            Source::Synthetic => Self::Synthetic,
            Source::Events => Self::Events,
        }
    }
}

/// Query parameters of the analytics CSV export.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportParams {
    /// ID of the single `Business` to export, if any.
    pub business_id: Option<Uuid>,

    /// Range of the exported report.
    pub range: Option<read::analytics::Range>,
}

/// Exports analytics of the `Business`es owned by the authenticated `User`.
///
/// Returns the file name and the CSV content.
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - the request is not authenticated;
/// - `BUSINESS_NOT_EXISTS` - the authenticated `User` doesn't own the
///                           `Business` with the specified ID.
#[tracing::instrument(skip_all, fields(params = ?params))]
pub async fn export(
    ctx: &Context,
    params: ExportParams,
) -> Result<(String, String), Error> {
    let session = ctx.current_session().await?;
    let output = ctx
        .service()
        .execute(query::report::Analytics {
            actor: session.actor(),
            owner_id: session.user_id.into(),
            business_id: params.business_id.map(Into::into),
            range: params.range.unwrap_or(read::analytics::Range::Month),
            mode: read::analytics::Mode::Summed,
            source: read::analytics::Source::Synthetic,
        })
        .await
        .map_err(AsError::into_error)?;
    let csv = output.to_csv().map_err(|e| Error::internal(&e))?;
    Ok((output.csv_file_name(), csv))
}
