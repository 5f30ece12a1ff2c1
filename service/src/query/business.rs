//! [`Query`] collection related to a single [`Business`].

use common::operations::By;

use crate::domain::{business, Business};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Business`] by its [`business::Id`].
pub type ById = DatabaseQuery<By<Option<Business>, business::Id>>;
