//! In-process [`Database`] implementation.

mod impls;

use std::{io, path::PathBuf, sync::Arc};

use derive_more::{Display, Error as StdError, From};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock, RwLockReadGuard};
use tracerr::Traced;

use crate::{
    domain::{business::Change, Business, Event, User},
    infra::database,
};
#[cfg(doc)]
use crate::infra::Database;

/// Capacity of the [`Change`]s channel, after which slow subscribers start
/// lagging.
const CHANGES_CAPACITY: usize = 256;

/// In-process key-value [`Database`].
///
/// Collections are kept in their insertion order, and the last write wins.
/// Optionally, the whole state is mirrored into a JSON snapshot file, which
/// is rewritten after each mutation.
#[derive(Clone, Debug)]
pub struct Memory(Arc<Inner>);

/// Shared inner state of a [`Memory`] database.
#[derive(Debug)]
struct Inner {
    /// Stored collections.
    state: RwLock<State>,

    /// Sender of [`Change`] notifications.
    changes: broadcast::Sender<Change>,

    /// Path to the JSON snapshot file, if any.
    snapshot: Option<PathBuf>,
}

/// Stored collections of a [`Memory`] database.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
struct State {
    /// Stored [`User`]s.
    users: Vec<User>,

    /// Stored [`Business`]es.
    businesses: Vec<Business>,

    /// Stored [`Event`]s.
    events: Vec<Event>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    /// Creates a new empty [`Memory`] database without a snapshot file.
    #[must_use]
    pub fn new() -> Self {
        Self::with_state(State::default(), None)
    }

    /// Opens a [`Memory`] database mirrored into the snapshot file at the
    /// provided `path`, loading the file if it exists.
    ///
    /// # Errors
    ///
    /// If the existing snapshot file cannot be read or parsed.
    pub async fn open(
        path: impl Into<PathBuf>,
    ) -> Result<Self, Traced<database::Error>> {
        let path = path.into();
        let state = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(tracerr::from_and_wrap!(=> Error))
                .map_err(tracerr::map_from)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => State::default(),
            Err(e) => {
                return Err(tracerr::map_from(tracerr::new!(Error::from(e))));
            }
        };
        Ok(Self::with_state(state, Some(path)))
    }

    /// Creates a new [`Memory`] database out of the provided [`State`].
    fn with_state(state: State, snapshot: Option<PathBuf>) -> Self {
        let (changes, _) = broadcast::channel(CHANGES_CAPACITY);
        Self(Arc::new(Inner {
            state: RwLock::new(state),
            changes,
            snapshot,
        }))
    }

    /// Locks the [`State`] for reading.
    async fn read(&self) -> RwLockReadGuard<'_, State> {
        self.0.state.read().await
    }

    /// Applies the provided mutation to the [`State`] and rewrites the
    /// snapshot file, if any.
    ///
    /// With a snapshot file, the mutation is applied to a copy of the
    /// [`State`], which replaces it only once the file is written. The write
    /// lock is held until then, so snapshots are never reordered.
    async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut State) -> T,
    ) -> Result<T, Traced<database::Error>> {
        let mut state = self.0.state.write().await;
        let Some(path) = &self.0.snapshot else {
            return Ok(f(&mut state));
        };

        let mut next = state.clone();
        let out = f(&mut next);
        let json = serde_json::to_vec(&next)
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        tokio::fs::write(path, json)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;

        *state = next;
        Ok(out)
    }

    /// Publishes the provided [`Change`] to the current subscribers.
    fn publish(&self, change: Change) {
        // No subscribers is not an error.
        _ = self.0.changes.send(change);
    }
}

/// [`Memory`] database error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Snapshot file I/O error.
    #[display("Snapshot I/O failed: {_0}")]
    Io(io::Error),

    /// Snapshot (de)serialization error.
    #[display("Snapshot (de)serialization failed: {_0}")]
    Json(serde_json::Error),
}
