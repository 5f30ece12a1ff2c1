//! [`Change`] definitions.

use common::define_kind;

use crate::domain::business;
#[cfg(doc)]
use crate::domain::Business;

/// Notification about a [`Business`] being changed in a storage.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Change {
    /// [`Kind`] of this [`Change`].
    pub kind: Kind,

    /// ID of the changed [`Business`].
    pub business_id: business::Id,
}

define_kind! {
    #[doc = "Kind of a [`Change`]."]
    enum Kind {
        #[doc = "[`Business`] has been created."]
        Created = 1,

        #[doc = "[`Business`] has been updated."]
        Updated = 2,

        #[doc = "[`Business`] has been deleted."]
        Deleted = 3,
    }
}
