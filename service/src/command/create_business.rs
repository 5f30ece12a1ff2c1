//! [`Command`] for creating a new [`Business`].

use common::{operations::Insert, DateTime};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        business::{self, Rating, Statistics},
        Business,
    },
    infra::{database, Database},
    policy::{self, Action, Actor},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Business`] owned by the [`Actor`].
///
/// A new [`Business`] starts with zeroed [`Statistics`], a zero [`Rating`],
/// no reviews and isn't featured.
#[derive(Clone, Debug)]
pub struct CreateBusiness {
    /// [`Actor`] performing this [`Command`].
    pub actor: Actor,

    /// [`business::Name`] of a new [`Business`].
    pub name: business::Name,

    /// [`business::Category`] of a new [`Business`].
    pub category: business::Category,

    /// [`business::Description`] of a new [`Business`].
    pub description: business::Description,

    /// [`business::Location`] of a new [`Business`].
    pub location: business::Location,

    /// [`business::Phone`] of a new [`Business`].
    pub phone: business::Phone,

    /// [`business::Hours`] of a new [`Business`].
    pub hours: business::Hours,

    /// [`business::Image`] of a new [`Business`].
    pub image: business::Image,

    /// [`business::Website`] of a new [`Business`], if any.
    pub website: Option<business::Website>,

    /// [`business::Tags`] of a new [`Business`].
    pub tags: business::Tags,
}

impl<Db> Command<CreateBusiness> for Service<Db>
where
    Db: Database<Insert<Business>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Business;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateBusiness,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateBusiness {
            actor,
            name,
            category,
            description,
            location,
            phone,
            hours,
            image,
            website,
            tags,
        } = cmd;

        policy::authorize(actor, Action::CreateBusiness)
            .ensure()
            .map_err(tracerr::from_and_wrap!(=> E))?;
        let owner_id = actor
            .user_id()
            .ok_or(E::NoOwner)
            .map_err(tracerr::wrap!())?;

        if tags.is_empty() {
            return Err(tracerr::new!(E::NoTags));
        }

        let business = Business {
            id: business::Id::new(),
            owner_id,
            name,
            category,
            description,
            location,
            phone,
            hours,
            image,
            website,
            rating: Rating::default(),
            featured: false,
            tags,
            stats: Some(Statistics::default()),
            reviews: vec![],
            created_at: DateTime::now().coerce(),
        };
        self.database()
            .execute(Insert(business.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(business)
    }
}

/// Error of [`CreateBusiness`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Actor`] is not allowed to create a [`Business`].
    #[display("Creating `Business` is forbidden")]
    #[from]
    Forbidden(policy::Forbidden),

    /// [`Actor`] is not a [`User`] able to own a [`Business`].
    ///
    /// [`User`]: crate::domain::User
    #[display("`Business` must be owned by a `User`")]
    NoOwner,

    /// No [`business::Tag`]s provided.
    #[display("At least one `Tag` is required")]
    NoTags,
}
