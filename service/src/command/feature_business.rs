//! [`Command`] for featuring a [`Business`].

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{business, Business},
    infra::{database, Database},
    policy::{self, Action, Actor},
    Service,
};

use super::Command;

/// [`Command`] for (un)featuring a [`Business`] on the front page.
#[derive(Clone, Copy, Debug)]
pub struct FeatureBusiness {
    /// [`Actor`] performing this [`Command`].
    pub actor: Actor,

    /// ID of the [`Business`] to (un)feature.
    pub business_id: business::Id,

    /// Indicator whether the [`Business`] should be featured.
    pub featured: bool,
}

impl<Db> Command<FeatureBusiness> for Service<Db>
where
    Db: Database<
            Select<By<Option<Business>, business::Id>>,
            Ok = Option<Business>,
            Err = Traced<database::Error>,
        > + Database<
            Update<Business>,
            Ok = bool,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Business;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: FeatureBusiness,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let FeatureBusiness {
            actor,
            business_id,
            featured,
        } = cmd;

        let mut business = self
            .database()
            .execute(Select(By::<Option<Business>, _>::new(business_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BusinessNotExists(business_id))
            .map_err(tracerr::wrap!())?;

        policy::authorize(actor, Action::FeatureBusiness(&business))
            .ensure()
            .map_err(tracerr::from_and_wrap!(=> E))?;

        if business.featured == featured {
            return Ok(business);
        }

        business.featured = featured;
        let updated = self
            .database()
            .execute(Update(business.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !updated {
            return Err(tracerr::new!(E::BusinessNotExists(business_id)));
        }

        Ok(business)
    }
}

/// Error of [`FeatureBusiness`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Business`] doesn't exist.
    #[display("`Business(id: {_0})` does not exist")]
    BusinessNotExists(#[error(not(source))] business::Id),

    /// [`Actor`] is not allowed to feature the [`Business`].
    #[display("Featuring `Business` is forbidden")]
    #[from]
    Forbidden(policy::Forbidden),
}
