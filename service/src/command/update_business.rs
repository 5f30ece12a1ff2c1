//! [`Command`] for updating a [`Business`].

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

/// [`Command`] for partially updating a [`Business`].
///
/// [`None`] fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct UpdateBusiness {
    /// [`Actor`] performing this [`Command`].
    pub actor: Actor,

    /// ID of the [`Business`] to update.
    pub business_id: business::Id,

    /// New [`business::Name`].
    pub name: Option<business::Name>,

    /// New [`business::Category`].
    pub category: Option<business::Category>,

    /// New [`business::Description`].
    pub description: Option<business::Description>,

    /// New [`business::Location`].
    pub location: Option<business::Location>,

    /// New [`business::Phone`].
    pub phone: Option<business::Phone>,

    /// New [`business::Hours`].
    pub hours: Option<business::Hours>,

    /// New [`business::Image`].
    pub image: Option<business::Image>,

    /// New [`business::Website`], where `Some(None)` removes it.
    pub website: Option<Option<business::Website>>,

    /// New [`business::Tags`].
    pub tags: Option<business::Tags>,
}

impl<Db> Command<UpdateBusiness> for Service<Db>
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
        cmd: UpdateBusiness,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateBusiness {
            actor,
            business_id,
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

        let mut business = self
            .database()
            .execute(Select(By::<Option<Business>, _>::new(business_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BusinessNotExists(business_id))
            .map_err(tracerr::wrap!())?;

        policy::authorize(actor, Action::ManageBusiness(&business))
            .ensure()
            .map_err(tracerr::from_and_wrap!(=> E))?;

        if tags.as_ref().is_some_and(business::Tags::is_empty) {
            return Err(tracerr::new!(E::NoTags));
        }

        macro_rules! assign {
            ($($field:ident),*) => {$(
                if let Some(v) = $field {
                    business.$field = v;
                }
            )*};
        }
        assign!(
            name,
            category,
            description,
            location,
            phone,
            hours,
            image,
            website,
            tags
        );

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

/// Error of [`UpdateBusiness`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Business`] doesn't exist.
    #[display("`Business(id: {_0})` does not exist")]
    BusinessNotExists(#[error(not(source))] business::Id),

    /// [`Actor`] is not allowed to update the [`Business`].
    #[display("Updating `Business` is forbidden")]
    #[from]
    Forbidden(policy::Forbidden),

    /// Empty [`business::Tags`] provided.
    #[display("At least one `Tag` is required")]
    NoTags,
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::business::{self, Tags},
        fixture, Command as _,
    };

    use super::{ExecutionError, UpdateBusiness};

    #[tokio::test]
    async fn updates_provided_fields_only() {
        let svc = fixture::service();
        let joe = fixture::register(&svc, "joe@example.com").await;
        let actor = fixture::actor(&joe);
        let b = svc
            .execute(fixture::create_business(actor, "Cafe"))
            .await
            .unwrap();

        let updated = svc
            .execute(UpdateBusiness {
                actor,
                business_id: b.id,
                name: Some(business::Name::new("Bistro").unwrap()),
                website: Some(Some(
                    business::Website::new("https://bistro.example").unwrap(),
                )),
                ..UpdateBusiness::default()
            })
            .await
            .unwrap();
        let cleared = svc
            .execute(UpdateBusiness {
                actor,
                business_id: b.id,
                website: Some(None),
                ..UpdateBusiness::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.name.as_str(), "Bistro");
        assert!(updated.website.is_some());
        assert_eq!(updated.category, b.category);
        assert_eq!(updated.tags, b.tags);
        assert_eq!(cleared.name.as_str(), "Bistro");
        assert_eq!(cleared.website, None);
    }

    #[tokio::test]
    async fn forbids_non_owners() {
        let svc = fixture::service();
        let joe = fixture::register(&svc, "joe@example.com").await;
        let ann = fixture::register(&svc, "ann@example.com").await;
        let b = svc
            .execute(fixture::create_business(fixture::actor(&joe), "Cafe"))
            .await
            .unwrap();

        let err = svc
            .execute(UpdateBusiness {
                actor: fixture::actor(&ann),
                business_id: b.id,
                ..UpdateBusiness::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Forbidden(_)), "{err}");
    }

    #[tokio::test]
    async fn rejects_empty_tags() {
        let svc = fixture::service();
        let joe = fixture::register(&svc, "joe@example.com").await;
        let b = svc
            .execute(fixture::create_business(fixture::actor(&joe), "Cafe"))
            .await
            .unwrap();

        let err = svc
            .execute(UpdateBusiness {
                actor: fixture::actor(&joe),
                business_id: b.id,
                tags: Some(Tags::default()),
                ..UpdateBusiness::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NoTags), "{err}");
    }
}
