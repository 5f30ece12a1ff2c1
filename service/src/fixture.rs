//! Test fixtures.

use common::DateTime;
use secrecy::SecretBox;

use crate::{
    command::{CreateBusiness, CreateUser, CreateUserSession, EnsureAdmin},
    domain::{
        business::{self, Statistics},
        user::{self, session},
        Business, User,
    },
    infra::Memory,
    policy::Actor,
    Command as _, Config, Service,
};

/// [`user::Password`] used by [`register()`]ed [`User`]s.
pub(crate) const PASSWORD: &str = "secret";

/// Creates a valid [`Business`] with the provided display fields and no
/// [`Statistics`].
pub(crate) fn business(name: &str, category: &str, location: &str) -> Business {
    Business {
        id: business::Id::new(),
        owner_id: user::Id::new(),
        name: business::Name::new(name).unwrap(),
        category: business::Category::new(category).unwrap(),
        description: business::Description::new(format!("{name} in town"))
            .unwrap(),
        location: business::Location::new(location).unwrap(),
        phone: business::Phone::new("(555) 123-4567").unwrap(),
        hours: business::Hours::new("Mon-Fri 9am-5pm").unwrap(),
        image: business::Image::new("https://example.com/image.jpg").unwrap(),
        website: None,
        rating: business::Rating::default(),
        featured: false,
        tags: business::Tags::default(),
        stats: None,
        reviews: vec![],
        created_at: DateTime::now().coerce(),
    }
}

/// Creates a valid [`Business`] with the provided [`Statistics`] counters.
pub(crate) fn business_with_stats(
    name: &str,
    views: u64,
    website_clicks: u64,
    phone_clicks: u64,
) -> Business {
    Business {
        stats: Some(Statistics {
            views,
            website_clicks,
            phone_clicks,
            ctr: business::statistics::ctr(
                website_clicks + phone_clicks,
                views,
            ),
            ..Statistics::default()
        }),
        ..business(name, "Restaurant", "Main St")
    }
}

/// Creates [`business::Tags`] out of the provided strings.
pub(crate) fn tags<const N: usize>(tags: [&str; N]) -> business::Tags {
    business::Tags::new(tags.map(|t| business::Tag::new(t).unwrap())).unwrap()
}

/// Creates a new [`Service`] over an empty [`Memory`] database.
pub(crate) fn service() -> Service<Memory> {
    let (service, _) = Service::new(Config::default(), Memory::new());
    service
}

/// Wraps the provided string into a secret [`user::Password`].
pub(crate) fn password(password: &str) -> SecretBox<user::Password> {
    SecretBox::new(Box::new(user::Password::new(password).unwrap()))
}

/// Registers a new [`User`] with the provided email and [`PASSWORD`].
pub(crate) async fn register(svc: &Service<Memory>, email: &str) -> User {
    svc.execute(CreateUser {
        actor: Actor::Anonymous,
        name: user::Name::new("Joe").unwrap(),
        email: user::Email::new(email).unwrap(),
        password: password(PASSWORD),
    })
    .await
    .unwrap()
}

/// Seeds an admin [`User`].
pub(crate) async fn admin(svc: &Service<Memory>) -> User {
    svc.execute(EnsureAdmin {
        name: user::Name::new("Admin").unwrap(),
        email: user::Email::new("admin@example.com").unwrap(),
        password: password("admin123"),
    })
    .await
    .unwrap()
}

/// Issues a [`session::Token`] for the provided [`User`].
pub(crate) async fn login(
    svc: &Service<Memory>,
    user: &User,
) -> session::Token {
    svc.execute(CreateUserSession::ByUserId(user.id))
        .await
        .unwrap()
        .token
}

/// Returns the [`Actor`] of the provided [`User`].
pub(crate) fn actor(user: &User) -> Actor {
    Actor::User {
        id: user.id,
        role: user.role,
    }
}

/// Creates a valid [`CreateBusiness`] command with the provided name.
pub(crate) fn create_business(actor: Actor, name: &str) -> CreateBusiness {
    CreateBusiness {
        actor,
        name: business::Name::new(name).unwrap(),
        category: business::Category::new("Restaurant").unwrap(),
        description: business::Description::new(format!("{name} in town"))
            .unwrap(),
        location: business::Location::new("Main St").unwrap(),
        phone: business::Phone::new("(555) 123-4567").unwrap(),
        hours: business::Hours::new("Mon-Fri 9am-5pm").unwrap(),
        image: business::Image::new("https://example.com/image.jpg").unwrap(),
        website: None,
        tags: tags(["Family-Friendly"]),
    }
}
