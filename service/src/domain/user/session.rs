//! [`Session`] definitions.

use base64::Engine as _;
#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, Error, From, FromStr};
use serde::{Deserialize, Serialize};

use crate::domain::user;
#[cfg(doc)]
use crate::domain::User;

/// User session.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Session {
    /// ID of the [`User`] this [`Session`] belongs to.
    #[serde(rename = "userId")]
    pub user_id: user::Id,

    /// [`user::Role`] of the [`User`] at the moment of [`Session`] creation.
    pub role: user::Role,

    /// [`DateTime`] when this [`Session`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

impl Session {
    /// Indicates whether this [`Session`] is expired at the provided moment.
    #[must_use]
    pub fn is_expired_at(&self, now: ExpirationDateTime) -> bool {
        self.expires_at <= now
    }
}

/// Access token of a [`Session`].
///
/// It's a Base64-encoded JSON of a [`Session`] and isn't signed in any way,
/// so it must never be trusted for anything beyond a demo.
#[derive(AsRef, Clone, Debug, Display, Eq, FromStr, PartialEq)]
#[as_ref(str)]
pub struct Token(String);

impl Token {
    /// Encodes the provided [`Session`] into a [`Token`].
    ///
    /// # Errors
    ///
    /// If the [`Session`] cannot be serialized.
    pub fn encode(session: &Session) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_vec(session)?;
        Ok(Self(base64::engine::general_purpose::STANDARD.encode(json)))
    }

    /// Decodes the [`Session`] out of this [`Token`].
    ///
    /// Expiration is not checked here.
    ///
    /// # Errors
    ///
    /// If this [`Token`] is not a valid Base64-encoded JSON of a [`Session`].
    pub fn decode(&self) -> Result<Session, DecodeError> {
        let json = base64::engine::general_purpose::STANDARD.decode(&self.0)?;
        Ok(serde_json::from_slice(&json)?)
    }
}

/// Error of [`Token::decode()`].
#[derive(Debug, Display, Error, From)]
pub enum DecodeError {
    /// [`Token`] is not a valid Base64.
    #[display("`Token` is not a valid Base64: {_0}")]
    Base64(base64::DecodeError),

    /// [`Token`] doesn't contain a valid [`Session`] JSON.
    #[display("`Token` doesn't contain a valid `Session`: {_0}")]
    Json(serde_json::Error),
}

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use crate::domain::user;

    use super::{ExpirationDateTime, Session, Token};

    fn session() -> Session {
        Session {
            user_id: user::Id::new(),
            role: user::Role::Admin,
            expires_at: ExpirationDateTime::from_unix_timestamp(1_700_000_000)
                .unwrap(),
        }
    }

    #[test]
    fn token_carries_session() {
        let session = session();

        let token = Token::encode(&session).unwrap();

        assert_eq!(token.decode().unwrap(), session);
    }

    #[test]
    fn token_is_base64_json() {
        let session = session();
        let token = Token::encode(&session).unwrap();

        let json = String::from_utf8(
            base64::Engine::decode(
                &base64::engine::general_purpose::STANDARD,
                token.to_string(),
            )
            .unwrap(),
        )
        .unwrap();

        assert!(json.contains(&format!("\"userId\":\"{}\"", session.user_id)));
        assert!(json.contains("\"role\":\"ADMIN\""));
        assert!(json.contains("\"exp\":1700000000"));
    }

    #[test]
    fn rejects_garbage() {
        assert!("not base64!".parse::<Token>().unwrap().decode().is_err());
        assert!("e30=".parse::<Token>().unwrap().decode().is_err());
    }

    #[test]
    fn expiration() {
        let session = session();

        assert!(!session.is_expired_at(
            session.expires_at - Duration::from_secs(1),
        ));
        assert!(session.is_expired_at(session.expires_at));
    }
}
