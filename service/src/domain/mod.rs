//! Domain definitions.

/// Defines a validated text newtype.
///
/// A valid value is non-empty, has no leading or trailing whitespace and is
/// at most `max` bytes long.
macro_rules! define_text {
    (
        $(
            #[doc = $doc:literal]
            $name:ident(max = $max:literal)
        ),* $(,)?
    ) => {
        $(
            #[doc = $doc]
            #[derive(
                ::derive_more::AsRef,
                Clone,
                Debug,
                ::serde::Deserialize,
                ::derive_more::Display,
                Eq,
                Hash,
                Ord,
                PartialEq,
                PartialOrd,
                ::serde::Serialize,
            )]
            #[as_ref(str, String)]
            pub struct $name(String);

            impl $name {
                #[doc = concat!(
                    "Maximum length of a [`", stringify!($name), "`] in bytes.",
                )]
                pub const MAX_LEN: usize = $max;

                #[doc = concat!(
                    "Creates a new [`", stringify!($name), "`] if the given ",
                    "`value` is valid.",
                )]
                #[must_use]
                pub fn new(value: impl Into<String>) -> Option<Self> {
                    let value = value.into();
                    Self::check(&value).then_some(Self(value))
                }

                #[doc = concat!(
                    "Returns this [`", stringify!($name), "`] as a `str`.",
                )]
                #[must_use]
                pub fn as_str(&self) -> &str {
                    &self.0
                }

                #[doc = concat!(
                    "Checks whether the given `value` is a valid [`",
                    stringify!($name), "`].",
                )]
                fn check(value: &str) -> bool {
                    value.trim() == value
                        && !value.is_empty()
                        && value.len() <= Self::MAX_LEN
                }
            }

            impl ::std::str::FromStr for $name {
                type Err = &'static str;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Self::new(s)
                        .ok_or(concat!("invalid `", stringify!($name), "`"))
                }
            }
        )*
    };
}

pub mod business;
pub mod event;
pub mod user;

pub use self::{business::Business, event::Event, user::User};
