//! Macros for defining kind enums.

/// Macro for defining a kind enum.
///
/// Every variant carries an explicit [`u8`] discriminant, which is also used
/// by the [`FromParam`] lookups. Textual representation is
/// `SCREAMING_SNAKE_CASE` both for [`Display`]/[`FromStr`] and [`serde`].
///
/// Calling crates must depend on [`serde`] and [`strum`] themselves, as the
/// derived code refers to them by name.
///
/// # Example
///
/// ```rust
/// # use common::define_kind;
///
/// define_kind! {
///     #[doc = "Shape kind."]
///     enum Kind {
///         #[doc = "A cube"]
///         Cube = 1,
///
///         #[doc = "A sphere"]
///         Sphere = 2,
///     }
/// }
/// ```
///
/// [`Display`]: std::fmt::Display
/// [`FromStr`]: std::str::FromStr
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_kind {
    (
        #[doc = $doc:literal]
        enum $name:ident {
            $(
                #[doc = $variant_doc:literal]
                $variant:ident = $value:expr
            ),* $(,)?
        }
    ) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            $crate::private::serde::Deserialize,
            $crate::private::strum::Display,
            $crate::private::strum::EnumIter,
            $crate::private::strum::EnumString,
            Eq,
            Hash,
            PartialEq,
            $crate::private::serde::Serialize,
        )]
        #[doc = $doc]
        #[repr(u8)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        #[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $(
                 #[doc = $variant_doc]
                 $variant = $value,
            )*
        }

        impl $name {
            /// Converts this into its [`u8`] representation.
            #[must_use]
            pub const fn u8(self) -> u8 {
                self as u8
            }
        }

        $(
            impl $crate::FromParam<$value> for $name {
                const VALUE: $name = $name::$variant;
            }
        )*
    };
}

/// Helper trait converting const parameter to a value.
pub trait FromParam<const PARAM: u8> {
    /// Value of the parameter.
    const VALUE: Self;
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use crate::FromParam;

    define_kind! {
        #[doc = "Kind used in tests."]
        enum Shape {
            #[doc = "A cube."]
            Cube = 1,

            #[doc = "A flat disk."]
            FlatDisk = 7,
        }
    }

    #[test]
    fn represents_as_discriminant() {
        assert_eq!(Shape::Cube.u8(), 1);
        assert_eq!(Shape::FlatDisk.u8(), 7);
        assert_eq!(<Shape as FromParam<7>>::VALUE, Shape::FlatDisk);
    }

    #[test]
    fn uses_screaming_snake_case() {
        assert_eq!(Shape::FlatDisk.to_string(), "FLAT_DISK");
        assert_eq!(Shape::from_str("FLAT_DISK").unwrap(), Shape::FlatDisk);
        assert!(Shape::from_str("flat_disk").is_err());

        assert_eq!(
            serde_json::to_string(&Shape::Cube).unwrap(),
            "\"CUBE\"",
        );
        assert_eq!(
            serde_json::from_str::<Shape>("\"FLAT_DISK\"").unwrap(),
            Shape::FlatDisk,
        );
    }
}
