//! GraphQL scalar definitions.

use std::{fmt, marker::PhantomData, str::FromStr};

use juniper::{
    GraphQLType, InputValue, ParseScalarResult, ParseScalarValue, ScalarToken,
    ScalarValue, Value,
};

/// Helper type to use in `#[graphql(with = ..)]` attribute of string-based
/// newtypes over domain values.
///
/// Domain value of `As` type is rendered via its [`Display`] impl and is
/// parsed back via its [`FromStr`] impl, so validation stays in the domain.
///
/// Target type must implement [`From`] and [`AsRef`] for `As` type.
///
/// [`Display`]: fmt::Display
#[derive(Debug)]
pub struct Via<As>(PhantomData<As>);

impl<As> Via<As> {
    /// Converts the target type into a string scalar [`Value`].
    pub fn to_output<T, S>(value: &T) -> Value<S>
    where
        As: fmt::Display,
        T: AsRef<As>,
        S: ScalarValue,
    {
        Value::from(value.as_ref().to_string())
    }

    /// Parses the target type out of a string scalar [`InputValue`].
    ///
    /// # Errors
    ///
    /// If the input value is not a string or isn't a valid `As` value.
    pub fn from_input<T, S>(input: &InputValue<S>) -> Result<T, String>
    where
        As: FromStr,
        As::Err: fmt::Display,
        T: From<As> + GraphQLType<S, TypeInfo = ()>,
        S: ScalarValue,
    {
        let name = type_name::<T, S>();
        let s = input.as_string_value().ok_or_else(|| {
            format!("`{name}` must be a string, found: {input}")
        })?;
        s.parse::<As>()
            .map(T::from)
            .map_err(|e| format!("Cannot parse `{name}` from \"{s}\": {e}"))
    }

    /// Parses the provided [`ScalarToken`] as a string.
    ///
    /// # Errors
    ///
    /// If the token is not a string.
    pub fn parse_token<S: ScalarValue>(
        value: ScalarToken<'_>,
    ) -> ParseScalarResult<S> {
        <String as ParseScalarValue<S>>::from_str(value)
    }
}

/// Returns the GraphQL name of the `T` type.
fn type_name<T, S>() -> String
where
    T: GraphQLType<S, TypeInfo = ()>,
    S: ScalarValue,
{
    T::name(&()).map(|n| n.to_string()).unwrap_or_default()
}

/// Converts the provided count into a GraphQL `Int`, saturating at its
/// maximum.
pub(crate) fn count(n: impl TryInto<i32>) -> i32 {
    n.try_into().unwrap_or(i32::MAX)
}

/// Converts the provided GraphQL `Int` limit into a [`usize`].
///
/// [`None`] is returned for negative limits.
pub(crate) fn limit(n: i32) -> Option<usize> {
    usize::try_from(n).ok()
}

#[cfg(test)]
mod spec {
    use super::{count, limit};

    #[test]
    fn counts_saturate() {
        assert_eq!(count(7_u64), 7);
        assert_eq!(count(u64::MAX), i32::MAX);
        assert_eq!(count(usize::MAX), i32::MAX);
    }

    #[test]
    fn limits_are_non_negative() {
        assert_eq!(limit(0), Some(0));
        assert_eq!(limit(5), Some(5));
        assert_eq!(limit(-1), None);
    }
}
