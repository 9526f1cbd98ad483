// Dimension tokens
//
// A dimension token is one or two colon-separated components, each a
// standard name or a constant dimension.

use crate::errors::{RegistryError, RegistryResult};

/// Dimension names with a fixed extent
pub const CONSTANT_DIMENSIONS: &[(&str, i64)] =
    &[("ccpp_constant_one", 1), ("ccpp_constant_zero", 0)];

/// Value of `name` if it is a constant dimension
pub fn constant_dimension(name: &str) -> Option<i64> {
    let name = name.trim().to_lowercase();
    CONSTANT_DIMENSIONS
        .iter()
        .find(|(constant, _)| *constant == name)
        .map(|(_, value)| *value)
}

/// Split dimension text into tokens
pub fn parse_dimensions(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Components of one token
pub fn components(token: &str) -> Vec<&str> {
    token.split(':').map(str::trim).collect()
}

/// Reject tokens with a step component (`a:b:c`)
pub fn check_token(token: &str, variable: &str, scope: &str) -> RegistryResult<()> {
    if token.matches(':').count() > 1 {
        return Err(RegistryError::IllegalDimensionStep {
            dimension: token.to_string(),
            variable: variable.to_string(),
            scope: scope.to_string(),
        });
    }
    Ok(())
}

/// Non-constant components of `token`, lower-cased
pub fn named_components(token: &str) -> impl Iterator<Item = String> + '_ {
    components(token)
        .into_iter()
        .filter(|c| constant_dimension(c).is_none())
        .map(str::to_lowercase)
}

/// `(a, b)` rendering of a dimension list
pub fn dimension_string<S: AsRef<str>>(dimensions: &[S]) -> String {
    let parts: Vec<&str> = dimensions.iter().map(AsRef::as_ref).collect();
    format!("({})", parts.join(", "))
}

/// Extent expression of `token` in an allocate statement, lower-cased
/// like the routine's dimension arguments; constant components become
/// their literal values
pub fn allocation_extent(token: &str) -> String {
    components(token)
        .into_iter()
        .map(|c| match constant_dimension(c) {
            Some(value) => value.to_string(),
            None => c.to_lowercase(),
        })
        .collect::<Vec<_>>()
        .join(":")
}
