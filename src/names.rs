//! Display name resolution
//!
//! Computes a collision-free room name from a requested name and the names
//! already in use. Comparison is case-insensitive throughout.

use crate::message::CHATBOT_NAME;

/// Base name used when the requested name is blank or reserved
pub const DEFAULT_NAME: &str = "Chatter";

/// Resolve a unique display name
///
/// Blank names and the reserved chatbot name become [`DEFAULT_NAME`]. A name
/// that collides with one in `in_use` gets the first free numeric suffix,
/// starting at 2.
pub fn resolve_name<I, S>(requested: &str, in_use: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let base = if requested.trim().is_empty() || fold(requested) == fold(CHATBOT_NAME) {
        DEFAULT_NAME
    } else {
        requested
    };

    let taken: Vec<String> = in_use.into_iter().map(|name| fold(name.as_ref())).collect();
    let is_taken = |candidate: &str| {
        let candidate = fold(candidate);
        taken.iter().any(|name| *name == candidate)
    };

    if !is_taken(base) {
        return base.to_string();
    }

    (2u64..)
        .map(|n| format!("{} {}", base, n))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Case folding shared by the reserved-name and collision checks
fn fold(name: &str) -> String {
    name.to_lowercase()
}
