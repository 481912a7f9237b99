//! Error types for option resolution.
//!
//! Every variant describes a problem with the caller's input tokens; none of
//! them is transient, so none is worth retrying.

use thiserror::Error;

use crate::group::{GroupRef, RequiredEntry};

/// Errors raised while resolving a token sequence against a registry.
///
/// # Examples
///
/// ```
/// use option_resolver_core::ResolveError;
///
/// let err = ResolveError::AmbiguousOption {
///     name: "d".into(),
///     candidates: vec!["debug".into(), "dump".into()],
/// };
/// assert_eq!(err.to_string(), "ambiguous option: '--d' (could be: 'debug', 'dump')");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// An option-shaped token matched nothing and the resolver is strict.
    #[error("unrecognized option: {0}")]
    UnrecognizedOption(String),

    /// A long-name prefix matched several options and none exactly.
    #[error("ambiguous option: '--{name}' (could be: {})", quote_all(.candidates))]
    AmbiguousOption {
        /// The name as typed, without hyphens
        name: String,
        /// Every long name the prefix matched, in registration order
        candidates: Vec<String>,
    },

    /// An option's minimum number of values was not supplied.
    #[error("missing argument for option: {0}")]
    MissingArgument(String),

    /// Required options or groups were absent once all tokens were consumed.
    #[error("missing required option{}: {}", plural(.0.len()), join_entries(.0))]
    MissingRequiredOptions(Vec<RequiredEntry>),

    /// A second member of a mutually exclusive group was given.
    #[error(
        "the option '{option}' was specified but an option from this group has already been selected: '{selected}' (group {group})"
    )]
    AlreadySelected {
        /// The group both options belong to
        group: GroupRef,
        /// Key of the option that caused the conflict
        option: String,
        /// Key of the option selected earlier
        selected: String,
    },
}

/// Convenience alias for results with [`ResolveError`].
pub type Result<T> = std::result::Result<T, ResolveError>;

fn quote_all(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("'{n}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

fn join_entries(entries: &[RequiredEntry]) -> String {
    entries
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
