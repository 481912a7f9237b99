//! Option and registry validation.
//!
//! Validates option names before they enter a registry, and catches
//! registry-level problems such as a long name claimed by several options.
//!
//! # Examples
//!
//! ```
//! use option_resolver_core::*;
//!
//! assert!(validate_spec(&OptionSpec::new(Some('v'), Some("verbose"))).is_ok());
//!
//! // Invalid: long names need at least two characters
//! assert_eq!(
//!     validate_spec(&OptionSpec::long("v")),
//!     Err(ValidationError::InvalidLongName("v".to_string()))
//! );
//! ```

use std::collections::HashMap;

use thiserror::Error;

use crate::{ArgCount, OptionRegistry, OptionSpec};

/// Option, group and registry validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// An option has neither a short nor a long name.
    #[error("option must define a short or long name")]
    MissingOptionName,
    /// Short name is not alphanumeric, `_`, `?` or `@`.
    #[error("invalid short option name: {0:?}")]
    InvalidShortName(char),
    /// Long name is too short or contains characters other than
    /// alphanumerics, `_` and `-`.
    #[error("invalid long option name: {0:?}")]
    InvalidLongName(String),
    /// An option declares that it captures exactly zero values.
    #[error("option '{0}' captures exactly zero values; use no argument count instead")]
    ZeroArgCount(String),
    /// A group has no members.
    #[error("option group must contain at least one option")]
    EmptyGroup,
    /// An option is listed in more than one group.
    #[error("option '{0}' already belongs to a group")]
    AlreadyGrouped(String),
    /// Two options in one registry share a long name.
    #[error("duplicate long option name: {0}")]
    DuplicateLongName(String),
    /// A default value names an option that is not registered.
    #[error("default given for unknown option: {0}")]
    UnknownDefault(String),
}

fn is_valid_short(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '?' | '@')
}

fn is_valid_long(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    name.chars().count() >= 2
        && (first.is_alphanumeric() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-'))
}

/// Validates the names and argument contract of one option.
///
/// # Errors
///
/// Returns the first problem found.
pub fn validate_spec(spec: &OptionSpec) -> Result<(), ValidationError> {
    if spec.short.is_none() && spec.long.is_none() {
        return Err(ValidationError::MissingOptionName);
    }
    if let Some(short) = spec.short {
        if !is_valid_short(short) {
            return Err(ValidationError::InvalidShortName(short));
        }
    }
    if let Some(long) = &spec.long {
        if !is_valid_long(long) {
            return Err(ValidationError::InvalidLongName(long.clone()));
        }
    }
    if spec.arg_count == ArgCount::Exactly(0) {
        return Err(ValidationError::ZeroArgCount(spec.key()));
    }
    Ok(())
}

/// Validates a built registry.
///
/// Registration already rejects malformed options, so this only reports
/// problems that span several options.
///
/// # Examples
///
/// ```
/// use option_resolver_core::*;
///
/// let mut registry = OptionRegistry::new();
/// registry.register(OptionSpec::new(Some('c'), Some("color")))?;
/// registry.register(OptionSpec::new(Some('C'), Some("color")))?;
///
/// assert_eq!(
///     validate_registry(&registry),
///     vec![ValidationError::DuplicateLongName("color".to_string())]
/// );
/// # Ok::<(), ValidationError>(())
/// ```
pub fn validate_registry(registry: &OptionRegistry) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut owners: HashMap<&str, usize> = HashMap::new();

    for spec in registry.options() {
        if let Err(err) = validate_spec(spec) {
            errors.push(err);
        }
        if let Some(long) = spec.long.as_deref() {
            let count = owners.entry(long).or_default();
            *count += 1;
            if *count == 2 {
                errors.push(ValidationError::DuplicateLongName(long.to_string()));
            }
        }
    }

    errors
}
