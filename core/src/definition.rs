//! Declarative registry documents.
//!
//! A [`RegistryDefinition`] describes options, groups, default values and
//! resolver settings in one serde document, so a tool can keep its option
//! catalog in a YAML or JSON file next to its sources.
//!
//! # Example YAML
//!
//! ```yaml
//! options:
//!   - short: v
//!     long: verbose
//!     description: Print more output
//!   - short: o
//!     long: output
//!     args: 1
//!     arg_name: FILE
//!     required: true
//!   - short: D
//!     args: unlimited
//!     value_separator: "="
//! groups:
//!   - required: true
//!     options:
//!       - long: json
//!       - long: yaml
//! defaults:
//!   verbose: "false"
//! settings:
//!   partial_matching: true
//!   stop_at_non_option: false
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::validate::{ValidationError, validate_registry};
use crate::{OptionGroup, OptionRegistry, OptionSpec};

/// Resolver policy switches.
///
/// # Examples
///
/// ```
/// use option_resolver_core::ResolverSettings;
///
/// let settings = ResolverSettings::default();
/// assert!(settings.partial_matching);
/// assert!(!settings.stop_at_non_option);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Accept unambiguous abbreviations of long names.
    pub partial_matching: bool,
    /// Treat the first unknown token and everything after it as positional.
    pub stop_at_non_option: bool,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            partial_matching: true,
            stop_at_non_option: false,
        }
    }
}

/// Serializable description of a whole option catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryDefinition {
    /// Ungrouped options, in registration order.
    pub options: Vec<OptionSpec>,
    /// Mutually exclusive groups, registered after the options.
    pub groups: Vec<OptionGroup>,
    /// Values applied for options absent from the command line.
    pub defaults: BTreeMap<String, String>,
    /// Resolver policy.
    pub settings: ResolverSettings,
}

impl RegistryDefinition {
    /// Builds the registry: options first, then groups.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] raised while registering.
    ///
    /// # Examples
    ///
    /// ```
    /// use option_resolver_core::*;
    ///
    /// let definition = RegistryDefinition {
    ///     options: vec![OptionSpec::new(Some('v'), Some("verbose"))],
    ///     groups: vec![
    ///         OptionGroup::new()
    ///             .with_option(OptionSpec::long("json"))
    ///             .with_option(OptionSpec::long("yaml")),
    ///     ],
    ///     ..Default::default()
    /// };
    ///
    /// let registry = definition.build_registry()?;
    /// assert_eq!(registry.len(), 3);
    /// assert_eq!(registry.groups().len(), 1);
    /// # Ok::<(), ValidationError>(())
    /// ```
    pub fn build_registry(&self) -> Result<OptionRegistry, ValidationError> {
        let mut registry = OptionRegistry::new();
        for spec in &self.options {
            registry.register(spec.clone())?;
        }
        for group in &self.groups {
            registry.register_group(group.clone())?;
        }
        Ok(registry)
    }

    /// Collects every problem with the definition.
    ///
    /// Reports registration failures, names shared by several options and
    /// defaults for unknown options.
    pub fn validate(&self) -> Vec<ValidationError> {
        let registry = match self.build_registry() {
            Ok(registry) => registry,
            Err(err) => return vec![err],
        };

        let mut errors = validate_registry(&registry);
        errors.extend(
            self.defaults
                .keys()
                .filter(|key| !registry.has_option(key))
                .map(|key| ValidationError::UnknownDefault(key.clone())),
        );
        errors
    }
}
