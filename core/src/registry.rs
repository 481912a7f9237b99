//! The option catalog consulted by the resolver.

use std::collections::HashMap;

use serde::Serialize;
use tracing::trace;

use crate::group::{OptionGroup, RequiredEntry};
use crate::types::{OptionSpec, strip_leading_hyphens};
use crate::validate::{ValidationError, validate_spec};

/// Catalog of recognized options and groups.
///
/// Options are indexed by short and long name. The registry also keeps the
/// ordered list of required entries (single options and required groups)
/// and which group, if any, each option belongs to.
///
/// A registry is built once and then borrowed immutably by every parse.
///
/// # Examples
///
/// ```
/// use option_resolver_core::*;
///
/// let mut registry = OptionRegistry::new();
/// registry
///     .register(OptionSpec::new(Some('v'), Some("verbose")))?
///     .register(OptionSpec::new(Some('o'), Some("output")).with_arg().required())?;
/// registry.register_group(
///     OptionGroup::new()
///         .with_option(OptionSpec::long("json"))
///         .with_option(OptionSpec::long("yaml"))
///         .required(),
/// )?;
///
/// assert!(registry.has_option("--verbose"));
/// assert_eq!(registry.option("o").unwrap().long.as_deref(), Some("output"));
/// assert_eq!(registry.required_entries().len(), 2);
/// assert!(registry.group_of("json").is_some());
/// # Ok::<(), ValidationError>(())
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct OptionRegistry {
    options: Vec<OptionSpec>,
    #[serde(skip)]
    short_index: HashMap<char, usize>,
    #[serde(skip)]
    long_index: HashMap<String, usize>,
    required: Vec<RequiredEntry>,
    groups: Vec<OptionGroup>,
    #[serde(skip)]
    group_index: HashMap<String, usize>,
}

impl OptionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an option.
    ///
    /// A spec with the same key as an existing one replaces it. When the spec
    /// is required its key is appended to the required list, moving any
    /// earlier entry for the same key to the end. Members of a registered
    /// group are always stored as optional.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the spec has no name or an invalid
    /// one.
    pub fn register(&mut self, mut spec: OptionSpec) -> Result<&mut Self, ValidationError> {
        validate_spec(&spec)?;

        let key = spec.key();
        if self.group_index.contains_key(&key) {
            spec.required = false;
        }
        if spec.required {
            self.required
                .retain(|entry| !matches!(entry, RequiredEntry::Option(k) if *k == key));
            self.required.push(RequiredEntry::Option(key.clone()));
        }

        match self.options.iter().position(|o| o.key() == key) {
            Some(pos) => self.options[pos] = spec,
            None => self.options.push(spec),
        }
        self.reindex();

        trace!(key = %key, "Registered option");
        Ok(self)
    }

    /// Registers a mutually exclusive group and all of its members.
    ///
    /// Members are forced to be non-required; only the group itself can make
    /// one of them mandatory.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyGroup`] for a group without members,
    /// [`ValidationError::AlreadyGrouped`] when a member belongs to an earlier
    /// group, or the first validation error of a member.
    pub fn register_group(&mut self, mut group: OptionGroup) -> Result<&mut Self, ValidationError> {
        if group.is_empty() {
            return Err(ValidationError::EmptyGroup);
        }
        for member in group.options() {
            validate_spec(member)?;
            let key = member.key();
            if self.group_index.contains_key(&key) {
                return Err(ValidationError::AlreadyGrouped(key));
            }
        }

        let index = self.groups.len();
        group.set_index(index);
        group.clear_selection();

        for member in group.options_mut() {
            member.required = false;
        }
        for member in group.options() {
            let key = member.key();
            self.required
                .retain(|entry| !matches!(entry, RequiredEntry::Option(k) if *k == key));
            self.register(member.clone())?;
            self.group_index.insert(key, index);
        }

        if group.required {
            self.required.push(RequiredEntry::Group(group.to_ref()));
        }

        trace!(index, members = ?group.keys(), required = group.required, "Registered group");
        self.groups.push(group);
        Ok(self)
    }

    fn reindex(&mut self) {
        self.short_index.clear();
        self.long_index.clear();
        for (pos, spec) in self.options.iter().enumerate() {
            if let Some(short) = spec.short {
                self.short_index.insert(short, pos);
            }
            if let Some(long) = &spec.long {
                self.long_index.insert(long.clone(), pos);
            }
        }
    }

    /// All options in registration order.
    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    /// Looks an option up by short or long name, ignoring up to two leading
    /// hyphens. Short names win over long names.
    pub fn option(&self, name: &str) -> Option<&OptionSpec> {
        let name = strip_leading_hyphens(name);
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(spec) = self.by_short(c) {
                return Some(spec);
            }
        }
        self.by_long(name)
    }

    /// Looks an option up by its short name.
    pub fn by_short(&self, name: char) -> Option<&OptionSpec> {
        self.short_index.get(&name).map(|&pos| &self.options[pos])
    }

    /// Looks an option up by its exact long name (hyphens stripped).
    pub fn by_long(&self, name: &str) -> Option<&OptionSpec> {
        self.long_index
            .get(strip_leading_hyphens(name))
            .map(|&pos| &self.options[pos])
    }

    /// Returns `true` if `name` is a short or long name of a registered option.
    pub fn has_option(&self, name: &str) -> bool {
        self.option(name).is_some()
    }

    pub fn has_short(&self, name: char) -> bool {
        self.short_index.contains_key(&name)
    }

    pub fn has_long(&self, name: &str) -> bool {
        self.by_long(name).is_some()
    }

    /// Returns the long names that start with `prefix` (hyphens stripped), in
    /// registration order.
    ///
    /// An exact match is returned alone. An empty prefix matches nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use option_resolver_core::{OptionRegistry, OptionSpec};
    ///
    /// let mut registry = OptionRegistry::new();
    /// registry.register(OptionSpec::long("debug"))?;
    /// registry.register(OptionSpec::long("dump"))?;
    /// registry.register(OptionSpec::long("du"))?;
    ///
    /// assert_eq!(registry.matching_long_names("--d"), vec!["debug", "dump", "du"]);
    /// assert_eq!(registry.matching_long_names("du"), vec!["du"]);
    /// assert!(registry.matching_long_names("x").is_empty());
    /// # Ok::<(), option_resolver_core::ValidationError>(())
    /// ```
    pub fn matching_long_names(&self, prefix: &str) -> Vec<&str> {
        let prefix = strip_leading_hyphens(prefix);
        if prefix.is_empty() {
            return Vec::new();
        }
        if let Some(spec) = self.by_long(prefix) {
            return spec.long.as_deref().into_iter().collect();
        }
        self.options
            .iter()
            .enumerate()
            .filter_map(|(pos, spec)| {
                let long = spec.long.as_deref()?;
                let owned = self.long_index.get(long) == Some(&pos);
                (owned && long.starts_with(prefix)).then_some(long)
            })
            .collect()
    }

    /// The group `key` belongs to, if any.
    pub fn group_of(&self, key: &str) -> Option<&OptionGroup> {
        self.group_index.get(key).map(|&index| &self.groups[index])
    }

    /// A registered group by index.
    pub fn group(&self, index: usize) -> Option<&OptionGroup> {
        self.groups.get(index)
    }

    /// All groups in registration order.
    pub fn groups(&self) -> &[OptionGroup] {
        &self.groups
    }

    /// Required option keys and groups, in insertion order.
    pub fn required_entries(&self) -> &[RequiredEntry] {
        &self.required
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::ArgCount;

    use super::*;

    #[test]
    fn test_register_indexes_short_and_long_names() {
        let mut registry = OptionRegistry::new();
        registry
            .register(OptionSpec::new(Some('f'), Some("file")).with_arg())
            .unwrap();

        assert_eq!(registry.by_short('f').unwrap().key(), "f");
        assert_eq!(registry.by_long("file").unwrap().key(), "f");
        assert_eq!(registry.option("--file").unwrap().key(), "f");
        assert!(registry.option("x").is_none());
    }

    #[test]
    fn test_reregistering_replaces_spec_in_place() {
        let mut registry = OptionRegistry::new();
        registry.register(OptionSpec::short('a')).unwrap();
        registry.register(OptionSpec::short('b')).unwrap();
        registry
            .register(OptionSpec::new(Some('a'), Some("all")).with_arg_count(ArgCount::Unlimited))
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.options()[0].long.as_deref(), Some("all"));
        assert!(registry.has_long("all"));
    }

    #[test]
    fn test_required_key_collapses_to_last_insertion() {
        let mut registry = OptionRegistry::new();
        registry.register(OptionSpec::short('a').required()).unwrap();
        registry.register(OptionSpec::short('b').required()).unwrap();
        registry.register(OptionSpec::short('a').required()).unwrap();

        assert_eq!(
            registry.required_entries(),
            &[
                RequiredEntry::Option("b".into()),
                RequiredEntry::Option("a".into())
            ]
        );
    }

    #[test]
    fn test_group_members_are_never_required() {
        let mut registry = OptionRegistry::new();
        registry.register(OptionSpec::short('f').required()).unwrap();
        registry
            .register_group(
                OptionGroup::new()
                    .with_option(OptionSpec::short('f').required())
                    .with_option(OptionSpec::short('m')),
            )
            .unwrap();

        assert!(!registry.by_short('f').unwrap().required);
        assert!(registry.required_entries().is_empty());
        assert_eq!(registry.group_of("m").unwrap().keys(), vec!["f", "m"]);
    }

    #[test]
    fn test_reregistered_group_member_stays_optional() {
        let mut registry = OptionRegistry::new();
        registry
            .register_group(
                OptionGroup::new()
                    .with_option(OptionSpec::short('f'))
                    .with_option(OptionSpec::short('m')),
            )
            .unwrap();
        registry
            .register(OptionSpec::short('f').with_arg().required())
            .unwrap();

        let member = registry.by_short('f').unwrap();
        assert!(!member.required);
        assert!(member.takes_args());
        assert!(registry.required_entries().is_empty());
        assert_eq!(registry.group_of("f").unwrap().index(), 0);
    }

    #[test]
    fn test_option_joins_at_most_one_group() {
        let mut registry = OptionRegistry::new();
        registry
            .register_group(
                OptionGroup::new()
                    .with_option(OptionSpec::short('f'))
                    .with_option(OptionSpec::short('m')),
            )
            .unwrap();

        let err = registry
            .register_group(
                OptionGroup::new()
                    .with_option(OptionSpec::short('x'))
                    .with_option(OptionSpec::short('m')),
            )
            .unwrap_err();

        assert_eq!(err, ValidationError::AlreadyGrouped("m".into()));
        assert_eq!(registry.groups().len(), 1);
        assert!(!registry.has_short('x'));
        assert_eq!(registry.group_of("m").unwrap().index(), 0);
    }

    #[test]
    fn test_required_group_is_listed_once() {
        let mut registry = OptionRegistry::new();
        registry
            .register_group(
                OptionGroup::new()
                    .with_option(OptionSpec::short('x'))
                    .with_option(OptionSpec::short('y'))
                    .required(),
            )
            .unwrap();

        match registry.required_entries() {
            [RequiredEntry::Group(group)] => {
                assert_eq!(group.index, 0);
                assert_eq!(group.members, vec!["x", "y"]);
            }
            other => panic!("unexpected required entries: {other:?}"),
        }
    }

    #[test]
    fn test_register_rejects_unnamed_and_empty() {
        let mut registry = OptionRegistry::new();
        assert_eq!(
            registry.register(OptionSpec::default()).unwrap_err(),
            ValidationError::MissingOptionName
        );
        assert_eq!(
            registry.register_group(OptionGroup::new()).unwrap_err(),
            ValidationError::EmptyGroup
        );
    }

    #[test]
    fn test_matching_long_names_skips_shadowed_names() {
        let mut registry = OptionRegistry::new();
        registry.register(OptionSpec::new(Some('a'), Some("color"))).unwrap();
        registry.register(OptionSpec::new(Some('b'), Some("color"))).unwrap();
        registry.register(OptionSpec::long("colour")).unwrap();

        assert_eq!(registry.matching_long_names("col"), vec!["color", "colour"]);
        assert_eq!(registry.by_long("color").unwrap().key(), "b");
    }
}
