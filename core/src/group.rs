//! Mutually exclusive option groups.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::OptionSpec;
use crate::error::{ResolveError, Result};

/// A set of options of which at most one may appear in a single parse.
///
/// Members are kept in insertion order and are unique by
/// [`key`](OptionSpec::key). A required group is satisfied by any one of its
/// members; the members themselves are never individually required.
///
/// The selected key is transient per-parse state. The resolver works on a
/// copy of each registered group and clears the selection before every parse.
///
/// # Examples
///
/// ```
/// use option_resolver_core::{OptionGroup, OptionSpec};
///
/// let mut group = OptionGroup::new()
///     .with_option(OptionSpec::short('f'))
///     .with_option(OptionSpec::short('m'));
///
/// group.select("f").unwrap();
/// assert!(group.select("f").is_ok());
/// assert!(group.select("m").is_err());
///
/// group.clear_selection();
/// assert_eq!(group.selected(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionGroup {
    /// Must one of the members appear?
    pub required: bool,
    options: Vec<OptionSpec>,
    #[serde(skip)]
    index: usize,
    #[serde(skip)]
    selected: Option<String>,
}

impl OptionGroup {
    /// Creates an empty, optional group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member, replacing an earlier member with the same key.
    pub fn with_option(mut self, option: OptionSpec) -> Self {
        self.add_option(option);
        self
    }

    /// Marks the group as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Adds a member, replacing an earlier member with the same key.
    pub fn add_option(&mut self, option: OptionSpec) -> &mut Self {
        let key = option.key();
        match self.options.iter_mut().find(|o| o.key() == key) {
            Some(existing) => *existing = option,
            None => self.options.push(option),
        }
        self
    }

    /// Member specs in insertion order.
    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    pub(crate) fn options_mut(&mut self) -> &mut [OptionSpec] {
        &mut self.options
    }

    /// Member keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.options.iter().map(OptionSpec::key).collect()
    }

    /// Returns `true` if `key` names a member of this group.
    pub fn contains(&self, key: &str) -> bool {
        self.options.iter().any(|o| o.key() == key)
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Key of the member selected in the current parse, if any.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Selects `key` for the current parse.
    ///
    /// Selecting the already-selected key again is allowed.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::AlreadySelected`] when a different member is
    /// already selected.
    pub fn select(&mut self, key: &str) -> Result<()> {
        match &self.selected {
            Some(previous) if previous != key => Err(ResolveError::AlreadySelected {
                group: self.to_ref(),
                option: key.to_string(),
                selected: previous.clone(),
            }),
            _ => {
                self.selected = Some(key.to_string());
                Ok(())
            }
        }
    }

    /// Forgets the selection.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Position of the group in its registry (`0` before registration).
    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    /// Returns a lightweight reference used in errors and required entries.
    pub fn to_ref(&self) -> GroupRef {
        GroupRef {
            index: self.index,
            members: self.keys(),
        }
    }
}

impl fmt::Display for OptionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.options.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Identifies a registered [`OptionGroup`] by position and member keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupRef {
    /// Registration index in the owning registry
    pub index: usize,
    /// Member keys in insertion order
    pub members: Vec<String>,
}

impl fmt::Display for GroupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.members.join(", "))
    }
}

/// One entry of a registry's required list: a single option or a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredEntry {
    /// A required option, by key.
    Option(String),
    /// A required group; any one member satisfies it.
    Group(GroupRef),
}

impl fmt::Display for RequiredEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequiredEntry::Option(key) => f.write_str(key),
            RequiredEntry::Group(group) => group.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> OptionGroup {
        OptionGroup::new()
            .with_option(OptionSpec::new(Some('f'), Some("file")))
            .with_option(OptionSpec::new(Some('m'), Some("message")))
    }

    #[test]
    fn test_members_are_unique_by_key() {
        let group = group().with_option(OptionSpec::new(Some('f'), Some("force")));
        assert_eq!(group.keys(), vec!["f", "m"]);
        assert_eq!(group.options()[0].long.as_deref(), Some("force"));
    }

    #[test]
    fn test_select_conflict_reports_both_keys() {
        let mut group = group();
        group.select("m").unwrap();

        let err = group.select("f").unwrap_err();
        assert_eq!(
            err,
            ResolveError::AlreadySelected {
                group: GroupRef {
                    index: 0,
                    members: vec!["f".into(), "m".into()],
                },
                option: "f".into(),
                selected: "m".into(),
            }
        );
        assert_eq!(group.selected(), Some("m"));
    }

    #[test]
    fn test_display_lists_members() {
        assert_eq!(group().to_string(), "[-f, --file, -m, --message]");
        assert_eq!(group().to_ref().to_string(), "[f, m]");
    }
}
