//! Per-parse results: resolved occurrences and leftover arguments.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::types::{ArgCount, OptionSpec, strip_leading_hyphens};

/// One occurrence of an option on a command line.
///
/// Holds its own copy of the matched [`OptionSpec`] and the values captured
/// for this occurrence, so nothing captured during one parse can leak into
/// the registry or into a later parse.
///
/// # Examples
///
/// ```
/// use option_resolver_core::{ArgCount, OptionSpec, ResolvedOption};
///
/// let spec = OptionSpec::short('D')
///     .with_arg_count(ArgCount::Exactly(2))
///     .with_value_separator('=');
/// let mut occurrence = ResolvedOption::new(spec);
/// occurrence.capture("key=value=more");
///
/// assert_eq!(occurrence.values(), ["key", "value=more"]);
/// assert!(!occurrence.accepts_more());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedOption {
    spec: OptionSpec,
    values: Vec<String>,
}

impl ResolvedOption {
    /// Starts an occurrence of `spec` with no captured values.
    pub fn new(spec: OptionSpec) -> Self {
        Self {
            spec,
            values: Vec::new(),
        }
    }

    /// The spec this occurrence was resolved to.
    pub fn spec(&self) -> &OptionSpec {
        &self.spec
    }

    pub fn key(&self) -> String {
        self.spec.key()
    }

    /// Values captured for this occurrence.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// First captured value.
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    /// Returns `true` while the argument-count contract allows another value.
    pub fn accepts_more(&self) -> bool {
        match self.spec.arg_count {
            ArgCount::None => false,
            ArgCount::Exactly(n) => self.values.len() < n,
            ArgCount::Unlimited => true,
        }
    }

    /// Returns `true` while the contract's minimum has not been reached.
    ///
    /// Optional-argument options never require a value.
    pub fn requires_more(&self) -> bool {
        if self.spec.optional_arg {
            return false;
        }
        match self.spec.arg_count {
            ArgCount::None => false,
            ArgCount::Exactly(n) => self.values.len() < n,
            ArgCount::Unlimited => self.values.is_empty(),
        }
    }

    /// Captures a raw value.
    ///
    /// With a value separator the text is split into successive values, but
    /// once `max - 1` values are held the remainder is kept whole as the last
    /// value. Values offered to a full occurrence are dropped.
    pub fn capture(&mut self, value: &str) {
        let mut rest = value;
        if let Some(separator) = self.spec.value_separator {
            let limit = self.spec.arg_count.max().map(|max| max.saturating_sub(1));
            while let Some(pos) = rest.find(separator) {
                if limit == Some(self.values.len()) {
                    break;
                }
                self.push(&rest[..pos]);
                rest = &rest[pos + separator.len_utf8()..];
            }
        }
        self.push(rest);
    }

    fn push(&mut self, value: &str) {
        if self.accepts_more() {
            self.values.push(value.to_string());
        } else {
            warn!(key = %self.key(), value, "Dropping value for option that is already full");
        }
    }
}

/// Outcome of one successful parse.
///
/// Occurrences are kept in the order they were first seen, duplicates
/// included; positional arguments keep their original order.
///
/// # Examples
///
/// ```
/// use option_resolver_core::{OptionSpec, ParseResult, ResolvedOption};
///
/// let mut result = ParseResult::default();
/// let mut output = ResolvedOption::new(OptionSpec::new(Some('o'), Some("output")).with_arg());
/// output.capture("out.txt");
/// result.push_occurrence(output);
/// result.push_arg("input.txt");
///
/// assert!(result.has_option("--output"));
/// assert_eq!(result.value("o"), Some("out.txt"));
/// assert_eq!(result.value_or("missing", "fallback"), "fallback");
/// assert_eq!(result.args(), ["input.txt"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseResult {
    options: Vec<ResolvedOption>,
    args: Vec<String>,
}

impl ParseResult {
    /// Creates an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an occurrence and returns its position.
    pub fn push_occurrence(&mut self, occurrence: ResolvedOption) -> usize {
        self.options.push(occurrence);
        self.options.len() - 1
    }

    /// Appends a positional argument.
    pub fn push_arg(&mut self, arg: impl Into<String>) {
        self.args.push(arg.into());
    }

    pub fn occurrence(&self, index: usize) -> Option<&ResolvedOption> {
        self.options.get(index)
    }

    pub fn occurrence_mut(&mut self, index: usize) -> Option<&mut ResolvedOption> {
        self.options.get_mut(index)
    }

    /// All occurrences in first-seen order.
    pub fn occurrences(&self) -> &[ResolvedOption] {
        &self.options
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedOption> {
        self.options.iter()
    }

    fn matching<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a ResolvedOption> + 'a {
        let name = strip_leading_hyphens(name).to_string();
        self.options.iter().filter(move |o| o.spec.matches(&name))
    }

    /// Returns `true` if the option named by its short or long name appeared.
    pub fn has_option(&self, name: &str) -> bool {
        self.matching(name).next().is_some()
    }

    /// Number of times the option appeared (`-vvv` counts three).
    pub fn count(&self, name: &str) -> usize {
        self.matching(name).count()
    }

    /// First value captured for the option.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.matching(name).flat_map(|o| o.values.iter()).next().map(String::as_str)
    }

    /// First value captured for the option, or `default`.
    pub fn value_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.value(name).unwrap_or(default)
    }

    /// Every value captured by every occurrence of the option, in order.
    pub fn values(&self, name: &str) -> Vec<&str> {
        self.matching(name)
            .flat_map(|o| o.values.iter().map(String::as_str))
            .collect()
    }

    /// Reads a property-style option (`-Dkey=value`) as a map.
    ///
    /// Values are consumed two at a time as key and value. A trailing key
    /// without a value maps to `"true"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use option_resolver_core::{ArgCount, OptionSpec, ParseResult, ResolvedOption};
    ///
    /// let spec = OptionSpec::short('D')
    ///     .with_arg_count(ArgCount::Exactly(2))
    ///     .with_value_separator('=');
    /// let mut result = ParseResult::new();
    /// for raw in ["name=demo", "debug"] {
    ///     let mut occurrence = ResolvedOption::new(spec.clone());
    ///     occurrence.capture(raw);
    ///     result.push_occurrence(occurrence);
    /// }
    ///
    /// let props = result.properties("D");
    /// assert_eq!(props["name"], "demo");
    /// assert_eq!(props["debug"], "true");
    /// ```
    pub fn properties(&self, name: &str) -> BTreeMap<String, String> {
        let mut props = BTreeMap::new();
        for occurrence in self.matching(name) {
            let mut values = occurrence.values.iter();
            while let Some(key) = values.next() {
                let value = values.next().map_or("true", String::as_str);
                props.insert(key.clone(), value.to_string());
            }
        }
        props
    }

    /// Positional arguments in their original order.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn into_args(self) -> Vec<String> {
        self.args
    }
}

impl<'a> IntoIterator for &'a ParseResult {
    type Item = &'a ResolvedOption;
    type IntoIter = std::slice::Iter<'a, ResolvedOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.options.iter()
    }
}
