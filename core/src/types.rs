//! Option specification types.
//!
//! This module defines [`OptionSpec`], the immutable description of one
//! recognized command-line option, and [`ArgCount`], the contract for how many
//! values an option captures. The types are designed for serialization with
//! [`serde`] so registries can be declared in YAML or JSON documents.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How many values an option captures.
///
/// Serialized as a plain number (`0` is [`ArgCount::None`]) or one of the
/// keywords `"none"` and `"unlimited"`.
///
/// # Examples
///
/// ```
/// use option_resolver_core::ArgCount;
///
/// assert_eq!(ArgCount::default(), ArgCount::None);
/// assert_eq!(ArgCount::Exactly(2).max(), Some(2));
/// assert_eq!(ArgCount::Unlimited.max(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "ArgCountRepr", into = "ArgCountRepr")]
pub enum ArgCount {
    /// The option is a switch and never captures values (the default).
    #[default]
    None,
    /// The option captures exactly `n` values.
    Exactly(usize),
    /// The option captures one or more values with no upper bound.
    Unlimited,
}

impl ArgCount {
    /// Returns the upper bound on captured values, if there is one.
    pub fn max(self) -> Option<usize> {
        match self {
            ArgCount::None => Some(0),
            ArgCount::Exactly(n) => Some(n),
            ArgCount::Unlimited => None,
        }
    }
}

impl fmt::Display for ArgCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgCount::None => f.write_str("none"),
            ArgCount::Exactly(n) => write!(f, "{n}"),
            ArgCount::Unlimited => f.write_str("unlimited"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ArgCountRepr {
    Count(usize),
    Keyword(String),
}

impl TryFrom<ArgCountRepr> for ArgCount {
    type Error = String;

    fn try_from(repr: ArgCountRepr) -> Result<Self, Self::Error> {
        match repr {
            ArgCountRepr::Count(0) => Ok(ArgCount::None),
            ArgCountRepr::Count(n) => Ok(ArgCount::Exactly(n)),
            ArgCountRepr::Keyword(word) => match word.to_ascii_lowercase().as_str() {
                "none" => Ok(ArgCount::None),
                "unlimited" => Ok(ArgCount::Unlimited),
                _ => Err(format!(
                    "invalid argument count '{word}': expected a number, 'none' or 'unlimited'"
                )),
            },
        }
    }
}

impl From<ArgCount> for ArgCountRepr {
    fn from(count: ArgCount) -> Self {
        match count {
            ArgCount::None => ArgCountRepr::Count(0),
            ArgCount::Exactly(n) => ArgCountRepr::Count(n),
            ArgCount::Unlimited => ArgCountRepr::Keyword("unlimited".to_string()),
        }
    }
}

/// Description of one recognized option.
///
/// An option has an optional short name (a single character, typed as `-v`)
/// and/or an optional long name (typed as `--verbose`). Its identity
/// [`key`](OptionSpec::key) is the short name when present, otherwise the long
/// name.
///
/// Use the constructors [`new`](OptionSpec::new), [`short`](OptionSpec::short)
/// and [`long`](OptionSpec::long), then chain the `with_*` methods.
///
/// # Examples
///
/// ```
/// use option_resolver_core::{ArgCount, OptionSpec};
///
/// let verbose = OptionSpec::new(Some('v'), Some("verbose"))
///     .with_description("Enable verbose output");
/// assert_eq!(verbose.key(), "v");
/// assert!(!verbose.takes_args());
///
/// let output = OptionSpec::long("output").with_arg().with_arg_name("FILE");
/// assert_eq!(output.key(), "output");
/// assert_eq!(output.arg_count, ArgCount::Exactly(1));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionSpec {
    /// Short name (e.g. `'v'` for `-v`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    /// Long name (e.g. `"verbose"` for `--verbose`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    /// Human readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Must this option appear on every command line?
    pub required: bool,
    /// How many values the option captures
    #[serde(rename = "args")]
    pub arg_count: ArgCount,
    /// May the option appear without its value?
    pub optional_arg: bool,
    /// Character that splits one captured value into several
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_separator: Option<char>,
    /// Display name of the value (e.g. `FILE`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg_name: Option<String>,
}

impl OptionSpec {
    /// Creates a switch with the given names.
    ///
    /// At least one of `short` and `long` must be given for the spec to be
    /// accepted by a registry.
    pub fn new(short: Option<char>, long: Option<&str>) -> Self {
        Self {
            short,
            long: long.map(String::from),
            ..Default::default()
        }
    }

    /// Creates a switch with only a short name.
    pub fn short(name: char) -> Self {
        Self::new(Some(name), None)
    }

    /// Creates a switch with only a long name.
    pub fn long(name: &str) -> Self {
        Self::new(None, Some(name))
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Makes the option capture exactly one value.
    pub fn with_arg(self) -> Self {
        self.with_arg_count(ArgCount::Exactly(1))
    }

    /// Sets the argument-count contract.
    pub fn with_arg_count(mut self, count: ArgCount) -> Self {
        self.arg_count = count;
        self
    }

    /// Allows the option to appear without its value.
    pub fn with_optional_arg(mut self) -> Self {
        self.optional_arg = true;
        self
    }

    /// Sets the character used to split captured values.
    pub fn with_value_separator(mut self, separator: char) -> Self {
        self.value_separator = Some(separator);
        self
    }

    /// Sets the value display name.
    pub fn with_arg_name(mut self, name: &str) -> Self {
        self.arg_name = Some(name.to_string());
        self
    }

    /// Marks the option as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Returns the identity key: the short name if present, else the long name.
    ///
    /// # Examples
    ///
    /// ```
    /// use option_resolver_core::OptionSpec;
    ///
    /// assert_eq!(OptionSpec::new(Some('f'), Some("file")).key(), "f");
    /// assert_eq!(OptionSpec::long("file").key(), "file");
    /// ```
    pub fn key(&self) -> String {
        match (self.short, &self.long) {
            (Some(short), _) => short.to_string(),
            (None, Some(long)) => long.clone(),
            (None, None) => String::new(),
        }
    }

    /// Returns `true` when the option captures values at all.
    pub fn takes_args(&self) -> bool {
        self.arg_count != ArgCount::None
    }

    /// Returns `true` for options shaped like `-Dkey=value`: two or more
    /// values, or an unlimited number of them.
    ///
    /// # Examples
    ///
    /// ```
    /// use option_resolver_core::{ArgCount, OptionSpec};
    ///
    /// let define = OptionSpec::short('D').with_arg_count(ArgCount::Unlimited);
    /// assert!(define.is_property_style());
    /// assert!(!OptionSpec::short('o').with_arg().is_property_style());
    /// ```
    pub fn is_property_style(&self) -> bool {
        match self.arg_count {
            ArgCount::Exactly(n) => n >= 2,
            ArgCount::Unlimited => true,
            ArgCount::None => false,
        }
    }

    /// Checks whether `name` (without hyphens) is this option's short or long name.
    ///
    /// # Examples
    ///
    /// ```
    /// use option_resolver_core::OptionSpec;
    ///
    /// let spec = OptionSpec::new(Some('v'), Some("verbose"));
    /// assert!(spec.matches("v"));
    /// assert!(spec.matches("verbose"));
    /// assert!(!spec.matches("-v"));
    /// ```
    pub fn matches(&self, name: &str) -> bool {
        let mut chars = name.chars();
        let is_short = match (chars.next(), chars.next()) {
            (Some(c), None) => self.short == Some(c),
            _ => false,
        };
        is_short || self.long.as_deref() == Some(name)
    }
}

impl fmt::Display for OptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.short, &self.long) {
            (Some(short), Some(long)) => write!(f, "-{short}, --{long}")?,
            (Some(short), None) => write!(f, "-{short}")?,
            (None, Some(long)) => write!(f, "--{long}")?,
            (None, None) => f.write_str("<unnamed>")?,
        }
        if self.takes_args() {
            let name = self.arg_name.as_deref().unwrap_or("arg");
            if self.optional_arg {
                write!(f, " [<{name}>]")?;
            } else {
                write!(f, " <{name}>")?;
            }
        }
        Ok(())
    }
}

/// Removes at most two leading hyphens from an option name.
///
/// # Examples
///
/// ```
/// use option_resolver_core::strip_leading_hyphens;
///
/// assert_eq!(strip_leading_hyphens("--verbose"), "verbose");
/// assert_eq!(strip_leading_hyphens("-v"), "v");
/// assert_eq!(strip_leading_hyphens("---x"), "-x");
/// ```
pub fn strip_leading_hyphens(name: &str) -> &str {
    name.strip_prefix("--")
        .or_else(|| name.strip_prefix('-'))
        .unwrap_or(name)
}
