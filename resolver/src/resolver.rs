//! The token-classification state machine.

use std::collections::BTreeMap;

use option_resolver_core::{
    OptionGroup, OptionRegistry, OptionSpec, ParseResult, RequiredEntry, ResolveError,
    ResolvedOption, ResolverSettings, Result, strip_leading_hyphens,
};
use tracing::{debug, trace};

use crate::util::{is_negative_number, is_truthy, split_first_char, strip_quotes};

/// Resolves token sequences against an [`OptionRegistry`].
///
/// The resolver itself only carries policy; all per-parse state lives in a
/// session created by each `resolve*` call, so one resolver and one registry
/// can serve any number of independent parses.
///
/// # Examples
///
/// ```
/// use option_resolver::Resolver;
/// use option_resolver_core::{OptionRegistry, OptionSpec};
///
/// let mut registry = OptionRegistry::new();
/// registry
///     .register(OptionSpec::new(Some('v'), Some("verbose")))?
///     .register(OptionSpec::new(Some('o'), Some("output")).with_arg())?;
///
/// let result = Resolver::new()
///     .resolve(&registry, ["-v", "--out=report.txt", "input.csv"])
///     .unwrap();
///
/// assert!(result.has_option("verbose"));
/// assert_eq!(result.value("output"), Some("report.txt"));
/// assert_eq!(result.args(), ["input.csv"]);
/// # Ok::<(), option_resolver_core::ValidationError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolver {
    partial_matching: bool,
}

impl Default for Resolver {
    fn default() -> Self {
        Self {
            partial_matching: true,
        }
    }
}

impl Resolver {
    /// Creates a resolver that accepts unambiguous long-name abbreviations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver that only accepts exact long names.
    pub fn exact() -> Self {
        Self {
            partial_matching: false,
        }
    }

    /// Creates a resolver from declarative settings.
    pub fn from_settings(settings: &ResolverSettings) -> Self {
        Self {
            partial_matching: settings.partial_matching,
        }
    }

    /// Enables or disables long-name prefix matching.
    pub fn with_partial_matching(mut self, enabled: bool) -> Self {
        self.partial_matching = enabled;
        self
    }

    pub fn partial_matching(&self) -> bool {
        self.partial_matching
    }

    /// Resolves `tokens` strictly, without defaults.
    ///
    /// # Errors
    ///
    /// See [`resolve_full`](Resolver::resolve_full).
    pub fn resolve<I>(&self, registry: &OptionRegistry, tokens: I) -> Result<ParseResult>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.resolve_full(registry, tokens, None, false)
    }

    /// Resolves `tokens`, optionally stopping at the first non-option.
    ///
    /// # Errors
    ///
    /// See [`resolve_full`](Resolver::resolve_full).
    pub fn resolve_with<I>(
        &self,
        registry: &OptionRegistry,
        tokens: I,
        stop_at_non_option: bool,
    ) -> Result<ParseResult>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.resolve_full(registry, tokens, None, stop_at_non_option)
    }

    /// Resolves `tokens` with defaults for absent options.
    ///
    /// With `stop_at_non_option` unknown tokens never fail: the first one and
    /// everything after it become positional arguments.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::UnrecognizedOption`] for an unknown option-shaped
    ///   token in strict mode, or a default naming no option.
    /// - [`ResolveError::AmbiguousOption`] when a long-name prefix matches
    ///   several options.
    /// - [`ResolveError::MissingArgument`] when an option did not receive
    ///   its minimum number of values.
    /// - [`ResolveError::AlreadySelected`] when two members of one group
    ///   appear.
    /// - [`ResolveError::MissingRequiredOptions`] after the whole pass, listing
    ///   every unmet required option and group.
    pub fn resolve_full<I>(
        &self,
        registry: &OptionRegistry,
        tokens: I,
        defaults: Option<&BTreeMap<String, String>>,
        stop_at_non_option: bool,
    ) -> Result<ParseResult>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut session = Session::new(registry, self.partial_matching, stop_at_non_option);
        for token in tokens {
            session.handle_token(token.as_ref())?;
        }
        session.finish(defaults)
    }
}

/// Where the pass currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    /// The occurrence at this index may take the next token as a value.
    Awaiting(usize),
    /// Every remaining token is positional. `pending` keeps an occurrence
    /// that was still awaiting values when passthrough began.
    Passthrough { pending: Option<usize> },
}

/// What to do with one token, decided from the state and the token's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Positional,
    EndOfOptions,
    Value(usize),
    LongOption,
    ShortOption,
    Unknown,
}

struct Session<'r> {
    registry: &'r OptionRegistry,
    partial_matching: bool,
    stop_at_non_option: bool,
    groups: Vec<OptionGroup>,
    pending_required: Vec<RequiredEntry>,
    result: ParseResult,
    state: State,
}

impl<'r> Session<'r> {
    fn new(registry: &'r OptionRegistry, partial_matching: bool, stop_at_non_option: bool) -> Self {
        let groups = registry
            .groups()
            .iter()
            .cloned()
            .map(|mut group| {
                group.clear_selection();
                group
            })
            .collect();

        debug!(
            options = registry.len(),
            groups = registry.groups().len(),
            partial_matching,
            stop_at_non_option,
            "Starting option resolution"
        );

        Self {
            registry,
            partial_matching,
            stop_at_non_option,
            groups,
            pending_required: registry.required_entries().to_vec(),
            result: ParseResult::new(),
            state: State::Normal,
        }
    }

    fn classify(&self, token: &str) -> Action {
        match self.state {
            State::Passthrough { .. } => Action::Positional,
            _ if token == "--" => Action::EndOfOptions,
            State::Awaiting(index) if self.accepts_more(index) && self.is_value(token) => {
                Action::Value(index)
            }
            _ if token.starts_with("--") => Action::LongOption,
            _ if token.starts_with('-') && token.len() > 1 => Action::ShortOption,
            _ => Action::Unknown,
        }
    }

    fn handle_token(&mut self, token: &str) -> Result<()> {
        let action = self.classify(token);
        trace!(token, ?action, state = ?self.state, "Classified token");

        match action {
            Action::Positional => self.result.push_arg(token),
            Action::EndOfOptions => {
                self.state = State::Passthrough {
                    pending: self.awaiting(),
                };
            }
            Action::Value(index) => self.capture(index, strip_quotes(token)),
            Action::LongOption => self.long_option(token)?,
            Action::ShortOption => self.short_option(token)?,
            Action::Unknown => self.unknown_token(token)?,
        }

        if let State::Awaiting(index) = self.state {
            if !self.accepts_more(index) {
                self.state = State::Normal;
            }
        }
        Ok(())
    }

    fn awaiting(&self) -> Option<usize> {
        match self.state {
            State::Awaiting(index) => Some(index),
            _ => None,
        }
    }

    fn accepts_more(&self, index: usize) -> bool {
        self.result
            .occurrence(index)
            .is_some_and(ResolvedOption::accepts_more)
    }

    fn capture(&mut self, index: usize, value: &str) {
        if let Some(occurrence) = self.result.occurrence_mut(index) {
            trace!(key = %occurrence.key(), value, "Captured value");
            occurrence.capture(value);
        }
    }

    /// A token is a value unless it looks like a recognized option; negative
    /// numbers are always values.
    fn is_value(&self, token: &str) -> bool {
        !self.looks_like_option(token) || is_negative_number(token)
    }

    fn looks_like_option(&self, token: &str) -> bool {
        if !token.starts_with('-') || token.len() == 1 {
            return false;
        }
        let name = token.split_once('=').map_or(token, |(name, _)| name);

        if !self.matching_long(name).is_empty() {
            return true;
        }
        if !token.starts_with("--") && self.long_prefix(token).is_some() {
            return true;
        }

        // Short names only follow a single hyphen.
        match split_first_char(&name[1..]) {
            Some((first, _)) => self.registry.has_short(first),
            None => false,
        }
    }

    fn matching_long(&self, name: &str) -> Vec<&'r str> {
        if self.partial_matching {
            self.registry.matching_long_names(name)
        } else {
            self.registry
                .by_long(name)
                .and_then(|spec| spec.long.as_deref())
                .into_iter()
                .collect()
        }
    }

    /// Resolves a long name, allowing abbreviations when enabled.
    fn resolve_long(&self, name: &str) -> Result<Option<&'r OptionSpec>> {
        let candidates = self.matching_long(name);
        match candidates.as_slice() {
            [] => Ok(None),
            [only] => Ok(self.registry.by_long(only)),
            _ => Err(ResolveError::AmbiguousOption {
                name: strip_leading_hyphens(name).to_string(),
                candidates: candidates.iter().map(ToString::to_string).collect(),
            }),
        }
    }

    /// Finds the longest long name that prefixes `token`'s text while leaving
    /// at least one character after it.
    fn long_prefix(&self, token: &str) -> Option<&'r OptionSpec> {
        let text = strip_leading_hyphens(token);
        let bounds: Vec<usize> = text.char_indices().map(|(pos, _)| pos).collect();
        (2..bounds.len())
            .rev()
            .find_map(|len| self.registry.by_long(&text[..bounds[len]]))
    }

    /// Property-style option named by the first char of `text`.
    fn property_option(&self, text: &str) -> Option<&'r OptionSpec> {
        let (first, _) = split_first_char(text)?;
        self.registry
            .by_short(first)
            .filter(|spec| spec.is_property_style())
    }

    fn long_option(&mut self, token: &str) -> Result<()> {
        match token.split_once('=') {
            None => self.long_without_value(token),
            Some((name, value)) => self.long_with_value(token, name, value),
        }
    }

    fn long_without_value(&mut self, token: &str) -> Result<()> {
        match self.resolve_long(token)? {
            Some(spec) => self.record(spec).map(drop),
            None => self.unknown_token(token),
        }
    }

    fn long_with_value(&mut self, token: &str, name: &str, value: &str) -> Result<()> {
        match self.resolve_long(name)? {
            Some(spec) if spec.takes_args() => {
                let index = self.record(spec)?;
                self.capture(index, strip_quotes(value));
                self.state = State::Normal;
                Ok(())
            }
            _ => self.unknown_token(token),
        }
    }

    fn short_option(&mut self, token: &str) -> Result<()> {
        let text = strip_leading_hyphens(token);

        if let Some((first, "")) = split_first_char(text) {
            return match self.registry.by_short(first) {
                Some(spec) => self.record(spec).map(drop),
                None => self.unknown_token(token),
            };
        }

        match text.split_once('=') {
            None => self.short_without_value(token, text),
            Some((name, value)) => self.short_with_value(token, name, value),
        }
    }

    fn short_without_value(&mut self, token: &str, text: &str) -> Result<()> {
        if !self.matching_long(text).is_empty() {
            return self.long_without_value(token);
        }

        if let Some(spec) = self.long_prefix(text).filter(|spec| spec.takes_args()) {
            let name_len = spec.long.as_deref().map_or(0, str::len);
            let index = self.record(spec)?;
            self.capture(index, strip_quotes(&text[name_len..]));
            self.state = State::Normal;
            return Ok(());
        }

        if let Some(spec) = self.property_option(text) {
            let index = self.record(spec)?;
            if let Some((_, rest)) = split_first_char(text) {
                self.capture(index, strip_quotes(rest));
            }
            self.state = State::Normal;
            return Ok(());
        }

        self.burst(token)
    }

    fn short_with_value(&mut self, token: &str, name: &str, value: &str) -> Result<()> {
        match split_first_char(name) {
            None => self.unknown_token(token),
            Some((first, "")) => match self.registry.by_short(first) {
                Some(spec) if spec.takes_args() => {
                    let index = self.record(spec)?;
                    self.capture(index, strip_quotes(value));
                    self.state = State::Normal;
                    Ok(())
                }
                _ => self.unknown_token(token),
            },
            Some((_, rest)) => match self.property_option(name) {
                Some(spec) => {
                    let index = self.record(spec)?;
                    self.capture(index, rest);
                    self.capture(index, strip_quotes(value));
                    self.state = State::Normal;
                    Ok(())
                }
                None => self.long_with_value(token, name, value),
            },
        }
    }

    /// Reads `-abc` as `-a -b -c`. The first option that takes values
    /// swallows the rest of the token.
    fn burst(&mut self, token: &str) -> Result<()> {
        let body = &token[1..];
        for (offset, c) in body.char_indices() {
            let Some(spec) = self.registry.by_short(c) else {
                let unknown = if self.stop_at_non_option && offset > 0 {
                    &body[offset..]
                } else {
                    token
                };
                return self.unknown_token(unknown);
            };

            let index = self.record(spec)?;
            let rest = &body[offset + c.len_utf8()..];
            if spec.takes_args() && !rest.is_empty() {
                self.capture(index, strip_quotes(rest));
                break;
            }
        }
        Ok(())
    }

    fn unknown_token(&mut self, token: &str) -> Result<()> {
        if token.starts_with('-') && token.len() > 1 && !self.stop_at_non_option {
            return Err(ResolveError::UnrecognizedOption(token.to_string()));
        }

        self.result.push_arg(token);
        if self.stop_at_non_option {
            trace!(token, "Stopping at first non-option");
            self.state = State::Passthrough {
                pending: self.awaiting(),
            };
        }
        Ok(())
    }

    /// Records an occurrence of `spec` and does the per-occurrence
    /// bookkeeping. Returns the occurrence's index.
    fn record(&mut self, spec: &'r OptionSpec) -> Result<usize> {
        self.check_pending_argument()?;

        let key = spec.key();
        self.pending_required
            .retain(|entry| !matches!(entry, RequiredEntry::Option(k) if *k == key));

        if let Some(group) = self.registry.group_of(&key) {
            let group_index = group.index();
            if group.required {
                self.pending_required.retain(
                    |entry| !matches!(entry, RequiredEntry::Group(g) if g.index == group_index),
                );
            }
            if let Some(selection) = self.groups.get_mut(group_index) {
                selection.select(&key)?;
            }
        }

        let index = self.result.push_occurrence(ResolvedOption::new(spec.clone()));
        self.state = if spec.takes_args() {
            State::Awaiting(index)
        } else {
            State::Normal
        };

        trace!(key = %key, index, "Recorded option");
        Ok(index)
    }

    fn pending_occurrence(&self) -> Option<usize> {
        match self.state {
            State::Normal => None,
            State::Awaiting(index) => Some(index),
            State::Passthrough { pending } => pending,
        }
    }

    fn check_pending_argument(&self) -> Result<()> {
        let missing = self
            .pending_occurrence()
            .and_then(|index| self.result.occurrence(index))
            .filter(|occurrence| occurrence.requires_more());
        match missing {
            Some(occurrence) => Err(ResolveError::MissingArgument(occurrence.key())),
            None => Ok(()),
        }
    }

    fn finish(mut self, defaults: Option<&BTreeMap<String, String>>) -> Result<ParseResult> {
        self.check_pending_argument()?;
        self.state = State::Normal;

        if let Some(defaults) = defaults {
            self.apply_defaults(defaults)?;
        }

        if !self.pending_required.is_empty() {
            return Err(ResolveError::MissingRequiredOptions(self.pending_required));
        }

        debug!(
            options = self.result.occurrences().len(),
            args = self.result.args().len(),
            "Resolved command line"
        );
        Ok(self.result)
    }

    /// Applies defaults for options that did not appear, as if they had been
    /// typed on the command line.
    fn apply_defaults(&mut self, defaults: &BTreeMap<String, String>) -> Result<()> {
        for (name, value) in defaults {
            let spec = self
                .registry
                .option(name)
                .ok_or_else(|| ResolveError::UnrecognizedOption(name.clone()))?;

            let group_taken = self
                .registry
                .group_of(&spec.key())
                .and_then(|group| self.groups.get(group.index()))
                .is_some_and(|group| group.selected().is_some());
            if self.result.has_option(name) || group_taken {
                continue;
            }

            if spec.takes_args() {
                let index = self.record(spec)?;
                self.capture(index, value);
            } else if is_truthy(value) {
                self.record(spec)?;
            } else {
                continue;
            }
            self.state = State::Normal;
            debug!(option = %name, value = %value, "Applied default");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use option_resolver_core::{ArgCount, OptionGroup, ValidationError};

    use super::*;

    fn registry() -> OptionRegistry {
        let mut registry = OptionRegistry::new();
        registry
            .register(OptionSpec::new(Some('a'), Some("all")))
            .unwrap()
            .register(OptionSpec::new(Some('b'), Some("block-size")).with_arg())
            .unwrap()
            .register(OptionSpec::new(Some('n'), Some("lines")).with_arg())
            .unwrap()
            .register(
                OptionSpec::short('D')
                    .with_arg_count(ArgCount::Exactly(2))
                    .with_value_separator('='),
            )
            .unwrap()
            .register(OptionSpec::long("color").with_arg().with_optional_arg())
            .unwrap();
        registry
    }

    #[test]
    fn test_classify_follows_priority_order() {
        let registry = registry();
        let mut session = Session::new(&registry, true, false);

        assert_eq!(session.classify("--"), Action::EndOfOptions);
        assert_eq!(session.classify("--all"), Action::LongOption);
        assert_eq!(session.classify("-a"), Action::ShortOption);
        assert_eq!(session.classify("-"), Action::Unknown);
        assert_eq!(session.classify("file"), Action::Unknown);

        session.handle_token("-n").unwrap();
        assert_eq!(session.state, State::Awaiting(0));
        assert_eq!(session.classify("-5"), Action::Value(0));
        assert_eq!(session.classify("-x"), Action::Value(0));
        assert_eq!(session.classify("-a"), Action::ShortOption);
        assert_eq!(session.classify("--"), Action::EndOfOptions);

        session.handle_token("--").unwrap();
        assert_eq!(session.classify("-a"), Action::Positional);
        assert_eq!(
            session.state,
            State::Passthrough { pending: Some(0) }
        );
    }

    #[test]
    fn test_awaiting_clears_once_full() {
        let registry = registry();
        let mut session = Session::new(&registry, true, false);

        session.handle_token("-b").unwrap();
        session.handle_token("512").unwrap();
        assert_eq!(session.state, State::Normal);
        session.handle_token("rest").unwrap();

        let result = session.finish(None).unwrap();
        assert_eq!(result.value("b"), Some("512"));
        assert_eq!(result.args(), ["rest"]);
    }

    #[test]
    fn test_new_option_while_argument_missing() {
        let registry = registry();
        let err = Resolver::new()
            .resolve(&registry, ["-b", "-a"])
            .unwrap_err();
        assert_eq!(err, ResolveError::MissingArgument("b".into()));

        // An optional argument may be skipped.
        let result = Resolver::new()
            .resolve(&registry, ["--color", "-a"])
            .unwrap();
        assert_eq!(result.value("color"), None);
        assert!(result.has_option("a"));
    }

    #[test]
    fn test_long_prefix_with_glued_value() {
        let registry = registry();
        let result = Resolver::new()
            .resolve(&registry, ["-block-size1024"])
            .unwrap();
        assert_eq!(result.value("block-size"), Some("1024"));
        assert_eq!(result.occurrences().len(), 1);
    }

    #[test]
    fn test_single_dash_long_name() {
        let registry = registry();
        let result = Resolver::new().resolve(&registry, ["-all"]).unwrap();
        assert_eq!(result.count("a"), 1);

        let result = Resolver::new().resolve(&registry, ["-lines=3"]).unwrap();
        assert_eq!(result.value("n"), Some("3"));
    }

    #[test]
    fn test_exact_resolver_rejects_abbreviations() {
        let registry = registry();
        let result = Resolver::new().resolve(&registry, ["--lin", "4"]).unwrap();
        assert_eq!(result.value("lines"), Some("4"));

        let err = Resolver::exact()
            .resolve(&registry, ["--lin", "4"])
            .unwrap_err();
        assert_eq!(err, ResolveError::UnrecognizedOption("--lin".into()));
    }

    #[test]
    fn test_group_selection_is_reset_per_parse() -> std::result::Result<(), ValidationError> {
        let mut registry = OptionRegistry::new();
        registry.register_group(
            OptionGroup::new()
                .with_option(OptionSpec::short('x'))
                .with_option(OptionSpec::short('y')),
        )?;

        let resolver = Resolver::new();
        assert!(resolver.resolve(&registry, ["-x"]).is_ok());
        assert!(resolver.resolve(&registry, ["-y"]).is_ok());
        assert_eq!(registry.groups()[0].selected(), None);
        Ok(())
    }

    #[test]
    fn test_quoted_values_are_unwrapped() {
        let registry = registry();
        let result = Resolver::new()
            .resolve(&registry, ["-b", "\"64 k\"", "--lines=\"7\"", "\"arg\""])
            .unwrap();
        assert_eq!(result.value("b"), Some("64 k"));
        assert_eq!(result.value("n"), Some("7"));
        assert_eq!(result.args(), ["\"arg\""]);
    }
}
