//! Resolve argv-style token lists against a declarative option registry.
//!
//! The [`Resolver`] walks the tokens once, left to right, and decides for each
//! one whether it is a value for the previous option, a long option
//! (`--name`, `--name=value`, or an unambiguous abbreviation), a short option
//! or a cluster of them (`-v`, `-abc`, `-ofile`, `-Dkey=value`), the `--`
//! terminator, or a positional argument.
//!
//! Group exclusivity is enforced as soon as a second member of a group
//! appears. Missing required options are collected over the whole pass and
//! reported together.
//!
//! # Example
//!
//! ```
//! use option_resolver::{Resolver, resolve};
//! use option_resolver_core::*;
//!
//! let mut registry = OptionRegistry::new();
//! registry
//!     .register(OptionSpec::new(Some('v'), Some("verbose")))?
//!     .register(
//!         OptionSpec::short('D')
//!             .with_arg_count(ArgCount::Unlimited)
//!             .with_value_separator('='),
//!     )?
//!     .register(OptionSpec::new(Some('o'), Some("output")).with_arg().required())?;
//!
//! let result = resolve(&registry, ["-vv", "-Dmode=fast", "-o", "out.bin", "--", "-x"]).unwrap();
//! assert_eq!(result.count("verbose"), 2);
//! assert_eq!(result.values("D"), vec!["mode", "fast"]);
//! assert_eq!(result.value("output"), Some("out.bin"));
//! assert_eq!(result.args(), ["-x"]);
//!
//! let err = Resolver::new().resolve(&registry, ["-v"]).unwrap_err();
//! assert!(matches!(err, ResolveError::MissingRequiredOptions(_)));
//! # Ok::<(), ValidationError>(())
//! ```

mod resolver;
mod util;

pub use option_resolver_core::{ParseResult, ResolveError, Result};
pub use resolver::Resolver;

/// Resolves `tokens` strictly with the default [`Resolver`].
///
/// # Errors
///
/// See [`Resolver::resolve_full`].
pub fn resolve<I>(registry: &option_resolver_core::OptionRegistry, tokens: I) -> Result<ParseResult>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    Resolver::default().resolve(registry, tokens)
}
