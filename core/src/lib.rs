//! Core option-catalog types and parse results.
//!
//! This crate defines the data model shared by the resolver and the tools
//! built on top of it:
//!
//! - [`OptionSpec`]: one recognized option with short/long names and an
//!   [`ArgCount`] contract.
//! - [`OptionGroup`]: a set of mutually exclusive options.
//! - [`OptionRegistry`]: the catalog of options, groups and required entries.
//! - [`ParseResult`]: resolved [`ResolvedOption`] occurrences plus leftover
//!   positional arguments.
//! - [`ResolveError`]: every way a token sequence can fail to resolve.
//!
//! Validation ([`validate_spec`], [`validate_registry`]) catches malformed
//! names and clashes. [`RegistryDefinition`] declares a whole catalog in a
//! YAML or JSON document.
//!
//! # Example
//!
//! ```
//! use option_resolver_core::*;
//!
//! let mut registry = OptionRegistry::new();
//! registry
//!     .register(OptionSpec::new(Some('v'), Some("verbose")).with_description("Print more"))?
//!     .register(OptionSpec::new(Some('o'), Some("output")).with_arg().with_arg_name("FILE"))?;
//!
//! assert!(registry.has_option("-v"));
//! assert_eq!(registry.matching_long_names("out"), vec!["output"]);
//! assert!(validate_registry(&registry).is_empty());
//! # Ok::<(), ValidationError>(())
//! ```

mod definition;
mod error;
mod group;
mod registry;
mod result;
mod types;
mod validate;

pub use definition::{RegistryDefinition, ResolverSettings};
pub use error::{ResolveError, Result};
pub use group::{GroupRef, OptionGroup, RequiredEntry};
pub use registry::OptionRegistry;
pub use result::{ParseResult, ResolvedOption};
pub use types::*;
pub use validate::{ValidationError, validate_registry, validate_spec};
