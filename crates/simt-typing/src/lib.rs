//! Static overload resolution for built-in GPU kernel intrinsics.
//!
//! This crate implements:
//! - Typing rules with fixed-table, predicate, and closure-factory dispatch
//! - A build-once, read-only registry of rules, namespaces, and globals
//! - Literal-driven specialization, where a constant argument changes the
//!   shape of the result type (grid queries, array allocation)
//! - Attribute resolution through nested pseudo-namespaces
//!
//! The registry is built once before any query and then shared without
//! locking. [`builtin_registry`] provides a process-wide instance of the
//! default `cuda` surface.

pub mod config;
pub mod error;
pub mod intrinsics;
pub mod literal;
pub mod registry;
pub mod report;
pub mod resolve;
pub mod rule;
pub mod trace;
pub mod typers;

use std::sync::LazyLock;

pub use config::{ConfigError, EngineConfig};
pub use error::{RegistryError, ResolveError};
pub use intrinsics::{build_registry, build_registry_with_parser};
pub use literal::{ArraySpecParser, DefaultArraySpecParser};
pub use registry::{Registry, RegistryBuilder};
pub use resolve::{AttributeRequest, CallRequest, Request, Resolution, Resolver};
pub use rule::{AttributeEntry, AttributeMap, LiteralDomainError, RuleKind, TypingRule};
pub use trace::{ResolveAction, ResolveStep};

// Re-export for convenience.
pub use simt_diag::{Category, Diagnostic, DiagnosticError};
pub use simt_types::{IntrinsicId, NamespaceId, Signature, Type};

static BUILTIN_REGISTRY: LazyLock<Result<Registry, RegistryError>> =
    LazyLock::new(|| build_registry(&EngineConfig::default()));

/// The default `cuda` surface for a 64-bit target, built on first use.
///
/// Initialization runs exactly once; every later call, from any thread,
/// observes the fully built registry.
pub fn builtin_registry() -> Result<&'static Registry, RegistryError> {
    BUILTIN_REGISTRY.as_ref().map_err(Clone::clone)
}

#[cfg(test)]
mod prop_tests;
