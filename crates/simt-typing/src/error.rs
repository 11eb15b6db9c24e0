//! Hard failures of resolution and registry construction.
//!
//! Soft failures (no overload, unknown member) are plain `None` values.
//! Everything here means the program or the compiler is wrong regardless
//! of which overload is tried.

use simt_types::{IntrinsicId, NamespaceId};

use crate::rule::LiteralDomainError;

/// A resolution that can never succeed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// A literal argument is outside the intrinsic's accepted values.
    #[error("invalid literal argument to `{intrinsic}`: {source}")]
    InvalidLiteral {
        intrinsic: IntrinsicId,
        #[source]
        source: LiteralDomainError,
    },
    /// The call carried keyword arguments. Built-in intrinsics take none,
    /// so this is a bug in the calling compiler stage.
    #[error(
        "malformed call to `{intrinsic}`: intrinsics take no keyword arguments (got {})",
        .names.join(", ")
    )]
    MalformedRequest {
        intrinsic: IntrinsicId,
        names: Vec<String>,
    },
}

/// Registry construction failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("typing rule for `{id}` is already registered")]
    DuplicateRule { id: IntrinsicId },
    #[error("attributes for namespace `{id}` are already registered")]
    DuplicateNamespace { id: NamespaceId },
    #[error("global `{name}` is already registered")]
    DuplicateGlobal { name: String },
    #[error("namespace `{namespace}` declares member `{member}` more than once")]
    DuplicateMember {
        namespace: NamespaceId,
        member: String,
    },
    #[error("`{referrer}` refers to intrinsic `{target}`, which has no typing rule")]
    UnknownFunction {
        referrer: String,
        target: IntrinsicId,
    },
    #[error("`{referrer}` refers to namespace `{target}`, which has no attributes")]
    UnknownNamespace {
        referrer: String,
        target: NamespaceId,
    },
}
