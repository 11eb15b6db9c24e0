//! Conversion of resolution outcomes into host-facing diagnostics.

use std::collections::BTreeMap;

use simt_diag::{Category, Diagnostic, DiagnosticError};
use simt_types::{IntrinsicId, NamespaceId, Signature, Type, display_arg_types};

use crate::config::ConfigError;
use crate::error::{RegistryError, ResolveError};
use crate::registry::Registry;

/// Diagnostic for a call that resolved to `None`.
///
/// Distinguishes an unregistered intrinsic from one whose overloads all
/// rejected the argument types; for fixed tables the accepted signatures
/// are listed in the help text.
pub fn unresolved_call(registry: &Registry, id: &IntrinsicId, args: &[Type]) -> Diagnostic {
    let Some(rule) = registry.rule(id) else {
        return Diagnostic::error(
            Category::UnknownIntrinsic,
            format!("`{id}` is not a known intrinsic"),
        );
    };
    let diag = Diagnostic::error(
        Category::NoMatchingOverload,
        format!(
            "no matching overload for `{id}` with argument types {}",
            display_arg_types(args)
        ),
    );
    match rule.cases() {
        Some(cases) if !cases.is_empty() => {
            let accepted: Vec<String> = cases.iter().map(ToString::to_string).collect();
            diag.with_help(format!("accepted signatures: {}", accepted.join(", ")))
        }
        _ => diag,
    }
}

/// Diagnostic for an attribute lookup that resolved to `None`.
pub fn unknown_attribute(registry: &Registry, namespace: &NamespaceId, member: &str) -> Diagnostic {
    let diag = Diagnostic::error(
        Category::UnknownAttribute,
        format!("unknown attribute `{member}` on `{namespace}`"),
    );
    let suggestion = registry
        .attributes(namespace)
        .and_then(|attrs| closest_name(member, attrs.names()));
    match suggestion {
        Some(name) => diag.with_help(format!("did you mean `{name}`?")),
        None => diag,
    }
}

/// Resolve a call, reporting both soft and hard failures as diagnostics.
pub fn require_call(
    registry: &Registry,
    id: &IntrinsicId,
    args: &[Type],
    named: &BTreeMap<String, Type>,
) -> Result<Signature, DiagnosticError> {
    match registry.resolve_call(id, args, named) {
        Ok(Some(sig)) => Ok(sig),
        Ok(None) => Err(unresolved_call(registry, id, args).into()),
        Err(err) => Err(err.to_diagnostic().into()),
    }
}

/// Resolve a namespace member, reporting a miss as a diagnostic.
pub fn require_attribute(
    registry: &Registry,
    namespace: &NamespaceId,
    member: &str,
) -> Result<Type, DiagnosticError> {
    registry
        .resolve_attribute(namespace, member)
        .ok_or_else(|| unknown_attribute(registry, namespace, member).into())
}

impl ResolveError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::InvalidLiteral { .. } => {
                Diagnostic::error(Category::InvalidLiteral, self.to_string())
            }
            ResolveError::MalformedRequest { .. } => {
                Diagnostic::error(Category::MalformedRequest, self.to_string())
                    .with_help("pass intrinsic arguments positionally")
            }
        }
    }
}

impl RegistryError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        let category = match self {
            RegistryError::DuplicateRule { .. }
            | RegistryError::DuplicateNamespace { .. }
            | RegistryError::DuplicateGlobal { .. }
            | RegistryError::DuplicateMember { .. } => Category::DuplicateRegistration,
            RegistryError::UnknownFunction { .. } | RegistryError::UnknownNamespace { .. } => {
                Category::DanglingReference
            }
        };
        Diagnostic::error(category, self.to_string())
    }
}

impl ConfigError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(Category::Config, self.to_string())
    }
}

fn closest_name<'a>(name: &str, candidates: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut best: Option<(&str, usize)> = None;
    for candidate in candidates {
        let dist = edit_distance(name, candidate);
        if best.is_none_or(|(_, current)| dist < current) {
            best = Some((candidate, dist));
        }
    }
    match best {
        Some((candidate, dist)) if dist <= 3 => Some(candidate),
        _ => None,
    }
}

fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_distance_basics() {
        assert_eq!(edit_distance("laneid", "laneid"), 0);
        assert_eq!(edit_distance("threadidx", "threadIdx"), 1);
        assert_eq!(edit_distance("", "abc"), 3);
    }

    #[test]
    fn closest_name_respects_threshold() {
        let names = ["warpsize", "laneid", "threadIdx"];
        assert_eq!(closest_name("warpSize", names.into_iter()), Some("warpsize"));
        assert_eq!(closest_name("completely_else", names.into_iter()), None);
    }
}
