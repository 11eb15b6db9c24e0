//! Call and attribute resolution.
//!
//! [`Resolver`] is the dispatcher: it looks up the rule registered for a
//! request and runs that rule's strategy. Resolution is a pure function of
//! the frozen [`Registry`] and the request. The only state a resolver
//! carries is its optional trace.
//!
//! Outcomes follow a soft/hard split:
//! - `Ok(None)` / `None`: nothing matched. The caller may try another path
//!   or report "no matching overload" / "unknown attribute".
//! - `Err(ResolveError)`: the request can never succeed (literal outside
//!   the intrinsic's domain, keyword arguments on a built-in call). These are
//!   never downgraded to `None`.

use std::collections::BTreeMap;

use simt_types::{IntrinsicId, NamespaceId, Signature, Type, display_arg_types};

use crate::error::ResolveError;
use crate::registry::Registry;
use crate::rule::{AttributeEntry, RuleKind, TypeResolver, TypingRule};
use crate::trace::{ResolveAction, ResolveStep, Tracer};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// A compile-time query issued by the type-inference pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Call(CallRequest),
    Attribute(AttributeRequest),
}

/// Type a call to an intrinsic with the given argument types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub intrinsic: IntrinsicId,
    pub args: Vec<Type>,
    /// Keyword arguments. Must be empty for every built-in intrinsic.
    pub named: BTreeMap<String, Type>,
}

impl CallRequest {
    pub fn new(intrinsic: IntrinsicId, args: Vec<Type>) -> Self {
        Self {
            intrinsic,
            args,
            named: BTreeMap::new(),
        }
    }

    pub fn with_named(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.named.insert(name.into(), ty);
        self
    }
}

/// Type the member `member` of namespace `namespace`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRequest {
    pub namespace: NamespaceId,
    pub member: String,
}

/// Successful (possibly soft-failed) outcome of a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// `None` means no overload matched.
    Call(Option<Signature>),
    /// `None` means the member does not exist.
    Attribute(Option<Type>),
}

// ---------------------------------------------------------------------------
// Fixed-table matching
// ---------------------------------------------------------------------------

/// Whether `candidate` accepts `args` exactly, after stripping literal
/// wrappers from the arguments. No implicit widening is applied.
pub fn candidate_matches(candidate: &Signature, args: &[Type]) -> bool {
    candidate.params.len() == args.len()
        && candidate
            .params
            .iter()
            .zip(args)
            .all(|(param, arg)| arg.unliteral() == param)
}

/// First candidate, in declaration order, that accepts `args`.
///
/// Integer literals are typed `int64`, so a literal argument never reaches
/// a candidate declared with a narrower integer parameter.
pub fn match_fixed_table<'s>(cases: &'s [Signature], args: &[Type]) -> Option<&'s Signature> {
    cases.iter().find(|case| candidate_matches(case, args))
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Dispatches requests against a frozen [`Registry`].
#[derive(Debug)]
pub struct Resolver<'r> {
    registry: &'r Registry,
    tracer: Tracer,
}

impl<'r> Resolver<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            tracer: Tracer::default(),
        }
    }

    /// Record a [`ResolveStep`] for every decision made.
    pub fn with_tracing(mut self) -> Self {
        self.tracer = Tracer::enabled();
        self
    }

    pub fn is_tracing(&self) -> bool {
        self.tracer.is_enabled()
    }

    /// Steps recorded since the last call. Empty when tracing is off.
    pub fn take_trace(&mut self) -> Vec<ResolveStep> {
        self.tracer.take()
    }

    pub fn resolve(&mut self, request: &Request) -> Result<Resolution, ResolveError> {
        match request {
            Request::Call(call) => self
                .resolve_call(&call.intrinsic, &call.args, &call.named)
                .map(Resolution::Call),
            Request::Attribute(attr) => Ok(Resolution::Attribute(
                self.resolve_attribute(&attr.namespace, &attr.member),
            )),
        }
    }

    /// Determine the signature of a call to `id` with `args`.
    ///
    /// Fails with [`ResolveError::MalformedRequest`] if `named` is non-empty,
    /// whichever intrinsic is targeted and whether or not it is registered.
    pub fn resolve_call(
        &mut self,
        id: &IntrinsicId,
        args: &[Type],
        named: &BTreeMap<String, Type>,
    ) -> Result<Option<Signature>, ResolveError> {
        if !named.is_empty() {
            let names: Vec<String> = named.keys().cloned().collect();
            self.tracer
                .record(ResolveAction::MalformedRequest, id.as_str(), || names.join(", "));
            tracing::error!(
                target: "simt::resolve",
                intrinsic = %id,
                names = ?names,
                "keyword arguments passed to a built-in intrinsic"
            );
            return Err(ResolveError::MalformedRequest {
                intrinsic: id.clone(),
                names,
            });
        }

        let registry = self.registry;
        let Some(rule) = registry.rule(id) else {
            self.tracer.record(ResolveAction::LookupMiss, id.as_str(), || {
                display_arg_types(args)
            });
            tracing::debug!(target: "simt::resolve", intrinsic = %id, "no typing rule registered");
            return Ok(None);
        };
        self.tracer.record(ResolveAction::Lookup, id.as_str(), || {
            rule.kind().as_str().to_string()
        });

        let resolved = match rule {
            TypingRule::FixedTable(cases) => self.match_cases(id, cases, args),
            TypingRule::Predicate(resolver) => {
                self.tracer.record(ResolveAction::ApplyPredicate, id.as_str(), || {
                    display_arg_types(args)
                });
                self.apply_resolver(id, resolver, args)?
            }
            TypingRule::ClosureFactory(factory) => {
                let resolver = factory();
                self.tracer.record(ResolveAction::ApplyClosure, id.as_str(), || {
                    display_arg_types(args)
                });
                self.apply_resolver(id, &resolver, args)?
            }
        };

        match &resolved {
            Some(sig) => {
                self.tracer
                    .record(ResolveAction::Resolved, id.as_str(), || sig.to_string());
                tracing::trace!(target: "simt::resolve", intrinsic = %id, signature = %sig, "resolved");
            }
            None => {
                self.tracer.record(ResolveAction::Unresolved, id.as_str(), || {
                    display_arg_types(args)
                });
                tracing::debug!(
                    target: "simt::resolve",
                    intrinsic = %id,
                    args = %display_arg_types(args),
                    "no matching overload"
                );
            }
        }
        Ok(resolved)
    }

    fn match_cases(&mut self, id: &IntrinsicId, cases: &[Signature], args: &[Type]) -> Option<Signature> {
        if !self.tracer.is_enabled() {
            return match_fixed_table(cases, args).cloned();
        }
        for case in cases {
            self.tracer
                .record(ResolveAction::TryCandidate, id.as_str(), || case.to_string());
            if candidate_matches(case, args) {
                self.tracer
                    .record(ResolveAction::CandidateMatched, id.as_str(), || case.to_string());
                return Some(case.clone());
            }
        }
        None
    }

    /// Run a predicate or closure resolver on the raw arguments; if that
    /// finds nothing and some argument is a literal, retry once with every
    /// literal wrapper stripped. A hard error from the first attempt is
    /// returned as is.
    fn apply_resolver(
        &mut self,
        id: &IntrinsicId,
        resolver: &TypeResolver,
        args: &[Type],
    ) -> Result<Option<Signature>, ResolveError> {
        let raw = self.invoke(id, resolver, args)?;
        if raw.is_some() || !args.iter().any(|arg| arg.literal_value().is_some()) {
            return Ok(raw);
        }
        let unliteral: Vec<Type> = args.iter().map(|arg| arg.unliteral().clone()).collect();
        self.tracer.record(ResolveAction::LiteralFallback, id.as_str(), || {
            display_arg_types(&unliteral)
        });
        self.invoke(id, resolver, &unliteral)
    }

    fn invoke(
        &mut self,
        id: &IntrinsicId,
        resolver: &TypeResolver,
        args: &[Type],
    ) -> Result<Option<Signature>, ResolveError> {
        resolver(args).map_err(|source| {
            self.tracer
                .record(ResolveAction::InvalidLiteral, id.as_str(), || source.to_string());
            tracing::debug!(target: "simt::resolve", intrinsic = %id, error = %source, "invalid literal argument");
            ResolveError::InvalidLiteral {
                intrinsic: id.clone(),
                source,
            }
        })
    }

    /// Type of `member` on `namespace`, or `None` if either is unknown.
    pub fn resolve_attribute(&mut self, namespace: &NamespaceId, member: &str) -> Option<Type> {
        let registry = self.registry;
        let Some(attributes) = registry.attributes(namespace) else {
            self.tracer
                .record(ResolveAction::LookupMiss, namespace.as_str(), || member.to_string());
            tracing::debug!(target: "simt::resolve", namespace = %namespace, "no attributes registered");
            return None;
        };
        self.tracer.record(ResolveAction::Lookup, namespace.as_str(), || {
            RuleKind::AttributeMap.as_str().to_string()
        });

        let found = attributes.get(member).map(AttributeEntry::to_type);
        match &found {
            Some(ty) => self.tracer.record(ResolveAction::AttributeHit, namespace.as_str(), || {
                format!("{member}: {ty}")
            }),
            None => {
                self.tracer
                    .record(ResolveAction::AttributeMiss, namespace.as_str(), || member.to_string());
                tracing::debug!(target: "simt::resolve", namespace = %namespace, member, "unknown attribute");
            }
        }
        found
    }

    /// Attribute access on a value of type `base`. Only namespaces have members.
    pub fn resolve_member(&mut self, base: &Type, member: &str) -> Option<Type> {
        match base {
            Type::Namespace(namespace) => self.resolve_attribute(namespace, member),
            _ => None,
        }
    }

    pub fn resolve_global(&mut self, name: &str) -> Option<Type> {
        let found = self.registry.global(name).cloned();
        match &found {
            Some(ty) => self
                .tracer
                .record(ResolveAction::GlobalHit, name, || ty.to_string()),
            None => self.tracer.record(ResolveAction::GlobalMiss, name, String::new),
        }
        found
    }

    /// Resolve a dotted access path such as `["cuda", "atomic", "add"]`,
    /// starting from a global name.
    pub fn resolve_path(&mut self, path: &[&str]) -> Option<Type> {
        let (first, rest) = path.split_first()?;
        let mut current = self.resolve_global(first)?;
        for member in rest {
            current = self.resolve_member(&current, member)?;
        }
        Some(current)
    }
}
