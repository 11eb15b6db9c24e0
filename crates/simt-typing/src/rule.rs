//! Typing rules and attribute maps.
//!
//! A [`TypingRule`] is the declared strategy for typing calls to one
//! intrinsic. The resolver dispatches on the variant:
//!
//! - `FixedTable`: an ordered list of candidate signatures, first exact
//!   match (under literal unwrapping) wins.
//! - `Predicate`: a resolver function with full access to the raw argument
//!   types.
//! - `ClosureFactory`: builds a fresh resolver per resolution; used when the
//!   resolver is parametrized only by declaration-time constants.
//!
//! An [`AttributeMap`] is the fourth strategy: member lookup on a
//! pseudo-namespace.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use simt_types::{IntrinsicId, LiteralValue, NamespaceId, Signature, Type};

/// A literal argument whose value no overload of the intrinsic accepts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("argument can only be {domain}, got {value}")]
pub struct LiteralDomainError {
    pub value: LiteralValue,
    /// Human-readable accepted values, e.g. `1, 2, or 3`.
    pub domain: String,
}

/// Outcome of a resolver: `Ok(None)` means "not applicable to these types".
pub type ResolverResult = Result<Option<Signature>, LiteralDomainError>;

/// Resolver function shared by predicate and closure-factory rules.
pub type TypeResolver = Arc<dyn Fn(&[Type]) -> ResolverResult + Send + Sync>;

/// Builds a [`TypeResolver`] each time a closure-factory rule is resolved.
pub type ResolverFactory = Arc<dyn Fn() -> TypeResolver + Send + Sync>;

/// The dispatch strategy of a registered rule, for traces and listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    FixedTable,
    Predicate,
    ClosureFactory,
    AttributeMap,
}

impl RuleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::FixedTable => "fixed_table",
            RuleKind::Predicate => "predicate",
            RuleKind::ClosureFactory => "closure_factory",
            RuleKind::AttributeMap => "attribute_map",
        }
    }
}

/// Typing rule for calls to one intrinsic.
#[derive(Clone)]
pub enum TypingRule {
    /// Candidate signatures in declaration order.
    FixedTable(Vec<Signature>),
    Predicate(TypeResolver),
    ClosureFactory(ResolverFactory),
}

impl TypingRule {
    pub fn fixed(cases: impl IntoIterator<Item = Signature>) -> Self {
        TypingRule::FixedTable(cases.into_iter().collect())
    }

    pub fn predicate(
        resolver: impl Fn(&[Type]) -> ResolverResult + Send + Sync + 'static,
    ) -> Self {
        TypingRule::Predicate(Arc::new(resolver))
    }

    pub fn closure_factory(factory: impl Fn() -> TypeResolver + Send + Sync + 'static) -> Self {
        TypingRule::ClosureFactory(Arc::new(factory))
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            TypingRule::FixedTable(_) => RuleKind::FixedTable,
            TypingRule::Predicate(_) => RuleKind::Predicate,
            TypingRule::ClosureFactory(_) => RuleKind::ClosureFactory,
        }
    }

    /// Declared candidates, for fixed-table rules.
    pub fn cases(&self) -> Option<&[Signature]> {
        match self {
            TypingRule::FixedTable(cases) => Some(cases),
            _ => None,
        }
    }
}

impl fmt::Debug for TypingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypingRule::FixedTable(cases) => f.debug_tuple("FixedTable").field(cases).finish(),
            TypingRule::Predicate(_) => f.write_str("Predicate(..)"),
            TypingRule::ClosureFactory(_) => f.write_str("ClosureFactory(..)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Attribute maps
// ---------------------------------------------------------------------------

/// What a namespace member resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeEntry {
    Type(Type),
    /// A nested namespace.
    Namespace(NamespaceId),
}

impl AttributeEntry {
    pub fn to_type(&self) -> Type {
        match self {
            AttributeEntry::Type(ty) => ty.clone(),
            AttributeEntry::Namespace(id) => Type::Namespace(id.clone()),
        }
    }
}

/// Member table of one pseudo-namespace.
///
/// Names are matched exactly and case-sensitively. Declaring the same
/// member twice is recorded and rejected when the registry is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
    entries: BTreeMap<String, AttributeEntry>,
    duplicates: Vec<String>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: AttributeEntry) {
        let name = name.into();
        if self.entries.contains_key(&name) {
            self.duplicates.push(name);
            return;
        }
        self.entries.insert(name, entry);
    }

    pub fn with_type(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.insert(name, AttributeEntry::Type(ty));
        self
    }

    /// Member that is a reference to a callable intrinsic.
    pub fn with_function(self, name: impl Into<String>, id: IntrinsicId) -> Self {
        self.with_type(name, Type::Function(id))
    }

    pub fn with_namespace(mut self, name: impl Into<String>, id: NamespaceId) -> Self {
        self.insert(name, AttributeEntry::Namespace(id));
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttributeEntry> {
        self.entries.get(name)
    }

    /// Members in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn duplicates(&self) -> &[String] {
        &self.duplicates
    }
}
