//! The intrinsic registry.
//!
//! A [`RegistryBuilder`] collects typing rules, namespace attribute maps,
//! and global names during initialization. `build()` validates the whole
//! set and freezes it into a [`Registry`], which is never mutated again and
//! can be shared across compilation threads without locking.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use simt_types::{IntrinsicId, NamespaceId, Signature, Type};

use crate::error::{RegistryError, ResolveError};
use crate::resolve::Resolver;
use crate::rule::{AttributeMap, TypingRule};

/// Collects registrations before the registry is frozen.
///
/// Every identity may be registered once; a second registration is an
/// error rather than an overwrite.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    rules: BTreeMap<IntrinsicId, TypingRule>,
    attributes: BTreeMap<NamespaceId, AttributeMap>,
    globals: BTreeMap<String, Type>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_rule(&mut self, id: IntrinsicId, rule: TypingRule) -> Result<(), RegistryError> {
        match self.rules.entry(id) {
            Entry::Occupied(entry) => Err(RegistryError::DuplicateRule {
                id: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(rule);
                Ok(())
            }
        }
    }

    pub fn register_attributes(
        &mut self,
        id: NamespaceId,
        attributes: AttributeMap,
    ) -> Result<(), RegistryError> {
        if let Some(member) = attributes.duplicates().first() {
            return Err(RegistryError::DuplicateMember {
                namespace: id,
                member: member.clone(),
            });
        }
        match self.attributes.entry(id) {
            Entry::Occupied(entry) => Err(RegistryError::DuplicateNamespace {
                id: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(attributes);
                Ok(())
            }
        }
    }

    /// Bind a global name (e.g. `cuda`, `float32`) to its type.
    pub fn register_global(&mut self, name: impl Into<String>, ty: Type) -> Result<(), RegistryError> {
        match self.globals.entry(name.into()) {
            Entry::Occupied(entry) => Err(RegistryError::DuplicateGlobal {
                name: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(ty);
                Ok(())
            }
        }
    }

    /// Validate cross-references and freeze.
    ///
    /// Every `Function` or `Namespace` reachable from an attribute map or a
    /// global must name a registered rule or namespace.
    pub fn build(self) -> Result<Registry, RegistryError> {
        for (namespace, attributes) in &self.attributes {
            for (member, entry) in attributes.iter() {
                let referrer = format!("{namespace}.{member}");
                self.check_reference(&referrer, &entry.to_type())?;
            }
        }
        for (name, ty) in &self.globals {
            self.check_reference(name, ty)?;
        }

        tracing::debug!(
            target: "simt::registry",
            rules = self.rules.len(),
            namespaces = self.attributes.len(),
            globals = self.globals.len(),
            "intrinsic registry built"
        );

        Ok(Registry {
            rules: self.rules,
            attributes: self.attributes,
            globals: self.globals,
        })
    }

    fn check_reference(&self, referrer: &str, ty: &Type) -> Result<(), RegistryError> {
        match ty {
            Type::Function(target) if !self.rules.contains_key(target) => {
                Err(RegistryError::UnknownFunction {
                    referrer: referrer.to_string(),
                    target: target.clone(),
                })
            }
            Type::Namespace(target) if !self.attributes.contains_key(target) => {
                Err(RegistryError::UnknownNamespace {
                    referrer: referrer.to_string(),
                    target: target.clone(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Immutable mapping from intrinsic identity to typing rule, namespace
/// identity to attribute map, and global name to type.
#[derive(Debug)]
pub struct Registry {
    rules: BTreeMap<IntrinsicId, TypingRule>,
    attributes: BTreeMap<NamespaceId, AttributeMap>,
    globals: BTreeMap<String, Type>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn rule(&self, id: &IntrinsicId) -> Option<&TypingRule> {
        self.rules.get(id)
    }

    pub fn attributes(&self, id: &NamespaceId) -> Option<&AttributeMap> {
        self.attributes.get(id)
    }

    pub fn global(&self, name: &str) -> Option<&Type> {
        self.globals.get(name)
    }

    pub fn rules(&self) -> impl Iterator<Item = (&IntrinsicId, &TypingRule)> {
        self.rules.iter()
    }

    pub fn namespaces(&self) -> impl Iterator<Item = (&NamespaceId, &AttributeMap)> {
        self.attributes.iter()
    }

    pub fn globals(&self) -> impl Iterator<Item = (&str, &Type)> {
        self.globals.iter().map(|(name, ty)| (name.as_str(), ty))
    }

    /// Resolve a call without tracing. See [`Resolver::resolve_call`].
    pub fn resolve_call(
        &self,
        id: &IntrinsicId,
        args: &[Type],
        named: &BTreeMap<String, Type>,
    ) -> Result<Option<Signature>, ResolveError> {
        Resolver::new(self).resolve_call(id, args, named)
    }

    /// Resolve a namespace member without tracing.
    pub fn resolve_attribute(&self, namespace: &NamespaceId, member: &str) -> Option<Type> {
        Resolver::new(self).resolve_attribute(namespace, member)
    }

    pub fn resolve_global(&self, name: &str) -> Option<Type> {
        Resolver::new(self).resolve_global(name)
    }
}
