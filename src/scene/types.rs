//! Type registry: type hierarchy, field declarations and assignability.

use crate::types::TypeName;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// Built-in type carried by every container node.
pub const NODE_TYPE: &str = "Node";

/// Injection annotation on a declared field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inject {
    /// Identifier of the matching policy that should fill this field
    pub policy: String,
    /// Tag argument, used by tag-matching policies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl Inject {
    pub fn new(policy: impl Into<String>) -> Self {
        Self {
            policy: policy.into(),
            tag: None,
        }
    }

    pub fn with_tag(policy: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            policy: policy.into(),
            tag: Some(tag.into()),
        }
    }
}

/// A field declared directly on a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: TypeName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inject: Option<Inject>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, declared_type: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            inject: None,
        }
    }

    pub fn injected(mut self, inject: Inject) -> Self {
        self.inject = Some(inject);
        self
    }
}

/// A type definition: its base type, implemented interfaces and declared fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDef {
    pub name: TypeName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<TypeName>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<TypeName>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDef>,
}

impl TypeDef {
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            base: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn extends(mut self, base: impl Into<TypeName>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<TypeName>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }
}

/// A field as seen from a concrete member type, with the type that declared it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredField {
    pub declared_by: TypeName,
    pub def: FieldDef,
}

/// Registry of known types
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: HashMap<TypeName, TypeDef>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a registry holding only the built-in node type
    pub fn new() -> Self {
        let mut types = HashMap::new();
        types.insert(TypeName::from(NODE_TYPE), TypeDef::new(NODE_TYPE));
        Self { types }
    }

    /// Register (or replace) a type definition
    pub fn register(&mut self, def: TypeDef) {
        self.types.insert(def.name.clone(), def);
    }

    pub fn get(&self, name: &TypeName) -> Option<&TypeDef> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &TypeName) -> bool {
        self.types.contains_key(name)
    }

    /// All registered definitions, sorted by name
    pub fn definitions(&self) -> Vec<&TypeDef> {
        let mut defs: Vec<&TypeDef> = self.types.values().collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Whether a value of type `from` can be stored in a field of type `to`.
    ///
    /// True when the names are equal or `to` is reachable from `from` through
    /// base types and interfaces. Unknown types are only assignable to themselves.
    pub fn is_assignable(&self, from: &TypeName, to: &TypeName) -> bool {
        if from == to {
            return true;
        }

        let mut seen: HashSet<&TypeName> = HashSet::new();
        let mut queue: VecDeque<&TypeName> = VecDeque::new();
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            let Some(def) = self.types.get(current) else {
                continue;
            };
            for parent in def.base.iter().chain(def.interfaces.iter()) {
                if parent == to {
                    return true;
                }
                queue.push_back(parent);
            }
        }

        false
    }

    /// Fields visible on `type_name`.
    ///
    /// With `include_inherited == false` only the fields declared directly on the
    /// type are returned. Otherwise the base chain is walked, most-derived first;
    /// a base field shadowed by a same-named field on a derived type is skipped.
    pub fn declared_fields(&self, type_name: &TypeName, include_inherited: bool) -> Vec<DeclaredField> {
        let mut fields = Vec::new();
        let mut seen: HashSet<&TypeName> = HashSet::new();
        let mut names: HashSet<&str> = HashSet::new();
        let mut current = self.types.get(type_name);

        while let Some(def) = current {
            if !seen.insert(&def.name) {
                break;
            }
            for field in &def.fields {
                if names.insert(field.name.as_str()) {
                    fields.push(DeclaredField {
                        declared_by: def.name.clone(),
                        def: field.clone(),
                    });
                }
            }
            if !include_inherited {
                break;
            }
            current = def.base.as_ref().and_then(|base| self.types.get(base));
        }

        fields
    }

    /// Look up a single field by name, following the base chain
    pub fn find_field(&self, type_name: &TypeName, field: &str) -> Option<DeclaredField> {
        self.declared_fields(type_name, true)
            .into_iter()
            .find(|declared| declared.def.name == field)
    }
}
