//! Type references and import statements
//!
//! A [`TypeReference`] is a use-site value: it is owned by the property,
//! parameter, method or declaration block that mentions it, and it points at
//! its declaration through a non-owning [`ElementId`] handle. Handles stay
//! valid across renames and moves, so passes never re-resolve a reference by
//! name.

use serde::{Deserialize, Serialize};

use crate::element::ElementId;

/// What a type reference points at
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTarget {
    /// Primitive or external type known only by its name (`string`, `Stream`, ...)
    External,
    /// Bound link to a class or enum declared elsewhere in the same tree
    Declared(ElementId),
    /// Several alternative types; lowered to a wrapper class before emission
    Union(Vec<TypeReference>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeReference {
    /// Display name. For declared targets this mirrors the declaration's
    /// current name and is kept in sync by `CodeTree::set_name`.
    pub name: String,
    pub target: TypeTarget,
    pub is_nullable: bool,
    pub is_collection: bool,
}

impl TypeReference {
    pub fn external(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: TypeTarget::External,
            is_nullable: false,
            is_collection: false,
        }
    }

    pub fn declared(name: impl Into<String>, definition: ElementId) -> Self {
        Self {
            name: name.into(),
            target: TypeTarget::Declared(definition),
            is_nullable: false,
            is_collection: false,
        }
    }

    pub fn union(name: impl Into<String>, members: Vec<TypeReference>) -> Self {
        Self {
            name: name.into(),
            target: TypeTarget::Union(members),
            is_nullable: false,
            is_collection: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }

    pub fn collection(mut self) -> Self {
        self.is_collection = true;
        self
    }

    /// The declaration this reference is bound to, if any
    pub fn definition(&self) -> Option<ElementId> {
        match self.target {
            TypeTarget::Declared(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self.target, TypeTarget::External)
    }

    pub fn is_union(&self) -> bool {
        matches!(self.target, TypeTarget::Union(_))
    }

    /// Union members, empty for non-union references
    pub fn union_members(&self) -> &[TypeReference] {
        match &self.target {
            TypeTarget::Union(members) => members,
            _ => &[],
        }
    }

    /// Visit this reference and every nested union member
    pub fn walk_mut(&mut self, visit: &mut dyn FnMut(&mut TypeReference)) {
        visit(self);
        if let TypeTarget::Union(members) = &mut self.target {
            for member in members {
                member.walk_mut(visit);
            }
        }
    }

    /// Visit this reference and every nested union member
    pub fn walk(&self, visit: &mut dyn FnMut(&TypeReference)) {
        visit(self);
        if let TypeTarget::Union(members) = &self.target {
            for member in members {
                member.walk(visit);
            }
        }
    }
}

/// An import statement attached to a declaration block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeUsing {
    /// Namespace or module the import names (`System.IO`, `graph.messages`)
    pub name: String,
    /// The imported symbol, when the import targets one type
    pub declaration: Option<TypeReference>,
    /// Relative path to the imported declaration, once resolved
    pub path: Option<String>,
}

impl CodeUsing {
    pub fn namespace(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declaration: None,
            path: None,
        }
    }

    pub fn symbol(name: impl Into<String>, declaration: TypeReference) -> Self {
        Self {
            name: name.into(),
            declaration: Some(declaration),
            path: None,
        }
    }

    /// Two usings with the same key import the same thing
    pub fn same_import(&self, other: &CodeUsing) -> bool {
        if self.name != other.name {
            return false;
        }
        match (&self.declaration, &other.declaration) {
            (None, None) => true,
            (Some(a), Some(b)) => match (a.definition(), b.definition()) {
                (Some(x), Some(y)) => x == y,
                (None, None) => a.name == b.name,
                _ => false,
            },
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_reference_has_no_definition() {
        let ty = TypeReference::external("string").nullable();
        assert!(ty.is_external());
        assert!(ty.is_nullable);
        assert_eq!(ty.definition(), None);
    }

    #[test]
    fn test_walk_visits_union_members() {
        let mut ty = TypeReference::union(
            "StringOrNumber",
            vec![
                TypeReference::external("string"),
                TypeReference::external("number"),
            ],
        );
        let mut seen = Vec::new();
        ty.walk_mut(&mut |t| seen.push(t.name.clone()));
        assert_eq!(seen, vec!["StringOrNumber", "string", "number"]);
    }

    #[test]
    fn test_same_import_compares_symbols() {
        let a = CodeUsing::symbol("lib", TypeReference::external("HttpCore"));
        let b = CodeUsing::symbol("lib", TypeReference::external("HttpCore"));
        let c = CodeUsing::symbol("lib", TypeReference::external("Parsable"));
        assert!(a.same_import(&b));
        assert!(!a.same_import(&c));
        assert!(!a.same_import(&CodeUsing::namespace("lib")));
    }
}
