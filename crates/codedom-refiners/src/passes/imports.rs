use codedom_core::{
    ClassKind, CodeTree, CodeUsing, CoreResult, ElementId, ElementKind, ImportPathCalculator,
    NodeKind, TypeReference,
};
use serde::{Deserialize, Serialize};

use super::crawl;

/// An import a pass attaches to a declaration block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsingSpec {
    pub namespace: String,
    /// Imported symbol, for targets importing types one by one
    pub symbol: Option<String>,
}

impl UsingSpec {
    pub fn namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            symbol: None,
        }
    }

    pub fn symbol(namespace: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            symbol: Some(symbol.into()),
        }
    }

    pub fn to_using(&self) -> CodeUsing {
        match &self.symbol {
            Some(symbol) => {
                CodeUsing::symbol(self.namespace.clone(), TypeReference::external(symbol.clone()))
            }
            None => CodeUsing::namespace(self.namespace.clone()),
        }
    }
}

/// Baseline import for classes of the listed kinds; no kinds means every class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultImport {
    pub kinds: Vec<ClassKind>,
    pub import: UsingSpec,
}

impl DefaultImport {
    pub fn for_all(import: UsingSpec) -> Self {
        Self {
            kinds: Vec::new(),
            import,
        }
    }

    pub fn for_kind(kind: ClassKind, import: UsingSpec) -> Self {
        Self {
            kinds: vec![kind],
            import,
        }
    }

    fn applies_to(&self, kind: ClassKind) -> bool {
        self.kinds.is_empty() || kind.is_of_kind(&self.kinds)
    }
}

pub(crate) fn add_default_imports(tree: &mut CodeTree, imports: &[DefaultImport]) -> CoreResult<()> {
    crawl(tree, |tree, id| {
        let Some(class) = tree.class(id) else {
            return Ok(());
        };
        let usings: Vec<CodeUsing> = imports
            .iter()
            .filter(|default| default.applies_to(class.kind))
            .map(|default| default.import.to_using())
            .collect();
        if !usings.is_empty() {
            tree.add_usings(id, usings)?;
        }
        Ok(())
    })
}

/// Declarations referenced by a class header and its own members. Inner
/// classes are left to their own visit.
fn referenced_declarations(tree: &CodeTree, class: ElementId) -> Vec<ElementId> {
    let mut targets = Vec::new();
    let mut collect = |ty: &TypeReference| {
        ty.walk(&mut |t| {
            if let Some(target) = t.definition() {
                if !targets.contains(&target) {
                    targets.push(target);
                }
            }
        })
    };

    if let Some(data) = tree.class(class) {
        if let Some(inherits) = &data.declaration.inherits {
            collect(inherits);
        }
        for interface in data.declaration.implements() {
            collect(interface);
        }
    }
    for &member in tree.children(class) {
        let Some(element) = tree.get(member) else {
            continue;
        };
        match &element.kind {
            ElementKind::Class(_) => continue,
            ElementKind::Indexer(indexer) => {
                collect(&indexer.index_type);
                collect(&indexer.return_type);
            }
            _ => {
                if let Some(ty) = element.value_type() {
                    collect(ty);
                }
            }
        }
        if element.node_kind() == NodeKind::Method {
            for &parameter in element.children() {
                if let Some(ty) = tree.get(parameter).and_then(|p| p.value_type()) {
                    collect(ty);
                }
            }
        }
    }
    targets
}

pub(crate) fn add_properties_and_methods_types_imports(
    tree: &mut CodeTree,
    include_current_namespace: bool,
) -> CoreResult<()> {
    crawl(tree, |tree, id| {
        if tree.class(id).is_none() {
            return Ok(());
        }
        let class_namespace = tree.containing_namespace(id);
        let mut usings = Vec::new();
        for target in referenced_declarations(tree, id) {
            if target == id || tree.is_ancestor(id, target) {
                continue;
            }
            let target_namespace = tree.containing_namespace(target);
            if !include_current_namespace && target_namespace == class_namespace {
                continue;
            }
            let Some(name) = tree.name(target) else {
                continue;
            };
            usings.push(CodeUsing::symbol(
                tree.import_name(target),
                TypeReference::declared(name, target),
            ));
        }
        if !usings.is_empty() {
            let added = tree.add_usings(id, usings)?;
            tracing::trace!("added {} type import(s) to {}", added, id);
        }
        Ok(())
    })
}

pub(crate) fn replace_relative_imports_by_paths(tree: &mut CodeTree) -> CoreResult<()> {
    crawl(tree, |tree, id| {
        let Some(class) = tree.class(id) else {
            return Ok(());
        };
        let calculator = ImportPathCalculator::new(tree);
        let paths = class
            .declaration
            .usings()
            .iter()
            .map(|using| {
                using
                    .declaration
                    .as_ref()
                    .and_then(TypeReference::definition)
                    .map(|target| calculator.calculate(id, target))
                    .transpose()
            })
            .collect::<CoreResult<Vec<Option<String>>>>()?;

        if let Some(class) = tree.class_mut(id) {
            for (using, path) in class.declaration.usings_mut().iter_mut().zip(paths) {
                if path.is_some() {
                    using.path = path;
                }
            }
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use codedom_core::{CodeElement, PropertyKind};

    #[test]
    fn test_default_imports_by_kind() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let model = tree.add_class(root, CodeElement::class("User", ClassKind::Model)).unwrap();
        let builder = tree
            .add_class(root, CodeElement::class("UsersRequestBuilder", ClassKind::RequestBuilder))
            .unwrap();

        add_default_imports(
            &mut tree,
            &[
                DefaultImport::for_all(UsingSpec::namespace("System")),
                DefaultImport::for_kind(ClassKind::RequestBuilder, UsingSpec::namespace("System.IO")),
            ],
        )
        .unwrap();

        assert_eq!(tree.class(model).unwrap().declaration.usings().len(), 1);
        assert_eq!(tree.class(builder).unwrap().declaration.usings().len(), 2);
    }

    #[test]
    fn test_type_imports_skip_own_namespace_unless_asked() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let graph = tree.add_namespace(root, "graph").unwrap();
        let messages = tree.add_namespace(root, "graph.messages").unwrap();
        let user = tree.add_class(graph, CodeElement::class("User", ClassKind::Model)).unwrap();
        let manager = tree.add_class(graph, CodeElement::class("Manager", ClassKind::Model)).unwrap();
        let message = tree.add_class(messages, CodeElement::class("Message", ClassKind::Model)).unwrap();
        tree.add_property(
            user,
            CodeElement::property("message", PropertyKind::Custom, TypeReference::declared("Message", message)),
        )
        .unwrap();
        tree.add_property(
            user,
            CodeElement::property("manager", PropertyKind::Custom, TypeReference::declared("Manager", manager)),
        )
        .unwrap();

        let mut same_namespace = tree.clone();
        add_properties_and_methods_types_imports(&mut tree, false).unwrap();
        let usings = tree.class(user).unwrap().declaration.usings();
        assert_eq!(usings.len(), 1);
        assert_eq!(usings[0].name, "graph.messages");

        add_properties_and_methods_types_imports(&mut same_namespace, true).unwrap();
        assert_eq!(same_namespace.class(user).unwrap().declaration.usings().len(), 2);
    }

    #[test]
    fn test_inner_classes_are_not_imported() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let graph = tree.add_namespace(root, "graph").unwrap();
        let outer = tree.add_class(graph, CodeElement::class("Outer", ClassKind::Model)).unwrap();
        let inner = tree.add_inner_class(outer, CodeElement::class("Inner", ClassKind::Model)).unwrap();
        tree.add_property(
            outer,
            CodeElement::property("inner", PropertyKind::Custom, TypeReference::declared("Inner", inner)),
        )
        .unwrap();

        add_properties_and_methods_types_imports(&mut tree, true).unwrap();
        assert!(tree.class(outer).unwrap().declaration.usings().is_empty());
    }

    #[test]
    fn test_relative_paths_set_only_for_declared_usings() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let graph = tree.add_namespace(root, "graph").unwrap();
        let user = tree.add_class(graph, CodeElement::class("User", ClassKind::Model)).unwrap();
        let message = tree.add_class(graph, CodeElement::class("Message", ClassKind::Model)).unwrap();
        tree.add_usings(
            user,
            vec![
                CodeUsing::namespace("System"),
                CodeUsing::symbol("graph", TypeReference::declared("Message", message)),
            ],
        )
        .unwrap();

        replace_relative_imports_by_paths(&mut tree).unwrap();
        let usings = tree.class(user).unwrap().declaration.usings();
        assert_eq!(usings[0].path, None);
        assert_eq!(usings[1].path.as_deref(), Some("./message"));
    }
}
