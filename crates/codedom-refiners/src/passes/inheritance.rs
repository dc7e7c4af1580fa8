use std::collections::HashSet;

use codedom_core::{ClassKind, CodeTree, CoreResult, NodeKind, ParameterKind, TypeReference};

use super::crawl;
use super::imports::UsingSpec;

/// Every model class implements the serialization contract
pub(crate) fn add_parsable_inheritance(
    tree: &mut CodeTree,
    interface: &str,
    import: &UsingSpec,
) -> CoreResult<()> {
    crawl(tree, |tree, id| {
        let Some(class) = tree.class_mut(id) else {
            return Ok(());
        };
        if !class.is_of_kind(&[ClassKind::Model]) {
            return Ok(());
        }
        class
            .declaration
            .add_implements(TypeReference::external(interface));
        tree.add_usings(id, vec![import.to_using()])?;
        Ok(())
    })
}

/// Move query parameter classes used by request builders inside them
pub(crate) fn add_inner_classes(tree: &mut CodeTree) -> CoreResult<()> {
    crawl(tree, |tree, id| {
        let is_request_builder = tree
            .class(id)
            .map(|class| class.is_of_kind(&[ClassKind::RequestBuilder]))
            .unwrap_or(false);
        if !is_request_builder {
            return Ok(());
        }

        let mut hoisted = Vec::new();
        for method in tree.children_of_kind(id, NodeKind::Method) {
            let Some(parameter) = tree.parameter_of_kind(method, ParameterKind::QueryParameter) else {
                continue;
            };
            let Some(target) = tree
                .get(parameter)
                .and_then(|element| element.value_type())
                .and_then(TypeReference::definition)
            else {
                continue;
            };
            let is_query_parameters = tree
                .class(target)
                .map(|class| class.is_of_kind(&[ClassKind::QueryParameters]))
                .unwrap_or(false);
            let in_namespace = tree
                .parent(target)
                .and_then(|parent| tree.node_kind(parent))
                == Some(NodeKind::Namespace);
            if is_query_parameters && in_namespace && !hoisted.contains(&target) {
                hoisted.push(target);
            }
        }

        for class in hoisted {
            if let Some(namespace) = tree.parent(class) {
                tree.remove_child(namespace, Some(class));
            }
            tree.add_inner_classes(id, &[class])?;
            if let Some(builder) = tree.class_mut(id) {
                builder
                    .declaration
                    .usings_mut()
                    .retain(|using| using.declaration.as_ref().and_then(TypeReference::definition) != Some(class));
            }
            tree.rebind_usings(class);
            tracing::trace!("moved {} inside {}", class, id);
        }
        Ok(())
    })
}

/// Copy ancestor properties into each derived class and drop the
/// inheritance link
pub(crate) fn flatten_inheritance(tree: &mut CodeTree) -> CoreResult<()> {
    crawl(tree, |tree, id| {
        if tree.parent_class(id).is_none() {
            return Ok(());
        }
        let mut ancestors = Vec::new();
        let mut current = id;
        while let Some(parent) = tree.parent_class(current) {
            if parent == id || ancestors.contains(&parent) {
                break;
            }
            ancestors.push(parent);
            current = parent;
        }

        let mut names: HashSet<String> = tree
            .children(id)
            .iter()
            .filter_map(|&member| tree.name(member).map(str::to_string))
            .collect();
        let mut copies = Vec::new();
        for ancestor in ancestors {
            for property in tree.children_of_kind(ancestor, NodeKind::Property) {
                let Some(name) = tree.name(property).map(str::to_string) else {
                    continue;
                };
                if names.insert(name) {
                    copies.push(tree.clone_subtree(property)?);
                }
            }
        }
        if !copies.is_empty() {
            tree.add_properties(id, &copies)?;
        }
        if let Some(class) = tree.class_mut(id) {
            class.declaration.inherits = None;
        }
        tracing::debug!("Flattened {} inherited propert(ies) into {}", copies.len(), id);
        Ok(())
    })
}
