use codedom_core::naming::to_first_character_upper_case;
use codedom_core::{CodeTree, CoreResult, NodeKind};

use super::crawl;

/// A class named like a child namespace of its own namespace moves into
/// that namespace, so its imports never point back at themselves
pub(crate) fn move_classes_with_namespace_names_under_namespace(tree: &mut CodeTree) -> CoreResult<()> {
    crawl(tree, |tree, id| {
        if tree.node_kind(id) != Some(NodeKind::Class) {
            return Ok(());
        }
        let Some(parent) = tree
            .parent(id)
            .filter(|&parent| tree.node_kind(parent) == Some(NodeKind::Namespace))
        else {
            return Ok(());
        };
        let class_name = tree.element(id)?.name().to_string();
        let lowered = class_name.to_lowercase();
        let target = tree
            .children_of_kind(parent, NodeKind::Namespace)
            .into_iter()
            .find(|&namespace| {
                tree.name(namespace)
                    .map(|name| name.to_lowercase() == lowered)
                    .unwrap_or(false)
            });
        let Some(target) = target else {
            return Ok(());
        };

        tree.remove_child(parent, Some(id));
        tree.add_classes(target, &[id])?;
        tree.rebind_usings(id);
        tracing::debug!("Moved class {} under namespace {}", class_name, tree.qualified_name(target));
        Ok(())
    })
}

pub(crate) fn capitalize_namespaces_first_letters(tree: &mut CodeTree) -> CoreResult<()> {
    crawl(tree, |tree, id| {
        let element = tree.element(id)?;
        if element.node_kind() != NodeKind::Namespace {
            return Ok(());
        }
        let capitalized = to_first_character_upper_case(element.name());
        if capitalized != element.name() {
            tree.set_name(id, capitalized)?;
        }
        Ok(())
    })
}
