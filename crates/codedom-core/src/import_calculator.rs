//! Relative import path calculation between namespaces of one tree
//!
//! Paths are derived from namespace segments only and are lowercased, so
//! the casing of declarations never leaks into an import path.

use crate::element::{ElementId, NodeKind};
use crate::error::{CoreError, CoreResult};
use crate::tree::CodeTree;

/// Relative path from a file in namespace `from` to the declaration `name`
/// living in namespace `to`
///
/// # Examples
/// ```
/// use codedom_core::import_calculator::relative_import_path;
/// let graph = vec!["graph".to_string()];
/// let messages = vec!["graph".to_string(), "messages".to_string()];
/// assert_eq!(relative_import_path(&graph, &messages, "Message"), "./messages/message");
/// assert_eq!(relative_import_path(&graph, &graph, "Message"), "./message");
/// ```
pub fn relative_import_path(from: &[String], to: &[String], name: &str) -> String {
    let name = name.to_lowercase();
    let common = from
        .iter()
        .zip(to)
        .take_while(|(a, b)| a == b)
        .count();
    let remaining = to[common..]
        .iter()
        .map(|segment| segment.to_lowercase())
        .collect::<Vec<_>>()
        .join("/");

    let path = if common == from.len() {
        if remaining.is_empty() {
            format!("./{}", name)
        } else {
            format!("./{}/{}", remaining, name)
        }
    } else {
        let up = "../".repeat(from.len() - common);
        if remaining.is_empty() {
            format!("{}{}", up, name)
        } else {
            format!("{}{}/{}", up, remaining, name)
        }
    };
    tracing::trace!(
        "import path {} -> {}.{} = {}",
        from.join("."),
        to.join("."),
        name,
        path
    );
    path
}

/// Import path resolution over a tree
#[derive(Debug, Clone, Copy)]
pub struct ImportPathCalculator<'a> {
    tree: &'a CodeTree,
}

impl<'a> ImportPathCalculator<'a> {
    pub fn new(tree: &'a CodeTree) -> Self {
        Self { tree }
    }

    /// Path from the namespace holding `from` to the declaration `target`
    pub fn calculate(&self, from: ElementId, target: ElementId) -> CoreResult<String> {
        let from_namespace = self
            .tree
            .namespace_of(from)
            .ok_or_else(|| CoreError::missing("from"))?;
        let declaration = self.tree.element(target)?;
        if !matches!(declaration.node_kind(), NodeKind::Class | NodeKind::Enum) {
            return Err(CoreError::InvalidOperation(format!(
                "`{}` is not a class or enum and cannot be imported",
                declaration.name()
            )));
        }
        let target_namespace = self.tree.containing_namespace(target).ok_or_else(|| {
            CoreError::UnresolvedReference(format!(
                "`{}` is not attached to a namespace",
                declaration.name()
            ))
        })?;

        Ok(relative_import_path(
            &self.tree.namespace_segments(from_namespace),
            &self.tree.namespace_segments(target_namespace),
            declaration.name(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ClassKind, CodeElement};

    fn segments(path: &str) -> Vec<String> {
        if path.is_empty() {
            return Vec::new();
        }
        path.split('.').map(str::to_string).collect()
    }

    #[test]
    fn test_child_namespace() {
        assert_eq!(
            relative_import_path(&segments("graph"), &segments("graph.messages"), "Message"),
            "./messages/message"
        );
    }

    #[test]
    fn test_sibling_namespace() {
        assert_eq!(
            relative_import_path(&segments("graph"), &segments("messages"), "Message"),
            "../messages/message"
        );
    }

    #[test]
    fn test_same_namespace() {
        assert_eq!(
            relative_import_path(&segments("graph"), &segments("graph"), "Message"),
            "./message"
        );
    }

    #[test]
    fn test_parent_namespace_collapses_empty_remainder() {
        assert_eq!(
            relative_import_path(&segments("graph.users.item"), &segments("graph"), "User"),
            "../../user"
        );
    }

    #[test]
    fn test_root_namespace() {
        assert_eq!(relative_import_path(&[], &[], "Client"), "./client");
        assert_eq!(
            relative_import_path(&[], &segments("Graph.Messages"), "Message"),
            "./graph/messages/message"
        );
    }

    #[test]
    fn test_calculate_over_tree() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let graph = tree.add_namespace(root, "graph").unwrap();
        let messages = tree.add_namespace(root, "graph.messages").unwrap();
        let user = tree.add_class(graph, CodeElement::class("User", ClassKind::Model)).unwrap();
        let message = tree.add_class(messages, CodeElement::class("Message", ClassKind::Model)).unwrap();

        let calculator = ImportPathCalculator::new(&tree);
        assert_eq!(calculator.calculate(user, message).unwrap(), "./messages/message");
        assert_eq!(calculator.calculate(message, user).unwrap(), "../user");
        assert!(calculator.calculate(user, graph).unwrap_err().is_invalid_operation());
    }
}
