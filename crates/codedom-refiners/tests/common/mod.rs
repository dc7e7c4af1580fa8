#![allow(dead_code)]

use codedom_core::{ClassKind, CodeElement, CodeTree, ElementId, TypeReference};
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Root namespace holding `graph`, which holds the class `parentClass`
pub fn graph_tree() -> (CodeTree, ElementId, ElementId) {
    let mut tree = CodeTree::new();
    let root = tree.root();
    let graph = tree.add_namespace(root, "graph").unwrap();
    let parent_class = tree
        .add_class(graph, CodeElement::class("parentClass", ClassKind::Custom))
        .unwrap();
    (tree, graph, parent_class)
}

/// Every import bound to a declaration names that declaration's current
/// namespace and never points inside the importing element
pub fn assert_imports_consistent(tree: &CodeTree) {
    for importer in tree.descendants(tree.root()) {
        let Some(element) = tree.get(importer) else {
            continue;
        };
        for using in element.usings() {
            let Some(target) = using.declaration.as_ref().and_then(TypeReference::definition) else {
                continue;
            };
            assert_eq!(
                using.name,
                tree.import_name(target),
                "import of {} held by {} is stale",
                target,
                importer
            );
            assert!(target != importer, "{} imports itself", importer);
            assert!(
                !tree.is_ancestor(importer, target),
                "{} imports its own nested declaration {}",
                importer,
                target
            );
        }
    }
}
