//! Tree-mutating refiner passes
//!
//! Every pass is a full depth-first traversal driven by [`crawl`]. Passes
//! are free to insert, move and detach elements while they run.

mod constructors;
mod imports;
mod inheritance;
mod namespaces;
mod naming;
mod types;
mod unions;

use codedom_core::{CodeTree, CoreResult, ElementId};

pub use imports::{DefaultImport, UsingSpec};
pub use naming::EscapeStyle;
pub use types::{AdditionalDataCorrection, CoreTypeCorrections};

pub(crate) use constructors::add_constructors_for_default_values;
pub(crate) use imports::{
    add_default_imports, add_properties_and_methods_types_imports,
    replace_relative_imports_by_paths,
};
pub(crate) use inheritance::{add_inner_classes, add_parsable_inheritance, flatten_inheritance};
pub(crate) use namespaces::{
    capitalize_namespaces_first_letters, move_classes_with_namespace_names_under_namespace,
};
pub(crate) use naming::{
    add_async_suffix, disambiguate_properties_with_class_names, replace_reserved_names,
};
pub(crate) use types::{correct_core_types, make_enum_properties_nullable, replace_binary_by_native_type};
pub(crate) use unions::convert_union_types_to_wrapper;

/// Visit, parents first, every element attached below the root when the
/// crawl starts. Elements created during the crawl wait for the next pass;
/// elements detached during the crawl are skipped.
pub(crate) fn crawl<F>(tree: &mut CodeTree, mut visit: F) -> CoreResult<()>
where
    F: FnMut(&mut CodeTree, ElementId) -> CoreResult<()>,
{
    let root = tree.root();
    for id in tree.descendants(root) {
        if !tree.is_attached(id) {
            continue;
        }
        visit(tree, id)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use codedom_core::{ClassKind, CodeElement, NodeKind};

    #[test]
    fn test_crawl_skips_new_and_detached_elements() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let namespace = tree.add_namespace(root, "graph").unwrap();
        let first = tree.add_class(namespace, CodeElement::class("First", ClassKind::Model)).unwrap();
        let second = tree.add_class(namespace, CodeElement::class("Second", ClassKind::Model)).unwrap();

        let mut visited = Vec::new();
        crawl(&mut tree, |tree, id| {
            visited.push(id);
            if id == first {
                tree.remove_child(namespace, Some(second));
                tree.add_class(namespace, CodeElement::class("Third", ClassKind::Model))?;
            }
            Ok(())
        })
        .unwrap();

        assert_eq!(visited, vec![namespace, first]);
        assert_eq!(tree.children_of_kind(namespace, NodeKind::Class).len(), 2);
    }
}
