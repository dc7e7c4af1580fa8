use codedom_core::{ClassKind, CodeElement, CodeTree, CoreResult, MethodKind, NodeKind, TypeReference};

use super::crawl;

/// Synthesize a constructor for classes whose properties carry default
/// values, so emitters without field initializers can assign them
pub(crate) fn add_constructors_for_default_values(
    tree: &mut CodeTree,
    add_if_inherited: bool,
) -> CoreResult<()> {
    crawl(tree, |tree, id| {
        let Some(class) = tree.class(id) else {
            return Ok(());
        };
        if class.is_of_kind(&[ClassKind::QueryParameters])
            || (!add_if_inherited && class.declaration.inherits.is_some())
        {
            return Ok(());
        }
        let has_defaults = tree
            .children_of_kind(id, NodeKind::Property)
            .into_iter()
            .filter_map(|property| tree.property(property))
            .any(|property| property.default_value.as_deref().is_some_and(|value| !value.is_empty()));
        let has_constructor = tree
            .children_of_kind(id, NodeKind::Method)
            .into_iter()
            .filter_map(|method| tree.method(method))
            .any(|method| method.is_of_kind(&[MethodKind::Constructor, MethodKind::ClientConstructor]));
        if !has_defaults || has_constructor {
            return Ok(());
        }

        let description = format!(
            "Instantiates a new {} and sets the default values.",
            tree.element(id)?.name()
        );
        tree.add_method(
            id,
            CodeElement::method("constructor", MethodKind::Constructor, TypeReference::external("void"))
                .with_description(description),
        )?;
        Ok(())
    })
}
