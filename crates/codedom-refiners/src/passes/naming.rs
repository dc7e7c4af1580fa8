use codedom_core::naming::to_first_character_upper_case;
use codedom_core::{CodeTree, CoreResult, ElementKind, MethodKind, NodeKind};
use serde::{Deserialize, Serialize};

use super::crawl;
use crate::reserved::ReservedNames;

/// How a reserved identifier is rewritten
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscapeStyle {
    /// `@` followed by the capitalized identifier (`break` -> `@Break`)
    AtPrefixCapitalized,
    /// Identifier followed by a fixed suffix (`break` -> `break_escaped`)
    Suffix(String),
}

impl EscapeStyle {
    pub fn apply(&self, name: &str) -> String {
        match self {
            EscapeStyle::AtPrefixCapitalized => format!("@{}", to_first_character_upper_case(name)),
            EscapeStyle::Suffix(suffix) => format!("{}{}", name, suffix),
        }
    }
}

pub(crate) fn add_async_suffix(tree: &mut CodeTree, suffix: &str) -> CoreResult<()> {
    crawl(tree, |tree, id| {
        let element = tree.element(id)?;
        let Some(method) = element.as_method() else {
            return Ok(());
        };
        if !method.is_async || element.name().ends_with(suffix) {
            return Ok(());
        }
        let renamed = format!("{}{}", element.name(), suffix);
        tree.set_name(id, renamed)
    })
}

pub(crate) fn replace_reserved_names(
    tree: &mut CodeTree,
    reserved: &ReservedNames,
    escape: &EscapeStyle,
) -> CoreResult<()> {
    crawl(tree, |tree, id| {
        let element = tree.element(id)?;
        let eligible = match &element.kind {
            ElementKind::Method(method) => {
                !method.is_of_kind(&[MethodKind::Constructor, MethodKind::ClientConstructor])
            }
            ElementKind::Indexer(_) => false,
            _ => true,
        };
        if !eligible || !reserved.contains(element.name()) {
            return Ok(());
        }
        let original = element.name().to_string();
        let escaped = escape.apply(&original);
        tree.set_name(id, escaped.as_str())?;

        match &mut tree.element_mut(id)?.kind {
            ElementKind::Class(class) => {
                class.serialization_name.get_or_insert_with(|| original.clone());
            }
            ElementKind::Property(property) => {
                property.serialization_name.get_or_insert_with(|| original.clone());
            }
            _ => {}
        }
        tracing::debug!("Escaped reserved name {} -> {}", original, escaped);
        Ok(())
    })
}

pub(crate) fn disambiguate_properties_with_class_names(
    tree: &mut CodeTree,
    suffix: &str,
) -> CoreResult<()> {
    crawl(tree, |tree, id| {
        if tree.node_kind(id) != Some(NodeKind::Class) {
            return Ok(());
        }
        let class_name = tree.element(id)?.name().to_string();
        let clashing = tree
            .children_of_kind(id, NodeKind::Property)
            .into_iter()
            .find(|&property| tree.name(property) == Some(class_name.as_str()));
        let Some(property) = clashing else {
            return Ok(());
        };

        tree.remove_child(id, Some(property));
        if let Some(data) = tree.property_mut(property) {
            data.serialization_name.get_or_insert_with(|| class_name.clone());
        }
        let renamed = format!("{}{}", class_name, suffix);
        tree.set_name(property, renamed.as_str())?;
        tree.add_properties(id, &[property])?;
        tracing::debug!("Renamed property {} -> {} in {}", class_name, renamed, class_name);
        Ok(())
    })
}
