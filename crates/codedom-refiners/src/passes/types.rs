use std::collections::BTreeMap;

use codedom_core::{
    CodeTree, CoreResult, ElementKind, MethodKind, NodeKind, PropertyKind, TypeReference,
};
use serde::{Deserialize, Serialize};

use super::crawl;
use super::imports::UsingSpec;

const BINARY_TYPE: &str = "binary";

/// Replacement type for the additional data bag of models
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalDataCorrection {
    pub type_name: String,
    pub default_value: String,
}

/// Target-specific rewrites of the abstraction types named by the front-end
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreTypeCorrections {
    /// External type name -> target type name
    pub renames: BTreeMap<String, String>,
    pub additional_data: Option<AdditionalDataCorrection>,
    /// Return type of deserializer methods; `{}` stands for the owning class
    pub deserializer_return: Option<String>,
}

pub(crate) fn replace_binary_by_native_type(
    tree: &mut CodeTree,
    type_name: &str,
    import: &UsingSpec,
) -> CoreResult<()> {
    crawl(tree, |tree, id| {
        let holders = match tree.node_kind(id) {
            Some(NodeKind::Property) => vec![id],
            Some(NodeKind::Method) => {
                let mut holders = vec![id];
                holders.extend(tree.children_of_kind(id, NodeKind::Parameter));
                holders
            }
            _ => return Ok(()),
        };

        let mut replaced = false;
        for holder in holders {
            if let Some(ty) = tree.element_mut(holder)?.value_type_mut() {
                ty.walk_mut(&mut |ty| {
                    if ty.is_external() && ty.name == BINARY_TYPE {
                        ty.name = type_name.to_string();
                        replaced = true;
                    }
                });
            }
        }

        let owner = tree.parent(id).filter(|&parent| tree.class(parent).is_some());
        if let (true, Some(class)) = (replaced, owner) {
            tree.add_usings(class, vec![import.to_using()])?;
        }
        Ok(())
    })
}

pub(crate) fn make_enum_properties_nullable(tree: &mut CodeTree) -> CoreResult<()> {
    crawl(tree, |tree, id| {
        let is_enum = tree
            .property(id)
            .and_then(|property| property.type_ref.definition())
            .and_then(|target| tree.node_kind(target))
            == Some(NodeKind::Enum);
        if is_enum {
            if let Some(property) = tree.property_mut(id) {
                property.type_ref.is_nullable = true;
            }
        }
        Ok(())
    })
}

pub(crate) fn correct_core_types(
    tree: &mut CodeTree,
    corrections: &CoreTypeCorrections,
) -> CoreResult<()> {
    crawl(tree, |tree, id| {
        let owner_name = tree
            .parent(id)
            .and_then(|parent| tree.name(parent))
            .unwrap_or_default()
            .to_string();
        let element = tree.element_mut(id)?;
        match &mut element.kind {
            ElementKind::Property(property) if property.kind == PropertyKind::AdditionalData => {
                if let Some(correction) = &corrections.additional_data {
                    property.type_ref.name = correction.type_name.clone();
                    property.default_value = Some(correction.default_value.clone());
                }
            }
            ElementKind::Method(method) if method.kind == MethodKind::Deserializer => {
                if let Some(template) = &corrections.deserializer_return {
                    method.return_type = TypeReference::external(template.replace("{}", &owner_name));
                }
            }
            _ => {}
        }

        let mut rename = |ty: &mut TypeReference| {
            if !ty.is_external() {
                return;
            }
            if let Some(replacement) = corrections.renames.get(&ty.name) {
                ty.name = replacement.clone();
            }
        };
        if let Some(ty) = element.value_type_mut() {
            ty.walk_mut(&mut rename);
        }
        if let ElementKind::Indexer(indexer) = &mut element.kind {
            indexer.index_type.walk_mut(&mut rename);
        }
        Ok(())
    })
}
