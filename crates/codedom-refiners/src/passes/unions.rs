//! Union type lowering
//!
//! A union-typed use site is retargeted to a synthesized wrapper model
//! holding one nullable property per member type. Targets with inner
//! classes nest the wrapper in the class owning the use site; others add
//! it next to that class in the namespace.

use std::collections::HashMap;

use codedom_core::naming::{to_first_character_lower_case, to_first_character_upper_case};
use codedom_core::{
    ClassKind, CodeElement, CodeTree, CoreError, CoreResult, ElementId, MethodKind, NodeKind,
    ParameterKind, PropertyKind, TypeReference, TypeTarget,
};

use super::crawl;

/// Wrappers created by one run, keyed by scope and member list
type Wrappers = HashMap<(ElementId, Vec<TypeReference>), ElementId>;

pub(crate) fn convert_union_types_to_wrapper(
    tree: &mut CodeTree,
    use_inner_classes: bool,
) -> CoreResult<()> {
    let mut wrappers = Wrappers::new();
    crawl(tree, |tree, id| {
        let element = tree.element(id)?;
        let owner = match element.node_kind() {
            NodeKind::Property | NodeKind::Method | NodeKind::Indexer => tree.parent(id),
            NodeKind::Parameter => tree.parent(id).and_then(|method| tree.parent(method)),
            _ => return Ok(()),
        };
        let Some(union) = element.value_type().filter(|ty| ty.is_union()).cloned() else {
            return Ok(());
        };
        let owner = owner
            .filter(|&candidate| tree.class(candidate).is_some())
            .ok_or_else(|| {
                CoreError::InvalidOperation(format!(
                    "union type `{}` is used outside of a class",
                    union.name
                ))
            })?;

        let wrapper = wrapper_class(tree, &mut wrappers, owner, &union, use_inner_classes)?;
        if let Some(ty) = tree.element_mut(id)?.value_type_mut() {
            *ty = wrapper;
        }
        Ok(())
    })
}

/// Reference to the wrapper class standing for `union`, created on first use.
/// Nested unions get wrappers of their own.
fn wrapper_class(
    tree: &mut CodeTree,
    wrappers: &mut Wrappers,
    owner: ElementId,
    union: &TypeReference,
    use_inner_classes: bool,
) -> CoreResult<TypeReference> {
    let scope = if use_inner_classes {
        owner
    } else {
        tree.containing_namespace(owner)
            .ok_or_else(|| CoreError::missing("namespace"))?
    };
    let key = (scope, union.union_members().to_vec());
    let class = match wrappers.get(&key) {
        Some(&existing) => existing,
        None => {
            let class = create_wrapper(tree, wrappers, owner, scope, union, use_inner_classes)?;
            wrappers.insert(key, class);
            class
        }
    };
    Ok(TypeReference {
        name: tree.element(class)?.name().to_string(),
        target: TypeTarget::Declared(class),
        is_nullable: union.is_nullable,
        is_collection: union.is_collection,
    })
}

fn create_wrapper(
    tree: &mut CodeTree,
    wrappers: &mut Wrappers,
    owner: ElementId,
    scope: ElementId,
    union: &TypeReference,
    use_inner_classes: bool,
) -> CoreResult<ElementId> {
    let mut slots: Vec<(String, TypeReference)> = Vec::new();
    for member in union.union_members() {
        let property_name = to_first_character_lower_case(&member.name);
        if slots.iter().any(|(name, _)| *name == property_name) {
            continue;
        }
        let mut ty = if member.is_union() {
            wrapper_class(tree, wrappers, owner, member, use_inner_classes)?
        } else {
            member.clone()
        };
        ty.is_nullable = true;
        slots.push((property_name, ty));
    }

    let name = available_name(tree, scope, &to_first_character_upper_case(&union.name));
    let member_names = union
        .union_members()
        .iter()
        .map(|member| member.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let class = tree.create(
        CodeElement::class(name.as_str(), ClassKind::Model)
            .with_description(format!("Union type wrapper for classes {}", member_names)),
    )?;

    let mut properties = Vec::with_capacity(slots.len());
    for (property_name, ty) in slots {
        let description = format!("Union type representation for type {}", ty.name);
        properties.push(tree.create(
            CodeElement::property(property_name, PropertyKind::Custom, ty).with_description(description),
        )?);
    }
    if !properties.is_empty() {
        tree.add_properties(class, &properties)?;
    }

    let serializer = tree.add_method(
        class,
        CodeElement::method("serialize", MethodKind::Serializer, TypeReference::external("void")),
    )?;
    tree.add_parameter(
        serializer,
        CodeElement::parameter(
            "writer",
            ParameterKind::Serializer,
            TypeReference::external("ISerializationWriter"),
        ),
    )?;
    tree.add_method(
        class,
        CodeElement::method(
            "getFieldDeserializers",
            MethodKind::Deserializer,
            TypeReference::external(format!("IDictionary<string, Action<{}, IParseNode>>", name)),
        ),
    )?;

    if use_inner_classes {
        tree.add_inner_classes(owner, &[class])?;
    } else {
        tree.add_classes(scope, &[class])?;
    }
    tracing::debug!("Created union wrapper {} with {} member(s)", name, properties.len());
    Ok(class)
}

/// `base`, or `baseWrapper`, `baseWrapper2`, ... when `scope` already holds
/// a member of that name
fn available_name(tree: &CodeTree, scope: ElementId, base: &str) -> String {
    if !tree.contains_member(scope, base) {
        return base.to_string();
    }
    let wrapper = format!("{}Wrapper", base);
    (1..)
        .map(|n| if n == 1 { wrapper.clone() } else { format!("{}{}", wrapper, n) })
        .find(|candidate| !tree.contains_member(scope, candidate))
        .unwrap_or(wrapper)
}
