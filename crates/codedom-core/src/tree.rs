//! Arena-backed code model
//!
//! All elements live in one arena owned by [`CodeTree`]; parent links,
//! inheritance links and type references are [`ElementId`] handles into it.
//! Detaching an element never frees it, so a handle held by a pass stays
//! valid after the element is removed and re-added somewhere else.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::element::{
    ClassKind, CodeClass, CodeElement, CodeEnum, CodeMethod, CodeProperty, ElementId, ElementKind,
    MethodKind, NodeKind, ParameterKind, PropertyKind,
};
use crate::error::{CoreError, CoreResult};
use crate::types::{CodeUsing, TypeReference, TypeTarget};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeTree {
    elements: Vec<CodeElement>,
    root: ElementId,
}

impl Default for CodeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeTree {
    /// Create a tree holding only the unnamed root namespace
    pub fn new() -> Self {
        Self {
            elements: vec![CodeElement::namespace("")],
            root: ElementId(0),
        }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Number of elements ever allocated, attached or not
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn get(&self, id: ElementId) -> Option<&CodeElement> {
        self.elements.get(id.index())
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut CodeElement> {
        self.elements.get_mut(id.index())
    }

    pub fn element(&self, id: ElementId) -> CoreResult<&CodeElement> {
        self.get(id).ok_or_else(|| CoreError::missing("element"))
    }

    pub fn element_mut(&mut self, id: ElementId) -> CoreResult<&mut CodeElement> {
        self.get_mut(id).ok_or_else(|| CoreError::missing("element"))
    }

    pub fn name(&self, id: ElementId) -> Option<&str> {
        self.get(id).map(CodeElement::name)
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.get(id).and_then(CodeElement::parent)
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.get(id).map(CodeElement::children).unwrap_or(&[])
    }

    pub fn node_kind(&self, id: ElementId) -> Option<NodeKind> {
        self.get(id).map(CodeElement::node_kind)
    }

    pub fn class(&self, id: ElementId) -> Option<&CodeClass> {
        self.get(id).and_then(CodeElement::as_class)
    }

    pub fn class_mut(&mut self, id: ElementId) -> Option<&mut CodeClass> {
        self.get_mut(id).and_then(CodeElement::as_class_mut)
    }

    pub fn enumeration(&self, id: ElementId) -> Option<&CodeEnum> {
        self.get(id).and_then(CodeElement::as_enum)
    }

    pub fn method(&self, id: ElementId) -> Option<&CodeMethod> {
        self.get(id).and_then(CodeElement::as_method)
    }

    pub fn method_mut(&mut self, id: ElementId) -> Option<&mut CodeMethod> {
        self.get_mut(id).and_then(CodeElement::as_method_mut)
    }

    pub fn property(&self, id: ElementId) -> Option<&CodeProperty> {
        self.get(id).and_then(CodeElement::as_property)
    }

    pub fn property_mut(&mut self, id: ElementId) -> Option<&mut CodeProperty> {
        self.get_mut(id).and_then(CodeElement::as_property_mut)
    }

    /// Allocate a detached element. It joins the tree through one of the
    /// `add_*` operations.
    pub fn create(&mut self, element: CodeElement) -> CoreResult<ElementId> {
        if element.name.is_empty() {
            return Err(CoreError::empty("name"));
        }
        let mut element = element;
        element.parent = None;
        element.children.clear();
        Ok(self.push(element))
    }

    fn push(&mut self, element: CodeElement) -> ElementId {
        let id = ElementId(self.elements.len() as u32);
        self.elements.push(element);
        id
    }

    /// Add a namespace below `parent`, creating every missing segment of a
    /// dotted name. A name that repeats the parent's qualified name as a
    /// prefix is taken relative to the parent.
    pub fn add_namespace(&mut self, parent: ElementId, name: &str) -> CoreResult<ElementId> {
        if name.is_empty() {
            return Err(CoreError::empty("name"));
        }
        self.expect_kind(parent, NodeKind::Namespace, "parent")?;
        let relative = self.relative_path(parent, name).to_string();

        let mut current = parent;
        for segment in relative.split('.') {
            if segment.is_empty() {
                return Err(CoreError::empty("namespace segment"));
            }
            current = match self.direct_child(current, segment, NodeKind::Namespace) {
                Some(existing) => existing,
                None => {
                    let id = self.create(CodeElement::namespace(segment))?;
                    self.insert_children(current, &[id], &[NodeKind::Namespace], "namespace")?;
                    id
                }
            };
        }
        Ok(current)
    }

    pub fn add_classes(
        &mut self,
        namespace: ElementId,
        classes: &[ElementId],
    ) -> CoreResult<Vec<ElementId>> {
        self.expect_kind(namespace, NodeKind::Namespace, "namespace")?;
        self.insert_children(namespace, classes, &[NodeKind::Class], "classes")
    }

    pub fn add_enums(
        &mut self,
        namespace: ElementId,
        enums: &[ElementId],
    ) -> CoreResult<Vec<ElementId>> {
        self.expect_kind(namespace, NodeKind::Namespace, "namespace")?;
        self.insert_children(namespace, enums, &[NodeKind::Enum], "enums")
    }

    pub fn add_inner_classes(
        &mut self,
        class: ElementId,
        classes: &[ElementId],
    ) -> CoreResult<Vec<ElementId>> {
        self.expect_kind(class, NodeKind::Class, "class")?;
        self.insert_children(class, classes, &[NodeKind::Class], "classes")
    }

    pub fn add_properties(
        &mut self,
        class: ElementId,
        properties: &[ElementId],
    ) -> CoreResult<Vec<ElementId>> {
        self.expect_kind(class, NodeKind::Class, "class")?;
        self.insert_children(class, properties, &[NodeKind::Property], "properties")
    }

    pub fn add_methods(
        &mut self,
        class: ElementId,
        methods: &[ElementId],
    ) -> CoreResult<Vec<ElementId>> {
        self.expect_kind(class, NodeKind::Class, "class")?;
        self.insert_children(class, methods, &[NodeKind::Method], "methods")
    }

    pub fn add_parameters(
        &mut self,
        method: ElementId,
        parameters: &[ElementId],
    ) -> CoreResult<Vec<ElementId>> {
        self.expect_kind(method, NodeKind::Method, "method")?;
        self.insert_children(method, parameters, &[NodeKind::Parameter], "parameters")
    }

    /// Attach the single indexer of a class
    pub fn set_indexer(&mut self, class: ElementId, indexer: ElementId) -> CoreResult<ElementId> {
        self.expect_kind(class, NodeKind::Class, "class")?;
        self.insert_children(class, &[indexer], &[NodeKind::Indexer], "indexer")?;
        Ok(indexer)
    }

    pub fn add_class(&mut self, namespace: ElementId, class: CodeElement) -> CoreResult<ElementId> {
        let id = self.create(class)?;
        self.add_classes(namespace, &[id])?;
        Ok(id)
    }

    pub fn add_enum(&mut self, namespace: ElementId, value: CodeElement) -> CoreResult<ElementId> {
        let id = self.create(value)?;
        self.add_enums(namespace, &[id])?;
        Ok(id)
    }

    pub fn add_inner_class(&mut self, class: ElementId, inner: CodeElement) -> CoreResult<ElementId> {
        let id = self.create(inner)?;
        self.add_inner_classes(class, &[id])?;
        Ok(id)
    }

    pub fn add_property(&mut self, class: ElementId, property: CodeElement) -> CoreResult<ElementId> {
        let id = self.create(property)?;
        self.add_properties(class, &[id])?;
        Ok(id)
    }

    pub fn add_method(&mut self, class: ElementId, method: CodeElement) -> CoreResult<ElementId> {
        let id = self.create(method)?;
        self.add_methods(class, &[id])?;
        Ok(id)
    }

    pub fn add_parameter(&mut self, method: ElementId, parameter: CodeElement) -> CoreResult<ElementId> {
        let id = self.create(parameter)?;
        self.add_parameters(method, &[id])?;
        Ok(id)
    }

    /// Add imports to a class or namespace declaration block; returns how
    /// many were new
    pub fn add_usings(&mut self, target: ElementId, usings: Vec<CodeUsing>) -> CoreResult<usize> {
        if usings.is_empty() {
            return Err(CoreError::empty("usings"));
        }
        if usings.iter().any(|using| using.name.is_empty()) {
            return Err(CoreError::empty("using name"));
        }
        let element = self.get_mut(target).ok_or_else(|| CoreError::missing("target"))?;
        let name = element.name.clone();
        let added = match &mut element.kind {
            ElementKind::Class(class) => usings
                .into_iter()
                .map(|using| class.declaration.add_using(using))
                .filter(|added| *added)
                .count(),
            ElementKind::Namespace(namespace) => usings
                .into_iter()
                .map(|using| namespace.add_using(using))
                .filter(|added| *added)
                .count(),
            _ => {
                return Err(CoreError::InvalidOperation(format!(
                    "`{name}` has no declaration block to hold imports"
                )))
            }
        };
        Ok(added)
    }

    /// Detach `child` from `parent`. An absent child, or one that is not a
    /// child of `parent`, is a no-op.
    pub fn remove_child(&mut self, parent: ElementId, child: Option<ElementId>) -> bool {
        let Some(child) = child else {
            return false;
        };
        let Some(parent_element) = self.elements.get_mut(parent.index()) else {
            return false;
        };
        let Some(position) = parent_element.children.iter().position(|&c| c == child) else {
            return false;
        };
        parent_element.children.remove(position);
        self.elements[child.index()].parent = None;
        tracing::trace!("detached {} from {}", child, parent);
        true
    }

    /// First element of `kind` named `name` below `from`: direct children
    /// first, then each child's subtree in order. Namespaces accept a dotted
    /// path resolved segment by segment.
    pub fn find_child_by_name(
        &self,
        from: ElementId,
        name: &str,
        kind: NodeKind,
    ) -> CoreResult<Option<ElementId>> {
        if name.is_empty() {
            return Err(CoreError::empty("name"));
        }
        self.element(from)?;
        if kind == NodeKind::Namespace && name.contains('.') {
            return Ok(self.find_namespace_by_path(from, name));
        }
        Ok(self.find_first(from, name, kind))
    }

    /// Every element of `kind` named `name` in the subtree below `from`, in
    /// depth-first order
    pub fn find_children_by_name(
        &self,
        from: ElementId,
        name: &str,
        kind: NodeKind,
    ) -> CoreResult<Vec<ElementId>> {
        if name.is_empty() {
            return Err(CoreError::empty("name"));
        }
        self.element(from)?;
        let dotted = kind == NodeKind::Namespace && name.contains('.');
        Ok(self
            .descendants(from)
            .into_iter()
            .filter(|&id| {
                if dotted {
                    self.node_kind(id) == Some(NodeKind::Namespace)
                        && (self.qualified_name(id) == name
                            || self.find_namespace_by_path(from, name) == Some(id))
                } else {
                    self.matches(id, name, kind)
                }
            })
            .collect())
    }

    fn find_first(&self, from: ElementId, name: &str, kind: NodeKind) -> Option<ElementId> {
        let children = self.children(from);
        if let Some(found) = children.iter().copied().find(|&c| self.matches(c, name, kind)) {
            return Some(found);
        }
        children.iter().find_map(|&c| self.find_first(c, name, kind))
    }

    fn find_namespace_by_path(&self, from: ElementId, path: &str) -> Option<ElementId> {
        let relative = self.relative_path(from, path);
        let mut current = from;
        for segment in relative.split('.') {
            current = self.direct_child(current, segment, NodeKind::Namespace)?;
        }
        Some(current)
    }

    fn relative_path<'a>(&self, from: ElementId, path: &'a str) -> &'a str {
        let from_name = self.qualified_name(from);
        if from_name.is_empty() {
            return path;
        }
        path.strip_prefix(from_name.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(path)
    }

    fn matches(&self, id: ElementId, name: &str, kind: NodeKind) -> bool {
        self.get(id)
            .map(|element| element.node_kind() == kind && element.name == name)
            .unwrap_or(false)
    }

    fn direct_child(&self, parent: ElementId, name: &str, kind: NodeKind) -> Option<ElementId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&c| self.matches(c, name, kind))
    }

    /// Direct children of `parent` with the given kind, in insertion order
    pub fn children_of_kind(&self, parent: ElementId, kind: NodeKind) -> Vec<ElementId> {
        self.children(parent)
            .iter()
            .copied()
            .filter(|&c| self.node_kind(c) == Some(kind))
            .collect()
    }

    pub fn contains_member(&self, class: ElementId, name: &str) -> bool {
        self.children(class)
            .iter()
            .any(|&c| self.name(c) == Some(name))
    }

    pub fn indexer(&self, class: ElementId) -> Option<ElementId> {
        self.children_of_kind(class, NodeKind::Indexer).into_iter().next()
    }

    /// First parameter of `method` with the given kind
    pub fn parameter_of_kind(&self, method: ElementId, kind: ParameterKind) -> Option<ElementId> {
        self.children_of_kind(method, NodeKind::Parameter)
            .into_iter()
            .find(|&p| {
                self.get(p)
                    .and_then(CodeElement::as_parameter)
                    .map(|parameter| parameter.kind == kind)
                    .unwrap_or(false)
            })
    }

    /// Every element below `from` in depth-first pre-order
    pub fn descendants(&self, from: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(from).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Deep copy of the subtree rooted at `source`. The copy is detached;
    /// references between elements of the subtree are rebound to the copies.
    pub fn clone_subtree(&mut self, source: ElementId) -> CoreResult<ElementId> {
        self.element(source)?;
        if source == self.root {
            return Err(CoreError::InvalidOperation(
                "the root namespace cannot be cloned".to_string(),
            ));
        }
        let mut mapping = HashMap::new();
        let copy = self.copy_node(source, None, &mut mapping);
        for &new_id in mapping.values() {
            self.elements[new_id.index()].type_references_mut(&mut |ty| {
                if let TypeTarget::Declared(target) = ty.target {
                    if let Some(&mapped) = mapping.get(&target) {
                        ty.target = TypeTarget::Declared(mapped);
                    }
                }
            });
        }
        tracing::trace!("cloned {} into {} ({} elements)", source, copy, mapping.len());
        Ok(copy)
    }

    fn copy_node(
        &mut self,
        source: ElementId,
        parent: Option<ElementId>,
        mapping: &mut HashMap<ElementId, ElementId>,
    ) -> ElementId {
        let mut element = self.elements[source.index()].clone();
        let children = std::mem::take(&mut element.children);
        element.parent = parent;
        let id = self.push(element);
        mapping.insert(source, id);
        for child in children {
            let copy = self.copy_node(child, Some(id), mapping);
            self.elements[id.index()].children.push(copy);
        }
        id
    }

    /// Class named by the `inherits` slot of `class`
    pub fn parent_class(&self, class: ElementId) -> Option<ElementId> {
        self.class(class)?
            .declaration
            .inherits
            .as_ref()?
            .definition()
            .filter(|&id| self.class(id).is_some())
    }

    /// Top of the inheritance chain of `class`. A class without ancestors
    /// that is itself `stop_at` yields nothing; the walk also stops before
    /// revisiting `stop_at` or any class already seen.
    pub fn greatest_grandparent(
        &self,
        class: ElementId,
        stop_at: Option<ElementId>,
    ) -> Option<ElementId> {
        self.class(class)?;
        let mut current = class;
        let mut visited = HashSet::from([class]);
        loop {
            match self.parent_class(current) {
                None => {
                    return if Some(current) == stop_at {
                        None
                    } else {
                        Some(current)
                    }
                }
                Some(parent) if Some(parent) == stop_at || !visited.insert(parent) => {
                    return Some(current)
                }
                Some(parent) => current = parent,
            }
        }
    }

    /// Rename an element. Class declaration tokens and every type reference
    /// bound to a renamed class or enum follow the new name.
    pub fn set_name(&mut self, id: ElementId, name: impl Into<String>) -> CoreResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(CoreError::empty("name"));
        }
        if id == self.root {
            return Err(CoreError::InvalidOperation(
                "the root namespace cannot be renamed".to_string(),
            ));
        }
        let element = self.element_mut(id)?;
        let previous = std::mem::replace(&mut element.name, name.clone());
        if let ElementKind::Class(class) = &mut element.kind {
            class.declaration.token = name.clone();
        }
        let is_declaration = matches!(element.kind, ElementKind::Class(_) | ElementKind::Enum(_));
        let is_namespace = matches!(element.kind, ElementKind::Namespace(_));
        if is_declaration {
            self.for_each_type_reference_mut(|_, ty| {
                if ty.definition() == Some(id) {
                    ty.name = name.clone();
                }
            });
        }
        if is_declaration || is_namespace {
            self.rebind_usings(id);
        }
        tracing::trace!("renamed {} `{}` -> `{}`", id, previous, name);
        Ok(())
    }

    /// Name an import of `declaration` carries: the dotted name of its
    /// namespace, or the declaration's own name at the root
    pub fn import_name(&self, declaration: ElementId) -> String {
        let qualified = self
            .containing_namespace(declaration)
            .map(|namespace| self.qualified_name(namespace))
            .unwrap_or_default();
        if qualified.is_empty() {
            self.name(declaration).unwrap_or_default().to_string()
        } else {
            qualified
        }
    }

    /// Recompute the name of every import bound to `scope` or to a
    /// declaration below it. Returns how many imports changed.
    pub fn rebind_usings(&mut self, scope: ElementId) -> usize {
        let mut updates = Vec::new();
        for (index, element) in self.elements.iter().enumerate() {
            for (position, using) in element.usings().iter().enumerate() {
                let Some(target) = using.declaration.as_ref().and_then(TypeReference::definition) else {
                    continue;
                };
                let in_scope = target == scope || self.is_ancestor(scope, target);
                let is_declaration = matches!(
                    self.node_kind(target),
                    Some(NodeKind::Class) | Some(NodeKind::Enum)
                );
                if !in_scope || !is_declaration {
                    continue;
                }
                let name = self.import_name(target);
                if using.name != name {
                    updates.push((index, position, name));
                }
            }
        }

        let changed = updates.len();
        for (index, position, name) in updates {
            if let Some(using) = self.elements[index]
                .usings_mut()
                .and_then(|usings| usings.get_mut(position))
            {
                using.name = name;
            }
        }
        if changed > 0 {
            tracing::trace!("rebound {} import(s) below {}", changed, scope);
        }
        changed
    }

    /// Visit every type reference held anywhere in the arena
    pub fn for_each_type_reference_mut(
        &mut self,
        mut visit: impl FnMut(ElementId, &mut TypeReference),
    ) {
        for (index, element) in self.elements.iter_mut().enumerate() {
            let owner = ElementId(index as u32);
            element.type_references_mut(&mut |ty| visit(owner, ty));
        }
    }

    /// Nearest namespace strictly above `id`
    pub fn containing_namespace(&self, id: ElementId) -> Option<ElementId> {
        let mut current = self.parent(id);
        while let Some(candidate) = current {
            if self.node_kind(candidate) == Some(NodeKind::Namespace) {
                return Some(candidate);
            }
            current = self.parent(candidate);
        }
        None
    }

    /// `id` itself when it is a namespace, otherwise its containing namespace
    pub fn namespace_of(&self, id: ElementId) -> Option<ElementId> {
        match self.node_kind(id)? {
            NodeKind::Namespace => Some(id),
            _ => self.containing_namespace(id),
        }
    }

    /// Segment names from the root (exclusive) down to `namespace`
    pub fn namespace_segments(&self, namespace: ElementId) -> Vec<String> {
        let mut segments = Vec::new();
        let mut current = Some(namespace);
        while let Some(id) = current {
            if id == self.root {
                break;
            }
            if let Some(element) = self.get(id) {
                if element.node_kind() == NodeKind::Namespace {
                    segments.push(element.name.clone());
                }
            }
            current = self.parent(id);
        }
        segments.reverse();
        segments
    }

    /// Dotted name of the namespace holding `id` (or of `id` itself)
    pub fn qualified_name(&self, id: ElementId) -> String {
        self.namespace_of(id)
            .map(|namespace| self.namespace_segments(namespace).join("."))
            .unwrap_or_default()
    }

    /// Whether `id` is reachable from the root through parent links
    pub fn is_attached(&self, id: ElementId) -> bool {
        id == self.root || self.is_ancestor(self.root, id)
    }

    /// Whether `ancestor` is strictly above `id`
    pub fn is_ancestor(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut current = self.parent(id);
        while let Some(candidate) = current {
            if candidate == ancestor {
                return true;
            }
            current = self.parent(candidate);
        }
        false
    }

    /// Check that every reference held by an attached element is bound to a
    /// live, attached class or enum
    pub fn validate_references(&self) -> CoreResult<()> {
        for id in self.descendants(self.root) {
            let mut dangling: Option<String> = None;
            let mut element = self.elements[id.index()].clone();
            element.type_references_mut(&mut |ty| {
                if let Some(target) = ty.definition() {
                    let bound = self.is_attached(target)
                        && matches!(
                            self.node_kind(target),
                            Some(NodeKind::Class) | Some(NodeKind::Enum)
                        );
                    if !bound && dangling.is_none() {
                        dangling = Some(ty.name.clone());
                    }
                }
            });
            if let Some(name) = dangling {
                return Err(CoreError::UnresolvedReference(format!(
                    "`{}` references `{}` which is not declared in the tree",
                    element.name, name
                )));
            }
        }
        Ok(())
    }

    /// Serialize the arena for the emission layer or for inspection
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    fn expect_kind(&self, id: ElementId, kind: NodeKind, argument: &'static str) -> CoreResult<()> {
        let element = self.get(id).ok_or_else(|| CoreError::missing(argument))?;
        if element.node_kind() != kind {
            return Err(CoreError::InvalidOperation(format!(
                "`{}` is a {:?}, expected a {:?}",
                element.name,
                element.node_kind(),
                kind
            )));
        }
        Ok(())
    }

    /// Validate the whole batch before committing any of it
    fn insert_children(
        &mut self,
        parent: ElementId,
        children: &[ElementId],
        accepted: &[NodeKind],
        argument: &'static str,
    ) -> CoreResult<Vec<ElementId>> {
        if children.is_empty() {
            return Err(CoreError::empty(argument));
        }
        let parent_name = self.element(parent)?.name.clone();
        for (position, &child) in children.iter().enumerate() {
            let element = self.get(child).ok_or_else(|| CoreError::missing(argument))?;
            let kind = element.node_kind();
            if !accepted.contains(&kind) {
                return Err(CoreError::InvalidOperation(format!(
                    "cannot add {:?} `{}` to `{}`",
                    kind, element.name, parent_name
                )));
            }
            if child == self.root || element.parent.is_some() {
                return Err(CoreError::InvalidOperation(format!(
                    "`{}` already belongs to another element, remove it first",
                    element.name
                )));
            }
            if child == parent || self.is_ancestor(child, parent) {
                return Err(CoreError::InvalidOperation(format!(
                    "`{}` cannot be added below itself",
                    element.name
                )));
            }
            if children[..position].contains(&child) {
                return Err(CoreError::InvalidOperation(format!(
                    "`{}` appears twice in the same insertion",
                    element.name
                )));
            }
            if kind == NodeKind::Indexer
                && (self.indexer(parent).is_some()
                    || children[..position]
                        .iter()
                        .any(|&c| self.node_kind(c) == Some(NodeKind::Indexer)))
            {
                return Err(CoreError::InvalidOperation(format!(
                    "`{}` already has an indexer, remove it first",
                    parent_name
                )));
            }
            let siblings = self.children(parent).iter().chain(&children[..position]);
            for &existing in siblings {
                if self.collides(existing, child) {
                    return Err(CoreError::InvalidOperation(format!(
                        "an element named `{}` already exists in `{}`",
                        element.name, parent_name
                    )));
                }
            }
        }

        for &child in children {
            self.elements[child.index()].parent = Some(parent);
            self.elements[parent.index()].children.push(child);
        }
        tracing::trace!("added {} element(s) to `{}`", children.len(), parent_name);
        Ok(children.to_vec())
    }

    /// Same-name siblings are rejected unless they are overloads with
    /// distinct signatures, or the request-builder property and indexer
    /// compatibility method pair
    fn collides(&self, existing: ElementId, incoming: ElementId) -> bool {
        let (Some(a), Some(b)) = (self.get(existing), self.get(incoming)) else {
            return false;
        };
        if a.name != b.name {
            return false;
        }
        match (&a.kind, &b.kind) {
            (ElementKind::Method(x), ElementKind::Method(y))
                if x.kind.is_overloadable() && y.kind.is_overloadable() =>
            {
                self.signature(existing) == self.signature(incoming)
            }
            (ElementKind::Property(p), ElementKind::Method(m))
            | (ElementKind::Method(m), ElementKind::Property(p)) => {
                !(p.kind == PropertyKind::RequestBuilder
                    && m.kind == MethodKind::IndexerBackwardCompatibility)
            }
            _ => true,
        }
    }

    fn signature(&self, method: ElementId) -> Vec<String> {
        self.children_of_kind(method, NodeKind::Parameter)
            .into_iter()
            .filter_map(|p| self.get(p).and_then(CodeElement::as_parameter))
            .map(|parameter| {
                let ty = &parameter.type_ref;
                if ty.is_collection {
                    format!("{}[]", ty.name)
                } else {
                    ty.name.clone()
                }
            })
            .collect()
    }

    /// Classes of the given kinds anywhere below `from`
    pub fn classes_of_kind(&self, from: ElementId, kinds: &[ClassKind]) -> Vec<ElementId> {
        self.descendants(from)
            .into_iter()
            .filter(|&id| self.class(id).map(|c| c.is_of_kind(kinds)).unwrap_or(false))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArgumentIssue;

    const CHILD_NAME: &str = "one.two.three";

    fn void() -> TypeReference {
        TypeReference::external("void")
    }

    #[test]
    fn test_add_namespace_builds_chain() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let deepest = tree.add_namespace(root, CHILD_NAME).unwrap();
        assert_eq!(tree.qualified_name(deepest), CHILD_NAME);
        assert_eq!(tree.name(deepest), Some("three"));

        let again = tree.add_namespace(root, "one.two.four").unwrap();
        let two = tree.find_child_by_name(root, "one.two", NodeKind::Namespace).unwrap().unwrap();
        assert_eq!(tree.children(two).len(), 2);
        assert_eq!(tree.parent(again), Some(two));
        assert_eq!(tree.children(root).len(), 1);
    }

    #[test]
    fn test_find_in_child_elements() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let child = tree.add_namespace(root, "child1").unwrap();
        let grand_child = tree.add_namespace(child, "child1.grandchild1").unwrap();
        assert_eq!(tree.parent(grand_child), Some(child));
        assert_eq!(
            tree.find_child_by_name(root, "child1.grandchild1", NodeKind::Namespace).unwrap(),
            Some(grand_child)
        );
        assert_eq!(tree.find_child_by_name(root, "child2", NodeKind::Namespace).unwrap(), None);
    }

    #[test]
    fn test_removes_elements() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let child = tree.add_namespace(root, CHILD_NAME).unwrap();
        let class1 = tree.create(CodeElement::class("class1", ClassKind::Custom)).unwrap();
        let class2 = tree.create(CodeElement::class("class2", ClassKind::Custom)).unwrap();
        let added = tree.add_classes(child, &[class1, class2]).unwrap();

        assert!(tree.remove_child(child, added.first().copied()));
        assert_eq!(tree.children(child), &[class2]);
        assert_eq!(tree.parent(class1), None);
        assert!(!tree.remove_child(child, None));
    }

    #[test]
    fn test_adds_using_to_namespace() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let child = tree.add_namespace(root, CHILD_NAME).unwrap();
        tree.add_usings(child, vec![CodeUsing::namespace("someNS")]).unwrap();
        let namespace = tree.get(child).unwrap().as_namespace().unwrap();
        assert_eq!(namespace.usings().len(), 1);
    }

    #[test]
    fn test_rejects_duplicated_elements() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let child = tree.add_namespace(root, CHILD_NAME).unwrap();
        tree.add_class(child, CodeElement::class("class1", ClassKind::Custom)).unwrap();
        let err = tree
            .add_enum(child, CodeElement::enumeration("class1", ["a"]))
            .unwrap_err();
        assert!(err.is_invalid_operation());
    }

    #[test]
    fn test_batch_insert_is_all_or_nothing() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let class = tree.add_class(root, CodeElement::class("class1", ClassKind::Model)).unwrap();
        let a = tree
            .create(CodeElement::property("a", PropertyKind::Custom, void()))
            .unwrap();
        let b = tree
            .create(CodeElement::property("a", PropertyKind::Custom, void()))
            .unwrap();
        assert!(tree.add_properties(class, &[a, b]).unwrap_err().is_invalid_operation());
        assert!(tree.children(class).is_empty());
        assert_eq!(tree.parent(a), None);
    }

    #[test]
    fn test_allows_overloads() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let child = tree.add_namespace(root, CHILD_NAME).unwrap();
        let class = tree.add_class(child, CodeElement::class("class1", ClassKind::Custom)).unwrap();
        let method = tree
            .create(CodeElement::method("method", MethodKind::RequestExecutor, void()))
            .unwrap();
        let overload = tree.clone_subtree(method).unwrap();
        tree.add_parameter(
            overload,
            CodeElement::parameter("param1", ParameterKind::Custom, TypeReference::external("string")),
        )
        .unwrap();
        tree.add_methods(class, &[method, overload]).unwrap();
        assert_eq!(tree.children(class).len(), 2);
    }

    #[test]
    fn test_rejects_overloads_with_same_signature() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let class = tree.add_class(root, CodeElement::class("class1", ClassKind::Custom)).unwrap();
        let method = tree
            .create(CodeElement::method("method", MethodKind::RequestExecutor, void()))
            .unwrap();
        let copy = tree.clone_subtree(method).unwrap();
        assert!(tree.add_methods(class, &[method, copy]).unwrap_err().is_invalid_operation());
    }

    #[test]
    fn test_allows_indexer_compatibility_method_with_property_name() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let child = tree.add_namespace(root, CHILD_NAME).unwrap();
        let class = tree.add_class(child, CodeElement::class("class1", ClassKind::Custom)).unwrap();
        tree.add_property(
            class,
            CodeElement::property("method", PropertyKind::RequestBuilder, void()),
        )
        .unwrap();
        tree.add_method(
            class,
            CodeElement::method("method", MethodKind::IndexerBackwardCompatibility, void()),
        )
        .unwrap();
        assert_eq!(tree.children(class).len(), 2);
    }

    #[test]
    fn test_custom_property_and_method_still_collide() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let class = tree.add_class(root, CodeElement::class("class1", ClassKind::Custom)).unwrap();
        tree.add_property(class, CodeElement::property("users", PropertyKind::Custom, void()))
            .unwrap();
        let err = tree
            .add_method(
                class,
                CodeElement::method("users", MethodKind::IndexerBackwardCompatibility, void()),
            )
            .unwrap_err();
        assert!(err.is_invalid_operation());
    }

    #[test]
    fn test_single_indexer() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let class = tree.add_class(root, CodeElement::class("users", ClassKind::RequestBuilder)).unwrap();
        let first = tree
            .create(CodeElement::indexer("indexer", TypeReference::external("string"), void()))
            .unwrap();
        tree.set_indexer(class, first).unwrap();
        let second = tree
            .create(CodeElement::indexer("indexer2", TypeReference::external("string"), void()))
            .unwrap();
        assert!(tree.set_indexer(class, second).unwrap_err().is_invalid_operation());
        assert_eq!(tree.indexer(class), Some(first));
    }

    #[test]
    fn test_add_rejects_empty_and_missing() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let class = tree.add_class(root, CodeElement::class("class1", ClassKind::Custom)).unwrap();
        let method = tree
            .add_method(class, CodeElement::method("method1", MethodKind::Custom, void()))
            .unwrap();

        let err = tree.add_parameters(method, &[]).unwrap_err();
        assert_eq!(err.argument_issue(), Some(ArgumentIssue::Empty));

        let dangling_id = ElementId(9_999);
        let err = tree.add_parameters(method, &[dangling_id]).unwrap_err();
        assert_eq!(err.argument_issue(), Some(ArgumentIssue::Missing));
    }

    #[test]
    fn test_find_rejects_empty_names() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let child = tree.add_namespace(root, CHILD_NAME).unwrap();
        assert!(tree
            .find_child_by_name(child, "", NodeKind::Class)
            .unwrap_err()
            .is_invalid_argument());
        assert!(tree
            .find_children_by_name(child, "", NodeKind::Class)
            .unwrap_err()
            .is_invalid_argument());
    }

    #[test]
    fn test_find_child_by_name_respects_kind() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let child = tree.add_namespace(root, CHILD_NAME).unwrap();
        let class1 = tree.add_class(child, CodeElement::class("class1", ClassKind::Custom)).unwrap();
        assert_eq!(tree.find_child_by_name(child, "class1", NodeKind::Class).unwrap(), Some(class1));
        assert_eq!(tree.find_child_by_name(child, "class2", NodeKind::Class).unwrap(), None);
        assert_eq!(tree.find_child_by_name(child, "class1", NodeKind::Enum).unwrap(), None);
        assert_eq!(tree.find_child_by_name(root, "class1", NodeKind::Class).unwrap(), Some(class1));
    }

    #[test]
    fn test_find_children_by_name_across_branches() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let child = tree.add_namespace(root, CHILD_NAME).unwrap();
        tree.add_class(child, CodeElement::class("class1", ClassKind::Custom)).unwrap();
        let sub_child = tree.add_namespace(child, &format!("{CHILD_NAME}.four")).unwrap();
        assert_eq!(tree.parent(sub_child), Some(child));
        tree.add_class(sub_child, CodeElement::class("class1", ClassKind::Custom)).unwrap();
        assert_eq!(tree.find_children_by_name(root, "class1", NodeKind::Class).unwrap().len(), 2);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let class = tree.add_class(root, CodeElement::class("class1", ClassKind::Custom)).unwrap();
        let method = tree
            .add_method(class, CodeElement::method("method1", MethodKind::Custom, void()))
            .unwrap();
        tree.add_parameter(
            method,
            CodeElement::parameter("param1", ParameterKind::Custom, TypeReference::external("string")),
        )
        .unwrap();

        let clone = tree.clone_subtree(method).unwrap();
        tree.add_parameter(
            clone,
            CodeElement::parameter("param2", ParameterKind::Custom, TypeReference::external("int")),
        )
        .unwrap();

        assert_eq!(tree.name(clone), tree.name(method));
        assert_eq!(tree.children_of_kind(method, NodeKind::Parameter).len(), 1);
        assert_eq!(tree.children_of_kind(clone, NodeKind::Parameter).len(), 2);
        let original_param = tree.children(method)[0];
        let cloned_param = tree.children(clone)[0];
        assert_ne!(original_param, cloned_param);
        assert_eq!(tree.name(original_param), tree.name(cloned_param));
        assert_eq!(tree.parent(clone), None);
    }

    #[test]
    fn test_clone_rebinds_internal_references() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let outer = tree.add_class(root, CodeElement::class("Outer", ClassKind::Model)).unwrap();
        let inner = tree.add_inner_class(outer, CodeElement::class("Inner", ClassKind::Model)).unwrap();
        tree.add_property(
            outer,
            CodeElement::property("inner", PropertyKind::Custom, TypeReference::declared("Inner", inner)),
        )
        .unwrap();

        let copy = tree.clone_subtree(outer).unwrap();
        let copied_inner = tree.children_of_kind(copy, NodeKind::Class)[0];
        let copied_property = tree.children_of_kind(copy, NodeKind::Property)[0];
        assert_eq!(
            tree.property(copied_property).unwrap().type_ref.definition(),
            Some(copied_inner)
        );
    }

    #[test]
    fn test_set_name_updates_token_and_references() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let target = tree.add_class(root, CodeElement::class("Message", ClassKind::Model)).unwrap();
        let holder = tree.add_class(root, CodeElement::class("Holder", ClassKind::Model)).unwrap();
        let property = tree
            .add_property(
                holder,
                CodeElement::property("message", PropertyKind::Custom, TypeReference::declared("Message", target)),
            )
            .unwrap();

        tree.set_name(target, "EmailMessage").unwrap();
        assert_eq!(tree.class(target).unwrap().declaration.token, "EmailMessage");
        assert_eq!(tree.property(property).unwrap().type_ref.name, "EmailMessage");
        assert_eq!(tree.property(property).unwrap().type_ref.definition(), Some(target));
        assert!(tree.set_name(target, "").unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_namespace_rename_rebinds_imports() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let graph = tree.add_namespace(root, "graph").unwrap();
        let messages = tree.add_namespace(graph, "graph.messages").unwrap();
        let message = tree.add_class(messages, CodeElement::class("Message", ClassKind::Model)).unwrap();
        let user = tree.add_class(graph, CodeElement::class("User", ClassKind::Model)).unwrap();
        tree.add_usings(
            user,
            vec![
                CodeUsing::symbol("graph.messages", TypeReference::declared("Message", message)),
                CodeUsing::namespace("System"),
            ],
        )
        .unwrap();

        tree.set_name(graph, "Graph").unwrap();
        tree.set_name(messages, "Messages").unwrap();
        let usings = tree.class(user).unwrap().declaration.usings();
        assert_eq!(usings[0].name, "Graph.Messages");
        assert_eq!(usings[0].name, tree.import_name(message));
        assert_eq!(usings[1].name, "System");
    }

    #[test]
    fn test_root_declaration_rename_rebinds_imports() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let message = tree.add_class(root, CodeElement::class("Message", ClassKind::Model)).unwrap();
        let user = tree.add_class(root, CodeElement::class("User", ClassKind::Model)).unwrap();
        tree.add_usings(
            user,
            vec![CodeUsing::symbol("Message", TypeReference::declared("Message", message))],
        )
        .unwrap();

        tree.set_name(message, "Message_escaped").unwrap();
        let using = &tree.class(user).unwrap().declaration.usings()[0];
        assert_eq!(using.name, "Message_escaped");
        assert_eq!(using.declaration.as_ref().unwrap().name, "Message_escaped");
    }

    #[test]
    fn test_greatest_grandparent() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let base = tree.add_class(root, CodeElement::class("Entity", ClassKind::Model)).unwrap();
        let middle = tree
            .add_class(
                root,
                CodeElement::class("DirectoryObject", ClassKind::Model)
                    .inheriting(TypeReference::declared("Entity", base)),
            )
            .unwrap();
        let leaf = tree
            .add_class(
                root,
                CodeElement::class("User", ClassKind::Model)
                    .inheriting(TypeReference::declared("DirectoryObject", middle)),
            )
            .unwrap();

        assert_eq!(tree.parent_class(leaf), Some(middle));
        assert_eq!(tree.greatest_grandparent(leaf, None), Some(base));
        assert_eq!(tree.greatest_grandparent(leaf, Some(leaf)), Some(base));
        assert_eq!(tree.greatest_grandparent(base, Some(base)), None);
        assert_eq!(tree.greatest_grandparent(base, None), Some(base));
        assert_eq!(tree.greatest_grandparent(leaf, Some(base)), Some(middle));
    }

    #[test]
    fn test_validate_references_detects_detached_targets() {
        let mut tree = CodeTree::new();
        let root = tree.root();
        let detached = tree.create(CodeElement::class("Ghost", ClassKind::Model)).unwrap();
        let holder = tree.add_class(root, CodeElement::class("Holder", ClassKind::Model)).unwrap();
        tree.add_property(
            holder,
            CodeElement::property("ghost", PropertyKind::Custom, TypeReference::declared("Ghost", detached)),
        )
        .unwrap();
        assert!(matches!(
            tree.validate_references(),
            Err(CoreError::UnresolvedReference(_))
        ));
        tree.add_classes(root, &[detached]).unwrap();
        assert!(tree.validate_references().is_ok());
    }
}
