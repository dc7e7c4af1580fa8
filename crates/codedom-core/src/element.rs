//! Element kinds of the code model
//!
//! Every node of a [`CodeTree`](crate::tree::CodeTree) is a [`CodeElement`]:
//! shared attributes (name, parent, description, children) plus one closed
//! [`ElementKind`] variant carrying the kind-specific data.

use serde::{Deserialize, Serialize};

use crate::types::{CodeUsing, TypeReference};

/// Stable handle of an element inside one tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub(crate) u32);

impl ElementId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Discriminant used by kind-restricted lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Namespace,
    Class,
    Enum,
    Method,
    Property,
    Parameter,
    Indexer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ClassKind {
    #[default]
    Custom,
    RequestBuilder,
    Model,
    QueryParameters,
}

impl ClassKind {
    pub fn is_of_kind(self, kinds: &[ClassKind]) -> bool {
        kinds.contains(&self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MethodKind {
    #[default]
    Custom,
    IndexerBackwardCompatibility,
    RequestExecutor,
    RequestGenerator,
    Serializer,
    Deserializer,
    Constructor,
    ClientConstructor,
}

impl MethodKind {
    pub fn is_of_kind(self, kinds: &[MethodKind]) -> bool {
        kinds.contains(&self)
    }

    /// Kinds that may share a name within one class when signatures differ
    pub fn is_overloadable(self) -> bool {
        matches!(
            self,
            MethodKind::RequestExecutor | MethodKind::RequestGenerator | MethodKind::Constructor
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PropertyKind {
    #[default]
    Custom,
    RequestBuilder,
    AdditionalData,
    SerializerFactory,
    /// Handle on the HTTP core the generated client talks through
    HttpCore,
}

impl PropertyKind {
    pub fn is_of_kind(self, kinds: &[PropertyKind]) -> bool {
        kinds.contains(&self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ParameterKind {
    #[default]
    Custom,
    QueryParameter,
    ResponseHandler,
    RequestBody,
    Serializer,
}

impl ParameterKind {
    pub fn is_of_kind(self, kinds: &[ParameterKind]) -> bool {
        kinds.contains(&self)
    }
}

/// Header of a class: inheritance, implemented interfaces and imports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDeclaration {
    /// Declared identifier, always equal to the owning class name
    pub token: String,
    pub inherits: Option<TypeReference>,
    implements: Vec<TypeReference>,
    usings: Vec<CodeUsing>,
}

impl ClassDeclaration {
    pub fn implements(&self) -> &[TypeReference] {
        &self.implements
    }

    pub fn implements_mut(&mut self) -> &mut Vec<TypeReference> {
        &mut self.implements
    }

    /// Add an implemented interface; returns false when already present
    pub fn add_implements(&mut self, interface: TypeReference) -> bool {
        let present = self.implements.iter().any(|existing| {
            existing.name == interface.name && existing.target == interface.target
        });
        if !present {
            self.implements.push(interface);
        }
        !present
    }

    pub fn usings(&self) -> &[CodeUsing] {
        &self.usings
    }

    pub fn usings_mut(&mut self) -> &mut Vec<CodeUsing> {
        &mut self.usings
    }

    /// Add an import; returns false when an equivalent import exists
    pub fn add_using(&mut self, using: CodeUsing) -> bool {
        add_unique_using(&mut self.usings, using)
    }
}

pub(crate) fn add_unique_using(usings: &mut Vec<CodeUsing>, using: CodeUsing) -> bool {
    if usings.iter().any(|existing| existing.same_import(&using)) {
        return false;
    }
    usings.push(using);
    true
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeNamespace {
    usings: Vec<CodeUsing>,
}

impl CodeNamespace {
    pub fn usings(&self) -> &[CodeUsing] {
        &self.usings
    }

    pub fn add_using(&mut self, using: CodeUsing) -> bool {
        add_unique_using(&mut self.usings, using)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeClass {
    pub kind: ClassKind,
    pub declaration: ClassDeclaration,
    /// Wire name of the schema this class models, when it differs from the name
    pub serialization_name: Option<String>,
}

impl CodeClass {
    pub fn is_of_kind(&self, kinds: &[ClassKind]) -> bool {
        self.kind.is_of_kind(kinds)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEnum {
    options: Vec<String>,
}

impl CodeEnum {
    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn add_option(&mut self, option: impl Into<String>) -> bool {
        let option = option.into();
        if option.is_empty() || self.options.contains(&option) {
            return false;
        }
        self.options.push(option);
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeMethod {
    pub kind: MethodKind,
    pub return_type: TypeReference,
    pub is_async: bool,
}

impl CodeMethod {
    pub fn is_of_kind(&self, kinds: &[MethodKind]) -> bool {
        self.kind.is_of_kind(kinds)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeProperty {
    pub kind: PropertyKind,
    pub type_ref: TypeReference,
    /// Name used on the wire, independent of the in-code identifier
    pub serialization_name: Option<String>,
    pub default_value: Option<String>,
}

impl CodeProperty {
    pub fn is_of_kind(&self, kinds: &[PropertyKind]) -> bool {
        self.kind.is_of_kind(kinds)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeParameter {
    pub kind: ParameterKind,
    pub type_ref: TypeReference,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeIndexer {
    pub index_type: TypeReference,
    pub return_type: TypeReference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    Namespace(CodeNamespace),
    Class(CodeClass),
    Enum(CodeEnum),
    Method(CodeMethod),
    Property(CodeProperty),
    Parameter(CodeParameter),
    Indexer(CodeIndexer),
}

impl ElementKind {
    pub fn node_kind(&self) -> NodeKind {
        match self {
            ElementKind::Namespace(_) => NodeKind::Namespace,
            ElementKind::Class(_) => NodeKind::Class,
            ElementKind::Enum(_) => NodeKind::Enum,
            ElementKind::Method(_) => NodeKind::Method,
            ElementKind::Property(_) => NodeKind::Property,
            ElementKind::Parameter(_) => NodeKind::Parameter,
            ElementKind::Indexer(_) => NodeKind::Indexer,
        }
    }
}

/// One node of the code model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeElement {
    pub(crate) name: String,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,
    pub description: Option<String>,
    pub kind: ElementKind,
}

impl CodeElement {
    fn new(name: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            description: None,
            kind,
        }
    }

    pub fn namespace(name: impl Into<String>) -> Self {
        Self::new(name, ElementKind::Namespace(CodeNamespace::default()))
    }

    pub fn class(name: impl Into<String>, kind: ClassKind) -> Self {
        let name = name.into();
        let declaration = ClassDeclaration {
            token: name.clone(),
            ..ClassDeclaration::default()
        };
        Self::new(
            name,
            ElementKind::Class(CodeClass {
                kind,
                declaration,
                serialization_name: None,
            }),
        )
    }

    pub fn enumeration<I, S>(name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut data = CodeEnum::default();
        for option in options {
            data.add_option(option);
        }
        Self::new(name, ElementKind::Enum(data))
    }

    pub fn method(name: impl Into<String>, kind: MethodKind, return_type: TypeReference) -> Self {
        Self::new(
            name,
            ElementKind::Method(CodeMethod {
                kind,
                return_type,
                is_async: false,
            }),
        )
    }

    pub fn property(name: impl Into<String>, kind: PropertyKind, type_ref: TypeReference) -> Self {
        Self::new(
            name,
            ElementKind::Property(CodeProperty {
                kind,
                type_ref,
                serialization_name: None,
                default_value: None,
            }),
        )
    }

    pub fn parameter(name: impl Into<String>, kind: ParameterKind, type_ref: TypeReference) -> Self {
        Self::new(
            name,
            ElementKind::Parameter(CodeParameter {
                kind,
                type_ref,
                default_value: None,
            }),
        )
    }

    pub fn indexer(
        name: impl Into<String>,
        index_type: TypeReference,
        return_type: TypeReference,
    ) -> Self {
        Self::new(
            name,
            ElementKind::Indexer(CodeIndexer {
                index_type,
                return_type,
            }),
        )
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark a method as asynchronous; no effect on other kinds
    pub fn asynchronous(mut self) -> Self {
        if let ElementKind::Method(method) = &mut self.kind {
            method.is_async = true;
        }
        self
    }

    /// Set a property or parameter default value; no effect on other kinds
    pub fn with_default_value(mut self, value: impl Into<String>) -> Self {
        match &mut self.kind {
            ElementKind::Property(property) => property.default_value = Some(value.into()),
            ElementKind::Parameter(parameter) => parameter.default_value = Some(value.into()),
            _ => {}
        }
        self
    }

    /// Set the serialization name of a property or class
    pub fn with_serialization_name(mut self, value: impl Into<String>) -> Self {
        match &mut self.kind {
            ElementKind::Property(property) => property.serialization_name = Some(value.into()),
            ElementKind::Class(class) => class.serialization_name = Some(value.into()),
            _ => {}
        }
        self
    }

    /// Set the inherited type of a class
    pub fn inheriting(mut self, parent: TypeReference) -> Self {
        if let ElementKind::Class(class) = &mut self.kind {
            class.declaration.inherits = Some(parent);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn node_kind(&self) -> NodeKind {
        self.kind.node_kind()
    }

    pub fn as_namespace(&self) -> Option<&CodeNamespace> {
        match &self.kind {
            ElementKind::Namespace(namespace) => Some(namespace),
            _ => None,
        }
    }

    pub fn as_namespace_mut(&mut self) -> Option<&mut CodeNamespace> {
        match &mut self.kind {
            ElementKind::Namespace(namespace) => Some(namespace),
            _ => None,
        }
    }

    /// Imports of a class or namespace declaration block
    pub fn usings(&self) -> &[CodeUsing] {
        match &self.kind {
            ElementKind::Class(class) => class.declaration.usings(),
            ElementKind::Namespace(namespace) => namespace.usings(),
            _ => &[],
        }
    }

    pub(crate) fn usings_mut(&mut self) -> Option<&mut Vec<CodeUsing>> {
        match &mut self.kind {
            ElementKind::Class(class) => Some(class.declaration.usings_mut()),
            ElementKind::Namespace(namespace) => Some(&mut namespace.usings),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&CodeClass> {
        match &self.kind {
            ElementKind::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_class_mut(&mut self) -> Option<&mut CodeClass> {
        match &mut self.kind {
            ElementKind::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&CodeEnum> {
        match &self.kind {
            ElementKind::Enum(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&CodeMethod> {
        match &self.kind {
            ElementKind::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn as_method_mut(&mut self) -> Option<&mut CodeMethod> {
        match &mut self.kind {
            ElementKind::Method(method) => Some(method),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&CodeProperty> {
        match &self.kind {
            ElementKind::Property(property) => Some(property),
            _ => None,
        }
    }

    pub fn as_property_mut(&mut self) -> Option<&mut CodeProperty> {
        match &mut self.kind {
            ElementKind::Property(property) => Some(property),
            _ => None,
        }
    }

    pub fn as_parameter(&self) -> Option<&CodeParameter> {
        match &self.kind {
            ElementKind::Parameter(parameter) => Some(parameter),
            _ => None,
        }
    }

    pub fn as_parameter_mut(&mut self) -> Option<&mut CodeParameter> {
        match &mut self.kind {
            ElementKind::Parameter(parameter) => Some(parameter),
            _ => None,
        }
    }

    /// Visit every type reference this element owns, union members included
    pub fn type_references_mut(&mut self, visit: &mut dyn FnMut(&mut TypeReference)) {
        match &mut self.kind {
            ElementKind::Namespace(namespace) => {
                for using in &mut namespace.usings {
                    if let Some(declaration) = &mut using.declaration {
                        declaration.walk_mut(visit);
                    }
                }
            }
            ElementKind::Class(class) => {
                if let Some(inherits) = &mut class.declaration.inherits {
                    inherits.walk_mut(visit);
                }
                for interface in &mut class.declaration.implements {
                    interface.walk_mut(visit);
                }
                for using in &mut class.declaration.usings {
                    if let Some(declaration) = &mut using.declaration {
                        declaration.walk_mut(visit);
                    }
                }
            }
            ElementKind::Enum(_) => {}
            ElementKind::Method(method) => method.return_type.walk_mut(visit),
            ElementKind::Property(property) => property.type_ref.walk_mut(visit),
            ElementKind::Parameter(parameter) => parameter.type_ref.walk_mut(visit),
            ElementKind::Indexer(indexer) => {
                indexer.index_type.walk_mut(visit);
                indexer.return_type.walk_mut(visit);
            }
        }
    }

    /// The type reference naming this element's value, for properties,
    /// parameters and methods (return type)
    pub fn value_type(&self) -> Option<&TypeReference> {
        match &self.kind {
            ElementKind::Method(method) => Some(&method.return_type),
            ElementKind::Property(property) => Some(&property.type_ref),
            ElementKind::Parameter(parameter) => Some(&parameter.type_ref),
            ElementKind::Indexer(indexer) => Some(&indexer.return_type),
            _ => None,
        }
    }

    pub fn value_type_mut(&mut self) -> Option<&mut TypeReference> {
        match &mut self.kind {
            ElementKind::Method(method) => Some(&mut method.return_type),
            ElementKind::Property(property) => Some(&mut property.type_ref),
            ElementKind::Parameter(parameter) => Some(&mut parameter.type_ref),
            ElementKind::Indexer(indexer) => Some(&mut indexer.return_type),
            _ => None,
        }
    }
}
