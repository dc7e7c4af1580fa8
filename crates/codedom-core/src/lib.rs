//! Code model tree shared by the front-end, the refiners and the emitters

pub mod element;
pub mod error;
pub mod import_calculator;
pub mod naming;
pub mod tree;
pub mod types;

pub use element::{
    ClassKind, CodeElement, ElementId, ElementKind, MethodKind, NodeKind, ParameterKind,
    PropertyKind,
};
pub use error::{ArgumentIssue, CoreError, CoreResult};
pub use import_calculator::ImportPathCalculator;
pub use tree::CodeTree;
pub use types::{CodeUsing, TypeReference, TypeTarget};
