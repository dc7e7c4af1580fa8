//! Ordered refiner passes and their execution
//!
//! A [`RefinerPipeline`] is the fixed pass list of one target language.
//! Passes run strictly one after another; a failing pass aborts the run
//! for that target and leaves its tree to be discarded.

use codedom_core::CodeTree;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{GenerationConfiguration, GenerationLanguage};
use crate::error::{RefinerError, RefinerResult};
use crate::passes::{self, CoreTypeCorrections, DefaultImport, EscapeStyle, UsingSpec};
use crate::reserved::ReservedNames;
use crate::targets;

/// One tree-wide transformation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefinerPass {
    /// Seed baseline imports on classes
    AddDefaultImports { imports: Vec<DefaultImport> },

    /// Move classes named like a child namespace into that namespace
    MoveClassesWithNamespaceNamesUnderNamespace,

    /// Replace union-typed use sites by wrapper classes
    ConvertUnionTypesToWrapper { use_inner_classes: bool },

    /// Copy ancestor properties into derived classes and drop inheritance
    FlattenInheritance,

    /// Import every in-tree declaration a class refers to
    AddPropertiesAndMethodTypesImports { include_current_namespace: bool },

    /// Suffix asynchronous method names
    AddAsyncSuffix { suffix: String },

    /// Nest query parameter classes in their request builders
    AddInnerClasses,

    /// Make model classes implement the serialization interface
    AddParsableInheritance { interface: String, import: UsingSpec },

    CapitalizeNamespacesFirstLetters,

    /// Map the `binary` primitive to the target's stream type
    ReplaceBinaryByNativeType { type_name: String, import: UsingSpec },

    MakeEnumPropertiesNullable,

    ReplaceReservedNames {
        reserved: ReservedNames,
        escape: EscapeStyle,
    },

    /// Rename properties that share the name of their class
    DisambiguatePropertiesWithClassNames { suffix: String },

    AddConstructorsForDefaultValues { add_if_inherited: bool },

    CorrectCoreTypes { corrections: CoreTypeCorrections },

    /// Resolve imports of in-tree declarations to relative paths
    ReplaceRelativeImportsByPaths,
}

impl RefinerPass {
    pub fn name(&self) -> &'static str {
        match self {
            RefinerPass::AddDefaultImports { .. } => "add_default_imports",
            RefinerPass::MoveClassesWithNamespaceNamesUnderNamespace => {
                "move_classes_with_namespace_names_under_namespace"
            }
            RefinerPass::ConvertUnionTypesToWrapper { .. } => "convert_union_types_to_wrapper",
            RefinerPass::FlattenInheritance => "flatten_inheritance",
            RefinerPass::AddPropertiesAndMethodTypesImports { .. } => {
                "add_properties_and_methods_types_imports"
            }
            RefinerPass::AddAsyncSuffix { .. } => "add_async_suffix",
            RefinerPass::AddInnerClasses => "add_inner_classes",
            RefinerPass::AddParsableInheritance { .. } => "add_parsable_inheritance",
            RefinerPass::CapitalizeNamespacesFirstLetters => "capitalize_namespaces_first_letters",
            RefinerPass::ReplaceBinaryByNativeType { .. } => "replace_binary_by_native_type",
            RefinerPass::MakeEnumPropertiesNullable => "make_enum_properties_nullable",
            RefinerPass::ReplaceReservedNames { .. } => "replace_reserved_names",
            RefinerPass::DisambiguatePropertiesWithClassNames { .. } => {
                "disambiguate_properties_with_class_names"
            }
            RefinerPass::AddConstructorsForDefaultValues { .. } => {
                "add_constructors_for_default_values"
            }
            RefinerPass::CorrectCoreTypes { .. } => "correct_core_types",
            RefinerPass::ReplaceRelativeImportsByPaths => "replace_relative_imports_by_paths",
        }
    }

    /// Run this pass over the whole tree
    pub fn apply(&self, tree: &mut CodeTree) -> codedom_core::CoreResult<()> {
        match self {
            RefinerPass::AddDefaultImports { imports } => passes::add_default_imports(tree, imports),
            RefinerPass::MoveClassesWithNamespaceNamesUnderNamespace => {
                passes::move_classes_with_namespace_names_under_namespace(tree)
            }
            RefinerPass::ConvertUnionTypesToWrapper { use_inner_classes } => {
                passes::convert_union_types_to_wrapper(tree, *use_inner_classes)
            }
            RefinerPass::FlattenInheritance => passes::flatten_inheritance(tree),
            RefinerPass::AddPropertiesAndMethodTypesImports {
                include_current_namespace,
            } => passes::add_properties_and_methods_types_imports(tree, *include_current_namespace),
            RefinerPass::AddAsyncSuffix { suffix } => passes::add_async_suffix(tree, suffix),
            RefinerPass::AddInnerClasses => passes::add_inner_classes(tree),
            RefinerPass::AddParsableInheritance { interface, import } => {
                passes::add_parsable_inheritance(tree, interface, import)
            }
            RefinerPass::CapitalizeNamespacesFirstLetters => {
                passes::capitalize_namespaces_first_letters(tree)
            }
            RefinerPass::ReplaceBinaryByNativeType { type_name, import } => {
                passes::replace_binary_by_native_type(tree, type_name, import)
            }
            RefinerPass::MakeEnumPropertiesNullable => passes::make_enum_properties_nullable(tree),
            RefinerPass::ReplaceReservedNames { reserved, escape } => {
                passes::replace_reserved_names(tree, reserved, escape)
            }
            RefinerPass::DisambiguatePropertiesWithClassNames { suffix } => {
                passes::disambiguate_properties_with_class_names(tree, suffix)
            }
            RefinerPass::AddConstructorsForDefaultValues { add_if_inherited } => {
                passes::add_constructors_for_default_values(tree, *add_if_inherited)
            }
            RefinerPass::CorrectCoreTypes { corrections } => {
                passes::correct_core_types(tree, corrections)
            }
            RefinerPass::ReplaceRelativeImportsByPaths => {
                passes::replace_relative_imports_by_paths(tree)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinerPipeline {
    pub language: GenerationLanguage,
    pub passes: Vec<RefinerPass>,
}

impl RefinerPipeline {
    pub fn new(language: GenerationLanguage, passes: Vec<RefinerPass>) -> Self {
        Self { language, passes }
    }

    /// The fixed pass list of the configured target
    pub fn for_configuration(config: &GenerationConfiguration) -> Self {
        Self::new(config.language, targets::passes_for(config))
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(RefinerPass::name).collect()
    }

    /// Apply every pass in order. The tree must be fully built with every
    /// reference bound to an attached declaration.
    pub fn run(&self, tree: &mut CodeTree) -> RefinerResult<()> {
        let span = tracing::info_span!("refine", language = %self.language, passes = self.passes.len());
        let _guard = span.enter();

        tree.validate_references()?;
        for pass in &self.passes {
            let pass_span = tracing::debug_span!("pass", name = pass.name());
            let _pass_guard = pass_span.enter();
            pass.apply(tree).map_err(|source| {
                tracing::warn!(error = %source, "pass {} failed", pass.name());
                RefinerError::PassFailed {
                    language: self.language,
                    pass: pass.name(),
                    source,
                }
            })?;
            tracing::trace!("pass {} complete", pass.name());
        }
        tracing::info!("refined {} element(s)", tree.element_count());
        Ok(())
    }
}

/// Refine one tree in place for the configured target
pub fn refine(config: &GenerationConfiguration, tree: &mut CodeTree) -> RefinerResult<()> {
    config.validate()?;
    RefinerPipeline::for_configuration(config).run(tree)
}

/// Outcome of one target in a multi-target run
#[derive(Debug)]
pub struct TargetOutput {
    pub language: GenerationLanguage,
    pub result: RefinerResult<CodeTree>,
}

/// Refine `source` for every configuration in parallel. Each target works
/// on its own deep copy; outputs come back in configuration order.
pub fn refine_targets(source: &CodeTree, configs: &[GenerationConfiguration]) -> Vec<TargetOutput> {
    configs
        .par_iter()
        .map(|config| {
            let mut tree = source.clone();
            let result = refine(config, &mut tree).map(|()| tree);
            if let Err(error) = &result {
                tracing::warn!(language = %config.language, %error, "target refinement failed");
            }
            TargetOutput {
                language: config.language,
                result,
            }
        })
        .collect()
}
