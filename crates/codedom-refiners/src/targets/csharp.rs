use codedom_core::ClassKind;

use super::{optional_passes, reserved_names};
use crate::config::GenerationConfiguration;
use crate::passes::{DefaultImport, EscapeStyle, UsingSpec};
use crate::pipeline::RefinerPass;

const SERIALIZATION_NAMESPACE: &str = "Microsoft.Kiota.Abstractions.Serialization";

fn default_imports() -> Vec<DefaultImport> {
    let for_classes = ["System", "System.Collections.Generic", "System.Linq"]
        .into_iter()
        .map(|namespace| DefaultImport::for_all(UsingSpec::namespace(namespace)));
    let for_request_builders = [
        "System.Threading.Tasks",
        "System.IO",
        "Microsoft.Kiota.Abstractions",
        SERIALIZATION_NAMESPACE,
    ]
    .into_iter()
    .map(|namespace| DefaultImport::for_kind(ClassKind::RequestBuilder, UsingSpec::namespace(namespace)));
    for_classes.chain(for_request_builders).collect()
}

pub(super) fn passes(config: &GenerationConfiguration) -> Vec<RefinerPass> {
    let (flatten, async_suffix) = optional_passes(config);
    let mut passes = vec![
        RefinerPass::AddDefaultImports {
            imports: default_imports(),
        },
        RefinerPass::MoveClassesWithNamespaceNamesUnderNamespace,
        RefinerPass::ConvertUnionTypesToWrapper {
            use_inner_classes: true,
        },
    ];
    passes.extend(flatten);
    passes.push(RefinerPass::AddInnerClasses);
    passes.push(RefinerPass::AddPropertiesAndMethodTypesImports {
        include_current_namespace: false,
    });
    passes.extend(async_suffix);
    passes.extend([
        RefinerPass::AddParsableInheritance {
            interface: "IParsable".to_string(),
            import: UsingSpec::namespace(SERIALIZATION_NAMESPACE),
        },
        RefinerPass::CapitalizeNamespacesFirstLetters,
        RefinerPass::ReplaceBinaryByNativeType {
            type_name: "Stream".to_string(),
            import: UsingSpec::namespace("System.IO"),
        },
        RefinerPass::MakeEnumPropertiesNullable,
        RefinerPass::ReplaceReservedNames {
            reserved: reserved_names(config),
            escape: EscapeStyle::AtPrefixCapitalized,
        },
        RefinerPass::DisambiguatePropertiesWithClassNames {
            suffix: "_prop".to_string(),
        },
        RefinerPass::AddConstructorsForDefaultValues {
            add_if_inherited: false,
        },
    ]);
    passes
}
