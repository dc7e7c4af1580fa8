use codedom_core::ClassKind;

use super::{optional_passes, reserved_names};
use crate::config::GenerationConfiguration;
use crate::passes::{DefaultImport, EscapeStyle, UsingSpec};
use crate::pipeline::RefinerPass;

const ABSTRACTIONS_MODULE: &str = "github.com/microsoft/kiota/abstractions/go";
const SERIALIZATION_MODULE: &str = "github.com/microsoft/kiota/abstractions/go/serialization";

pub(super) fn passes(config: &GenerationConfiguration) -> Vec<RefinerPass> {
    let (flatten, async_suffix) = optional_passes(config);
    let mut passes = vec![
        RefinerPass::AddDefaultImports {
            imports: vec![
                DefaultImport::for_kind(ClassKind::RequestBuilder, UsingSpec::namespace(ABSTRACTIONS_MODULE)),
                DefaultImport::for_kind(ClassKind::Model, UsingSpec::namespace(SERIALIZATION_MODULE)),
            ],
        },
        RefinerPass::ConvertUnionTypesToWrapper {
            use_inner_classes: false,
        },
    ];
    passes.extend(flatten);
    passes.push(RefinerPass::AddPropertiesAndMethodTypesImports {
        include_current_namespace: false,
    });
    passes.extend(async_suffix);
    passes.extend([
        RefinerPass::AddParsableInheritance {
            interface: "Parsable".to_string(),
            import: UsingSpec::symbol(SERIALIZATION_MODULE, "Parsable"),
        },
        RefinerPass::MakeEnumPropertiesNullable,
        RefinerPass::ReplaceReservedNames {
            reserved: reserved_names(config),
            escape: EscapeStyle::Suffix("Escaped".to_string()),
        },
        RefinerPass::AddConstructorsForDefaultValues {
            add_if_inherited: true,
        },
    ]);
    passes
}
