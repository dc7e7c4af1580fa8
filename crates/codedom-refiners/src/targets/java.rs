use codedom_core::ClassKind;

use super::{optional_passes, reserved_names};
use crate::config::GenerationConfiguration;
use crate::passes::{DefaultImport, EscapeStyle, UsingSpec};
use crate::pipeline::RefinerPass;

const ABSTRACTIONS_PACKAGE: &str = "com.microsoft.kiota";
const SERIALIZATION_PACKAGE: &str = "com.microsoft.kiota.serialization";

fn default_imports() -> Vec<DefaultImport> {
    let request_builders = [
        (ABSTRACTIONS_PACKAGE, "HttpCore"),
        (ABSTRACTIONS_PACKAGE, "HttpMethod"),
        (ABSTRACTIONS_PACKAGE, "RequestInfo"),
        (ABSTRACTIONS_PACKAGE, "ResponseHandler"),
        ("java.util.concurrent", "CompletableFuture"),
    ]
    .into_iter()
    .map(|(package, symbol)| {
        DefaultImport::for_kind(ClassKind::RequestBuilder, UsingSpec::symbol(package, symbol))
    });
    let models = [
        (SERIALIZATION_PACKAGE, "SerializationWriter"),
        (SERIALIZATION_PACKAGE, "ParseNode"),
        ("java.util", "Map"),
        ("java.util", "HashMap"),
    ]
    .into_iter()
    .map(|(package, symbol)| DefaultImport::for_kind(ClassKind::Model, UsingSpec::symbol(package, symbol)));
    request_builders.chain(models).collect()
}

pub(super) fn passes(config: &GenerationConfiguration) -> Vec<RefinerPass> {
    let (flatten, async_suffix) = optional_passes(config);
    let mut passes = vec![
        RefinerPass::AddDefaultImports {
            imports: default_imports(),
        },
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
            interface: "Parsable".to_string(),
            import: UsingSpec::symbol(SERIALIZATION_PACKAGE, "Parsable"),
        },
        RefinerPass::ReplaceBinaryByNativeType {
            type_name: "InputStream".to_string(),
            import: UsingSpec::symbol("java.io", "InputStream"),
        },
        RefinerPass::MakeEnumPropertiesNullable,
        RefinerPass::ReplaceReservedNames {
            reserved: reserved_names(config),
            escape: EscapeStyle::Suffix("_escaped".to_string()),
        },
        RefinerPass::AddConstructorsForDefaultValues {
            add_if_inherited: true,
        },
    ]);
    passes
}
