use std::collections::BTreeMap;

use codedom_core::ClassKind;

use super::{optional_passes, reserved_names};
use crate::config::GenerationConfiguration;
use crate::passes::{
    AdditionalDataCorrection, CoreTypeCorrections, DefaultImport, EscapeStyle, UsingSpec,
};
use crate::pipeline::RefinerPass;

const ABSTRACTIONS_MODULE: &str = "@microsoft/kiota-abstractions";

fn default_imports() -> Vec<DefaultImport> {
    let request_builders = ["HttpCore", "HttpMethod", "RequestInfo", "ResponseHandler"]
        .into_iter()
        .map(|symbol| {
            DefaultImport::for_kind(
                ClassKind::RequestBuilder,
                UsingSpec::symbol(ABSTRACTIONS_MODULE, symbol),
            )
        });
    let models = ["SerializationWriter", "ParseNode"]
        .into_iter()
        .map(|symbol| DefaultImport::for_kind(ClassKind::Model, UsingSpec::symbol(ABSTRACTIONS_MODULE, symbol)));
    request_builders.chain(models).collect()
}

fn core_type_corrections() -> CoreTypeCorrections {
    let renames = [
        ("IHttpCore", "HttpCore"),
        ("ISerializationWriterFactory", "SerializationWriterFactory"),
        ("ISerializationWriter", "SerializationWriter"),
        ("IParseNode", "ParseNode"),
        ("IResponseHandler", "ResponseHandler"),
        ("DateTimeOffset", "Date"),
        ("Stream", "ReadableStream"),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_string(), to.to_string()))
    .collect::<BTreeMap<_, _>>();

    CoreTypeCorrections {
        renames,
        additional_data: Some(AdditionalDataCorrection {
            type_name: "Map<string, unknown>".to_string(),
            default_value: "new Map<string, unknown>()".to_string(),
        }),
        deserializer_return: Some("Map<string, (item: {}, node: ParseNode) => void>".to_string()),
    }
}

pub(super) fn passes(config: &GenerationConfiguration) -> Vec<RefinerPass> {
    let (flatten, async_suffix) = optional_passes(config);
    let mut passes = vec![
        RefinerPass::AddDefaultImports {
            imports: default_imports(),
        },
        RefinerPass::ConvertUnionTypesToWrapper {
            use_inner_classes: false,
        },
    ];
    passes.extend(flatten);
    passes.push(RefinerPass::ReplaceReservedNames {
        reserved: reserved_names(config),
        escape: EscapeStyle::Suffix("_escaped".to_string()),
    });
    passes.push(RefinerPass::AddPropertiesAndMethodTypesImports {
        include_current_namespace: true,
    });
    passes.extend(async_suffix);
    passes.extend([
        RefinerPass::ReplaceRelativeImportsByPaths,
        RefinerPass::AddParsableInheritance {
            interface: "Parsable".to_string(),
            import: UsingSpec::symbol(ABSTRACTIONS_MODULE, "Parsable"),
        },
        RefinerPass::CorrectCoreTypes {
            corrections: core_type_corrections(),
        },
        RefinerPass::MakeEnumPropertiesNullable,
    ]);
    passes
}
