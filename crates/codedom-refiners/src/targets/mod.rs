//! Pass lists of each target language

mod csharp;
mod go;
mod java;
mod typescript;

use crate::config::{GenerationConfiguration, GenerationLanguage};
use crate::pipeline::RefinerPass;
use crate::reserved::ReservedNames;

pub(crate) fn passes_for(config: &GenerationConfiguration) -> Vec<RefinerPass> {
    match config.language {
        GenerationLanguage::CSharp => csharp::passes(config),
        GenerationLanguage::Java => java::passes(config),
        GenerationLanguage::TypeScript => typescript::passes(config),
        GenerationLanguage::Go => go::passes(config),
    }
}

fn reserved_names(config: &GenerationConfiguration) -> ReservedNames {
    ReservedNames::for_language(config.language).with_additional(&config.additional_reserved_names)
}

/// Passes that only run when an option asks for them
fn optional_passes(config: &GenerationConfiguration) -> (Option<RefinerPass>, Option<RefinerPass>) {
    let flatten = config
        .flattens_inheritance()
        .then_some(RefinerPass::FlattenInheritance);
    let suffix = (!config.uses_native_async()).then(|| RefinerPass::AddAsyncSuffix {
        suffix: "Async".to_string(),
    });
    (flatten, suffix)
}
