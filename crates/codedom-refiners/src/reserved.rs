//! Reserved identifiers per target language
//!
//! Lookups ignore case: an identifier is escaped when it matches a keyword
//! in any casing.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::GenerationLanguage;

const CSHARP: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

const JAVA: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class",
    "const", "continue", "default", "do", "double", "else", "enum", "extends", "false",
    "final", "finally", "float", "for", "goto", "if", "implements", "import", "instanceof",
    "int", "interface", "long", "native", "new", "null", "package", "private", "protected",
    "public", "return", "short", "static", "strictfp", "super", "switch", "synchronized",
    "this", "throw", "throws", "transient", "true", "try", "void", "volatile", "while",
];

const TYPESCRIPT: &[&str] = &[
    "any", "as", "boolean", "break", "case", "catch", "class", "const", "constructor",
    "continue", "debugger", "declare", "default", "delete", "do", "else", "enum", "export",
    "extends", "false", "finally", "for", "from", "function", "get", "if", "implements",
    "import", "in", "instanceof", "interface", "let", "module", "new", "null", "number",
    "of", "package", "private", "protected", "public", "require", "return", "set", "static",
    "string", "super", "switch", "symbol", "this", "throw", "true", "try", "type", "typeof",
    "var", "void", "while", "with", "yield",
];

const GO: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedNames {
    names: BTreeSet<String>,
}

impl ReservedNames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|name| name.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn for_language(language: GenerationLanguage) -> Self {
        let keywords = match language {
            GenerationLanguage::CSharp => CSHARP,
            GenerationLanguage::Java => JAVA,
            GenerationLanguage::TypeScript => TYPESCRIPT,
            GenerationLanguage::Go => GO,
        };
        Self::new(keywords.iter().copied())
    }

    pub fn with_additional(mut self, names: &[String]) -> Self {
        self.names
            .extend(names.iter().map(|name| name.trim().to_lowercase()));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        let reserved = ReservedNames::for_language(GenerationLanguage::CSharp);
        assert!(reserved.contains("break"));
        assert!(reserved.contains("Break"));
        assert!(!reserved.contains("breaking"));
    }

    #[test]
    fn test_languages_have_distinct_keywords() {
        assert!(ReservedNames::for_language(GenerationLanguage::Go).contains("func"));
        assert!(!ReservedNames::for_language(GenerationLanguage::Java).contains("func"));
        assert!(ReservedNames::for_language(GenerationLanguage::TypeScript).contains("constructor"));
    }

    #[test]
    fn test_additional_names() {
        let reserved = ReservedNames::for_language(GenerationLanguage::Go)
            .with_additional(&["Client".to_string()]);
        assert!(reserved.contains("client"));
        assert_eq!(reserved.len(), GO.len() + 1);
    }
}
