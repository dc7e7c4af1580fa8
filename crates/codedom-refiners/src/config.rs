//! Generation configuration consumed when selecting a target's passes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RefinerError, RefinerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationLanguage {
    #[default]
    CSharp,
    Java,
    TypeScript,
    Go,
}

impl GenerationLanguage {
    pub const ALL: [GenerationLanguage; 4] = [
        GenerationLanguage::CSharp,
        GenerationLanguage::Java,
        GenerationLanguage::TypeScript,
        GenerationLanguage::Go,
    ];

    /// Whether the emitter marks asynchronous methods natively, so no
    /// naming suffix is needed
    pub fn has_native_async(self) -> bool {
        !matches!(self, GenerationLanguage::CSharp)
    }

    pub fn supports_inheritance(self) -> bool {
        !matches!(self, GenerationLanguage::Go)
    }
}

impl fmt::Display for GenerationLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GenerationLanguage::CSharp => "csharp",
            GenerationLanguage::Java => "java",
            GenerationLanguage::TypeScript => "typescript",
            GenerationLanguage::Go => "go",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for GenerationLanguage {
    type Err = RefinerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csharp" | "c#" | "cs" => Ok(GenerationLanguage::CSharp),
            "java" => Ok(GenerationLanguage::Java),
            "typescript" | "ts" => Ok(GenerationLanguage::TypeScript),
            "go" | "golang" => Ok(GenerationLanguage::Go),
            other => Err(RefinerError::Config(format!(
                "unknown generation language `{}`",
                other
            ))),
        }
    }
}

/// Options for one target. Unset options fall back to the language default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfiguration {
    pub language: GenerationLanguage,
    pub native_async: Option<bool>,
    pub flatten_inheritance: Option<bool>,
    /// Extra identifiers escaped on top of the language keywords
    pub additional_reserved_names: Vec<String>,
}

impl GenerationConfiguration {
    pub fn new(language: GenerationLanguage) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }

    pub fn from_toml_str(source: &str) -> RefinerResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| RefinerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> RefinerResult<()> {
        if self
            .additional_reserved_names
            .iter()
            .any(|name| name.trim().is_empty())
        {
            return Err(RefinerError::Config(
                "additional_reserved_names cannot contain empty entries".to_string(),
            ));
        }
        Ok(())
    }

    pub fn uses_native_async(&self) -> bool {
        self.native_async
            .unwrap_or_else(|| self.language.has_native_async())
    }

    pub fn flattens_inheritance(&self) -> bool {
        self.flatten_inheritance
            .unwrap_or_else(|| !self.language.supports_inheritance())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_round_trips_through_display() {
        for language in GenerationLanguage::ALL {
            assert_eq!(language.to_string().parse::<GenerationLanguage>().unwrap(), language);
        }
        assert_eq!("C#".parse::<GenerationLanguage>().unwrap(), GenerationLanguage::CSharp);
        assert!("cobol".parse::<GenerationLanguage>().is_err());
    }

    #[test]
    fn test_defaults_follow_language() {
        let csharp = GenerationConfiguration::new(GenerationLanguage::CSharp);
        assert!(!csharp.uses_native_async());
        assert!(!csharp.flattens_inheritance());

        let go = GenerationConfiguration::new(GenerationLanguage::Go);
        assert!(go.uses_native_async());
        assert!(go.flattens_inheritance());

        let overridden = GenerationConfiguration {
            native_async: Some(true),
            ..csharp
        };
        assert!(overridden.uses_native_async());
    }

    #[test]
    fn test_from_toml() {
        let config = GenerationConfiguration::from_toml_str(
            r#"
language = "typescript"
flatten_inheritance = true
additional_reserved_names = ["client"]
"#,
        )
        .unwrap();
        assert_eq!(config.language, GenerationLanguage::TypeScript);
        assert_eq!(config.flatten_inheritance, Some(true));
        assert_eq!(config.native_async, None);
        assert_eq!(config.additional_reserved_names, vec!["client".to_string()]);
    }

    #[test]
    fn test_from_toml_rejects_bad_input() {
        assert!(matches!(
            GenerationConfiguration::from_toml_str(r#"language = "cobol""#),
            Err(RefinerError::Config(_))
        ));
        assert!(matches!(
            GenerationConfiguration::from_toml_str(r#"additional_reserved_names = [" "]"#),
            Err(RefinerError::Config(_))
        ));
    }
}
