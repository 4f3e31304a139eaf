//! Adapter configuration loaded from YAML.
//!
//! ```yaml
//! strict: true
//! targets:
//!   - language: java
//!     production: method
//!     constraints:
//!       - signature-only
//!       - exactly-one-child: identifier
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::target::{Language, Production};
use crate::validation::ConstraintSet;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {}", path.display())]
    #[diagnostic(code(fstparse::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config file {}", path.display())]
    #[diagnostic(
        code(fstparse::config::yaml),
        help("expected a mapping with optional `strict` and `targets` keys")
    )]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("config targets {language} {production}, which {language} does not have")]
    #[diagnostic(code(fstparse::config::target))]
    UnsupportedTarget {
        language: Language,
        production: Production,
    },
}

fn default_strict() -> bool {
    true
}

/// Constraint overrides for one (language, production) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub language: Language,
    pub production: Production,
    #[serde(default)]
    pub constraints: ConstraintSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdapterConfig {
    /// Reject content after the production.
    #[serde(default = "default_strict")]
    pub strict: bool,
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            strict: true,
            targets: Vec::new(),
        }
    }
}

impl AdapterConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AdapterConfig =
            serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?;
        config.check_targets()?;
        Ok(config)
    }

    fn check_targets(&self) -> Result<(), ConfigError> {
        match self
            .targets
            .iter()
            .find(|t| !t.language.supports(t.production))
        {
            Some(target) => Err(ConfigError::UnsupportedTarget {
                language: target.language,
                production: target.production,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fst::NodeKind;
    use crate::validation::Constraint;

    fn write_temp(name: &str, text: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("fstparse-{}-{name}", std::process::id()));
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn loads_targets_and_constraints() {
        let path = write_temp(
            "config.yaml",
            "strict: false\ntargets:\n  - language: java\n    production: method\n    constraints:\n      - signature-only\n      - exactly-one-child: identifier\n",
        );
        let config = AdapterConfig::load(&path).unwrap();
        fs::remove_file(&path).ok();
        assert!(!config.strict);
        assert_eq!(config.targets.len(), 1);
        assert_eq!(
            config.targets[0].constraints.constraints(),
            &[
                Constraint::SignatureOnly,
                Constraint::ExactlyOneChild(NodeKind::Identifier)
            ]
        );
    }

    #[test]
    fn every_constraint_form_loads_from_a_file() {
        let path = write_temp(
            "shapes.yaml",
            "targets:\n  - language: c\n    production: declaration\n    constraints:\n      - root-kind-in: [declaration]\n      - child-count: { kind: variable, min: 1 }\n      - forbid-kind: parameter\n      - require-name\n",
        );
        let config = AdapterConfig::load(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(
            config.targets[0].constraints.constraints(),
            &[
                Constraint::RootKindIn(vec![NodeKind::Declaration]),
                Constraint::ChildCount {
                    kind: NodeKind::Variable,
                    min: 1,
                    max: None
                },
                Constraint::ForbidKind(NodeKind::Parameter),
                Constraint::RequireName,
            ]
        );
    }

    #[test]
    fn constraints_are_written_back_as_maps() {
        let set: ConstraintSet = [Constraint::ExactlyOneChild(NodeKind::Identifier)]
            .into_iter()
            .collect();
        let yaml = serde_yaml::to_string(&set).unwrap();
        assert_eq!(yaml, "- exactly-one-child: identifier\n");
    }

    #[test]
    fn strict_defaults_to_true() {
        let config: AdapterConfig = serde_yaml::from_str("targets: []").unwrap();
        assert!(config.strict);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = AdapterConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn malformed_yaml_is_reported() {
        let path = write_temp("bad.yaml", "strict: [\n");
        let err = AdapterConfig::load(&path).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn rejects_targets_the_language_lacks() {
        let path = write_temp(
            "unsupported.yaml",
            "targets:\n  - language: c\n    production: method\n",
        );
        let err = AdapterConfig::load(&path).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(matches!(
            err,
            ConfigError::UnsupportedTarget {
                language: Language::C,
                production: Production::Method
            }
        ));
    }
}
