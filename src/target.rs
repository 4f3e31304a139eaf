//! Languages and productions a snippet can be parsed as.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::fst::NodeKind;

/// Source language of a snippet.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Java,
    #[serde(alias = "cs", alias = "c#")]
    CSharp,
    C,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Java, Language::CSharp, Language::C];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Language::Java => "java",
            Language::CSharp => "csharp",
            Language::C => "c",
        }
    }

    /// Productions this language's grammar exposes as entry points.
    pub const fn productions(&self) -> &'static [Production] {
        match self {
            Language::Java => &[
                Production::ClassMember,
                Production::Method,
                Production::Constructor,
                Production::Field,
                Production::Type,
            ],
            Language::CSharp => &[
                Production::ClassMember,
                Production::Method,
                Production::Constructor,
                Production::Field,
                Production::Property,
                Production::Type,
            ],
            Language::C => &[
                Production::ExternalDeclaration,
                Production::Function,
                Production::Declaration,
            ],
        }
    }

    pub fn supports(&self, production: Production) -> bool {
        self.productions().contains(&production)
    }

    /// Guesses the language from a file extension (without the dot).
    pub fn from_extension(extension: &str) -> Option<Language> {
        match extension {
            "java" => Some(Language::Java),
            "cs" => Some(Language::CSharp),
            "c" | "h" => Some(Language::C),
            _ => None,
        }
    }

    /// The production batch parsing falls back to for whole-member snippets.
    pub const fn member_production(&self) -> Production {
        match self {
            Language::Java | Language::CSharp => Production::ClassMember,
            Language::C => Production::ExternalDeclaration,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "java" => Ok(Language::Java),
            "csharp" | "cs" | "c#" => Ok(Language::CSharp),
            "c" => Ok(Language::C),
            other => Err(format!("unknown language '{other}'")),
        }
    }
}

/// A named grammar rule a snippet must match.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Production {
    /// Any member of a class body: method, constructor, field, property,
    /// nested type or initializer block.
    ClassMember,
    Method,
    Constructor,
    Field,
    Property,
    /// A class, interface, struct or enum declaration.
    Type,
    /// A C function definition or declaration.
    ExternalDeclaration,
    Function,
    Declaration,
}

impl Production {
    pub const ALL: [Production; 9] = [
        Production::ClassMember,
        Production::Method,
        Production::Constructor,
        Production::Field,
        Production::Property,
        Production::Type,
        Production::ExternalDeclaration,
        Production::Function,
        Production::Declaration,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Production::ClassMember => "class-member",
            Production::Method => "method",
            Production::Constructor => "constructor",
            Production::Field => "field",
            Production::Property => "property",
            Production::Type => "type",
            Production::ExternalDeclaration => "external-declaration",
            Production::Function => "function",
            Production::Declaration => "declaration",
        }
    }

    /// Whether a root node of `kind` is a legal result of this production.
    pub fn accepts(&self, kind: NodeKind) -> bool {
        match self {
            Production::ClassMember => {
                kind.is_type()
                    || matches!(
                        kind,
                        NodeKind::Method
                            | NodeKind::Constructor
                            | NodeKind::Field
                            | NodeKind::Property
                            | NodeKind::Initializer
                    )
            }
            Production::Method => kind == NodeKind::Method,
            Production::Constructor => kind == NodeKind::Constructor,
            Production::Field => kind == NodeKind::Field,
            Production::Property => kind == NodeKind::Property,
            Production::Type => kind.is_type(),
            Production::ExternalDeclaration => {
                matches!(kind, NodeKind::Function | NodeKind::Declaration)
            }
            Production::Function => kind == NodeKind::Function,
            Production::Declaration => kind == NodeKind::Declaration,
        }
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Production {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Production::ALL
            .iter()
            .copied()
            .find(|production| production.as_str() == s)
            .ok_or_else(|| format!("unknown production '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_production_is_offered_by_some_language() {
        for production in Production::ALL {
            assert!(
                Language::ALL.iter().any(|l| l.supports(production)),
                "{production} is orphaned"
            );
        }
    }

    #[test]
    fn language_aliases_parse() {
        assert_eq!("C#".parse::<Language>(), Ok(Language::CSharp));
        assert_eq!("cs".parse::<Language>(), Ok(Language::CSharp));
        assert!("cobol".parse::<Language>().is_err());
    }

    #[test]
    fn class_member_accepts_nested_types() {
        assert!(Production::ClassMember.accepts(NodeKind::Class));
        assert!(Production::ClassMember.accepts(NodeKind::Initializer));
        assert!(!Production::ClassMember.accepts(NodeKind::Function));
        assert!(!Production::Method.accepts(NodeKind::Constructor));
    }
}
