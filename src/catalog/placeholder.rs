//! Template placeholder vocabulary
//!
//! Templates may contain only the tokens listed in [`Placeholder::ALL`].
//! Anything else that looks like a token is passed through the compiler
//! verbatim; catalog loading reports such tokens so typos surface early.

use regex::Regex;
use std::sync::LazyLock;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([A-Z0-9_]+)\]\]").expect("valid regex"));

/// A recognized `[[NAME]]` token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    Context,
    Persona,
    Role,
    Constraints,
    Goal,
    Examples,
    Schema,
}

impl Placeholder {
    pub const ALL: [Placeholder; 7] = [
        Placeholder::Context,
        Placeholder::Persona,
        Placeholder::Role,
        Placeholder::Constraints,
        Placeholder::Goal,
        Placeholder::Examples,
        Placeholder::Schema,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            Self::Context => "[[CONTEXT]]",
            Self::Persona => "[[PERSONA]]",
            Self::Role => "[[ROLE]]",
            Self::Constraints => "[[CONSTRAINTS]]",
            Self::Goal => "[[GOAL]]",
            Self::Examples => "[[EXAMPLES]]",
            Self::Schema => "[[SCHEMA]]",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| &p.token()[2..p.token().len() - 2] == name)
    }
}

/// Token-shaped sequences in `template` that are not part of the vocabulary
pub fn unknown_tokens(template: &str) -> Vec<String> {
    TOKEN_RE
        .captures_iter(template)
        .filter(|caps| Placeholder::from_name(&caps[1]).is_none())
        .map(|caps| caps[0].to_string())
        .collect()
}
