use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A dialect selector as supplied by the host.
///
/// `SevenCfg` is a container dialect: its body is written in one of the other
/// three grammars, chosen by a tag on the first line or by an override.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Dialect {
    Json,
    Toml,
    Env,
    SevenCfg,
}

/// A concrete grammar. Every [`Dialect`] resolves to exactly one of these.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Syntax {
    Json,
    Toml,
    Env,
}

impl Dialect {
    pub const ALL: [Self; 4] = [Self::Json, Self::Toml, Self::Env, Self::SevenCfg];

    /// The grammar this dialect is written in, or `None` for `.7cfg`, whose
    /// grammar is only known once the buffer (or an override) is inspected.
    pub const fn syntax(self) -> Option<Syntax> {
        match self {
            Self::Json => Some(Syntax::Json),
            Self::Toml => Some(Syntax::Toml),
            Self::Env => Some(Syntax::Env),
            Self::SevenCfg => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Toml => "toml",
            Self::Env => "env",
            Self::SevenCfg => "7cfg",
        }
    }
}

impl Syntax {
    /// The prefix that starts a line comment, if the grammar has comments.
    pub const fn comment_prefix(self) -> Option<char> {
        match self {
            Self::Json => None,
            Self::Toml | Self::Env => Some('#'),
        }
    }

    /// Whether newlines are significant tokens rather than trivia.
    pub const fn is_line_based(self) -> bool {
        matches!(self, Self::Toml | Self::Env)
    }

    pub const fn name(self) -> &'static str {
        self.dialect().name()
    }

    pub const fn dialect(self) -> Dialect {
        match self {
            Self::Json => Dialect::Json,
            Self::Toml => Dialect::Toml,
            Self::Env => Dialect::Env,
        }
    }
}

impl From<Syntax> for Dialect {
    fn from(syntax: Syntax) -> Self {
        syntax.dialect()
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a dialect name is not one of `json`, `toml`, `env`, `7cfg`.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("unknown dialect `{0}` (expected json, toml, env or 7cfg)")]
pub struct UnknownDialect(pub String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            "env" | "dotenv" => Ok(Self::Env),
            "7cfg" | ".7cfg" => Ok(Self::SevenCfg),
            _ => Err(UnknownDialect(s.to_string())),
        }
    }
}

impl FromStr for Syntax {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Dialect>()?.syntax().ok_or_else(|| UnknownDialect(s.to_string()))
    }
}
